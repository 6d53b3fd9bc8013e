//! Declared flag tables and passthrough reconstruction
//!
//! Every AI-capable subcommand declares its flags once, as an ordered slice
//! of [`FlagSpec`]. The same table drives clap parsing, the bypass policy
//! (`bypasses_ai`), and which flags may be forwarded to git (`augmentation`
//! flags never are).
//!
//! Reconstruction only emits flags the user typed, in declaration order:
//!
//! | kind      | emitted as                          | when              |
//! |-----------|-------------------------------------|-------------------|
//! | bool      | `-c`, else `--name`                 | set and true      |
//! | value     | `-c value`, else `--name=value`     | set and non-empty |
//! | attached  | `-cvalue`                           | set and non-empty |
//! | optional  | `--name`, or `--name=value`         | set               |
//!
//! Positional arguments follow verbatim, then `--` and any pathspecs.

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

const ARGS: &str = "args";
const PATHSPEC: &str = "pathspec";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Bool,
    Value,
    /// `--name[=value]`, value must be attached with `=`
    OptionalValue,
}

/// One declared flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: &'static str,
    pub short: Option<char>,
    pub kind: FlagKind,
    pub help: &'static str,
    /// Wrapper-only flag, never forwarded to git
    pub augmentation: bool,
    /// Presence means the user wants plain git behavior
    pub bypasses_ai: bool,
    /// Short form takes its value in the same token (`-U5`)
    pub attached: bool,
}

impl FlagSpec {
    const fn new(name: &'static str, kind: FlagKind, help: &'static str) -> Self {
        Self {
            name,
            short: None,
            kind,
            help,
            augmentation: false,
            bypasses_ai: false,
            attached: false,
        }
    }

    pub const fn bool(name: &'static str, help: &'static str) -> Self {
        Self::new(name, FlagKind::Bool, help)
    }

    pub const fn value(name: &'static str, help: &'static str) -> Self {
        Self::new(name, FlagKind::Value, help)
    }

    pub const fn optional(name: &'static str, help: &'static str) -> Self {
        Self::new(name, FlagKind::OptionalValue, help)
    }

    pub const fn short(self, short: char) -> Self {
        Self {
            short: Some(short),
            ..self
        }
    }

    pub const fn attached(self) -> Self {
        Self {
            attached: true,
            ..self
        }
    }

    pub const fn augmentation(self) -> Self {
        Self {
            augmentation: true,
            ..self
        }
    }

    pub const fn bypass(self) -> Self {
        Self {
            bypasses_ai: true,
            ..self
        }
    }

    fn to_arg(self) -> Arg {
        let mut arg = Arg::new(self.name).long(self.name).help(self.help);
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        match self.kind {
            FlagKind::Bool => arg.action(ArgAction::SetTrue),
            FlagKind::Value => arg
                .action(ArgAction::Set)
                .num_args(1)
                .allow_hyphen_values(true)
                .value_name("VALUE"),
            FlagKind::OptionalValue => arg
                .action(ArgAction::Set)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("")
                .value_name("VALUE"),
        }
    }
}

/// Build a clap subcommand from a flag table
pub fn command(name: &'static str, about: &'static str, specs: &[FlagSpec]) -> Command {
    Command::new(name)
        .about(about)
        .args_override_self(true)
        .args(specs.iter().map(|s| s.to_arg()))
        .arg(
            Arg::new(ARGS)
                .num_args(0..)
                .action(ArgAction::Append)
                .allow_negative_numbers(true)
                .value_name("ARGS")
                .help("Arguments passed to git"),
        )
        .arg(
            Arg::new(PATHSPEC)
                .num_args(0..)
                .action(ArgAction::Append)
                .last(true)
                .value_name("PATHSPEC")
                .help("Paths after --"),
        )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagEntry {
    pub spec: FlagSpec,
    pub value: FlagValue,
    /// Typed by the user rather than defaulted
    pub explicit: bool,
}

impl FlagEntry {
    fn is_set(&self) -> bool {
        if !self.explicit {
            return false;
        }
        match (&self.value, self.spec.kind) {
            (FlagValue::Bool(b), _) => *b,
            (FlagValue::Text(_), FlagKind::OptionalValue) => true,
            (FlagValue::Text(v), _) => !v.is_empty(),
        }
    }

    fn emit(&self, out: &mut Vec<String>) {
        if !self.is_set() {
            return;
        }
        let spec = self.spec;
        match (&self.value, spec.kind) {
            (FlagValue::Bool(_), _) => match spec.short {
                Some(c) => out.push(format!("-{}", c)),
                None => out.push(format!("--{}", spec.name)),
            },
            (FlagValue::Text(v), FlagKind::OptionalValue) => {
                if v.is_empty() {
                    out.push(format!("--{}", spec.name));
                } else {
                    out.push(format!("--{}={}", spec.name, v));
                }
            }
            (FlagValue::Text(v), _) => match spec.short {
                Some(c) if spec.attached => out.push(format!("-{}{}", c, v)),
                Some(c) => {
                    out.push(format!("-{}", c));
                    out.push(v.clone());
                }
                None => out.push(format!("--{}={}", spec.name, v)),
            },
        }
    }
}

/// Parsed flags of one invocation, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    entries: Vec<FlagEntry>,
    positionals: Vec<String>,
    pathspecs: Vec<String>,
}

impl FlagSet {
    pub fn from_matches(specs: &[FlagSpec], matches: &ArgMatches) -> Self {
        let entries = specs
            .iter()
            .map(|spec| {
                let explicit = matches.value_source(spec.name) == Some(ValueSource::CommandLine);
                let value = match spec.kind {
                    FlagKind::Bool => FlagValue::Bool(matches.get_flag(spec.name)),
                    FlagKind::Value | FlagKind::OptionalValue => FlagValue::Text(
                        matches
                            .get_one::<String>(spec.name)
                            .cloned()
                            .unwrap_or_default(),
                    ),
                };
                FlagEntry {
                    spec: *spec,
                    value,
                    explicit,
                }
            })
            .collect();

        let collect = |id: &str| -> Vec<String> {
            matches
                .get_many::<String>(id)
                .map(|values| values.cloned().collect())
                .unwrap_or_default()
        };

        Self {
            entries,
            positionals: collect(ARGS),
            pathspecs: collect(PATHSPEC),
        }
    }

    /// Parse `argv` (without the subcommand name) against a flag table
    pub fn parse(
        name: &'static str,
        specs: &[FlagSpec],
        argv: &[String],
    ) -> std::result::Result<Self, clap::Error> {
        let matches = command(name, "", specs)
            .no_binary_name(true)
            .try_get_matches_from(argv)?;
        Ok(Self::from_matches(specs, &matches))
    }

    fn entry(&self, name: &str) -> Option<&FlagEntry> {
        self.entries.iter().find(|e| e.spec.name == name)
    }

    /// True when the flag was typed: bools true, values non-empty
    pub fn is_set(&self, name: &str) -> bool {
        self.entry(name).is_some_and(FlagEntry::is_set)
    }

    /// Explicit non-empty value of a valued flag
    pub fn value(&self, name: &str) -> Option<&str> {
        match self.entry(name) {
            Some(entry) if entry.is_set() => match &entry.value {
                FlagValue::Text(v) if !v.is_empty() => Some(v.as_str()),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    pub fn pathspecs(&self) -> &[String] {
        &self.pathspecs
    }

    /// Any typed flag tagged as bypassing the AI path
    pub fn bypasses_ai(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.spec.bypasses_ai && e.is_set())
    }

    /// Forwardable flags followed by positionals and pathspecs
    pub fn reconstruct(&self) -> Vec<String> {
        self.reconstruct_without(&[])
    }

    /// As [`reconstruct`](Self::reconstruct), also dropping the named flags
    pub fn reconstruct_without(&self, exclude: &[&str]) -> Vec<String> {
        let mut out = self.flags_without(exclude);
        out.extend(self.positionals.iter().cloned());
        if !self.pathspecs.is_empty() {
            out.push("--".to_string());
            out.extend(self.pathspecs.iter().cloned());
        }
        out
    }

    /// Forwardable flags only, without positionals
    pub fn flags_without(&self, exclude: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        for entry in &self.entries {
            if entry.spec.augmentation || exclude.contains(&entry.spec.name) {
                continue;
            }
            entry.emit(&mut out);
        }
        out
    }
}
