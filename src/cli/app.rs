//! Command-line surface and routing
//!
//! The AI-capable subcommands are built from their flag tables, so the same
//! declaration drives parsing and reconstruction. Anything else ends up as a
//! raw git invocation:
//!
//! - unknown subcommands (clap external subcommands)
//! - `sgit git <args...>`
//! - known subcommands carrying a flag no table declares

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use super::commands::{add, commit, diff, log, merge};
use super::flags::{self, FlagSet, FlagSpec};

/// Subcommands parsed against a flag table
const AI_COMMANDS: &[(&str, &str, &[FlagSpec])] = &[
    ("add", "Stage files, optionally choosing untracked files with AI", add::FLAGS),
    ("commit", "Commit with an AI-generated message", commit::FLAGS),
    ("diff", "Show changes followed by an AI summary", diff::FLAGS),
    ("log", "Show history, optionally with AI analysis", log::FLAGS),
    ("merge", "Merge with AI conflict help or message", merge::FLAGS),
];

/// Global flags recognized before or after the subcommand
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Globals {
    pub lang: Option<String>,
    pub config: Option<PathBuf>,
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Add(FlagSet),
    Commit(FlagSet),
    Diff(FlagSet),
    Log(FlagSet),
    Merge(FlagSet),
    ConfigSetup,
    ConfigShow { json: bool },
    ConfigPath,
    Version,
    /// Forwarded to git verbatim
    Git(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub globals: Globals,
    pub route: Route,
}

pub fn build() -> Command {
    let mut cmd = Command::new("sgit")
        .about("Solar LLM-powered git wrapper")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .allow_external_subcommands(true)
        .external_subcommand_value_parser(value_parser!(String))
        .arg(
            Arg::new("lang")
                .long("lang")
                .global(true)
                .value_name("CODE")
                .help("Response language (en, ko, ja, zh, es, fr, de)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Config file to use instead of the default"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        );

    for &(name, about, specs) in AI_COMMANDS {
        cmd = cmd.subcommand(flags::command(name, about, specs));
    }

    cmd.subcommand(
        Command::new("config")
            .about("Configure the API key, model and language")
            .subcommand(
                Command::new("show")
                    .about("Show the effective configuration")
                    .arg(
                        Arg::new("json")
                            .long("json")
                            .action(ArgAction::SetTrue)
                            .help("Print as JSON"),
                    ),
            )
            .subcommand(Command::new("path").about("Show the config file location")),
    )
    .subcommand(Command::new("version").about("Show version information"))
    .subcommand(
        Command::new("git")
            .about("Run any git command unchanged")
            .disable_help_flag(true)
            .arg(
                Arg::new("args")
                    .num_args(0..)
                    .action(ArgAction::Append)
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true)
                    .value_name("ARGS"),
            ),
    )
}

/// Parse the full argv, program name included
pub fn parse<I, T>(argv: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv: Vec<String> = argv
        .into_iter()
        .map(|a| a.into().to_string_lossy().into_owned())
        .collect();

    match build().try_get_matches_from(&argv) {
        Ok(matches) => Ok(route(&matches)),
        Err(e) if e.kind() == ErrorKind::UnknownArgument => {
            let (globals, rest) = split_globals(argv.get(1..).unwrap_or_default());
            let known = rest
                .first()
                .is_some_and(|sub| AI_COMMANDS.iter().any(|(name, _, _)| name == sub));
            if known {
                Ok(Invocation {
                    globals,
                    route: Route::Git(rest),
                })
            } else {
                Err(e)
            }
        }
        Err(e) => Err(e),
    }
}

fn route(matches: &ArgMatches) -> Invocation {
    let mut globals = Globals {
        lang: matches.get_one::<String>("lang").cloned(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        debug: matches.get_flag("debug"),
    };

    let route = match matches.subcommand() {
        Some(("add", sub)) => Route::Add(FlagSet::from_matches(add::FLAGS, sub)),
        Some(("commit", sub)) => Route::Commit(FlagSet::from_matches(commit::FLAGS, sub)),
        Some(("diff", sub)) => Route::Diff(FlagSet::from_matches(diff::FLAGS, sub)),
        Some(("log", sub)) => Route::Log(FlagSet::from_matches(log::FLAGS, sub)),
        Some(("merge", sub)) => Route::Merge(FlagSet::from_matches(merge::FLAGS, sub)),
        Some(("config", sub)) => match sub.subcommand() {
            Some(("show", show)) => Route::ConfigShow {
                json: show.get_flag("json"),
            },
            Some(("path", _)) => Route::ConfigPath,
            _ => Route::ConfigSetup,
        },
        Some(("version", _)) => Route::Version,
        Some(("git", sub)) => Route::Git(strings(sub, "args")),
        Some((external, sub)) => {
            let mut argv = vec![external.to_string()];
            argv.extend(strings(sub, ""));
            Route::Git(argv)
        }
        None => Route::Version,
    };

    // globals given after a subcommand are recorded on the subcommand matches
    if let Some((_, sub)) = matches.subcommand() {
        if globals.lang.is_none() {
            globals.lang = sub.try_get_one::<String>("lang").ok().flatten().cloned();
        }
        if globals.config.is_none() {
            globals.config = sub.try_get_one::<PathBuf>("config").ok().flatten().cloned();
        }
        globals.debug |= sub
            .try_get_one::<bool>("debug")
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false);
    }

    Invocation { globals, route }
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Pull sgit's own global flags out of a raw argv; everything after `--`
/// is left alone
fn split_globals(argv: &[String]) -> (Globals, Vec<String>) {
    let mut globals = Globals::default();
    let mut rest = Vec::with_capacity(argv.len());
    let mut iter = argv.iter();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            rest.push(arg.clone());
            rest.extend(iter.by_ref().cloned());
            break;
        }
        if arg == "--debug" {
            globals.debug = true;
        } else if arg == "--lang" {
            globals.lang = iter.next().cloned();
        } else if let Some(code) = arg.strip_prefix("--lang=") {
            globals.lang = Some(code.to_string());
        } else if arg == "--config" {
            globals.config = iter.next().map(PathBuf::from);
        } else if let Some(path) = arg.strip_prefix("--config=") {
            globals.config = Some(PathBuf::from(path));
        } else {
            rest.push(arg.clone());
        }
    }

    (globals, rest)
}
