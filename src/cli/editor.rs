//! Commit message editor
//!
//! Lookup order follows git: `GIT_EDITOR`, `core.editor`, `VISUAL`, `EDITOR`,
//! then the first of nano, vim, vi on PATH.

use std::io::Write;
use std::process::Command;

use tracing::debug;

use crate::git::{Vcs, to_args};
use crate::types::{Result, ResultExt, SgitError};

const FALLBACK_EDITORS: &[&str] = &["nano", "vim", "vi"];

const EDIT_HELP: &str = "\n\
# Please edit the commit message above.
# Lines starting with '#' will be ignored.
# An empty message aborts the commit.
#
# AI-generated message based on your changes.
# You can edit, replace, or completely rewrite it.
";

/// Editor program plus its leading arguments (`code --wait`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EditorCommand {
    /// Split with shell quoting rules
    pub fn parse(spec: &str) -> Result<Self> {
        let mut words = shell_words::split(spec)
            .map_err(|e| SgitError::Editor(format!("cannot parse editor '{}': {}", spec, e)))?
            .into_iter();
        let program = words
            .next()
            .ok_or_else(|| SgitError::Editor("editor command is empty".to_string()))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

/// Values consulted in lookup order
#[derive(Debug, Clone, Default)]
struct EditorSources {
    git_editor: Option<String>,
    core_editor: Option<String>,
    visual: Option<String>,
    editor: Option<String>,
}

impl EditorSources {
    fn from_env(vcs: &dyn Vcs) -> Self {
        let core_editor = vcs
            .run_captured(&to_args(&["config", "--get", "core.editor"]))
            .ok()
            .filter(|c| c.success())
            .map(|c| c.stdout.trim().to_string());

        Self {
            git_editor: std::env::var("GIT_EDITOR").ok(),
            core_editor,
            visual: std::env::var("VISUAL").ok(),
            editor: std::env::var("EDITOR").ok(),
        }
    }

    fn choose(self, on_path: impl Fn(&str) -> bool) -> Result<EditorCommand> {
        let configured = [self.git_editor, self.core_editor, self.visual, self.editor]
            .into_iter()
            .flatten()
            .find(|e| !e.trim().is_empty());

        if let Some(spec) = configured {
            return EditorCommand::parse(&spec);
        }

        FALLBACK_EDITORS
            .iter()
            .find(|name| on_path(name))
            .map(|name| EditorCommand {
                program: name.to_string(),
                args: Vec::new(),
            })
            .ok_or_else(|| {
                SgitError::Editor(
                    "no editor found: set GIT_EDITOR, VISUAL or EDITOR".to_string(),
                )
            })
    }
}

pub fn resolve_editor(vcs: &dyn Vcs) -> Result<EditorCommand> {
    let editor = EditorSources::from_env(vcs).choose(|name| which::which(name).is_ok())?;
    debug!("Using editor: {} {:?}", editor.program, editor.args);
    Ok(editor)
}

/// Drop `#` comment lines and surrounding whitespace
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Open `initial` plus help comments in the editor; returns the cleaned text
pub fn edit_text(editor: &EditorCommand, initial: &str) -> Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("sgit-commit-")
        .suffix(".txt")
        .tempfile()
        .with_context("Failed to create temp file")?;
    write!(file, "{}\n{}", initial, EDIT_HELP).with_context("Failed to write temp file")?;
    file.flush().with_context("Failed to write temp file")?;

    let status = Command::new(&editor.program)
        .args(&editor.args)
        .arg(file.path())
        .status()
        .map_err(|e| SgitError::Editor(format!("failed to launch {}: {}", editor.program, e)))?;

    if !status.success() {
        return Err(SgitError::Editor(format!(
            "{} exited with {}",
            editor.program, status
        )));
    }

    let edited = std::fs::read_to_string(file.path()).with_context("Failed to read edited file")?;
    Ok(strip_comments(&edited))
}
