//! Subcommand handlers
//!
//! Each AI-capable command declares its flag table (`FLAGS`) and a `run`
//! taking the session and the parsed [`FlagSet`]. A command either forwards
//! to git (and adopts its exit code) or takes the AI path and finalizes with
//! git itself.

pub mod add;
pub mod commit;
pub mod config;
pub mod diff;
pub mod log;
pub mod merge;
pub mod passthrough;
pub mod version;

use tracing::debug;

use crate::cli::flags::FlagSet;
use crate::git::Vcs;
use crate::types::{Result, SgitError};

/// How an invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub exit_code: i32,
    /// git wrote straight to the inherited stdout/stderr
    pub relayed: bool,
}

impl CommandOutcome {
    /// Handled locally, including "nothing to do"
    pub fn done() -> Self {
        Self {
            exit_code: 0,
            relayed: false,
        }
    }

    /// Exit code adopted from git
    pub fn delegated(exit_code: i32) -> Self {
        Self {
            exit_code,
            relayed: true,
        }
    }
}

/// `git <subcommand> <reconstructed flags and arguments>`
pub(crate) fn forward(vcs: &dyn Vcs, subcommand: &str, flags: &FlagSet) -> Result<CommandOutcome> {
    let mut args = vec![subcommand.to_string()];
    args.extend(flags.reconstruct());
    debug!("Passthrough: git {}", args.join(" "));
    Ok(CommandOutcome::delegated(vcs.run_interactive(&args)?))
}

/// Interactive git run that must succeed; used to finalize AI paths
pub(crate) fn finalize(vcs: &dyn Vcs, args: Vec<String>) -> Result<()> {
    let code = vcs.run_interactive(&args)?;
    if code != 0 {
        let operation = args.first().cloned().unwrap_or_default();
        return Err(SgitError::git(operation, code, ""));
    }
    Ok(())
}
