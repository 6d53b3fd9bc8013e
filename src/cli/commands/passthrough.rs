//! Raw git forwarding
//!
//! Used for subcommands sgit does not know, for `sgit git ...`, and for
//! invocations of known subcommands whose flags are not declared.

use tracing::debug;

use super::CommandOutcome;
use crate::git::Vcs;
use crate::types::Result;

/// Run `git <argv>` verbatim and adopt its exit code
pub fn run(vcs: &dyn Vcs, argv: &[String]) -> Result<CommandOutcome> {
    debug!("Forwarding to git: {:?}", argv);
    Ok(CommandOutcome::delegated(vcs.run_interactive(argv)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::FakeVcs;

    #[test]
    fn test_unknown_command_forwarded_verbatim() {
        let vcs = FakeVcs::new().exit("foo --bar", 1);
        let log = vcs.log();

        let argv = vec!["foo".to_string(), "--bar".to_string()];
        let outcome = run(&vcs, &argv).unwrap();

        assert_eq!(outcome, CommandOutcome::delegated(1));
        assert_eq!(log.interactive(), vec![argv]);
    }

    #[test]
    fn test_status_passes_through() {
        let vcs = FakeVcs::new().exit("status -sb", 0);
        let outcome = run(&vcs, &["status".to_string(), "-sb".to_string()]).unwrap();
        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.relayed);
    }
}
