//! Command-line layer: parsing, routing and the per-command handlers

pub mod app;
pub mod commands;
pub mod editor;
pub mod flags;
pub mod progress;
pub mod session;
pub mod ui;

pub use app::{Globals, Invocation, Route};
pub use commands::CommandOutcome;
pub use session::Session;

use crate::types::Result;

/// Run a parsed route against the session
pub async fn dispatch(session: &mut Session, route: Route) -> Result<CommandOutcome> {
    match route {
        Route::Add(flags) => commands::add::run(session, &flags).await,
        Route::Commit(flags) => commands::commit::run(session, &flags).await,
        Route::Diff(flags) => commands::diff::run(session, &flags).await,
        Route::Log(flags) => commands::log::run(session, &flags).await,
        Route::Merge(flags) => commands::merge::run(session, &flags).await,
        Route::ConfigSetup => commands::config::setup(session),
        Route::ConfigShow { json } => commands::config::show(session, json),
        Route::ConfigPath => commands::config::path(session),
        Route::Version => Ok(commands::version::run(&session.output)),
        Route::Git(argv) => commands::passthrough::run(session.vcs.as_ref(), &argv),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::testing::ScriptedProvider;
    use crate::cli::session::testing::session;
    use crate::cli::ui::ScriptedTerminal;
    use crate::git::testing::FakeVcs;

    async fn run_argv(
        vcs: FakeVcs,
        provider: Option<ScriptedProvider>,
        items: &[&str],
    ) -> (CommandOutcome, String) {
        let invocation =
            app::parse(std::iter::once("sgit").chain(items.iter().copied())).unwrap();
        let (mut session, buffer) = session(vcs, ScriptedTerminal::new(), provider);
        let outcome = dispatch(&mut session, invocation.route).await.unwrap();
        let text = buffer.lock().unwrap().clone();
        (outcome, text)
    }

    #[tokio::test]
    async fn test_unknown_command_adopts_exit_code() {
        let vcs = FakeVcs::new().exit("foo --bar", 3);
        let log = vcs.log();

        let (outcome, _) = run_argv(vcs, None, &["foo", "--bar"]).await;

        assert_eq!(outcome, CommandOutcome::delegated(3));
        assert_eq!(
            log.interactive(),
            vec![vec!["foo".to_string(), "--bar".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_commit_with_nothing_staged() {
        let vcs = FakeVcs::new().respond("diff --cached --quiet", 0, "");
        let provider = ScriptedProvider::replying(&["unused"]);

        let (outcome, text) = run_argv(vcs, Some(provider.clone()), &["commit"]).await;

        assert_eq!(outcome.exit_code, 0);
        assert!(text.contains("No changes to commit"));
        assert!(provider.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_undeclared_commit_flag_goes_to_git() {
        let vcs = FakeVcs::new().exit("commit -C HEAD", 0);
        let log = vcs.log();

        let (outcome, _) = run_argv(vcs, None, &["commit", "-C", "HEAD"]).await;

        assert!(outcome.relayed);
        assert!(log.ran("commit -C HEAD"));
    }
}
