//! Log Command
//!
//! Plain `git log` unless `--ai-analysis` is given, in which case the log is
//! captured, printed and analyzed for patterns over `--ai-timeframe`.

use super::commit::report_budget;
use super::{CommandOutcome, forward};
use crate::cli::flags::{FlagSet, FlagSpec};
use crate::cli::progress::stream_response;
use crate::cli::session::Session;
use crate::constants::git::DEFAULT_LOG_COUNT;
use crate::git::GitQueries;
use crate::types::{Result, ResultExt};

const DEFAULT_TIMEFRAME: &str = "last 20 commits";

pub const FLAGS: &[FlagSpec] = &[
    // sgit
    FlagSpec::bool("ai-analysis", "Analyze the log with Solar LLM").augmentation(),
    FlagSpec::value("ai-timeframe", "Timeframe described to the model").augmentation(),
    // git
    FlagSpec::bool("oneline", "One line per commit"),
    FlagSpec::optional("pretty", "Pretty-print format"),
    FlagSpec::value("format", "Custom format"),
    FlagSpec::bool("graph", "Draw the commit graph"),
    FlagSpec::optional("decorate", "Print ref names"),
    FlagSpec::bool("all", "All refs"),
    FlagSpec::value("since", "Commits more recent than a date"),
    FlagSpec::value("until", "Commits older than a date"),
    FlagSpec::value("after", "Synonym for --since"),
    FlagSpec::value("before", "Synonym for --until"),
    FlagSpec::value("author", "Filter by author"),
    FlagSpec::value("committer", "Filter by committer"),
    FlagSpec::value("grep", "Filter by message"),
    FlagSpec::value("max-count", "Limit the number of commits").short('n'),
    FlagSpec::value("skip", "Skip commits"),
    FlagSpec::bool("reverse", "Oldest first"),
    FlagSpec::bool("merges", "Only merge commits"),
    FlagSpec::bool("no-merges", "Skip merge commits"),
    FlagSpec::bool("first-parent", "Follow only the first parent"),
    FlagSpec::bool("stat", "Show diffstat"),
    FlagSpec::bool("shortstat", "Show only the summary line"),
    FlagSpec::bool("name-only", "Show changed file names"),
    FlagSpec::bool("name-status", "Show changed file names and status"),
    FlagSpec::bool("abbrev-commit", "Abbreviate commit hashes"),
];

pub async fn run(session: &mut Session, flags: &FlagSet) -> Result<CommandOutcome> {
    if !flags.is_set("ai-analysis") {
        return forward(session.vcs.as_ref(), "log", flags);
    }

    session.vcs.ensure_work_tree()?;
    let timeframe = flags.value("ai-timeframe").unwrap_or(DEFAULT_TIMEFRAME);

    let args = capture_args(flags);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let log = session
        .vcs
        .output(&args)
        .with_context("Error getting git log")?;
    if log.trim().is_empty() {
        session.output.line("No commits found");
        return Ok(CommandOutcome::done());
    }

    let provider = session.ensure_provider()?;

    session.output.banner("GIT LOG");
    session.output.line(log.trim_end());
    session.output.blank();

    let prompt = session.assembler().log_analysis(&log, timeframe);
    report_budget(&session.output, "Log analysis", &prompt);

    session.output.banner("AI ANALYSIS");
    stream_response(
        provider.as_ref(),
        &prompt.text,
        &session.output,
        "Thinking...",
    )
    .await
    .with_context("Error analyzing git log")?;

    Ok(CommandOutcome::done())
}

/// `log` plus the user's arguments, limited to 20 commits when no count was given
fn capture_args(flags: &FlagSet) -> Vec<String> {
    let mut args = vec!["log".to_string()];
    args.extend(flags.flags_without(&[]));
    args.extend(flags.positionals().iter().cloned());
    if !has_count_limit(&args) {
        args.push(DEFAULT_LOG_COUNT.to_string());
    }
    if !flags.pathspecs().is_empty() {
        args.push("--".to_string());
        args.extend(flags.pathspecs().iter().cloned());
    }
    args
}

fn has_count_limit(args: &[String]) -> bool {
    args.iter().any(|arg| {
        arg.starts_with("-n")
            || arg.starts_with("--max-count")
            || arg
                .strip_prefix('-')
                .and_then(|rest| rest.chars().next())
                .is_some_and(|c| c.is_ascii_digit())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::testing::ScriptedProvider;
    use crate::cli::session::testing::session;
    use crate::cli::ui::ScriptedTerminal;
    use crate::git::testing::FakeVcs;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn flags(items: &[&str]) -> FlagSet {
        FlagSet::parse("log", FLAGS, &argv(items)).unwrap()
    }

    #[test]
    fn test_default_count_appended_before_pathspec() {
        assert_eq!(
            capture_args(&flags(&["--ai-analysis", "--oneline", "--", "src"])),
            argv(&["log", "--oneline", "-20", "--", "src"])
        );
    }

    #[test]
    fn test_explicit_count_kept() {
        assert_eq!(
            capture_args(&flags(&["--ai-analysis", "-n", "5"])),
            argv(&["log", "-n", "5"])
        );
        assert_eq!(
            capture_args(&flags(&["--ai-analysis", "-3", "main"])),
            argv(&["log", "-3", "main"])
        );
    }

    #[test]
    fn test_count_detection() {
        assert!(has_count_limit(&argv(&["--max-count=7"])));
        assert!(has_count_limit(&argv(&["-15"])));
        assert!(!has_count_limit(&argv(&["--no-merges", "main"])));
    }

    #[tokio::test]
    async fn test_without_analysis_forwards() {
        let vcs = FakeVcs::new().exit("log --oneline --graph", 0);
        let log = vcs.log();
        let (mut session, _) = session(vcs, ScriptedTerminal::new(), None);

        let outcome = run(&mut session, &flags(&["--graph", "--oneline"]))
            .await
            .unwrap();

        assert_eq!(outcome, CommandOutcome::delegated(0));
        assert!(log.ran("log --oneline --graph"));
    }

    #[tokio::test]
    async fn test_analysis_uses_timeframe() {
        let vcs = FakeVcs::new().respond(
            "log --oneline -20",
            0,
            "a1 feat: add parser\nb2 fix: handle eof\n",
        );
        let provider = ScriptedProvider::replying(&["Mostly parser work."]);
        let (mut session, buffer) =
            session(vcs, ScriptedTerminal::new(), Some(provider.clone()));

        run(
            &mut session,
            &flags(&["--ai-analysis", "--ai-timeframe", "this sprint", "--oneline"]),
        )
        .await
        .unwrap();

        let prompt = &provider.prompts()[0];
        assert!(prompt.contains("this sprint"));
        assert!(prompt.contains("fix: handle eof"));

        let text = buffer.lock().unwrap().clone();
        assert!(text.find("=== GIT LOG ===").unwrap() < text.find("=== AI ANALYSIS ===").unwrap());
        assert!(text.contains("Log analysis:"));
    }

    #[tokio::test]
    async fn test_empty_history() {
        let provider = ScriptedProvider::replying(&["unused"]);
        let (mut session, buffer) =
            session(FakeVcs::new(), ScriptedTerminal::new(), Some(provider.clone()));

        run(&mut session, &flags(&["--ai-analysis"])).await.unwrap();

        assert!(buffer.lock().unwrap().contains("No commits found"));
        assert!(provider.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_empty_history_skips_setup() {
        let (mut session, buffer) = session(FakeVcs::new(), ScriptedTerminal::new(), None);
        session.config.llm.api_key = None;

        let outcome = run(&mut session, &flags(&["--ai-analysis"])).await.unwrap();

        assert_eq!(outcome.exit_code, 0);
        let text = buffer.lock().unwrap().clone();
        assert!(text.contains("No commits found"));
        assert!(!text.contains("Running setup"));
    }
}
