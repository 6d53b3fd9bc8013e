//! Diff Command
//!
//! Prints the diff, then streams a summary of it. Output-shaping flags such
//! as `--stat` or `--name-only` are orthogonal to a summary and go straight
//! to git, as does `--no-ai`.

use super::commit::report_budget;
use super::{CommandOutcome, forward};
use crate::cli::flags::{FlagSet, FlagSpec};
use crate::cli::progress::stream_response;
use crate::cli::session::Session;
use crate::git::GitQueries;
use crate::types::{Result, ResultExt};

pub const FLAGS: &[FlagSpec] = &[
    FlagSpec::bool("no-ai", "Disable the AI summary").augmentation().bypass(),
    FlagSpec::bool("cached", "Show staged changes"),
    FlagSpec::bool("staged", "Synonym for --cached"),
    FlagSpec::bool("patch", "Generate patch").short('p'),
    FlagSpec::bool("stat", "Show diffstat").bypass(),
    FlagSpec::bool("numstat", "Show numeric diffstat").bypass(),
    FlagSpec::bool("shortstat", "Show only the summary line").bypass(),
    FlagSpec::bool("name-only", "Show only file names").bypass(),
    FlagSpec::bool("name-status", "Show file names and status").bypass(),
    FlagSpec::value("unified", "Lines of context").short('U').attached(),
    FlagSpec::bool("no-index", "Compare paths outside a repository").bypass(),
    FlagSpec::bool("ignore-space-change", "Ignore changes in amount of whitespace").short('b'),
    FlagSpec::bool("ignore-all-space", "Ignore all whitespace").short('w'),
    FlagSpec::bool("ignore-blank-lines", "Ignore blank line changes"),
    FlagSpec::optional("word-diff", "Show a word diff"),
    FlagSpec::optional("color", "Colored output"),
    FlagSpec::bool("no-color", "Disable colored output"),
    FlagSpec::optional("color-words", "Highlight changed words"),
    FlagSpec::bool("check", "Warn about whitespace errors").bypass(),
    FlagSpec::value("ws-error-highlight", "Highlight whitespace errors"),
];

pub async fn run(session: &mut Session, flags: &FlagSet) -> Result<CommandOutcome> {
    if flags.bypasses_ai() {
        return forward(session.vcs.as_ref(), "diff", flags);
    }

    session.vcs.ensure_work_tree()?;

    let mut args = vec!["diff".to_string()];
    args.extend(flags.reconstruct());
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let diff = session
        .vcs
        .output(&args)
        .with_context("Error getting git diff")?;
    if diff.trim().is_empty() {
        session.output.line("No changes found");
        return Ok(CommandOutcome::done());
    }

    let provider = session.ensure_provider()?;

    session.output.banner("GIT DIFF");
    session.output.line(&diff);
    session.output.blank();

    let prompt = session.assembler().diff_summary(&diff);
    report_budget(&session.output, "Diff analysis", &prompt);

    session.output.banner("AI SUMMARY");
    stream_response(
        provider.as_ref(),
        &prompt.text,
        &session.output,
        "Thinking...",
    )
    .await
    .with_context("Error generating diff summary")?;

    Ok(CommandOutcome::done())
}
