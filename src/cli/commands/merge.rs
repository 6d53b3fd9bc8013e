//! Merge Command
//!
//! With `--ai-help` or `--ai-message` the merge is first attempted with
//! `--no-commit`. Conflicts are listed (and explained with `--ai-help`) and
//! left for the user to resolve. A clean attempt is committed here, with a
//! generated message when `--ai-message` is set.

use tracing::{debug, warn};

use super::commit::report_budget;
use super::{CommandOutcome, finalize, forward};
use crate::cli::flags::{FlagSet, FlagSpec};
use crate::cli::progress::stream_response;
use crate::cli::session::Session;
use crate::git::{GitQueries, to_args};
use crate::types::{Result, ResultExt, SgitError};

const NO_CHANGES: &str = "Unable to get merge changes";

pub const FLAGS: &[FlagSpec] = &[
    // sgit
    FlagSpec::bool("ai-help", "Explain merge conflicts with Solar LLM").augmentation(),
    FlagSpec::bool("ai-message", "Generate the merge commit message").augmentation(),
    // git
    FlagSpec::bool("commit", "Commit the result"),
    FlagSpec::bool("no-commit", "Stop before committing"),
    FlagSpec::bool("edit", "Edit the merge message").short('e'),
    FlagSpec::bool("no-edit", "Accept the generated merge message"),
    FlagSpec::bool("ff", "Fast-forward when possible"),
    FlagSpec::bool("no-ff", "Always create a merge commit"),
    FlagSpec::bool("ff-only", "Refuse anything but a fast-forward"),
    FlagSpec::optional("log", "Add one-line descriptions of merged commits"),
    FlagSpec::bool("no-log", "Do not list merged commits"),
    FlagSpec::bool("stat", "Show a diffstat"),
    FlagSpec::bool("no-stat", "Do not show a diffstat"),
    FlagSpec::bool("squash", "Squash the merged changes"),
    FlagSpec::bool("no-squash", "Do not squash"),
    FlagSpec::value("strategy", "Merge strategy").short('s'),
    FlagSpec::value("strategy-option", "Strategy option").short('X'),
    FlagSpec::bool("verify-signatures", "Verify commit signatures"),
    FlagSpec::bool("no-verify-signatures", "Do not verify signatures"),
    FlagSpec::bool("summary", "Synonym for --stat"),
    FlagSpec::bool("no-summary", "Synonym for --no-stat"),
    FlagSpec::value("message", "Merge commit message").short('m'),
    FlagSpec::bool("quiet", "Be quiet").short('q'),
    FlagSpec::bool("verbose", "Be verbose").short('v'),
    FlagSpec::bool("progress", "Force progress output"),
    FlagSpec::bool("no-progress", "Disable progress output"),
    FlagSpec::bool("allow-unrelated-histories", "Allow merging unrelated histories"),
    FlagSpec::bool("continue", "Conclude a merge after resolving conflicts").bypass(),
    FlagSpec::bool("abort", "Abort the current merge").bypass(),
    FlagSpec::bool("quit", "Forget the current merge").bypass(),
];

pub async fn run(session: &mut Session, flags: &FlagSet) -> Result<CommandOutcome> {
    let ai_help = flags.is_set("ai-help");
    let ai_message = flags.is_set("ai-message");
    if flags.bypasses_ai() || (!ai_help && !ai_message) {
        return forward(session.vcs.as_ref(), "merge", flags);
    }

    session.vcs.ensure_work_tree()?;
    let Some(source) = flags.positionals().first().cloned() else {
        return Err(SgitError::Usage("no branch specified for merge".to_string()));
    };
    let provider = session.ensure_provider()?;
    let target = session.vcs.current_branch()?;

    session.output.info(&format!(
        "Attempting to merge {} into {}...",
        source, target
    ));

    let mut args = vec!["merge".to_string()];
    args.extend(flags.flags_without(&["commit", "no-commit"]));
    args.push("--no-commit".to_string());
    args.extend(flags.positionals().iter().cloned());
    let code = session.vcs.run_interactive(&args)?;

    if code != 0 {
        let conflicted = session.vcs.conflicted_files()?;
        if conflicted.is_empty() {
            return Err(SgitError::git("merge", code, ""));
        }

        session.output.warning("Merge conflicts detected!");
        session.output.line("Conflicted files:");
        for path in &conflicted {
            session.output.item(path);
        }

        if ai_help {
            let prompt = session.assembler().merge_conflict_guidance(&conflicted);
            session.output.banner("AI MERGE CONFLICT ASSISTANCE");
            if let Err(e) = stream_response(
                provider.as_ref(),
                &prompt.text,
                &session.output,
                "Thinking...",
            )
            .await
            {
                warn!("Conflict guidance failed: {}", e);
                session
                    .output
                    .warning(&format!("Could not get AI assistance: {}", e));
            }
        }

        session.output.blank();
        session.output.line("To complete the merge:");
        session.output.line("1. Resolve conflicts in the files above");
        session.output.line("2. Stage resolved files: git add <resolved-files>");
        session.output.line("3. Complete the merge: sgit merge --continue");
        return Ok(CommandOutcome::done());
    }

    if !session.vcs.merge_in_progress()? {
        debug!("No MERGE_HEAD after merge of {}", source);
        session.output.success("Merge completed (fast-forward)");
        return Ok(CommandOutcome::done());
    }

    let commit_args = if ai_message {
        let changes = match session.vcs.commits_between(&target, &source) {
            Ok(changes) if !changes.trim().is_empty() => changes,
            Ok(_) => NO_CHANGES.to_string(),
            Err(e) => {
                debug!("Merge changes unavailable: {}", e);
                NO_CHANGES.to_string()
            }
        };
        let prompt = session.assembler().merge_message(&source, &target, &changes);
        report_budget(&session.output, "Merge analysis", &prompt);

        session.output.info("Generating merge commit message...");
        let message = stream_response(
            provider.as_ref(),
            &prompt.text,
            &session.output,
            "Thinking...",
        )
        .await
        .with_context("Error generating merge message")?;

        let mut args = to_args(&["commit", "-m"]);
        args.push(message);
        args
    } else if let Some(message) = flags.value("message") {
        to_args(&["commit", "-m", message])
    } else {
        to_args(&["commit", "--no-edit"])
    };

    finalize(session.vcs.as_ref(), commit_args).with_context("Error committing merge")?;
    session
        .output
        .success(&format!("Merged {} into {}", source, target));

    Ok(CommandOutcome::done())
}
