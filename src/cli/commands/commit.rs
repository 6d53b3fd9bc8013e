//! Commit Command
//!
//! Generates the commit message from the staged change set unless the user
//! supplied one (`-m`, `-F`) or passed `--no-ai`. `--ai` forces generation
//! even with a message; `--no-ai` always wins.
//!
//! Resolve modes: editor (default), `--skip-editor` (y/n confirmation),
//! `-i` (type a replacement, Enter keeps the generated text).

use tracing::debug;

use super::{CommandOutcome, finalize, forward};
use crate::ai::{AssembledPrompt, CommitContext};
use crate::cli::editor::resolve_editor;
use crate::cli::flags::{FlagSet, FlagSpec};
use crate::cli::progress::stream_response;
use crate::cli::session::Session;
use crate::cli::ui::Output;
use crate::constants::git::{PREVIEW_LINES, PREVIEW_MAX_BYTES};
use crate::git::{GitQueries, Vcs, to_args};
use crate::types::{Result, ResultExt, SgitError};

pub const FLAGS: &[FlagSpec] = &[
    // sgit
    FlagSpec::bool("no-ai", "Skip AI generation and use standard git commit")
        .augmentation()
        .bypass(),
    FlagSpec::bool("interactive", "Review the AI message in the terminal")
        .short('i')
        .augmentation(),
    FlagSpec::bool("skip-editor", "Use the AI message after a y/n confirmation").augmentation(),
    FlagSpec::bool("ai", "Force AI generation even with -m").augmentation(),
    // git
    FlagSpec::value("message", "Commit message").short('m').bypass(),
    FlagSpec::bool("all", "Stage modified and deleted files first").short('a'),
    FlagSpec::bool("amend", "Amend the last commit"),
    FlagSpec::bool("verbose", "Show unified diff between HEAD and index").short('v'),
    FlagSpec::bool("allow-empty", "Allow empty commits"),
    FlagSpec::bool("allow-empty-message", "Allow an empty commit message"),
    FlagSpec::value("author", "Override the commit author"),
    FlagSpec::value("date", "Override the author date"),
    FlagSpec::bool("signoff", "Add a Signed-off-by trailer").short('s'),
    FlagSpec::bool("patch", "Interactively select hunks").short('p'),
    FlagSpec::value("fixup", "Create a fixup commit"),
    FlagSpec::value("squash", "Create a squash commit"),
    FlagSpec::bool("reset-author", "Reset author information"),
    FlagSpec::value("file", "Read the commit message from a file")
        .short('F')
        .bypass(),
    FlagSpec::value("template", "Use the given template file").short('t'),
    FlagSpec::bool("edit", "Force edit of the commit message").short('e'),
    FlagSpec::bool("no-edit", "Reuse the message without editing"),
    FlagSpec::bool("no-verify", "Bypass pre-commit and commit-msg hooks").short('n'),
    FlagSpec::bool("quiet", "Suppress commit summary").short('q'),
];

pub async fn run(session: &mut Session, flags: &FlagSet) -> Result<CommandOutcome> {
    session.vcs.ensure_work_tree()?;

    let bypass = flags.is_set("no-ai") || (flags.bypasses_ai() && !flags.is_set("ai"));
    if bypass {
        return forward(session.vcs.as_ref(), "commit", flags);
    }

    if flags.is_set("all") {
        session
            .output
            .info("Staging all modified and deleted files...");
        finalize(session.vcs.as_ref(), to_args(&["add", "-u"]))
            .with_context("Error staging files with -a")?;
    }

    if !session.vcs.has_staged_changes()? {
        session.output.line("No changes to commit");
        return Ok(CommandOutcome::done());
    }

    let provider = session.ensure_provider()?;

    let diff = session.vcs.staged_diff()?;
    if diff.trim().is_empty() {
        return Err(SgitError::Usage(
            "no diff found - make sure to add files with 'git add' first".to_string(),
        ));
    }

    let ctx = CommitContext {
        diff,
        branch: session.vcs.current_branch()?,
        recent_commits: session.vcs.recent_commits()?,
        file_list: enriched_file_list(session.vcs.as_ref())?,
    };
    let prompt = session.assembler().commit_message(&ctx);
    report_budget(&session.output, "Content analysis", &prompt);

    session
        .output
        .info("Generating commit message with Solar LLM...");
    let generated = stream_response(
        provider.as_ref(),
        &prompt.text,
        &session.output,
        "Thinking...",
    )
    .await
    .with_context("Error generating commit message")?;
    session.output.success("Commit message generated!");

    let Some(message) = resolve_message(session, flags, generated)? else {
        return Ok(CommandOutcome::done());
    };

    let mut args = to_args(&["commit", "-m"]);
    args.push(message);
    args.extend(flags.reconstruct_without(&["message", "file"]));
    finalize(session.vcs.as_ref(), args)?;

    Ok(CommandOutcome::done())
}

/// Pick the final message according to the resolve mode; `None` aborts
fn resolve_message(
    session: &Session,
    flags: &FlagSet,
    generated: String,
) -> Result<Option<String>> {
    if flags.is_set("interactive") {
        let input = session
            .terminal
            .read_line("Edit message (press Enter to use as-is): ")?;
        let input = input.trim();
        return Ok(Some(if input.is_empty() {
            generated
        } else {
            input.to_string()
        }));
    }

    if flags.is_set("skip-editor") {
        if session.terminal.confirm("Use this commit message?")? {
            return Ok(Some(generated));
        }
        session.output.line("Commit cancelled");
        return Ok(None);
    }

    let editor = resolve_editor(session.vcs.as_ref())?;
    let edited = session
        .terminal
        .edit(&editor, &generated)
        .with_context("Error opening editor")?;
    if edited.trim().is_empty() {
        session.output.line("Empty commit message, aborting commit");
        return Ok(None);
    }
    Ok(Some(edited))
}

/// Print the words sent and, when cut, the original size
pub(crate) fn report_budget(output: &Output, label: &str, prompt: &AssembledPrompt) {
    if prompt.truncated {
        output.info(&format!(
            "{}: {} words (truncated from {})",
            label, prompt.words_used, prompt.words_original
        ));
    } else {
        output.info(&format!("{}: {} words", label, prompt.words_used));
    }
}

/// Staged files with status and size; added text files get a short preview
fn enriched_file_list(vcs: &dyn Vcs) -> Result<String> {
    let files = vcs.staged_files()?;
    if files.is_empty() {
        return Ok("No files staged for commit".to_string());
    }

    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let size = vcs.file_size(&file.path);
        let size_label = size
            .map(|s| format!("{} bytes", s))
            .unwrap_or_else(|| "unknown".to_string());
        let mut entry = format!("- {} {} ({})", file.status, file.path, size_label);

        let previewable = file.is_added()
            && size.is_some_and(|s| s <= PREVIEW_MAX_BYTES)
            && !vcs.is_binary_file(&file.path);
        if previewable {
            match vcs.read_file(&file.path) {
                Ok(bytes) => {
                    entry.push_str("\n  Content preview:\n");
                    entry.push_str(&preview(&String::from_utf8_lossy(&bytes)));
                }
                Err(e) => debug!("No preview for {}: {}", file.path, e),
            }
        }
        entries.push(entry);
    }

    Ok(entries.join("\n"))
}

fn preview(content: &str) -> String {
    let mut lines = content.lines();
    let mut shown: Vec<String> = lines
        .by_ref()
        .take(PREVIEW_LINES)
        .map(|l| format!("  {}", l))
        .collect();
    if lines.next().is_some() {
        shown.push("  ... (file continues)".to_string());
    }
    shown.join("\n")
}
