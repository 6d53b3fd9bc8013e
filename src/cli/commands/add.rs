//! Add Command
//!
//! `sgit add <paths>` is plain `git add`. With `--all-ai` each untracked file
//! is shown to the model, which answers `YES:` or `NO:` with a reason; the
//! recommended files are staged after confirmation.

use tracing::{debug, warn};

use super::{CommandOutcome, finalize, forward};
use crate::cli::flags::{FlagSet, FlagSpec};
use crate::cli::session::Session;
use crate::constants::git::STAGE_CONTENT_BYTES;
use crate::git::GitQueries;
use crate::types::{Result, ResultExt};

const UNCLEAR: &str = "AI response unclear, skipping for safety";

pub const FLAGS: &[FlagSpec] = &[
    // sgit
    FlagSpec::bool("all-ai", "Analyze untracked files and add the recommended ones")
        .augmentation(),
    FlagSpec::bool("force-ai", "Add every eligible file without asking the model")
        .augmentation(),
    FlagSpec::bool("dry-run-ai", "Show recommendations without adding").augmentation(),
    FlagSpec::bool("ai", "Analyze the given paths instead of plain git add").augmentation(),
    // git
    FlagSpec::bool("all", "Add changes from all tracked and untracked files")
        .short('A')
        .bypass(),
    FlagSpec::bool("update", "Update tracked files").short('u').bypass(),
    FlagSpec::bool("patch", "Interactively choose hunks").short('p').bypass(),
    FlagSpec::bool("verbose", "Be verbose").short('v').bypass(),
    FlagSpec::bool("dry-run", "Dry run").short('n').bypass(),
    FlagSpec::bool("force", "Allow adding otherwise ignored files")
        .short('f')
        .bypass(),
    FlagSpec::bool("ignore-errors", "Continue past unreadable files").bypass(),
    FlagSpec::bool("ignore-missing", "Check whether missing files would be ignored").bypass(),
    FlagSpec::bool("no-warn-embedded-repo", "Do not warn about embedded repositories").bypass(),
    FlagSpec::bool("renormalize", "Renormalize tracked files").bypass(),
    FlagSpec::value("chmod", "Override the executable bit (+x or -x)").bypass(),
    FlagSpec::bool("intent-to-add", "Record only that the path will be added")
        .short('N')
        .bypass(),
    FlagSpec::bool("refresh", "Refresh stat information only").bypass(),
    FlagSpec::bool("ignore-removal", "Ignore removed files").bypass(),
    FlagSpec::value("pathspec-from-file", "Read pathspec from file").bypass(),
    FlagSpec::bool("pathspec-file-nul", "NUL-separated pathspec file").bypass(),
];

/// Model verdict for one file
#[derive(Debug, Clone, PartialEq, Eq)]
struct Decision {
    add: bool,
    reason: String,
}

pub async fn run(session: &mut Session, flags: &FlagSet) -> Result<CommandOutcome> {
    session.vcs.ensure_work_tree()?;

    let explicit_ai = flags.is_set("ai");
    let all_ai = flags.is_set("all-ai");
    let mut paths = flags.positionals().to_vec();
    paths.extend(flags.pathspecs().iter().cloned());

    if flags.bypasses_ai() && !explicit_ai {
        return forward(session.vcs.as_ref(), "add", flags);
    }
    if !explicit_ai && !all_ai {
        if !paths.is_empty() {
            return forward(session.vcs.as_ref(), "add", flags);
        }
        session
            .output
            .info("Use 'sgit add --all-ai' for AI analysis of untracked files");
        session
            .output
            .info("Use 'sgit add <files>' for standard git add behavior");
        return Ok(CommandOutcome::done());
    }

    let force = flags.is_set("force-ai");
    let dry_run = flags.is_set("dry-run-ai");
    let provider = if force {
        None
    } else {
        Some(session.ensure_provider()?)
    };

    let candidates = if explicit_ai && !paths.is_empty() {
        paths
    } else {
        session
            .vcs
            .untracked_files()
            .with_context("Error listing untracked files")?
    };
    if candidates.is_empty() {
        session.output.line("No untracked files found");
        return Ok(CommandOutcome::done());
    }

    session.output.info(&format!(
        "Found {} untracked files. Analyzing with Solar LLM...",
        candidates.len()
    ));

    let assembler = session.assembler();
    let mut selected = Vec::new();
    for path in candidates {
        if session.vcs.is_large_file(&path) {
            session
                .output
                .warning(&format!("Skipping large file: {}", path));
            continue;
        }
        if session.vcs.is_binary_file(&path) {
            session
                .output
                .warning(&format!("Skipping binary file: {}", path));
            continue;
        }

        let Some(provider) = &provider else {
            session
                .output
                .success(&format!("Will add: {} (force mode)", path));
            selected.push(path);
            continue;
        };

        let content = match session.vcs.read_file(&path) {
            Ok(bytes) => cap_content(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                session
                    .output
                    .error(&format!("Error analyzing {}: {}", path, e));
                continue;
            }
        };

        let prompt = assembler.stage_decision(&path, &content);
        let decision = match provider.complete(&prompt.text).await {
            Ok(response) => parse_decision(&response),
            Err(e) => {
                warn!("Stage decision for {} failed: {}", path, e);
                session
                    .output
                    .error(&format!("Error analyzing {}: {}", path, e));
                continue;
            }
        };
        debug!("{}: add={} ({})", path, decision.add, decision.reason);

        if decision.add {
            session
                .output
                .success(&format!("Will add: {} - {}", path, decision.reason));
            selected.push(path);
        } else {
            session
                .output
                .line(&format!("Skip: {} - {}", path, decision.reason));
        }
    }

    if selected.is_empty() {
        session.output.line("No files recommended for adding");
        return Ok(CommandOutcome::done());
    }

    session.output.blank();
    session.output.line("Files to be added:");
    for path in &selected {
        session.output.item(path);
    }

    if dry_run {
        session.output.blank();
        session.output.info("[DRY RUN] No files were actually added");
        return Ok(CommandOutcome::done());
    }

    if !force && !session.terminal.confirm("Add these files?")? {
        session.output.line("Add cancelled");
        return Ok(CommandOutcome::done());
    }

    let mut args = vec!["add".to_string(), "--".to_string()];
    args.extend(selected.iter().cloned());
    finalize(session.vcs.as_ref(), args).with_context("Error adding files")?;
    session
        .output
        .success(&format!("Successfully added {} files", selected.len()));

    Ok(CommandOutcome::done())
}

/// Cap file content sent to the model, cutting on a character boundary
fn cap_content(content: &str) -> String {
    if content.len() <= STAGE_CONTENT_BYTES {
        return content.to_string();
    }
    let mut end = STAGE_CONTENT_BYTES;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\n... [truncated]", &content[..end])
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// `YES: reason` or `NO: reason`; a repeated prefix is tolerated and
/// anything else means do not add
fn parse_decision(response: &str) -> Decision {
    let text = response.trim();
    for (prefix, add) in [("YES:", true), ("NO:", false)] {
        if let Some(rest) = strip_prefix_ignore_case(text, prefix) {
            let rest = rest.trim_start();
            let rest = strip_prefix_ignore_case(rest, prefix).unwrap_or(rest);
            return Decision {
                add,
                reason: rest.trim().to_string(),
            };
        }
    }
    Decision {
        add: false,
        reason: UNCLEAR.to_string(),
    }
}
