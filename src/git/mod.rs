//! Git Subprocess Collaborator
//!
//! The only way the crate talks to git. Two modes:
//!
//! - **interactive**: stdio inherited, exit code returned (commit, merge, passthrough)
//! - **captured**: stdout/stderr fully buffered before anything parses them
//!
//! Queries built on top of those two live in [`GitQueries`].

#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::constants::git::{
    BINARY_EXTENSIONS, BINARY_SNIFF_BYTES, LARGE_FILE_BYTES, RECENT_COMMITS,
};
use crate::types::{Result, ResultExt, SgitError};

/// Buffered result of a captured git invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Version-control subprocess interface
pub trait Vcs: Send + Sync {
    /// Run with inherited stdio and return the exit code
    fn run_interactive(&self, args: &[String]) -> Result<i32>;

    /// Run with stdout and stderr buffered
    fn run_captured(&self, args: &[String]) -> Result<Captured>;

    /// Read a working tree file relative to the current directory
    fn read_file(&self, path: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn file_size(&self, path: &str) -> Option<u64> {
        std::fs::metadata(path).ok().map(|m| m.len())
    }
}

/// `git` found on PATH
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd
    }
}

impl Vcs for GitCli {
    fn run_interactive(&self, args: &[String]) -> Result<i32> {
        debug!("git {}", args.join(" "));
        let status = self
            .command(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context_fn(|| format!("failed to run {}", self.program))?;
        Ok(status.code().unwrap_or(1))
    }

    fn run_captured(&self, args: &[String]) -> Result<Captured> {
        debug!("git {} (captured)", args.join(" "));
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .with_context_fn(|| format!("failed to run {}", self.program))?;
        Ok(Captured {
            code: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// One entry of `git diff --cached --name-status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Status letter(s): A, M, D, R100, ...
    pub status: String,
    pub path: String,
}

impl StagedFile {
    pub fn is_added(&self) -> bool {
        self.status.starts_with('A')
    }
}

pub(crate) fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// Higher level queries over any [`Vcs`]
pub trait GitQueries {
    /// Captured run that must succeed; returns stdout
    fn output(&self, args: &[&str]) -> Result<String>;

    fn is_work_tree(&self) -> Result<bool>;

    fn ensure_work_tree(&self) -> Result<()> {
        if self.is_work_tree()? {
            Ok(())
        } else {
            Err(SgitError::NotARepository)
        }
    }

    /// `diff --cached --quiet`: 0 means clean, 1 means staged changes exist
    fn has_staged_changes(&self) -> Result<bool>;

    fn staged_diff(&self) -> Result<String> {
        self.output(&["diff", "--cached"])
    }

    fn staged_files(&self) -> Result<Vec<StagedFile>>;

    fn current_branch(&self) -> Result<String>;

    /// Last few non-merge commits, one per line; empty in a fresh repository
    fn recent_commits(&self) -> Result<String>;

    fn untracked_files(&self) -> Result<Vec<String>> {
        Ok(lines(&self.output(&["ls-files", "--others", "--exclude-standard"])?))
    }

    fn conflicted_files(&self) -> Result<Vec<String>> {
        Ok(lines(&self.output(&["diff", "--name-only", "--diff-filter=U"])?))
    }

    fn merge_in_progress(&self) -> Result<bool>;

    /// Known binary extension, or a NUL byte near the start of the file
    fn is_binary_file(&self, path: &str) -> bool;

    /// Over the 1 MiB analysis limit
    fn is_large_file(&self, path: &str) -> bool;

    /// One-line commits reachable from `source` but not `target`
    fn commits_between(&self, target: &str, source: &str) -> Result<String> {
        self.output(&[
            "log",
            "--oneline",
            "--no-merges",
            &format!("{}..{}", target, source),
        ])
    }
}

impl<T: Vcs + ?Sized> GitQueries for T {
    fn output(&self, args: &[&str]) -> Result<String> {
        let captured = self.run_captured(&to_args(args))?;
        if !captured.success() {
            return Err(SgitError::git(
                args.join(" "),
                captured.code,
                captured.stderr,
            ));
        }
        Ok(captured.stdout)
    }

    fn is_work_tree(&self) -> Result<bool> {
        let captured = self.run_captured(&to_args(&["rev-parse", "--is-inside-work-tree"]))?;
        Ok(captured.success() && captured.stdout.trim() == "true")
    }

    fn has_staged_changes(&self) -> Result<bool> {
        let captured = self.run_captured(&to_args(&["diff", "--cached", "--quiet"]))?;
        match captured.code {
            0 => Ok(false),
            1 if captured.stderr.trim().is_empty() => Ok(true),
            code => Err(SgitError::git("diff --cached --quiet", code, captured.stderr)),
        }
    }

    fn staged_files(&self) -> Result<Vec<StagedFile>> {
        let out = self.output(&["diff", "--cached", "--name-status"])?;
        Ok(out
            .lines()
            .filter_map(|line| {
                let mut fields = line.split('\t');
                let status = fields.next()?.trim();
                // renames and copies list old then new path
                let path = fields.last()?.trim();
                if status.is_empty() || path.is_empty() {
                    return None;
                }
                Some(StagedFile {
                    status: status.to_string(),
                    path: path.to_string(),
                })
            })
            .collect())
    }

    fn current_branch(&self) -> Result<String> {
        let branch = self.output(&["branch", "--show-current"])?;
        let branch = branch.trim();
        if branch.is_empty() {
            Ok("HEAD (detached)".to_string())
        } else {
            Ok(branch.to_string())
        }
    }

    fn recent_commits(&self) -> Result<String> {
        let count = RECENT_COMMITS.to_string();
        let captured =
            self.run_captured(&to_args(&["log", "--oneline", "--no-merges", "-n", &count]))?;
        if captured.success() {
            Ok(captured.stdout)
        } else {
            debug!("No commit history yet: {}", captured.stderr.trim());
            Ok(String::new())
        }
    }

    fn is_binary_file(&self, path: &str) -> bool {
        if extension(path).is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.as_str())) {
            return true;
        }
        match self.read_file(path) {
            Ok(bytes) => bytes.iter().take(BINARY_SNIFF_BYTES).any(|b| *b == 0),
            Err(_) => false,
        }
    }

    fn is_large_file(&self, path: &str) -> bool {
        self.file_size(path)
            .is_some_and(|size| size > LARGE_FILE_BYTES)
    }

    fn merge_in_progress(&self) -> Result<bool> {
        let captured = self.run_captured(&to_args(&["rev-parse", "-q", "--verify", "MERGE_HEAD"]))?;
        Ok(captured.success())
    }
}

fn lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Lowercased extension of a path, if any
pub fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::testing::FakeVcs;
    use super::*;

    #[test]
    fn test_staged_query_codes() {
        let vcs = FakeVcs::new().respond("diff --cached --quiet", 1, "");
        assert!(vcs.has_staged_changes().unwrap());

        let vcs = FakeVcs::new().respond("diff --cached --quiet", 0, "");
        assert!(!vcs.has_staged_changes().unwrap());

        let vcs = FakeVcs::new().respond_err("diff --cached --quiet", 128, "fatal: bad");
        assert!(vcs.has_staged_changes().is_err());
    }

    #[test]
    fn test_staged_files_handles_renames() {
        let vcs = FakeVcs::new().respond(
            "diff --cached --name-status",
            0,
            "A\tsrc/new.rs\nM\tREADME.md\nR100\told.rs\trenamed.rs\n",
        );
        let files = vcs.staged_files().unwrap();
        assert_eq!(files.len(), 3);
        assert!(files[0].is_added());
        assert_eq!(files[2].path, "renamed.rs");
        assert_eq!(files[2].status, "R100");
    }

    #[test]
    fn test_not_a_repository() {
        let vcs = FakeVcs::new().respond_err("rev-parse --is-inside-work-tree", 128, "fatal");
        assert!(matches!(
            vcs.ensure_work_tree(),
            Err(SgitError::NotARepository)
        ));
    }

    #[test]
    fn test_recent_commits_empty_history() {
        let vcs = FakeVcs::new().respond_err(
            "log --oneline --no-merges -n 5",
            128,
            "fatal: your current branch 'main' does not have any commits yet",
        );
        assert_eq!(vcs.recent_commits().unwrap(), "");
    }

    #[test]
    fn test_output_failure_names_operation() {
        let vcs = FakeVcs::new().respond_err("ls-files --others --exclude-standard", 2, "boom\n");
        let err = vcs.untracked_files().unwrap_err();
        assert_eq!(
            err.to_string(),
            "git ls-files --others --exclude-standard failed (exit 2): boom"
        );
    }

    #[test]
    fn test_detached_head() {
        let vcs = FakeVcs::new().respond("branch --show-current", 0, "\n");
        assert_eq!(vcs.current_branch().unwrap(), "HEAD (detached)");
    }

    #[test]
    fn test_binary_detection() {
        let vcs = FakeVcs::new()
            .file("logo.PNG", b"not really an image")
            .file("blob.txt", b"abc\0def")
            .file("notes.md", b"# Notes\n");
        assert!(vcs.is_binary_file("logo.PNG"));
        assert!(vcs.is_binary_file("blob.txt"));
        assert!(!vcs.is_binary_file("notes.md"));
        assert!(!vcs.is_binary_file("missing.rs"));
    }

    #[test]
    fn test_large_file() {
        let vcs = FakeVcs::new()
            .file("big.log", &vec![b'x'; (LARGE_FILE_BYTES + 1) as usize])
            .file("small.log", b"x");
        assert!(vcs.is_large_file("big.log"));
        assert!(!vcs.is_large_file("small.log"));
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("img/Logo.PNG").as_deref(), Some("png"));
        assert_eq!(extension("Makefile"), None);
    }
}
