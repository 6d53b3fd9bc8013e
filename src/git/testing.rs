//! In-memory git double for command tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{Captured, Vcs};
use crate::types::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Interactive(Vec<String>),
    Captured(Vec<String>),
}

/// Shared view of every invocation a [`FakeVcs`] received
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call);
        }
    }

    pub fn all(&self) -> Vec<Call> {
        self.0.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Argument vectors of interactive runs, in order
    pub fn interactive(&self) -> Vec<Vec<String>> {
        self.all()
            .into_iter()
            .filter_map(|c| match c {
                Call::Interactive(args) => Some(args),
                Call::Captured(_) => None,
            })
            .collect()
    }

    pub fn ran(&self, joined: &str) -> bool {
        self.all().iter().any(|c| match c {
            Call::Interactive(args) | Call::Captured(args) => args.join(" ") == joined,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakeVcs {
    captured: HashMap<String, Captured>,
    interactive: HashMap<String, i32>,
    files: HashMap<String, Vec<u8>>,
    log: CallLog,
}

impl FakeVcs {
    /// Inside a work tree; every other query succeeds with empty output
    pub fn new() -> Self {
        Self {
            captured: HashMap::new(),
            interactive: HashMap::new(),
            files: HashMap::new(),
            log: CallLog::default(),
        }
        .respond("rev-parse --is-inside-work-tree", 0, "true\n")
    }

    pub fn respond(mut self, args: &str, code: i32, stdout: &str) -> Self {
        self.captured.insert(
            args.to_string(),
            Captured {
                code,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
        self
    }

    pub fn respond_err(mut self, args: &str, code: i32, stderr: &str) -> Self {
        self.captured.insert(
            args.to_string(),
            Captured {
                code,
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    pub fn exit(mut self, args: &str, code: i32) -> Self {
        self.interactive.insert(args.to_string(), code);
        self
    }

    pub fn file(mut self, path: &str, content: &[u8]) -> Self {
        self.files.insert(path.to_string(), content.to_vec());
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl Vcs for FakeVcs {
    fn run_interactive(&self, args: &[String]) -> Result<i32> {
        self.log.push(Call::Interactive(args.to_vec()));
        Ok(self.interactive.get(&args.join(" ")).copied().unwrap_or(0))
    }

    fn run_captured(&self, args: &[String]) -> Result<Captured> {
        self.log.push(Call::Captured(args.to_vec()));
        Ok(self
            .captured
            .get(&args.join(" "))
            .cloned()
            .unwrap_or_default())
    }

    fn read_file(&self, path: &str) -> std::io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
    }

    fn file_size(&self, path: &str) -> Option<u64> {
        self.files.get(path).map(|f| f.len() as u64)
    }
}
