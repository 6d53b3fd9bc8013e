//! Interactive prompts
//!
//! Every question the commands ask goes through [`Terminal`], so flows can be
//! driven by a scripted double in tests.

use std::io;

use console::Term;

use crate::cli::editor::{self, EditorCommand};
use crate::types::{Result, SgitError};

pub trait Terminal: Send + Sync {
    /// One line of input, without the newline
    fn read_line(&self, prompt: &str) -> Result<String>;

    /// One line of input with echo disabled
    fn read_secret(&self, prompt: &str) -> Result<String>;

    /// Open `initial` in the editor and return the edited text
    fn edit(&self, editor: &EditorCommand, initial: &str) -> Result<String>;

    /// `y`/`yes` (any case) is yes, anything else no
    fn confirm(&self, prompt: &str) -> Result<bool> {
        let answer = self.read_line(&format!("{} (y/n): ", prompt))?;
        Ok(matches!(
            answer.trim().to_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}

/// Prompts on the controlling terminal
#[derive(Debug, Clone)]
pub struct ConsoleTerminal {
    term: Term,
}

impl ConsoleTerminal {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    fn ask(&self, prompt: &str, secret: bool) -> Result<String> {
        self.term.write_str(prompt).map_err(interrupted)?;
        self.term.flush().map_err(interrupted)?;
        let line = if secret {
            self.term.read_secure_line()
        } else {
            self.term.read_line()
        };
        line.map_err(interrupted)
    }
}

impl Default for ConsoleTerminal {
    fn default() -> Self {
        Self::new()
    }
}

fn interrupted(e: io::Error) -> SgitError {
    match e.kind() {
        io::ErrorKind::Interrupted | io::ErrorKind::UnexpectedEof => SgitError::Cancelled,
        _ => SgitError::Io(e),
    }
}

impl Terminal for ConsoleTerminal {
    fn read_line(&self, prompt: &str) -> Result<String> {
        self.ask(prompt, false)
    }

    fn read_secret(&self, prompt: &str) -> Result<String> {
        self.ask(prompt, true)
    }

    fn edit(&self, editor: &EditorCommand, initial: &str) -> Result<String> {
        editor::edit_text(editor, initial)
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Answers queued up front; an exhausted queue reads as cancellation
    #[derive(Debug, Clone, Default)]
    pub(crate) struct ScriptedTerminal {
        lines: Arc<Mutex<VecDeque<String>>>,
        secrets: Arc<Mutex<VecDeque<String>>>,
        edits: Arc<Mutex<VecDeque<String>>>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    fn pop(queue: &Mutex<VecDeque<String>>) -> Result<String> {
        queue
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .ok_or(SgitError::Cancelled)
    }

    impl ScriptedTerminal {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn line(self, answer: &str) -> Self {
            self.lines.lock().unwrap().push_back(answer.to_string());
            self
        }

        pub fn secret(self, answer: &str) -> Self {
            self.secrets.lock().unwrap().push_back(answer.to_string());
            self
        }

        pub fn edited(self, text: &str) -> Self {
            self.edits.lock().unwrap().push_back(text.to_string());
            self
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl Terminal for ScriptedTerminal {
        fn read_line(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            pop(&self.lines)
        }

        fn read_secret(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            pop(&self.secrets)
        }

        fn edit(&self, _editor: &EditorCommand, _initial: &str) -> Result<String> {
            pop(&self.edits).map(|text| editor::strip_comments(&text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::scripted::ScriptedTerminal;
    use super::*;

    #[test]
    fn test_confirm_accepts_yes_variants() {
        let term = ScriptedTerminal::new().line("Y").line(" yes ").line("sure");
        assert!(term.confirm("Add these files?").unwrap());
        assert!(term.confirm("Add these files?").unwrap());
        assert!(!term.confirm("Add these files?").unwrap());
        assert_eq!(term.prompts()[0], "Add these files? (y/n): ");
    }

    #[test]
    fn test_exhausted_script_is_cancellation() {
        let term = ScriptedTerminal::new();
        assert!(matches!(term.read_line("?"), Err(SgitError::Cancelled)));
    }

    #[test]
    fn test_eof_maps_to_cancelled() {
        let err = interrupted(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(err.is_cancelled());
    }
}
