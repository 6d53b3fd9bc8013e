use std::io::Write;
#[cfg(test)]
use std::sync::{Arc, Mutex};

use console::style;

#[derive(Debug, Clone)]
enum Sink {
    Console,
    #[cfg(test)]
    Buffer(Arc<Mutex<String>>),
}

/// User-facing output. Status lines go through the styled helpers, model
/// text through [`print`](Output::print) so deltas appear as they arrive.
#[derive(Debug, Clone)]
pub struct Output {
    sink: Sink,
}

impl Output {
    pub fn new() -> Self {
        Self {
            sink: Sink::Console,
        }
    }

    /// Output captured into memory, with ANSI styling removed
    #[cfg(test)]
    pub(crate) fn captured() -> (Self, Arc<Mutex<String>>) {
        let buffer = Arc::new(Mutex::new(String::new()));
        (
            Self {
                sink: Sink::Buffer(Arc::clone(&buffer)),
            },
            buffer,
        )
    }

    fn write_out(&self, text: &str) {
        match &self.sink {
            Sink::Console => {
                let mut stdout = std::io::stdout().lock();
                let _ = stdout.write_all(text.as_bytes());
                let _ = stdout.flush();
            }
            #[cfg(test)]
            Sink::Buffer(buffer) => {
                if let Ok(mut buffer) = buffer.lock() {
                    buffer.push_str(&console::strip_ansi_codes(text));
                }
            }
        }
    }

    fn write_err(&self, text: &str) {
        match &self.sink {
            Sink::Console => {
                let mut stderr = std::io::stderr().lock();
                let _ = stderr.write_all(text.as_bytes());
            }
            #[cfg(test)]
            Sink::Buffer(_) => self.write_out(text),
        }
    }

    /// Raw text without a trailing newline, flushed immediately
    pub fn print(&self, text: &str) {
        self.write_out(text);
    }

    pub fn line(&self, text: &str) {
        self.write_out(&format!("{}\n", text));
    }

    pub fn blank(&self) {
        self.write_out("\n");
    }

    pub fn success(&self, message: &str) {
        self.line(&format!("{} {}", style("✓").green(), message));
    }

    pub fn error(&self, message: &str) {
        self.write_err(&format!("{} {}\n", style("✗").red(), message));
    }

    pub fn warning(&self, message: &str) {
        self.write_err(&format!("{} {}\n", style("⚠").yellow(), message));
    }

    pub fn info(&self, message: &str) {
        self.line(&format!("{} {}", style("ℹ").blue(), message));
    }

    pub fn header(&self, message: &str) {
        self.line(&format!("\n{}", style(message).bold().underlined()));
    }

    /// `=== TITLE ===` banner separating git output from model output
    pub fn banner(&self, title: &str) {
        self.line(&style(format!("=== {} ===", title)).bold().to_string());
    }

    /// `- item` list, indented
    pub fn item(&self, text: &str) {
        self.line(&format!("  - {}", text));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_output_strips_styling() {
        let (output, buffer) = Output::captured();
        output.success("Committed");
        output.banner("AI SUMMARY");
        output.print("partial");
        output.print(" text");
        output.blank();

        let text = buffer.lock().unwrap().clone();
        assert_eq!(text, "✓ Committed\n=== AI SUMMARY ===\npartial text\n");
    }

    #[test]
    fn test_warnings_reach_buffer() {
        let (output, buffer) = Output::captured();
        output.warning("Invalid language code 'xx'");
        assert!(buffer.lock().unwrap().contains("⚠ Invalid language code 'xx'"));
    }
}
