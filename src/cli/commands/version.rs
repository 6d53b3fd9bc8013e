//! Version Command

use super::CommandOutcome;
use crate::cli::ui::Output;

pub fn run(output: &Output) -> CommandOutcome {
    output.line(&format!("sgit version {}", env!("CARGO_PKG_VERSION")));
    output.line("Solar LLM-powered git wrapper");
    output.line("Adds AI commit messages, diff summaries, log analysis and merge help to git");
    CommandOutcome::done()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_line() {
        let (output, buffer) = Output::captured();
        assert_eq!(run(&output), CommandOutcome::done());
        assert!(
            buffer
                .lock()
                .unwrap()
                .starts_with(&format!("sgit version {}\n", env!("CARGO_PKG_VERSION")))
        );
    }
}
