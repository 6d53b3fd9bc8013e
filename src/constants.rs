//! Global Constants
//!
//! Centralized constants for budgeting, the completion endpoint and git
//! inspection limits. All magic numbers should be defined here.

/// Prompt budget constants
pub mod budget {
    /// Maximum words of variable content placed in one prompt
    pub const MAX_INPUT_WORDS: usize = 27_000;

    /// Conservative tokens-per-word multiplier for mixed code and prose
    pub const TOKENS_PER_WORD: f64 = 1.5;

    /// Appended to any section cut short
    pub const TRUNCATION_MARKER: &str = "\n\n[... truncated to stay within token limit ...]";

    /// Share of the remaining budget for primary content (diff, log)
    pub const PRIMARY_WEIGHT: f64 = 0.60;

    /// Share for secondary context (file list)
    pub const SECONDARY_WEIGHT: f64 = 0.25;

    /// Share for tertiary context (recent commits)
    pub const TERTIARY_WEIGHT: f64 = 0.15;

    /// Fixed sections larger than this fraction of the budget are cut down
    pub const FIXED_SECTION_DIVISOR: usize = 4;
}

/// Completion endpoint constants
pub mod llm {
    pub const DEFAULT_ENDPOINT: &str = "https://api.upstage.ai/v1/chat/completions";

    pub const DEFAULT_MODEL: &str = "solar-pro2-preview";

    /// Reasoning block delimiters emitted by some models
    pub const THINK_OPEN: &str = "<think>";
    pub const THINK_CLOSE: &str = "</think>";

    /// Prefix of every event line in a streamed response
    pub const STREAM_PREFIX: &str = "data: ";

    /// Sentinel payload that ends a stream
    pub const STREAM_DONE: &str = "[DONE]";
}

/// Progress indicator constants
pub mod progress {
    pub const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

    pub const SPINNER_INTERVAL_MS: u64 = 100;
}

/// Git inspection limits
pub mod git {
    /// Commits included as recent history context
    pub const RECENT_COMMITS: usize = 5;

    /// Log length used when the user gave no count limit
    pub const DEFAULT_LOG_COUNT: &str = "-20";

    /// Files above this size are never sent for analysis
    pub const LARGE_FILE_BYTES: u64 = 1024 * 1024;

    /// Bytes inspected for NUL when sniffing binary content
    pub const BINARY_SNIFF_BYTES: usize = 512;

    /// File content cap for stage decisions
    pub const STAGE_CONTENT_BYTES: usize = 4096;

    /// Added files up to this size get a content preview in the file list
    pub const PREVIEW_MAX_BYTES: u64 = 50 * 1024;

    /// Lines shown in a file preview
    pub const PREVIEW_LINES: usize = 20;

    pub const BINARY_EXTENSIONS: &[&str] = &[
        "exe", "dll", "so", "dylib", "a", "o", "obj", "jpg", "jpeg", "png", "gif", "bmp", "ico",
        "tiff", "svg", "mp3", "mp4", "avi", "mov", "mkv", "flv", "wav", "zip", "tar", "gz", "bz2",
        "xz", "7z", "rar", "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "bin", "dat", "db",
        "sqlite", "sqlite3",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let sum = budget::PRIMARY_WEIGHT + budget::SECONDARY_WEIGHT + budget::TERTIARY_WEIGHT;
        assert!((sum - 1.0).abs() < f64::EPSILON);
    }
}
