//! Prompt Builder System
//!
//! Standardized prompt construction for the git tasks.
//!
//! ## Design Principles
//!
//! 1. **Role Definition**: one sentence stating who the model is
//! 2. **Context Sections**: `=== HEADER ===` blocks holding budgeted input
//! 3. **Structured Objectives**: numbered requirements for the answer
//! 4. **Examples**: explicit bad/good pairs where wording matters
//! 5. **Closing Instruction**: what to return and nothing else

mod templates;

pub use templates::{AssembledPrompt, CommitContext, PromptAssembler, language_directive};

/// Prompt block types
#[derive(Debug, Clone)]
enum Block {
    Role(String),
    Section { header: String, content: String },
    Objectives { title: String, items: Vec<String> },
    Bullets { title: String, items: Vec<String> },
    Examples { bad: Vec<String>, good: Vec<String> },
    Text(String),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    blocks: Vec<Block>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, role: &str) -> Self {
        self.blocks.push(Block::Role(role.to_string()));
        self
    }

    /// Add a `=== HEADER ===` block with raw content
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.blocks.push(Block::Section {
            header: header.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add a numbered list under a title line
    pub fn objectives(mut self, title: &str, items: &[&str]) -> Self {
        self.blocks.push(Block::Objectives {
            title: title.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn bullets(mut self, title: &str, items: &[&str]) -> Self {
        self.blocks.push(Block::Bullets {
            title: title.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn examples(mut self, bad: &[&str], good: &[&str]) -> Self {
        self.blocks.push(Block::Examples {
            bad: bad.iter().map(|s| s.to_string()).collect(),
            good: good.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn text(mut self, content: &str) -> Self {
        self.blocks.push(Block::Text(content.to_string()));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for block in self.blocks {
            match block {
                Block::Role(role) => {
                    prompt.push_str(&role);
                    prompt.push_str("\n\n");
                }
                Block::Section { header, content } => {
                    prompt.push_str(&format!("=== {} ===\n", header));
                    prompt.push_str(content.trim_end());
                    prompt.push_str("\n\n");
                }
                Block::Objectives { title, items } => {
                    prompt.push_str(&title);
                    prompt.push('\n');
                    for (i, item) in items.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, item));
                    }
                    prompt.push('\n');
                }
                Block::Bullets { title, items } => {
                    prompt.push_str(&title);
                    prompt.push('\n');
                    for item in items {
                        prompt.push_str(&format!("- {}\n", item));
                    }
                    prompt.push('\n');
                }
                Block::Examples { bad, good } => {
                    prompt.push_str("Examples:\n");
                    for (b, g) in bad.iter().zip(good.iter()) {
                        prompt.push_str(&format!("WRONG: {}\nCORRECT: {}\n", b, g));
                    }
                    prompt.push('\n');
                }
                Block::Text(content) => {
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("You are a careful reviewer.")
            .objectives("Provide:", &["Summary", "Impact"])
            .build();

        assert!(prompt.starts_with("You are a careful reviewer."));
        assert!(prompt.contains("Provide:\n1. Summary\n2. Impact"));
    }

    #[test]
    fn test_section_header() {
        let prompt = PromptBuilder::new()
            .section("GIT DIFF", "+added line\n")
            .text("Respond briefly.")
            .build();

        assert_eq!(prompt, "=== GIT DIFF ===\n+added line\n\nRespond briefly.");
    }

    #[test]
    fn test_examples_pairs() {
        let prompt = PromptBuilder::new()
            .examples(&["fix(db): change query"], &["fix(db): stop leaking cursors"])
            .build();

        assert!(prompt.contains("WRONG: fix(db): change query"));
        assert!(prompt.contains("CORRECT: fix(db): stop leaking cursors"));
    }

    #[test]
    fn test_bullets() {
        let prompt = PromptBuilder::new()
            .bullets("Consider:", &["tests", "docs"])
            .build();
        assert_eq!(prompt, "Consider:\n- tests\n- docs");
    }
}
