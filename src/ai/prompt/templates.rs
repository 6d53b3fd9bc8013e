//! Task templates
//!
//! One method per git task. Each budgets its inputs, fills a fixed template
//! and prefixes the response-language directive when one applies. Nothing
//! here touches the network or shared state.

use super::PromptBuilder;
use crate::ai::tokenizer::{PromptSection, SectionRole, TokenCounter};
use crate::config::Language;

const DIFF: &str = "diff";
const BRANCH: &str = "branch";
const RECENT: &str = "recent";
const FILES: &str = "files";

/// Directive asking the model to answer in `language`; `None` for English
pub fn language_directive(language: Language) -> Option<String> {
    if language == Language::English {
        return None;
    }
    let name = language.display_name();
    Some(format!(
        "IMPORTANT: Please respond in {}. All explanations, commit messages, summaries, and analysis should be written in {}.\n\n",
        name, name
    ))
}

/// Prompt text plus the budgeting figures behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub text: String,
    pub words_used: usize,
    pub words_original: usize,
    pub truncated: bool,
}

/// Inputs gathered for commit message generation
#[derive(Debug, Clone, Default)]
pub struct CommitContext {
    pub diff: String,
    pub branch: String,
    pub recent_commits: String,
    pub file_list: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PromptAssembler {
    language: Language,
    counter: TokenCounter,
}

impl PromptAssembler {
    pub fn new(language: Language, counter: TokenCounter) -> Self {
        Self { language, counter }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    fn finish(&self, body: String, words_used: usize, words_original: usize) -> AssembledPrompt {
        let text = match language_directive(self.language) {
            Some(directive) => format!("{}{}", directive, body),
            None => body,
        };
        AssembledPrompt {
            text,
            words_used,
            words_original,
            truncated: words_used < words_original,
        }
    }

    /// Ask whether one untracked file belongs in version control.
    /// `content` is expected to be pre-capped by the caller.
    pub fn stage_decision(&self, path: &str, content: &str) -> AssembledPrompt {
        let cut = self.counter.truncate_content(content);
        let original = TokenCounter::count_words(content);

        let body = PromptBuilder::new()
            .role("You are a helpful assistant that decides whether files in a software project should be tracked by git.")
            .text(&format!("File: {}", path))
            .section("CONTENT", &cut.text)
            .objectives(
                "Consider:",
                &[
                    "Is this source code, configuration or documentation that belongs in version control?",
                    "Is it a temporary file, log or build artifact that should be ignored?",
                    "Does it contain secrets such as passwords, keys or tokens?",
                    "Is it generated output that can be recreated from source?",
                ],
            )
            .bullets(
                "Respond with exactly one line:",
                &[
                    "\"YES: <brief reason>\" if the file should be added",
                    "\"NO: <brief reason>\" if it should not",
                ],
            )
            .text("Keep the reason under 50 characters.")
            .build();

        self.finish(body, cut.words_kept, original)
    }

    /// Conventional commit message from the staged change set
    pub fn commit_message(&self, ctx: &CommitContext) -> AssembledPrompt {
        let split = self.counter.split_budget(vec![
            PromptSection::new(DIFF, ctx.diff.as_str(), SectionRole::Primary),
            PromptSection::new(BRANCH, ctx.branch.as_str(), SectionRole::Fixed),
            PromptSection::new(RECENT, ctx.recent_commits.as_str(), SectionRole::Tertiary),
            PromptSection::new(FILES, ctx.file_list.as_str(), SectionRole::Secondary),
        ]);

        let body = PromptBuilder::new()
            .role("You are an expert software developer who writes excellent commit messages following the Conventional Commits specification.")
            .text("Analyze the changes and work out WHY the developer made them, not only what changed.")
            .section("GIT DIFF", split.text(DIFF))
            .section("CURRENT BRANCH", split.text(BRANCH))
            .section("RECENT COMMITS (last 5)", split.text(RECENT))
            .section("FILES CHANGED", split.text(FILES))
            .bullets(
                "Look for the intention behind the change:",
                &[
                    "Purpose: bug fix, feature, improvement, refactor",
                    "Branch name patterns such as feature/, fix/, hotfix/",
                    "File patterns: tests mean reliability, config means deployment setup",
                    "How the change continues or completes the recent commits",
                    "Impact on users, developers, performance or security",
                ],
            )
            .objectives(
                "Write a commit message that:",
                &[
                    "Follows the format type(scope): description",
                    "Uses one of the types feat, fix, docs, style, refactor, test, chore, perf, ci, build",
                    "Captures the intention rather than the mechanics",
                    "Uses the imperative mood (\"add\" not \"added\")",
                    "Has a brief body of 2-3 lines on why the change was made and what it improves",
                    "Mentions breaking changes only if there truly are any",
                    "Stays between 200 and 400 characters in total",
                ],
            )
            .examples(
                &["feat(api): add new endpoint", "fix(db): change query"],
                &[
                    "feat(api): enable user profile customization",
                    "fix(db): prevent memory leak in long-running queries",
                ],
            )
            .text("Respond with only the commit message, no explanations.")
            .build();

        self.finish(body, split.words_used, split.words_original)
    }

    /// Structured summary of a diff
    pub fn diff_summary(&self, diff: &str) -> AssembledPrompt {
        let cut = self.counter.truncate_content(diff);

        let body = PromptBuilder::new()
            .role("Analyze the following git diff and provide a comprehensive, structured summary.")
            .section("GIT DIFF", &cut.text)
            .objectives(
                "Cover:",
                &[
                    "**Summary**: high-level overview and the primary purpose of the change",
                    "**Files & Components**: main files and modules affected",
                    "**Type of Changes**: features, fixes, refactoring, configuration or docs",
                    "**Impact**: functional, performance and user-facing effects",
                    "**Technical Details**: key logic, API or schema changes, dependencies",
                    "**Important Notes**: breaking changes, migrations, testing or deployment concerns",
                ],
            )
            .text("Be thorough yet concise. Focus on what matters most for understanding the change.")
            .build();

        self.finish(body, cut.words_kept, TokenCounter::count_words(diff))
    }

    /// Development insights from a one-line log
    pub fn log_analysis(&self, log: &str, timeframe: &str) -> AssembledPrompt {
        let cut = self.counter.truncate_content(log);

        let body = PromptBuilder::new()
            .role(&format!(
                "Analyze the following git log ({}) and provide detailed insights.",
                timeframe
            ))
            .section("GIT LOG", &cut.text)
            .objectives(
                "Cover:",
                &[
                    "**Activity Summary**: velocity, busy and quiet periods, commit frequency",
                    "**Key Features & Improvements**: major work delivered",
                    "**Bug Fixes & Maintenance**: critical fixes, performance and security work",
                    "**Contributor Insights**: who works on what and how they collaborate",
                    "**Development Patterns**: conventions, testing and release habits",
                    "**Recommendations**: areas to improve and technical debt to watch",
                ],
            )
            .text("Be insightful and actionable. Focus on trends and meaningful observations.")
            .build();

        self.finish(body, cut.words_kept, TokenCounter::count_words(log))
    }

    /// Resolution guidance for a set of conflicted paths
    pub fn merge_conflict_guidance(&self, conflicted: &[String]) -> AssembledPrompt {
        let listing = conflicted.join("\n");
        let cut = self.counter.truncate_content(&listing);

        let body = PromptBuilder::new()
            .role("Analyze the following merge conflict information and provide resolution guidance.")
            .section("CONFLICTED FILES", &cut.text)
            .objectives(
                "Provide:",
                &[
                    "**Conflict Summary**: which files conflict and the likely reason",
                    "**Resolution Strategy**: the recommended approach",
                    "**Risk Assessment**: risks of the different approaches",
                    "**Testing Recommendations**: what to verify after resolving",
                    "**Prevention**: how to avoid similar conflicts",
                ],
            )
            .text("Be practical and actionable.")
            .build();

        self.finish(body, cut.words_kept, TokenCounter::count_words(&listing))
    }

    /// Merge commit message for `source` into `target`
    pub fn merge_message(&self, source: &str, target: &str, changes: &str) -> AssembledPrompt {
        let cut = self.counter.truncate_content(changes);

        let body = PromptBuilder::new()
            .role(&format!(
                "Generate a comprehensive merge commit message for merging '{}' into '{}'.",
                source, target
            ))
            .section("CHANGES BEING MERGED", &cut.text)
            .objectives(
                "The message should:",
                &[
                    "State clearly what is being merged",
                    "Summarize the key changes and features",
                    "Follow the conventional commit format where it fits",
                    "Mention anything important about the merge",
                ],
            )
            .text("Respond with only the merge commit message.")
            .build();

        self.finish(body, cut.words_kept, TokenCounter::count_words(changes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::budget::TRUNCATION_MARKER;

    fn assembler(language: Language) -> PromptAssembler {
        PromptAssembler::new(language, TokenCounter::default())
    }

    #[test]
    fn test_english_has_no_directive() {
        let prompt = assembler(Language::English).diff_summary("+a");
        assert!(!prompt.text.contains("IMPORTANT: Please respond in"));
        assert!(prompt.text.starts_with("Analyze the following git diff"));
    }

    #[test]
    fn test_korean_directive_prefix() {
        let prompt = assembler(Language::Korean).diff_summary("+a");
        assert!(prompt.text.starts_with(
            "IMPORTANT: Please respond in Korean (한국어). All explanations"
        ));
    }

    #[test]
    fn test_commit_prompt_sections() {
        let ctx = CommitContext {
            diff: "+fn login() {}".to_string(),
            branch: "feature/login".to_string(),
            recent_commits: "abc123 feat: add session store".to_string(),
            file_list: "A src/login.rs".to_string(),
        };
        let prompt = assembler(Language::English).commit_message(&ctx);

        assert!(prompt.text.contains("=== GIT DIFF ===\n+fn login() {}"));
        assert!(prompt.text.contains("=== CURRENT BRANCH ===\nfeature/login"));
        assert!(prompt.text.contains("=== RECENT COMMITS (last 5) ===\nabc123"));
        assert!(prompt.text.contains("=== FILES CHANGED ===\nA src/login.rs"));
        assert!(prompt.text.ends_with("Respond with only the commit message, no explanations."));
        assert!(!prompt.truncated);
    }

    #[test]
    fn test_commit_prompt_is_budgeted() {
        let big = vec!["word"; 500].join(" ");
        let ctx = CommitContext {
            diff: big.clone(),
            branch: "main".to_string(),
            recent_commits: big.clone(),
            file_list: big,
        };
        let prompt = PromptAssembler::new(Language::English, TokenCounter::new(100)).commit_message(&ctx);

        assert!(prompt.truncated);
        assert!(prompt.words_used <= 100);
        assert_eq!(prompt.words_original, 1501);
        assert!(prompt.text.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn test_log_prompt_names_timeframe() {
        let prompt = assembler(Language::English).log_analysis("abc fix", "last 20 commits");
        assert!(prompt.text.starts_with("Analyze the following git log (last 20 commits)"));
    }

    #[test]
    fn test_conflict_prompt_lists_paths() {
        let files = vec!["a.rs".to_string(), "b.rs".to_string()];
        let prompt = assembler(Language::English).merge_conflict_guidance(&files);
        assert!(prompt.text.contains("=== CONFLICTED FILES ===\na.rs\nb.rs"));
    }

    #[test]
    fn test_merge_message_names_branches() {
        let prompt = assembler(Language::German).merge_message("feature/x", "main", "abc feat");
        assert!(prompt.text.starts_with("IMPORTANT: Please respond in German (Deutsch)."));
        assert!(prompt.text.contains("merging 'feature/x' into 'main'"));
    }

    #[test]
    fn test_stage_prompt_reply_format() {
        let prompt = assembler(Language::English).stage_decision("notes.txt", "hello");
        assert!(prompt.text.contains("File: notes.txt"));
        assert!(prompt.text.contains("\"YES: <brief reason>\""));
    }
}
