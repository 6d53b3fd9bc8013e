//! AI Integration Layer
//!
//! Prompt budgeting, task prompts and the completion endpoint client.

pub mod prompt;
pub mod provider;
pub mod tokenizer;

pub use prompt::{AssembledPrompt, CommitContext, PromptAssembler, PromptBuilder};
pub use provider::{
    ChatExchange, ChatMessage, DeltaStream, LlmProvider, SharedProvider, SolarProvider,
    collect_stream, strip_thinking,
};
pub use tokenizer::{BudgetSplit, PromptSection, SectionRole, TokenCounter, Truncation};
