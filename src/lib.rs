//! sgit - Solar LLM-powered git wrapper
//!
//! Wraps the `git` binary. `add`, `commit`, `diff`, `log` and `merge` gain
//! optional AI augmentation backed by an OpenAI-compatible chat completion
//! endpoint (Upstage Solar by default); every other subcommand, and any
//! invocation that asks for plain git behavior, is forwarded unchanged with
//! git's exit code.
//!
//! ## Core Features
//!
//! - **Flag-preserving passthrough**: declared flag tables drive both parsing
//!   and the reconstruction of the argument vector handed to git
//! - **Token budgeting**: prompt sections are sized by word count against a
//!   fixed budget and truncated with a visible marker
//! - **Streaming**: responses are printed as they arrive, with a spinner
//!   until the first fragment
//!
//! ## Modules
//!
//! - [`ai`]: token budgeting, prompt assembly, the completion client
//! - [`cli`]: command tree, routing and command handlers
//! - [`config`]: figment-based configuration, languages, first-run setup
//! - [`git`]: the git subprocess collaborator

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod git;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader, Language};

pub use types::error::{ErrorCategory, Result, ResultExt, SgitError};

pub use ai::{LlmProvider, PromptAssembler, SharedProvider, SolarProvider, TokenCounter};

pub use git::{GitCli, GitQueries, Vcs};
