//! Configuration Management
//!
//! Hierarchical resolution, lowest to highest priority:
//! 1. Built-in defaults
//! 2. User config (~/.config/sgit/config.toml, or `--config <path>`)
//! 3. Environment variables (SGIT_*, then UPSTAGE_API_KEY / UPSTAGE_MODEL_NAME)
//! 4. CLI arguments (`--lang`)

mod loader;
mod setup;
mod types;

pub use loader::ConfigLoader;
pub use setup::run_setup;
pub use types::*;
