//! Interactive first-run setup
//!
//! Asks for the API key, model and response language. Pressing Enter keeps
//! the current value. Nothing is written until every answer is in, so a
//! cancelled session leaves the config file untouched.

use tracing::debug;

use super::loader::ConfigLoader;
use super::types::{Config, Language};
use crate::cli::ui::{Output, Terminal};
use crate::constants::llm::DEFAULT_MODEL;
use crate::types::{Result, SgitError};

pub fn run_setup(
    loader: &ConfigLoader,
    current: &Config,
    terminal: &dyn Terminal,
    output: &Output,
) -> Result<Config> {
    let path = loader.path()?;

    output.header("sgit Configuration Setup");
    output.line(&format!(
        "Your API key will be stored locally in {}",
        path.display()
    ));
    output.line("Press Ctrl-C anytime to cancel");
    output.blank();

    let mut config = current.clone();

    // API key
    output.line("(get one at https://console.upstage.ai/)");
    let api_key = match current.llm.masked_api_key() {
        Some(masked) => {
            let input = terminal.read_secret(&format!(
                "Enter your Upstage API key (current: {}, press Enter to keep): ",
                masked
            ))?;
            if input.trim().is_empty() {
                output.success("Keeping existing API key");
                current.llm.api_key().map(str::to_string)
            } else {
                Some(input.trim().to_string())
            }
        }
        None => {
            let input = terminal.read_secret("Enter your Upstage API key: ")?;
            let input = input.trim();
            if input.is_empty() {
                return Err(SgitError::Config("API key cannot be empty".to_string()));
            }
            Some(input.to_string())
        }
    };
    config.llm.api_key = api_key;

    // Model
    let model_prompt = if current.llm.model.is_empty() || current.llm.model == DEFAULT_MODEL {
        format!("Enter model name (default: {}): ", DEFAULT_MODEL)
    } else {
        format!(
            "Enter model name (current: {}, press Enter to keep): ",
            current.llm.model
        )
    };
    let model = terminal.read_line(&model_prompt)?;
    let model = model.trim();
    if !model.is_empty() {
        config.llm.model = model.to_string();
    } else if current.llm.model.is_empty() {
        config.llm.model = DEFAULT_MODEL.to_string();
    }

    // Language
    output.blank();
    output.line("Available languages:");
    for language in Language::ALL {
        output.line(&format!("  {} - {}", language.code(), language.display_name()));
    }
    let current_language = current
        .language
        .parse::<Language>()
        .unwrap_or_default();
    let answer = terminal.read_line(&format!(
        "Enter language code (current: {} - {}, press Enter to keep): ",
        current_language.code(),
        current_language.display_name()
    ))?;
    let answer = answer.trim().to_lowercase();
    let language = if answer.is_empty() {
        current_language
    } else {
        match answer.parse::<Language>() {
            Ok(language) => language,
            Err(_) => {
                output.warning(&format!(
                    "Invalid language code '{}'. Defaulting to 'en' (English)",
                    answer
                ));
                Language::English
            }
        }
    };
    output.line(&format!(
        "Selected language: {} ({})",
        language.code(),
        language.display_name()
    ));
    config.language = language.code().to_string();

    let saved = loader.save(&config)?;
    debug!("Setup wrote {}", saved.display());
    output.blank();
    output.success(&format!("Configuration saved to {}", saved.display()));

    Ok(config)
}
