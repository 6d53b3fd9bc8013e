//! Configuration Types
//!
//! Configuration structures with sensible defaults, plus the table of
//! response languages the prompts can ask for.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{budget, llm};
use crate::types::{Result, SgitError};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Response language code (en, ko, ja, zh, es, fr, de)
    pub language: String,

    /// Completion endpoint settings
    pub llm: LlmConfig,

    /// Prompt budget settings
    pub budget: BudgetConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: Language::default().code().to_string(),
            llm: LlmConfig::default(),
            budget: BudgetConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `SgitError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(SgitError::Config("llm.model must not be empty".to_string()));
        }

        let endpoint = url::Url::parse(&self.llm.endpoint).map_err(|e| {
            SgitError::Config(format!(
                "llm.endpoint '{}' is not a valid URL: {}",
                self.llm.endpoint, e
            ))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(SgitError::Config(format!(
                "llm.endpoint must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        if self.budget.max_input_words == 0 {
            return Err(SgitError::Config(
                "budget.max_input_words must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Bearer credential for the completion endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub model: String,

    /// Full chat completions URL
    pub endpoint: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: llm::DEFAULT_MODEL.to_string(),
            endpoint: llm::DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl LlmConfig {
    /// Credential if present and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// First three characters followed by one `*` per remaining character
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key().map(mask_secret)
    }
}

pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(3).collect();
    let hidden = secret.chars().count().saturating_sub(3);
    format!("{}{}", visible, "*".repeat(hidden))
}

// =============================================================================
// Budget Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Word ceiling for variable prompt content
    pub max_input_words: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_input_words: budget::MAX_INPUT_WORDS,
        }
    }
}

// =============================================================================
// Response Language
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Korean,
    Japanese,
    Chinese,
    Spanish,
    French,
    German,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::English,
        Language::Korean,
        Language::Japanese,
        Language::Chinese,
        Language::Spanish,
        Language::French,
        Language::German,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Korean => "ko",
            Self::Japanese => "ja",
            Self::Chinese => "zh",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
        }
    }

    /// Name used in the response-language directive
    pub fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Korean => "Korean (한국어)",
            Self::Japanese => "Japanese (日本語)",
            Self::Chinese => "Chinese (中文)",
            Self::Spanish => "Spanish (Español)",
            Self::French => "French (Français)",
            Self::German => "German (Deutsch)",
        }
    }

    pub fn supported_codes() -> String {
        Self::ALL
            .iter()
            .map(|l| l.code())
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Language {
    type Err = SgitError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.code() == code)
            .ok_or_else(|| {
                SgitError::Config(format!(
                    "Invalid language code '{}'. Supported: {}",
                    s,
                    Self::supported_codes()
                ))
            })
    }
}

/// Outcome of picking the response language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageChoice {
    pub language: Language,
    /// Set when the requested code was not recognised
    pub warning: Option<String>,
}

/// The `--lang` flag wins over the configured value; an unknown code from
/// either falls back to English with a warning for the caller to print.
pub fn resolve_language(flag: Option<&str>, configured: &str) -> LanguageChoice {
    let requested = flag
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(configured.trim());

    if requested.is_empty() {
        return LanguageChoice {
            language: Language::default(),
            warning: None,
        };
    }

    match requested.parse::<Language>() {
        Ok(language) => LanguageChoice {
            language,
            warning: None,
        },
        Err(_) => LanguageChoice {
            language: Language::default(),
            warning: Some(format!(
                "Warning: Invalid language code '{}'. Using default '{}'.",
                requested,
                Language::default().code()
            )),
        },
    }
}
