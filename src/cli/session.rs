//! Per-invocation context
//!
//! Built once in `main` from the loaded configuration and handed to the
//! command by mutable reference. The provider is created lazily so commands
//! that end early (nothing staged, passthrough) never need a credential.
//!
//! A config file that fails to load does not stop the session: it runs on
//! defaults and the load error is raised only when a command needs the
//! configuration (the AI path, `config show`).

use std::sync::Arc;

use tracing::debug;

use super::ui::{Output, Terminal};
use crate::ai::{PromptAssembler, SharedProvider, SolarProvider, TokenCounter};
use crate::config::{Config, ConfigLoader, Language, resolve_language, run_setup};
use crate::git::Vcs;
use crate::types::{Result, SgitError};

pub struct Session {
    pub config: Config,
    pub language: Language,
    pub vcs: Box<dyn Vcs>,
    pub terminal: Box<dyn Terminal>,
    pub output: Output,
    loader: ConfigLoader,
    provider: Option<SharedProvider>,
    config_error: Option<String>,
}

impl Session {
    /// Resolves the response language; an unknown code is reported on `output`
    pub fn new(
        config: Config,
        loader: ConfigLoader,
        lang_flag: Option<&str>,
        vcs: Box<dyn Vcs>,
        terminal: Box<dyn Terminal>,
        output: Output,
    ) -> Self {
        let choice = resolve_language(lang_flag, &config.language);
        if let Some(warning) = &choice.warning {
            output.warning(warning);
        }
        debug!("Response language: {}", choice.language);

        Self {
            config,
            language: choice.language,
            vcs,
            terminal,
            output,
            loader,
            provider: None,
            config_error: None,
        }
    }

    /// Record a failed config load; the session keeps running on defaults
    pub fn with_config_error(mut self, error: SgitError) -> Self {
        self.config_error = Some(match error {
            SgitError::Config(message) => message,
            other => other.to_string(),
        });
        self
    }

    /// The deferred config load error, if any
    pub fn check_config(&self) -> Result<()> {
        match &self.config_error {
            Some(message) => Err(SgitError::Config(message.clone())),
            None => Ok(()),
        }
    }

    /// Drop a deferred load error once the file has been rewritten
    pub fn clear_config_error(&mut self) {
        self.config_error = None;
    }

    /// Use this provider instead of building one from the config
    pub fn with_provider(mut self, provider: SharedProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn loader(&self) -> &ConfigLoader {
        &self.loader
    }

    pub fn assembler(&self) -> PromptAssembler {
        PromptAssembler::new(
            self.language,
            TokenCounter::new(self.config.budget.max_input_words),
        )
    }

    /// Provider for this invocation, running first-time setup when no
    /// credential is configured
    pub fn ensure_provider(&mut self) -> Result<SharedProvider> {
        self.check_config()?;
        if let Some(provider) = &self.provider {
            return Ok(Arc::clone(provider));
        }

        if self.config.llm.api_key().is_none() {
            self.output.info("No API key configured. Running setup...");
            self.output.blank();
            self.config = run_setup(
                &self.loader,
                &self.config,
                self.terminal.as_ref(),
                &self.output,
            )?;
            self.output.blank();
            self.output.success("Configuration complete! Continuing...");
        }

        let provider: SharedProvider = Arc::new(SolarProvider::new(&self.config.llm)?);
        self.provider = Some(Arc::clone(&provider));
        Ok(provider)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::ai::provider::testing::ScriptedProvider;
    use crate::cli::ui::ScriptedTerminal;
    use crate::git::testing::FakeVcs;

    /// Session over fakes, with captured output
    pub(crate) fn session(
        vcs: FakeVcs,
        terminal: ScriptedTerminal,
        provider: Option<ScriptedProvider>,
    ) -> (Session, Arc<std::sync::Mutex<String>>) {
        let (output, buffer) = Output::captured();
        let config = Config {
            llm: crate::config::LlmConfig {
                api_key: Some("up_test".to_string()),
                ..Default::default()
            },
            ..Config::default()
        };
        let mut session = Session::new(
            config,
            ConfigLoader::new(Some(std::env::temp_dir().join("sgit-test-unused.toml"))),
            None,
            Box::new(vcs),
            Box::new(terminal),
            output,
        );
        if let Some(provider) = provider {
            session = session.with_provider(Arc::new(provider));
        }
        (session, buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::LlmProvider;
    use crate::cli::ui::ScriptedTerminal;
    use crate::git::testing::FakeVcs;

    #[test]
    fn test_unknown_language_warns_and_falls_back() {
        let (output, buffer) = Output::captured();
        let session = Session::new(
            Config::default(),
            ConfigLoader::default(),
            Some("xx"),
            Box::new(FakeVcs::new()),
            Box::new(ScriptedTerminal::new()),
            output,
        );
        assert_eq!(session.language, Language::English);
        assert!(
            buffer
                .lock()
                .unwrap()
                .contains("Warning: Invalid language code 'xx'. Using default 'en'.")
        );
    }

    #[test]
    fn test_flag_overrides_config_language() {
        let (output, _) = Output::captured();
        let config = Config {
            language: "ja".to_string(),
            ..Config::default()
        };
        let session = Session::new(
            config,
            ConfigLoader::default(),
            Some("ko"),
            Box::new(FakeVcs::new()),
            Box::new(ScriptedTerminal::new()),
            output,
        );
        assert_eq!(session.language, Language::Korean);
    }

    #[test]
    fn test_missing_key_runs_setup_and_cancel_aborts() {
        let dir = tempfile::TempDir::new().unwrap();
        let (output, _) = Output::captured();
        let mut session = Session::new(
            Config::default(),
            ConfigLoader::new(Some(dir.path().join("config.toml"))),
            None,
            Box::new(FakeVcs::new()),
            Box::new(ScriptedTerminal::new()),
            output,
        );
        let err = session.ensure_provider().err().unwrap();
        assert!(err.is_cancelled());
        assert!(!dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_config_error_surfaces_on_provider() {
        let (output, _) = Output::captured();
        let mut session = Session::new(
            Config::default(),
            ConfigLoader::default(),
            None,
            Box::new(FakeVcs::new()),
            Box::new(ScriptedTerminal::new().secret("up_unused")),
            output,
        )
        .with_config_error(SgitError::Config("expected `]`".to_string()));

        let err = session.ensure_provider().err().unwrap();
        assert_eq!(err.to_string(), "Config error: expected `]`");
        assert!(session.config.llm.api_key().is_none());
    }

    #[test]
    fn test_setup_then_provider() {
        let dir = tempfile::TempDir::new().unwrap();
        let (output, _) = Output::captured();
        let terminal = ScriptedTerminal::new().secret("up_fresh").line("").line("");
        let mut session = Session::new(
            Config::default(),
            ConfigLoader::new(Some(dir.path().join("config.toml"))),
            None,
            Box::new(FakeVcs::new()),
            Box::new(terminal),
            output,
        );
        let provider = session.ensure_provider().unwrap();
        assert_eq!(provider.name(), "solar");
        assert_eq!(session.config.llm.api_key(), Some("up_fresh"));
    }
}
