//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. User config (~/.config/sgit/config.toml, or the `--config` path)
//! 3. Environment variables (SGIT_* prefix, `__` for nesting)
//! 4. Bare `UPSTAGE_API_KEY` / `UPSTAGE_MODEL_NAME`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, ResultExt, SgitError};

/// Configuration loader bound to one config file location
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    explicit: Option<PathBuf>,
}

impl ConfigLoader {
    /// `explicit` comes from the global `--config` flag
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }

    /// File this loader reads and writes
    pub fn path(&self) -> Result<PathBuf> {
        match &self.explicit {
            Some(path) => Ok(path.clone()),
            None => Self::global_config_path().ok_or_else(|| {
                SgitError::Config("Cannot determine config directory".to_string())
            }),
        }
    }

    pub fn figment(&self) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Ok(path) = self.path()
            && path.exists()
        {
            debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(&path));
        }

        // SGIT_LLM__MODEL -> llm.model; SGIT_LOG belongs to the log filter
        figment = figment.merge(Env::prefixed("SGIT_").split("__").ignore(&["log"]));

        figment
            .merge(
                Env::raw()
                    .only(&["UPSTAGE_API_KEY"])
                    .map(|_| "llm.api_key".into()),
            )
            .merge(
                Env::raw()
                    .only(&["UPSTAGE_MODEL_NAME"])
                    .map(|_| "llm.model".into()),
            )
    }

    /// Load with the full resolution chain, then validate
    pub fn load(&self) -> Result<Config> {
        let config: Config = self
            .figment()
            .extract()
            .map_err(|e| SgitError::Config(summarize(&e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Write the config file atomically; the previous file survives any failure
    pub fn save(&self, config: &Config) -> Result<PathBuf> {
        config.validate()?;
        let path = self.path()?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).with_context("Failed to create config directory")?;

        let content = toml::to_string_pretty(config)
            .map_err(|e| SgitError::Config(format!("Failed to serialize config: {}", e)))?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)
            .with_context("Failed to create temporary config file")?;
        temp.write_all(content.as_bytes())
            .with_context("Failed to write config")?;
        temp.as_file()
            .sync_all()
            .with_context("Failed to write config")?;
        temp.persist(&path)
            .map_err(|e| SgitError::Io(e.error))
            .with_context_fn(|| format!("Failed to save {}", path.display()))?;

        info!("Saved config: {}", path.display());
        Ok(path)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/sgit/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .filter(|v| !v.is_empty())
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .or_else(|| {
                directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".config"))
            })
            .map(|p| p.join("sgit"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }
}

/// One-line form of a figment error: the first line of the message, the
/// offending key and the source it came from
fn summarize(e: &figment::Error) -> String {
    let kind = e.kind.to_string();
    let mut message = kind.lines().next().unwrap_or_default().trim().to_string();
    if !e.path.is_empty() {
        message.push_str(&format!(" for key '{}'", e.path.join(".")));
    }
    if let Some(source) = e.metadata.as_ref().and_then(|m| m.source.as_ref()) {
        message.push_str(&format!(" in {}", source));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|jail| {
            jail.set_env("XDG_CONFIG_HOME", jail.directory().display().to_string());
            let config = ConfigLoader::new(None).load().unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                    language = "ko"

                    [llm]
                    model = "from-file"
                    api_key = "up_file"
                "#,
            )?;
            let loader = ConfigLoader::new(Some(jail.directory().join("custom.toml")));

            let config = loader.load().unwrap();
            assert_eq!(config.language, "ko");
            assert_eq!(config.llm.model, "from-file");

            jail.set_env("SGIT_LLM__MODEL", "from-prefixed-env");
            assert_eq!(loader.load().unwrap().llm.model, "from-prefixed-env");

            jail.set_env("UPSTAGE_MODEL_NAME", "from-upstage-env");
            jail.set_env("UPSTAGE_API_KEY", "up_env");
            let config = loader.load().unwrap();
            assert_eq!(config.llm.model, "from-upstage-env");
            assert_eq!(config.llm.api_key(), Some("up_env"));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_file_value_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.toml", "[llm]\nendpoint = \"ftp://example.com\"\n")?;
            let loader = ConfigLoader::new(Some(jail.directory().join("bad.toml")));
            assert!(matches!(loader.load(), Err(SgitError::Config(_))));
            Ok(())
        });
    }

    #[test]
    fn test_parse_error_is_one_line() {
        Jail::expect_with(|jail| {
            jail.create_file("broken.toml", "[llm\nmodel = \"x\"\n")?;
            let loader = ConfigLoader::new(Some(jail.directory().join("broken.toml")));
            let err = loader.load().unwrap_err();
            let message = err.to_string();
            assert!(message.starts_with("Config error: "));
            assert!(!message.contains("Configuration error"));
            assert!(!message.contains('\n'));
            Ok(())
        });
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let loader = ConfigLoader::new(Some(path.clone()));

        let config = Config {
            language: "ja".to_string(),
            llm: LlmConfig {
                api_key: Some("up_saved".to_string()),
                ..LlmConfig::default()
            },
            ..Config::default()
        };
        assert_eq!(loader.save(&config).unwrap(), path);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("language = \"ja\""));

        let loaded: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&path))
            .extract()
            .unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_refuses_invalid_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let loader = ConfigLoader::new(Some(path.clone()));

        let mut config = Config::default();
        config.llm.model = String::new();
        assert!(loader.save(&config).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_global_dir_prefers_xdg() {
        Jail::expect_with(|jail| {
            jail.set_env("XDG_CONFIG_HOME", "/tmp/xdg");
            assert_eq!(
                ConfigLoader::global_config_path(),
                Some(PathBuf::from("/tmp/xdg/sgit/config.toml"))
            );
            Ok(())
        });
    }
}
