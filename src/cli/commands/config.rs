//! Config Command
//!
//! Usage:
//!   sgit config              interactive setup
//!   sgit config show [--json]
//!   sgit config path

use super::CommandOutcome;
use crate::cli::session::Session;
use crate::config::{Config, run_setup};
use crate::types::{Result, SgitError};

/// Run interactive setup and store the answers. An unreadable config file
/// is replaced, starting from defaults.
pub fn setup(session: &mut Session) -> Result<CommandOutcome> {
    if let Err(e) = session.check_config() {
        session
            .output
            .warning(&format!("{}; starting from defaults", e));
    }
    session.config = run_setup(
        session.loader(),
        &session.config,
        session.terminal.as_ref(),
        &session.output,
    )?;
    session.clear_config_error();
    Ok(CommandOutcome::done())
}

/// Print the effective configuration with the credential masked
pub fn show(session: &Session, as_json: bool) -> Result<CommandOutcome> {
    session.check_config()?;
    let display = masked(&session.config);
    let rendered = if as_json {
        serde_json::to_string_pretty(&display)?
    } else {
        toml::to_string_pretty(&display).map_err(|e| SgitError::Config(e.to_string()))?
    };
    session.output.line(rendered.trim_end());
    Ok(CommandOutcome::done())
}

/// Print the config file location and whether it exists
pub fn path(session: &Session) -> Result<CommandOutcome> {
    let path = session.loader().path()?;
    let exists = if path.exists() { "✓" } else { "✗" };
    session
        .output
        .line(&format!("Config: {} {}", exists, path.display()));
    Ok(CommandOutcome::done())
}

fn masked(config: &Config) -> Config {
    let mut display = config.clone();
    display.llm.api_key = config.llm.masked_api_key();
    display
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::session::testing::session;
    use crate::cli::ui::{Output, ScriptedTerminal};
    use crate::config::ConfigLoader;
    use crate::git::testing::FakeVcs;

    #[test]
    fn test_show_masks_key() {
        let (session, buffer) = session(FakeVcs::new(), ScriptedTerminal::new(), None);

        show(&session, false).unwrap();

        let text = buffer.lock().unwrap().clone();
        assert!(text.contains("api_key = \"up_****\""));
        assert!(!text.contains("up_test"));
        assert!(text.contains("[llm]"));
    }

    #[test]
    fn test_show_json() {
        let (session, buffer) = session(FakeVcs::new(), ScriptedTerminal::new(), None);

        show(&session, true).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(buffer.lock().unwrap().trim()).unwrap();
        assert_eq!(value["llm"]["api_key"], "up_****");
        assert_eq!(value["language"], "en");
    }

    #[test]
    fn test_path_reports_missing_file() {
        let (session, buffer) = session(FakeVcs::new(), ScriptedTerminal::new(), None);

        path(&session).unwrap();

        let text = buffer.lock().unwrap().clone();
        assert!(text.contains("✗"));
        assert!(text.contains("sgit-test-unused.toml"));
    }

    #[test]
    fn test_show_reports_unreadable_config() {
        let (session, _) = session(FakeVcs::new(), ScriptedTerminal::new(), None);
        let session = session.with_config_error(SgitError::Config("bad file".to_string()));

        let err = show(&session, false).unwrap_err();

        assert!(matches!(err, SgitError::Config(_)));
    }

    #[test]
    fn test_setup_replaces_unreadable_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let (output, buffer) = Output::captured();
        let terminal = ScriptedTerminal::new().secret("up_fresh").line("").line("");
        let mut session = Session::new(
            Config::default(),
            ConfigLoader::new(Some(dir.path().join("config.toml"))),
            None,
            Box::new(FakeVcs::new()),
            Box::new(terminal),
            output,
        )
        .with_config_error(SgitError::Config("TOML parse error".to_string()));

        setup(&mut session).unwrap();

        assert!(buffer.lock().unwrap().contains("starting from defaults"));
        assert!(session.check_config().is_ok());
        let saved = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
        assert!(saved.contains("up_fresh"));
    }
}
