//! CLI command handlers.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use serde_json::Value;

use sessionkv_config::SessionkvConfig;
use sessionkv_store::{FileBackend, Session, SessionOptions};

pub mod config;
pub mod destroy;
pub mod expiry;
pub mod get;
pub mod init;
pub mod list;
pub mod remove;
pub mod set;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration.
    pub config: SessionkvConfig,
    /// Session id given on the command line.
    pub session_id: Option<String>,
    /// Directory holding session files.
    pub store_dir: PathBuf,
    /// Open sessions read-only.
    pub read_only: bool,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Build the context, resolving the store directory from flags or config.
    pub fn new(
        config: SessionkvConfig,
        session_id: Option<String>,
        store_dir: Option<PathBuf>,
        read_only: bool,
        json_output: bool,
        verbose: bool,
    ) -> Result<Self> {
        let store_dir = match store_dir.or_else(|| config.storage().dir) {
            Some(dir) => dir,
            None => sessionkv_config::xdg_data_dir()
                .context("no data directory available; pass --store-dir")?,
        };
        let read_only = read_only || config.session().read_only;

        Ok(Self {
            config,
            session_id: session_id.filter(|id| !id.is_empty()),
            store_dir,
            read_only,
            json_output,
            verbose,
        })
    }

    /// Session options derived from config and flags.
    pub fn options(&self) -> SessionOptions {
        let section = self.config.session();
        let mut options = SessionOptions::new()
            .with_read_only(self.read_only)
            .with_sweep_on_init(section.sweep_on_load);
        if let Some(secs) = section.lifetime_secs {
            options = options.with_lifetime(Duration::from_secs(secs));
        }
        if let Some(secs) = section.default_expiry_secs {
            options = options.with_default_expiry(Duration::from_secs(secs));
        }
        options
    }

    /// Open the file backend.
    pub fn backend(&self) -> Result<FileBackend> {
        FileBackend::new(&self.store_dir)
            .with_context(|| format!("failed to open store at {}", self.store_dir.display()))
    }

    /// Resume the session named by `--session`.
    ///
    /// Unlike `init`, an unknown or outlived id is an error here.
    pub fn open_session(&self) -> Result<Session<FileBackend>> {
        let Some(id) = self.session_id.as_deref() else {
            bail!("no session given; run `sessionkv init` and pass --session <id>");
        };
        let session = Session::init(self.backend()?, self.options(), Some(id))?;
        if !session.is_resumed() {
            bail!("session '{}' not found or expired", id);
        }
        Ok(session)
    }

    /// Write the session back unless it was opened read-only.
    pub fn finish(&self, mut session: Session<FileBackend>) -> Result<()> {
        if !session.is_read_only() {
            session.commit()?;
        }
        Ok(())
    }

    /// Print a JSON document to stdout.
    pub fn print_json(&self, value: &Value) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Parse a command-line value as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Render a value for human output: strings bare, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("[1,2]"), json!([1, 2]));
        assert_eq!(parse_value(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_value("\"quoted\""), json!("quoted"));
        assert_eq!(parse_value("hello world"), json!("hello world"));
        assert_eq!(parse_value("false"), json!(false));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("plain")), "plain");
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
        assert_eq!(display_value(&json!(true)), "true");
    }

    #[test]
    fn test_options_from_config() {
        let config = SessionkvConfig::from_toml(
            "[session]\nlifetime_secs = 60\ndefault_expiry_secs = 5\nsweep_on_load = true\n",
        )
        .unwrap();
        let ctx = Context::new(config, None, Some(PathBuf::from("/tmp/x")), false, false, false)
            .unwrap();
        let options = ctx.options();
        assert_eq!(options.lifetime, Some(Duration::from_secs(60)));
        assert_eq!(options.default_expiry, Some(Duration::from_secs(5)));
        assert!(options.sweep_on_init);
        assert!(!options.read_only);
    }

    #[test]
    fn test_read_only_from_config_or_flag() {
        let config = SessionkvConfig::from_toml("[session]\nread_only = true\n").unwrap();
        let ctx = Context::new(config, None, Some(PathBuf::from("/tmp/x")), false, false, false)
            .unwrap();
        assert!(ctx.options().read_only);

        let ctx = Context::new(
            SessionkvConfig::new(),
            Some(String::new()),
            Some(PathBuf::from("/tmp/x")),
            true,
            false,
            false,
        )
        .unwrap();
        assert!(ctx.read_only);
        assert!(ctx.session_id.is_none());
    }
}
