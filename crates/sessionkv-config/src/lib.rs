//! Configuration system for sessionkv.
//!
//! Provides TOML-based configuration with:
//! - `[session]` defaults for lifetime, read-only mode and key expiry
//! - `[storage]` location of persisted sessions
//! - `[logging]` console log level
//! - Config file layering (XDG user config + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    load_config, load_config_file, load_config_with_options, save_config, xdg_config_dir,
    xdg_config_path, xdg_data_dir, ConfigSource, LoadedConfig,
};
pub use error::{ConfigError, Result};
pub use types::*;
