//! sessionkv - session key-value store with per-key expiry
//!
//! Main entry point for the sessionkv CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{config, destroy, expiry, get, init, list, remove, set};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// sessionkv - session key-value store with per-key expiry
#[derive(Parser)]
#[command(name = "sessionkv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Session id to operate on
    #[arg(long, global = true, env = "SESSIONKV_SESSION")]
    pub session: Option<String>,

    /// Directory holding session files
    #[arg(long, global = true, env = "SESSIONKV_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Open the session read-only (nothing is written back)
    #[arg(long, global = true)]
    pub read_only: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a session (or resume the one given with --session)
    Init(init::InitArgs),

    /// Store a value under a key
    Set(set::SetArgs),

    /// Read the value stored under a key
    Get(get::GetArgs),

    /// Remove a key
    Remove(remove::RemoveArgs),

    /// Set the expiry duration for keys marked with --expire
    Expiry(expiry::ExpiryArgs),

    /// Mark an existing key for expiry as of now
    Touch(expiry::TouchArgs),

    /// Evict keys that outlived the expiry duration
    Sweep,

    /// List keys in the session
    List,

    /// List stored sessions
    Sessions,

    /// Delete the session
    Destroy,

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = sessionkv_config::load_config(None)?;

    // Initialize tracing — console (human-readable, stderr) + rotating JSON file
    let console_filter = if cli.verbose {
        "sessionkv=debug,sessionkv_store=debug,sessionkv_config=debug,info".to_string()
    } else {
        let level = loaded.config.logging().level;
        format!("sessionkv={level},sessionkv_store={level},sessionkv_config={level},warn")
    };

    let log_dir = sessionkv_config::xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "sessionkv.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(console_filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "sessionkv=trace,sessionkv_store=trace,sessionkv_config=trace,info",
                )),
        )
        .init();

    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    let ctx = commands::Context::new(
        loaded.config,
        cli.session,
        cli.store_dir,
        cli.read_only,
        cli.json,
        cli.verbose,
    )?;

    // Dispatch to command handlers
    match cli.command {
        Commands::Init(args) => init::run(args, &ctx),
        Commands::Set(args) => set::run(args, &ctx),
        Commands::Get(args) => get::run(args, &ctx),
        Commands::Remove(args) => remove::run(args, &ctx),
        Commands::Expiry(args) => expiry::run(args, &ctx),
        Commands::Touch(args) => expiry::run_touch(args, &ctx),
        Commands::Sweep => expiry::run_sweep(&ctx),
        Commands::List => list::run(&ctx),
        Commands::Sessions => list::run_sessions(&ctx),
        Commands::Destroy => destroy::run(&ctx),
        Commands::Config(args) => config::run(args, &ctx),
    }
}
