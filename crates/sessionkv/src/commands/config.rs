//! Config command - configuration management.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the merged configuration and where it came from
    Show,

    /// Show the user configuration file path
    Path,
}

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(ctx),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = sessionkv_config::load_config(None)?;

    if ctx.json_output {
        let sources: Vec<String> = loaded
            .loaded_from()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        let session = ctx.config.session();
        ctx.print_json(&json!({
            "sources": sources,
            "store_dir": ctx.store_dir.display().to_string(),
            "session": {
                "lifetime_secs": session.lifetime_secs,
                "read_only": ctx.read_only,
                "default_expiry_secs": session.default_expiry_secs,
                "sweep_on_load": session.sweep_on_load,
            },
            "logging": { "level": ctx.config.logging().level },
        }))?;
        return Ok(());
    }

    println!("# sessionkv configuration\n");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("No config files loaded (using defaults)\n");
    } else {
        println!("Config files:");
        for source in &sources {
            println!("  {}", source.display());
        }
        println!();
    }

    println!("Store directory: {}\n", ctx.store_dir.display());
    print!("{}", ctx.config.to_toml()?);
    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<()> {
    let path = sessionkv_config::xdg_config_path();

    if ctx.json_output {
        ctx.print_json(&json!({ "path": path.map(|p| p.display().to_string()) }))?;
    } else {
        match path {
            Some(p) => println!("{}", p.display()),
            None => println!("No config directory available on this platform"),
        }
    }
    Ok(())
}
