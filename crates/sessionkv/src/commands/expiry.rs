//! Expiry commands - duration, marking and sweeping.

use anyhow::{Result, bail};
use clap::Args;
use serde_json::json;

use sessionkv_store::parse_duration_secs;

use super::Context;

/// Arguments for the expiry command.
#[derive(Args, Debug)]
pub struct ExpiryArgs {
    /// Duration in seconds; replaces any previous duration
    pub seconds: String,
}

/// Arguments for the touch command.
#[derive(Args, Debug)]
pub struct TouchArgs {
    /// Key to mark
    pub key: String,
}

/// Run the expiry command.
pub fn run(args: ExpiryArgs, ctx: &Context) -> Result<()> {
    let duration = parse_duration_secs(&args.seconds)?;
    let mut session = ctx.open_session()?;
    session.set_default_expiry_duration(duration)?;
    ctx.finish(session)?;

    if ctx.json_output {
        ctx.print_json(&json!({ "default_expiry_secs": duration.as_secs() }))?;
    } else {
        println!("Expiry duration set to {}s", duration.as_secs());
    }
    Ok(())
}

/// Run the touch command.
pub fn run_touch(args: TouchArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session()?;
    if !session.store().contains(&args.key) {
        bail!("key '{}' not found", args.key);
    }
    session.mark_for_expiry(&args.key)?;
    ctx.finish(session)?;

    if ctx.json_output {
        ctx.print_json(&json!({ "key": args.key, "marked": true }))?;
    } else if ctx.verbose {
        println!("Marked '{}' for expiry", args.key);
    }
    Ok(())
}

/// Run the sweep command.
pub fn run_sweep(ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session()?;
    let mut evicted = session.check_expiry()?;
    evicted.sort();
    ctx.finish(session)?;

    if ctx.json_output {
        ctx.print_json(&json!({ "evicted": evicted }))?;
    } else if evicted.is_empty() {
        println!("No expired keys");
    } else {
        for key in &evicted {
            println!("Evicted '{}'", key);
        }
    }
    Ok(())
}
