//! Get command - read a value.

use anyhow::{Result, bail};
use clap::Args;
use serde_json::json;

use super::{Context, display_value, parse_value};

/// Arguments for the get command.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Key to read
    pub key: String,

    /// Value to print when the key is absent (parsed like `set` values)
    #[arg(short, long)]
    pub default: Option<String>,
}

/// Run the get command.
pub fn run(args: GetArgs, ctx: &Context) -> Result<()> {
    let session = ctx.open_session()?;
    let found = session.get(&args.key).cloned();
    ctx.finish(session)?;

    let value = match (found.clone(), args.default.as_deref()) {
        (Some(value), _) => value,
        (None, Some(default)) => parse_value(default),
        (None, None) if ctx.json_output => serde_json::Value::Null,
        (None, None) => bail!("key '{}' not found", args.key),
    };

    if ctx.json_output {
        ctx.print_json(&json!({ "key": args.key, "found": found.is_some(), "value": value }))?;
    } else {
        println!("{}", display_value(&value));
    }
    Ok(())
}
