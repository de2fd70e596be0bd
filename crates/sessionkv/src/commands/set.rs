//! Set command - store a value.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::{Context, parse_value};

/// Arguments for the set command.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Key to store under
    pub key: String,

    /// Value (parsed as JSON, otherwise stored as a string)
    pub value: String,

    /// Mark the key for expiry
    #[arg(short, long)]
    pub expire: bool,
}

/// Run the set command.
pub fn run(args: SetArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session()?;
    let value = parse_value(&args.value);
    session.set(&args.key, value.clone(), args.expire)?;
    ctx.finish(session)?;

    if ctx.json_output {
        ctx.print_json(&json!({ "key": args.key, "value": value, "expire": args.expire }))?;
    } else if ctx.verbose {
        println!("Stored '{}'{}", args.key, if args.expire { " (expiring)" } else { "" });
    }
    Ok(())
}
