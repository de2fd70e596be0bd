//! Remove command - delete a key.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::Context;

/// Arguments for the remove command.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Key to remove
    pub key: String,
}

/// Run the remove command.
pub fn run(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session()?;
    let removed = session.remove(&args.key)?;
    ctx.finish(session)?;

    if ctx.json_output {
        ctx.print_json(&json!({ "key": args.key, "removed": removed.is_some() }))?;
    } else if removed.is_some() {
        println!("Removed '{}'", args.key);
    } else {
        println!("Key '{}' not present", args.key);
    }
    Ok(())
}
