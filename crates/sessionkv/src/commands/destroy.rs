//! Destroy command - end a session.

use anyhow::Result;
use serde_json::json;

use super::Context;

/// Run the destroy command.
pub fn run(ctx: &Context) -> Result<()> {
    let session = ctx.open_session()?;
    let id = session.id().to_string();
    session.destroy()?;

    if ctx.json_output {
        ctx.print_json(&json!({ "session": id, "destroyed": true }))?;
    } else {
        println!("Destroyed session {}", id);
    }
    Ok(())
}
