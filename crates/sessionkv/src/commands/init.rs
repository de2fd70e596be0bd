//! Init command - start or resume a session.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use sessionkv_store::Session;

use super::Context;

/// Arguments for the init command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Print only the session id
    #[arg(short, long)]
    pub quiet: bool,
}

/// Run the init command.
///
/// With `--session` naming a live session, that session is resumed and its
/// id printed again. Otherwise a new session is created.
pub fn run(args: InitArgs, ctx: &Context) -> Result<()> {
    let session = Session::init(ctx.backend()?, ctx.options(), ctx.session_id.as_deref())?;
    let id = session.id().to_string();
    let resumed = session.is_resumed();
    ctx.finish(session)?;

    if ctx.json_output {
        ctx.print_json(&json!({ "session": id, "resumed": resumed }))?;
    } else if args.quiet {
        println!("{}", id);
    } else if resumed {
        println!("Resumed session {}", id);
    } else {
        println!("Started session {}", id);
        println!("  export SESSIONKV_SESSION={}", id);
    }
    Ok(())
}
