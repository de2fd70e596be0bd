//! List commands - keys in a session and stored sessions.

use anyhow::Result;
use serde_json::{Map, Value, json};

use sessionkv_store::SessionBackend;

use super::{Context, display_value};

/// Run the list command.
pub fn run(ctx: &Context) -> Result<()> {
    let session = ctx.open_session()?;
    let store = session.store();

    if ctx.json_output {
        let mut entries = Map::new();
        for key in store.keys() {
            let value = store.get(key).cloned().unwrap_or(Value::Null);
            let marked_at = store.expiry_of(key).map(|t| t.to_rfc3339());
            entries.insert(key.to_string(), json!({ "value": value, "marked_at": marked_at }));
        }
        let stats = store.stats();
        ctx.print_json(&json!({
            "session": session.id(),
            "default_expiry_secs": stats.default_expiry.map(|d| d.as_secs()),
            "entries": entries,
        }))?;
    } else {
        let stats = store.stats();
        match stats.default_expiry {
            Some(d) => println!("Session {} (expiry {}s)", session.id(), d.as_secs()),
            None => println!("Session {} (no expiry)", session.id()),
        }
        if store.is_empty() {
            println!("  (empty)");
        }
        for key in store.keys() {
            let value = store.get(key).map(display_value).unwrap_or_default();
            let marker = if store.expiry_of(key).is_some() { " *" } else { "" };
            println!("  {:<20} {}{}", key, value, marker);
        }
    }

    ctx.finish(session)
}

/// Run the sessions command.
pub fn run_sessions(ctx: &Context) -> Result<()> {
    let ids = ctx.backend()?.list()?;

    if ctx.json_output {
        ctx.print_json(&json!({ "sessions": ids }))?;
    } else if ids.is_empty() {
        println!("No sessions in {}", ctx.store_dir.display());
    } else {
        for id in ids {
            println!("{}", id);
        }
    }
    Ok(())
}
