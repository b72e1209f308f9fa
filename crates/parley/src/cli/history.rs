//! Conversation history commands.

use std::fmt::Write;

use anyhow::{Context, Result, bail};
use futures::StreamExt;
use parley::auth::UserId;
use parley::llm::Role;
use parley::store::{ConversationId, ConversationRecord, ConversationStore, StorageResult};
use tracing::warn;

/// Load one conversation by its id string.
pub async fn load(
    store: &dyn ConversationStore,
    user: &UserId,
    raw_id: &str,
) -> Result<ConversationRecord> {
    let id: ConversationId = raw_id
        .parse()
        .with_context(|| format!("invalid conversation id '{raw_id}'"))?;

    match store.load(user, &id).await? {
        Some(record) => Ok(record),
        None => bail!("conversation '{id}' not found"),
    }
}

/// Print the listing once, or keep printing snapshots until Ctrl-C.
pub async fn list(store: &dyn ConversationStore, user: &UserId, follow: bool) -> Result<()> {
    if !follow {
        print!("{}", format_listing(&store.list(user).await?));
        return Ok(());
    }

    let mut feed = store.subscribe(user);
    loop {
        tokio::select! {
            snapshot = feed.next() => {
                let Some(snapshot) = snapshot else { break };
                println!("--- {} ---", chrono::Local::now().format("%H:%M:%S"));
                print!("{}", format_snapshot(user, snapshot));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

/// Listing for the REPL's `/history`. A store failure is reported in the
/// text instead of ending the chat.
pub async fn listing(store: &dyn ConversationStore, user: &UserId) -> String {
    format_snapshot(user, store.list(user).await)
}

fn format_snapshot(user: &UserId, snapshot: StorageResult<Vec<ConversationRecord>>) -> String {
    match snapshot {
        Ok(records) => format_listing(&records),
        Err(e) => {
            warn!(user = %user, error = %e, "Failed to list conversations");
            format!("Could not load history: {e}\n")
        }
    }
}

pub fn format_listing(records: &[ConversationRecord]) -> String {
    if records.is_empty() {
        return "No conversations yet.\n".to_string();
    }

    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "{}  {}  {:<8}  {}",
            record.id,
            record.updated_at.format("%Y-%m-%d %H:%M"),
            record.model,
            record.title()
        );
    }
    out
}

pub fn format_transcript(record: &ConversationRecord) -> String {
    let mut out = String::new();
    for message in &record.messages {
        let speaker = match message.role {
            Role::User => "you",
            Role::Assistant => record.model.as_str(),
        };
        let _ = writeln!(out, "{speaker}> {}\n", message.content);
    }
    out
}
