//! Conversation persistence.
//!
//! Conversations are documents scoped to a user namespace. The store is an
//! external collaborator from the chat session's point of view, so it sits
//! behind the [`ConversationStore`] trait:
//!
//! - `create` appends a new document, `merge` updates an existing one
//! - `updated_at` is assigned by the store on every write
//! - `subscribe` yields a live, newest-first listing that refreshes after
//!   every write made through the same store

use std::fmt;
use std::pin::Pin;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::auth::UserId;
use crate::llm::{Message, Role};

mod error;
mod file;

pub use error::{StorageError, StorageResult};
pub use file::FileConversationStore;

/// Live feed of a user's conversation listings, newest first.
///
/// Dropping the stream unsubscribes.
pub type HistoryFeed =
    Pin<Box<dyn Stream<Item = StorageResult<Vec<ConversationRecord>>> + Send>>;

/// Storage for conversation documents.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append a new conversation document and return its id.
    async fn create(
        &self,
        user: &UserId,
        messages: &[Message],
        model: &str,
    ) -> StorageResult<ConversationId>;

    /// Replace `messages` and `model` of a conversation, keeping `created_at`.
    ///
    /// Merging into an id that does not exist yet creates it.
    async fn merge(
        &self,
        user: &UserId,
        id: &ConversationId,
        messages: &[Message],
        model: &str,
    ) -> StorageResult<()>;

    async fn load(
        &self,
        user: &UserId,
        id: &ConversationId,
    ) -> StorageResult<Option<ConversationRecord>>;

    /// All of a user's conversations, most recently updated first.
    async fn list(&self, user: &UserId) -> StorageResult<Vec<ConversationRecord>>;

    /// Returns whether a document was removed.
    async fn delete(&self, user: &UserId, id: &ConversationId) -> StorageResult<bool>;

    /// Subscribe to the user's listing. The first item is the current state.
    fn subscribe(&self, user: &UserId) -> HistoryFeed;
}

// ============================================================================
// ConversationId
// ============================================================================

/// Opaque, time-sortable conversation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(Ulid);

impl ConversationId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ConversationId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

// ============================================================================
// ConversationRecord
// ============================================================================

/// A persisted conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Schema version for forward compatibility.
    pub schema_version: String,
    pub id: ConversationId,
    /// Provider identifier selected when the document was last written.
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl ConversationRecord {
    /// Current schema version.
    pub const SCHEMA_VERSION: &'static str = "1";

    const TITLE_LEN: usize = 48;

    pub fn new(id: ConversationId, model: String, messages: Vec<Message>) -> Self {
        let now = Utc::now();
        Self {
            schema_version: Self::SCHEMA_VERSION.to_string(),
            id,
            model,
            created_at: now,
            updated_at: now,
            messages,
        }
    }

    /// Check if this record is compatible with the current schema.
    pub fn is_compatible(&self) -> bool {
        self.schema_version == Self::SCHEMA_VERSION
    }

    /// Short label for listings: the opening user message, truncated.
    pub fn title(&self) -> String {
        let Some(first) = self.messages.iter().find(|m| m.role == Role::User) else {
            return "(empty)".to_string();
        };

        let line = first.content.lines().next().unwrap_or_default().trim();
        if line.chars().count() <= Self::TITLE_LEN {
            return line.to_string();
        }
        let mut title: String = line.chars().take(Self::TITLE_LEN - 1).collect();
        title.push('…');
        title
    }
}
