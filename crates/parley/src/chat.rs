//! Conversation controller.
//!
//! A [`ChatSession`] owns the transcript of the active conversation. Each
//! turn appends the user message, awaits the model, appends the reply, and
//! then mirrors the transcript to the store. Store failures are logged and
//! dropped; the in-memory transcript is never rolled back.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::UserId;
use crate::llm::{Message, ModelAdapter, Reply};
use crate::store::{ConversationId, ConversationRecord, ConversationStore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
}

pub struct ChatSession {
    adapter: ModelAdapter,
    store: Arc<dyn ConversationStore>,
    user: UserId,
    model: String,
    conversation_id: Option<ConversationId>,
    transcript: Vec<Message>,
}

impl ChatSession {
    pub fn new(
        adapter: ModelAdapter,
        store: Arc<dyn ConversationStore>,
        user: UserId,
        model: impl Into<String>,
    ) -> Self {
        Self {
            adapter,
            store,
            user,
            model: model.into(),
            conversation_id: None,
            transcript: Vec::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn store(&self) -> &dyn ConversationStore {
        self.store.as_ref()
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Id of the stored conversation, once the first turn has been saved.
    pub fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    /// Select the provider for subsequent turns. The transcript is untouched.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
        debug!(model = %self.model, "Switched model");
    }

    /// Continue a stored conversation.
    pub fn resume(&mut self, record: ConversationRecord) {
        debug!(
            conversation = %record.id,
            messages = record.messages.len(),
            "Resuming conversation"
        );
        self.conversation_id = Some(record.id);
        self.model = record.model;
        self.transcript = record.messages;
    }

    /// Start a fresh, unsaved conversation with the current model.
    pub fn reset(&mut self) {
        self.conversation_id = None;
        self.transcript.clear();
    }

    /// Run one turn and return the assistant's reply.
    ///
    /// Sentinel replies are appended like any other reply.
    pub async fn send(&mut self, content: &str) -> Result<Reply, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        self.transcript.push(Message::user(content));

        let reply = self.adapter.call_model(&self.model, &self.transcript).await;
        self.transcript.push(reply.clone().into_message());

        self.persist().await;
        Ok(reply)
    }

    async fn persist(&mut self) {
        let result = match self.conversation_id {
            Some(id) => self
                .store
                .merge(&self.user, &id, &self.transcript, &self.model)
                .await,
            None => self
                .store
                .create(&self.user, &self.transcript, &self.model)
                .await
                .map(|id| {
                    self.conversation_id = Some(id);
                }),
        };

        if let Err(e) = result {
            warn!(user = %self.user, error = %e, "Failed to save conversation");
        }
    }
}
