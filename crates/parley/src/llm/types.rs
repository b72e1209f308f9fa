//! Common types for chat transcripts and model replies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// The outcome of a single model call.
///
/// Every variant renders to the text that gets appended to the transcript,
/// so callers never have to handle a failure separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text extracted from the provider's response.
    Text(String),
    /// The call succeeded but the body held no recognizable reply.
    NoResponse,
    /// The network call itself failed.
    Error,
    /// The provider identifier is not one we know how to call.
    UnknownModel,
}

impl Reply {
    pub const NO_RESPONSE: &'static str = "No response";
    pub const ERROR: &'static str = "Error calling AI";
    pub const UNKNOWN_MODEL: &'static str = "Unknown model";

    pub fn as_str(&self) -> &str {
        match self {
            Reply::Text(text) => text,
            Reply::NoResponse => Self::NO_RESPONSE,
            Reply::Error => Self::ERROR,
            Reply::UnknownModel => Self::UNKNOWN_MODEL,
        }
    }

    /// Whether this is a sentinel rather than real model output.
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Reply::Text(_))
    }

    pub fn into_message(self) -> Message {
        match self {
            Reply::Text(text) => Message::assistant(text),
            other => Message::assistant(other.as_str()),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_roles() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );

        assert_eq!(serde_json::from_str::<Role>("\"user\"").unwrap(), Role::User);
        assert_eq!(
            serde_json::from_str::<Role>("\"assistant\"").unwrap(),
            Role::Assistant
        );
    }

    #[test]
    fn test_unsupported_role_rejected() {
        assert!(serde_json::from_str::<Role>("\"system\"").is_err());
        assert!(serde_json::from_str::<Message>(r#"{"role":"tool","content":"x"}"#).is_err());
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_string(&Message::user("Hello!")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"Hello!"}"#);
    }

    #[test]
    fn test_reply_sentinels() {
        assert_eq!(Reply::NoResponse.to_string(), "No response");
        assert_eq!(Reply::Error.to_string(), "Error calling AI");
        assert_eq!(Reply::UnknownModel.to_string(), "Unknown model");
        assert_eq!(Reply::Text("hi".to_string()).to_string(), "hi");

        assert!(Reply::Error.is_sentinel());
        assert!(!Reply::Text("hi".to_string()).is_sentinel());
    }

    #[test]
    fn test_reply_into_message() {
        let message = Reply::NoResponse.into_message();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "No response");

        let message = Reply::Text("hello".to_string()).into_message();
        assert_eq!(message, Message::assistant("hello"));
    }
}
