//! Supported LLM providers and per-provider dispatch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::UnknownProvider;
use super::{anthropic, openai};

/// Sampling temperature sent to every provider.
pub const TEMPERATURE: f32 = 0.7;

/// Upper bound on generated tokens sent to every provider.
pub const MAX_TOKENS: u32 = 1024;

/// Supported LLM providers.
///
/// Adding a provider means adding a variant here plus a request builder and
/// a reply extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    ChatGpt,
    Claude,
    DeepSeek,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::ChatGpt, Provider::Claude, Provider::DeepSeek];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::ChatGpt => "chatgpt",
            Provider::Claude => "claude",
            Provider::DeepSeek => "deepseek",
        }
    }

    /// Pull the assistant's text out of a decoded response body.
    ///
    /// Returns `None` when none of this provider's known shapes match.
    pub fn extract_reply(&self, body: &Value) -> Option<String> {
        match self {
            Provider::ChatGpt => {
                openai::message_content(body).or_else(|| openai::completion_text(body))
            }
            Provider::Claude => anthropic::extract_reply(body),
            Provider::DeepSeek => openai::message_content(body),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// Non-empty string at a JSON pointer.
pub(super) fn text_at(body: &Value, pointer: &str) -> Option<String> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
