//! OpenAI-compatible chat completions.
//!
//! Used for both ChatGPT and DeepSeek, which share the request format and
//! bearer-token auth. They differ only in how replies are extracted.

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use super::provider::{MAX_TOKENS, TEMPERATURE, text_at};
use super::types::Message;

#[derive(Debug, Serialize)]
pub(super) struct Request<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

pub(super) fn to_request<'a>(model: &'a str, transcript: &'a [Message]) -> Request<'a> {
    Request {
        model,
        messages: transcript,
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    }
}

/// Build a POST to `{base_url}/chat/completions`.
pub(super) fn build_request(
    client: &Client,
    base_url: &str,
    api_key: Option<&str>,
    body: &Request<'_>,
) -> RequestBuilder {
    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));

    let mut req = client.post(&url).header("Content-Type", "application/json");

    if let Some(key) = api_key {
        req = req.header("Authorization", format!("Bearer {}", key));
    }

    req.json(body)
}

/// `choices[0].message.content`
pub(super) fn message_content(body: &Value) -> Option<String> {
    text_at(body, "/choices/0/message/content")
}

/// `choices[0].text` (legacy completions shape)
pub(super) fn completion_text(body: &Value) -> Option<String> {
    text_at(body, "/choices/0/text")
}
