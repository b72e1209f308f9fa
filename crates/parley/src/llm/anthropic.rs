//! Anthropic Messages API.

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use super::provider::{MAX_TOKENS, TEMPERATURE, text_at};
use super::types::Message;

pub const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
pub(super) struct Request<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
}

pub(super) fn to_request<'a>(model: &'a str, transcript: &'a [Message]) -> Request<'a> {
    Request {
        model,
        messages: transcript,
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}

/// Build a POST to `{base_url}/v1/messages`.
pub(super) fn build_request(
    client: &Client,
    base_url: &str,
    api_key: Option<&str>,
    body: &Request<'_>,
) -> RequestBuilder {
    let url = format!("{}/v1/messages", base_url.trim_end_matches('/'));

    let mut req = client
        .post(&url)
        .header("Content-Type", "application/json")
        .header("anthropic-version", API_VERSION);

    if let Some(key) = api_key {
        req = req.header("x-api-key", key);
    }

    req.json(body)
}

/// `content[0].text` when `content` is a non-empty array, else `message.content`.
pub(super) fn extract_reply(body: &Value) -> Option<String> {
    let has_blocks = body
        .get("content")
        .and_then(Value::as_array)
        .is_some_and(|blocks| !blocks.is_empty());

    has_blocks
        .then(|| text_at(body, "/content/0/text"))
        .flatten()
        .or_else(|| text_at(body, "/message/content"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let transcript = vec![Message::user("Hello"), Message::assistant("Hi")];
        let json =
            serde_json::to_value(to_request("claude-3-haiku-20240307", &transcript)).unwrap();

        assert_eq!(json["model"], "claude-3-haiku-20240307");
        assert_eq!(json["max_tokens"], 1024);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!(json.get("system").is_none());
        assert_eq!(
            json["messages"],
            json!([
                {"role": "user", "content": "Hello"},
                {"role": "assistant", "content": "Hi"}
            ])
        );
    }

    #[test]
    fn test_build_request_headers() {
        let client = Client::new();
        let transcript = vec![Message::user("Hi")];
        let body = to_request("claude-3-haiku-20240307", &transcript);

        let req = build_request(&client, "https://api.anthropic.com", Some("key-1"), &body)
            .build()
            .unwrap();
        assert_eq!(req.url().as_str(), "https://api.anthropic.com/v1/messages");
        assert_eq!(req.headers()["x-api-key"], "key-1");
        assert_eq!(req.headers()["anthropic-version"], "2023-06-01");
        assert!(req.headers().get("Authorization").is_none());
    }

    #[test]
    fn test_first_block_wins() {
        let body = json!({
            "content": [
                {"type": "text", "text": "first"},
                {"type": "text", "text": "second"}
            ]
        });
        assert_eq!(extract_reply(&body).as_deref(), Some("first"));
    }

    #[test]
    fn test_block_without_text_falls_back() {
        let body = json!({
            "content": [{"type": "tool_use", "id": "t1"}],
            "message": {"content": "from message"}
        });
        assert_eq!(extract_reply(&body).as_deref(), Some("from message"));

        let body = json!({"content": [{"type": "tool_use", "id": "t1"}]});
        assert!(extract_reply(&body).is_none());
    }

    #[test]
    fn test_non_array_content_ignored() {
        let body = json!({"content": "plain", "message": {"content": "fallback"}});
        assert_eq!(extract_reply(&body).as_deref(), Some("fallback"));
    }
}
