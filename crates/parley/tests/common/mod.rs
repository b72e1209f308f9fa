//! In-process stand-in for provider HTTP endpoints.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use parley::config::{Credentials, ProviderConfig, ProvidersConfig};
use parley::llm::ModelAdapter;
use serde_json::Value;

pub const OPENAI_PATH: &str = "/chat/completions";
pub const ANTHROPIC_PATH: &str = "/v1/messages";

/// A request the mock server received.
#[derive(Debug, Clone)]
pub struct Captured {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone, Default)]
struct MockState {
    responses: Arc<HashMap<String, (StatusCode, String)>>,
    requests: Arc<Mutex<Vec<Captured>>>,
}

pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl MockServer {
    /// Serve `(path, status, body)` triples on an ephemeral port.
    pub async fn start(routes: Vec<(&str, StatusCode, String)>) -> Self {
        let state = MockState {
            responses: Arc::new(
                routes
                    .into_iter()
                    .map(|(path, status, body)| (path.to_string(), (status, body)))
                    .collect(),
            ),
            requests: Arc::default(),
        };
        let requests = state.requests.clone();

        let app = Router::new().fallback(respond).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    /// Single OpenAI-style route answering 200 with `body`.
    pub async fn openai(body: Value) -> Self {
        Self::start(vec![(OPENAI_PATH, StatusCode::OK, body.to_string())]).await
    }

    /// Single Anthropic-style route answering 200 with `body`.
    pub async fn anthropic(body: Value) -> Self {
        Self::start(vec![(ANTHROPIC_PATH, StatusCode::OK, body.to_string())]).await
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.requests.lock().unwrap().clone()
    }

    /// Adapter pointing every provider at this server.
    pub fn adapter(&self, credentials: Credentials) -> ModelAdapter {
        ModelAdapter::new(
            reqwest::Client::new(),
            providers(&self.base_url),
            credentials,
        )
    }
}

async fn respond(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    state.requests.lock().unwrap().push(Captured {
        path: uri.path().to_string(),
        headers,
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    state
        .responses
        .get(uri.path())
        .cloned()
        .unwrap_or((StatusCode::NOT_FOUND, "not found".to_string()))
}

pub fn providers(base_url: &str) -> ProvidersConfig {
    ProvidersConfig {
        chatgpt: ProviderConfig::new(base_url, "gpt-test"),
        claude: ProviderConfig::new(base_url, "claude-test"),
        deepseek: ProviderConfig::new(base_url, "deepseek-test"),
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        openai_api_key: Some("sk-openai".to_string()),
        anthropic_api_key: Some("sk-anthropic".to_string()),
        deepseek_api_key: Some("sk-deepseek".to_string()),
    }
}
