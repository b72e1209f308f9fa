//! Provider adapter: one transcript in, one reply out.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::LLMError;
use super::provider::Provider;
use super::types::{Message, Reply};
use super::{anthropic, openai};
use crate::config::{Config, Credentials, ProvidersConfig};

/// Calls the selected provider's HTTP endpoint and normalizes its reply.
///
/// Stateless apart from the shared HTTP client; every call is a single
/// request/response round trip with no retries.
#[derive(Clone)]
pub struct ModelAdapter {
    client: Client,
    providers: ProvidersConfig,
    credentials: Credentials,
}

impl ModelAdapter {
    pub fn new(client: Client, providers: ProvidersConfig, credentials: Credentials) -> Self {
        Self {
            client,
            providers,
            credentials,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Client::new(),
            config.providers.clone(),
            config.credentials.clone(),
        )
    }

    /// Send `transcript` to the provider named by `provider_id`.
    ///
    /// Never fails: unknown identifiers, transport errors and unrecognized
    /// response shapes all come back as sentinel replies.
    pub async fn call_model(&self, provider_id: &str, transcript: &[Message]) -> Reply {
        let Ok(provider) = provider_id.parse::<Provider>() else {
            debug!(provider = provider_id, "Unknown model requested");
            return Reply::UnknownModel;
        };

        let body = match self.send(provider, transcript).await {
            Ok(Some(body)) => body,
            Ok(None) => return Reply::NoResponse,
            Err(e) => {
                warn!(provider = %provider, error = %e, "Provider call failed");
                return Reply::Error;
            }
        };

        match provider.extract_reply(&body) {
            Some(text) => Reply::Text(text),
            None => {
                debug!(provider = %provider, %body, "No reply found in response");
                Reply::NoResponse
            }
        }
    }

    /// Perform the round trip. `Ok(None)` means the body arrived but was not JSON.
    async fn send(
        &self,
        provider: Provider,
        transcript: &[Message],
    ) -> Result<Option<Value>, LLMError> {
        let settings = self.providers.get(provider);
        let api_key = self.credentials.get(provider);

        let req = match provider {
            Provider::ChatGpt | Provider::DeepSeek => openai::build_request(
                &self.client,
                &settings.base_url,
                api_key,
                &openai::to_request(&settings.model, transcript),
            ),
            Provider::Claude => anthropic::build_request(
                &self.client,
                &settings.base_url,
                api_key,
                &anthropic::to_request(&settings.model, transcript),
            ),
        };

        debug!(
            provider = %provider,
            model = %settings.model,
            messages = transcript.len(),
            "Sending chat request"
        );
        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!(provider = %provider, status = status.as_u16(), "Provider returned error status");
        }

        match serde_json::from_str(&text) {
            Ok(body) => Ok(Some(body)),
            Err(e) => {
                warn!(
                    provider = %provider,
                    status = status.as_u16(),
                    error = %e,
                    "Provider response is not JSON"
                );
                Ok(None)
            }
        }
    }
}
