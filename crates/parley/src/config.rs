use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::llm::Provider;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default = "default_model")]
    pub default_model: String,
    /// API keys. Never read from the config file.
    #[serde(skip)]
    pub credentials: Credentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            store: StoreConfig::default(),
            user: UserConfig::default(),
            default_model: default_model(),
            credentials: Credentials::default(),
        }
    }
}

impl Config {
    /// Load the config file and pick up credentials from the environment.
    ///
    /// A missing file yields the defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::load_file(path).await?;
        config.credentials = Credentials::from_env();
        Ok(config)
    }

    async fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }
}

fn default_model() -> String {
    Provider::ChatGpt.to_string()
}

// ============================================================================
// ProvidersConfig
// ============================================================================

/// Endpoint and model name for each supported provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_chatgpt")]
    pub chatgpt: ProviderConfig,
    #[serde(default = "default_claude")]
    pub claude: ProviderConfig,
    #[serde(default = "default_deepseek")]
    pub deepseek: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            chatgpt: default_chatgpt(),
            claude: default_claude(),
            deepseek: default_deepseek(),
        }
    }
}

impl ProvidersConfig {
    pub fn get(&self, provider: Provider) -> &ProviderConfig {
        match provider {
            Provider::ChatGpt => &self.chatgpt,
            Provider::Claude => &self.claude,
            Provider::DeepSeek => &self.deepseek,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

fn default_chatgpt() -> ProviderConfig {
    ProviderConfig::new("https://api.openai.com/v1", "gpt-3.5-turbo")
}

fn default_claude() -> ProviderConfig {
    ProviderConfig::new("https://api.anthropic.com", "claude-3-haiku-20240307")
}

fn default_deepseek() -> ProviderConfig {
    ProviderConfig::new("https://api.deepseek.com/v1", "deepseek-chat")
}

// ============================================================================
// Credentials
// ============================================================================

/// One API key per provider. Absent keys are not an error.
#[derive(Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
}

impl Credentials {
    pub const OPENAI_API_KEY: &'static str = "OPENAI_API_KEY";
    pub const ANTHROPIC_API_KEY: &'static str = "ANTHROPIC_API_KEY";
    pub const DEEPSEEK_API_KEY: &'static str = "DEEPSEEK_API_KEY";

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            let value = lookup(name).filter(|v| !v.is_empty());
            if value.is_none() {
                debug!(var = name, "API key not set");
            }
            value
        };

        Self {
            openai_api_key: read(Self::OPENAI_API_KEY),
            anthropic_api_key: read(Self::ANTHROPIC_API_KEY),
            deepseek_api_key: read(Self::DEEPSEEK_API_KEY),
        }
    }

    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::ChatGpt => self.openai_api_key.as_deref(),
            Provider::Claude => self.anthropic_api_key.as_deref(),
            Provider::DeepSeek => self.deepseek_api_key.as_deref(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("anthropic_api_key", &mask(&self.anthropic_api_key))
            .field("deepseek_api_key", &mask(&self.deepseek_api_key))
            .finish()
    }
}

// ============================================================================
// StoreConfig
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".parley/conversations")
}

// ============================================================================
// UserConfig
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub id: Option<String>,
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),
}

// ============================================================================
// Tests
// ============================================================================
