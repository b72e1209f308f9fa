//! LLM provider adapter for chat completions.

mod adapter;
mod anthropic;
mod error;
mod openai;
mod provider;
mod types;

pub use adapter::ModelAdapter;
pub use error::{LLMError, UnknownProvider};
pub use provider::{MAX_TOKENS, Provider, TEMPERATURE};
pub use types::{Message, Reply, Role};
