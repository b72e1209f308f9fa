//! LLM error types.

use thiserror::Error;

/// Errors that can occur when making LLM API calls.
///
/// These never reach the adapter's callers; they are logged and folded into
/// a sentinel [`Reply`](super::Reply).
#[derive(Debug, Error)]
pub enum LLMError {
    /// HTTP request failed
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Raised when parsing a provider identifier outside the supported set.
#[derive(Debug, Error)]
#[error("unknown model '{0}'")]
pub struct UnknownProvider(pub String);
