//! User identity.
//!
//! The rest of the crate only ever sees an opaque [`UserId`]. It doubles as
//! the store namespace, so it is restricted to characters that are safe in a
//! path component.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable consulted when the config has no `user.id`.
pub const USER_ENV: &str = "PARLEY_USER";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("no user configured; set user.id in the config file or {USER_ENV}")]
    NoUser,

    #[error("invalid user id '{0}': use letters, digits, '-', '_', '.' or '@'")]
    InvalidUserId(String),
}

/// Opaque identifier of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, AuthError> {
        let raw = raw.into();
        let valid = !raw.is_empty()
            && !raw.starts_with('.')
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));

        if valid {
            Ok(Self(raw))
        } else {
            Err(AuthError::InvalidUserId(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = AuthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Resolve the signed-in user.
///
/// Order: configured id, then `PARLEY_USER`, then the OS `USER`.
pub fn resolve_user(configured: Option<&str>) -> Result<UserId, AuthError> {
    resolve_with(configured, |name| std::env::var(name).ok())
}

fn resolve_with(
    configured: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<UserId, AuthError> {
    let candidate =
        |raw: Option<String>| raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let raw = candidate(configured.map(str::to_string))
        .or_else(|| candidate(lookup(USER_ENV)))
        .or_else(|| candidate(lookup("USER")))
        .ok_or(AuthError::NoUser)?;

    UserId::parse(raw)
}
