//! SessionId - opaque client session token
//!
//! Provides [`SessionId`], the key every piece of scenario state is scoped by.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// Value of the single shared session used when session awareness is off
pub const GLOBAL_SESSION_ID: &str = "__global__";

/// Session construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Session tokens must carry at least one character
    #[error("session id must not be empty")]
    EmptyId,
}

/// Opaque string token identifying one logical client session
///
/// Two requests presenting the same token belong to the same session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Create session id from a presented token
    ///
    /// # Errors
    /// Returns [`SessionError::EmptyId`] for an empty token
    pub fn new(value: impl Into<String>) -> Result<Self, SessionError> {
        let value = value.into();
        if value.is_empty() {
            return Err(SessionError::EmptyId);
        }
        Ok(Self(value))
    }

    /// The shared session every request maps to in non-session mode
    #[inline]
    #[must_use]
    pub fn global() -> Self {
        Self(GLOBAL_SESSION_ID.to_string())
    }

    /// Mint a fresh, globally unique session id
    #[inline]
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Whether this is the shared global session
    #[inline]
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.0 == GLOBAL_SESSION_ID
    }

    /// Token as presented on the wire
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
