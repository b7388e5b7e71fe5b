//! Error types for Stubwire Core
//!
//! Per-request outcomes are never errors: an unmatched request is
//! [`crate::MatchResult::NoMatch`] and a predicate that cannot be evaluated
//! is skipped. Errors only arise from admin operations.

use stubwire_session::SessionError;
use stubwire_stubs::{MappingError, StubId};

/// Admin operation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StubError {
    /// Mapping rejected at registration
    #[error("invalid mapping: {0}")]
    InvalidMapping(#[from] MappingError),

    /// Session id rejected
    #[error("invalid session: {0}")]
    InvalidSession(#[from] SessionError),

    /// Scenario not referenced by any registered mapping
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
}

impl StubError {
    /// Whether the error names something that does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::InvalidMapping(MappingError::NotFound(_)) | Self::UnknownScenario(_)
        )
    }

    /// Mapping not found
    #[inline]
    #[must_use]
    pub fn stub_not_found(id: StubId) -> Self {
        Self::InvalidMapping(MappingError::NotFound(id))
    }
}

/// Result alias for admin operations
pub type StubResult<T> = Result<T, StubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_classification() {
        assert!(StubError::stub_not_found(StubId::new()).is_not_found());
        assert!(StubError::UnknownScenario("S".into()).is_not_found());
        assert!(!StubError::from(MappingError::MissingPredicate).is_not_found());
        assert!(!StubError::from(SessionError::EmptyId).is_not_found());
    }
}
