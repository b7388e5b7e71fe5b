//! Request predicate seam
//!
//! The matching engine treats predicates as opaque. A predicate that cannot
//! be evaluated reports a [`PredicateError`]; the engine skips that mapping
//! and keeps evaluating the rest.

use crate::request::Request;
use std::fmt;

/// Why a predicate could not be evaluated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredicateError {
    /// A pattern in the predicate does not compile
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// Request data could not be evaluated against the predicate
    #[error("predicate could not be evaluated: {0}")]
    Unevaluable(String),
}

/// Opaque request predicate
pub trait RequestPredicate: Send + Sync + fmt::Debug {
    /// Whether the request satisfies this predicate
    ///
    /// # Errors
    /// Returns [`PredicateError`] when the predicate cannot be evaluated
    fn matches(&self, request: &Request) -> Result<bool, PredicateError>;

    /// JSON description for admin listings
    fn describe(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Predicate matching every request
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyRequest;

impl RequestPredicate for AnyRequest {
    fn matches(&self, _request: &Request) -> Result<bool, PredicateError> {
        Ok(true)
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({ "method": "ANY" })
    }
}

/// Predicate backed by a closure
pub struct FnPredicate<F> {
    f: F,
}

impl<F> FnPredicate<F>
where
    F: Fn(&Request) -> Result<bool, PredicateError> + Send + Sync,
{
    /// Wrap a closure
    #[inline]
    #[must_use]
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnPredicate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredicate").finish_non_exhaustive()
    }
}

impl<F> RequestPredicate for FnPredicate<F>
where
    F: Fn(&Request) -> Result<bool, PredicateError> + Send + Sync,
{
    fn matches(&self, request: &Request) -> Result<bool, PredicateError> {
        (self.f)(request)
    }
}
