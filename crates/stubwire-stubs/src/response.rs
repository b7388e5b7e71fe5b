//! Response template returned by a matched stub
//!
//! The engine hands the template back untouched; rendering belongs to the
//! HTTP front-end.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_status() -> u16 {
    200
}

/// Canned response for a stub mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTemplate {
    /// HTTP status code
    #[serde(default = "default_status")]
    pub status: u16,
    /// Response headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ResponseTemplate {
    /// Response with status and no body
    #[inline]
    #[must_use]
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// `200 OK` with no body
    #[inline]
    #[must_use]
    pub fn ok() -> Self {
        Self::with_status(200)
    }

    /// With body
    #[inline]
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// With header
    #[inline]
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Body or empty string
    #[inline]
    #[must_use]
    pub fn body_str(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    /// Whether the status is a valid HTTP status code
    #[inline]
    #[must_use]
    pub fn has_valid_status(&self) -> bool {
        (100..=599).contains(&self.status)
    }
}

impl Default for ResponseTemplate {
    fn default() -> Self {
        Self::ok()
    }
}
