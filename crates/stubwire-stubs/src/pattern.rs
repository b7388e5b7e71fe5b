//! Basic request pattern
//!
//! Provides [`RequestPattern`], a small [`RequestPredicate`] over method,
//! url and headers. Regexes are compiled once on construction; one that
//! fails to compile makes every evaluation return
//! [`PredicateError::InvalidPattern`].
//!
//! # JSON form
//! ```json
//! { "method": "GET", "urlPattern": "/api/.*", "headers": { "Accept": { "equalTo": "text/plain" } } }
//! ```

use crate::predicate::{PredicateError, RequestPredicate};
use crate::request::Request;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header value matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderMatcher {
    /// Exact value
    EqualTo(String),
    /// Substring
    Contains(String),
    /// Whole-value regex
    Matches(String),
}

/// Wire form of a request pattern
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PatternFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, HeaderMatcher>,
}

/// Regex compiled at construction, or the reason it failed
#[derive(Debug, Clone)]
struct CompiledRegex {
    source: String,
    compiled: Result<Regex, String>,
}

impl CompiledRegex {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            compiled: Regex::new(&format!("^(?:{source})$")).map_err(|e| e.to_string()),
        }
    }

    fn is_match(&self, haystack: &str) -> Result<bool, PredicateError> {
        match &self.compiled {
            Ok(regex) => Ok(regex.is_match(haystack)),
            Err(reason) => Err(PredicateError::InvalidPattern {
                pattern: self.source.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

/// Method, url and header request predicate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PatternFields", into = "PatternFields")]
pub struct RequestPattern {
    fields: PatternFields,
    url_regex: Option<CompiledRegex>,
    header_regexes: BTreeMap<String, CompiledRegex>,
}

impl RequestPattern {
    /// Pattern matching any method and url
    #[inline]
    #[must_use]
    pub fn any() -> Self {
        Self::from(PatternFields::default())
    }

    /// `GET` with exact url
    #[inline]
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::any().with_method("GET").with_url(url)
    }

    /// `PUT` with exact url
    #[inline]
    #[must_use]
    pub fn put(url: impl Into<String>) -> Self {
        Self::any().with_method("PUT").with_url(url)
    }

    /// `POST` with exact url
    #[inline]
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::any().with_method("POST").with_url(url)
    }

    /// With method (`ANY` matches every method)
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.fields.method = Some(method.into().to_ascii_uppercase());
        self
    }

    /// With exact url (path and query)
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.fields.url = Some(url.into());
        self
    }

    /// With exact path, query ignored
    #[must_use]
    pub fn with_url_path(mut self, path: impl Into<String>) -> Self {
        self.fields.url_path = Some(path.into());
        self
    }

    /// With whole-url regex
    #[must_use]
    pub fn with_url_pattern(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        self.url_regex = Some(CompiledRegex::new(&pattern));
        self.fields.url_pattern = Some(pattern);
        self
    }

    /// With header matcher
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, matcher: HeaderMatcher) -> Self {
        let name = name.into();
        match &matcher {
            HeaderMatcher::Matches(pattern) => {
                self.header_regexes
                    .insert(name.clone(), CompiledRegex::new(pattern));
            }
            HeaderMatcher::EqualTo(_) | HeaderMatcher::Contains(_) => {
                self.header_regexes.remove(&name);
            }
        }
        self.fields.headers.insert(name, matcher);
        self
    }

    fn method_matches(&self, request: &Request) -> bool {
        match self.fields.method.as_deref() {
            None | Some("ANY") => true,
            Some(method) => method.eq_ignore_ascii_case(request.method()),
        }
    }

    fn headers_match(&self, request: &Request) -> Result<bool, PredicateError> {
        for (name, matcher) in &self.fields.headers {
            let Some(value) = request.headers().get(name) else {
                return Ok(false);
            };
            let matched = match matcher {
                HeaderMatcher::EqualTo(expected) => value == expected,
                HeaderMatcher::Contains(needle) => value.contains(needle.as_str()),
                HeaderMatcher::Matches(_) => match self.header_regexes.get(name) {
                    Some(regex) => regex.is_match(value)?,
                    None => false,
                },
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Default for RequestPattern {
    fn default() -> Self {
        Self::any()
    }
}

impl From<PatternFields> for RequestPattern {
    fn from(fields: PatternFields) -> Self {
        let url_regex = fields.url_pattern.as_deref().map(CompiledRegex::new);
        let header_regexes = fields
            .headers
            .iter()
            .filter_map(|(name, matcher)| match matcher {
                HeaderMatcher::Matches(pattern) => Some((name.clone(), CompiledRegex::new(pattern))),
                HeaderMatcher::EqualTo(_) | HeaderMatcher::Contains(_) => None,
            })
            .collect();
        let fields = PatternFields {
            method: fields.method.map(|m| m.to_ascii_uppercase()),
            ..fields
        };
        Self {
            fields,
            url_regex,
            header_regexes,
        }
    }
}

impl From<RequestPattern> for PatternFields {
    fn from(pattern: RequestPattern) -> Self {
        pattern.fields
    }
}

impl RequestPredicate for RequestPattern {
    fn matches(&self, request: &Request) -> Result<bool, PredicateError> {
        if !self.method_matches(request) {
            return Ok(false);
        }
        if let Some(url) = &self.fields.url {
            if url != request.url() {
                return Ok(false);
            }
        }
        if let Some(path) = &self.fields.url_path {
            if path != request.path() {
                return Ok(false);
            }
        }
        if let Some(regex) = &self.url_regex {
            if !regex.is_match(request.url())? {
                return Ok(false);
            }
        }
        self.headers_match(request)
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::to_value(&self.fields).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn method_and_url_must_match() {
        let pattern = RequestPattern::get("/state");
        assert_eq!(pattern.matches(&Request::new("GET", "/state")), Ok(true));
        assert_eq!(pattern.matches(&Request::new("PUT", "/state")), Ok(false));
        assert_eq!(pattern.matches(&Request::new("GET", "/state?x=1")), Ok(false));
    }

    #[test]
    fn any_method() {
        let pattern = RequestPattern::any().with_method("any").with_url_path("/x");
        assert_eq!(pattern.matches(&Request::new("DELETE", "/x?y=1")), Ok(true));
    }

    #[test]
    fn url_pattern_matches_whole_url() {
        let pattern = RequestPattern::any().with_url_pattern("/api/[0-9]+");
        assert_eq!(pattern.matches(&Request::new("GET", "/api/42")), Ok(true));
        assert_eq!(pattern.matches(&Request::new("GET", "/api/42/x")), Ok(false));
    }

    #[test]
    fn invalid_url_pattern_is_reported() {
        let pattern = RequestPattern::any().with_url_pattern("/api/[");
        let result = pattern.matches(&Request::new("GET", "/api/1"));
        assert!(matches!(result, Err(PredicateError::InvalidPattern { .. })));
    }

    #[test]
    fn invalid_pattern_not_evaluated_when_method_differs() {
        let pattern = RequestPattern::get("/x").with_url_pattern("(");
        assert_eq!(pattern.matches(&Request::new("POST", "/x")), Ok(false));
    }

    #[test]
    fn header_matchers() {
        let pattern = RequestPattern::any()
            .with_header("Accept", HeaderMatcher::EqualTo("text/plain".into()))
            .with_header("User-Agent", HeaderMatcher::Matches("curl/.*".into()))
            .with_header("X-Trace", HeaderMatcher::Contains("abc".into()));

        let request = Request::new("GET", "/")
            .with_header("accept", "text/plain")
            .with_header("user-agent", "curl/8.0")
            .with_header("x-trace", "zzabczz");
        assert_eq!(pattern.matches(&request), Ok(true));

        let missing = Request::new("GET", "/").with_header("accept", "text/plain");
        assert_eq!(pattern.matches(&missing), Ok(false));
    }

    #[test]
    fn deserialize_wire_form() {
        let pattern: RequestPattern = serde_json::from_str(
            r#"{"method":"get","url":"/state","headers":{"X-A":{"equalTo":"1"}}}"#,
        )
        .unwrap();

        let request = Request::new("GET", "/state").with_header("X-A", "1");
        assert_eq!(pattern.matches(&request), Ok(true));
        assert_eq!(
            pattern.describe(),
            serde_json::json!({"method":"GET","url":"/state","headers":{"X-A":{"equalTo":"1"}}})
        );
    }

    #[test]
    fn deserialized_regex_is_compiled() {
        let pattern: RequestPattern =
            serde_json::from_str(r#"{"urlPattern":"/items/.*"}"#).unwrap();
        assert_eq!(pattern.matches(&Request::new("GET", "/items/7")), Ok(true));
    }
}
