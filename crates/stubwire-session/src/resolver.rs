//! Session identity resolution
//!
//! Provides [`SessionResolver`], which picks the session for a request.
//!
//! # Priority
//! 1. Non-empty session header value
//! 2. Non-empty session cookie value
//! 3. A freshly minted, single-use (ephemeral) id
//!
//! The cookie is ignored entirely whenever the header resolves.

use crate::id::SessionId;
use crate::signals::{Cookies, Headers};

/// Header a client uses to name its session
pub const DEFAULT_HEADER_NAME: &str = "X-WireMock-Session-Id";

/// Cookie a client uses to carry its session
pub const DEFAULT_COOKIE_NAME: &str = "WireMockSessionId";

/// Where a resolved session came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    /// Explicit session header
    Header,
    /// Session cookie
    Cookie,
    /// No signal present; id minted for this request
    Minted,
    /// Session awareness disabled
    Global,
}

/// Outcome of resolving a request's session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    id: SessionId,
    source: SessionSource,
}

impl ResolvedSession {
    /// Resolved session id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Consume into the session id
    #[inline]
    #[must_use]
    pub fn into_id(self) -> SessionId {
        self.id
    }

    /// Signal the id was taken from
    #[inline]
    #[must_use]
    pub fn source(&self) -> SessionSource {
        self.source
    }

    /// True only when no signal was present and the id was minted
    ///
    /// The response layer uses this to decide whether to set a session cookie.
    #[inline]
    #[must_use]
    pub fn is_ephemeral(&self) -> bool {
        self.source == SessionSource::Minted
    }
}

/// Resolves request signals into a [`SessionId`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResolver {
    header_name: String,
    cookie_name: String,
    session_aware: bool,
}

impl SessionResolver {
    /// Create resolver with custom signal names
    #[inline]
    #[must_use]
    pub fn new(header_name: impl Into<String>, cookie_name: impl Into<String>) -> Self {
        Self {
            header_name: header_name.into(),
            cookie_name: cookie_name.into(),
            session_aware: true,
        }
    }

    /// Resolver that maps every request to the global session
    #[inline]
    #[must_use]
    pub fn global_only() -> Self {
        Self {
            session_aware: false,
            ..Self::default()
        }
    }

    /// Enable or disable per-session resolution
    #[inline]
    #[must_use]
    pub fn with_session_aware(mut self, session_aware: bool) -> Self {
        self.session_aware = session_aware;
        self
    }

    /// Header name consulted first
    #[inline]
    #[must_use]
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Cookie name consulted second
    #[inline]
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Whether sessions are resolved per client
    #[inline]
    #[must_use]
    pub fn is_session_aware(&self) -> bool {
        self.session_aware
    }

    /// Resolve the session for a request
    ///
    /// Pure in its inputs except for the minted case, which never repeats.
    #[must_use]
    pub fn resolve(&self, headers: &Headers, cookies: &Cookies) -> ResolvedSession {
        if !self.session_aware {
            return ResolvedSession {
                id: SessionId::global(),
                source: SessionSource::Global,
            };
        }

        if let Some(id) = headers
            .get(&self.header_name)
            .and_then(|v| SessionId::new(v).ok())
        {
            tracing::debug!("Session {} resolved from header", id);
            return ResolvedSession {
                id,
                source: SessionSource::Header,
            };
        }

        if let Some(id) = cookies
            .get(&self.cookie_name)
            .and_then(|v| SessionId::new(v).ok())
        {
            tracing::debug!("Session {} resolved from cookie", id);
            return ResolvedSession {
                id,
                source: SessionSource::Cookie,
            };
        }

        let id = SessionId::random();
        tracing::debug!("No session signal, minted {}", id);
        ResolvedSession {
            id,
            source: SessionSource::Minted,
        }
    }

    /// Resolve only from presented signals, never minting
    ///
    /// Admin operations use this: without a signal they act on the global session.
    #[must_use]
    pub fn resolve_presented(&self, headers: &Headers, cookies: &Cookies) -> SessionId {
        match self.resolve(headers, cookies) {
            resolved if resolved.is_ephemeral() => SessionId::global(),
            resolved => resolved.into_id(),
        }
    }
}

impl Default for SessionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_NAME, DEFAULT_COOKIE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(name: &str, value: &str) -> Headers {
        [(name, value)].into_iter().collect()
    }

    #[test]
    fn header_resolves_first() {
        let resolver = SessionResolver::default();
        let headers = headers_with(DEFAULT_HEADER_NAME, "h");
        let cookies = Cookies::parse("WireMockSessionId=c");

        let resolved = resolver.resolve(&headers, &cookies);
        assert_eq!(resolved.id().as_str(), "h");
        assert_eq!(resolved.source(), SessionSource::Header);
    }

    #[test]
    fn cookie_used_without_header() {
        let resolver = SessionResolver::default();
        let cookies = Cookies::parse("WireMockSessionId=custom-client-id");

        let resolved = resolver.resolve(&Headers::new(), &cookies);
        assert_eq!(resolved.id().as_str(), "custom-client-id");
        assert_eq!(resolved.source(), SessionSource::Cookie);
        assert!(!resolved.is_ephemeral());
    }

    #[test]
    fn empty_header_falls_through_to_cookie() {
        let resolver = SessionResolver::default();
        let headers = headers_with(DEFAULT_HEADER_NAME, "");
        let cookies = Cookies::parse("WireMockSessionId=c");

        assert_eq!(resolver.resolve(&headers, &cookies).id().as_str(), "c");
    }

    #[test]
    fn empty_cookie_mints() {
        let resolver = SessionResolver::default();
        let cookies = Cookies::parse("WireMockSessionId=");

        assert!(resolver.resolve(&Headers::new(), &cookies).is_ephemeral());
    }

    #[test]
    fn no_signal_mints_distinct_ids() {
        let resolver = SessionResolver::default();
        let a = resolver.resolve(&Headers::new(), &Cookies::new());
        let b = resolver.resolve(&Headers::new(), &Cookies::new());

        assert!(a.is_ephemeral() && b.is_ephemeral());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn custom_signal_names() {
        let resolver = SessionResolver::new("X-Session", "sid");
        let cookies = Cookies::parse("sid=from-cookie");
        assert_eq!(resolver.resolve(&Headers::new(), &cookies).id().as_str(), "from-cookie");

        let headers = headers_with(DEFAULT_HEADER_NAME, "ignored");
        assert!(resolver.resolve(&headers, &Cookies::new()).is_ephemeral());
    }

    #[test]
    fn global_mode_ignores_signals() {
        let resolver = SessionResolver::global_only();
        let headers = headers_with(DEFAULT_HEADER_NAME, "h");

        let resolved = resolver.resolve(&headers, &Cookies::new());
        assert!(resolved.id().is_global());
        assert!(!resolved.is_ephemeral());
    }

    #[test]
    fn resolve_presented_defaults_to_global() {
        let resolver = SessionResolver::default();
        assert!(resolver
            .resolve_presented(&Headers::new(), &Cookies::new())
            .is_global());

        let headers = headers_with(DEFAULT_HEADER_NAME, "h");
        assert_eq!(
            resolver.resolve_presented(&headers, &Cookies::new()).as_str(),
            "h"
        );
    }
}
