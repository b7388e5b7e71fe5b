//! Resolver property tests
//!
//! Header priority, determinism and ephemeral non-reuse over arbitrary tokens.

use proptest::prelude::*;
use std::collections::HashSet;
use stubwire_session::{Cookies, Headers, SessionResolver, DEFAULT_COOKIE_NAME, DEFAULT_HEADER_NAME};

fn token() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,32}"
}

fn request(header: Option<&str>, cookie: Option<&str>) -> (Headers, Cookies) {
    let mut headers = Headers::new();
    if let Some(h) = header {
        headers.insert(DEFAULT_HEADER_NAME, h);
    }
    let mut cookies = Cookies::new();
    if let Some(c) = cookie {
        cookies.insert(DEFAULT_COOKIE_NAME, c);
    }
    (headers, cookies)
}

proptest! {
    #[test]
    fn prop_header_always_wins(h in token(), c in token()) {
        let resolver = SessionResolver::default();
        let (headers, cookies) = request(Some(&h), Some(&c));

        let resolved = resolver.resolve(&headers, &cookies);
        prop_assert_eq!(resolved.id().as_str(), h.as_str());
        prop_assert!(!resolved.is_ephemeral());
    }

    #[test]
    fn prop_presented_signals_are_deterministic(
        h in proptest::option::of(token()),
        c in proptest::option::of(token()),
    ) {
        prop_assume!(h.is_some() || c.is_some());
        let resolver = SessionResolver::default();
        let (headers, cookies) = request(h.as_deref(), c.as_deref());

        let first = resolver.resolve(&headers, &cookies);
        let second = resolver.resolve(&headers, &cookies);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_ephemeral_ids_never_repeat(n in 1usize..64) {
        let resolver = SessionResolver::default();
        let (headers, cookies) = request(None, None);

        let ids: HashSet<_> = (0..n)
            .map(|_| resolver.resolve(&headers, &cookies).into_id())
            .collect();
        prop_assert_eq!(ids.len(), n);
    }
}
