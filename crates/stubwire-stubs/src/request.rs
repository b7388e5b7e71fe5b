//! Inbound request as seen by predicates and the session resolver

use stubwire_session::{Cookies, Headers};

/// An inbound stub request
///
/// Cookies are derived from the `Cookie` headers and kept in sync with them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    method: String,
    url: String,
    headers: Headers,
    cookies: Cookies,
    body: Vec<u8>,
}

impl Request {
    /// Create request with method and url (path plus optional query)
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Create request from already collected parts
    #[must_use]
    pub fn from_parts(
        method: impl Into<String>,
        url: impl Into<String>,
        headers: Headers,
        body: Vec<u8>,
    ) -> Self {
        let cookies = Cookies::from_headers(&headers);
        Self {
            method: method.into().to_ascii_uppercase(),
            url: url.into(),
            headers,
            cookies,
            body,
        }
    }

    /// With an extra header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let is_cookie = name.eq_ignore_ascii_case("cookie");
        self.headers.insert(name, value);
        if is_cookie {
            self.cookies = Cookies::from_headers(&self.headers);
        }
        self
    }

    /// With a body
    #[inline]
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Upper-case method
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Full url: path and query
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path without query
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.split_once('?').map_or(self.url.as_str(), |(path, _)| path)
    }

    /// Request headers
    #[inline]
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Request cookies
    #[inline]
    #[must_use]
    pub fn cookies(&self) -> &Cookies {
        &self.cookies
    }

    /// Raw body
    #[inline]
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_is_normalised() {
        assert_eq!(Request::new("get", "/x").method(), "GET");
    }

    #[test]
    fn path_strips_query() {
        let request = Request::new("GET", "/api/data?page=2");
        assert_eq!(request.path(), "/api/data");
        assert_eq!(request.url(), "/api/data?page=2");
    }

    #[test]
    fn cookie_header_populates_cookies() {
        let request = Request::new("GET", "/").with_header("Cookie", "WireMockSessionId=abc");
        assert_eq!(request.cookies().get("WireMockSessionId"), Some("abc"));
    }

    #[test]
    fn from_parts_parses_cookies() {
        let headers: Headers = [("cookie", "a=1")].into_iter().collect();
        let request = Request::from_parts("PUT", "/", headers, b"body".to_vec());
        assert_eq!(request.cookies().get("a"), Some("1"));
        assert_eq!(request.body(), b"body");
    }
}
