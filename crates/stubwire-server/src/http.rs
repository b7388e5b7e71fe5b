//! Conversions between warp/http types and engine types

use bytes::Bytes;
use percent_encoding::percent_decode_str;
use stubwire_core::{MatchResult, ServeEvent};
use stubwire_session::Headers;
use stubwire_stubs::{Request, ResponseTemplate};
use warp::http::header::{HeaderName, HeaderValue, CONTENT_TYPE, SET_COOKIE};
use warp::http::{HeaderMap, Method, StatusCode};
use warp::hyper::Body;
use warp::reply::Response;

/// Body of the 404 returned when no stub matches
pub const NO_MATCH_BODY: &str = "No stub mapping matched the request";

/// Collect request headers, decoding values lossily
#[must_use]
pub fn headers_from(map: &HeaderMap) -> Headers {
    map.iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Build the engine's view of an inbound request
#[must_use]
pub fn request_from(
    method: &Method,
    path: &str,
    query: &str,
    headers: &HeaderMap,
    body: &Bytes,
) -> Request {
    let url = if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    };
    Request::from_parts(method.as_str(), url, headers_from(headers), body.to_vec())
}

/// Percent-decode one path segment
///
/// Returns `None` if the decoded bytes are not UTF-8.
#[must_use]
pub fn decode_segment(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}

/// `Set-Cookie` value handing a minted session to the client
#[must_use]
pub fn session_cookie(cookie_name: &str, session: &str) -> String {
    format!("{cookie_name}={session}; Path=/; HttpOnly; SameSite=Lax")
}

/// Render a stub response template
#[must_use]
pub fn render_template(template: &ResponseTemplate) -> Response {
    let mut response = Response::new(Body::from(template.body_str().to_string()));
    *response.status_mut() =
        StatusCode::from_u16(template.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    for (name, value) in &template.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().append(name, value);
            }
            _ => tracing::warn!("Dropping invalid response header {}", name),
        }
    }
    response
}

/// Plain-text response
#[must_use]
pub fn text(status: StatusCode, body: impl Into<String>) -> Response {
    let mut response = Response::new(Body::from(body.into()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Render a match outcome, handing out the session cookie when it was minted
#[must_use]
pub fn render_event(event: &ServeEvent, cookie_name: &str) -> Response {
    let mut response = match &event.result {
        MatchResult::Matched(template) => render_template(template),
        MatchResult::NoMatch => text(StatusCode::NOT_FOUND, NO_MATCH_BODY),
    };
    if event.session.is_ephemeral() {
        let cookie = session_cookie(cookie_name, event.session.id().as_str());
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Cannot set session cookie: {}", e),
        }
    }
    response
}
