//! Testing utilities for Stubwire workspace
//!
//! Shared fixtures: the `StateScenario` mapping pair and request builders
//! carrying session signals.

#![allow(missing_docs)]

use stubwire_session::{DEFAULT_COOKIE_NAME, DEFAULT_HEADER_NAME};
use stubwire_stubs::{Request, RequestPattern, ResponseTemplate, StubMapping, StubRegistry};

pub const STATE_SCENARIO: &str = "StateScenario";
pub const STATE_URL: &str = "/state";
pub const TRANSITIONED_BODY: &str = "Transitioned to State1";
pub const IN_STATE1_BODY: &str = "In State1";

/// `Started -> State1` on `GET /state`
pub fn transition_mapping() -> StubMapping {
    StubMapping::builder()
        .request(RequestPattern::get(STATE_URL))
        .in_scenario(STATE_SCENARIO)
        .when_scenario_state_is("Started")
        .will_set_state_to("State1")
        .respond(ResponseTemplate::ok().with_body(TRANSITIONED_BODY))
        .build()
        .unwrap()
}

/// Stays in `State1` on `GET /state`
pub fn in_state1_mapping() -> StubMapping {
    StubMapping::builder()
        .request(RequestPattern::get(STATE_URL))
        .in_scenario(STATE_SCENARIO)
        .when_scenario_state_is("State1")
        .respond(ResponseTemplate::ok().with_body(IN_STATE1_BODY))
        .build()
        .unwrap()
}

pub fn register_state_scenario(registry: &StubRegistry) {
    registry.add(transition_mapping());
    registry.add(in_state1_mapping());
}

pub fn plain_mapping(method: &str, url: &str, body: &str) -> StubMapping {
    StubMapping::builder()
        .request(RequestPattern::any().with_method(method).with_url(url))
        .respond(ResponseTemplate::ok().with_body(body))
        .build()
        .unwrap()
}

pub fn state_request() -> Request {
    Request::new("GET", STATE_URL)
}

pub fn with_session_header(request: Request, session: &str) -> Request {
    request.with_header(DEFAULT_HEADER_NAME, session)
}

pub fn with_session_cookie(request: Request, session: &str) -> Request {
    request.with_header("Cookie", format!("{DEFAULT_COOKIE_NAME}={session}"))
}

pub fn state_request_with_header(session: &str) -> Request {
    with_session_header(state_request(), session)
}

pub fn state_request_with_cookie(session: &str) -> Request {
    with_session_cookie(state_request(), session)
}
