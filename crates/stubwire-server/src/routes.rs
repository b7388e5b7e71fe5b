//! warp routes: admin surface under `/__admin`, stub matching for the rest
//!
//! | route                                  | effect                              |
//! |----------------------------------------|-------------------------------------|
//! | `POST /__admin/mappings`               | register mapping, `201 {"id"}`      |
//! | `GET /__admin/mappings`                | list mappings                       |
//! | `DELETE /__admin/mappings/{id}`        | remove mapping                      |
//! | `POST /__admin/mappings/reset`         | clear mappings and scenario state   |
//! | `POST /__admin/reset`                  | clear mappings and scenario state   |
//! | `POST /__admin/scenarios/reset`        | reset all scenario state            |
//! | `GET /__admin/scenarios`               | scenarios for the caller's session  |
//! | `PUT /__admin/scenarios/{name}/state`  | set (or reset) one scenario         |
//!
//! Admin scenario routes act on the session named by the request's header
//! or cookie, or on the global session when neither is present. The
//! `{name}` segment is percent-decoded.

use crate::http::{decode_segment, headers_from, render_event, request_from, text};
use bytes::Bytes;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use stubwire_core::{Engine, StubError};
use stubwire_session::{Cookies, SessionId};
use stubwire_stubs::{MappingDefinition, StubId};
use warp::http::{HeaderMap, Method, StatusCode};
use warp::path::FullPath;
use warp::reply::{Reply, Response};
use warp::{Filter, Rejection};

/// Body of `PUT /__admin/scenarios/{name}/state`
#[derive(Debug, Default, Deserialize)]
struct ScenarioStateBody {
    #[serde(default)]
    state: Option<String>,
}

fn with_engine(
    engine: Arc<Engine>,
) -> impl Filter<Extract = (Arc<Engine>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&engine))
}

/// Every route, admin first
pub fn routes(
    engine: Arc<Engine>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    admin_routes(Arc::clone(&engine)).or(stub_route(engine)).unify()
}

/// Admin routes only
pub fn admin_routes(
    engine: Arc<Engine>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let create = warp::post()
        .and(warp::path!("__admin" / "mappings"))
        .and(warp::body::bytes())
        .and(with_engine(Arc::clone(&engine)))
        .map(create_mapping);

    let list = warp::get()
        .and(warp::path!("__admin" / "mappings"))
        .and(with_engine(Arc::clone(&engine)))
        .map(list_mappings);

    let reset_mappings = warp::post()
        .and(warp::path!("__admin" / "mappings" / "reset"))
        .and(with_engine(Arc::clone(&engine)))
        .map(reset_all);

    let remove = warp::delete()
        .and(warp::path!("__admin" / "mappings" / String))
        .and(with_engine(Arc::clone(&engine)))
        .map(remove_mapping);

    let reset = warp::post()
        .and(warp::path!("__admin" / "reset"))
        .and(with_engine(Arc::clone(&engine)))
        .map(reset_all);

    let scenarios_reset = warp::post()
        .and(warp::path!("__admin" / "scenarios" / "reset"))
        .and(with_engine(Arc::clone(&engine)))
        .map(reset_scenarios);

    let scenarios = warp::get()
        .and(warp::path!("__admin" / "scenarios"))
        .and(warp::header::headers_cloned())
        .and(with_engine(Arc::clone(&engine)))
        .map(list_scenarios);

    let set_state = warp::put()
        .and(warp::path!("__admin" / "scenarios" / String / "state"))
        .and(warp::header::headers_cloned())
        .and(warp::body::bytes())
        .and(with_engine(engine))
        .map(set_scenario_state);

    create
        .or(list)
        .unify()
        .or(reset_mappings)
        .unify()
        .or(remove)
        .unify()
        .or(reset)
        .unify()
        .or(scenarios_reset)
        .unify()
        .or(scenarios)
        .unify()
        .or(set_state)
        .unify()
}

/// Catch-all stub matching route
pub fn stub_route(
    engine: Arc<Engine>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::method()
        .and(warp::path::full())
        .and(
            warp::query::raw()
                .or(warp::any().map(String::new))
                .unify(),
        )
        .and(warp::header::headers_cloned())
        .and(warp::body::bytes())
        .and(with_engine(engine))
        .map(serve_stub)
}

fn serve_stub(
    method: Method,
    path: FullPath,
    query: String,
    headers: HeaderMap,
    body: Bytes,
    engine: Arc<Engine>,
) -> Response {
    let request = request_from(&method, path.as_str(), &query, &headers, &body);
    let event = engine.serve(&request);
    render_event(&event, engine.resolver().cookie_name())
}

fn json(status: StatusCode, value: &serde_json::Value) -> Response {
    warp::reply::with_status(warp::reply::json(value), status).into_response()
}

fn error_response(err: &StubError) -> Response {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_REQUEST
    };
    json(status, &serde_json::json!({ "error": err.to_string() }))
}

fn session_of(engine: &Engine, headers: &HeaderMap) -> SessionId {
    let headers = headers_from(headers);
    let cookies = Cookies::from_headers(&headers);
    engine.resolver().resolve_presented(&headers, &cookies)
}

fn create_mapping(body: Bytes, engine: Arc<Engine>) -> Response {
    let definition: MappingDefinition = match serde_json::from_slice(&body) {
        Ok(definition) => definition,
        Err(e) => {
            return json(
                StatusCode::BAD_REQUEST,
                &serde_json::json!({ "error": format!("invalid mapping JSON: {e}") }),
            )
        }
    };
    match engine.register_definition(definition) {
        Ok(id) => json(StatusCode::CREATED, &serde_json::json!({ "id": id })),
        Err(e) => {
            tracing::warn!("Rejected mapping: {}", e);
            error_response(&e)
        }
    }
}

fn list_mappings(engine: Arc<Engine>) -> Response {
    let stubs = engine.stubs();
    let mappings: Vec<serde_json::Value> = stubs.iter().map(|m| m.to_json()).collect();
    json(
        StatusCode::OK,
        &serde_json::json!({ "mappings": mappings, "total": stubs.len() }),
    )
}

fn remove_mapping(id: String, engine: Arc<Engine>) -> Response {
    let Ok(id) = id.parse::<StubId>() else {
        return text(StatusCode::BAD_REQUEST, format!("invalid stub id: {id}"));
    };
    match engine.remove_stub(id) {
        Ok(_) => text(StatusCode::OK, ""),
        Err(e) => error_response(&e),
    }
}

fn reset_all(engine: Arc<Engine>) -> Response {
    engine.reset();
    text(StatusCode::OK, "")
}

fn reset_scenarios(engine: Arc<Engine>) -> Response {
    engine.reset_scenarios();
    text(StatusCode::OK, "")
}

fn list_scenarios(headers: HeaderMap, engine: Arc<Engine>) -> Response {
    let session = session_of(&engine, &headers);
    json(
        StatusCode::OK,
        &serde_json::json!({ "scenarios": engine.scenarios(&session) }),
    )
}

fn set_scenario_state(
    name: String,
    headers: HeaderMap,
    body: Bytes,
    engine: Arc<Engine>,
) -> Response {
    let request: ScenarioStateBody = if body.is_empty() {
        ScenarioStateBody::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                return text(StatusCode::BAD_REQUEST, format!("invalid state JSON: {e}"));
            }
        }
    };
    let Some(name) = decode_segment(&name) else {
        return text(StatusCode::BAD_REQUEST, "scenario name is not valid UTF-8");
    };
    let session = session_of(&engine, &headers);
    let result = match request.state {
        Some(state) => engine.set_scenario_state(&session, &name, state),
        None => engine.reset_scenario(&session, &name),
    };
    match result {
        Ok(()) => text(StatusCode::OK, ""),
        Err(e) => error_response(&e),
    }
}
