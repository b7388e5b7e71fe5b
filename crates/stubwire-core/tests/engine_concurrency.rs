//! Concurrent matching: linearizable per pair, independent across pairs

use proptest::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;
use stubwire_core::{Engine, EngineConfig};
use stubwire_test_utils::{
    register_state_scenario, state_request_with_header, IN_STATE1_BODY, TRANSITIONED_BODY,
};

fn engine() -> Arc<Engine> {
    let engine = Engine::with_config(EngineConfig::default());
    register_state_scenario(engine.registry());
    Arc::new(engine)
}

fn body_for(engine: &Engine, session: &str) -> String {
    engine
        .handle(&state_request_with_header(session))
        .response()
        .map(|r| r.body_str().to_string())
        .unwrap_or_default()
}

#[test]
fn one_session_transitions_exactly_once() {
    let engine = engine();
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..20)
                    .map(|_| body_for(&engine, "shared"))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let bodies: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    let transitioned = bodies.iter().filter(|b| *b == TRANSITIONED_BODY).count();
    assert_eq!(transitioned, 1);
    assert!(bodies
        .iter()
        .all(|b| b == TRANSITIONED_BODY || b == IN_STATE1_BODY));
    assert_eq!(engine.stats().transitions, 1);
}

#[test]
fn distinct_sessions_each_transition_once() {
    let engine = engine();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let session = format!("client-{i}");
                let first = body_for(&engine, &session);
                let second = body_for(&engine, &session);
                (first, second)
            })
        })
        .collect();

    for handle in handles {
        let (first, second) = handle.join().unwrap();
        assert_eq!(first, TRANSITIONED_BODY);
        assert_eq!(second, IN_STATE1_BODY);
    }
    assert_eq!(engine.active_sessions().len(), 8);
}

#[test]
fn registry_writes_during_traffic_are_safe() {
    let engine = engine();
    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for i in 0..50 {
                engine.register_stub(stubwire_test_utils::plain_mapping(
                    "GET",
                    &format!("/extra/{i}"),
                    "extra",
                ));
            }
        })
    };

    for i in 0..50 {
        let session = format!("reader-{i}");
        assert_eq!(body_for(&engine, &session), TRANSITIONED_BODY);
    }
    writer.join().unwrap();
    assert_eq!(engine.stubs().len(), 52);
}

proptest! {
    #[test]
    fn prop_other_session_traffic_never_changes_state(
        noise in 0usize..20,
        a in "[a-z]{1,8}",
        b in "[A-Z]{1,8}",
    ) {
        let engine = engine();
        prop_assert_eq!(body_for(&engine, &a), TRANSITIONED_BODY);
        for _ in 0..noise {
            body_for(&engine, &b);
        }
        prop_assert_eq!(body_for(&engine, &a), IN_STATE1_BODY);
    }
}
