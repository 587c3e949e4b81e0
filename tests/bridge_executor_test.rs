use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tether::bridge::{Bridge, ExecutorConfig};
use tether::engine::{EngineConfig, EngineEnvironment};
use tether::error::BridgeError;
use tether::EditorSession;

fn start_bridge(html: &str, config: ExecutorConfig) -> (Arc<EngineEnvironment>, Arc<Bridge>) {
    let engine = EngineEnvironment::start(EngineConfig::new().with_html(html));
    let bridge = Arc::new(Bridge::new(Arc::clone(&engine), config));
    (engine, bridge)
}

#[test]
fn replies_arrive_json_encoded_and_decode_cleanly() {
    let (engine, bridge) = start_bridge(
        "<html><body><p>x</p></body></html>",
        ExecutorConfig::default(),
    );

    let raw = bridge
        .executor()
        .execute("{\"op\":\"document_body\"}")
        .expect("document body call");
    assert!(
        raw.starts_with('"') && raw.ends_with('"'),
        "string results must arrive quoted: {raw}"
    );

    engine.shutdown();
}

#[test]
fn tricky_strings_round_trip_through_the_encoding() {
    let session = EditorSession::open("<html><body><p>x</p></body></html>");
    let document = session.document();
    let body = document.body().expect("body call").expect("body present");

    let tricky = "quote\" backslash\\ newline\n angle <tag> caf\u{e9}";
    body.set_attribute("data-check", tricky)
        .expect("set attribute");
    let read_back = body
        .attribute("data-check")
        .expect("read attribute")
        .expect("attribute present");
    assert_eq!(read_back, tricky);

    session.shutdown();
}

#[test]
fn malformed_scripts_surface_the_engine_message() {
    let (engine, bridge) = start_bridge("<html><body></body></html>", ExecutorConfig::default());

    let err = bridge
        .executor()
        .execute("this is not a script")
        .expect_err("malformed script must fault");
    match err {
        BridgeError::ScriptFault(message) => {
            assert!(message.contains("malformed script"), "got: {message}");
        }
        other => panic!("expected script fault, got {other}"),
    }

    engine.shutdown();
}

#[test]
fn deadline_abandons_the_call_and_later_replies_are_discarded() {
    let (engine, bridge) = start_bridge(
        "<html><body></body></html>",
        ExecutorConfig::new().with_deadline(Duration::from_millis(50)),
    );

    let err = bridge
        .executor()
        .execute("{\"op\":\"sleep\",\"ms\":400}")
        .expect_err("sleep must outlive the deadline");
    assert!(matches!(err, BridgeError::Timeout(_)), "got {err}");

    // Give the worker time to finish the abandoned evaluation; its late
    // reply lands in a dropped channel and must not corrupt the next call.
    thread::sleep(Duration::from_millis(500));
    let raw = bridge
        .executor()
        .execute("{\"op\":\"document_body\"}")
        .expect("executor usable after abandonment");
    assert!(raw.starts_with('"'), "got: {raw}");

    engine.shutdown();
}

#[test]
fn a_second_call_while_one_is_pending_is_rejected() {
    let (engine, bridge) = start_bridge("<html><body></body></html>", ExecutorConfig::default());

    let background = Arc::clone(&bridge);
    let slow = thread::spawn(move || {
        background
            .executor()
            .execute("{\"op\":\"sleep\",\"ms\":500}")
            .expect("slow call completes")
    });

    thread::sleep(Duration::from_millis(100));
    let err = bridge
        .executor()
        .execute("{\"op\":\"document_body\"}")
        .expect_err("reentrant call must be rejected");
    assert!(matches!(err, BridgeError::CallInFlight), "got {err}");

    slow.join().expect("slow call thread");
    engine.shutdown();
}

#[test]
fn calls_after_shutdown_report_disconnection() {
    let (engine, bridge) = start_bridge("<html><body></body></html>", ExecutorConfig::default());
    engine.shutdown();

    let err = bridge
        .executor()
        .execute("{\"op\":\"document_body\"}")
        .expect_err("worker is gone");
    assert!(matches!(err, BridgeError::Disconnected), "got {err}");
}
