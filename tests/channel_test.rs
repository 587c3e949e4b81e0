use serde_json::json;
use tether::protocol::{MoveUnit, PushPayload};
use tether::EditorSession;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

#[test]
fn push_payloads_are_type_tagged_json_objects() {
    let payload = PushPayload::ContentChanged {
        html: "<p>x</p>".to_string(),
        text: "x".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&payload).expect("encode"),
        json!({"type": "content_changed", "html": "<p>x</p>", "text": "x"})
    );

    let payload = PushPayload::SelectionChanged {
        text: "x".to_string(),
        block: Some("p".to_string()),
    };
    assert_eq!(
        serde_json::to_value(&payload).expect("encode"),
        json!({"type": "selection_changed", "text": "x", "block": "p"})
    );
}

#[test]
fn the_snapshot_is_populated_without_any_bridge_call() {
    init_tracing();
    let session = EditorSession::open("<html><body><p>seed</p></body></html>");

    // No document operation has run; the engine pushed its initial state
    // when the page loaded.
    let snapshot = session.snapshot();
    assert_eq!(snapshot.text, "seed");
    assert!(snapshot.html.contains("<p>seed</p>"));
    assert!(snapshot.revision > 0);

    session.shutdown();
}

#[test]
fn the_latest_push_wins_with_no_stale_field_mix() {
    let session = EditorSession::open("<html><body><p>seed</p></body></html>");
    let document = session.document();
    let body = document.body().expect("body").expect("body present");

    // Both mutations complete while their pushes sit queued; the flush after
    // each call applies them in arrival order.
    body.set_inner_html("<p>first</p>").expect("first edit");
    body.set_inner_html("<p>second</p>").expect("second edit");

    let snapshot = session.snapshot();
    assert!(snapshot.html.contains("second"), "got: {}", snapshot.html);
    assert!(!snapshot.html.contains("first"));
    assert_eq!(snapshot.text, "second");

    session.shutdown();
}

#[test]
fn typing_refreshes_content_and_selection_together() {
    let session = EditorSession::open("<html><body><p>note: </p></body></html>");
    let document = session.document();

    let caret = document.create_range().expect("range");
    caret.move_by(MoveUnit::Character, 6).expect("to end");
    caret.select().expect("place caret");

    document.insert_text("hello").expect("type");

    let snapshot = session.snapshot();
    assert_eq!(snapshot.text, "note: hello");
    assert_eq!(snapshot.selection_text, "", "caret collapses after typing");
    assert_eq!(snapshot.selection_block.as_deref(), Some("p"));

    session.shutdown();
}

#[test]
fn selecting_a_range_pushes_selection_context() {
    let session = EditorSession::open("<html><body><p>The quick brown fox</p></body></html>");
    let document = session.document();

    let range = document.create_range().expect("range");
    range.move_by(MoveUnit::Character, 4).expect("position");
    range.move_end(MoveUnit::Character, 11).expect("cover");
    range.select().expect("select");

    let snapshot = session.snapshot();
    assert_eq!(snapshot.selection_text, "quick brown");
    assert_eq!(snapshot.selection_block.as_deref(), Some("p"));

    session.shutdown();
}

#[test]
fn clicking_inside_a_link_pushes_link_context() {
    let session = EditorSession::open(
        "<html><body><p>Visit <a href=\"https://example.com\" id=\"link\">our site</a> now</p></body></html>",
    );
    let document = session.document();

    let link = document
        .elements_by_name("link")
        .expect("by name")
        .item(0)
        .expect("anchor");
    link.click().expect("click");

    let snapshot = session.snapshot();
    assert_eq!(snapshot.link_href.as_deref(), Some("https://example.com"));
    assert_eq!(snapshot.link_text.as_deref(), Some("our site"));

    session.shutdown();
}

#[test]
fn revisions_increase_monotonically_with_pushes() {
    let session = EditorSession::open("<html><body><p>seed</p></body></html>");
    let document = session.document();
    let body = document.body().expect("body").expect("body present");

    let before = session.snapshot().revision;
    body.set_inner_html("<p>edit</p>").expect("edit");
    let after = session.snapshot().revision;
    assert!(after > before, "{after} must exceed {before}");

    // A pure read pushes nothing.
    let _ = body.inner_html().expect("read");
    assert_eq!(session.snapshot().revision, after);

    session.shutdown();
}
