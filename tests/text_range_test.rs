use tether::protocol::{EndPointComparison, MoveUnit, ScriptRequest};
use tether::EditorSession;

const SENTENCE_PAGE: &str = "<html><body><p>One two. Three four! Five.</p></body></html>";
const FOX_PAGE: &str = "<html><body><p>The quick brown fox</p></body></html>";

#[test]
fn character_movement_is_clamped_offset_arithmetic() {
    let session = EditorSession::open(FOX_PAGE);
    let document = session.document();

    let range = document.create_range().expect("range");
    let moved = range.move_by(MoveUnit::Character, 4).expect("move");
    assert_eq!(moved, 4);

    let moved = range.move_end(MoveUnit::Character, 11).expect("move end");
    assert_eq!(moved, 11);
    assert_eq!(range.text().expect("text").as_deref(), Some("quick brown"));

    // Clamped at the end of the flow: nineteen characters total.
    let overshoot = range.move_by(MoveUnit::Character, 1000).expect("move");
    assert_eq!(overshoot, 15, "four already behind the start point");

    session.shutdown();
}

#[test]
fn collapse_then_word_expand_selects_the_word_at_the_start_point() {
    let session = EditorSession::open(FOX_PAGE);
    let document = session.document();

    let range = document.create_range().expect("range");
    range.move_by(MoveUnit::Character, 4).expect("position");
    range.move_end(MoveUnit::Character, 11).expect("cover");
    assert_eq!(range.text().expect("text").as_deref(), Some("quick brown"));

    range.collapse(true).expect("collapse to start");
    assert_eq!(range.text().expect("text").as_deref(), Some(""));

    let changed = range.expand(MoveUnit::Word).expect("expand");
    assert!(changed);
    assert_eq!(range.text().expect("text").as_deref(), Some("quick"));

    session.shutdown();
}

#[test]
fn word_movement_approximates_unit_stepping() {
    let session = EditorSession::open(FOX_PAGE);
    let document = session.document();

    let range = document.create_range().expect("range");
    let moved = range.move_by(MoveUnit::Word, 2).expect("two words");
    assert_eq!(moved, 2);
    range.expand(MoveUnit::Word).expect("expand");
    assert_eq!(range.text().expect("text").as_deref(), Some("brown"));

    let back = range.move_by(MoveUnit::Word, -1).expect("one word back");
    assert_eq!(back, -1);
    range.expand(MoveUnit::Word).expect("expand");
    assert_eq!(range.text().expect("text").as_deref(), Some("quick"));

    session.shutdown();
}

#[test]
fn sentence_movement_lands_on_sentence_starts() {
    let session = EditorSession::open(SENTENCE_PAGE);
    let document = session.document();

    let range = document.create_range().expect("range");
    let moved = range.move_by(MoveUnit::Sentence, 1).expect("next sentence");
    assert_eq!(moved, 1);
    range.expand(MoveUnit::Sentence).expect("expand");
    let text = range.text().expect("text").expect("covered");
    assert_eq!(text.trim_end(), "Three four!");

    session.shutdown();
}

#[test]
fn duplicates_are_equal_until_either_side_mutates() {
    let session = EditorSession::open(FOX_PAGE);
    let document = session.document();

    let range = document.create_range().expect("range");
    range.move_by(MoveUnit::Character, 4).expect("position");
    range.move_end(MoveUnit::Character, 11).expect("cover");

    let copy = range
        .duplicate()
        .expect("duplicate")
        .expect("source is live");
    assert_ne!(range.handle(), copy.handle(), "independent handles");
    assert!(range.is_equal(&copy).expect("equal bounds"));

    copy.move_by(MoveUnit::Character, 1).expect("mutate copy");
    assert!(!range.is_equal(&copy).expect("diverged"));

    copy.dispose().expect("dispose copy");
    range.dispose().expect("dispose source");

    session.shutdown();
}

#[test]
fn endpoint_comparison_is_four_way() {
    let session = EditorSession::open(FOX_PAGE);
    let document = session.document();

    let range = document.create_range().expect("range");
    range.move_by(MoveUnit::Character, 4).expect("position");
    range.move_end(MoveUnit::Character, 11).expect("cover");

    let copy = range.duplicate().expect("duplicate").expect("live");
    assert_eq!(
        range
            .compare_end_points(EndPointComparison::StartToStart, &copy)
            .expect("compare"),
        0
    );
    assert_eq!(
        range
            .compare_end_points(EndPointComparison::EndToEnd, &copy)
            .expect("compare"),
        0
    );
    assert_eq!(
        range
            .compare_end_points(EndPointComparison::StartToEnd, &copy)
            .expect("compare"),
        -1
    );
    assert_eq!(
        range
            .compare_end_points(EndPointComparison::EndToStart, &copy)
            .expect("compare"),
        1
    );

    session.shutdown();
}

#[test]
fn set_end_point_transfers_boundaries() {
    let session = EditorSession::open(FOX_PAGE);
    let document = session.document();

    let source = document.create_range().expect("range");
    source.move_by(MoveUnit::Character, 4).expect("position");
    source.move_end(MoveUnit::Character, 11).expect("cover");

    let target = document.create_range().expect("range");
    target
        .set_end_point(EndPointComparison::StartToStart, &source)
        .expect("move start");
    target
        .set_end_point(EndPointComparison::EndToEnd, &source)
        .expect("move end");

    assert!(target.is_equal(&source).expect("bounds transferred"));
    assert_eq!(target.text().expect("text").as_deref(), Some("quick brown"));

    session.shutdown();
}

#[test]
fn bookmarks_survive_edits_that_invalidate_live_references() {
    let session = EditorSession::open(FOX_PAGE);
    let document = session.document();
    let body = document.body().expect("body").expect("body present");

    let range = document.create_range().expect("range");
    range.move_by(MoveUnit::Character, 4).expect("position");
    range.expand(MoveUnit::Word).expect("expand");
    assert_eq!(range.text().expect("text").as_deref(), Some("quick"));

    let bookmark = range.bookmark().expect("bookmark").expect("encodable");

    // Rebuilding the body content detaches every node the range was
    // computed against; the bookmark re-resolves by path.
    body.set_inner_html("<p>The quick brown fox</p>")
        .expect("rebuild content");

    let restored = document.create_range().expect("range");
    assert!(restored
        .move_to_bookmark(&bookmark)
        .expect("restore bookmark"));
    assert_eq!(restored.text().expect("text").as_deref(), Some("quick"));

    let garbage = restored.move_to_bookmark("not a bookmark").expect("parse");
    assert!(!garbage, "unparseable bookmarks fail soft");

    session.shutdown();
}

#[test]
fn paste_html_replaces_the_covered_span() {
    let session = EditorSession::open("<html><body><p>Hello world</p></body></html>");
    let document = session.document();
    let body = document.body().expect("body").expect("body present");

    let range = document.create_range().expect("range");
    range.move_by(MoveUnit::Character, 6).expect("position");
    range.move_end(MoveUnit::Character, 5).expect("cover world");
    assert_eq!(range.text().expect("text").as_deref(), Some("world"));

    range.paste_html("<b>Rust</b>").expect("paste");

    let markup = body.inner_html().expect("html").expect("live");
    assert!(markup.contains("<b>Rust</b>"), "got: {markup}");
    assert_eq!(
        body.inner_text().expect("text").as_deref(),
        Some("Hello Rust")
    );

    // The range collapses after the inserted content.
    assert_eq!(range.text().expect("text").as_deref(), Some(""));

    session.shutdown();
}

#[test]
fn selection_derived_ranges_track_the_live_selection() {
    let session = EditorSession::open(FOX_PAGE);
    let document = session.document();

    let range = document.create_range().expect("range");
    range.move_by(MoveUnit::Character, 4).expect("position");
    range.move_end(MoveUnit::Character, 11).expect("cover");
    range.select().expect("make live selection");

    let selection = document.selection();
    assert_eq!(
        selection.text().expect("selection text").as_deref(),
        Some("quick brown")
    );

    let derived = selection.range().expect("range").expect("live");
    assert!(derived.is_equal(&range).expect("same bounds"));

    session.shutdown();
}

#[test]
fn disposed_ranges_stop_resolving() {
    let session = EditorSession::open(FOX_PAGE);
    let document = session.document();

    let range = document.create_range().expect("range");
    let copy = range.duplicate().expect("duplicate").expect("live");
    let disposed_handle = range.handle().to_string();
    range.dispose().expect("dispose");

    assert_eq!(copy.text().expect("copy still live").as_deref(), Some(""));
    let value = session
        .bridge()
        .call(&ScriptRequest::RangeText {
            handle: disposed_handle,
        })
        .expect("call against disposed handle");
    assert!(value.is_null(), "disposed handles resolve to null");

    session.shutdown();
}
