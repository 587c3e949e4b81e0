use tether::protocol::MoveUnit;
use tether::EditorSession;

fn select_span(session: &EditorSession, start: i64, length: i64) {
    let document = session.document();
    let range = document.create_range().expect("range");
    range.move_by(MoveUnit::Character, start).expect("position");
    range.move_end(MoveUnit::Character, length).expect("cover");
    range.select().expect("select");
    range.dispose().expect("dispose");
}

#[test]
fn formatting_commands_wrap_the_selection() {
    let session = EditorSession::open("<html><body><p>make this bold</p></body></html>");
    let document = session.document();
    let commands = document.commands();

    // Select the word "this" (offsets 5..9).
    select_span(&session, 5, 4);

    assert!(commands.execute("Bold", None));
    assert!(commands.query_state("Bold"));

    let snapshot = session.snapshot();
    assert!(snapshot.html.contains("<b>this</b>"), "got: {}", snapshot.html);
    assert_eq!(snapshot.text, "make this bold");

    session.shutdown();
}

#[test]
fn unsupported_commands_report_neutral_results_without_raising() {
    let session = EditorSession::open("<html><body><p>text</p></body></html>");
    let commands = session.document().commands();

    assert!(!commands.is_supported("FooBarCommand"));
    assert!(!commands.execute("FooBarCommand", None));
    assert!(!commands.query_state("FooBarCommand"));
    assert!(!commands.query_enabled("FooBarCommand"));
    assert_eq!(commands.query_value("FooBarCommand"), "");

    session.shutdown();
}

#[test]
fn capability_queries_drive_enablement() {
    let session = EditorSession::open("<html><body><p>plain</p></body></html>");
    let commands = session.document().commands();

    assert!(commands.query_enabled("Bold"));
    assert!(commands.query_enabled("CreateLink"));
    assert!(
        !commands.query_enabled("Unlink"),
        "nothing to unlink on a fresh page"
    );

    session.shutdown();
}

#[test]
fn create_link_wraps_the_selection_and_exposes_link_context() {
    let session = EditorSession::open("<html><body><p>read the docs today</p></body></html>");
    let document = session.document();
    let commands = document.commands();

    // Select "the docs" (offsets 5..13).
    select_span(&session, 5, 8);

    assert!(commands.execute("CreateLink", Some("https://docs.example.com")));
    assert_eq!(commands.query_value("CreateLink"), "https://docs.example.com");
    assert!(commands.query_enabled("Unlink"));

    let snapshot = session.snapshot();
    assert!(
        snapshot
            .html
            .contains("<a href=\"https://docs.example.com\">the docs</a>"),
        "got: {}",
        snapshot.html
    );
    assert_eq!(snapshot.link_href.as_deref(), Some("https://docs.example.com"));
    assert_eq!(snapshot.link_text.as_deref(), Some("the docs"));

    assert!(commands.execute("Unlink", None));
    assert!(!commands.query_enabled("Unlink"));
    assert_eq!(session.snapshot().link_href, None);

    session.shutdown();
}

#[test]
fn create_link_without_a_target_is_refused() {
    let session = EditorSession::open("<html><body><p>text</p></body></html>");
    let commands = session.document().commands();

    assert!(!commands.execute("CreateLink", None));

    session.shutdown();
}

#[test]
fn toggle_commands_flip_state_and_remove_format_clears_it() {
    let session = EditorSession::open("<html><body><p>list me</p></body></html>");
    let commands = session.document().commands();

    assert!(commands.execute("InsertUnorderedList", None));
    assert!(commands.query_state("InsertUnorderedList"));
    assert!(commands.execute("InsertUnorderedList", None));
    assert!(!commands.query_state("InsertUnorderedList"));

    assert!(commands.execute("JustifyCenter", None));
    assert!(commands.query_state("JustifyCenter"));
    assert!(commands.execute("JustifyRight", None));
    assert!(
        !commands.query_state("JustifyCenter"),
        "justification is exclusive"
    );
    assert!(commands.query_state("JustifyRight"));

    assert!(commands.execute("RemoveFormat", None));
    assert!(!commands.query_state("JustifyRight"));

    session.shutdown();
}

#[test]
fn command_state_survives_only_until_reload() {
    let session = EditorSession::open("<html><body><p>text</p></body></html>");
    let document = session.document();
    let commands = document.commands();

    assert!(commands.execute("Indent", None));
    assert!(commands.query_state("Indent"));

    document
        .load_html("<html><body><p>fresh</p></body></html>")
        .expect("reload");
    assert!(!commands.query_state("Indent"));

    session.shutdown();
}
