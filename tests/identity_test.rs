use tether::EditorSession;

#[test]
fn separate_calls_about_the_same_node_yield_the_same_handle() {
    let session = EditorSession::open(
        "<html><body><p id=\"intro\">Hello</p><p id=\"outro\">Bye</p></body></html>",
    );
    let document = session.document();

    let first = document.body().expect("body").expect("body present");
    let second = document.body().expect("body").expect("body present");
    assert_eq!(first.handle(), second.handle());

    let paragraphs_a = document.elements_by_tag("p").expect("paragraphs");
    let paragraphs_b = document.elements_by_tag("p").expect("paragraphs");
    assert_eq!(paragraphs_a.len(), 2);
    assert_eq!(paragraphs_a.handles(), paragraphs_b.handles());

    session.shutdown();
}

#[test]
fn removing_the_node_behind_a_handle_fails_soft() {
    let session = EditorSession::open("<html><body><p id=\"victim\">text</p></body></html>");
    let document = session.document();
    let body = document.body().expect("body").expect("body present");
    let paragraph = document
        .elements_by_tag("p")
        .expect("paragraphs")
        .item(0)
        .expect("one paragraph");

    assert_eq!(
        paragraph.inner_text().expect("live read").as_deref(),
        Some("text")
    );

    body.set_inner_html("<div>replaced</div>")
        .expect("replace children");

    // Every getter against the stale handle returns the neutral value.
    assert_eq!(paragraph.inner_html().expect("stale read"), None);
    assert_eq!(paragraph.inner_text().expect("stale read"), None);
    assert_eq!(paragraph.tag_name().expect("stale read"), None);
    assert_eq!(paragraph.attribute("id").expect("stale read"), None);
    assert!(paragraph.parent().expect("stale read").is_none());
    assert!(paragraph.children().expect("stale read").is_empty());

    // Setters against it are no-ops rather than faults.
    paragraph.set_inner_text("ghost").expect("stale write");
    assert!(!body
        .inner_html()
        .expect("body html")
        .expect("body live")
        .contains("ghost"));

    session.shutdown();
}

#[test]
fn reloading_the_page_invalidates_every_outstanding_handle() {
    let session = EditorSession::open("<html><body><p>old</p></body></html>");
    let document = session.document();
    let old_body = document.body().expect("body").expect("body present");

    document
        .load_html("<html><body><p>new</p></body></html>")
        .expect("reload");

    assert_eq!(old_body.inner_html().expect("stale body"), None);
    let new_body = document.body().expect("body").expect("body present");
    assert_ne!(old_body.handle(), new_body.handle());

    session.shutdown();
}

#[test]
fn stripping_identity_attributes_cleans_markup_and_stales_handles() {
    let session = EditorSession::open("<html><body><p>a</p><p>b</p></body></html>");
    let document = session.document();
    let body = document.body().expect("body").expect("body present");

    let paragraphs = document.elements_by_tag("p").expect("paragraphs");
    let first = paragraphs.item(0).expect("first paragraph");
    assert!(body
        .inner_html()
        .expect("html")
        .expect("live")
        .contains("data-tether-node"));

    body.strip_identity_attributes().expect("strip");

    // The subtree handles (including the body's own) are stale now; a fresh
    // body lookup mints a new identity and sees clean markup.
    assert_eq!(first.inner_text().expect("stale read"), None);
    let fresh_body = document.body().expect("body").expect("body present");
    assert!(!fresh_body
        .inner_html()
        .expect("html")
        .expect("live")
        .contains("data-tether-node"));

    session.shutdown();
}
