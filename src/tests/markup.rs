use super::{parse, strip_markup, strip_tags, Node, Tag};

fn doc_children(node: Node) -> Vec<Node> {
    match node {
        Node::Document(children) => children,
        other => panic!("expected document, got {other:?}"),
    }
}

#[test]
fn test_parse_paragraph_with_inline_markup() {
    let doc = parse("<p>plain <em>soft</em> and <strong>loud</strong></p>").unwrap();
    let children = doc_children(doc);
    assert_eq!(children.len(), 1);

    let Node::Element { tag, children } = &children[0] else {
        panic!("expected element");
    };
    assert_eq!(*tag, Tag::P);
    assert_eq!(children.len(), 4);
    assert_eq!(children[0], Node::Text("plain ".to_string()));
    assert!(matches!(children[1], Node::Element { tag: Tag::Em, .. }));
    assert_eq!(children[2], Node::Text(" and ".to_string()));
    assert!(matches!(
        children[3],
        Node::Element {
            tag: Tag::Strong,
            ..
        }
    ));
}

#[test]
fn test_parse_maps_synonyms_and_unknowns() {
    assert_eq!(Tag::from_name("i"), Tag::Em);
    assert_eq!(Tag::from_name("b"), Tag::Strong);
    assert_eq!(Tag::from_name("h3"), Tag::H3);
    assert_eq!(Tag::from_name("figure"), Tag::Other);
}

#[test]
fn test_parse_namespaced_uppercase_names() {
    let doc = parse("<html:P>text</html:P>").unwrap();
    let children = doc_children(doc);
    assert!(matches!(children[0], Node::Element { tag: Tag::P, .. }));
}

#[test]
fn test_parse_survives_unclosed_and_stray_tags() {
    // Unclosed <p> at EOF still yields the element.
    let doc = parse("<div><p>dangling").unwrap();
    let children = doc_children(doc);
    let Node::Element { tag: Tag::Div, children } = &children[0] else {
        panic!("expected div");
    };
    assert!(matches!(children[0], Node::Element { tag: Tag::P, .. }));

    // A close tag matching nothing open is ignored.
    let doc = parse("text</span>more").unwrap();
    let children = doc_children(doc);
    assert_eq!(children, vec![Node::Text("textmore".to_string())]);
}

#[test]
fn test_parse_void_elements_as_start_tags() {
    // <br> and <hr> written without a slash must not swallow siblings.
    let doc = parse("<p>one<br>two</p>").unwrap();
    let children = doc_children(doc);
    let Node::Element { children, .. } = &children[0] else {
        panic!("expected element");
    };
    assert_eq!(children.len(), 3);
    assert!(matches!(children[1], Node::Element { tag: Tag::Br, .. }));
    assert_eq!(children[2], Node::Text("two".to_string()));
}

#[test]
fn test_entities_do_not_split_words() {
    let doc = parse("<p>fish &amp; chips&hellip;</p>").unwrap();
    let children = doc_children(doc);
    let Node::Element { children, .. } = &children[0] else {
        panic!("expected element");
    };
    // Adjacent text runs coalesce into one node.
    assert_eq!(
        children,
        &vec![Node::Text("fish & chips\u{2026}".to_string())]
    );
}

#[test]
fn test_unknown_entity_kept_literally() {
    let doc = parse("<p>a &wobble; b</p>").unwrap();
    let children = doc_children(doc);
    let Node::Element { children, .. } = &children[0] else {
        panic!("expected element");
    };
    assert_eq!(children, &vec![Node::Text("a &wobble; b".to_string())]);
}

#[test]
fn test_strip_tags_keeps_text_only() {
    assert_eq!(strip_tags("<p>keep <em>this</em></p>"), "keep this");
    assert_eq!(strip_tags("no tags at all"), "no tags at all");
}

#[test]
fn test_strip_markup_breaks_on_block_closers() {
    let text = strip_markup("<p>first</p><p>second</p>");
    assert_eq!(text, "first\n\nsecond");
}

#[test]
fn test_strip_markup_collapses_blank_lines() {
    let text = strip_markup("<div>one</div>\n\n\n<div>two</div>");
    assert_eq!(text, "one\n\ntwo");
}
