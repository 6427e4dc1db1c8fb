//! Decode tests for XML (XML → node tree)

use crate::common::{convert, decode, decode_one, keys};
use docq_babel::tree::tags;
use docq_babel::{EncoderPreferences, NodeKind};
use insta::assert_snapshot;

#[test]
fn test_attributes_then_content() {
    let doc = decode_one("xml", r#"<cat legs="4">meow</cat>"#);
    let tree = &doc.tree;
    let cat = tree.get(doc.content().unwrap(), "cat").unwrap();

    assert_eq!(keys(&doc, cat), vec!["+legs", "+content"]);
    let legs = tree.node(tree.get(cat, "+legs").unwrap());
    assert_eq!((legs.tag.as_str(), legs.value.as_str()), (tags::STR, "4"));
    assert_eq!(tree.node(tree.get(cat, "+content").unwrap()).value, "meow");
}

#[test]
fn test_consecutive_siblings_become_a_sequence() {
    let doc = decode_one("xml", "<animal>1</animal><animal>2</animal>");
    let tree = &doc.tree;
    let animals = tree.get(doc.content().unwrap(), "animal").unwrap();

    assert_eq!(tree.node(animals).kind, NodeKind::Sequence);
    let values: Vec<&str> = tree
        .items(animals)
        .iter()
        .map(|id| tree.node(*id).value.as_str())
        .collect();
    assert_eq!(values, vec!["1", "2"]);
}

#[test]
fn test_separated_siblings_stay_separate() {
    let doc = decode_one("xml", "<animal>1</animal><dog>x</dog><animal>2</animal>");
    assert_eq!(
        keys(&doc, doc.content().unwrap()),
        vec!["animal", "dog", "animal"]
    );
}

#[test]
fn test_declaration_and_doctype_are_skipped() {
    let doc = decode_one(
        "xml",
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE cat>\n<cat>meow</cat>\n",
    );
    assert_eq!(keys(&doc, doc.content().unwrap()), vec!["cat"]);
}

#[test]
fn test_nested_attributes_and_children_as_yaml() {
    let yaml = convert(
        "<cat legs=\"4\">\n  <legs>7</legs>\n  <toy/>\n</cat>",
        "xml",
        EncoderPreferences::new("yaml"),
    );
    assert_snapshot!(yaml, @r###"
    cat:
      +legs: "4"
      legs: "7"
      toy: ""
    "###);
}

#[test]
fn test_mixed_text_and_children() {
    let yaml = convert(
        "<p>hello <b>world</b> again</p>",
        "xml",
        EncoderPreferences::new("yaml"),
    );
    assert_snapshot!(yaml, @r###"
    p:
      +content: hello again
      b: world
    "###);
}

#[test]
fn test_empty_input_has_no_documents() {
    assert!(decode("xml", "").is_empty());
    assert!(decode("xml", "<?xml version=\"1.0\"?>\n").is_empty());
}
