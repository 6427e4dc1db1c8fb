//! Multi-document streams, anchors and tags

use crate::common::{convert, decode};
use docq_babel::tree::tags;
use docq_babel::{EncoderPreferences, NodeKind};
use insta::assert_snapshot;

#[test]
fn test_documents_keep_their_separator() {
    let yaml = "a: 1\n---\nb: [x, y]\n---\nplain\n";
    assert_snapshot!(convert(yaml, "yaml", EncoderPreferences::new("yaml")), @r###"
    a: 1
    ---
    b: [x, y]
    ---
    plain
    "###);
}

#[test]
fn test_anchors_and_aliases_round_trip() {
    let yaml = "base: &b\n  x: 1\nother: *b\n";
    assert_eq!(convert(yaml, "yaml", EncoderPreferences::new("yaml")), yaml);
}

#[test]
fn test_aliases_resolve_for_json() {
    let yaml = "base: &b\n  x: 1\nother: *b\n";
    assert_eq!(
        convert(yaml, "yaml", EncoderPreferences::new("json").with_indent(0)),
        "{\"base\":{\"x\":1},\"other\":{\"x\":1}}"
    );
}

#[test]
fn test_custom_tags_survive() {
    let docs = decode("yaml", "when: !date 2024-01-01\n");
    let doc = &docs[0];
    let when = doc.tree.get(doc.content().unwrap(), "when").unwrap();
    assert_eq!(doc.tree.node(when).tag, "!date");
    assert_eq!(
        convert("when: !date 2024-01-01\n", "yaml", EncoderPreferences::new("yaml")),
        "when: !date 2024-01-01\n"
    );
}

#[test]
fn test_plain_scalars_are_typed() {
    let docs = decode("yaml", "[1, 1.5, true, ~, '1', x]");
    let doc = &docs[0];
    let seq = doc.content().unwrap();
    assert_eq!(doc.tree.node(seq).kind, NodeKind::Sequence);
    let found: Vec<&str> = doc
        .tree
        .items(seq)
        .iter()
        .map(|id| doc.tree.node(*id).tag.as_str())
        .collect();
    assert_eq!(
        found,
        vec![tags::INT, tags::FLOAT, tags::BOOL, tags::NULL, tags::STR, tags::STR]
    );
}
