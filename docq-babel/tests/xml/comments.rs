//! Comment placement when decoding XML

use crate::common::decode_one;
use docq_babel::{DecodedDocument, NodeId};

fn key_node(doc: &DecodedDocument, map: NodeId, name: &str) -> NodeId {
    doc.tree
        .entries(map)
        .iter()
        .find(|(key, _)| doc.tree.node(*key).value == name)
        .map(|(key, _)| *key)
        .unwrap()
}

#[test]
fn test_before_and_after_a_sole_element() {
    let doc = decode_one("xml", "<!-- before --><cat>3</cat><!-- after -->");
    let tree = &doc.tree;
    let cat = key_node(&doc, doc.content().unwrap(), "cat");

    assert_eq!(tree.node(cat).comments.head.as_deref(), Some("# before"));
    assert_eq!(tree.node(cat).comments.foot, None);
    assert_eq!(tree.node(doc.root).comments.foot.as_deref(), Some("# after"));
}

#[test]
fn test_comments_between_top_level_elements() {
    let doc = decode_one("xml", "<a>1</a><!-- between --><b>2</b>");
    let a = key_node(&doc, doc.content().unwrap(), "a");
    assert_eq!(doc.tree.node(a).comments.foot.as_deref(), Some("# between"));
}

#[test]
fn test_every_slot() {
    let doc = decode_one(
        "xml",
        "<!-- before cat --><cat><!-- in cat --><x>3<!--xca\ncool\nsmart --></x>\
         <y><!-- befored --><d><!-- ind -->4<!-- ind2 --></d><!-- afterd --></y>\
         <!-- after --></cat><!-- after cat -->",
    );
    let tree = &doc.tree;
    let root = doc.content().unwrap();

    let cat_key = key_node(&doc, root, "cat");
    assert_eq!(tree.node(cat_key).comments.head.as_deref(), Some("# before cat"));
    let cat = tree.get(root, "cat").unwrap();

    let x_key = key_node(&doc, cat, "x");
    assert_eq!(tree.node(x_key).comments.head.as_deref(), Some("# in cat"));
    let x = tree.get(cat, "x").unwrap();
    assert_eq!(
        tree.node(x).comments.line.as_deref(),
        Some("# xca\n# cool\n# smart")
    );

    let y_key = key_node(&doc, cat, "y");
    assert_eq!(tree.node(y_key).comments.foot.as_deref(), Some("# after"));
    let y = tree.get(cat, "y").unwrap();

    let d_key = key_node(&doc, y, "d");
    assert_eq!(tree.node(d_key).comments.head.as_deref(), Some("# befored"));
    assert_eq!(tree.node(d_key).comments.foot.as_deref(), Some("# afterd"));
    let d = tree.get(y, "d").unwrap();
    assert_eq!(tree.node(d).comments.line.as_deref(), Some("# ind ind2"));

    assert_eq!(tree.node(doc.root).comments.foot.as_deref(), Some("# after cat"));
}

#[test]
fn test_comment_only_input() {
    let doc = decode_one("xml", "<!-- just this -->");
    assert_eq!(doc.content(), None);
    assert_eq!(doc.tree.node(doc.root).comments.head.as_deref(), Some("# just this"));
}
