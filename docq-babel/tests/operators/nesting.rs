//! Decoding a string that lives inside a larger document.

use docq_babel::tree::{tags, PathSegment};
use docq_babel::{
    DecodeOperator, DecoderPreferences, EncodeOperator, EncoderPreferences, FormatRegistry,
    MatchContext, NodeKind, Operator, Pipeline, Preferences,
};

#[test]
fn test_embedded_json_becomes_yaml() {
    let registry = FormatRegistry::with_defaults();
    let prefs = Preferences::default();
    let mut docs = registry
        .decode_all("config: '{\"a\": [1, 2]}'\n", "yaml", &prefs)
        .unwrap();
    let doc = docs.remove(0);
    let config = doc.tree.get(doc.content().unwrap(), "config").unwrap();
    let root = doc.root;

    let mut pipeline = Pipeline::new(&registry, prefs, doc.tree);
    let decode = DecodeOperator::new(DecoderPreferences::new("json"));
    let decoded = decode
        .apply(&mut pipeline, MatchContext::new(vec![config]))
        .unwrap();
    let node = decoded.nodes[0];

    let tree = pipeline.tree();
    assert_eq!(tree.node(node).kind, NodeKind::Mapping);
    assert_eq!(tree.path(node).0, vec![PathSegment::Key("config".to_string())]);
    // The original string is still what the document holds.
    let still = tree.get(tree.content(root).unwrap(), "config").unwrap();
    assert_eq!(tree.node(still).tag, tags::STR);

    let encode = EncodeOperator::new(EncoderPreferences::new("yaml"));
    let encoded = encode.apply(&mut pipeline, decoded).unwrap();
    assert_eq!(
        pipeline.tree().node(encoded.nodes[0]).value,
        "a:\n  - 1\n  - 2"
    );
}

#[test]
fn test_every_selected_node_is_replaced() {
    let registry = FormatRegistry::with_defaults();
    let prefs = Preferences::default();
    let mut docs = registry
        .decode_all("- aGVsbG8=\n- d29ybGQ=\n", "yaml", &prefs)
        .unwrap();
    let doc = docs.remove(0);
    let items = doc.tree.items(doc.content().unwrap()).to_vec();

    let mut pipeline = Pipeline::new(&registry, prefs, doc.tree);
    let decode = DecodeOperator::new(DecoderPreferences::new("base64"));
    let result = decode
        .apply(&mut pipeline, MatchContext::new(items))
        .unwrap();
    let values: Vec<&str> = result
        .nodes
        .iter()
        .map(|id| pipeline.tree().node(*id).value.as_str())
        .collect();
    assert_eq!(values, vec!["hello", "world"]);
}
