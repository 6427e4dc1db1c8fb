//! Comments travel through a decode followed by an encode.

use docq_babel::{
    DecodeOperator, DecoderPreferences, EncodeOperator, EncoderPreferences, FormatRegistry,
    MatchContext, Pipeline, Preferences, Tree,
};

fn decode_then_encode(text: &str, format: &str) -> String {
    let registry = FormatRegistry::with_defaults();
    let mut tree = Tree::new();
    let value = tree.add_string(text);
    tree.add_document(Some(value));
    let mut pipeline = Pipeline::new(&registry, Preferences::default(), tree);

    let decode = DecodeOperator::new(DecoderPreferences::new(format));
    let encode = EncodeOperator::new(EncoderPreferences::new(format));
    let result = pipeline
        .run(&[&decode, &encode], MatchContext::new(vec![value]))
        .unwrap();
    pipeline.tree().node(result.nodes[0]).value.clone()
}

#[test]
fn test_xml_comments_around_the_root() {
    let xml = "<!-- before --><cat>3</cat><!-- after -->";
    assert_eq!(decode_then_encode(xml, "xml"), xml);
}

#[test]
fn test_xml_comments_inside_elements() {
    let xml = "<!-- before --><cat><!-- inline -->3</cat><!-- after -->";
    assert_eq!(decode_then_encode(xml, "xml"), xml);
}

#[test]
fn test_yaml_comments() {
    let yaml = "# head\na: 1 # line";
    assert_eq!(decode_then_encode(yaml, "yaml"), yaml);
}
