//! Trailing newlines follow the decoded original.

use docq_babel::{
    DecodeOperator, DecoderPreferences, EncodeOperator, EncoderPreferences, FormatRegistry,
    MatchContext, Pipeline, Preferences, Tree,
};
use proptest::prelude::*;

fn round_trip(text: &str, format: &str, encoder: EncoderPreferences) -> String {
    let registry = FormatRegistry::with_defaults();
    let mut tree = Tree::new();
    let value = tree.add_string(text);
    tree.add_document(Some(value));
    let mut pipeline = Pipeline::new(&registry, Preferences::default(), tree);

    let decode = DecodeOperator::new(DecoderPreferences::new(format));
    let encode = EncodeOperator::new(encoder);
    let result = pipeline
        .run(&[&decode, &encode], MatchContext::new(vec![value]))
        .unwrap();
    pipeline.tree().node(result.nodes[0]).value.clone()
}

#[test]
fn test_no_newline_in_no_newline_out() {
    assert_eq!(round_trip("cat: 3", "yaml", EncoderPreferences::new("yaml")), "cat: 3");
}

#[test]
fn test_newline_in_newline_out() {
    assert_eq!(round_trip("cat: 3\n", "yaml", EncoderPreferences::new("yaml")), "cat: 3\n");
}

#[test]
fn test_multi_line_output_keeps_its_newline_rule() {
    assert_eq!(
        round_trip("a: 1\nb: 2", "yaml", EncoderPreferences::new("yaml")),
        "a: 1\nb: 2"
    );
}

#[test]
fn test_xml_without_newline() {
    assert_eq!(
        round_trip("<cat>3</cat>", "xml", EncoderPreferences::new("xml")),
        "<cat>3</cat>"
    );
}

#[test]
fn test_without_decode_the_encoder_output_stands() {
    let registry = FormatRegistry::with_defaults();
    let mut tree = Tree::new();
    let map = tree.add_mapping();
    let three = tree.add_string("3");
    tree.push_string_entry(map, "cat", three);
    let mut pipeline = Pipeline::new(&registry, Preferences::default(), tree);

    let encode = EncodeOperator::new(EncoderPreferences::new("yaml"));
    let result = pipeline
        .run(&[&encode], MatchContext::new(vec![map]))
        .unwrap();
    assert_eq!(pipeline.tree().node(result.nodes[0]).value, "cat: \"3\"\n");
}

proptest! {
    #[test]
    fn compact_json_never_ends_with_newline(
        key in "k[a-z]{0,7}",
        value in "[a-z0-9 ]{0,8}",
        trailing in prop::bool::ANY,
    ) {
        let text = format!("{key}: \"{value}\"{}", if trailing { "\n" } else { "" });
        let json = round_trip(&text, "yaml", EncoderPreferences::new("json").with_indent(0));
        prop_assert!(!json.ends_with('\n'));
    }
}
