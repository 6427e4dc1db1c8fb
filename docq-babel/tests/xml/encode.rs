//! Encode tests for XML (node tree → XML)

use crate::common::{convert, decode};
use docq_babel::{EncoderPreferences, FormatError, FormatRegistry, Preferences};
use insta::assert_snapshot;

fn yaml_to_xml(yaml: &str) -> String {
    convert(yaml, "yaml", EncoderPreferences::new("xml"))
}

#[test]
fn test_simple() {
    assert_eq!(yaml_to_xml("cat: purrs"), "<cat>purrs</cat>\n");
}

#[test]
fn test_array() {
    assert_snapshot!(yaml_to_xml("pets:\n  cat:\n    - purrs\n    - meows"), @r###"
    <pets>
      <cat>purrs</cat>
      <cat>meows</cat>
    </pets>
    "###);
}

#[test]
fn test_attributes() {
    assert_snapshot!(yaml_to_xml("cat:\n  +name: tiger\n  meows: true\n"), @r###"
    <cat name="tiger">
      <meows>true</meows>
    </cat>
    "###);
}

#[test]
fn test_double_prefix_keeps_one() {
    assert_snapshot!(yaml_to_xml("cat:\n  ++name: tiger\n  meows: true\n"), @r###"
    <cat +name="tiger">
      <meows>true</meows>
    </cat>
    "###);
}

#[test]
fn test_attributes_with_content() {
    assert_eq!(
        yaml_to_xml("cat:\n  +name: tiger\n  +content: cool\n"),
        "<cat name=\"tiger\">cool</cat>\n"
    );
}

#[test]
fn test_yaml_comments() {
    let yaml = "# above_cat\n\
                cat: # inline_cat\n  \
                  # above_array\n  \
                  array: # inline_array\n    \
                    - val1 # inline_val1\n    \
                    # above_val2\n    \
                    - val2 # inline_val2\n\
                # below_cat\n";
    let docs = decode("yaml", yaml);
    let xml = crate::common::encode(&docs, EncoderPreferences::new("xml"));
    assert_snapshot!(xml, @r###"
    <!-- above_cat --><cat><!-- inline_cat -->
      <!-- above_array --><!-- inline_array --><array><!-- inline_val1 -->val1</array>
      <!-- above_val2 --><array><!-- inline_val2 -->val2</array>
    </cat><!-- below_cat -->
    "###);
}

#[test]
fn test_compact() {
    assert_eq!(
        convert(
            "pets:\n  cat:\n    - purrs\n    - meows",
            "yaml",
            EncoderPreferences::new("xml").with_indent(0)
        ),
        "<pets><cat>purrs</cat><cat>meows</cat></pets>\n"
    );
}

#[test]
fn test_top_level_sequence_is_rejected() {
    let docs = decode("yaml", "- a\n- b\n");
    let result = FormatRegistry::with_defaults().encode_all(
        &docs,
        &EncoderPreferences::new("xml"),
        &Preferences::default(),
    );
    assert!(matches!(result, Err(FormatError::UnsupportedShape(_))));
}

#[test]
fn test_comments_survive_xml_to_xml() {
    assert_eq!(
        convert(
            "<!-- before --><cat>3</cat><!-- after -->",
            "xml",
            EncoderPreferences::new("xml")
        ),
        "<!-- before --><cat>3</cat><!-- after -->\n"
    );
}
