//! YAML to and from the other formats

use crate::common::convert;
use docq_babel::EncoderPreferences;
use insta::assert_snapshot;

#[test]
fn test_json_to_yaml() {
    let json = r#"{"name": "tom", "age": 3, "pets": [{"kind": "cat"}, "rex"], "none": null}"#;
    assert_snapshot!(convert(json, "json", EncoderPreferences::new("yaml")), @r###"
    name: tom
    age: 3
    pets:
      - kind: cat
      - rex
    none: null
    "###);
}

#[test]
fn test_indent_four() {
    let json = r#"{"a": {"b": [1, 2]}}"#;
    assert_snapshot!(
        convert(json, "json", EncoderPreferences::new("yaml").with_indent(4)),
        @r###"
    a:
        b:
            - 1
            - 2
    "###
    );
}

#[test]
fn test_strings_that_look_like_numbers_stay_strings() {
    assert_eq!(
        convert(r#"{"zip": "01234", "flag": "true"}"#, "json", EncoderPreferences::new("yaml")),
        "zip: \"01234\"\nflag: \"true\"\n"
    );
}

#[test]
fn test_multi_line_strings_become_literal_blocks() {
    assert_eq!(
        convert(r#"{"poem": "one\ntwo\n"}"#, "json", EncoderPreferences::new("yaml")),
        "poem: |\n  one\n  two\n"
    );
}

#[test]
fn test_xml_comments_to_yaml() {
    let xml = "<!-- before --><cat>3<!-- inline --></cat><!-- after -->";
    assert_eq!(
        convert(xml, "xml", EncoderPreferences::new("yaml")),
        "# before\ncat: \"3\" # inline\n\n# after\n"
    );
}

#[test]
fn test_yaml_comments_survive_yaml_to_yaml() {
    let yaml = "# head\na: 1 # line\nb:\n  # about c\n  c: 2\n# foot\n";
    assert_eq!(
        convert(yaml, "yaml", EncoderPreferences::new("yaml")),
        "# head\na: 1 # line\nb:\n  # about c\n  c: 2\n\n# foot\n"
    );
}
