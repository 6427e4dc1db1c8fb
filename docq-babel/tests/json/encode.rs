//! Encode tests for JSON (node tree → JSON)

use crate::common::{convert, decode, encode};
use docq_babel::EncoderPreferences;
use insta::assert_snapshot;
use proptest::prelude::*;

#[test]
fn test_yaml_types_become_json_types() {
    let yaml = "int: 0x10\nfloat: 1.50\nbool: True\nnothing: ~\nstr: '3'\ninf: .inf\n";
    assert_snapshot!(convert(yaml, "yaml", EncoderPreferences::new("json")), @r###"
    {
      "int": 16,
      "float": 1.50,
      "bool": true,
      "nothing": null,
      "str": "3",
      "inf": ".inf"
    }
    "###);
}

#[test]
fn test_xml_to_json() {
    assert_eq!(
        convert(
            "<cat legs=\"4\"><toy>ball</toy><toy>yarn</toy></cat>",
            "xml",
            EncoderPreferences::new("json").with_indent(0)
        ),
        r#"{"cat":{"+legs":"4","toy":["ball","yarn"]}}"#
    );
}

#[test]
fn test_unicode_and_escapes() {
    assert_eq!(
        convert(
            "s: \"tab\\there \\\"q\\\" é\"\n",
            "yaml",
            EncoderPreferences::new("json").with_indent(0)
        ),
        r#"{"s":"tab\there \"q\" é"}"#
    );
}

#[test]
fn test_colorize_wraps_tokens() {
    let json = convert(
        "a: 1\n",
        "yaml",
        EncoderPreferences::new("json").with_indent(0).with_colorize(true),
    );
    assert_eq!(json, "{\x1b[34m\"a\"\x1b[0m:\x1b[35m1\x1b[0m}");
}

proptest! {
    #[test]
    fn encoding_is_idempotent(
        entries in prop::collection::vec(("[a-z]{1,6}", "[ -~]{0,12}"), 0..6),
        indent in 0usize..4,
    ) {
        let mut yaml = String::new();
        for (key, value) in &entries {
            yaml.push_str(&format!("{key}: {}\n", serde_json::to_string(value).unwrap()));
        }
        let docs = decode("yaml", if yaml.is_empty() { "{}" } else { &yaml });
        let prefs = EncoderPreferences::new("json").with_indent(indent);
        let first = encode(&docs, prefs.clone());
        let second = encode(&docs, prefs);
        prop_assert_eq!(&first, &second);
        if indent == 0 {
            prop_assert!(!first.ends_with('\n'));
        }
    }
}
