//! Properties to and from the node tree

use crate::common::convert;
use docq_babel::{EncoderPreferences, Preferences, PropertiesPreferences};
use insta::assert_snapshot;

#[test]
fn test_yaml_to_properties() {
    let yaml = "person:\n  name: tom\n  pets:\n    - cat\n    - dog\n  empty: {}\n";
    assert_snapshot!(convert(yaml, "yaml", EncoderPreferences::new("properties")), @r###"
    person.name = tom
    person.pets.0 = cat
    person.pets.1 = dog
    "###);
}

#[test]
fn test_properties_to_yaml() {
    let props = "# who\nperson.name=tom\nperson.pets.0: cat\nperson.pets.1 dog\n";
    assert_snapshot!(convert(props, "properties", EncoderPreferences::new("yaml")), @r###"
    person:
      # who
      name: tom
      pets:
        - cat
        - dog
    "###);
}

#[test]
fn test_custom_separator() {
    let prefs = Preferences {
        properties: PropertiesPreferences {
            separator: "=".to_string(),
        },
        ..Preferences::default()
    };
    let docs = docq_babel::FormatRegistry::with_defaults()
        .decode_all("a: 1\n", "yaml", &prefs)
        .unwrap();
    let out = docq_babel::FormatRegistry::with_defaults()
        .encode_all(&docs, &EncoderPreferences::new("properties"), &prefs)
        .unwrap();
    assert_eq!(out, "a=1\n");
}
