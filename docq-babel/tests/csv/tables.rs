//! Tables to and from the node tree

use crate::common::{convert, decode_one};
use docq_babel::tree::tags;
use docq_babel::{
    CsvPreferences, EncoderPreferences, FormatError, FormatRegistry, Preferences,
};
use insta::assert_snapshot;

#[test]
fn test_csv_to_yaml() {
    let csv = "name,age,alive\ntom,3,true\n\"rex, jr\",,false\n";
    assert_snapshot!(convert(csv, "csv", EncoderPreferences::new("yaml")), @r###"
    - name: tom
      age: 3
      alive: true
    - name: rex, jr
      age: ""
      alive: false
    "###);
}

#[test]
fn test_tsv_without_inference() {
    let prefs = Preferences {
        tsv: CsvPreferences {
            infer_types: false,
            ..CsvPreferences::tsv()
        },
        ..Preferences::default()
    };
    let docs = FormatRegistry::with_defaults()
        .decode_all("n\tv\nx\t3\n", "tsv", &prefs)
        .unwrap();
    let doc = &docs[0];
    let row = doc.tree.items(doc.content().unwrap())[0];
    assert_eq!(doc.tree.node(doc.tree.get(row, "v").unwrap()).tag, tags::STR);
}

#[test]
fn test_ragged_rows_without_header() {
    let prefs = Preferences {
        csv: CsvPreferences {
            header: false,
            ..CsvPreferences::csv()
        },
        ..Preferences::default()
    };
    let docs = FormatRegistry::with_defaults()
        .decode_all("a,b,c\n1\n", "csv", &prefs)
        .unwrap();
    let doc = &docs[0];
    let rows = doc.tree.items(doc.content().unwrap());
    assert_eq!(doc.tree.items(rows[0]).len(), 3);
    assert_eq!(doc.tree.items(rows[1]).len(), 1);
}

#[test]
fn test_yaml_to_tsv() {
    let yaml = "- name: tom\n  pet: cat\n- name: ann\n  age: 5\n";
    assert_eq!(
        convert(yaml, "yaml", EncoderPreferences::new("tsv")),
        "name\tpet\tage\ntom\tcat\t\nann\t\t5\n"
    );
}

#[test]
fn test_rows_of_scalars() {
    assert_eq!(
        convert("[[1, a], [2, b]]", "yaml", EncoderPreferences::new("csv")),
        "1,a\n2,b\n"
    );
}

#[test]
fn test_nested_cells_are_rejected() {
    let doc = decode_one("yaml", "- name: tom\n  pets: [cat]\n");
    let result = FormatRegistry::with_defaults().encode_all(
        &[doc],
        &EncoderPreferences::new("csv"),
        &Preferences::default(),
    );
    assert!(matches!(result, Err(FormatError::UnsupportedShape(_))));
}
