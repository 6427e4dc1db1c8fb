//! Helpers shared by the format tests.

use docq_babel::{DecodedDocument, EncoderPreferences, FormatRegistry, NodeId, Preferences};

pub fn decode(format: &str, text: &str) -> Vec<DecodedDocument> {
    FormatRegistry::with_defaults()
        .decode_all(text, format, &Preferences::default())
        .unwrap()
}

/// Decode the single document of `text`.
pub fn decode_one(format: &str, text: &str) -> DecodedDocument {
    let mut docs = decode(format, text);
    assert_eq!(docs.len(), 1, "expected one document in {text:?}");
    docs.remove(0)
}

pub fn encode(docs: &[DecodedDocument], prefs: EncoderPreferences) -> String {
    FormatRegistry::with_defaults()
        .encode_all(docs, &prefs, &Preferences::default())
        .unwrap()
}

pub fn convert(text: &str, from: &str, to: EncoderPreferences) -> String {
    encode(&decode(from, text), to)
}

/// Keys of a mapping, in order.
pub fn keys(doc: &DecodedDocument, map: NodeId) -> Vec<String> {
    doc.tree
        .entries(map)
        .iter()
        .map(|(key, _)| doc.tree.node(*key).value.clone())
        .collect()
}
