//! Base64 format implementation
//!
//! The whole input is one string. Whitespace (line wrapping) is ignored and missing `=`
//! padding is put back before decoding with the standard alphabet. The decoded bytes must be
//! UTF-8 since the result is a `!!str` scalar.

use crate::error::FormatError;
use crate::format::{read_source, write_text, DecodedDocument, Decoder, Encoder, Format};
use crate::formats::common::{scalar_content, string_document};
use crate::preferences::{EncoderPreferences, Preferences};
use crate::tree::{NodeId, Tree};
use ::base64::engine::general_purpose::STANDARD;
use ::base64::{DecodeError, Engine};
use std::io::{Read, Write};

const FORMAT: &str = "base64";

/// Format implementation for base64 text
pub struct Base64Format;

impl Format for Base64Format {
    fn name(&self) -> &str {
        "base64"
    }

    fn aliases(&self) -> &[&str] {
        &["b64"]
    }

    fn description(&self) -> &str {
        "A single string, base64 encoded"
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decoder(&self, _prefs: &Preferences) -> Result<Box<dyn Decoder>, FormatError> {
        Ok(Box::new(Base64Decoder::default()))
    }

    fn encoder(
        &self,
        _encoder: &EncoderPreferences,
        _prefs: &Preferences,
    ) -> Result<Box<dyn Encoder>, FormatError> {
        Ok(Box::new(Base64Encoder))
    }
}

#[derive(Default)]
pub struct Base64Decoder {
    text: Option<String>,
}

impl Decoder for Base64Decoder {
    fn init(&mut self, source: &mut dyn Read) -> Result<(), FormatError> {
        self.text = Some(read_source(source)?);
        Ok(())
    }

    fn decode_next(&mut self) -> Result<Option<DecodedDocument>, FormatError> {
        let Some(text) = self.text.take() else {
            return Ok(None);
        };
        // Source offset of every byte kept in `compact`.
        let mut source_offsets = Vec::with_capacity(text.len());
        let mut compact = String::with_capacity(text.len());
        for (offset, c) in text.char_indices().filter(|(_, c)| !c.is_whitespace()) {
            source_offsets.extend(offset..offset + c.len_utf8());
            compact.push(c);
        }
        while compact.len() % 4 != 0 {
            compact.push('=');
        }
        let bytes = STANDARD.decode(&compact).map_err(|err| {
            let offset = match err {
                DecodeError::InvalidByte(at, _) | DecodeError::InvalidLastSymbol(at, _) => {
                    source_offsets.get(at).copied().unwrap_or(text.len())
                }
                _ => 0,
            };
            FormatError::syntax(FORMAT, offset, err.to_string())
        })?;
        let decoded = String::from_utf8(bytes).map_err(|err| {
            FormatError::syntax(
                FORMAT,
                0,
                format!("decoded bytes are not UTF-8: {err}"),
            )
        })?;
        Ok(Some(string_document(decoded)))
    }
}

pub struct Base64Encoder;

impl Encoder for Base64Encoder {
    fn encode(
        &mut self,
        tree: &Tree,
        node: NodeId,
        sink: &mut dyn Write,
    ) -> Result<(), FormatError> {
        let text = scalar_content(tree, node, FORMAT)?;
        write_text(sink, &STANDARD.encode(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{decode_str, encode_to_string};

    fn decode(text: &str) -> String {
        let docs = decode_str(&mut Base64Decoder::default(), text).unwrap();
        let doc = &docs[0];
        doc.tree.node(doc.content().unwrap()).value.clone()
    }

    #[test]
    fn whitespace_and_missing_padding_are_tolerated() {
        assert_eq!(decode("SGVs\nbG8"), "Hello");
        assert_eq!(decode("SGVsbG8=\n"), "Hello");
        assert_eq!(decode(""), "");
    }

    #[test]
    fn invalid_input_is_a_syntax_error() {
        let err = decode_str(&mut Base64Decoder::default(), "SG$s").unwrap_err();
        assert!(matches!(err, FormatError::Syntax { offset: 2, .. }));

        let err = decode_str(&mut Base64Decoder::default(), "/w==").unwrap_err();
        assert!(matches!(err, FormatError::Syntax { .. }));
    }

    #[test]
    fn error_offsets_point_into_the_source() {
        let err = decode_str(&mut Base64Decoder::default(), "SG\nVs\n$Gxv").unwrap_err();
        assert!(matches!(err, FormatError::Syntax { offset: 6, .. }));

        let err = decode_str(&mut Base64Decoder::default(), "  SGVs é").unwrap_err();
        assert!(matches!(err, FormatError::Syntax { offset: 7, .. }));
    }

    #[test]
    fn encodes_scalars_without_newline() {
        let mut tree = Tree::new();
        let value = tree.add_string("Hello");
        let doc = tree.add_document(Some(value));
        assert_eq!(encode_to_string(&mut Base64Encoder, &tree, doc).unwrap(), "SGVsbG8=");

        let seq = tree.add_sequence();
        let err = encode_to_string(&mut Base64Encoder, &tree, seq).unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedShape(_)));
    }
}
