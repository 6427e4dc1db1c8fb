//! URI query-component format implementation
//!
//! Decoding treats `+` as a space and then percent-decodes; encoding is
//! `application/x-www-form-urlencoded` escaping, so spaces come out as `+`.

use crate::error::FormatError;
use crate::format::{read_source, write_text, DecodedDocument, Decoder, Encoder, Format};
use crate::formats::common::{scalar_content, string_document};
use crate::preferences::{EncoderPreferences, Preferences};
use crate::tree::{NodeId, Tree};
use percent_encoding::percent_decode_str;
use std::io::{Read, Write};

const FORMAT: &str = "uri";

/// Format implementation for query-escaped text
pub struct UriFormat;

impl Format for UriFormat {
    fn name(&self) -> &str {
        "uri"
    }

    fn description(&self) -> &str {
        "A single string, URI query escaped"
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decoder(&self, _prefs: &Preferences) -> Result<Box<dyn Decoder>, FormatError> {
        Ok(Box::new(UriDecoder::default()))
    }

    fn encoder(
        &self,
        _encoder: &EncoderPreferences,
        _prefs: &Preferences,
    ) -> Result<Box<dyn Encoder>, FormatError> {
        Ok(Box::new(UriEncoder))
    }
}

#[derive(Default)]
pub struct UriDecoder {
    text: Option<String>,
}

impl Decoder for UriDecoder {
    fn init(&mut self, source: &mut dyn Read) -> Result<(), FormatError> {
        self.text = Some(read_source(source)?);
        Ok(())
    }

    fn decode_next(&mut self) -> Result<Option<DecodedDocument>, FormatError> {
        let Some(text) = self.text.take() else {
            return Ok(None);
        };
        let spaced = text.replace('+', " ");
        let decoded = percent_decode_str(&spaced)
            .decode_utf8()
            .map_err(|err| FormatError::syntax(FORMAT, err.valid_up_to(), err.to_string()))?;
        Ok(Some(string_document(decoded.into_owned())))
    }
}

pub struct UriEncoder;

impl Encoder for UriEncoder {
    fn encode(
        &mut self,
        tree: &Tree,
        node: NodeId,
        sink: &mut dyn Write,
    ) -> Result<(), FormatError> {
        let text = scalar_content(tree, node, FORMAT)?;
        let escaped: String = url::form_urlencoded::byte_serialize(text.as_bytes()).collect();
        write_text(sink, &escaped)
    }
}
