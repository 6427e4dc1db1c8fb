//! YAML format implementation
//!
//! # Library Choice
//!
//! Decoding uses the `yaml-rust2` event parser, which gives us scalar styles, explicit tags,
//! flow/block layout and anchors without going through its `Yaml` value type (which would
//! lose all of them). Encoding is a hand-written block emitter, see [`encoder`].
//!
//! # Lossy Conversions
//!
//! - Comments are recovered from the source text, but blank lines between them are not.
//! - Folded scalars are written back as literal blocks.
//! - Tag directives (`%TAG`) are resolved away.

pub mod decoder;
pub mod encoder;

use crate::error::FormatError;
use crate::format::{Decoder, Encoder, Format};
use crate::preferences::{EncoderPreferences, Preferences};

pub use decoder::YamlDecoder;
pub use encoder::YamlEncoder;

/// Format implementation for YAML
pub struct YamlFormat;

impl Format for YamlFormat {
    fn name(&self) -> &str {
        "yaml"
    }

    fn aliases(&self) -> &[&str] {
        &["yml", "y"]
    }

    fn description(&self) -> &str {
        "YAML 1.2 documents, multi-document streams included"
    }

    fn file_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decoder(&self, _prefs: &Preferences) -> Result<Box<dyn Decoder>, FormatError> {
        Ok(Box::new(YamlDecoder::new()))
    }

    fn encoder(
        &self,
        encoder: &EncoderPreferences,
        prefs: &Preferences,
    ) -> Result<Box<dyn Encoder>, FormatError> {
        Ok(Box::new(YamlEncoder::new(
            encoder.indent,
            encoder.colorize,
            prefs.yaml.clone(),
        )))
    }

    fn document_separator(&self) -> Option<&str> {
        Some("---\n")
    }
}
