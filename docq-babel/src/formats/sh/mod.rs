//! Shell word format implementation (encode only)
//!
//! Produces text that a POSIX shell reads back as exactly one word with the scalar's value.
//! There is no file extension: a `.sh` file is a script, not one quoted word.

use crate::error::FormatError;
use crate::format::{write_text, Encoder, Format};
use crate::formats::common::scalar_content;
use crate::preferences::{EncoderPreferences, Preferences};
use crate::tree::{NodeId, Tree};
use std::io::Write;

/// Format implementation for shell-quoted strings
pub struct ShFormat;

impl Format for ShFormat {
    fn name(&self) -> &str {
        "sh"
    }

    fn description(&self) -> &str {
        "A single string, quoted as one shell word"
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn encoder(
        &self,
        _encoder: &EncoderPreferences,
        _prefs: &Preferences,
    ) -> Result<Box<dyn Encoder>, FormatError> {
        Ok(Box::new(ShEncoder))
    }
}

pub struct ShEncoder;

impl Encoder for ShEncoder {
    fn encode(
        &mut self,
        tree: &Tree,
        node: NodeId,
        sink: &mut dyn Write,
    ) -> Result<(), FormatError> {
        let text = scalar_content(tree, node, "sh")?;
        write_text(sink, &quote(text))
    }
}

fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c)
}

/// Quote `text` as a single shell word.
pub fn quote(text: &str) -> String {
    if text.is_empty() {
        return "''".to_string();
    }
    if text.chars().all(is_safe) {
        return text.to_string();
    }
    format!("'{}'", text.replace('\'', "'\"'\"'"))
}
