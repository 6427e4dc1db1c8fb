//! Codec contract
//!
//! A [`Format`] is a stateless, shareable description of one serialized text format. It hands
//! out a fresh [`Decoder`] or [`Encoder`] per call; those carry the per-document state and are
//! never shared between documents.

use crate::error::FormatError;
use crate::preferences::{EncoderPreferences, Preferences};
use crate::tree::{NodeId, Tree};
use std::io::{Read, Write};

/// One decoded document: its own arena plus the Document root inside it.
#[derive(Debug, Clone)]
pub struct DecodedDocument {
    pub tree: Tree,
    pub root: NodeId,
}

impl DecodedDocument {
    /// The content root under the Document node, if the document is not empty.
    pub fn content(&self) -> Option<NodeId> {
        self.tree.content(self.root)
    }
}

/// Text to node tree, one document per [`Decoder::decode_next`] call.
pub trait Decoder {
    /// Read the whole source. Fails with [`FormatError::Io`] when reading fails or the bytes
    /// are not UTF-8.
    fn init(&mut self, source: &mut dyn Read) -> Result<(), FormatError>;

    /// Next document, or `None` once the input is exhausted.
    fn decode_next(&mut self) -> Result<Option<DecodedDocument>, FormatError>;
}

/// Node tree to text.
pub trait Encoder {
    /// Serialize the document rooted at `node` (a Document node or bare content) into `sink`,
    /// flushing it before returning.
    fn encode(&mut self, tree: &Tree, node: NodeId, sink: &mut dyn Write)
        -> Result<(), FormatError>;
}

/// Trait for document formats
///
/// Formats can support decoding, encoding, or both. The directions a format does not
/// support fail with [`FormatError::NotSupported`].
///
/// # Examples
///
/// ```ignore
/// struct Shout;
///
/// impl Format for Shout {
///     fn name(&self) -> &str {
///         "shout"
///     }
///
///     fn supports_encoding(&self) -> bool {
///         true
///     }
///
///     fn encoder(
///         &self,
///         _encoder: &EncoderPreferences,
///         _prefs: &Preferences,
///     ) -> Result<Box<dyn Encoder>, FormatError> {
///         Ok(Box::new(ShoutEncoder))
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "yaml", "json", "xml")
    fn name(&self) -> &str;

    /// Alternative names accepted on lookup (e.g., "yml")
    fn aliases(&self) -> &[&str] {
        &[]
    }

    fn description(&self) -> &str {
        ""
    }

    /// File extensions without the leading dot, used for detection from filenames.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn supports_decoding(&self) -> bool {
        false
    }

    fn supports_encoding(&self) -> bool {
        false
    }

    fn decoder(&self, _prefs: &Preferences) -> Result<Box<dyn Decoder>, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support decoding",
            self.name()
        )))
    }

    fn encoder(
        &self,
        _encoder: &EncoderPreferences,
        _prefs: &Preferences,
    ) -> Result<Box<dyn Encoder>, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support encoding",
            self.name()
        )))
    }

    /// Written between consecutive encoded documents of one stream.
    fn document_separator(&self) -> Option<&str> {
        None
    }
}

/// Read a whole source into a string, mapping failures to [`FormatError::Io`].
pub fn read_source(source: &mut dyn Read) -> Result<String, FormatError> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    String::from_utf8(bytes).map_err(|err| FormatError::Io(format!("input is not UTF-8: {err}")))
}

/// Write encoded text to a sink and flush it.
pub fn write_text(sink: &mut dyn Write, text: &str) -> Result<(), FormatError> {
    sink.write_all(text.as_bytes())?;
    sink.flush()?;
    Ok(())
}

/// Run an encoder into memory.
pub fn encode_to_string(
    encoder: &mut dyn Encoder,
    tree: &Tree,
    node: NodeId,
) -> Result<String, FormatError> {
    let mut buffer = Vec::new();
    encoder.encode(tree, node, &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| FormatError::Io(err.to_string()))
}

/// Decode a string with a fresh decoder until the input runs out.
pub fn decode_str(
    decoder: &mut dyn Decoder,
    text: &str,
) -> Result<Vec<DecodedDocument>, FormatError> {
    decoder.init(&mut text.as_bytes())?;
    let mut documents = Vec::new();
    while let Some(document) = decoder.decode_next()? {
        documents.push(document);
    }
    Ok(documents)
}
