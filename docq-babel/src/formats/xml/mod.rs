//! XML format implementation
//!
//! XML's element/attribute/text grammar has no direct mapping onto a tree of scalars,
//! sequences and mappings, so both directions have to invent structure.
//!
//! # Element Mapping Table
//!
//! | XML                                   | Node tree                                         |
//! |---------------------------------------|---------------------------------------------------|
//! | `<cat>meow</cat>`                     | `cat: meow` (text-only elements collapse)         |
//! | `<cat legs="4">meow</cat>`            | `cat: {+legs: "4", +content: meow}`               |
//! | `<cat/>`, `<cat></cat>`               | `cat: ""`                                         |
//! | `<a>1</a><a>2</a>`                    | `a: [1, 2]` (consecutive siblings only)           |
//! | `<a>1</a><b/><a>2</a>`                | `a: 1`, `b: ""`, `a: 2` (duplicate keys)          |
//! | `<!-- c --><cat>`                     | head comment of the `cat` entry                   |
//! | `</cat><!-- c -->`                    | foot comment of the `cat` entry                   |
//! | `<cat>meow<!-- c --></cat>`           | line comment of the `cat` value                   |
//! | comments after the last element       | foot comment of the document                      |
//!
//! The attribute prefix (`+`) and the content key (`+content`) come from
//! [`XmlPreferences`](crate::preferences::XmlPreferences).
//!
//! # Library Choice
//!
//! `quick-xml` is used for reading (its event reader tolerates several top-level elements)
//! and for escaping. Writing is done by hand so the layout and comment placement stay under
//! our control.
//!
//! # Lossy Conversions
//!
//! - Adjacent comments merge into a single slot, joined with a space.
//! - Whitespace around text is trimmed; several text chunks are joined with one space.
//! - Declarations, processing instructions and DOCTYPE are dropped.
//! - All values decode as strings.

pub mod decoder;
pub mod encoder;

use crate::error::FormatError;
use crate::format::{Decoder, Encoder, Format};
use crate::preferences::{EncoderPreferences, Preferences};

pub use decoder::XmlDecoder;
pub use encoder::XmlEncoder;

/// Format implementation for XML
pub struct XmlFormat;

impl Format for XmlFormat {
    fn name(&self) -> &str {
        "xml"
    }

    fn aliases(&self) -> &[&str] {
        &["x"]
    }

    fn description(&self) -> &str {
        "XML with attribute and content conventions"
    }

    fn file_extensions(&self) -> &[&str] {
        &["xml"]
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decoder(&self, prefs: &Preferences) -> Result<Box<dyn Decoder>, FormatError> {
        Ok(Box::new(XmlDecoder::new(prefs.xml.clone())))
    }

    fn encoder(
        &self,
        encoder: &EncoderPreferences,
        prefs: &Preferences,
    ) -> Result<Box<dyn Encoder>, FormatError> {
        Ok(Box::new(XmlEncoder::new(encoder.indent, prefs.xml.clone())))
    }
}
