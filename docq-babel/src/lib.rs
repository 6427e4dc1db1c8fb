//! Format conversion core for docq
//!
//!     This crate turns serialized text (YAML, JSON, XML, CSV, TSV, Java properties, base64,
//!     URI-escaped and shell-quoted strings) into one shared document tree and back.
//!
//!     TLDR: For format authors:
//!         - A format is a unit struct implementing [`Format`]; it hands out a fresh
//!           [`Decoder`] and/or [`Encoder`] per use and never holds per-document state.
//!         - Parse with the format's library where one exists (yaml-rust2, quick-xml,
//!           serde_json, csv, base64, percent-encoding); write by hand when layout or comment
//!           placement matters.
//!         - Register it in [`FormatRegistry::with_defaults`]. Nothing else needs to know.
//!         - Test the format in its own module and under tests/<format>/.
//!
//! Architecture
//!
//!     Every codec speaks the node tree in ./tree. Nodes live in an arena and point to their
//!     parent by index, so a decoded subtree can be grafted anywhere and an original node can
//!     stay around after it has been replaced.
//!
//!     This is a pure lib: no printing, no env vars, no process exit. docq-cli owns the shell.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format, Decoder and Encoder traits
//!     ├── preferences.rs          # Per-format options
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── operators.rs            # decode/encode pipeline operators
//!     ├── tree                    # Node model and arena
//!     ├── formats
//!     │   ├── <format>
//!     │   │   ├── decoder.rs      # when the codec is large enough to split
//!     │   │   ├── encoder.rs
//!     │   │   └── mod.rs
//!     │   └── common              # tag resolution, comments, colour
//!     └── lib.rs
//!
//! Testing
//!     tests
//!     └── <format>
//!         └── <testname>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to
//!     include these in the mod.
//!
//! Comments
//!
//!     Comments are fidelity data: each node has head, line and foot slots holding `# `-prefixed
//!     text. YAML and XML carry them through, properties keeps head comments, the rest drop
//!     them. XML is the interesting case since its comments have to be assigned to a slot by
//!     position; see ./formats/xml/mod.rs.
//!
//! Operators
//!
//!     [`DecodeOperator`] parses selected string nodes and [`EncodeOperator`] serializes
//!     selected nodes back to strings. A [`Pipeline`] run remembers what each decoded node was
//!     decoded from so a re-encode keeps the original's trailing-newline style.

pub mod error;
pub mod format;
pub mod formats;
pub mod operators;
pub mod preferences;
pub mod registry;
pub mod tree;

pub use error::FormatError;
pub use format::{DecodedDocument, Decoder, Encoder, Format};
pub use operators::{DecodeOperator, EncodeOperator, MatchContext, Operator, Pipeline};
pub use preferences::{
    CsvPreferences, DecoderPreferences, EncoderPreferences, Preferences, PropertiesPreferences,
    XmlPreferences, YamlPreferences,
};
pub use registry::FormatRegistry;
pub use tree::{Node, NodeId, NodeKind, NodePath, Tree};
