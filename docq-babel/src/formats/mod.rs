//! Format implementations
//!
//! One module per serialized text format. Each exposes a unit-like `Format` value plus the
//! decoder and encoder it hands out; shared scalar and comment helpers live in `common`.

pub mod base64;
pub mod common;
pub mod csv;
pub mod json;
pub mod properties;
pub mod sh;
pub mod uri;
pub mod xml;
pub mod yaml;

pub use self::base64::Base64Format;
pub use self::csv::CsvFormat;
pub use json::JsonFormat;
pub use properties::PropertiesFormat;
pub use sh::ShFormat;
pub use uri::UriFormat;
pub use xml::XmlFormat;
pub use yaml::YamlFormat;
