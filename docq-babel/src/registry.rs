//! Format registry for format discovery and selection
//!
//! Formats are registered once and looked up by name or alias, case-insensitively. Adding a
//! format means one [`Format`] impl and one [`FormatRegistry::register`] call.

use crate::error::FormatError;
use crate::format::{encode_to_string, DecodedDocument, Format};
use crate::formats::{
    Base64Format, CsvFormat, JsonFormat, PropertiesFormat, ShFormat, UriFormat, XmlFormat,
    YamlFormat,
};
use crate::preferences::{EncoderPreferences, Preferences};
use std::collections::HashMap;

/// Registry of document formats
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::with_defaults();
/// let docs = registry.decode_all("a: 1", "yaml", &Preferences::default())?;
/// let prefs = Preferences::default();
/// let json = registry.encode_all(&docs, &EncoderPreferences::new("json"), &prefs)?;
/// ```
pub struct FormatRegistry {
    formats: Vec<Box<dyn Format>>,
    /// Lowercased name or alias to position in `formats`.
    index: HashMap<String, usize>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a format
    ///
    /// A format with the same name replaces the earlier one; its aliases are re-pointed.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        let name = format.name().to_lowercase();
        let position = match self.index.get(&name) {
            Some(&position) if self.formats[position].name().eq_ignore_ascii_case(&name) => {
                self.formats[position] = Box::new(format);
                position
            }
            _ => {
                self.formats.push(Box::new(format));
                self.formats.len() - 1
            }
        };
        let format = &self.formats[position];
        self.index.insert(name, position);
        for alias in format.aliases() {
            self.index.insert(alias.to_lowercase(), position);
        }
    }

    /// Get a format by name or alias
    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.index
            .get(&name.to_lowercase())
            .map(|&position| self.formats[position].as_ref())
            .ok_or_else(|| FormatError::UnsupportedFormat(name.to_string()))
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_lowercase())
    }

    /// List all registered format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.iter().map(|f| f.name().to_string()).collect();
        names.sort();
        names
    }

    /// Iterate over the registered formats in registration order
    pub fn formats(&self) -> impl Iterator<Item = &dyn Format> {
        self.formats.iter().map(|f| f.as_ref())
    }

    /// Detect format from filename based on file extension
    ///
    /// Returns the format name if a matching extension is found, or None otherwise.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let registry = FormatRegistry::default();
    /// assert_eq!(registry.detect_format_from_filename("pets.yml"), Some("yaml".to_string()));
    /// assert_eq!(registry.detect_format_from_filename("pets.unknown"), None);
    /// ```
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_lowercase();

        self.formats
            .iter()
            .find(|format| format.file_extensions().contains(&extension.as_str()))
            .map(|format| format.name().to_string())
    }

    /// Decode every document of `source` with the named format
    pub fn decode_all(
        &self,
        source: &str,
        format: &str,
        prefs: &Preferences,
    ) -> Result<Vec<DecodedDocument>, FormatError> {
        let fmt = self.get(format)?;
        tracing::debug!(format = fmt.name(), bytes = source.len(), "decoding");
        let mut decoder = fmt.decoder(prefs)?;
        decoder.init(&mut source.as_bytes())?;
        let mut documents = Vec::new();
        while let Some(document) = decoder.decode_next()? {
            documents.push(document);
        }
        tracing::debug!(format = fmt.name(), documents = documents.len(), "decoded");
        Ok(documents)
    }

    /// Encode a stream of documents with the format named in `encoder`
    ///
    /// Documents are joined with the format's separator, each starting on a fresh line.
    pub fn encode_all(
        &self,
        documents: &[DecodedDocument],
        encoder: &EncoderPreferences,
        prefs: &Preferences,
    ) -> Result<String, FormatError> {
        let fmt = self.get(&encoder.format)?;
        tracing::debug!(format = fmt.name(), documents = documents.len(), "encoding");
        let mut output = String::new();
        for (index, document) in documents.iter().enumerate() {
            if index > 0 {
                if !output.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
                if let Some(separator) = fmt.document_separator() {
                    output.push_str(separator);
                }
            }
            let mut codec = fmt.encoder(encoder, prefs)?;
            output.push_str(&encode_to_string(
                codec.as_mut(),
                &document.tree,
                document.root,
            )?);
        }
        Ok(output)
    }

    /// Create a registry with default formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(YamlFormat);
        registry.register(JsonFormat);
        registry.register(XmlFormat);
        registry.register(CsvFormat::csv());
        registry.register(CsvFormat::tsv());
        registry.register(PropertiesFormat);
        registry.register(Base64Format);
        registry.register(UriFormat);
        registry.register(ShFormat);

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
