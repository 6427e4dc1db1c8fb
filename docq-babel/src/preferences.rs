//! Codec preferences
//!
//!     Preferences are plain values: built once (usually from `docq-config`), then shared
//!     read-only by every decoder and encoder created for a run.

/// Options common to every encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderPreferences {
    pub format: String,
    /// Spaces per nesting level; 0 selects the most compact layout the format has.
    pub indent: usize,
    pub colorize: bool,
}

impl EncoderPreferences {
    pub fn new(format: impl Into<String>) -> Self {
        EncoderPreferences {
            format: format.into(),
            indent: 2,
            colorize: false,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderPreferences {
    pub format: String,
}

impl DecoderPreferences {
    pub fn new(format: impl Into<String>) -> Self {
        DecoderPreferences {
            format: format.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct YamlPreferences {
    /// Emit `---` before the first document too.
    pub leading_separator: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlPreferences {
    pub attribute_prefix: String,
    pub content_name: String,
}

impl Default for XmlPreferences {
    fn default() -> Self {
        XmlPreferences {
            attribute_prefix: "+".to_string(),
            content_name: "+content".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPreferences {
    pub separator: char,
    /// First row names the columns.
    pub header: bool,
    /// Tag cells that look like numbers or booleans accordingly.
    pub infer_types: bool,
}

impl CsvPreferences {
    pub fn csv() -> Self {
        CsvPreferences {
            separator: ',',
            header: true,
            infer_types: true,
        }
    }

    pub fn tsv() -> Self {
        CsvPreferences {
            separator: '\t',
            ..CsvPreferences::csv()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertiesPreferences {
    /// Written between key and value when encoding.
    pub separator: String,
}

impl Default for PropertiesPreferences {
    fn default() -> Self {
        PropertiesPreferences {
            separator: " = ".to_string(),
        }
    }
}

/// Per-format options, bundled so a single value can be handed to any [`Format`](crate::Format).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub yaml: YamlPreferences,
    pub xml: XmlPreferences,
    pub csv: CsvPreferences,
    pub tsv: CsvPreferences,
    pub properties: PropertiesPreferences,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            yaml: YamlPreferences::default(),
            xml: XmlPreferences::default(),
            csv: CsvPreferences::csv(),
            tsv: CsvPreferences::tsv(),
            properties: PropertiesPreferences::default(),
        }
    }
}
