//! Shared configuration loader for the docq toolchain.
//!
//! `defaults/docq.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`DocqConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use docq_babel::{
    CsvPreferences, EncoderPreferences, Preferences, PropertiesPreferences, XmlPreferences,
    YamlPreferences,
};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/docq.default.toml");

/// Name of the optional per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = "docq.toml";

/// Top-level configuration consumed by docq applications.
#[derive(Debug, Clone, Deserialize)]
pub struct DocqConfig {
    pub output: OutputConfig,
    pub yaml: YamlConfig,
    pub xml: XmlConfig,
    pub csv: CsvConfig,
    pub tsv: CsvConfig,
    pub properties: PropertiesConfig,
}

/// Encoder defaults applied when the command line does not say otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: String,
    pub indent: usize,
    pub colorize: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YamlConfig {
    pub leading_separator: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XmlConfig {
    pub attribute_prefix: String,
    pub content_name: String,
}

/// Shared by the `[csv]` and `[tsv]` tables.
#[derive(Debug, Clone, Deserialize)]
pub struct CsvConfig {
    pub separator: char,
    pub header: bool,
    pub infer_types: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertiesConfig {
    pub separator: String,
}

impl From<&CsvConfig> for CsvPreferences {
    fn from(config: &CsvConfig) -> Self {
        CsvPreferences {
            separator: config.separator,
            header: config.header,
            infer_types: config.infer_types,
        }
    }
}

impl DocqConfig {
    /// Codec preferences for every format.
    pub fn preferences(&self) -> Preferences {
        Preferences {
            yaml: YamlPreferences {
                leading_separator: self.yaml.leading_separator,
            },
            xml: XmlPreferences {
                attribute_prefix: self.xml.attribute_prefix.clone(),
                content_name: self.xml.content_name.clone(),
            },
            csv: (&self.csv).into(),
            tsv: (&self.tsv).into(),
            properties: PropertiesPreferences {
                separator: self.properties.separator.clone(),
            },
        }
    }

    /// Encoder preferences for `format`, or for the configured output format when `None`.
    pub fn encoder_preferences(&self, format: Option<&str>) -> EncoderPreferences {
        EncoderPreferences::new(format.unwrap_or(&self.output.format))
            .with_indent(self.output.indent)
            .with_colorize(self.output.colorize)
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer `docq.toml` from `dir` if there is one.
    pub fn with_local_file(self, dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(LOCAL_CONFIG_FILE);
        self.with_optional_file(path)
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<DocqConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<DocqConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.output.format, "yaml");
        assert_eq!(config.output.indent, 2);
        assert!(!config.output.colorize);
        assert_eq!(config.tsv.separator, '\t');
    }

    #[test]
    fn defaults_match_codec_defaults() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.preferences(), Preferences::default());
        assert_eq!(
            config.encoder_preferences(None),
            EncoderPreferences::new("yaml")
        );
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("output.indent", 4i64)
            .expect("override to apply")
            .set_override("xml.attribute_prefix", "@")
            .expect("override to apply")
            .build()
            .expect("config to build");
        let encoder = config.encoder_preferences(Some("json"));
        assert_eq!(encoder.format, "json");
        assert_eq!(encoder.indent, 4);
        assert_eq!(config.preferences().xml.attribute_prefix, "@");
    }

    #[test]
    fn user_file_overrides_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(LOCAL_CONFIG_FILE);
        fs::write(&path, "[csv]\nseparator = \";\"\ninfer_types = false\n").expect("write config");

        let config = Loader::new()
            .with_local_file(dir.path())
            .build()
            .expect("config to build");
        let csv = config.preferences().csv;
        assert_eq!(csv.separator, ';');
        assert!(!csv.infer_types);
        assert!(csv.header);
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = Loader::new()
            .with_local_file(dir.path())
            .build()
            .expect("config to build");
        assert_eq!(config.properties.separator, " = ");
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = Loader::new()
            .with_file(dir.path().join("absent.toml"))
            .build();
        assert!(result.is_err());
    }
}
