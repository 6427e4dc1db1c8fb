//! CSV and TSV format implementation
//!
//! One [`CsvFormat`] value per dialect; the separator, header handling and type inference come
//! from its [`CsvPreferences`].
//!
//! # Table Mapping
//!
//! | Table                          | Node tree                                   |
//! |--------------------------------|---------------------------------------------|
//! | header row + data rows         | sequence of mappings keyed by the header    |
//! | rows, `header = false`         | sequence of sequences                       |
//! | cell `3`, `infer_types = true` | `!!int` scalar                              |
//!
//! When encoding, a sequence of mappings writes the union of their keys (first-seen order) as
//! the header; cells a row lacks are left empty. A sequence of sequences or scalars is written
//! row by row.
//!
//! # Library Choice
//!
//! The `csv` crate does the quoting in both directions. Records are read with
//! `has_headers(false)` so the header row can be handled here, and `flexible(true)` so ragged
//! rows are kept rather than rejected.
//!
//! # Lossy Conversions
//!
//! - Comments are dropped.
//! - Cells that look like `null` stay strings; only numbers and booleans are inferred.
//! - Tags and styles are dropped when encoding.

use crate::error::FormatError;
use crate::format::{read_source, write_text, DecodedDocument, Decoder, Encoder, Format};
use crate::formats::common::{document_parts, resolve_plain};
use crate::preferences::{CsvPreferences, EncoderPreferences, Preferences};
use crate::tree::{tags, NodeId, NodeKind, Tree};
use std::io::{Read, Write};

/// Format implementation for delimiter-separated tables
pub struct CsvFormat {
    name: &'static str,
    aliases: &'static [&'static str],
    extensions: &'static [&'static str],
    pick: fn(&Preferences) -> &CsvPreferences,
}

impl CsvFormat {
    pub fn csv() -> Self {
        CsvFormat {
            name: "csv",
            aliases: &["c"],
            extensions: &["csv"],
            pick: csv_preferences,
        }
    }

    pub fn tsv() -> Self {
        CsvFormat {
            name: "tsv",
            aliases: &["t"],
            extensions: &["tsv"],
            pick: tsv_preferences,
        }
    }
}

fn csv_preferences(prefs: &Preferences) -> &CsvPreferences {
    &prefs.csv
}

fn tsv_preferences(prefs: &Preferences) -> &CsvPreferences {
    &prefs.tsv
}

impl Format for CsvFormat {
    fn name(&self) -> &str {
        self.name
    }

    fn aliases(&self) -> &[&str] {
        self.aliases
    }

    fn description(&self) -> &str {
        if self.name == "tsv" {
            "Tab-separated values"
        } else {
            "Comma-separated values"
        }
    }

    fn file_extensions(&self) -> &[&str] {
        self.extensions
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decoder(&self, prefs: &Preferences) -> Result<Box<dyn Decoder>, FormatError> {
        Ok(Box::new(CsvDecoder::new(self.name, (self.pick)(prefs).clone())))
    }

    fn encoder(
        &self,
        _encoder: &EncoderPreferences,
        prefs: &Preferences,
    ) -> Result<Box<dyn Encoder>, FormatError> {
        Ok(Box::new(CsvEncoder::new((self.pick)(prefs).clone())))
    }
}

fn delimiter(prefs: &CsvPreferences) -> Result<u8, FormatError> {
    u8::try_from(prefs.separator).map_err(|_| {
        FormatError::NotSupported(format!(
            "separator '{}' is not a single-byte character",
            prefs.separator
        ))
    })
}

pub struct CsvDecoder {
    format: &'static str,
    prefs: CsvPreferences,
    text: Option<String>,
}

impl CsvDecoder {
    pub fn new(format: &'static str, prefs: CsvPreferences) -> Self {
        CsvDecoder {
            format,
            prefs,
            text: None,
        }
    }

    fn cell(&self, tree: &mut Tree, text: &str) -> NodeId {
        let tag = if self.prefs.infer_types {
            match resolve_plain(text) {
                tags::NULL => tags::STR,
                tag => tag,
            }
        } else {
            tags::STR
        };
        tree.add_scalar(tag, text)
    }
}

impl Decoder for CsvDecoder {
    fn init(&mut self, source: &mut dyn Read) -> Result<(), FormatError> {
        self.text = Some(read_source(source)?);
        Ok(())
    }

    fn decode_next(&mut self) -> Result<Option<DecodedDocument>, FormatError> {
        let Some(text) = self.text.take() else {
            return Ok(None);
        };
        let mut reader = ::csv::ReaderBuilder::new()
            .delimiter(delimiter(&self.prefs)?)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| {
                let offset = err
                    .position()
                    .map(|p| p.byte() as usize)
                    .unwrap_or_default();
                FormatError::syntax(self.format, offset, err.to_string())
            })?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }
        tracing::trace!(format = self.format, rows = rows.len(), "read table");

        let mut tree = Tree::new();
        let seq = tree.add_sequence();
        let mut rows = rows.into_iter();
        if self.prefs.header {
            let header = rows.next().unwrap_or_default();
            for row in rows {
                let map = tree.add_mapping();
                for (index, name) in header.iter().enumerate() {
                    let text = row.get(index).map(String::as_str).unwrap_or("");
                    let value = self.cell(&mut tree, text);
                    tree.push_string_entry(map, name, value);
                }
                tree.push_item(seq, map);
            }
        } else {
            for row in rows {
                let inner = tree.add_sequence();
                for text in &row {
                    let value = self.cell(&mut tree, text);
                    tree.push_item(inner, value);
                }
                tree.push_item(seq, inner);
            }
        }
        let root = tree.add_document(Some(seq));
        Ok(Some(DecodedDocument { tree, root }))
    }
}

pub struct CsvEncoder {
    prefs: CsvPreferences,
}

impl CsvEncoder {
    pub fn new(prefs: CsvPreferences) -> Self {
        CsvEncoder { prefs }
    }
}

fn scalar_text<'t>(tree: &'t Tree, id: NodeId) -> Result<&'t str, FormatError> {
    let node = tree.node(tree.resolve(id));
    if node.kind != NodeKind::Scalar {
        return Err(FormatError::UnsupportedShape(format!(
            "table cells must be scalars, found a {}",
            node.kind.as_str()
        )));
    }
    if node.is_null() {
        return Ok("");
    }
    Ok(node.value.as_str())
}

/// Rows of cells for a sequence root.
fn table(tree: &Tree, seq: NodeId) -> Result<Vec<Vec<String>>, FormatError> {
    let items: Vec<NodeId> = tree.items(seq).iter().map(|id| tree.resolve(*id)).collect();
    let all_mappings =
        !items.is_empty() && items.iter().all(|id| tree.node(*id).kind == NodeKind::Mapping);

    if !all_mappings {
        return items
            .iter()
            .map(|id| match tree.node(*id).kind {
                NodeKind::Sequence => tree
                    .items(*id)
                    .iter()
                    .map(|cell| scalar_text(tree, *cell).map(str::to_string))
                    .collect(),
                _ => Ok(vec![scalar_text(tree, *id)?.to_string()]),
            })
            .collect();
    }

    let mut header: Vec<String> = Vec::new();
    for id in &items {
        for (key, _) in tree.entries(*id) {
            let name = scalar_text(tree, *key)?;
            if !header.iter().any(|h| h == name) {
                header.push(name.to_string());
            }
        }
    }
    let mut rows = vec![header.clone()];
    for id in &items {
        let mut row = Vec::with_capacity(header.len());
        for name in &header {
            let cell = match tree.get(*id, name) {
                Some(value) => scalar_text(tree, value)?.to_string(),
                None => String::new(),
            };
            row.push(cell);
        }
        rows.push(row);
    }
    Ok(rows)
}

impl Encoder for CsvEncoder {
    fn encode(
        &mut self,
        tree: &Tree,
        node: NodeId,
        sink: &mut dyn Write,
    ) -> Result<(), FormatError> {
        let rows = match document_parts(tree, node).1.map(|id| tree.resolve(id)) {
            Some(root) if tree.node(root).kind == NodeKind::Sequence => table(tree, root)?,
            Some(root) => {
                return Err(FormatError::UnsupportedShape(format!(
                    "tables need a sequence at the root, found a {}",
                    tree.node(root).kind.as_str()
                )))
            }
            None => Vec::new(),
        };

        let mut writer = ::csv::WriterBuilder::new()
            .delimiter(delimiter(&self.prefs)?)
            .flexible(true)
            .terminator(::csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        for row in &rows {
            writer
                .write_record(row)
                .map_err(|err| FormatError::Io(err.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| FormatError::Io(err.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|err| FormatError::Io(err.to_string()))?;
        write_text(sink, &text)
    }
}
