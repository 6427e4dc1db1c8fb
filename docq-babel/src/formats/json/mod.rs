//! JSON format implementation
//!
//! Decoding goes through `serde_json`'s stream deserializer, so a file holding several
//! concatenated values yields several documents. With the `preserve_order` feature objects
//! keep their key order; a repeated key keeps its first position and its last value.
//! With `arbitrary_precision` numbers arrive as the text they were written with, so big
//! integers and exponent forms survive untouched.
//!
//! Encoding is written by hand: the node tree carries tags that decide whether a scalar is
//! a JSON number, boolean, null or string, and `serde_json::Value` has no room for that.
//! `serde_json` is still used for string escaping.

use crate::error::FormatError;
use crate::format::{read_source, write_text, DecodedDocument, Decoder, Encoder, Format};
use crate::formats::common::{document_parts, is_float_literal, is_int_literal, paint, Color};
use crate::preferences::{EncoderPreferences, Preferences};
use crate::tree::{tags, NodeId, NodeKind, Tree};
use serde_json::Value;
use std::io::{Read, Write};

const FORMAT: &str = "json";

/// Format implementation for JSON
pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn aliases(&self) -> &[&str] {
        &["j"]
    }

    fn description(&self) -> &str {
        "JSON values, one document per top-level value"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decoder(&self, _prefs: &Preferences) -> Result<Box<dyn Decoder>, FormatError> {
        Ok(Box::new(JsonDecoder::default()))
    }

    fn encoder(
        &self,
        encoder: &EncoderPreferences,
        _prefs: &Preferences,
    ) -> Result<Box<dyn Encoder>, FormatError> {
        Ok(Box::new(JsonEncoder::new(encoder.indent, encoder.colorize)))
    }
}

#[derive(Default)]
pub struct JsonDecoder {
    text: String,
    position: usize,
}

impl Decoder for JsonDecoder {
    fn init(&mut self, source: &mut dyn Read) -> Result<(), FormatError> {
        self.text = read_source(source)?;
        self.position = 0;
        Ok(())
    }

    fn decode_next(&mut self) -> Result<Option<DecodedDocument>, FormatError> {
        let rest = &self.text[self.position..];
        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
        match stream.next() {
            None => Ok(None),
            Some(Ok(value)) => {
                self.position += stream.byte_offset();
                let mut tree = Tree::new();
                let content = build(&mut tree, value);
                let root = tree.add_document(Some(content));
                Ok(Some(DecodedDocument { tree, root }))
            }
            Some(Err(err)) => {
                let offset = self.position + offset_of(rest, err.line(), err.column());
                Err(FormatError::syntax(FORMAT, offset, err.to_string()))
            }
        }
    }
}

/// Byte offset of a 1-based line and column.
fn offset_of(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

fn build(tree: &mut Tree, value: Value) -> NodeId {
    match value {
        Value::Null => tree.add_scalar(tags::NULL, "null"),
        Value::Bool(b) => tree.add_scalar(tags::BOOL, b.to_string()),
        // Numbers keep the text they were written with, whatever their size.
        Value::Number(n) => {
            let literal = n.to_string();
            let tag = if is_int_literal(&literal) {
                tags::INT
            } else {
                tags::FLOAT
            };
            tree.add_scalar(tag, literal)
        }
        Value::String(s) => tree.add_string(s),
        Value::Array(items) => {
            let seq = tree.add_sequence();
            for item in items {
                let id = build(tree, item);
                tree.push_item(seq, id);
            }
            seq
        }
        Value::Object(entries) => {
            let map = tree.add_mapping();
            for (key, item) in entries {
                let id = build(tree, item);
                tree.push_string_entry(map, &key, id);
            }
            map
        }
    }
}

pub struct JsonEncoder {
    indent: usize,
    colorize: bool,
}

impl JsonEncoder {
    pub fn new(indent: usize, colorize: bool) -> Self {
        JsonEncoder { indent, colorize }
    }

    fn write(
        &self,
        tree: &Tree,
        id: NodeId,
        depth: usize,
        out: &mut String,
    ) -> Result<(), FormatError> {
        let id = tree.resolve(id);
        let node = tree.node(id);
        match node.kind {
            NodeKind::Scalar => out.push_str(&self.scalar(&node.tag, &node.value)),
            NodeKind::Sequence => {
                let items = tree.items(id);
                if items.is_empty() {
                    out.push_str("[]");
                    return Ok(());
                }
                out.push('[');
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    self.newline(depth + 1, out);
                    self.write(tree, *item, depth + 1, out)?;
                }
                self.newline(depth, out);
                out.push(']');
            }
            NodeKind::Mapping => {
                let entries = tree.entries(id);
                if entries.is_empty() {
                    out.push_str("{}");
                    return Ok(());
                }
                out.push('{');
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    self.newline(depth + 1, out);
                    let key = tree.node(tree.resolve(*key));
                    if key.kind != NodeKind::Scalar {
                        return Err(FormatError::UnsupportedShape(format!(
                            "JSON object keys must be scalars, found a {}",
                            key.kind.as_str()
                        )));
                    }
                    out.push_str(&paint(&quote(&key.value), Color::Key, self.colorize));
                    out.push(':');
                    if self.indent > 0 {
                        out.push(' ');
                    }
                    self.write(tree, *value, depth + 1, out)?;
                }
                self.newline(depth, out);
                out.push('}');
            }
            NodeKind::Document => match tree.content(id) {
                Some(content) => self.write(tree, content, depth, out)?,
                None => out.push_str("null"),
            },
            NodeKind::Alias => {
                return Err(FormatError::UnsupportedShape(
                    "alias does not resolve to a node".to_string(),
                ))
            }
        }
        Ok(())
    }

    fn scalar(&self, tag: &str, value: &str) -> String {
        let literal = match tag {
            tags::INT if is_int_literal(value) => json_int(value),
            tags::FLOAT if is_float_literal(value) => json_float(value),
            tags::BOOL => match value.to_ascii_lowercase().as_str() {
                "true" => Some("true".to_string()),
                "false" => Some("false".to_string()),
                _ => None,
            },
            tags::NULL => Some("null".to_string()),
            _ => None,
        };
        match literal {
            Some(text) => paint(&text, Color::for_tag(tag), self.colorize),
            None => paint(&quote(value), Color::String, self.colorize),
        }
    }

    fn newline(&self, depth: usize, out: &mut String) {
        if self.indent == 0 {
            return;
        }
        out.push('\n');
        out.push_str(&" ".repeat(depth * self.indent));
    }
}

impl Encoder for JsonEncoder {
    fn encode(
        &mut self,
        tree: &Tree,
        node: NodeId,
        sink: &mut dyn Write,
    ) -> Result<(), FormatError> {
        let mut out = String::new();
        match document_parts(tree, node).1 {
            Some(content) => self.write(tree, content, 0, &mut out)?,
            None => out.push_str("null"),
        }
        if self.indent > 0 {
            out.push('\n');
        }
        write_text(sink, &out)
    }
}

fn quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

/// JSON spelling of a YAML integer, if it has one.
fn json_int(value: &str) -> Option<String> {
    let (negative, unsigned) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let parsed = if let Some(hex) = unsigned.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()?
    } else if let Some(octal) = unsigned.strip_prefix("0o") {
        u64::from_str_radix(octal, 8).ok()?
    } else {
        let digits = unsigned.trim_start_matches('0');
        if digits.is_empty() {
            return Some("0".to_string());
        }
        return Some(format!("{}{digits}", if negative { "-" } else { "" }));
    };
    Some(format!("{}{parsed}", if negative { "-" } else { "" }))
}

/// JSON spelling of a YAML float; infinities and NaN have none.
fn json_float(value: &str) -> Option<String> {
    let parsed: f64 = value.parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    let unsigned = value.trim_start_matches(['-', '+']);
    if unsigned.starts_with('.') || unsigned.ends_with('.') || value.starts_with('+') {
        return serde_json::Number::from_f64(parsed).map(|n| n.to_string());
    }
    Some(value.to_string())
}
