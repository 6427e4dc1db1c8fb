//! Shared helpers for the codecs
//!
//! Plain-scalar tag resolution, comment text handling and terminal colouring are needed by
//! more than one format, so they live here rather than in any single codec.

use crate::error::FormatError;
use crate::format::DecodedDocument;
use crate::tree::{tags, Comments, NodeId, NodeKind, Tree};

/// Tag a plain (unquoted, untagged) scalar resolves to.
///
/// Follows the YAML core schema, which every codec uses as its type vocabulary.
pub fn resolve_plain(value: &str) -> &'static str {
    if is_null_literal(value) {
        tags::NULL
    } else if is_bool_literal(value) {
        tags::BOOL
    } else if is_int_literal(value) {
        tags::INT
    } else if is_float_literal(value) {
        tags::FLOAT
    } else {
        tags::STR
    }
}

pub fn is_null_literal(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

pub fn is_bool_literal(value: &str) -> bool {
    matches!(
        value,
        "true" | "True" | "TRUE" | "false" | "False" | "FALSE"
    )
}

pub fn is_int_literal(value: &str) -> bool {
    let unsigned = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    if let Some(hex) = unsigned.strip_prefix("0x") {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(octal) = unsigned.strip_prefix("0o") {
        return !octal.is_empty() && octal.chars().all(|c| ('0'..='7').contains(&c));
    }
    !unsigned.is_empty() && unsigned.chars().all(|c| c.is_ascii_digit())
}

pub fn is_float_literal(value: &str) -> bool {
    let unsigned = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    if matches!(unsigned, ".inf" | ".Inf" | ".INF") {
        return true;
    }
    if matches!(value, ".nan" | ".NaN" | ".NAN") {
        return true;
    }

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    let mantissa_ok = match fraction {
        Some(fraction) => {
            (!whole.is_empty() || !fraction.is_empty()) && digits(whole) && digits(fraction)
        }
        None => !whole.is_empty() && digits(whole),
    };
    let exponent_ok = match exponent {
        Some(exp) => {
            let exp = exp
                .strip_prefix('-')
                .or_else(|| exp.strip_prefix('+'))
                .unwrap_or(exp);
            !exp.is_empty() && digits(exp)
        }
        None => fraction.is_some(),
    };
    mantissa_ok && exponent_ok
}

/// Build a stored comment from raw comment texts: trimmed, space-joined, `# ` on every line.
pub fn comment_from_texts(texts: &[String]) -> Option<String> {
    let joined = texts
        .iter()
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        return None;
    }
    Some(
        joined
            .lines()
            .map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    "#".to_string()
                } else {
                    format!("# {line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Comment text without its `#` markers, one entry per line.
pub fn comment_lines(comment: &str) -> Vec<String> {
    comment
        .lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix('#').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).to_string()
        })
        .collect()
}

/// Normalise a raw comment so every line carries a leading `#`.
pub fn as_comment(raw: &str) -> String {
    raw.lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                line.trim_start().to_string()
            } else if line.trim().is_empty() {
                "#".to_string()
            } else {
                format!("# {}", line.trim())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Concatenate two optional comment slots, one per line.
pub fn join_comments(first: Option<&str>, second: Option<&str>) -> Option<String> {
    match (first, second) {
        (Some(a), Some(b)) => Some(format!("{a}\n{b}")),
        (Some(a), None) => Some(a.to_string()),
        (None, Some(b)) => Some(b.to_string()),
        (None, None) => None,
    }
}

/// Split an encoder input into the Document node's comments (if it is one) and its content.
pub fn document_parts(tree: &Tree, node: NodeId) -> (Option<&Comments>, Option<NodeId>) {
    let root = tree.node(node);
    if root.kind == NodeKind::Document {
        (Some(&root.comments), tree.content(node))
    } else {
        (None, Some(node))
    }
}

/// Text of the scalar an encoder was handed, for formats that can only carry one string.
///
/// A null or missing document content encodes as the empty string.
pub fn scalar_content<'t>(
    tree: &'t Tree,
    node: NodeId,
    format: &str,
) -> Result<&'t str, FormatError> {
    let Some(content) = document_parts(tree, node).1 else {
        return Ok("");
    };
    let scalar = tree.node(tree.resolve(content));
    match scalar.kind {
        NodeKind::Scalar if scalar.is_null() && scalar.value.is_empty() => Ok(""),
        NodeKind::Scalar => Ok(scalar.value.as_str()),
        kind => Err(FormatError::UnsupportedShape(format!(
            "{format} can only encode scalars, found a {}",
            kind.as_str()
        ))),
    }
}

/// A document holding a single `!!str` scalar.
pub fn string_document(text: impl Into<String>) -> DecodedDocument {
    let mut tree = Tree::new();
    let content = tree.add_string(text);
    let root = tree.add_document(Some(content));
    DecodedDocument { tree, root }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Key,
    String,
    Number,
    Bool,
    Null,
    Comment,
    Anchor,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Key => "\x1b[34m",
            Color::String => "\x1b[32m",
            Color::Number => "\x1b[35m",
            Color::Bool => "\x1b[33m",
            Color::Null => "\x1b[90m",
            Color::Comment => "\x1b[90m",
            Color::Anchor => "\x1b[36m",
        }
    }

    /// Colour for a scalar of the given tag.
    pub fn for_tag(tag: &str) -> Color {
        match tag {
            tags::INT | tags::FLOAT => Color::Number,
            tags::BOOL => Color::Bool,
            tags::NULL => Color::Null,
            _ => Color::String,
        }
    }
}

/// Wrap `text` in ANSI escapes when colouring is on.
pub fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        format!("{}{text}\x1b[0m", color.code())
    } else {
        text.to_string()
    }
}
