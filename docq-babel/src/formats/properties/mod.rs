//! Java properties format implementation
//!
//! # Key Mapping
//!
//! | Properties           | Node tree                       |
//! |----------------------|---------------------------------|
//! | `a.b = x`            | `a: {b: x}`                     |
//! | `list.0 = x`         | `list: [x]`                     |
//! | `list.2 = x`         | `list: [null, null, x]`         |
//! | `# note` before `a`  | head comment of the `a` key     |
//!
//! Lines follow the `java.util.Properties` grammar: `=`, `:` or whitespace separate key and
//! value, a trailing odd backslash continues the line, and `\t`, `\n`, `\uXXXX` style escapes
//! are honoured in both keys and values. Both `#` and `!` start comments.
//!
//! # Lossy Conversions
//!
//! - Every value decodes as a string.
//! - A repeated key keeps its first position and its last value.
//! - Empty mappings and sequences have no line to live on and are dropped when encoding.
//! - Line and foot comments are dropped when encoding; head comments survive.

use crate::error::FormatError;
use crate::format::{read_source, write_text, DecodedDocument, Decoder, Encoder, Format};
use crate::formats::common::{comment_lines, document_parts};
use crate::preferences::{EncoderPreferences, Preferences, PropertiesPreferences};
use crate::tree::{Node, NodeId, NodeKind, Tree};
use std::io::{Read, Write};

const FORMAT: &str = "properties";

/// Format implementation for Java-style properties files
pub struct PropertiesFormat;

impl Format for PropertiesFormat {
    fn name(&self) -> &str {
        "properties"
    }

    fn aliases(&self) -> &[&str] {
        &["props", "p"]
    }

    fn description(&self) -> &str {
        "Java properties with dotted keys"
    }

    fn file_extensions(&self) -> &[&str] {
        &["properties"]
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decoder(&self, _prefs: &Preferences) -> Result<Box<dyn Decoder>, FormatError> {
        Ok(Box::new(PropertiesDecoder::default()))
    }

    fn encoder(
        &self,
        _encoder: &EncoderPreferences,
        prefs: &Preferences,
    ) -> Result<Box<dyn Encoder>, FormatError> {
        Ok(Box::new(PropertiesEncoder::new(prefs.properties.clone())))
    }
}

/// One `key=value` pair with the comment lines written above it.
#[derive(Debug, PartialEq)]
struct Property {
    key: String,
    value: String,
    comment: Option<String>,
}

/// Numeric segments at or above this stay mapping keys instead of padding a sequence.
const MAX_SEQUENCE_INDEX: usize = 10_000;

fn sequence_index(segment: &str) -> Option<usize> {
    segment
        .parse::<usize>()
        .ok()
        .filter(|index| *index < MAX_SEQUENCE_INDEX)
}

/// Nested shape of the dotted keys before it is moved into a tree.
enum Branch {
    Leaf(String, Option<String>),
    Map(Vec<(String, Branch)>),
    Seq(Vec<Option<Branch>>),
}

impl Branch {
    fn insert(&mut self, segments: &[&str], value: String, comment: Option<String>) {
        let Some((first, rest)) = segments.split_first() else {
            *self = Branch::Leaf(value, comment);
            return;
        };
        let index = sequence_index(first);
        let wants_seq = index.is_some();
        let fits = matches!(
            (&*self, wants_seq),
            (Branch::Map(_), false) | (Branch::Seq(_), true)
        );
        if !fits {
            *self = if wants_seq {
                Branch::Seq(Vec::new())
            } else {
                Branch::Map(Vec::new())
            };
        }
        match self {
            Branch::Map(entries) => {
                let position = match entries.iter().position(|(k, _)| k == first) {
                    Some(position) => position,
                    None => {
                        entries.push((first.to_string(), Branch::Map(Vec::new())));
                        entries.len() - 1
                    }
                };
                entries[position].1.insert(rest, value, comment);
            }
            Branch::Seq(items) => {
                let index = index.unwrap_or_default();
                if items.len() <= index {
                    items.resize_with(index + 1, || None);
                }
                items[index]
                    .get_or_insert_with(|| Branch::Map(Vec::new()))
                    .insert(rest, value, comment);
            }
            Branch::Leaf(..) => {}
        }
    }

    /// Move into `tree`; returns the node and the comment that belongs on its key.
    fn build(self, tree: &mut Tree) -> (NodeId, Option<String>) {
        match self {
            Branch::Leaf(value, comment) => (tree.add_string(value), comment),
            Branch::Map(entries) => {
                let map = tree.add_mapping();
                for (key, branch) in entries {
                    let (value, comment) = branch.build(tree);
                    let key = tree.push_string_entry(map, &key, value);
                    tree.node_mut(key).comments.head = comment;
                }
                (map, None)
            }
            Branch::Seq(items) => {
                let seq = tree.add_sequence();
                for item in items {
                    let id = match item {
                        Some(branch) => {
                            let (id, comment) = branch.build(tree);
                            if comment.is_some() {
                                tree.node_mut(id).comments.head = comment;
                            }
                            id
                        }
                        None => tree.add(Node::null()),
                    };
                    tree.push_item(seq, id);
                }
                (seq, None)
            }
        }
    }
}

#[derive(Default)]
pub struct PropertiesDecoder {
    text: Option<String>,
}

impl Decoder for PropertiesDecoder {
    fn init(&mut self, source: &mut dyn Read) -> Result<(), FormatError> {
        self.text = Some(read_source(source)?);
        Ok(())
    }

    fn decode_next(&mut self) -> Result<Option<DecodedDocument>, FormatError> {
        let Some(text) = self.text.take() else {
            return Ok(None);
        };
        let (properties, trailing) = parse(&text)?;
        tracing::trace!(count = properties.len(), "parsed properties");

        let mut root = Branch::Map(Vec::new());
        for property in properties {
            let segments: Vec<&str> = property.key.split('.').collect();
            root.insert(&segments, property.value, property.comment);
        }
        let mut tree = Tree::new();
        let (content, _) = root.build(&mut tree);
        let doc = tree.add_document(Some(content));
        tree.node_mut(doc).comments.foot = trailing;
        Ok(Some(DecodedDocument { tree, root: doc }))
    }
}

/// Split the text into properties; comments left after the last one are returned separately.
fn parse(text: &str) -> Result<(Vec<Property>, Option<String>), FormatError> {
    let mut properties = Vec::new();
    let mut comments: Vec<String> = Vec::new();
    let mut lines = text.lines().scan(0usize, |offset, line| {
        let start = *offset;
        *offset += line.len() + 1;
        Some((start, line))
    });

    while let Some((offset, line)) = lines.next() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix(['#', '!']) {
            let comment = comment.trim();
            comments.push(if comment.is_empty() {
                "#".to_string()
            } else {
                format!("# {comment}")
            });
            continue;
        }

        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (raw_key, raw_value) = split_key_value(&logical);
        let key = unescape(raw_key, offset)?;
        let value = unescape(raw_value, offset)?;
        let comment = if comments.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut comments).join("\n"))
        };
        properties.push(Property {
            key,
            value,
            comment,
        });
    }

    let trailing = if comments.is_empty() {
        None
    } else {
        Some(comments.join("\n"))
    };
    Ok((properties, trailing))
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if matches!(c, '=' | ':') || c.is_whitespace() {
            key_end = index;
            break;
        }
    }
    let key = &line[..key_end];
    let rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
    let rest = match rest.strip_prefix(['=', ':']) {
        Some(after) => after.trim_start_matches([' ', '\t', '\x0c']),
        None => rest,
    };
    (key, rest)
}

fn unescape(raw: &str, offset: usize) -> Result<String, FormatError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        let message = format!("malformed \\u escape '\\u{hex}'");
                        FormatError::syntax(FORMAT, offset, message)
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

pub struct PropertiesEncoder {
    prefs: PropertiesPreferences,
}

impl PropertiesEncoder {
    pub fn new(prefs: PropertiesPreferences) -> Self {
        PropertiesEncoder { prefs }
    }

    fn write(
        &self,
        tree: &Tree,
        id: NodeId,
        path: &str,
        comments: Vec<&str>,
        out: &mut String,
    ) -> Result<(), FormatError> {
        let id = tree.resolve(id);
        let node = tree.node(id);
        let mut comments = comments;
        if let Some(head) = node.comments.head.as_deref() {
            comments.push(head);
        }
        match node.kind {
            NodeKind::Scalar => {
                for comment in comments {
                    for line in comment_lines(comment) {
                        out.push_str(format!("# {line}").trim_end());
                        out.push('\n');
                    }
                }
                out.push_str(&escape(path, true));
                out.push_str(&self.prefs.separator);
                if !node.is_null() {
                    out.push_str(&escape(&node.value, false));
                }
                out.push('\n');
            }
            NodeKind::Mapping => {
                let mut pending = comments;
                for (key, value) in tree.entries(id) {
                    let key_node = tree.node(tree.resolve(*key));
                    if key_node.kind != NodeKind::Scalar {
                        return Err(FormatError::UnsupportedShape(format!(
                            "properties keys must be scalars, found a {}",
                            key_node.kind.as_str()
                        )));
                    }
                    let mut entry_comments = std::mem::take(&mut pending);
                    if let Some(head) = tree.node(*key).comments.head.as_deref() {
                        entry_comments.push(head);
                    }
                    let entry_path = join_path(path, &key_node.value);
                    self.write(tree, *value, &entry_path, entry_comments, out)?;
                }
            }
            NodeKind::Sequence => {
                let mut pending = comments;
                for (index, item) in tree.items(id).iter().enumerate() {
                    let item_comments = std::mem::take(&mut pending);
                    let item_path = join_path(path, &index.to_string());
                    self.write(tree, *item, &item_path, item_comments, out)?;
                }
            }
            NodeKind::Alias | NodeKind::Document => {
                return Err(FormatError::UnsupportedShape(format!(
                    "cannot encode a nested {} as properties",
                    node.kind.as_str()
                )))
            }
        }
        Ok(())
    }
}

impl Encoder for PropertiesEncoder {
    fn encode(
        &mut self,
        tree: &Tree,
        node: NodeId,
        sink: &mut dyn Write,
    ) -> Result<(), FormatError> {
        let (doc_comments, content) = document_parts(tree, node);
        let mut out = String::new();
        let mut leading = Vec::new();
        if let Some(head) = doc_comments.and_then(|c| c.head.as_deref()) {
            leading.push(head);
        }
        if let Some(content) = content {
            let root = tree.node(tree.resolve(content));
            if root.kind == NodeKind::Scalar {
                return Err(FormatError::UnsupportedShape(
                    "properties need a mapping or sequence at the root".to_string(),
                ));
            }
            self.write(tree, content, "", leading, &mut out)?;
        }
        if let Some(foot) = doc_comments.and_then(|c| c.foot.as_deref()) {
            for line in comment_lines(foot) {
                out.push_str(format!("# {line}").trim_end());
                out.push('\n');
            }
        }
        write_text(sink, &out)
    }
}

fn join_path(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (index, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | ' ' if is_key => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if is_key && index == 0 => {
                out.push('\\');
                out.push(c);
            }
            ' ' if index == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}
