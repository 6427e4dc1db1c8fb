//! Node tree to YAML
//!
//! A small block-style emitter. yaml-rust2's own emitter drops comments, anchors and tags,
//! all of which this one writes back out.

use crate::error::FormatError;
use crate::format::{write_text, Encoder};
use crate::formats::common::{
    as_comment, document_parts, join_comments, paint, resolve_plain, Color,
};
use crate::preferences::YamlPreferences;
use crate::tree::{tags, Node, NodeId, NodeKind, ScalarStyle, Tree};
use std::io::Write;

pub struct YamlEncoder {
    indent: usize,
    colorize: bool,
    prefs: YamlPreferences,
    first: bool,
}

impl YamlEncoder {
    pub fn new(indent: usize, colorize: bool, prefs: YamlPreferences) -> Self {
        YamlEncoder {
            indent: if indent == 0 { 2 } else { indent },
            colorize,
            prefs,
            first: true,
        }
    }
}

impl Encoder for YamlEncoder {
    fn encode(
        &mut self,
        tree: &Tree,
        node: NodeId,
        sink: &mut dyn Write,
    ) -> Result<(), FormatError> {
        let mut emitter = Emitter {
            tree,
            indent: self.indent,
            colorize: self.colorize,
            out: String::new(),
        };
        if self.prefs.leading_separator && self.first {
            emitter.out.push_str("---\n");
        }
        self.first = false;
        emitter.document(node)?;
        write_text(sink, &emitter.out)
    }
}

/// How a scalar is laid out.
enum ScalarOut {
    Inline(String),
    Literal { header: &'static str, lines: Vec<String> },
}

struct Emitter<'a> {
    tree: &'a Tree,
    indent: usize,
    colorize: bool,
    out: String,
}

impl<'a> Emitter<'a> {
    fn document(&mut self, node: NodeId) -> Result<(), FormatError> {
        let (comments, content) = document_parts(self.tree, node);
        let head = comments.and_then(|c| c.head.as_deref());
        let foot = comments.and_then(|c| c.foot.as_deref());

        if let Some(head) = head {
            self.comment_block(head, 0);
        }
        match content {
            Some(content) => self.top(content)?,
            None if head.is_none() && foot.is_none() => self.out.push_str("null\n"),
            None => {}
        }
        if let Some(foot) = foot {
            if content.is_some() {
                self.out.push('\n');
            }
            self.comment_block(foot, 0);
        }
        Ok(())
    }

    fn top(&mut self, id: NodeId) -> Result<(), FormatError> {
        let tree = self.tree;
        let node = tree.node(id);
        if let Some(head) = &node.comments.head {
            self.comment_block(head, 0);
        }
        if self.is_block(id) {
            let props = self.props(node);
            if !props.is_empty() {
                self.out.push_str(props.trim_start());
                self.line_comment(node.comments.line.as_deref(), 0);
            } else if let Some(line) = &node.comments.line {
                self.comment_block(line, 0);
            }
            self.block_body(id, 0, false)?;
        } else {
            match self.scalar_out(id, false, false)? {
                ScalarOut::Inline(text) => {
                    let text = if text.is_empty() { "null".to_string() } else { text };
                    self.out.push_str(&text);
                    self.line_comment(node.comments.line.as_deref(), 0);
                }
                ScalarOut::Literal { header, lines } => {
                    self.out.push_str(header);
                    self.line_comment(node.comments.line.as_deref(), 0);
                    self.literal_lines(&lines, self.indent);
                }
            }
        }
        if let Some(foot) = &node.comments.foot {
            self.comment_block(foot, 0);
        }
        Ok(())
    }

    /// A non-empty mapping or sequence written in block style.
    fn is_block(&self, id: NodeId) -> bool {
        let node = self.tree.node(id);
        match node.kind {
            NodeKind::Mapping => !node.style.flow && !self.tree.entries(id).is_empty(),
            NodeKind::Sequence => !node.style.flow && !self.tree.items(id).is_empty(),
            _ => false,
        }
    }

    fn block_body(
        &mut self,
        id: NodeId,
        col: usize,
        inline_first: bool,
    ) -> Result<(), FormatError> {
        match self.tree.node(id).kind {
            NodeKind::Mapping => self.mapping_body(id, col, inline_first),
            _ => self.sequence_body(id, col, inline_first),
        }
    }

    fn mapping_body(
        &mut self,
        id: NodeId,
        col: usize,
        inline_first: bool,
    ) -> Result<(), FormatError> {
        let tree = self.tree;
        for (index, (key, value)) in tree.entries(id).iter().enumerate() {
            let key_node = tree.node(*key);
            let value_node = tree.node(*value);
            let head = join_comments(
                key_node.comments.head.as_deref(),
                value_node.comments.head.as_deref(),
            );
            if let Some(head) = &head {
                self.comment_block(head, col);
            }
            if !(inline_first && index == 0) {
                self.pad(col);
            }
            let key_text = self.key(*key)?;
            self.out.push_str(&key_text);
            self.out.push(':');

            let line = join_comments(
                key_node.comments.line.as_deref(),
                value_node.comments.line.as_deref(),
            );
            self.value(*value, col, col + self.indent, line.as_deref(), false)?;

            let foot = join_comments(
                value_node.comments.foot.as_deref(),
                key_node.comments.foot.as_deref(),
            );
            if let Some(foot) = &foot {
                self.comment_block(foot, col);
            }
        }
        Ok(())
    }

    fn sequence_body(
        &mut self,
        id: NodeId,
        col: usize,
        inline_first: bool,
    ) -> Result<(), FormatError> {
        let tree = self.tree;
        for (index, item) in tree.items(id).iter().enumerate() {
            let node = tree.node(*item);
            if let Some(head) = &node.comments.head {
                self.comment_block(head, col);
            }
            if !(inline_first && index == 0) {
                self.pad(col);
            }
            self.out.push('-');
            self.value(*item, col, col + 2, node.comments.line.as_deref(), true)?;
            if let Some(foot) = &node.comments.foot {
                self.comment_block(foot, col);
            }
        }
        Ok(())
    }

    /// Write a value after `key:` or `-`, ending with a newline.
    fn value(
        &mut self,
        id: NodeId,
        col: usize,
        child_col: usize,
        line: Option<&str>,
        in_sequence: bool,
    ) -> Result<(), FormatError> {
        let tree = self.tree;
        let node = tree.node(id);
        if self.is_block(id) {
            let props = self.props(node);
            let first_is_plain = match node.kind {
                NodeKind::Mapping => tree
                    .entries(id)
                    .first()
                    .map(|(k, v)| {
                        tree.node(*k).comments.head.is_none()
                            && tree.node(*v).comments.head.is_none()
                    })
                    .unwrap_or(false),
                _ => tree
                    .items(id)
                    .first()
                    .map(|item| tree.node(*item).comments.head.is_none())
                    .unwrap_or(false),
            };
            // Inside a sequence item the collection starts on the dash line.
            if in_sequence && props.is_empty() && line.is_none() && first_is_plain {
                self.out.push(' ');
                return self.block_body(id, child_col, true);
            }
            self.out.push_str(&props);
            self.line_comment(line, col);
            return self.block_body(id, child_col, false);
        }

        match self.scalar_out(id, false, false)? {
            ScalarOut::Inline(text) => {
                if !text.is_empty() {
                    self.out.push(' ');
                    self.out.push_str(&text);
                }
                self.line_comment(line, col);
            }
            ScalarOut::Literal { header, lines } => {
                self.out.push(' ');
                self.out.push_str(header);
                self.line_comment(line, col);
                self.literal_lines(&lines, child_col.max(col + self.indent));
            }
        }
        Ok(())
    }

    /// Anchor and tag of a collection, each with a leading space.
    fn props(&self, node: &Node) -> String {
        let mut props = String::new();
        if let Some(anchor) = &node.anchor {
            props.push(' ');
            props.push_str(&paint(&format!("&{anchor}"), Color::Anchor, self.colorize));
        }
        let implicit = matches!(node.tag.as_str(), "" | tags::MAP | tags::SEQ);
        if !implicit {
            props.push(' ');
            props.push_str(&tag_text(&node.tag));
        }
        props
    }

    fn key(&self, id: NodeId) -> Result<String, FormatError> {
        let node = self.tree.node(id);
        match node.kind {
            NodeKind::Scalar => match self.scalar_out(id, true, true)? {
                ScalarOut::Inline(text) if text.is_empty() => Ok("null".to_string()),
                ScalarOut::Inline(text) => Ok(text),
                ScalarOut::Literal { .. } => Ok(double_quoted(&node.value)),
            },
            _ => self.flow(id),
        }
    }

    /// Flow rendering, used for flow-styled and empty collections and for complex keys.
    fn flow(&self, id: NodeId) -> Result<String, FormatError> {
        let node = self.tree.node(id);
        let mut prefix = String::new();
        if let Some(anchor) = &node.anchor {
            prefix.push_str(&paint(&format!("&{anchor}"), Color::Anchor, self.colorize));
            prefix.push(' ');
        }
        let body = match node.kind {
            NodeKind::Scalar => {
                return self.scalar_out(id, true, false).map(|out| match out {
                    ScalarOut::Inline(text) if text.is_empty() => "null".to_string(),
                    ScalarOut::Inline(text) => text,
                    ScalarOut::Literal { .. } => double_quoted(&node.value),
                })
            }
            NodeKind::Alias => paint(&format!("*{}", node.value), Color::Anchor, self.colorize),
            NodeKind::Mapping => {
                if !matches!(node.tag.as_str(), "" | tags::MAP) {
                    prefix.push_str(&tag_text(&node.tag));
                    prefix.push(' ');
                }
                let mut parts = Vec::new();
                for (key, value) in self.tree.entries(id) {
                    parts.push(format!("{}: {}", self.key(*key)?, self.flow(*value)?));
                }
                format!("{{{}}}", parts.join(", "))
            }
            NodeKind::Sequence => {
                if !matches!(node.tag.as_str(), "" | tags::SEQ) {
                    prefix.push_str(&tag_text(&node.tag));
                    prefix.push(' ');
                }
                let parts = self
                    .tree
                    .items(id)
                    .iter()
                    .map(|item| self.flow(*item))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("[{}]", parts.join(", "))
            }
            NodeKind::Document => {
                return Err(FormatError::UnsupportedShape(
                    "a document cannot be nested inside another".to_string(),
                ))
            }
        };
        Ok(format!("{prefix}{body}"))
    }

    fn scalar_out(
        &self,
        id: NodeId,
        in_flow: bool,
        as_key: bool,
    ) -> Result<ScalarOut, FormatError> {
        let node = self.tree.node(id);
        match node.kind {
            NodeKind::Scalar => {}
            NodeKind::Mapping | NodeKind::Sequence | NodeKind::Alias | NodeKind::Document => {
                return self.flow(id).map(ScalarOut::Inline)
            }
        }

        let mut prefix = String::new();
        if let Some(anchor) = &node.anchor {
            prefix.push_str(&paint(&format!("&{anchor}"), Color::Anchor, self.colorize));
            prefix.push(' ');
        }
        let value = node.value.as_str();
        let tag = node.tag.as_str();
        let color = if as_key { Color::Key } else { Color::for_tag(tag) };

        let text = match tag {
            tags::NULL if value.is_empty() => {
                if prefix.is_empty() && !in_flow {
                    return Ok(ScalarOut::Inline(String::new()));
                }
                "null".to_string()
            }
            tags::NULL | tags::INT | tags::FLOAT | tags::BOOL => {
                if resolve_plain(value) == tag && is_plain_safe(value, in_flow) {
                    value.to_string()
                } else {
                    format!("{} {}", tag_text(tag), quoted_if_needed(value, in_flow))
                }
            }
            "" | tags::STR => {
                let multi_line = value.contains('\n');
                let literal_ok = !in_flow && multi_line && literal_safe(value);
                match node.style.scalar {
                    ScalarStyle::Literal | ScalarStyle::Folded if literal_ok => {
                        return Ok(literal(prefix, value));
                    }
                    ScalarStyle::SingleQuoted if !multi_line => single_quoted(value),
                    ScalarStyle::DoubleQuoted => double_quoted(value),
                    _ if resolve_plain(value) == tags::STR && is_plain_safe(value, in_flow) => {
                        value.to_string()
                    }
                    _ if literal_ok => return Ok(literal(prefix, value)),
                    _ => double_quoted(value),
                }
            }
            custom => format!("{} {}", tag_text(custom), quoted_if_needed(value, in_flow)),
        };
        Ok(ScalarOut::Inline(format!("{prefix}{}", paint(&text, color, self.colorize))))
    }

    fn literal_lines(&mut self, lines: &[String], col: usize) {
        for line in lines {
            if !line.is_empty() {
                self.pad(col);
                self.out.push_str(line);
            }
            self.out.push('\n');
        }
    }

    fn line_comment(&mut self, comment: Option<&str>, col: usize) {
        let Some(comment) = comment else {
            self.out.push('\n');
            return;
        };
        let comment = as_comment(comment);
        let mut lines = comment.lines();
        if let Some(first) = lines.next() {
            self.out.push(' ');
            self.out.push_str(&paint(first, Color::Comment, self.colorize));
        }
        self.out.push('\n');
        for line in lines {
            self.pad(col);
            self.out.push_str(&paint(line, Color::Comment, self.colorize));
            self.out.push('\n');
        }
    }

    fn comment_block(&mut self, comment: &str, col: usize) {
        for line in as_comment(comment).lines() {
            self.pad(col);
            self.out.push_str(&paint(line, Color::Comment, self.colorize));
            self.out.push('\n');
        }
    }

    fn pad(&mut self, col: usize) {
        for _ in 0..col {
            self.out.push(' ');
        }
    }
}

fn tag_text(tag: &str) -> String {
    if tag.starts_with('!') {
        tag.to_string()
    } else {
        format!("!<{tag}>")
    }
}

fn literal(prefix: String, value: &str) -> ScalarOut {
    if !prefix.is_empty() {
        return ScalarOut::Inline(format!("{prefix}{}", double_quoted(value)));
    }
    let trailing = value.len() - value.trim_end_matches('\n').len();
    let (header, body) = match trailing {
        0 => ("|-", value),
        1 => ("|", &value[..value.len() - 1]),
        _ => ("|+", &value[..value.len() - 1]),
    };
    ScalarOut::Literal {
        header,
        lines: body.split('\n').map(str::to_string).collect(),
    }
}

/// Literal blocks cannot start with a space (the indentation would be ambiguous) or hold
/// carriage returns.
fn literal_safe(value: &str) -> bool {
    !value.starts_with(' ') && !value.starts_with('\n') && !value.contains('\r')
}

fn quoted_if_needed(value: &str, in_flow: bool) -> String {
    if is_plain_safe(value, in_flow) {
        value.to_string()
    } else {
        double_quoted(value)
    }
}

fn double_quoted(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Whether `value` can be written as a plain scalar without changing its text.
pub fn is_plain_safe(value: &str, in_flow: bool) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    if value.trim() != value || value.chars().any(|c| c.is_control()) {
        return false;
    }
    if value.starts_with("---") || value.starts_with("...") {
        return false;
    }
    if "-?:".contains(first) {
        match value.chars().nth(1) {
            Some(second) if !second.is_whitespace() => {}
            _ => return false,
        }
    } else if ",[]{}#&*!|>'\"%@`".contains(first) {
        return false;
    }
    if value.contains(": ") || value.contains(" #") || value.ends_with(':') {
        return false;
    }
    !(in_flow && value.contains([',', '[', ']', '{', '}']))
}
