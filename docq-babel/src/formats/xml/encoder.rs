//! Node tree to XML
//!
//! Layout mirrors a classic indenting XML printer: a newline and indentation go before
//! every open tag except the very first, and before a close tag that follows child
//! elements. Head comments sit on the line of the tag they describe. Text and the
//! other comments are written inline.

use crate::error::FormatError;
use crate::format::{write_text, Encoder};
use crate::formats::common::{comment_lines, document_parts, join_comments};
use crate::preferences::XmlPreferences;
use crate::tree::{NodeId, NodeKind, Tree};
use quick_xml::escape::{escape, partial_escape};
use std::io::Write;

pub struct XmlEncoder {
    indent: usize,
    prefs: XmlPreferences,
}

impl XmlEncoder {
    pub fn new(indent: usize, prefs: XmlPreferences) -> Self {
        XmlEncoder { indent, prefs }
    }
}

impl Encoder for XmlEncoder {
    fn encode(
        &mut self,
        tree: &Tree,
        node: NodeId,
        sink: &mut dyn Write,
    ) -> Result<(), FormatError> {
        let mut writer = XmlWriter::new(tree, &self.prefs, self.indent);
        writer.document(node)?;
        write_text(sink, &writer.out)
    }
}

struct XmlWriter<'a> {
    tree: &'a Tree,
    prefs: &'a XmlPreferences,
    out: String,
    indent: String,
    depth: usize,
    put_newline: bool,
    indented_in: bool,
}

impl<'a> XmlWriter<'a> {
    fn new(tree: &'a Tree, prefs: &'a XmlPreferences, indent: usize) -> Self {
        XmlWriter {
            tree,
            prefs,
            out: String::new(),
            indent: " ".repeat(indent),
            depth: 0,
            put_newline: false,
            indented_in: false,
        }
    }

    fn document(&mut self, node: NodeId) -> Result<(), FormatError> {
        let tree = self.tree;
        let (doc_comments, content) = document_parts(tree, node);
        if let Some(head) = doc_comments.and_then(|c| c.head.as_deref()) {
            self.comment(head)?;
        }
        if let Some(content) = content {
            let content = tree.resolve(content);
            let root = tree.node(content);
            match root.kind {
                NodeKind::Mapping => {
                    self.comment_slot(root.comments.head.as_deref())?;
                    for (key, value) in tree.entries(content) {
                        self.entry(*key, *value)?;
                    }
                    let trailing = join_comments(
                        root.comments.line.as_deref(),
                        root.comments.foot.as_deref(),
                    );
                    self.comment_slot(trailing.as_deref())?;
                }
                NodeKind::Scalar => {
                    self.comment_slot(root.comments.head.as_deref())?;
                    self.out.push_str(&partial_escape(root.value.as_str()));
                    self.comment_slot(root.comments.line.as_deref())?;
                    self.comment_slot(root.comments.foot.as_deref())?;
                }
                NodeKind::Sequence => {
                    return Err(FormatError::UnsupportedShape(
                        "a top-level sequence has no XML representation".to_string(),
                    ))
                }
                NodeKind::Alias | NodeKind::Document => {
                    return Err(FormatError::UnsupportedShape(format!(
                        "cannot encode a nested {} as XML",
                        root.kind.as_str()
                    )))
                }
            }
        }
        if let Some(foot) = doc_comments.and_then(|c| c.foot.as_deref()) {
            self.comment(foot)?;
        }
        self.out.push('\n');
        Ok(())
    }

    fn key_name(&self, key: NodeId) -> Result<&'a str, FormatError> {
        let tree = self.tree;
        let node = tree.node(tree.resolve(key));
        if node.kind != NodeKind::Scalar {
            return Err(FormatError::UnsupportedShape(format!(
                "XML element names must be scalars, found a {}",
                node.kind.as_str()
            )));
        }
        Ok(node.value.as_str())
    }

    fn entry(&mut self, key: NodeId, value: NodeId) -> Result<(), FormatError> {
        let tree = self.tree;
        let name = self.key_name(key)?;
        let value = tree.resolve(value);
        let key_comments = &tree.node(key).comments;

        if tree.node(value).kind != NodeKind::Sequence {
            return self.element(name, Some(key), value, &[]);
        }
        // The sequence's own comments lead its first element.
        let seq_comments = &tree.node(value).comments;
        let lead: Vec<&str> = [
            key_comments.head.as_deref(),
            seq_comments.head.as_deref(),
            key_comments.line.as_deref(),
            seq_comments.line.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();
        let items = tree.items(value);
        if items.is_empty() {
            for comment in &lead {
                self.comment(comment)?;
            }
        }
        for (index, item) in items.iter().enumerate() {
            let lead: &[&str] = if index == 0 { &lead } else { &[] };
            self.element(name, None, tree.resolve(*item), lead)?;
        }
        let foot = join_comments(
            seq_comments.foot.as_deref(),
            key_comments.foot.as_deref(),
        );
        self.comment_slot(foot.as_deref())
    }

    fn element(
        &mut self,
        name: &str,
        key: Option<NodeId>,
        value: NodeId,
        lead: &[&str],
    ) -> Result<(), FormatError> {
        let tree = self.tree;
        let node = tree.node(value);
        let key_comments = key.map(|k| &tree.node(k).comments);

        let attributes = match node.kind {
            NodeKind::Mapping => self.attributes(value)?,
            _ => Vec::new(),
        };
        self.write_indent(1);
        for comment in lead {
            self.comment(comment)?;
        }
        let head = join_comments(
            key_comments.and_then(|c| c.head.as_deref()),
            node.comments.head.as_deref(),
        );
        self.comment_slot(head.as_deref())?;
        self.out.push('<');
        self.out.push_str(name);
        for (attr_name, attr_value) in attributes {
            self.out.push(' ');
            self.out.push_str(attr_name);
            self.out.push_str("=\"");
            self.out.push_str(&escape(attr_value));
            self.out.push('"');
        }
        self.out.push('>');

        let line = join_comments(
            key_comments.and_then(|c| c.line.as_deref()),
            node.comments.line.as_deref(),
        );
        self.comment_slot(line.as_deref())?;

        match node.kind {
            NodeKind::Scalar => self.out.push_str(&partial_escape(node.value.as_str())),
            NodeKind::Mapping => {
                for (child_key, child_value) in tree.entries(value) {
                    let child_name = self.key_name(*child_key)?;
                    if child_name == self.prefs.content_name {
                        let text = tree.node(tree.resolve(*child_value));
                        if text.kind != NodeKind::Scalar {
                            return Err(FormatError::UnsupportedShape(format!(
                                "'{child_name}' of <{name}> must be a scalar"
                            )));
                        }
                        self.out.push_str(&partial_escape(text.value.as_str()));
                    } else if !self.is_attribute(child_name) {
                        self.entry(*child_key, *child_value)?;
                    }
                }
            }
            NodeKind::Sequence => {
                return Err(FormatError::UnsupportedShape(format!(
                    "<{name}> holds a nested sequence, which XML cannot represent"
                )))
            }
            NodeKind::Alias | NodeKind::Document => {
                return Err(FormatError::UnsupportedShape(format!(
                    "cannot encode a {} inside <{name}>",
                    node.kind.as_str()
                )))
            }
        }

        self.write_indent(-1);
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');

        let foot = join_comments(
            node.comments.foot.as_deref(),
            key_comments.and_then(|c| c.foot.as_deref()),
        );
        self.comment_slot(foot.as_deref())
    }

    fn is_attribute(&self, name: &str) -> bool {
        name != self.prefs.content_name && name.starts_with(self.prefs.attribute_prefix.as_str())
    }

    fn attributes(&self, map: NodeId) -> Result<Vec<(&'a str, &'a str)>, FormatError> {
        let tree = self.tree;
        let mut attributes = Vec::new();
        for (key, value) in tree.entries(map) {
            let name = self.key_name(*key)?;
            if !self.is_attribute(name) {
                continue;
            }
            let value = tree.node(tree.resolve(*value));
            if value.kind != NodeKind::Scalar {
                return Err(FormatError::UnsupportedShape(format!(
                    "attribute '{name}' must be a scalar, found a {}",
                    value.kind.as_str()
                )));
            }
            let stripped = &name[self.prefs.attribute_prefix.len()..];
            attributes.push((stripped, value.value.as_str()));
        }
        Ok(attributes)
    }

    fn comment_slot(&mut self, comment: Option<&str>) -> Result<(), FormatError> {
        match comment {
            Some(comment) => self.comment(comment),
            None => Ok(()),
        }
    }

    fn comment(&mut self, comment: &str) -> Result<(), FormatError> {
        let text = comment_lines(comment).join("\n");
        if text.contains("--") {
            return Err(FormatError::UnsupportedShape(format!(
                "comment '{text}' contains '--', which XML comments cannot hold"
            )));
        }
        self.out.push_str("<!-- ");
        self.out.push_str(&text);
        self.out.push_str(" -->");
        Ok(())
    }

    fn write_indent(&mut self, depth_delta: i32) {
        if self.indent.is_empty() {
            return;
        }
        if depth_delta < 0 {
            self.depth = self.depth.saturating_sub(1);
            if self.indented_in {
                self.indented_in = false;
                return;
            }
            self.indented_in = false;
        }
        if self.put_newline {
            self.out.push('\n');
        } else {
            self.put_newline = true;
        }
        for _ in 0..self.depth {
            self.out.push_str(&self.indent);
        }
        if depth_delta > 0 {
            self.depth += 1;
            self.indented_in = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::encode_to_string;
    use crate::tree::Node;

    fn encode(tree: &Tree, node: NodeId, indent: usize) -> String {
        let mut encoder = XmlEncoder::new(indent, XmlPreferences::default());
        encode_to_string(&mut encoder, tree, node).unwrap()
    }

    #[test]
    fn repeated_elements_indent_under_parent() {
        let mut tree = Tree::new();
        let root = tree.add_mapping();
        let pets = tree.add_mapping();
        let cats = tree.add_sequence();
        let purrs = tree.add_string("purrs");
        let meows = tree.add_string("meows");
        tree.push_item(cats, purrs);
        tree.push_item(cats, meows);
        tree.push_string_entry(pets, "cat", cats);
        tree.push_string_entry(root, "pets", pets);

        assert_eq!(
            encode(&tree, root, 2),
            "<pets>\n  <cat>purrs</cat>\n  <cat>meows</cat>\n</pets>\n"
        );
        assert_eq!(
            encode(&tree, root, 0),
            "<pets><cat>purrs</cat><cat>meows</cat></pets>\n"
        );
    }

    #[test]
    fn prefixed_keys_become_attributes() {
        let mut tree = Tree::new();
        let root = tree.add_mapping();
        let cat = tree.add_mapping();
        let name = tree.add_string("tiger");
        let double = tree.add_string("x");
        let content = tree.add_string("cool");
        tree.push_string_entry(cat, "+name", name);
        tree.push_string_entry(cat, "++odd", double);
        tree.push_string_entry(cat, "+content", content);
        tree.push_string_entry(root, "cat", cat);

        assert_eq!(
            encode(&tree, root, 2),
            "<cat name=\"tiger\" +odd=\"x\">cool</cat>\n"
        );
    }

    #[test]
    fn bare_root_mapping_keeps_its_comments() {
        let mut tree = Tree::new();
        let root = tree.add_mapping();
        let three = tree.add_string("3");
        tree.push_string_entry(root, "cat", three);
        tree.node_mut(root).comments.head = Some("# before".to_string());
        tree.node_mut(root).comments.foot = Some("# after".to_string());

        assert_eq!(
            encode(&tree, root, 2),
            "<!-- before --><cat>3</cat><!-- after -->\n"
        );
    }

    #[test]
    fn top_level_sequence_is_rejected() {
        let mut tree = Tree::new();
        let seq = tree.add_sequence();
        let mut encoder = XmlEncoder::new(2, XmlPreferences::default());
        let err = encode_to_string(&mut encoder, &tree, seq).unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedShape(_)));
    }

    #[test]
    fn mapping_attribute_is_rejected() {
        let mut tree = Tree::new();
        let root = tree.add_mapping();
        let cat = tree.add_mapping();
        let nested = tree.add_mapping();
        tree.push_string_entry(cat, "+bad", nested);
        tree.push_string_entry(root, "cat", cat);
        let mut encoder = XmlEncoder::new(2, XmlPreferences::default());
        let err = encode_to_string(&mut encoder, &tree, root).unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedShape(_)));
    }

    #[test]
    fn text_is_escaped() {
        let mut tree = Tree::new();
        let root = tree.add_mapping();
        let value = tree.add_string("a < b & c");
        tree.push_string_entry(root, "expr", value);
        assert_eq!(encode(&tree, root, 2), "<expr>a &lt; b &amp; c</expr>\n");
    }

    #[test]
    fn comments_surround_the_tags() {
        let mut tree = Tree::new();
        let root = tree.add_mapping();
        let value = tree.add(Node::string("3"));
        tree.node_mut(value).comments.line = Some("# inline".to_string());
        let key = tree.push_string_entry(root, "cat", value);
        tree.node_mut(key).comments.head = Some("# before".to_string());
        tree.node_mut(key).comments.foot = Some("# after".to_string());

        assert_eq!(
            encode(&tree, root, 2),
            "<!-- before --><cat><!-- inline -->3</cat><!-- after -->\n"
        );
    }
}
