//! Document node model.
//!
//!     Every codec decodes into, and encodes from, the same tree representation. Nodes live in
//!     an arena ([`Tree`]) and reference each other by [`NodeId`]; the parent link is a plain
//!     index so a node never owns its parent. A tree may hold several documents (one Document
//!     root each) as well as nodes that are no longer attached to any parent, which is how the
//!     decode/encode operators keep original nodes around after replacing them.

pub mod nodes;

pub use nodes::{
    tags, Comments, Node, NodeId, NodeKind, NodePath, PathSegment, ScalarStyle, Style,
};

use std::collections::{HashMap, HashSet};

/// Alias chains longer than this are treated as broken.
const MAX_ALIAS_DEPTH: usize = 64;

/// Arena holding the nodes of one or more documents.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

/// What [`Tree::same_shape`] takes into account besides kinds, tags and values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareOptions {
    pub comments: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        CompareOptions { comments: true }
    }
}

impl Tree {
    pub fn new() -> Self {
        Tree { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Ids are only minted by the arena that owns them, so indexing is infallible.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn add_scalar(&mut self, tag: &str, value: impl Into<String>) -> NodeId {
        self.add(Node::scalar(tag, value))
    }

    pub fn add_string(&mut self, value: impl Into<String>) -> NodeId {
        self.add(Node::string(value))
    }

    pub fn add_mapping(&mut self) -> NodeId {
        self.add(Node::mapping())
    }

    pub fn add_sequence(&mut self) -> NodeId {
        self.add(Node::sequence())
    }

    pub fn add_document(&mut self, content: Option<NodeId>) -> NodeId {
        let doc = self.add(Node::document());
        if let Some(content) = content {
            self.set_content(doc, content);
        }
        doc
    }

    pub fn set_content(&mut self, doc: NodeId, content: NodeId) {
        {
            let child = self.node_mut(content);
            child.parent = Some(doc);
            child.key = None;
        }
        let doc_node = self.node_mut(doc);
        doc_node.children.clear();
        doc_node.children.push(content);
    }

    pub fn push_item(&mut self, seq: NodeId, item: NodeId) {
        let index = self.node(seq).children.len();
        {
            let child = self.node_mut(item);
            child.parent = Some(seq);
            child.key = Some(PathSegment::Index(index));
        }
        self.node_mut(seq).children.push(item);
    }

    pub fn push_entry(&mut self, map: NodeId, key: NodeId, value: NodeId) {
        let segment = PathSegment::Key(self.node(key).value.clone());
        self.node_mut(key).parent = Some(map);
        {
            let child = self.node_mut(value);
            child.parent = Some(map);
            child.key = Some(segment);
        }
        self.node_mut(map).entries.push((key, value));
    }

    /// Append an entry with a fresh `!!str` key; returns the key node.
    pub fn push_string_entry(&mut self, map: NodeId, key: &str, value: NodeId) -> NodeId {
        let key_id = self.add_string(key);
        self.push_entry(map, key_id, value);
        key_id
    }

    pub fn items(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn entries(&self, id: NodeId) -> &[(NodeId, NodeId)] {
        &self.node(id).entries
    }

    /// The content root of a Document node, or the node itself for anything else.
    pub fn content(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        if node.kind == NodeKind::Document {
            node.children.first().copied()
        } else {
            Some(id)
        }
    }

    /// First value stored under a scalar key equal to `key`.
    pub fn get(&self, map: NodeId, key: &str) -> Option<NodeId> {
        self.entries(map)
            .iter()
            .find(|(k, _)| self.node(*k).value == key)
            .map(|(_, v)| *v)
    }

    /// Follow alias links to the anchored node.
    pub fn resolve(&self, id: NodeId) -> NodeId {
        let mut current = id;
        for _ in 0..MAX_ALIAS_DEPTH {
            match self.node(current).alias {
                Some(target) if self.node(current).kind == NodeKind::Alias => current = target,
                _ => return current,
            }
        }
        current
    }

    /// Structural path of a node, built from the `key` fragments of its ancestors.
    pub fn path(&self, id: NodeId) -> NodePath {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if let Some(segment) = &node.key {
                segments.push(segment.clone());
            }
            current = node.parent;
        }
        segments.reverse();
        NodePath(segments)
    }

    /// Deep-copy the subtree at `id` of `source` into this arena.
    ///
    /// The copy is detached (no parent). Alias targets inside the subtree are remapped to
    /// their copies; targets outside it are copied along.
    pub fn graft(&mut self, source: &Tree, id: NodeId) -> NodeId {
        let mut mapping = HashMap::new();
        let root = self.copy_from(source, id, &mut mapping);
        self.node_mut(root).parent = None;

        let mut remapped = HashSet::new();
        loop {
            let pending: Vec<NodeId> = mapping
                .values()
                .copied()
                .filter(|copied| !remapped.contains(copied))
                .collect();
            if pending.is_empty() {
                break;
            }
            for copied in pending {
                remapped.insert(copied);
                let Some(old_target) = self.node(copied).alias else {
                    continue;
                };
                let already_copied = mapping.contains_key(&old_target);
                let new_target = self.copy_from(source, old_target, &mut mapping);
                if !already_copied {
                    self.node_mut(new_target).parent = None;
                }
                self.node_mut(copied).alias = Some(new_target);
            }
        }
        root
    }

    fn copy_from(
        &mut self,
        source: &Tree,
        id: NodeId,
        mapping: &mut HashMap<NodeId, NodeId>,
    ) -> NodeId {
        if let Some(existing) = mapping.get(&id) {
            return *existing;
        }
        let original = source.node(id);
        let mut copy = original.clone();
        copy.children.clear();
        copy.entries.clear();
        let new_id = self.add(copy);
        mapping.insert(id, new_id);

        for child in &original.children {
            let child_copy = self.copy_from(source, *child, mapping);
            self.node_mut(child_copy).parent = Some(new_id);
            self.node_mut(new_id).children.push(child_copy);
        }
        for (key, value) in &original.entries {
            let key_copy = self.copy_from(source, *key, mapping);
            let value_copy = self.copy_from(source, *value, mapping);
            self.node_mut(key_copy).parent = Some(new_id);
            self.node_mut(value_copy).parent = Some(new_id);
            self.node_mut(new_id).entries.push((key_copy, value_copy));
        }
        new_id
    }

    /// Add `node` as a stand-in for `original`: same parent and key, original untouched.
    pub fn replacement(&mut self, original: NodeId, mut node: Node) -> NodeId {
        node.parent = self.node(original).parent;
        node.key = self.node(original).key.clone();
        self.add(node)
    }

    /// Structural equality of two subtrees, ignoring `key`, `parent` and `style`.
    pub fn same_shape(&self, a: NodeId, other: &Tree, b: NodeId, compare: CompareOptions) -> bool {
        let left = self.node(a);
        let right = other.node(b);
        if left.kind != right.kind || left.tag != right.tag || left.value != right.value {
            return false;
        }
        if compare.comments && left.comments != right.comments {
            return false;
        }
        if left.children.len() != right.children.len()
            || left.entries.len() != right.entries.len()
        {
            return false;
        }
        let children_match = left
            .children
            .iter()
            .zip(&right.children)
            .all(|(x, y)| self.same_shape(*x, other, *y, compare));
        children_match
            && left.entries.iter().zip(&right.entries).all(|((lk, lv), (rk, rv))| {
                self.same_shape(*lk, other, *rk, compare)
                    && self.same_shape(*lv, other, *rv, compare)
            })
    }

    /// Render a subtree as an indented outline, for inspection and debugging.
    ///
    /// ```text
    /// ⧉ document
    /// └─ {} mapping !!map
    ///    └─ ⚷ cat  [head: # before]
    ///       └─ ◦ scalar !!str "3"
    /// ```
    pub fn dump(&self, id: NodeId) -> String {
        let mut output = String::new();
        output.push_str(&self.label(id));
        output.push('\n');
        self.dump_children(id, "", &mut output);
        output
    }

    fn dump_children(&self, id: NodeId, prefix: &str, output: &mut String) {
        let node = self.node(id);
        let count = node.children.len() + node.entries.len();
        let mut index = 0;
        for child in &node.children {
            self.dump_line(*child, prefix, index + 1 == count, output);
            index += 1;
        }
        for (key, value) in &node.entries {
            let is_last = index + 1 == count;
            let connector = if is_last { "└─" } else { "├─" };
            output.push_str(&format!(
                "{prefix}{connector} ⚷ {}{}\n",
                self.node(*key).value,
                comment_suffix(&self.node(*key).comments)
            ));
            let nested = format!("{prefix}{}", if is_last { "   " } else { "│  " });
            self.dump_line(*value, &nested, true, output);
            index += 1;
        }
    }

    fn dump_line(&self, id: NodeId, prefix: &str, is_last: bool, output: &mut String) {
        let connector = if is_last { "└─" } else { "├─" };
        output.push_str(&format!("{prefix}{connector} {}\n", self.label(id)));
        let nested = format!("{prefix}{}", if is_last { "   " } else { "│  " });
        self.dump_children(id, &nested, output);
    }

    fn label(&self, id: NodeId) -> String {
        let node = self.node(id);
        let icon = match node.kind {
            NodeKind::Document => "⧉",
            NodeKind::Mapping => "{}",
            NodeKind::Sequence => "[]",
            NodeKind::Scalar => "◦",
            NodeKind::Alias => "*",
        };
        let mut label = format!("{icon} {}", node.kind.as_str());
        if !node.tag.is_empty() {
            label.push(' ');
            label.push_str(&node.tag);
        }
        if let Some(anchor) = &node.anchor {
            label.push_str(&format!(" &{anchor}"));
        }
        match node.kind {
            NodeKind::Scalar => label.push_str(&format!(" {:?}", node.value)),
            NodeKind::Alias => label.push_str(&format!(" *{}", node.value)),
            _ => {}
        }
        label.push_str(&comment_suffix(&node.comments));
        label
    }
}

fn comment_suffix(comments: &Comments) -> String {
    let mut parts = Vec::new();
    if let Some(head) = &comments.head {
        parts.push(format!("head: {}", head.replace('\n', "⏎")));
    }
    if let Some(line) = &comments.line {
        parts.push(format!("line: {}", line.replace('\n', "⏎")));
    }
    if let Some(foot) = &comments.foot {
        parts.push(format!("foot: {}", foot.replace('\n', "⏎")));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("  [{}]", parts.join(", "))
    }
}
