//! Core data structures for the document node model.

use std::fmt;

/// Well-known tags. YAML short tags double as the format-agnostic type vocabulary.
pub mod tags {
    pub const STR: &str = "!!str";
    pub const INT: &str = "!!int";
    pub const FLOAT: &str = "!!float";
    pub const BOOL: &str = "!!bool";
    pub const NULL: &str = "!!null";
    pub const MAP: &str = "!!map";
    pub const SEQ: &str = "!!seq";
}

/// Index of a node inside its [`Tree`](super::Tree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
    Alias,
    Document,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Scalar => "scalar",
            NodeKind::Sequence => "sequence",
            NodeKind::Mapping => "mapping",
            NodeKind::Alias => "alias",
            NodeKind::Document => "document",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

/// Rendering hint. Advisory: codecs ignore what their target cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub scalar: ScalarStyle,
    pub flow: bool,
}

impl Style {
    pub fn flow() -> Self {
        Style {
            scalar: ScalarStyle::Plain,
            flow: true,
        }
    }

    pub fn scalar(scalar: ScalarStyle) -> Self {
        Style {
            scalar,
            flow: false,
        }
    }
}

/// Comment slots. Every line of a stored comment keeps its leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comments {
    pub head: Option<String>,
    pub line: Option<String>,
    pub foot: Option<String>,
}

impl Comments {
    pub fn is_empty(&self) -> bool {
        self.head.is_none() && self.line.is_none() && self.foot.is_none()
    }
}

/// One step of a [`NodePath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Structural position of a node, from the document root down.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(pub Vec<PathSegment>);

impl NodePath {
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, ".");
        }
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// A single node of the document tree.
///
/// Sequence items and the document content live in `children`; mapping
/// entries live in `entries` as (key, value) pairs in insertion order.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub tag: String,
    pub value: String,
    pub style: Style,
    pub comments: Comments,
    pub anchor: Option<String>,
    /// Target of an alias node.
    pub alias: Option<NodeId>,
    pub key: Option<PathSegment>,
    pub parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) entries: Vec<(NodeId, NodeId)>,
}

impl Node {
    fn blank(kind: NodeKind, tag: &str) -> Self {
        Node {
            kind,
            tag: tag.to_string(),
            value: String::new(),
            style: Style::default(),
            comments: Comments::default(),
            anchor: None,
            alias: None,
            key: None,
            parent: None,
            children: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn scalar(tag: impl Into<String>, value: impl Into<String>) -> Self {
        let mut node = Node::blank(NodeKind::Scalar, "");
        node.tag = tag.into();
        node.value = value.into();
        node
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::scalar(tags::STR, value)
    }

    pub fn null() -> Self {
        Node::scalar(tags::NULL, "null")
    }

    pub fn sequence() -> Self {
        Node::blank(NodeKind::Sequence, tags::SEQ)
    }

    pub fn mapping() -> Self {
        Node::blank(NodeKind::Mapping, tags::MAP)
    }

    pub fn document() -> Self {
        Node::blank(NodeKind::Document, "")
    }

    pub fn alias(name: impl Into<String>, target: NodeId) -> Self {
        let mut node = Node::blank(NodeKind::Alias, "");
        node.value = name.into();
        node.alias = Some(target);
        node
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_anchor(mut self, anchor: Option<String>) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn is_scalar(&self) -> bool {
        self.kind == NodeKind::Scalar
    }

    pub fn is_null(&self) -> bool {
        self.kind == NodeKind::Scalar && self.tag == tags::NULL
    }
}
