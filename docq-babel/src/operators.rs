//! Decode and encode pipeline operators
//!
//!     Operators take the currently selected nodes (a [`MatchContext`]) and return a new
//!     context holding replacement nodes. Nothing selected is mutated: a replacement is a new
//!     node in the pipeline's arena that borrows the original's parent and key, so paths stay
//!     stable across a decode/encode pair.
//!
//!     Decoding records the original string node under its path. Encoding consults that record
//!     so `"cat: 3"` decoded and re-encoded comes back without the newline the encoder adds,
//!     while `"cat: 3\n"` keeps it.

use crate::error::FormatError;
use crate::format::encode_to_string;
use crate::preferences::{DecoderPreferences, EncoderPreferences, Preferences};
use crate::registry::FormatRegistry;
use crate::tree::{Node, NodeId, NodeKind, NodePath, Tree};
use std::collections::HashMap;

/// Selected nodes plus the variables visible to the operators that follow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchContext {
    pub nodes: Vec<NodeId>,
    pub variables: HashMap<String, Vec<NodeId>>,
}

impl MatchContext {
    pub fn new(nodes: Vec<NodeId>) -> Self {
        MatchContext {
            nodes,
            variables: HashMap::new(),
        }
    }

    /// A context selecting `nodes` that keeps this context's variables.
    pub fn child(&self, nodes: Vec<NodeId>) -> MatchContext {
        MatchContext {
            nodes,
            variables: self.variables.clone(),
        }
    }

    pub fn set_variable(&mut self, name: impl Into<String>, nodes: Vec<NodeId>) {
        self.variables.insert(name.into(), nodes);
    }

    pub fn variable(&self, name: &str) -> Option<&[NodeId]> {
        self.variables.get(name).map(Vec::as_slice)
    }
}

/// State of one pipeline run: the node arena and the originals of decoded nodes.
pub struct Pipeline<'r> {
    registry: &'r FormatRegistry,
    prefs: Preferences,
    tree: Tree,
    stash: HashMap<NodePath, NodeId>,
}

impl<'r> Pipeline<'r> {
    pub fn new(registry: &'r FormatRegistry, prefs: Preferences, tree: Tree) -> Self {
        Pipeline {
            registry,
            prefs,
            tree,
            stash: HashMap::new(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// The string node a node at `path` was decoded from, if any.
    pub fn original(&self, path: &NodePath) -> Option<NodeId> {
        self.stash.get(path).copied()
    }

    /// Run operators in order, feeding each the previous one's result.
    pub fn run(
        &mut self,
        operators: &[&dyn Operator],
        context: MatchContext,
    ) -> Result<MatchContext, FormatError> {
        operators
            .iter()
            .try_fold(context, |context, operator| operator.apply(self, context))
    }
}

pub trait Operator {
    fn apply(
        &self,
        pipeline: &mut Pipeline<'_>,
        context: MatchContext,
    ) -> Result<MatchContext, FormatError>;
}

/// Parses each selected string with one format and selects the results.
pub struct DecodeOperator {
    prefs: DecoderPreferences,
}

impl DecodeOperator {
    pub fn new(prefs: DecoderPreferences) -> Self {
        DecodeOperator { prefs }
    }

    fn decode_one(
        &self,
        pipeline: &mut Pipeline<'_>,
        node: NodeId,
    ) -> Result<NodeId, FormatError> {
        let registry = pipeline.registry;
        let format = registry.get(&self.prefs.format)?;
        let original = pipeline.tree.node(node);
        if original.kind != NodeKind::Scalar {
            return Err(FormatError::UnsupportedShape(format!(
                "can only decode strings, found a {}",
                original.kind.as_str()
            )));
        }
        let text = original.value.clone();
        let path = pipeline.tree.path(node);
        tracing::debug!(format = format.name(), path = %path, "decoding node");
        pipeline.stash.insert(path, node);

        let mut decoder = format.decoder(&pipeline.prefs)?;
        decoder.init(&mut text.as_bytes())?;
        let Some(document) = decoder.decode_next()? else {
            return Ok(pipeline.tree.replacement(node, Node::null()));
        };

        let doc_comments = document.tree.node(document.root).comments.clone();
        let decoded = match document.content() {
            Some(content) => pipeline.tree.graft(&document.tree, content),
            None => pipeline.tree.add(Node::null()),
        };
        let (parent, key) = {
            let original = pipeline.tree.node(node);
            (original.parent, original.key.clone())
        };
        let root = pipeline.tree.node_mut(decoded);
        if root.comments.head.is_none() {
            root.comments.head = doc_comments.head;
        }
        if root.comments.foot.is_none() {
            root.comments.foot = doc_comments.foot;
        }
        root.parent = parent;
        root.key = key;
        Ok(decoded)
    }
}

impl Operator for DecodeOperator {
    fn apply(
        &self,
        pipeline: &mut Pipeline<'_>,
        context: MatchContext,
    ) -> Result<MatchContext, FormatError> {
        pipeline.registry.get(&self.prefs.format)?;
        let mut results = Vec::with_capacity(context.nodes.len());
        for &node in &context.nodes {
            results.push(self.decode_one(pipeline, node)?);
        }
        Ok(context.child(results))
    }
}

/// Serializes each selected node with one format and selects the resulting strings.
pub struct EncodeOperator {
    prefs: EncoderPreferences,
}

impl EncodeOperator {
    pub fn new(prefs: EncoderPreferences) -> Self {
        EncodeOperator { prefs }
    }

    /// Formats whose output is always a single line, so any trailing newline goes.
    fn always_single_line(&self, format: &str) -> bool {
        matches!(format, "csv" | "tsv") || (format == "json" && self.prefs.indent == 0)
    }
}

impl Operator for EncodeOperator {
    fn apply(
        &self,
        pipeline: &mut Pipeline<'_>,
        context: MatchContext,
    ) -> Result<MatchContext, FormatError> {
        let registry = pipeline.registry;
        let format = registry.get(&self.prefs.format)?;
        let mut results = Vec::with_capacity(context.nodes.len());
        for &node in &context.nodes {
            let mut encoder = format.encoder(&self.prefs, &pipeline.prefs)?;
            let mut text = encode_to_string(encoder.as_mut(), &pipeline.tree, node)?;

            if ends_with_single_newline(&text) {
                let path = pipeline.tree.path(node);
                if let Some(original) = pipeline.original(&path) {
                    if !pipeline.tree.node(original).value.ends_with('\n') {
                        tracing::trace!(path = %path, "original had no trailing newline");
                        chomp(&mut text);
                    }
                }
            }
            if self.always_single_line(format.name()) {
                chomp(&mut text);
            }

            tracing::debug!(format = format.name(), bytes = text.len(), "encoded node");
            results.push(pipeline.tree.replacement(node, Node::string(text)));
        }
        Ok(context.child(results))
    }
}

/// True when `text` ends in one newline that closes a non-empty last line.
fn ends_with_single_newline(text: &str) -> bool {
    text.strip_suffix('\n')
        .and_then(|rest| rest.chars().last())
        .is_some_and(|c| c != '\n')
}

fn chomp(text: &mut String) {
    let kept = text.trim_end_matches('\n').len();
    text.truncate(kept);
}
