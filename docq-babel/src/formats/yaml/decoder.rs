//! YAML to node tree
//!
//! Driven by the yaml-rust2 event parser. The parser reports anchors by numeric id only
//! and drops comments, so both are recovered from the source text around each event.
//!
//! A full-line comment becomes the head of the next scalar, a trailing comment the line
//! comment of the node before it, and comments after the last node the foot of the
//! document.

use crate::error::FormatError;
use crate::format::{read_source, DecodedDocument, Decoder};
use crate::formats::common::resolve_plain;
use crate::tree::{tags, Node, NodeId, NodeKind, ScalarStyle, Style, Tree};
use std::collections::{HashMap, VecDeque};
use std::mem;
use std::io::Read;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

const FORMAT: &str = "yaml";

#[derive(Default)]
pub struct YamlDecoder {
    documents: VecDeque<DecodedDocument>,
    error: Option<FormatError>,
}

impl YamlDecoder {
    pub fn new() -> Self {
        YamlDecoder::default()
    }
}

impl Decoder for YamlDecoder {
    fn init(&mut self, source: &mut dyn Read) -> Result<(), FormatError> {
        let text = read_source(source)?;
        let mut builder = DocumentBuilder::new(&text);
        let mut parser = Parser::new_from_str(&text);
        let loaded = parser.load(&mut builder, true);

        let source = builder.source;
        self.documents = builder.documents.into();
        self.error = builder.error;
        if let Err(err) = loaded {
            let offset = source.byte_offset(err.marker().index());
            self.error = Some(FormatError::syntax(FORMAT, offset, err.info()));
        }
        tracing::trace!(documents = self.documents.len(), "parsed yaml stream");
        Ok(())
    }

    fn decode_next(&mut self) -> Result<Option<DecodedDocument>, FormatError> {
        if let Some(document) = self.documents.pop_front() {
            return Ok(Some(document));
        }
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

/// Source text with the lookups the builder needs. yaml-rust2 markers count characters.
struct Source<'s> {
    text: &'s str,
    chars: Vec<(usize, char)>,
    anchors: Vec<(usize, String)>,
    used: Vec<bool>,
    comments: VecDeque<SourceComment>,
}

impl<'s> Source<'s> {
    fn new(text: &'s str) -> Self {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let Scan { anchors, comments } = scan(&chars);
        let used = vec![false; anchors.len()];
        Source {
            text,
            chars,
            anchors,
            used,
            comments: comments.into(),
        }
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.chars
            .get(char_index)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.text.len())
    }

    fn char_at(&self, char_index: usize) -> Option<char> {
        self.chars.get(char_index).map(|(_, c)| *c)
    }

    /// The closest unused `&name` before the event position.
    fn anchor_before(&mut self, char_index: usize) -> Option<String> {
        let position = self
            .anchors
            .iter()
            .enumerate()
            .rev()
            .find(|(i, (at, _))| *at < char_index && !self.used[*i])
            .map(|(i, _)| i)?;
        self.used[position] = true;
        Some(self.anchors[position].1.clone())
    }

    /// The name following the `*` at `char_index`.
    fn alias_at(&self, char_index: usize) -> String {
        self.chars
            .iter()
            .skip(char_index + 1)
            .map(|(_, c)| *c)
            .take_while(|c| !is_name_end(*c))
            .collect()
    }

    /// Whether the collection starting at `char_index` is written in flow style.
    fn is_flow(&self, char_index: usize) -> bool {
        matches!(self.char_at(char_index), Some('[') | Some('{'))
    }

    /// Take the comments that start before `char_index`.
    fn comments_before(&mut self, char_index: usize) -> Vec<SourceComment> {
        let mut taken = Vec::new();
        while let Some(comment) = self.comments.pop_front() {
            if comment.at >= char_index {
                self.comments.push_front(comment);
                break;
            }
            taken.push(comment);
        }
        taken
    }
}

/// A `#` comment and the character index it starts at.
#[derive(Debug)]
struct SourceComment {
    at: usize,
    text: String,
    /// Something precedes the comment on its line.
    trailing: bool,
}

#[derive(Default)]
struct Scan {
    anchors: Vec<(usize, String)>,
    comments: Vec<SourceComment>,
}

fn is_name_end(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '[' | ']' | '{' | '}')
}

/// Positions of `&anchor` tokens and `#` comments, skipping quoted text and the
/// content of block scalars.
fn scan(chars: &[(usize, char)]) -> Scan {
    let mut scan = Scan::default();
    let mut quote: Option<char> = None;
    let mut block_indent: Option<usize> = None;
    let mut line_has_content = false;
    let mut previous = '\n';
    let mut index = 0;
    while index < chars.len() {
        let c = chars[index].1;
        if let Some(q) = quote {
            if c == '\\' && q == '"' {
                index += 1;
            } else if c == q {
                quote = None;
            }
        } else if c == '\n' {
            line_has_content = false;
            if let Some(indent) = block_indent.take() {
                index = skip_block_lines(chars, index + 1, indent);
                previous = '\n';
                continue;
            }
        } else if c == '#' && previous.is_whitespace() {
            let end = chars[index..]
                .iter()
                .position(|(_, c)| *c == '\n')
                .map_or(chars.len(), |n| index + n);
            let text: String = chars[index..end].iter().map(|(_, c)| *c).collect();
            scan.comments.push(SourceComment {
                at: index,
                text: text.trim_end().to_string(),
                trailing: line_has_content,
            });
            index = end;
            continue;
        } else {
            let at_token = previous.is_whitespace() || matches!(previous, '[' | '{' | ',');
            match c {
                '\'' | '"' if at_token || previous == ':' => quote = Some(c),
                '&' if at_token => {
                    let name: String = chars[index + 1..]
                        .iter()
                        .map(|(_, c)| *c)
                        .take_while(|c| !is_name_end(*c))
                        .collect();
                    if !name.is_empty() {
                        scan.anchors.push((index, name));
                    }
                }
                '|' | '>' if at_token && is_block_header(&chars[index + 1..]) => {
                    block_indent = Some(line_indent(chars, index));
                }
                _ => {}
            }
            if !c.is_whitespace() {
                line_has_content = true;
            }
        }
        previous = c;
        index += 1;
    }
    scan
}

/// Whether the text after a `|` or `>` is a block scalar header: indicators, then
/// nothing but an optional comment.
fn is_block_header(rest: &[(usize, char)]) -> bool {
    let mut rest = rest
        .iter()
        .map(|(_, c)| *c)
        .skip_while(|c| matches!(c, '-' | '+' | '0'..='9'))
        .peekable();
    if !matches!(rest.peek(), None | Some(' ' | '\t' | '\r' | '\n')) {
        return false;
    }
    matches!(
        rest.find(|c| !matches!(c, ' ' | '\t')),
        None | Some('\r' | '\n' | '#')
    )
}

/// Leading spaces of the line holding `index`.
fn line_indent(chars: &[(usize, char)], index: usize) -> usize {
    let start = chars[..index]
        .iter()
        .rposition(|(_, c)| *c == '\n')
        .map_or(0, |n| n + 1);
    chars[start..].iter().take_while(|(_, c)| *c == ' ').count()
}

/// Index of the first line from `start` that is neither blank nor indented past `indent`.
fn skip_block_lines(chars: &[(usize, char)], mut start: usize, indent: usize) -> usize {
    while start < chars.len() {
        let line = &chars[start..];
        let spaces = line.iter().take_while(|(_, c)| *c == ' ').count();
        let blank = line
            .get(spaces)
            .map_or(true, |(_, c)| matches!(c, '\r' | '\n'));
        if !blank && spaces <= indent {
            break;
        }
        match line.iter().position(|(_, c)| *c == '\n') {
            Some(n) => start += n + 1,
            None => return chars.len(),
        }
    }
    start
}

fn tag_name(tag: &Tag) -> String {
    match tag.handle.as_str() {
        "!!" | "tag:yaml.org,2002:" => format!("!!{}", tag.suffix),
        "!" if tag.suffix.is_empty() => tags::STR.to_string(),
        handle => format!("{handle}{}", tag.suffix),
    }
}

fn scalar_style(style: TScalarStyle) -> ScalarStyle {
    match style {
        TScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
        TScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        TScalarStyle::Literal => ScalarStyle::Literal,
        TScalarStyle::Folded => ScalarStyle::Folded,
        _ => ScalarStyle::Plain,
    }
}

enum Frame {
    Sequence(NodeId),
    Mapping { id: NodeId, key: Option<NodeId> },
}

impl Frame {
    fn id(&self) -> NodeId {
        match self {
            Frame::Sequence(id) => *id,
            Frame::Mapping { id, .. } => *id,
        }
    }
}

struct DocumentBuilder<'s> {
    source: Source<'s>,
    documents: Vec<DecodedDocument>,
    current: Option<DecodedDocument>,
    stack: Vec<Frame>,
    anchors: HashMap<usize, NodeId>,
    error: Option<FormatError>,
    /// Full-line comments waiting for the next scalar.
    pending_head: Vec<String>,
    /// A trailing comment waiting for the node it describes.
    pending_line: Option<String>,
    last: Option<NodeId>,
}

impl<'s> DocumentBuilder<'s> {
    fn new(text: &'s str) -> Self {
        DocumentBuilder {
            source: Source::new(text),
            documents: Vec::new(),
            current: None,
            stack: Vec::new(),
            anchors: HashMap::new(),
            error: None,
            pending_head: Vec::new(),
            pending_line: None,
            last: None,
        }
    }

    fn fail(&mut self, marker: &Marker, message: impl Into<String>) {
        if self.error.is_none() {
            let offset = self.source.byte_offset(marker.index());
            self.error = Some(FormatError::syntax(FORMAT, offset, message));
        }
    }

    fn add(&mut self, mut node: Node, anchor_id: usize, marker: &Marker) -> Option<NodeId> {
        let anchor = if anchor_id > 0 {
            self.source.anchor_before(marker.index())
        } else {
            None
        };
        self.gather_comments(marker.index());
        // Heads wait for the first scalar inside a collection.
        let is_collection = matches!(node.kind, NodeKind::Mapping | NodeKind::Sequence);
        if !is_collection && !self.pending_head.is_empty() {
            node.comments.head = Some(mem::take(&mut self.pending_head).join("\n"));
        }
        node.comments.line = self.pending_line.take();

        let document = self.current.as_mut()?;
        let id = document.tree.add(node.with_anchor(anchor));
        if anchor_id > 0 {
            self.anchors.insert(anchor_id, id);
        }
        self.attach(id);
        self.last = Some(id);
        Some(id)
    }

    /// Sort the comments before `char_index` into the pending slots.
    fn gather_comments(&mut self, char_index: usize) {
        for comment in self.source.comments_before(char_index) {
            if !comment.trailing {
                self.pending_head.push(comment.text);
                continue;
            }
            // After `key:` or an opening `-`, the comment belongs to what follows.
            let opens_next = match self.stack.last() {
                Some(Frame::Mapping { key: Some(key), .. }) => self.last == Some(*key),
                Some(frame) => self.last == Some(frame.id()),
                None => false,
            };
            match (self.last, self.current.as_mut()) {
                (Some(last), Some(document)) if !opens_next => {
                    let line = &mut document.tree.node_mut(last).comments.line;
                    push_comment(line, comment.text);
                }
                (Some(_), _) => push_comment(&mut self.pending_line, comment.text),
                (None, _) => self.pending_head.push(comment.text),
            }
        }
    }

    /// Close the current document, giving it the comments that follow its content.
    fn finish_document(&mut self, char_index: usize) {
        self.gather_comments(char_index);
        let Some(mut document) = self.current.take() else {
            return;
        };
        let mut foot = mem::take(&mut self.pending_head);
        foot.extend(self.pending_line.take());
        if !foot.is_empty() {
            let slot = &mut document.tree.node_mut(document.root).comments.foot;
            push_comment(slot, foot.join("\n"));
        }
        self.documents.push(document);
    }

    /// Comments left after the last document end up in its foot.
    fn finish_stream(&mut self) {
        let rest: Vec<String> = self
            .source
            .comments_before(usize::MAX)
            .into_iter()
            .map(|comment| comment.text)
            .collect();
        if rest.is_empty() {
            return;
        }
        if let Some(document) = self.documents.last_mut() {
            let slot = &mut document.tree.node_mut(document.root).comments.foot;
            push_comment(slot, rest.join("\n"));
        }
    }

    fn attach(&mut self, id: NodeId) {
        let Some(document) = self.current.as_mut() else {
            return;
        };
        match self.stack.last_mut() {
            None => document.tree.set_content(document.root, id),
            Some(Frame::Sequence(seq)) => document.tree.push_item(*seq, id),
            Some(Frame::Mapping { id: map, key }) => match key.take() {
                None => *key = Some(id),
                Some(key_id) => document.tree.push_entry(*map, key_id, id),
            },
        }
    }

    fn scalar(
        &mut self,
        value: String,
        style: TScalarStyle,
        tag: Option<Tag>,
        marker: &Marker,
    ) -> Node {
        let style = scalar_style(style);
        let mut value = value;
        let tag = match (&tag, style) {
            (Some(tag), _) => tag_name(tag),
            (None, ScalarStyle::Plain) => {
                // Missing values are reported as `~`; keep them empty.
                if value == "~" && self.source.char_at(marker.index()) != Some('~') {
                    value.clear();
                }
                resolve_plain(&value).to_string()
            }
            (None, _) => tags::STR.to_string(),
        };
        Node::scalar(tag, value).with_style(Style::scalar(style))
    }

    fn collection(
        &mut self,
        mut node: Node,
        tag: Option<Tag>,
        anchor_id: usize,
        marker: &Marker,
    ) {
        if let Some(tag) = tag {
            node.tag = tag_name(&tag);
        }
        if self.source.is_flow(marker.index()) {
            node.style = Style::flow();
        }
        let kind = node.kind;
        if let Some(id) = self.add(node, anchor_id, marker) {
            self.stack.push(match kind {
                NodeKind::Sequence => Frame::Sequence(id),
                _ => Frame::Mapping { id, key: None },
            });
        }
    }

    fn alias(&mut self, anchor_id: usize, marker: &Marker) {
        let Some(target) = self.anchors.get(&anchor_id).copied() else {
            self.fail(marker, "alias refers to an unknown anchor");
            return;
        };
        if self.stack.iter().any(|frame| frame.id() == target) {
            self.fail(marker, "alias refers to one of its own ancestors");
            return;
        }
        let name = self.source.alias_at(marker.index());
        self.add(Node::alias(name, target), 0, marker);
    }
}

impl<'s> MarkedEventReceiver for DocumentBuilder<'s> {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        match ev {
            Event::Nothing | Event::StreamStart => {}
            Event::StreamEnd => self.finish_stream(),
            Event::DocumentStart => {
                let mut tree = Tree::new();
                let root = tree.add_document(None);
                self.current = Some(DecodedDocument { tree, root });
                self.stack.clear();
                self.anchors.clear();
                self.last = None;
            }
            Event::DocumentEnd => self.finish_document(marker.index()),
            Event::Scalar(value, style, anchor_id, tag) => {
                let node = self.scalar(value, style, tag, &marker);
                self.add(node, anchor_id, &marker);
            }
            Event::SequenceStart(anchor_id, tag) => {
                self.collection(Node::sequence(), tag, anchor_id, &marker);
            }
            Event::MappingStart(anchor_id, tag) => {
                self.collection(Node::mapping(), tag, anchor_id, &marker);
            }
            Event::SequenceEnd | Event::MappingEnd => {
                self.stack.pop();
            }
            Event::Alias(anchor_id) => self.alias(anchor_id, &marker),
        }
    }
}

fn push_comment(slot: &mut Option<String>, comment: String) {
    *slot = Some(match slot.take() {
        Some(existing) => format!("{existing}\n{comment}"),
        None => comment,
    });
}
