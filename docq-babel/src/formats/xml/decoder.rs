//! XML to node tree
//!
//! Decoding happens in two passes. The first pass reads quick-xml events into a light
//! element tree and settles every comment onto an element (or the document). The second
//! pass turns that element tree into nodes, deciding between scalars and mappings and
//! folding consecutive same-named siblings into sequences.

use crate::error::FormatError;
use crate::format::{read_source, DecodedDocument, Decoder};
use crate::formats::common::comment_from_texts;
use crate::preferences::XmlPreferences;
use crate::tree::{NodeId, Tree};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::Read;

const FORMAT: &str = "xml";

pub struct XmlDecoder {
    prefs: XmlPreferences,
    source: Option<String>,
    finished: bool,
}

impl XmlDecoder {
    pub fn new(prefs: XmlPreferences) -> Self {
        XmlDecoder {
            prefs,
            source: None,
            finished: false,
        }
    }
}

impl Decoder for XmlDecoder {
    fn init(&mut self, source: &mut dyn Read) -> Result<(), FormatError> {
        self.source = Some(read_source(source)?);
        self.finished = false;
        Ok(())
    }

    fn decode_next(&mut self) -> Result<Option<DecodedDocument>, FormatError> {
        if self.finished {
            return Ok(None);
        }
        self.finished = true;
        let Some(source) = self.source.take() else {
            return Ok(None);
        };

        let parsed = ElementReader::new(&source).read()?;
        if parsed.elements.is_empty() && parsed.head.is_empty() && parsed.foot.is_empty() {
            tracing::trace!("xml input holds no elements");
            return Ok(None);
        }
        Ok(Some(NodeBuilder::new(&self.prefs).document(parsed)))
    }
}

/// An element with its comments already settled.
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Vec<String>,
    children: Vec<Element>,
    head: Vec<String>,
    line: Vec<String>,
    foot: Vec<String>,
}

#[derive(Debug, Default)]
struct ParsedXml {
    elements: Vec<Element>,
    head: Vec<String>,
    foot: Vec<String>,
}

/// What came last at the current nesting level, for deciding where a comment belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Nothing,
    ClosedChild,
    Text,
}

struct Frame {
    element: Element,
    last: Last,
    pending: Vec<String>,
}

struct ElementReader<'a> {
    reader: Reader<&'a [u8]>,
    stack: Vec<Frame>,
    top: Vec<Element>,
    top_last: Last,
    top_pending: Vec<String>,
}

impl<'a> ElementReader<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        ElementReader {
            reader,
            stack: Vec::new(),
            top: Vec::new(),
            top_last: Last::Nothing,
            top_pending: Vec::new(),
        }
    }

    fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    fn read(mut self) -> Result<ParsedXml, FormatError> {
        loop {
            let event_start = self.position();
            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    let element = self.open(&e, event_start)?;
                    self.stack.push(Frame {
                        element,
                        last: Last::Nothing,
                        pending: Vec::new(),
                    });
                }
                Ok(Event::Empty(e)) => {
                    let element = self.open(&e, event_start)?;
                    self.close(element);
                }
                Ok(Event::End(_)) => {
                    let Some(mut frame) = self.stack.pop() else {
                        return Err(FormatError::syntax(
                            FORMAT,
                            event_start,
                            "closing tag without an open element",
                        ));
                    };
                    // Comments still pending at the close tag sit inside the element.
                    frame.element.line.append(&mut frame.pending);
                    self.close(frame.element);
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(|err| {
                        FormatError::syntax(FORMAT, event_start, format!("invalid text: {err}"))
                    })?;
                    self.text(text.trim(), event_start)?;
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).to_string();
                    self.text(text.trim(), event_start)?;
                }
                Ok(Event::Comment(e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).to_string();
                    self.comment(text);
                }
                Ok(Event::Decl(_) | Event::PI(_) | Event::DocType(_)) => {}
                Ok(Event::Eof) => break,
                Err(err) => {
                    return Err(FormatError::syntax(
                        FORMAT,
                        self.reader.error_position() as usize,
                        err.to_string(),
                    ));
                }
            }
        }

        if let Some(frame) = self.stack.last() {
            return Err(FormatError::syntax(
                FORMAT,
                self.position(),
                format!("unclosed element <{}>", frame.element.name),
            ));
        }

        let mut parsed = ParsedXml {
            elements: self.top,
            ..ParsedXml::default()
        };
        if parsed.elements.is_empty() {
            parsed.head = self.top_pending;
        } else {
            parsed.foot = self.top_pending;
        }
        Ok(parsed)
    }

    fn open(&self, e: &BytesStart<'_>, event_start: usize) -> Result<Element, FormatError> {
        let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| {
                FormatError::syntax(FORMAT, event_start, format!("bad attribute: {err}"))
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value().map_err(|err| {
                FormatError::syntax(FORMAT, event_start, format!("bad attribute value: {err}"))
            })?;
            attributes.push((key, value.into_owned()));
        }

        Ok(Element {
            name,
            attributes,
            ..Element::default()
        })
    }

    /// Attach a finished element to its parent. Comments still pending before its open tag
    /// become its head.
    fn close(&mut self, mut element: Element) {
        match self.stack.last_mut() {
            Some(frame) => {
                element.head = std::mem::take(&mut frame.pending);
                frame.element.children.push(element);
                frame.last = Last::ClosedChild;
            }
            None => {
                // Comments between two top-level elements stay with the earlier one.
                let pending = std::mem::take(&mut self.top_pending);
                match self.top.last_mut() {
                    Some(previous) if self.top_last == Last::ClosedChild => {
                        previous.foot.extend(pending);
                        element.head = Vec::new();
                    }
                    _ => element.head = pending,
                }
                self.top.push(element);
                self.top_last = Last::ClosedChild;
            }
        }
    }

    fn text(&mut self, text: &str, event_start: usize) -> Result<(), FormatError> {
        if text.is_empty() {
            return Ok(());
        }
        match self.stack.last_mut() {
            Some(frame) => {
                let mut pending = std::mem::take(&mut frame.pending);
                frame.element.line.append(&mut pending);
                frame.element.text.push(text.to_string());
                frame.last = Last::Text;
                Ok(())
            }
            None => Err(FormatError::syntax(
                FORMAT,
                event_start,
                "text outside of any element",
            )),
        }
    }

    fn comment(&mut self, text: String) {
        match self.stack.last_mut() {
            Some(frame) => {
                if frame.last == Last::ClosedChild && frame.pending.is_empty() {
                    if let Some(child) = frame.element.children.last_mut() {
                        child.foot.push(text);
                        return;
                    }
                }
                frame.pending.push(text);
            }
            None => self.top_pending.push(text),
        }
    }
}

struct NodeBuilder<'p> {
    prefs: &'p XmlPreferences,
    tree: Tree,
}

impl<'p> NodeBuilder<'p> {
    fn new(prefs: &'p XmlPreferences) -> Self {
        NodeBuilder {
            prefs,
            tree: Tree::new(),
        }
    }

    fn document(mut self, parsed: ParsedXml) -> DecodedDocument {
        let content = if parsed.elements.is_empty() {
            None
        } else {
            let map = self.tree.add_mapping();
            self.children_into(map, parsed.elements);
            Some(map)
        };
        let root = self.tree.add_document(content);
        let comments = &mut self.tree.node_mut(root).comments;
        comments.head = comment_from_texts(&parsed.head);
        comments.foot = comment_from_texts(&parsed.foot);
        DecodedDocument {
            tree: self.tree,
            root,
        }
    }

    /// Node for an element's value. Head and foot comments are left to the caller.
    fn value(&mut self, element: &mut Element) -> NodeId {
        let id = if element.attributes.is_empty() && element.children.is_empty() {
            self.tree.add_string(element.text.join(" "))
        } else {
            let map = self.tree.add_mapping();
            for (name, value) in std::mem::take(&mut element.attributes) {
                let value = self.tree.add_string(value);
                let key = format!("{}{}", self.prefs.attribute_prefix, name);
                self.tree.push_string_entry(map, &key, value);
            }
            if !element.text.is_empty() {
                let content = self.tree.add_string(element.text.join(" "));
                let key = self.prefs.content_name.clone();
                self.tree.push_string_entry(map, &key, content);
            }
            let children = std::mem::take(&mut element.children);
            self.children_into(map, children);
            map
        };
        self.tree.node_mut(id).comments.line = comment_from_texts(&element.line);
        id
    }

    fn children_into(&mut self, map: NodeId, children: Vec<Element>) {
        let mut runs: Vec<Vec<Element>> = Vec::new();
        for child in children {
            match runs.last_mut() {
                Some(run) if run[0].name == child.name => run.push(child),
                _ => runs.push(vec![child]),
            }
        }

        for mut run in runs {
            if run.len() == 1 {
                let mut element = run.remove(0);
                let value = self.value(&mut element);
                let key = self.tree.push_string_entry(map, &element.name, value);
                let comments = &mut self.tree.node_mut(key).comments;
                comments.head = comment_from_texts(&element.head);
                comments.foot = comment_from_texts(&element.foot);
            } else {
                let name = run[0].name.clone();
                let seq = self.tree.add_sequence();
                for mut element in run {
                    let item = self.value(&mut element);
                    let comments = &mut self.tree.node_mut(item).comments;
                    comments.head = comment_from_texts(&element.head);
                    comments.foot = comment_from_texts(&element.foot);
                    self.tree.push_item(seq, item);
                }
                self.tree.push_string_entry(map, &name, seq);
            }
        }
    }
}
