//! Parsed document tree for template exports.
//!
//! The export format is a plain element tree with no attributes of
//! interest, so the loader flattens each element into an [`XmlNode`]
//! carrying its tag, trimmed text, and ordered children. Extraction
//! walks this tree; nothing downstream touches the XML parser.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ImportError, Result};

/// One element of the parsed export document.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlNode {
    /// Element tag name.
    pub tag: String,
    /// Concatenated text content, `None` when empty after trimming.
    pub text: Option<String>,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn new(tag: String) -> Self {
        Self {
            tag,
            text: None,
            children: Vec::new(),
        }
    }

    fn push_text(&mut self, value: &str) {
        match self.text.as_mut() {
            Some(existing) => existing.push_str(value),
            None => self.text = Some(value.to_string()),
        }
    }

    /// First direct child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Text of the node when it is a plain scalar: has text and no
    /// nested elements. Containers and mixed content return `None`.
    pub fn scalar_text(&self) -> Option<&str> {
        if self.children.is_empty() {
            self.text.as_deref()
        } else {
            None
        }
    }

    /// Scalar text of the first direct child with the given tag.
    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.child(tag).and_then(XmlNode::scalar_text)
    }

    /// All nodes reachable by a `/`-separated tag path, in document order.
    ///
    /// `find_all("items/item")` returns every `item` element under every
    /// direct `items` child, matching the shape of the export format.
    pub fn find_all<'a>(&'a self, path: &str) -> Vec<&'a XmlNode> {
        let mut current = vec![self];
        for segment in path.split('/') {
            let mut next = Vec::new();
            for node in current {
                next.extend(node.children.iter().filter(|c| c.tag == segment));
            }
            current = next;
        }
        current
    }
}

/// Parse an export document into an element tree.
///
/// Text is whitespace-trimmed and entity-unescaped; CDATA sections are
/// taken verbatim. Returns the root element.
///
/// # Errors
///
/// Returns [`ImportError::Xml`] when the parser rejects the input and
/// [`ImportError::MalformedDocument`] when the document has no root
/// element or leaves elements unclosed.
pub fn parse_document(xml: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Index 0 is a virtual root collecting top-level elements.
    let mut stack = vec![XmlNode::new(String::new())];

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                stack.push(XmlNode::new(tag));
            }
            Event::Empty(start) => {
                let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::new(tag));
                }
            }
            Event::Text(text) => {
                let value = text.unescape()?;
                if !value.is_empty() {
                    if let Some(node) = stack.last_mut() {
                        node.push_text(&value);
                    }
                }
            }
            Event::CData(data) => {
                let raw = data.into_inner();
                let value = String::from_utf8_lossy(&raw);
                if !value.is_empty() {
                    if let Some(node) = stack.last_mut() {
                        node.push_text(&value);
                    }
                }
            }
            Event::End(_) => match (stack.pop(), stack.last_mut()) {
                (Some(node), Some(parent)) => parent.children.push(node),
                _ => {
                    return Err(ImportError::MalformedDocument {
                        message: "unbalanced closing tag".into(),
                    })
                }
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let root = match stack.pop() {
        Some(root) if stack.is_empty() => root,
        _ => {
            return Err(ImportError::MalformedDocument {
                message: "unclosed element".into(),
            })
        }
    };

    root.children
        .into_iter()
        .next()
        .ok_or_else(|| ImportError::MalformedDocument {
            message: "no root element".into(),
        })
}
