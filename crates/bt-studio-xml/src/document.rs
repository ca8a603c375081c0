// crates/bt-studio-xml/src/document.rs

//! A small owned XML document tree.
//!
//! The dual-syntax node format cannot be mapped onto fixed serde structs:
//! any attribute of a node element may be a port, and comments and text
//! must survive a load/save cycle verbatim. This module therefore keeps a
//! generic element tree, built from the `quick-xml` event reader.
//!
//! Trimming policy: whitespace-only text nodes are indentation left behind
//! by a previous pretty-print and are dropped during parsing; all other
//! text is preserved exactly. This is what makes canonicalization
//! idempotent.

use crate::error::BtXmlError;
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use std::str;

/// One child of an element: a nested element, a comment, or character data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Comment(String),
    Text(String),
}

/// An element with its tag, attributes (in document order), and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        XmlElement {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Sets an attribute, replacing any existing value for the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Attributes in document order. The canonical serializer re-sorts
    /// these; extraction iterates them as-is.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn add_child(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    /// Appends character data, merging with a trailing text node so that
    /// content split across reader events stays one node.
    fn push_text(&mut self, text: &str) {
        if let Some(XmlNode::Text(existing)) = self.children.last_mut() {
            existing.push_str(text);
        } else {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn first_child_element(&self, tag: &str) -> Option<&XmlElement> {
        self.child_elements().find(|element| element.tag == tag)
    }

    /// Concatenated text content of this element and its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => element.collect_text(out),
                XmlNode::Comment(_) => {}
            }
        }
    }
}

/// An XML document: the root element, if any.
///
/// The declaration header is not stored; the canonical serializer always
/// writes its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlDocument {
    root: Option<XmlElement>,
}

impl XmlDocument {
    pub fn new() -> Self {
        XmlDocument::default()
    }

    pub fn with_root(root: XmlElement) -> Self {
        XmlDocument { root: Some(root) }
    }

    pub fn root(&self) -> Option<&XmlElement> {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> Option<&mut XmlElement> {
        self.root.as_mut()
    }

    /// Parses a complete document from a string slice.
    ///
    /// # Errors
    /// Returns a `BtXmlError` if the input is not well-formed XML or has no
    /// root element.
    pub fn parse(xml: &str) -> Result<XmlDocument, BtXmlError> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    stack.push(element_from_start(&e)?);
                }
                Event::Empty(e) => {
                    let element = element_from_start(&e)?;
                    attach(&mut stack, &mut root, XmlNode::Element(element))?;
                }
                Event::End(_) => {
                    // quick-xml checks end-tag names; the stack cannot be
                    // empty or mismatched here.
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, XmlNode::Element(element))?;
                    }
                }
                Event::Text(t) => {
                    let raw = t.decode()?;
                    let text = match unescape(raw.as_ref()) {
                        Ok(unescaped) => unescaped.into_owned(),
                        Err(_) => raw.into_owned(),
                    };
                    if !text.trim().is_empty()
                        && let Some(parent) = stack.last_mut()
                    {
                        parent.push_text(&text);
                    }
                }
                Event::CData(c) => {
                    let text = c.decode()?;
                    if !text.trim().is_empty()
                        && let Some(parent) = stack.last_mut()
                    {
                        parent.push_text(&text);
                    }
                }
                Event::GeneralRef(e) => {
                    // Entity references the reader did not resolve inline.
                    let name = e.decode()?;
                    let resolved = resolve_reference(&name)
                        .ok_or(BtXmlError::Structure("unresolvable entity reference"))?;
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(&resolved);
                    }
                }
                Event::Comment(c) => {
                    let text = c.decode()?;
                    if let Some(parent) = stack.last_mut() {
                        parent.add_child(XmlNode::Comment(text.into_owned()));
                    }
                    // Comments outside the root element are not part of the
                    // document tree and are not preserved.
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        match root {
            Some(root) => Ok(XmlDocument::with_root(root)),
            None => Err(BtXmlError::MissingElement {
                element: "document root",
            }),
        }
    }
}

fn attach(
    stack: &mut Vec<XmlElement>,
    root: &mut Option<XmlElement>,
    node: XmlNode,
) -> Result<(), BtXmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.add_child(node);
        return Ok(());
    }
    match node {
        XmlNode::Element(element) => {
            if root.is_some() {
                return Err(BtXmlError::Structure("multiple root elements"));
            }
            *root = Some(element);
            Ok(())
        }
        // Top-level comments/text: nothing to attach them to.
        _ => Ok(()),
    }
}

/// Resolves a character reference (`#65`, `#x41`) or one of the five
/// predefined entities.
fn resolve_reference(name: &str) -> Option<String> {
    if let Some(digits) = name.strip_prefix('#') {
        let code = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X'))
        {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            digits.parse().ok()?
        };
        return char::from_u32(code).map(String::from);
    }
    resolve_predefined_entity(name).map(str::to_string)
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement, BtXmlError> {
    let tag = str::from_utf8(e.name().as_ref())?.to_string();
    let mut element = XmlElement::new(tag);
    for attr in e.attributes() {
        let attr = attr?;
        let key = str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        element.set_attribute(key, value);
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_attribute_document_order() {
        let doc = XmlDocument::parse(r#"<root b="2" a="1"/>"#).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(
            root.attributes(),
            &[("b".to_string(), "2".to_string()), ("a".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn test_parse_skips_indentation_text() {
        let doc = XmlDocument::parse("<root>\n    <child/>\n</root>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.children().len(), 1);
        assert!(matches!(root.children()[0], XmlNode::Element(_)));
    }

    #[test]
    fn test_parse_preserves_text_and_comments() {
        let doc =
            XmlDocument::parse("<root><!-- a note --><port> the goal </port></root>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(
            root.children()[0],
            XmlNode::Comment(" a note ".to_string())
        );
        let port = root.first_child_element("port").unwrap();
        assert_eq!(port.text(), " the goal ");
    }

    #[test]
    fn test_parse_unescapes_entities() {
        let doc = XmlDocument::parse(r#"<root value="a &lt; b">x &amp; y</root>"#).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.attribute("value"), Some("a < b"));
        assert_eq!(root.text(), "x & y");
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(XmlDocument::parse("").is_err());
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut element = XmlElement::new("Action");
        element.set_attribute("ID", "First");
        element.set_attribute("ID", "Second");
        assert_eq!(element.attribute("ID"), Some("Second"));
        assert_eq!(element.attributes().len(), 1);
    }
}
