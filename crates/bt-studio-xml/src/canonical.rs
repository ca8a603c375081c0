// crates/bt-studio-xml/src/canonical.rs

//! Canonical, diff-stable text rendering.
//!
//! Attribute order in the output never depends on attribute order in the
//! source: attributes are collected into a name-keyed map and written in
//! lexicographic order. Two documents that differ only in attribute
//! insertion order therefore serialize to identical text, which keeps
//! re-saves quiet under version control.
//!
//! Layout rules:
//! - four-space indentation, one element per line;
//! - an element whose content includes character data is rendered entirely
//!   inline, text verbatim, so no whitespace is invented inside it;
//! - childless elements self-close;
//! - comments are written verbatim.

use crate::document::{XmlDocument, XmlElement, XmlNode};
use crate::error::BtXmlError;
use quick_xml::escape::{escape, partial_escape};
use std::collections::BTreeMap;
use std::io::Write;

const INDENT_WIDTH: usize = 4;

/// Renders the whole document, declaration header included.
///
/// # Errors
/// Propagates the first sink failure and stops writing. A partial result
/// is invalid and must not be persisted.
pub fn write_canonical<W: Write>(document: &XmlDocument, sink: &mut W) -> Result<(), BtXmlError> {
    let root = document.root().ok_or(BtXmlError::MissingElement {
        element: "document root",
    })?;
    sink.write_all(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")?;
    write_element(root, sink, 0)?;
    Ok(())
}

/// Convenience wrapper producing a `String`.
pub fn to_canonical_string(document: &XmlDocument) -> Result<String, BtXmlError> {
    let mut out = Vec::new();
    write_canonical(document, &mut out)?;
    String::from_utf8(out).map_err(|e| BtXmlError::Utf8(e.utf8_error()))
}

fn write_element<W: Write>(
    element: &XmlElement,
    sink: &mut W,
    depth: usize,
) -> Result<(), BtXmlError> {
    write_indent(sink, depth)?;
    write_open_tag(element, sink)?;

    if element.children().is_empty() {
        sink.write_all(b"/>\n")?;
        return Ok(());
    }

    let has_text = element
        .children()
        .iter()
        .any(|child| matches!(child, XmlNode::Text(_)));

    sink.write_all(b">")?;
    if has_text {
        // Mixed or text content: everything inline, text verbatim.
        for child in element.children() {
            write_node_inline(child, sink)?;
        }
    } else {
        sink.write_all(b"\n")?;
        for child in element.children() {
            match child {
                XmlNode::Element(child) => write_element(child, sink, depth + 1)?,
                XmlNode::Comment(comment) => {
                    write_indent(sink, depth + 1)?;
                    write_comment(comment, sink)?;
                    sink.write_all(b"\n")?;
                }
                XmlNode::Text(_) => unreachable!("text content handled inline"),
            }
        }
        write_indent(sink, depth)?;
    }
    sink.write_all(b"</")?;
    sink.write_all(element.tag().as_bytes())?;
    sink.write_all(b">\n")?;
    Ok(())
}

fn write_node_inline<W: Write>(node: &XmlNode, sink: &mut W) -> Result<(), BtXmlError> {
    match node {
        XmlNode::Text(text) => sink.write_all(partial_escape(text.as_str()).as_bytes())?,
        XmlNode::Comment(comment) => write_comment(comment, sink)?,
        XmlNode::Element(element) => {
            write_open_tag(element, sink)?;
            if element.children().is_empty() {
                sink.write_all(b"/>")?;
            } else {
                sink.write_all(b">")?;
                for child in element.children() {
                    write_node_inline(child, sink)?;
                }
                sink.write_all(b"</")?;
                sink.write_all(element.tag().as_bytes())?;
                sink.write_all(b">")?;
            }
        }
    }
    Ok(())
}

fn write_open_tag<W: Write>(element: &XmlElement, sink: &mut W) -> Result<(), BtXmlError> {
    sink.write_all(b"<")?;
    sink.write_all(element.tag().as_bytes())?;

    // Name-keyed map: this is the canonical ordering step.
    let attributes: BTreeMap<&str, &str> = element
        .attributes()
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();

    for (name, value) in attributes {
        sink.write_all(b" ")?;
        sink.write_all(name.as_bytes())?;
        sink.write_all(b"=\"")?;
        sink.write_all(escape(value).as_bytes())?;
        sink.write_all(b"\"")?;
    }
    Ok(())
}

fn write_comment<W: Write>(comment: &str, sink: &mut W) -> Result<(), BtXmlError> {
    sink.write_all(b"<!--")?;
    sink.write_all(comment.as_bytes())?;
    sink.write_all(b"-->")?;
    Ok(())
}

fn write_indent<W: Write>(sink: &mut W, depth: usize) -> Result<(), BtXmlError> {
    for _ in 0..depth * INDENT_WIDTH {
        sink.write_all(b" ")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_attributes_are_sorted() {
        let doc = XmlDocument::parse(r#"<root zeta="1" alpha="2" mid="3"/>"#).unwrap();
        let text = to_canonical_string(&doc).unwrap();
        assert_eq!(
            text,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root alpha=\"2\" mid=\"3\" zeta=\"1\"/>\n"
        );
    }

    #[test]
    fn test_nested_layout() {
        let doc = XmlDocument::parse(
            r#"<root><BehaviorTree ID="Main"><Sequence><AlwaysSuccess/></Sequence></BehaviorTree></root>"#,
        )
        .unwrap();
        let text = to_canonical_string(&doc).unwrap();
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                        <root>\n\
                        \x20   <BehaviorTree ID=\"Main\">\n\
                        \x20       <Sequence>\n\
                        \x20           <AlwaysSuccess/>\n\
                        \x20       </Sequence>\n\
                        \x20   </BehaviorTree>\n\
                        </root>\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_text_content_is_inline_and_verbatim() {
        let doc = XmlDocument::parse(
            "<root><input_port name=\"goal\"> target  pose </input_port></root>",
        )
        .unwrap();
        let text = to_canonical_string(&doc).unwrap();
        assert!(text.contains("<input_port name=\"goal\"> target  pose </input_port>"));
    }

    #[test]
    fn test_comments_survive() {
        let doc = XmlDocument::parse("<root><!-- keep me --><Sequence/></root>").unwrap();
        let text = to_canonical_string(&doc).unwrap();
        assert!(text.contains("    <!-- keep me -->\n"));
    }

    #[test]
    fn test_escaping() {
        let mut root = XmlElement::new("root");
        root.set_attribute("value", "a<b & \"c\"");
        root.add_child(XmlNode::Text("1 < 2 & 3".to_string()));
        let doc = XmlDocument::with_root(root);
        let text = to_canonical_string(&doc).unwrap();
        assert!(text.contains("value=\"a&lt;b &amp; &quot;c&quot;\""));
        assert!(text.contains(">1 &lt; 2 &amp; 3</root>"));
    }

    #[test]
    fn test_write_failure_propagates() {
        struct FailingSink;
        impl io::Write for FailingSink {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let doc = XmlDocument::parse("<root/>").unwrap();
        let result = write_canonical(&doc, &mut FailingSink);
        assert!(matches!(result, Err(crate::error::BtXmlError::Io(_))));
    }
}
