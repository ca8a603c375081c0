// crates/bt-studio-xml/src/validate.rs

//! Document validation against a set of registered node identifiers.
//!
//! The actual checking is delegated to an injected [`SchemaChecker`]; this
//! module only serializes the document, funnels checker failures into a
//! diagnostic list, and ships a default checker for the common case.

use crate::canonical::to_canonical_string;
use crate::document::{XmlDocument, XmlElement};
use crate::error::BtXmlError;
use bt_studio::model::NodeType;
use std::collections::BTreeSet;
use std::fmt;

/// A failed schema check: one message per offending construct, in document
/// order.
#[derive(Debug)]
pub struct SchemaViolation {
    messages: Vec<String>,
}

impl SchemaViolation {
    pub fn new(messages: Vec<String>) -> Self {
        SchemaViolation { messages }
    }

    pub fn single(message: impl Into<String>) -> Self {
        SchemaViolation {
            messages: vec![message.into()],
        }
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages.join("; "))
    }
}

/// The injected schema/semantic checker.
///
/// Implementations receive the canonical serialization of the document and
/// the set of currently registered node identifiers.
pub trait SchemaChecker {
    fn check(&self, xml_text: &str, registered: &BTreeSet<String>) -> Result<(), SchemaViolation>;
}

/// Runs `checker` over the document and appends any violation messages to
/// `error_messages` (which is cleared first).
///
/// The returned boolean is `true` unconditionally: it reports that the
/// validation pass ran, not that the document is valid. This mirrors the
/// long-standing behavior of the original editor, which callers depend on;
/// validity is exactly the emptiness of `error_messages`.
///
/// # Errors
/// Only serialization failures surface as `Err`; checker failures never do.
pub fn verify_document(
    document: &XmlDocument,
    registered: &BTreeSet<String>,
    checker: &dyn SchemaChecker,
    error_messages: &mut Vec<String>,
) -> Result<bool, BtXmlError> {
    error_messages.clear();
    let xml_text = to_canonical_string(document)?;
    if let Err(violation) = checker.check(&xml_text, registered) {
        error_messages.extend(violation.into_messages());
    }
    Ok(true)
}

// --- Default Checker ---

/// Tags that structure a document rather than reference a node definition.
const STRUCTURAL_TAGS: [&str; 6] = [
    "Root",
    "TreeNodesModel",
    "BehaviorTree",
    "input_port",
    "output_port",
    "inout_port",
];

/// A [`SchemaChecker`] that verifies every node element inside the
/// `<BehaviorTree>` sections references a registered identifier: either
/// its tag directly, or — for the generic type tags — its `ID` attribute.
pub struct NodeSetChecker;

impl SchemaChecker for NodeSetChecker {
    fn check(&self, xml_text: &str, registered: &BTreeSet<String>) -> Result<(), SchemaViolation> {
        let document = XmlDocument::parse(xml_text)
            .map_err(|e| SchemaViolation::single(format!("malformed document: {}", e)))?;

        let mut messages = Vec::new();
        if let Some(root) = document.root() {
            for bt_root in root.child_elements().filter(|e| e.tag() == "BehaviorTree") {
                for child in bt_root.child_elements() {
                    check_element(child, registered, &mut messages);
                }
            }
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(SchemaViolation::new(messages))
        }
    }
}

fn is_generic_type_tag(tag: &str) -> bool {
    matches!(tag, "Action" | "Condition" | "Control" | "Decorator" | "SubTree")
}

fn check_element(element: &XmlElement, registered: &BTreeSet<String>, messages: &mut Vec<String>) {
    let tag = element.tag();
    if !STRUCTURAL_TAGS.contains(&tag) {
        if is_generic_type_tag(tag) {
            match element.attribute("ID") {
                Some(id) if registered.contains(id) => {}
                Some(id) => messages.push(format!("unknown node ID '{}'", id)),
                None => messages.push(format!("<{}> element without an ID attribute", tag)),
            }
        } else if NodeType::from_tag(tag) == NodeType::Undefined && !registered.contains(tag) {
            messages.push(format!("unknown node '<{}>'", tag));
        } else if NodeType::from_tag(tag) != NodeType::Undefined && !registered.contains(tag) {
            // A built-in vocabulary tag that the caller did not register.
            messages.push(format!("node '{}' is not registered", tag));
        }
    }

    for child in element.child_elements() {
        check_element(child, registered, messages);
    }
}
