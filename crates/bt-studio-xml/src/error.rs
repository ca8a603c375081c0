// crates/bt-studio-xml/src/error.rs

use quick_xml::Error as XmlError;
use quick_xml::encoding::EncodingError;
use quick_xml::errors::serialize::DeError;
use quick_xml::events::attributes::AttrError;
use std::fmt;
use std::str::Utf8Error;

/// Errors that can occur while parsing, building, or serializing
/// behavior-tree XML.
#[derive(Debug)]
pub enum BtXmlError {
    /// An error from the underlying `quick-xml` event reader.
    XmlParsing(XmlError),

    /// Malformed attribute syntax reported by `quick-xml`.
    Attr(AttrError),

    /// The document is not valid UTF-8 / its declared encoding.
    Encoding(EncodingError),

    /// A tag or attribute name is not valid UTF-8.
    Utf8(Utf8Error),

    /// An error from the `quick-xml` deserializer (descriptor files).
    Manifest(DeError),

    /// A required XML element was missing (e.g. `TreeNodesModel`).
    MissingElement { element: &'static str },

    /// A required attribute was missing or empty (e.g. `@path`).
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// A node in the abstract tree carries no resolvable node model.
    /// This is a contract violation in the owning front-end, not
    /// recoverable input.
    MissingNodeModel { node_index: usize },

    /// The document shape is not what this subsystem produces.
    Structure(&'static str),

    /// The canonicalization sink reported a write failure. Any partial
    /// output already written must be treated as invalid.
    Io(std::io::Error),
}

impl From<XmlError> for BtXmlError {
    fn from(e: XmlError) -> Self {
        BtXmlError::XmlParsing(e)
    }
}

impl From<AttrError> for BtXmlError {
    fn from(e: AttrError) -> Self {
        BtXmlError::Attr(e)
    }
}

impl From<EncodingError> for BtXmlError {
    fn from(e: EncodingError) -> Self {
        BtXmlError::Encoding(e)
    }
}

impl From<Utf8Error> for BtXmlError {
    fn from(e: Utf8Error) -> Self {
        BtXmlError::Utf8(e)
    }
}

impl From<DeError> for BtXmlError {
    fn from(e: DeError) -> Self {
        BtXmlError::Manifest(e)
    }
}

impl From<std::io::Error> for BtXmlError {
    fn from(e: std::io::Error) -> Self {
        BtXmlError::Io(e)
    }
}

impl fmt::Display for BtXmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BtXmlError::XmlParsing(e) => write!(f, "XML parsing error: {}", e),
            BtXmlError::Attr(e) => write!(f, "XML attribute error: {}", e),
            BtXmlError::Encoding(e) => write!(f, "Encoding error: {}", e),
            BtXmlError::Utf8(e) => write!(f, "UTF-8 error: {}", e),
            BtXmlError::Manifest(e) => write!(f, "Descriptor parsing error: {}", e),
            BtXmlError::MissingElement { element } => {
                write!(f, "Missing required XML element: <{}>", element)
            }
            BtXmlError::MissingAttribute { element, attribute } => {
                write!(
                    f,
                    "Missing required attribute '{}' on <{}>",
                    attribute, element
                )
            }
            BtXmlError::MissingNodeModel { node_index } => {
                write!(f, "Abstract node {} has no node model", node_index)
            }
            BtXmlError::Structure(msg) => write!(f, "Unexpected document structure: {}", msg),
            BtXmlError::Io(e) => write!(f, "Write error: {}", e),
        }
    }
}

impl std::error::Error for BtXmlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BtXmlError::XmlParsing(e) => Some(e),
            BtXmlError::Attr(e) => Some(e),
            BtXmlError::Encoding(e) => Some(e),
            BtXmlError::Utf8(e) => Some(e),
            BtXmlError::Manifest(e) => Some(e),
            BtXmlError::Io(e) => Some(e),
            _ => None,
        }
    }
}
