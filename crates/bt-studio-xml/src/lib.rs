// crates/bt-studio-xml/src/lib.rs

#![doc = "XML persistence for behavior-tree documents."]
#![doc = ""]
#![doc = "This crate converts between the on-disk XML format and the data model"]
#![doc = "defined in `bt-studio`."]
#![doc = ""]
#![doc = "It supports:"]
#![doc = "- `extract_registry`: Collecting every node model a document declares or uses."]
#![doc = "- `build_tree_document`: Serializing an abstract behavior tree back to XML."]
#![doc = "- `verify_document`: Checking a document against registered node identifiers."]
#![doc = "- `to_canonical_string`: Deterministic, diff-stable text output."]

// --- Crate Modules ---

mod build;
mod canonical;
mod document;
mod error;
mod extract;
mod manifest;
mod validate;

// --- Public API Re-exports ---

pub use build::{
    build_tree_document, build_tree_xml, write_node_model, write_port_model,
    write_tree_nodes_model,
};
pub use canonical::{to_canonical_string, write_canonical};
pub use document::{XmlDocument, XmlElement, XmlNode};
pub use error::BtXmlError;
pub use extract::{extract_node_model, extract_registry, read_palette};
pub use manifest::{
    NodeManifestProvider, PaletteXmlSource, parse_palette_description, parse_plugin_description,
};
pub use validate::{NodeSetChecker, SchemaChecker, SchemaViolation, verify_document};
