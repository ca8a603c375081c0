// crates/bt-studio-xml/src/manifest.rs

//! Descriptor files exported by node-providing packages.
//!
//! A package advertises its node palettes and native plugins through small
//! fixed-schema XML descriptors. Unlike tree documents these have a rigid
//! shape, so they deserialize straight into `serde` structs. Resolving the
//! declared paths against a filesystem, loading the files, and discovering
//! the descriptors in the first place all stay outside this subsystem.

use crate::document::XmlDocument;
use crate::error::BtXmlError;
use crate::extract::read_palette;
use bt_studio::model::NodeModel;
use serde::Deserialize;

// --- Descriptor Schema ---

/// `<root><plugin path="…"/>…</root>`
#[derive(Debug, Deserialize)]
struct PluginDescription {
    #[serde(rename = "plugin", default)]
    plugins: Vec<DescriptorEntry>,
}

/// `<root><palette path="…"/>…</root>`
#[derive(Debug, Deserialize)]
struct PaletteDescription {
    #[serde(rename = "palette", default)]
    palettes: Vec<DescriptorEntry>,
}

#[derive(Debug, Deserialize)]
struct DescriptorEntry {
    #[serde(rename = "@path", default)]
    path: Option<String>,
}

fn entry_paths(
    entries: Vec<DescriptorEntry>,
    element: &'static str,
) -> Result<Vec<String>, BtXmlError> {
    let mut paths = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.path {
            Some(path) if !path.is_empty() => paths.push(path),
            _ => {
                return Err(BtXmlError::MissingAttribute {
                    element,
                    attribute: "path",
                });
            }
        }
    }
    Ok(paths)
}

/// Parses a plugin descriptor and returns the declared library paths.
///
/// # Errors
/// Returns an error if the descriptor is malformed or an entry has no
/// (or an empty) `path` attribute.
pub fn parse_plugin_description(xml: &str) -> Result<Vec<String>, BtXmlError> {
    let description: PluginDescription = quick_xml::de::from_str(xml)?;
    entry_paths(description.plugins, "plugin")
}

/// Parses a palette descriptor and returns the declared palette file paths.
///
/// # Errors
/// Same contract as [`parse_plugin_description`].
pub fn parse_palette_description(xml: &str) -> Result<Vec<String>, BtXmlError> {
    let description: PaletteDescription = quick_xml::de::from_str(xml)?;
    entry_paths(description.palettes, "palette")
}

// --- Manifest Provider ---

/// Source of node-model manifests, e.g. a loaded plugin or a palette file
/// shipped with a package.
pub trait NodeManifestProvider {
    /// Yields `(registration ID, model)` pairs to merge into a registry.
    fn node_models(&self) -> Result<Vec<(String, NodeModel)>, BtXmlError>;
}

/// A provider backed by palette XML content already in memory.
pub struct PaletteXmlSource {
    xml: String,
}

impl PaletteXmlSource {
    pub fn new(xml: impl Into<String>) -> Self {
        PaletteXmlSource { xml: xml.into() }
    }
}

impl NodeManifestProvider for PaletteXmlSource {
    fn node_models(&self) -> Result<Vec<(String, NodeModel)>, BtXmlError> {
        let document = XmlDocument::parse(&self.xml)?;
        let models = read_palette(&document)?;
        Ok(models.into_iter().collect())
    }
}
