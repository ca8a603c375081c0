// crates/bt-studio-xml/src/build.rs

//! Rebuilding XML from an abstract behavior tree, and writing node-model
//! palettes.
//!
//! The builder never mutates the tree it is given and attaches an element
//! to its parent only after the whole subtree below it has been built, so
//! a contract violation halfway down never leaves a half-written element
//! in the document.

use crate::document::{XmlDocument, XmlElement, XmlNode};
use crate::error::BtXmlError;
use bt_studio::model::{NodeModel, NodeModels, PortDirection, PortModel};
use bt_studio::tree::AbsBehaviorTree;

/// Serializes the subtree rooted at `index` as a child of `parent`,
/// depth-first, preserving child order.
///
/// A node whose registration ID is in `builtins` is written under its own
/// tag; any other node gets the generic tag of its type plus an `ID`
/// attribute. The instance name is written as `name` only when it differs
/// from the registration ID, and every resolved port value becomes one
/// attribute. A collapsed sub-tree reference is written without children;
/// its body belongs in its own `<BehaviorTree>` section.
///
/// # Errors
/// Returns [`BtXmlError::MissingNodeModel`] if the node (or any node below
/// it) carries no model reference. That is a bug in the calling front-end,
/// not recoverable input, and nothing is appended to `parent` in that case.
pub fn build_tree_xml(
    tree: &AbsBehaviorTree,
    index: usize,
    parent: &mut XmlElement,
    builtins: &NodeModels,
) -> Result<(), BtXmlError> {
    let element = build_node_element(tree, index, builtins)?;
    parent.add_child(XmlNode::Element(element));
    Ok(())
}

fn build_node_element(
    tree: &AbsBehaviorTree,
    index: usize,
    builtins: &NodeModels,
) -> Result<XmlElement, BtXmlError> {
    let node = tree
        .node(index)
        .ok_or(BtXmlError::Structure("node index out of range"))?;
    let model = node
        .model
        .as_ref()
        .ok_or(BtXmlError::MissingNodeModel { node_index: index })?;

    let mut element = if builtins.contains_key(&model.registration_id) {
        XmlElement::new(model.registration_id.clone())
    } else {
        let mut element = XmlElement::new(model.node_type.as_str());
        element.set_attribute("ID", model.registration_id.clone());
        element
    };

    if node.instance_name != model.registration_id {
        element.set_attribute("name", node.instance_name.clone());
    }

    for (port, value) in &node.port_values {
        element.set_attribute(port.clone(), value.clone());
    }

    if node.is_expanded() {
        for &child in &node.children {
            let child_element = build_node_element(tree, child, builtins)?;
            element.add_child(XmlNode::Element(child_element));
        }
    }
    Ok(element)
}

/// Builds a complete saveable document: `<root>` holding one
/// `<BehaviorTree>` with the serialized tree inside.
///
/// A synthetic "Root" wrapper at the top of the abstract tree is skipped;
/// an empty tree produces an empty `<BehaviorTree>` section.
pub fn build_tree_document(
    tree: &AbsBehaviorTree,
    tree_id: Option<&str>,
    builtins: &NodeModels,
) -> Result<XmlDocument, BtXmlError> {
    let mut root = XmlElement::new("root");
    let mut bt_element = XmlElement::new("BehaviorTree");
    if let Some(id) = tree_id {
        bt_element.set_attribute("ID", id);
    }

    if let Some(index) = tree.effective_root_index() {
        build_tree_xml(tree, index, &mut bt_element, builtins)?;
    }

    root.add_child(XmlNode::Element(bt_element));
    Ok(XmlDocument::with_root(root))
}

/// Writes one port declaration element.
///
/// Only fields that are set and non-empty are emitted, so a round-trip
/// never invents `type=""` or `default=""` attributes. Note the asymmetry
/// with extraction: an `InOut` model port is written as `inout_port`, but
/// `inout_port` loads back as `Input` (legacy file-format convention).
pub fn write_port_model(name: &str, port: &PortModel) -> XmlElement {
    let tag = match port.direction {
        PortDirection::Input => "input_port",
        PortDirection::Output => "output_port",
        PortDirection::InOut => "inout_port",
    };
    let mut element = XmlElement::new(tag);
    element.set_attribute("name", name);

    if let Some(type_name) = &port.type_name
        && !type_name.is_empty()
    {
        element.set_attribute("type", type_name.clone());
    }
    if let Some(default_value) = &port.default_value
        && !default_value.is_empty()
    {
        element.set_attribute("default", default_value.clone());
    }
    if let Some(description) = &port.description
        && !description.is_empty()
    {
        element.add_child(XmlNode::Text(description.clone()));
    }
    element
}

/// Writes a full node-model declaration element (generic type tag, `ID`
/// attribute, one declaration child per port).
pub fn write_node_model(model: &NodeModel) -> XmlElement {
    let mut element = XmlElement::new(model.node_type.as_str());
    element.set_attribute("ID", model.registration_id.clone());
    for (name, port) in &model.ports {
        element.add_child(XmlNode::Element(write_port_model(name, port)));
    }
    element
}

/// Builds a palette document: `<root><TreeNodesModel>…` with one
/// declaration per model. Built-in models are not part of a palette and
/// are skipped.
pub fn write_tree_nodes_model(models: &NodeModels, builtins: &NodeModels) -> XmlDocument {
    let mut model_root = XmlElement::new("TreeNodesModel");
    for (id, model) in models {
        if builtins.contains_key(id) {
            continue;
        }
        model_root.add_child(XmlNode::Element(write_node_model(model)));
    }

    let mut root = XmlElement::new("root");
    root.add_child(XmlNode::Element(model_root));
    XmlDocument::with_root(root)
}
