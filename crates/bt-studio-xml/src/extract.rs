// crates/bt-studio-xml/src/extract.rs

//! Extraction of node models from a document.
//!
//! Two port syntaxes coexist in the wild. Inside a `<BehaviorTree>` body a
//! port shows up as a plain attribute on the node element; inside
//! `<TreeNodesModel>` it is declared with an explicit `input_port` /
//! `output_port` / `inout_port` child. Both feed the same port map with
//! insert-if-absent semantics, so the attribute-derived port (inserted
//! first) shadows a declaration with the same name.

use crate::document::{XmlDocument, XmlElement};
use crate::error::BtXmlError;
use bt_studio::model::{NodeModel, NodeModels, NodeType, PortDirection, PortModel};
use log::debug;

/// The three declaration tags and the direction each one maps to.
///
/// `inout_port` mapping to `Input` is a legacy convention of the file
/// format and is kept for compatibility.
const PORT_TAGS: [(&str, PortDirection); 3] = [
    ("input_port", PortDirection::Input),
    ("output_port", PortDirection::Output),
    ("inout_port", PortDirection::Input),
];

/// Builds a [`NodeModel`] from a single node element.
///
/// The candidate identifier is the `ID` attribute when present, the tag
/// name otherwise. A tag outside the node vocabulary yields the empty
/// `Undefined` model; callers must check [`NodeModel::is_undefined`]
/// before inserting the result anywhere.
pub fn extract_node_model(element: &XmlElement) -> NodeModel {
    let tag = element.tag();
    let node_type = NodeType::from_tag(tag);
    if node_type == NodeType::Undefined {
        return NodeModel::default();
    }

    let registration_id = element.attribute("ID").unwrap_or(tag);
    let mut model = NodeModel::new(node_type, registration_id);

    // Attribute syntax: every attribute except the identity pair is a port.
    for (name, _value) in element.attributes() {
        if name != "ID" && name != "name" {
            model.add_port(name.clone(), PortModel::new(PortDirection::InOut));
        }
    }

    // Declaration syntax.
    for (port_tag, direction) in PORT_TAGS {
        for port_element in element.child_elements().filter(|e| e.tag() == port_tag) {
            let mut port = PortModel::new(direction);
            port.type_name = port_element.attribute("type").map(str::to_string);
            port.default_value = port_element.attribute("default").map(str::to_string);
            let description = port_element.text();
            if !description.is_empty() {
                port.description = Some(description);
            }

            match port_element.attribute("name") {
                Some(name) => model.add_port(name, port),
                None => {
                    debug!("skipping <{}> without a name on '{}'", port_tag, model.registration_id);
                }
            }
        }
    }

    model
}

/// Collects every node model a document declares or uses.
///
/// Models declared under `<TreeNodesModel>` are taken as-is; a later
/// declaration with the same ID replaces an earlier one. Afterwards every
/// `<BehaviorTree>` body is walked depth-first and any recognizable node
/// element whose identifier is still unknown is added — this is how custom
/// nodes that were used but never declared are discovered. Discovery never
/// overwrites an explicit declaration.
pub fn extract_registry(document: &XmlDocument) -> NodeModels {
    let mut models = NodeModels::new();
    let Some(root) = document.root() else {
        return models;
    };

    if let Some(model_root) = root.first_child_element("TreeNodesModel") {
        for child in model_root.child_elements() {
            let model = extract_node_model(child);
            if model.is_undefined() {
                debug!("ignoring <{}> inside TreeNodesModel", child.tag());
                continue;
            }
            models.insert(model.registration_id.clone(), model);
        }
    }

    for bt_root in root.child_elements().filter(|e| e.tag() == "BehaviorTree") {
        for child in bt_root.child_elements() {
            if child.tag() == "Root" {
                // Synthetic wrapper emitted by older versions of the editor.
                for grandchild in child.child_elements() {
                    discover_models(grandchild, &mut models);
                }
            } else {
                discover_models(child, &mut models);
            }
        }
    }

    models
}

fn discover_models(element: &XmlElement, models: &mut NodeModels) {
    let mut model = extract_node_model(element);
    if model.is_undefined()
        && let Some(id) = element.attribute("ID").filter(|id| !id.is_empty())
    {
        // A custom tag used directly in a tree body. There is no
        // declaration to consult, so it registers as an action, with its
        // attributes as ports like any other in-tree node element.
        model = NodeModel::new(NodeType::Action, id);
        for (name, _value) in element.attributes() {
            if name != "ID" && name != "name" {
                model.add_port(name.clone(), PortModel::new(PortDirection::InOut));
            }
        }
    }
    if !model.is_undefined()
        && !model.registration_id.is_empty()
        && !models.contains_key(&model.registration_id)
    {
        debug!("discovered node model '{}' from a tree body", model.registration_id);
        models.insert(model.registration_id.clone(), model);
    }

    for child in element.child_elements() {
        discover_models(child, models);
    }
}

/// Reads a palette file: a `<root>` document whose node models all live in
/// one `<TreeNodesModel>` section.
///
/// Unlike [`extract_registry`], the expected shape is enforced: a missing
/// `<root>` or `<TreeNodesModel>` is an error, not an empty result.
pub fn read_palette(document: &XmlDocument) -> Result<NodeModels, BtXmlError> {
    let root = document
        .root()
        .filter(|root| root.tag() == "root")
        .ok_or(BtXmlError::MissingElement { element: "root" })?;

    let model_root = root
        .first_child_element("TreeNodesModel")
        .ok_or(BtXmlError::MissingElement {
            element: "TreeNodesModel",
        })?;

    let mut models = NodeModels::new();
    for child in model_root.child_elements() {
        let model = extract_node_model(child);
        if model.is_undefined() {
            debug!("ignoring <{}> inside palette TreeNodesModel", child.tag());
            continue;
        }
        models.insert(model.registration_id.clone(), model);
    }
    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> XmlDocument {
        XmlDocument::parse(xml).unwrap()
    }

    #[test]
    fn test_extract_uses_tag_as_fallback_identifier() {
        let doc = parse(r#"<Action server_name="/move"/>"#);
        let model = extract_node_model(doc.root().unwrap());
        assert_eq!(model.registration_id, "Action");
        assert_eq!(model.node_type, NodeType::Action);
        assert_eq!(model.ports["server_name"].direction, PortDirection::InOut);
    }

    #[test]
    fn test_extract_identity_attributes_are_not_ports() {
        let doc = parse(r#"<Action ID="MoveBase" name="go_home" goal="kitchen"/>"#);
        let model = extract_node_model(doc.root().unwrap());
        assert_eq!(model.registration_id, "MoveBase");
        assert_eq!(model.ports.len(), 1);
        assert!(model.ports.contains_key("goal"));
    }

    #[test]
    fn test_extract_explicit_port_declarations() {
        let doc = parse(
            r#"<Action ID="MoveBase">
                <input_port name="goal" type="Pose2D" default="0;0;0">Target pose</input_port>
                <output_port name="feedback"/>
                <inout_port name="shared"/>
            </Action>"#,
        );
        let model = extract_node_model(doc.root().unwrap());

        let goal = &model.ports["goal"];
        assert_eq!(goal.direction, PortDirection::Input);
        assert_eq!(goal.type_name.as_deref(), Some("Pose2D"));
        assert_eq!(goal.default_value.as_deref(), Some("0;0;0"));
        assert_eq!(goal.description.as_deref(), Some("Target pose"));

        let feedback = &model.ports["feedback"];
        assert_eq!(feedback.direction, PortDirection::Output);
        assert_eq!(feedback.type_name, None);
        assert_eq!(feedback.default_value, None);
        assert_eq!(feedback.description, None);

        // Legacy convention: inout declarations load as Input.
        assert_eq!(model.ports["shared"].direction, PortDirection::Input);
    }

    #[test]
    fn test_extract_first_write_wins() {
        let doc = parse(r#"<Foo bar="1"><input_port name="bar" type="int"/></Foo>"#);
        // <Foo> is not a node tag; use a recognized one for the same shape.
        assert!(extract_node_model(doc.root().unwrap()).is_undefined());

        let doc = parse(r#"<Action bar="1"><input_port name="bar" type="int"/></Action>"#);
        let model = extract_node_model(doc.root().unwrap());
        let bar = &model.ports["bar"];
        assert_eq!(bar.direction, PortDirection::InOut);
        assert_eq!(bar.type_name, None);
    }

    #[test]
    fn test_extract_skips_unnamed_port_declaration() {
        let doc = parse(r#"<Action ID="MoveBase"><input_port type="int"/></Action>"#);
        let model = extract_node_model(doc.root().unwrap());
        assert!(model.ports.is_empty());
    }

    #[test]
    fn test_extract_unknown_tag_is_undefined() {
        let doc = parse("<Frobnicate/>");
        let model = extract_node_model(doc.root().unwrap());
        assert!(model.is_undefined());
        assert!(model.registration_id.is_empty());
    }

    #[test]
    fn test_registry_reads_tree_nodes_model_section() {
        let doc = parse(
            r#"<root>
                <TreeNodesModel>
                    <Action ID="MoveBase">
                        <input_port name="goal"/>
                    </Action>
                    <Condition ID="BatteryOk"/>
                    <Frobnicate ID="Ignored"/>
                </TreeNodesModel>
            </root>"#,
        );
        let models = extract_registry(&doc);
        assert_eq!(models.len(), 2);
        assert_eq!(models["MoveBase"].node_type, NodeType::Action);
        assert_eq!(models["BatteryOk"].node_type, NodeType::Condition);
        assert!(!models.contains_key("Ignored"));
    }

    #[test]
    fn test_registry_later_declaration_wins() {
        let doc = parse(
            r#"<root>
                <TreeNodesModel>
                    <Action ID="MoveBase"><input_port name="goal"/></Action>
                    <Condition ID="MoveBase"/>
                </TreeNodesModel>
            </root>"#,
        );
        let models = extract_registry(&doc);
        assert_eq!(models["MoveBase"].node_type, NodeType::Condition);
    }

    #[test]
    fn test_registry_discovers_undeclared_custom_node_once() {
        let doc = parse(
            r#"<root>
                <BehaviorTree ID="Main">
                    <Sequence>
                        <MyAction ID="foo" extra="port"/>
                        <MyAction ID="foo"/>
                    </Sequence>
                </BehaviorTree>
            </root>"#,
        );
        let models = extract_registry(&doc);
        assert_eq!(models.len(), 1);
        let foo = &models["foo"];
        assert_eq!(foo.node_type, NodeType::Action);
        assert!(foo.ports.contains_key("extra"));
    }

    #[test]
    fn test_registry_ignores_unknown_tag_without_id() {
        let doc = parse(
            r#"<root>
                <BehaviorTree ID="Main">
                    <Frobnicate/>
                </BehaviorTree>
            </root>"#,
        );
        assert!(extract_registry(&doc).is_empty());
    }

    #[test]
    fn test_registry_discovery_does_not_overwrite_declaration() {
        let doc = parse(
            r#"<root>
                <TreeNodesModel>
                    <Action ID="MoveBase"><input_port name="goal" type="Pose2D"/></Action>
                </TreeNodesModel>
                <BehaviorTree ID="Main">
                    <Action ID="MoveBase" goal="kitchen" speed="fast"/>
                </BehaviorTree>
            </root>"#,
        );
        let models = extract_registry(&doc);
        let model = &models["MoveBase"];
        // The declared model survives; the attribute-derived one is ignored.
        assert_eq!(model.ports.len(), 1);
        assert_eq!(model.ports["goal"].type_name.as_deref(), Some("Pose2D"));
    }

    #[test]
    fn test_registry_skips_synthetic_root_wrapper() {
        let doc = parse(
            r#"<root>
                <BehaviorTree>
                    <Root>
                        <Action ID="Discovered"/>
                    </Root>
                </BehaviorTree>
            </root>"#,
        );
        let models = extract_registry(&doc);
        assert_eq!(models.len(), 1);
        assert!(models.contains_key("Discovered"));
        assert!(!models.contains_key("Root"));
    }

    #[test]
    fn test_read_palette_requires_expected_shape() {
        let doc = parse("<root><BehaviorTree/></root>");
        assert!(matches!(
            read_palette(&doc),
            Err(BtXmlError::MissingElement {
                element: "TreeNodesModel"
            })
        ));

        let doc = parse("<notroot><TreeNodesModel/></notroot>");
        assert!(matches!(
            read_palette(&doc),
            Err(BtXmlError::MissingElement { element: "root" })
        ));

        let doc = parse(
            r#"<root><TreeNodesModel><Action ID="MoveBase"/></TreeNodesModel></root>"#,
        );
        let models = read_palette(&doc).unwrap();
        assert_eq!(models.len(), 1);
    }
}
