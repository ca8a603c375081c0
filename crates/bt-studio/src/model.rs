// crates/bt-studio/src/model.rs

//! Node and port definitions.
//!
//! A [`NodeModel`] describes one *kind* of behavior-tree node: its type, its
//! registration ID (the identifier used to reference it in XML), and its
//! declared ports. Models are immutable value records: editing a model means
//! removing the old registry entry and inserting a new one, never mutating
//! in place.

use log::{debug, warn};
use std::collections::BTreeMap;
use std::fmt;

// --- Port Model ---

/// Data-flow direction of a single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
    InOut,
}

/// One declared (or inferred) port of a node.
///
/// The optional fields distinguish "not set" from "explicitly empty": only
/// fields that are `Some` are written back as XML attributes, so a port
/// declared without a `default` never gains a spurious `default=""` on
/// re-serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortModel {
    pub direction: PortDirection,
    /// `@type`
    pub type_name: Option<String>,
    /// `@default`
    pub default_value: Option<String>,
    /// Free text taken from the declaration element body.
    pub description: Option<String>,
}

impl PortModel {
    pub fn new(direction: PortDirection) -> Self {
        PortModel {
            direction,
            type_name: None,
            default_value: None,
            description: None,
        }
    }
}

impl Default for PortModel {
    fn default() -> Self {
        PortModel::new(PortDirection::InOut)
    }
}

/// Ports of a node, keyed by port name.
pub type PortModels = BTreeMap<String, PortModel>;

// --- Node Model ---

/// Kind of a behavior-tree node.
///
/// `Undefined` marks a tag that is not part of the node vocabulary at all;
/// such values are never inserted into a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeType {
    Action,
    Condition,
    Control,
    Decorator,
    SubTree,
    #[default]
    Undefined,
}

impl NodeType {
    /// Maps an XML tag name onto a node type.
    ///
    /// The five generic tags map to themselves; the tags of built-in nodes
    /// map to the type of that built-in. Any other tag is `Undefined`.
    pub fn from_tag(tag: &str) -> NodeType {
        match tag {
            "Action" => NodeType::Action,
            "Condition" => NodeType::Condition,
            "Control" => NodeType::Control,
            "Decorator" => NodeType::Decorator,
            "SubTree" => NodeType::SubTree,
            "Sequence" | "SequenceStar" | "Fallback" | "FallbackStar" | "ReactiveSequence"
            | "ReactiveFallback" | "Parallel" | "IfThenElse" | "WhileDoElse" => NodeType::Control,
            "Inverter" | "ForceSuccess" | "ForceFailure" | "Repeat" | "RetryUntilSuccessful"
            | "Timeout" | "Delay" | "BlackboardCheckInt" | "BlackboardCheckDouble"
            | "BlackboardCheckString" => NodeType::Decorator,
            "AlwaysSuccess" | "AlwaysFailure" | "SetBlackboard" => NodeType::Action,
            _ => NodeType::Undefined,
        }
    }

    /// The generic XML tag for this type. Used when a node is serialized
    /// with an explicit `ID` attribute instead of its own tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Action => "Action",
            NodeType::Condition => "Condition",
            NodeType::Control => "Control",
            NodeType::Decorator => "Decorator",
            NodeType::SubTree => "SubTree",
            NodeType::Undefined => "Undefined",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node definition: type, registration ID, and declared ports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeModel {
    pub node_type: NodeType,
    /// Unique identifier used as the XML tag (built-ins) or as the `ID`
    /// attribute (custom nodes).
    pub registration_id: String,
    pub ports: PortModels,
}

impl NodeModel {
    pub fn new(node_type: NodeType, registration_id: impl Into<String>) -> Self {
        NodeModel {
            node_type,
            registration_id: registration_id.into(),
            ports: PortModels::new(),
        }
    }

    /// A non-model: the result of looking at a tag outside the vocabulary.
    pub fn is_undefined(&self) -> bool {
        self.node_type == NodeType::Undefined
    }

    /// Inserts a port, keeping any port already registered under `name`.
    ///
    /// First-write-wins is a compatibility contract: when a node instance
    /// carries both an attribute-derived port and an explicit declaration
    /// element with the same name, the attribute-derived one (inserted
    /// first) is kept and the declaration is discarded.
    pub fn add_port(&mut self, name: impl Into<String>, port: PortModel) {
        self.ports.entry(name.into()).or_insert(port);
    }

    fn with_ports<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = (S, PortModel)>,
        S: Into<String>,
    {
        for (name, port) in ports {
            self.add_port(name, port);
        }
        self
    }
}

/// Known-node registry, keyed by registration ID.
pub type NodeModels = BTreeMap<String, NodeModel>;

/// Inserts `model` into a registry, replacing any previous entry with the
/// same registration ID. Undefined or anonymous models are refused.
///
/// Returns `true` if the model was inserted.
pub fn register_model(models: &mut NodeModels, model: NodeModel) -> bool {
    if model.is_undefined() || model.registration_id.is_empty() {
        warn!(
            "refusing to register model '{}' of type {}",
            model.registration_id, model.node_type
        );
        return false;
    }
    if let Some(previous) = models.insert(model.registration_id.clone(), model) {
        debug!("replaced node model '{}'", previous.registration_id);
    }
    true
}

// --- Built-in Vocabulary ---

/// The node models every editor session starts with.
///
/// Built-ins are serialized under their own tag rather than a generic tag
/// with an `ID` attribute; components that need to make that distinction
/// (the XML builder, palette export) receive this set as an argument, so
/// there is no process-wide registry.
pub fn default_builtin_models() -> NodeModels {
    let mut models = NodeModels::new();

    let input = |type_name: &str| {
        let mut port = PortModel::new(PortDirection::Input);
        port.type_name = Some(type_name.to_string());
        port
    };
    let output = |type_name: &str| {
        let mut port = PortModel::new(PortDirection::Output);
        port.type_name = Some(type_name.to_string());
        port
    };

    let defs = [
        // The synthetic wrapper element at the top of every document. It is
        // outside the tag vocabulary on purpose: it must never be extracted
        // as a usable node definition.
        NodeModel::new(NodeType::Undefined, "Root"),
        NodeModel::new(NodeType::SubTree, "SubTree"),
        // Controls
        NodeModel::new(NodeType::Control, "Sequence"),
        NodeModel::new(NodeType::Control, "SequenceStar"),
        NodeModel::new(NodeType::Control, "Fallback"),
        NodeModel::new(NodeType::Control, "FallbackStar"),
        NodeModel::new(NodeType::Control, "ReactiveSequence"),
        NodeModel::new(NodeType::Control, "ReactiveFallback"),
        NodeModel::new(NodeType::Control, "IfThenElse"),
        NodeModel::new(NodeType::Control, "WhileDoElse"),
        NodeModel::new(NodeType::Control, "Parallel").with_ports([
            ("success_threshold", input("int")),
            ("failure_threshold", input("int")),
        ]),
        // Decorators
        NodeModel::new(NodeType::Decorator, "Inverter"),
        NodeModel::new(NodeType::Decorator, "ForceSuccess"),
        NodeModel::new(NodeType::Decorator, "ForceFailure"),
        NodeModel::new(NodeType::Decorator, "Repeat")
            .with_ports([("num_cycles", input("int"))]),
        NodeModel::new(NodeType::Decorator, "RetryUntilSuccessful")
            .with_ports([("num_attempts", input("int"))]),
        NodeModel::new(NodeType::Decorator, "Timeout").with_ports([("msec", input("unsigned"))]),
        NodeModel::new(NodeType::Decorator, "Delay")
            .with_ports([("delay_msec", input("unsigned"))]),
        NodeModel::new(NodeType::Decorator, "BlackboardCheckInt").with_ports([
            ("value_A", input("int")),
            ("value_B", input("int")),
            ("return_on_mismatch", input("NodeStatus")),
        ]),
        NodeModel::new(NodeType::Decorator, "BlackboardCheckDouble").with_ports([
            ("value_A", input("double")),
            ("value_B", input("double")),
            ("return_on_mismatch", input("NodeStatus")),
        ]),
        NodeModel::new(NodeType::Decorator, "BlackboardCheckString").with_ports([
            ("value_A", input("string")),
            ("value_B", input("string")),
            ("return_on_mismatch", input("NodeStatus")),
        ]),
        // Actions
        NodeModel::new(NodeType::Action, "AlwaysSuccess"),
        NodeModel::new(NodeType::Action, "AlwaysFailure"),
        NodeModel::new(NodeType::Action, "SetBlackboard").with_ports([
            ("value", input("string")),
            ("output_key", output("string")),
        ]),
    ];

    for model in defs {
        models.insert(model.registration_id.clone(), model);
    }
    models
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_vocabulary() {
        assert_eq!(NodeType::from_tag("Action"), NodeType::Action);
        assert_eq!(NodeType::from_tag("Sequence"), NodeType::Control);
        assert_eq!(NodeType::from_tag("Inverter"), NodeType::Decorator);
        assert_eq!(NodeType::from_tag("SetBlackboard"), NodeType::Action);
        assert_eq!(NodeType::from_tag("SubTree"), NodeType::SubTree);
        assert_eq!(NodeType::from_tag("Frobnicate"), NodeType::Undefined);
        // The synthetic wrapper is not a node kind.
        assert_eq!(NodeType::from_tag("Root"), NodeType::Undefined);
    }

    #[test]
    fn test_add_port_first_write_wins() {
        let mut model = NodeModel::new(NodeType::Action, "MoveBase");
        model.add_port("goal", PortModel::new(PortDirection::InOut));

        let mut declared = PortModel::new(PortDirection::Input);
        declared.type_name = Some("Pose2D".to_string());
        model.add_port("goal", declared);

        let port = &model.ports["goal"];
        assert_eq!(port.direction, PortDirection::InOut);
        assert_eq!(port.type_name, None);
    }

    #[test]
    fn test_register_model_refuses_undefined() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut models = NodeModels::new();
        assert!(!register_model(&mut models, NodeModel::default()));
        assert!(!register_model(
            &mut models,
            NodeModel::new(NodeType::Action, "")
        ));
        assert!(register_model(
            &mut models,
            NodeModel::new(NodeType::Action, "MoveBase")
        ));
        assert_eq!(models.len(), 1);
    }

    #[test]
    fn test_register_model_replaces_wholesale() {
        let mut models = NodeModels::new();
        let mut first = NodeModel::new(NodeType::Action, "MoveBase");
        first.add_port("goal", PortModel::new(PortDirection::Input));
        register_model(&mut models, first);

        let second = NodeModel::new(NodeType::Condition, "MoveBase");
        register_model(&mut models, second);

        let model = &models["MoveBase"];
        assert_eq!(model.node_type, NodeType::Condition);
        assert!(model.ports.is_empty());
    }

    #[test]
    fn test_builtins_contain_their_own_tags() {
        let builtins = default_builtin_models();
        for (id, model) in &builtins {
            assert_eq!(id, &model.registration_id);
            if id != "Root" {
                assert_ne!(model.node_type, NodeType::Undefined, "builtin {}", id);
            }
        }
        assert!(builtins.contains_key("Sequence"));
        assert!(builtins.contains_key("SubTree"));
    }
}
