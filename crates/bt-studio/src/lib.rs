// crates/bt-studio/src/lib.rs

#![doc = "Core data model for the behavior-tree editor."]
#![doc = ""]
#![doc = "This crate defines the value types shared by every other component:"]
#![doc = "node definitions (`NodeModel`), port declarations (`PortModel`), the"]
#![doc = "built-in node vocabulary, and the abstract behavior tree"]
#![doc = "(`AbsBehaviorTree`) that a front-end owns and mutates."]
#![doc = ""]
#![doc = "XML persistence lives in the companion `bt-studio-xml` crate."]

// --- Foundation Modules ---
pub mod model;
pub mod tree;

// --- Top-level Exports ---
pub use model::{
    NodeModel, NodeModels, NodeType, PortDirection, PortModel, PortModels,
    default_builtin_models, register_model,
};
pub use tree::{AbsBehaviorTree, AbsNode, NodeKind};
