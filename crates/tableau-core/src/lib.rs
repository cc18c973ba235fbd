// crates/tableau-core/src/lib.rs
pub mod action;
pub mod easing;
pub mod events;
pub mod layout;
pub mod node;
pub mod resources;
pub mod tick;
pub mod transform;
pub mod tree;

pub use action::*;
pub use easing::*;
pub use events::*;
pub use layout::*;
pub use node::*;
pub use resources::*;
pub use tick::*;
pub use transform::*;
pub use tree::*;

/// Fatal errors raised by the node tree. Each one is an authoring mistake:
/// the activity that hit it should be aborted, not patched up.
#[derive(Debug, thiserror::Error)]
pub enum TableauError {
    #[error("Duplicate name '{name}' among the children of '{parent}'")]
    DuplicateName { name: String, parent: String },

    #[error("Scene '{0}' cannot be the child of another node")]
    SceneNotRoot(String),

    #[error("Node '{0}' cannot be attached beneath its own descendant")]
    CyclicAttachment(String),

    #[error("Node '{0}' is not a scene")]
    NotAScene(String),

    #[error("Constraint alter '{alter}' of node '{node}' not found in its scene")]
    AlterNotFound { node: String, alter: String },

    #[error("Malformed constraint on node '{node}': {reason}")]
    MalformedConstraint { node: String, reason: String },

    #[error("Scene not registered: {0}")]
    SceneNotRegistered(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node id {0} is already in the tree")]
    NodeIdInUse(NodeId),

    #[error("Resource '{resource}' required by node '{node}' is not loaded")]
    ResourceNotFound { node: String, resource: String },
}

pub type Result<T> = std::result::Result<T, TableauError>;
