use thiserror::Error;

use crate::node::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("parent node {parent_id} does not exist")]
    OrphanReference { parent_id: NodeId },
}

impl TreeError {
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    #[must_use]
    pub fn unknown_node(id: NodeId) -> Self {
        Self::InvalidInput(format!("node {id} does not exist"))
    }
}
