use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;

use crate::error::TreeError;

/// Identifier for one message node. Allocated from 1 upwards and never reused.
pub type NodeId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TreeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" => Err(TreeError::invalid_input("role must not be empty")),
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(TreeError::invalid_input(format!("unknown role '{other}'"))),
        }
    }
}

/// One message in the conversation history.
///
/// Every field except `children` is fixed at creation. `children` only grows,
/// in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageNode {
    pub id: NodeId,
    pub role: Role,
    pub content: String,
    pub timestamp: OffsetDateTime,
    pub parent_id: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl MessageNode {
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether the renderer shows this node. Blank content is hidden but its
    /// descendants are not.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.content.trim().is_empty()
    }
}
