//! Branching conversation history.
//!
//! Messages live in an append-only arena keyed by integer id. Editing a message
//! never rewrites it: the edit forks a sibling with the same role and parent, so
//! every earlier variant stays reachable by navigation.
//!
//! The crate is split along the same seams the UI shell drives it through:
//! - [`ConversationTree`] owns nodes, root ordering, and the single selection.
//! - [`ConversationTree::next_node`] answers directional-navigation queries.
//! - [`ConversationTree::edit_node`] applies the branch-on-edit policy.
//! - [`render`] projects the tree into display lines without touching it.

mod clock;
mod error;
mod navigation;
mod node;
mod render;
mod tree;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::TreeError;
pub use navigation::Direction;
pub use node::{MessageNode, NodeId, Role};
pub use render::{
    format_time_of_day, preview, render, role_label, DisplayLine, PLACEHOLDER_TEXT,
    PREVIEW_MAX_CHARS,
};
pub use tree::ConversationTree;
