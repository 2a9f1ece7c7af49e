use std::str::FromStr;

use crate::error::TreeError;
use crate::node::NodeId;
use crate::tree::ConversationTree;

/// Cursor movement through the tree.
///
/// `Up`/`Down` stay within one sibling sequence; `Left`/`Right` are the only
/// way to change depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Initial,
    Up,
    Down,
    Left,
    Right,
}

impl FromStr for Direction {
    type Err = TreeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "initial" => Ok(Self::Initial),
            "up" | "k" => Ok(Self::Up),
            "down" | "j" => Ok(Self::Down),
            "left" | "h" => Ok(Self::Left),
            "right" | "l" => Ok(Self::Right),
            other => Err(TreeError::invalid_input(format!(
                "unknown direction '{other}'"
            ))),
        }
    }
}

impl ConversationTree {
    /// Answers where `direction` leads from `current` without moving anything.
    ///
    /// Returning `current` itself means there was nowhere to go. `None` means
    /// the tree is empty (with no `current`) or `current` does not exist.
    #[must_use]
    pub fn next_node(&self, current: Option<NodeId>, direction: Direction) -> Option<NodeId> {
        let Some(current) = current else {
            return self.roots.first().copied();
        };
        let node = self.node(current)?;

        match direction {
            Direction::Initial => Some(current),
            Direction::Down | Direction::Up => {
                let siblings = self.siblings_of(current)?;
                let index = siblings.iter().position(|id| *id == current)?;
                let target = if direction == Direction::Down {
                    siblings.get(index + 1)
                } else {
                    index.checked_sub(1).and_then(|prev| siblings.get(prev))
                };
                Some(target.copied().unwrap_or(current))
            }
            Direction::Right => Some(node.children().first().copied().unwrap_or(current)),
            Direction::Left => Some(node.parent_id.unwrap_or(current)),
        }
    }

    /// Moves the selection one step and returns the new selection.
    ///
    /// With nothing selected any direction lands on the first root.
    pub fn move_selection(&mut self, direction: Direction) -> Option<NodeId> {
        if let Some(target) = self.next_node(self.selection, direction) {
            self.selection = Some(target);
        }
        self.selection
    }
}
