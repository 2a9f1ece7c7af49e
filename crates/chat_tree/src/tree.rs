use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::TreeError;
use crate::node::{MessageNode, NodeId, Role};

/// Append-only arena of message nodes plus root ordering and the selection.
#[derive(Clone)]
pub struct ConversationTree {
    pub(crate) nodes: HashMap<NodeId, MessageNode>,
    pub(crate) roots: Vec<NodeId>,
    pub(crate) selection: Option<NodeId>,
    next_id: NodeId,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for ConversationTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationTree")
            .field("len", &self.nodes.len())
            .field("roots", &self.roots)
            .field("selection", &self.selection)
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl Default for ConversationTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationTree {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::detect()))
    }

    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            selection: None,
            next_id: 1,
            clock,
        }
    }

    /// Records a new message and returns its id.
    ///
    /// The node is appended to `parent_id`'s children, or to the root sequence
    /// when no parent is given. A parent that does not exist is rejected and no
    /// id is consumed.
    pub fn create_node(
        &mut self,
        role: Role,
        content: impl Into<String>,
        parent_id: Option<NodeId>,
    ) -> Result<NodeId, TreeError> {
        let content = content.into();
        if content.is_empty() {
            return Err(TreeError::invalid_input("message content must not be empty"));
        }

        if let Some(parent_id) = parent_id {
            if !self.nodes.contains_key(&parent_id) {
                return Err(TreeError::OrphanReference { parent_id });
            }
        }

        let id = self.next_id;
        self.next_id += 1;

        let node = MessageNode {
            id,
            role,
            content,
            timestamp: self.clock.now(),
            parent_id,
            children: Vec::new(),
        };
        self.nodes.insert(id, node);

        match parent_id.and_then(|parent_id| self.nodes.get_mut(&parent_id)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }

        tracing::debug!(id, role = %role, parent_id = ?parent_id, "node created");
        Ok(id)
    }

    /// Applies an edit by forking a sibling of `id` with the same role and parent.
    ///
    /// Returns `Ok(None)` when `new_content` matches the existing content; the
    /// tree and selection are left as they were. On a fork the new node becomes
    /// the selection.
    pub fn edit_node(
        &mut self,
        id: NodeId,
        new_content: impl Into<String>,
    ) -> Result<Option<NodeId>, TreeError> {
        let new_content = new_content.into();
        let (role, parent_id) = {
            let original = self.node(id).ok_or_else(|| TreeError::unknown_node(id))?;
            if original.content == new_content {
                return Ok(None);
            }
            (original.role, original.parent_id)
        };

        let new_id = self.create_node(role, new_content, parent_id)?;
        self.selection = Some(new_id);
        tracing::debug!(original = id, forked = new_id, "edit forked a sibling");
        Ok(Some(new_id))
    }

    /// Moves the selection. Unknown ids are rejected and the selection is kept.
    pub fn select(&mut self, id: Option<NodeId>) -> Result<(), TreeError> {
        if let Some(id) = id {
            if !self.nodes.contains_key(&id) {
                return Err(TreeError::unknown_node(id));
            }
        }

        self.selection = id;
        Ok(())
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<NodeId> {
        self.selection
    }

    #[must_use]
    pub fn selected(&self) -> Option<&MessageNode> {
        self.selection.and_then(|id| self.nodes.get(&id))
    }

    #[must_use]
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection == Some(id)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&MessageNode> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of `id` in creation order; empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(MessageNode::children)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in id order, which is also creation order.
    pub fn iter(&self) -> impl Iterator<Item = &MessageNode> + '_ {
        let mut ids = self.nodes.keys().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids.into_iter().filter_map(move |id| self.nodes.get(&id))
    }

    /// The sequence `id` belongs to: its parent's children, or the roots.
    pub(crate) fn siblings_of(&self, id: NodeId) -> Option<&[NodeId]> {
        let node = self.nodes.get(&id)?;
        match node.parent_id {
            Some(parent_id) => self.nodes.get(&parent_id).map(MessageNode::children),
            None => Some(&self.roots),
        }
    }
}
