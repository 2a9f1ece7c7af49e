use std::collections::HashSet;

use time::OffsetDateTime;

use crate::node::{MessageNode, NodeId, Role};
use crate::tree::ConversationTree;

pub const PLACEHOLDER_TEXT: &str = "No messages yet. Type a message below to start.";
pub const PREVIEW_MAX_CHARS: usize = 50;

const SELECTED_MARKER: &str = "> ";
const UNSELECTED_MARKER: &str = "  ";
const ROOT_GLYPH: &str = "* ";
const INDENT_UNIT: &str = "   ";
const BRANCH_CONNECTOR: &str = "├─ ";
const LAST_CONNECTOR: &str = "└─ ";
const ELLIPSIS: &str = "...";

/// One row of the tree view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    /// `None` only for the empty-tree placeholder.
    pub node_id: Option<NodeId>,
    pub depth: usize,
    pub is_last: bool,
    pub selected: bool,
    pub text: String,
}

impl DisplayLine {
    fn placeholder() -> Self {
        Self {
            node_id: None,
            depth: 0,
            is_last: true,
            selected: false,
            text: PLACEHOLDER_TEXT.to_string(),
        }
    }
}

struct Pending {
    id: NodeId,
    depth: usize,
    /// Nearest visible ancestor; lines sharing it are drawn as siblings.
    visible_parent: Option<NodeId>,
}

/// Projects the tree into display lines in pre-order.
///
/// Blank nodes produce no line; their children take the depth the blank node
/// would have used and join the blank node's visible siblings. `is_last` marks
/// the last emitted line of each sibling run. Selection only flips the marker
/// of the matching line.
#[must_use]
pub fn render(tree: &ConversationTree) -> Vec<DisplayLine> {
    let visible = visible_pre_order(tree);

    let mut is_last = vec![false; visible.len()];
    let mut closed_runs = HashSet::new();
    for (index, entry) in visible.iter().enumerate().rev() {
        is_last[index] = closed_runs.insert(entry.visible_parent);
    }

    let mut lines = visible
        .into_iter()
        .zip(is_last)
        .filter_map(|(Pending { id, depth, .. }, is_last)| {
            let node = tree.node(id)?;
            let selected = tree.is_selected(id);
            Some(DisplayLine {
                node_id: Some(id),
                depth,
                is_last,
                selected,
                text: format_line(node, depth, is_last, selected),
            })
        })
        .collect::<Vec<_>>();

    if lines.is_empty() {
        lines.push(DisplayLine::placeholder());
    }
    lines
}

fn visible_pre_order(tree: &ConversationTree) -> Vec<Pending> {
    let mut visible = Vec::with_capacity(tree.len());
    let mut stack = Vec::new();
    push_children(&mut stack, tree.roots(), 0, None);

    while let Some(pending) = stack.pop() {
        let Some(node) = tree.node(pending.id) else {
            continue;
        };

        if node.is_visible() {
            push_children(&mut stack, node.children(), pending.depth + 1, Some(pending.id));
            visible.push(pending);
        } else {
            push_children(
                &mut stack,
                node.children(),
                pending.depth,
                pending.visible_parent,
            );
        }
    }
    visible
}

fn push_children(
    stack: &mut Vec<Pending>,
    ids: &[NodeId],
    depth: usize,
    visible_parent: Option<NodeId>,
) {
    for id in ids.iter().rev() {
        stack.push(Pending {
            id: *id,
            depth,
            visible_parent,
        });
    }
}

fn format_line(node: &MessageNode, depth: usize, is_last: bool, selected: bool) -> String {
    let marker = if selected {
        SELECTED_MARKER
    } else {
        UNSELECTED_MARKER
    };
    format!(
        "{marker}{prefix}{id:04} {label:<4} {time} {preview}",
        prefix = tree_prefix(depth, is_last),
        id = node.id,
        label = role_label(node.role),
        time = format_time_of_day(node.timestamp),
        preview = preview(&node.content),
    )
}

fn tree_prefix(depth: usize, is_last: bool) -> String {
    if depth == 0 {
        return ROOT_GLYPH.to_string();
    }

    let connector = if is_last {
        LAST_CONNECTOR
    } else {
        BRANCH_CONNECTOR
    };
    format!("{}{connector}", INDENT_UNIT.repeat(depth - 1))
}

#[must_use]
pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Assistant => "Asst",
        Role::System => "Sys",
    }
}

#[must_use]
pub fn format_time_of_day(timestamp: OffsetDateTime) -> String {
    format!("{:02}:{:02}", timestamp.hour(), timestamp.minute())
}

/// Single-line preview: line breaks fold to spaces, then the first
/// [`PREVIEW_MAX_CHARS`] characters with an ellipsis when cut.
#[must_use]
pub fn preview(content: &str) -> String {
    let flat = content
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect::<String>();

    match flat.char_indices().nth(PREVIEW_MAX_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &flat[..cut]),
        None => flat,
    }
}
