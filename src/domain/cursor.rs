//! Cursor navigation
//!
//! The cursor is a plain [`NodeId`] owned by the caller. Every operation takes
//! the current value and returns the next one; none of them mutate the tree.
//! Moving past either end of a line is a no-op.

use tracing::instrument;

use crate::domain::arena::{NodeId, VariationTree};

/// Where a cursor sits in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    AtRoot,
    Internal,
    AtLeaf,
}

impl VariationTree {
    /// The parent, or `cursor` itself at the root.
    #[instrument(level = "trace", skip(self))]
    pub fn step_back(&self, cursor: NodeId) -> NodeId {
        self.parent(cursor).unwrap_or(cursor)
    }

    /// The main-line child, or `cursor` itself at a leaf. Never enters a side variation.
    #[instrument(level = "trace", skip(self))]
    pub fn step_forward(&self, cursor: NodeId) -> NodeId {
        self.children(cursor).first().copied().unwrap_or(cursor)
    }

    pub fn go_to_start(&self, cursor: NodeId) -> NodeId {
        self.top_of_line(cursor)
    }

    pub fn go_to_end(&self, cursor: NodeId) -> NodeId {
        self.bottom_of_line(cursor)
    }

    /// Move to an arbitrary node, if it belongs to this tree.
    pub fn jump(&self, target: NodeId) -> Option<NodeId> {
        self.contains(target).then_some(target)
    }

    /// A lone root counts as `AtRoot`.
    pub fn cursor_state(&self, cursor: NodeId) -> CursorState {
        if self.parent(cursor).is_none() {
            CursorState::AtRoot
        } else if self.children(cursor).is_empty() {
            CursorState::AtLeaf
        } else {
            CursorState::Internal
        }
    }
}
