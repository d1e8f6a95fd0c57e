//! Arena-backed variation tree
//!
//! Nodes live in a generational arena and refer to each other by index. Parent
//! links are plain indices, so dropping the tree never needs cycle breaking, and a
//! handle that outlived a reset resolves to nothing instead of a new node.

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, TreeResult};
use crate::domain::position::{PlayedMove, Position};

/// Stable handle of a node. Valid until the tree is reset.
pub type NodeId = Index;

/// One position in the game tree.
#[derive(Debug, Clone)]
pub struct VariationNode {
    /// Position after `mv` was played from the parent's position
    pub position: Position,
    /// Move that led here, None only for the root
    pub mv: Option<PlayedMove>,
    /// Index of the parent node, None for the root
    pub parent: Option<NodeId>,
    /// Continuations in insertion order; the first one is the main line
    pub children: Vec<NodeId>,
}

impl VariationNode {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn main_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }
}

/// A game and all explored alternatives, rooted at the session's starting position.
///
/// The tree only grows: nodes are appended under an existing parent and sibling
/// order never changes. The one destructive operation is [`VariationTree::reset`].
#[derive(Debug)]
pub struct VariationTree {
    arena: Arena<VariationNode>,
    root: NodeId,
}

impl VariationTree {
    pub fn new(start: Position) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(VariationNode {
            position: start,
            mv: None,
            parent: None,
            children: Vec::new(),
        });
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get(&self, idx: NodeId) -> Option<&VariationNode> {
        self.arena.get(idx)
    }

    /// Like [`get`](Self::get) but fails with `UnknownNode`.
    pub fn node(&self, idx: NodeId) -> TreeResult<&VariationNode> {
        self.arena.get(idx).ok_or(DomainError::UnknownNode)
    }

    pub fn contains(&self, idx: NodeId) -> bool {
        self.arena.contains(idx)
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn position(&self, idx: NodeId) -> Option<&Position> {
        self.get(idx).map(|n| &n.position)
    }

    pub fn parent(&self, idx: NodeId) -> Option<NodeId> {
        self.get(idx).and_then(|n| n.parent)
    }

    /// Children of `idx`, empty for leaves and unknown handles.
    pub fn children(&self, idx: NodeId) -> &[NodeId] {
        self.get(idx).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Create a node under `parent` and append it to the parent's children.
    ///
    /// The caller guarantees `parent` is live and `position` is the replay result.
    #[instrument(level = "trace", skip(self, position, mv))]
    fn create(&mut self, parent: NodeId, position: Position, mv: PlayedMove) -> NodeId {
        let node_idx = self.arena.insert(VariationNode {
            position,
            mv: Some(mv),
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.push(node_idx);
        }
        node_idx
    }

    /// First child of `idx` whose position equals `position`.
    #[instrument(level = "trace", skip(self, position))]
    pub fn find_child(&self, idx: NodeId, position: &Position) -> Option<NodeId> {
        self.children(idx)
            .iter()
            .copied()
            .find(|&child| self.position(child) == Some(position))
    }

    /// Insert the result of playing `mv` at `cursor`.
    ///
    /// Returns the existing child when one already holds `position`; otherwise a
    /// new child is appended after all existing siblings. Inserting the same pair
    /// twice yields the same node.
    #[instrument(level = "debug", skip(self, mv, position), fields(san = %mv.san))]
    pub fn insert_move(
        &mut self,
        cursor: NodeId,
        mv: PlayedMove,
        position: Position,
    ) -> TreeResult<NodeId> {
        if !self.contains(cursor) {
            return Err(DomainError::UnknownNode);
        }
        if let Some(existing) = self.find_child(cursor, &position) {
            debug!("position already explored, reusing child");
            return Ok(existing);
        }
        Ok(self.create(cursor, position, mv))
    }

    /// Ascend parent links to the root. Unknown handles are returned unchanged.
    #[instrument(level = "trace", skip(self))]
    pub fn top_of_line(&self, idx: NodeId) -> NodeId {
        let mut current = idx;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Descend main-line children to a leaf. A leaf returns itself.
    #[instrument(level = "trace", skip(self))]
    pub fn bottom_of_line(&self, idx: NodeId) -> NodeId {
        let mut current = idx;
        while let Some(child) = self.get(current).and_then(VariationNode::main_child) {
            current = child;
        }
        current
    }

    /// Discard every node and start over from `position`.
    ///
    /// Handles into the old tree stop resolving: the arena's generation moves on
    /// with each removal, so the new root never reuses an old handle.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self, position: Position) -> NodeId {
        let dropped = self.arena.len();
        self.arena.retain(|_, _| false);
        self.root = self.arena.insert(VariationNode {
            position,
            mv: None,
            parent: None,
            children: Vec::new(),
        });
        debug!(dropped, "tree reset");
        self.root
    }

    /// Number of nodes on the longest root-to-leaf path.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for &child in self.children(idx) {
                stack.push((child, depth + 1));
            }
        }
        max_depth
    }

    /// All nodes without children, in preorder.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(idx, _)| idx)
            .collect()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Nodes from the root down to `idx` inclusive. Empty for unknown handles.
    pub fn line_to(&self, idx: NodeId) -> Vec<NodeId> {
        if !self.contains(idx) {
            return Vec::new();
        }
        let mut line = vec![idx];
        let mut current = idx;
        while let Some(parent) = self.parent(current) {
            line.push(parent);
            current = parent;
        }
        line.reverse();
        line
    }

    /// The line obtained by following first children from the root.
    pub fn main_line(&self) -> Vec<NodeId> {
        self.line_to(self.bottom_of_line(self.root))
    }

    /// Whether `idx` lies on the main line.
    pub fn is_main_line(&self, idx: NodeId) -> bool {
        let line = self.line_to(idx);
        !line.is_empty()
            && line
                .windows(2)
                .all(|pair| self.children(pair[0]).first() == Some(&pair[1]))
    }

    /// Child indices leading from the root to `idx`.
    pub fn path_of(&self, idx: NodeId) -> Option<Vec<usize>> {
        let line = self.line_to(idx);
        if line.is_empty() {
            return None;
        }
        line.windows(2)
            .map(|pair| self.children(pair[0]).iter().position(|&c| c == pair[1]))
            .collect()
    }

    /// Follow child indices from the root.
    pub fn node_at_path(&self, path: &[usize]) -> Option<NodeId> {
        path.iter().try_fold(self.root, |idx, &i| self.children(idx).get(i).copied())
    }
}

/// Preorder traversal, main line first.
pub struct TreeIterator<'a> {
    tree: &'a VariationTree,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a VariationTree) -> Self {
        Self {
            tree,
            stack: vec![tree.root()],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a VariationNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(tag: &str) -> Position {
        Position::from_canonical(tag)
    }

    fn mv(san: &str) -> PlayedMove {
        PlayedMove {
            from: None,
            to: String::new(),
            piece: 'p',
            captured: None,
            promotion: None,
            san: san.to_string(),
            uci: String::new(),
            check: false,
        }
    }

    //      S0
    //     /  \
    //    A    B
    //    |
    //    C
    fn sample() -> (VariationTree, NodeId, NodeId, NodeId) {
        let mut tree = VariationTree::new(pos("S0"));
        let root = tree.root();
        let a = tree.insert_move(root, mv("a"), pos("A")).unwrap();
        let b = tree.insert_move(root, mv("b"), pos("B")).unwrap();
        let c = tree.insert_move(a, mv("c"), pos("C")).unwrap();
        (tree, a, b, c)
    }

    #[test]
    fn given_new_tree_when_inspecting_root_then_has_no_move_and_no_parent() {
        let tree = VariationTree::new(pos("S0"));
        let root = tree.get(tree.root()).unwrap();
        assert!(root.is_root());
        assert!(root.mv.is_none());
        assert!(root.is_leaf());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn given_existing_child_when_inserting_same_position_then_returns_it() {
        let mut tree = VariationTree::new(pos("S0"));
        let root = tree.root();
        let first = tree.insert_move(root, mv("e4"), pos("S1")).unwrap();
        let second = tree.insert_move(root, mv("e4"), pos("S1")).unwrap();
        assert_eq!(first, second);
        assert_eq!(tree.children(root).len(), 1);
    }

    #[test]
    fn given_children_when_inserting_new_position_then_appends_last() {
        let (mut tree, a, b, _) = sample();
        let root = tree.root();
        let d = tree.insert_move(root, mv("d"), pos("D")).unwrap();
        assert_eq!(tree.children(root), &[a, b, d]);
    }

    #[test]
    fn given_unknown_cursor_when_inserting_then_errors() {
        let (mut tree, _, _, c) = sample();
        tree.reset(pos("S0"));
        let err = tree.insert_move(c, mv("x"), pos("X")).unwrap_err();
        assert_eq!(err, DomainError::UnknownNode);
    }

    #[test]
    fn given_deep_node_when_top_of_line_then_root() {
        let (tree, _, _, c) = sample();
        assert_eq!(tree.top_of_line(c), tree.root());
        assert_eq!(tree.top_of_line(tree.root()), tree.root());
    }

    #[test]
    fn given_branching_tree_when_bottom_of_line_then_follows_first_children() {
        let (tree, _, b, c) = sample();
        assert_eq!(tree.bottom_of_line(tree.root()), c);
        assert_eq!(tree.bottom_of_line(b), b);
    }

    #[test]
    fn given_tree_when_reset_then_old_handles_stop_resolving() {
        let (mut tree, a, _, c) = sample();
        let old_root = tree.root();
        let new_root = tree.reset(pos("P"));

        assert_eq!(tree.len(), 1);
        assert_ne!(new_root, old_root);
        assert!(tree.get(old_root).is_none());
        assert!(tree.get(a).is_none());
        assert!(tree.get(c).is_none());
        assert_eq!(tree.position(new_root), Some(&pos("P")));
    }

    #[test]
    fn given_sample_when_iterating_then_preorder_main_line_first() {
        let (tree, a, b, c) = sample();
        let order: Vec<NodeId> = tree.iter().map(|(idx, _)| idx).collect();
        assert_eq!(order, vec![tree.root(), a, c, b]);
    }

    #[test]
    fn given_sample_when_measuring_then_depth_and_leaves_match() {
        let (tree, _, b, c) = sample();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.leaf_nodes(), vec![c, b]);
    }

    #[test]
    fn given_node_when_path_of_then_node_at_path_returns_it() {
        let (tree, _, b, c) = sample();
        assert_eq!(tree.path_of(c), Some(vec![0, 0]));
        assert_eq!(tree.path_of(b), Some(vec![1]));
        assert_eq!(tree.node_at_path(&[0, 0]), Some(c));
        assert_eq!(tree.node_at_path(&[]), Some(tree.root()));
        assert_eq!(tree.node_at_path(&[2]), None);
    }

    #[test]
    fn given_sample_when_checking_main_line_then_side_branch_is_excluded() {
        let (tree, a, b, c) = sample();
        assert_eq!(tree.main_line(), vec![tree.root(), a, c]);
        assert!(tree.is_main_line(c));
        assert!(!tree.is_main_line(b));
    }
}
