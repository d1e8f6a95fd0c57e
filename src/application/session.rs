//! Analysis session
//!
//! Owns the variation tree, the single cursor slot and per-node annotations.
//! All mutation goes through `&mut self`; callers serialize access.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    CursorState, DomainError, MoveToken, NodeId, Position, RulesEngine, TreeBuilder,
    VariationNode, VariationTree,
};

/// Auxiliary data a host attaches to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub comment: Option<String>,
    pub evaluation: Option<String>,
}

/// What to do with an illegal token during a bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportPolicy {
    /// Fail and leave the tree untouched
    #[default]
    Abort,
    /// Log and skip the token, continue from the last good node
    Skip,
}

/// A token dropped under [`ImportPolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedToken {
    pub index: usize,
    pub token: MoveToken,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Node the cursor moved to
    pub end: NodeId,
    pub skipped: Vec<SkippedToken>,
}

pub struct AnalysisSession {
    rules: Arc<dyn RulesEngine>,
    tree: VariationTree,
    cursor: NodeId,
    annotations: HashMap<NodeId, Annotation>,
}

impl AnalysisSession {
    pub fn new(rules: Arc<dyn RulesEngine>, start: Position) -> Self {
        let tree = VariationTree::new(start);
        let cursor = tree.root();
        Self {
            rules,
            tree,
            cursor,
            annotations: HashMap::new(),
        }
    }

    /// Start a session holding `tokens` as the main line, cursor at its end.
    pub fn from_moves(
        rules: Arc<dyn RulesEngine>,
        start: Position,
        tokens: &[MoveToken],
    ) -> ApplicationResult<Self> {
        let (tree, cursor) = TreeBuilder::new(rules.as_ref()).build_from_moves(tokens, start)?;
        Ok(Self {
            rules,
            tree,
            cursor,
            annotations: HashMap::new(),
        })
    }

    pub fn tree(&self) -> &VariationTree {
        &self.tree
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    pub fn current(&self) -> Option<&VariationNode> {
        self.tree.get(self.cursor)
    }

    pub fn position(&self) -> Option<&Position> {
        self.tree.position(self.cursor)
    }

    pub fn cursor_state(&self) -> CursorState {
        self.tree.cursor_state(self.cursor)
    }

    /// Play one move at the cursor and advance to the resulting node.
    #[instrument(level = "debug", skip(self))]
    pub fn play(&mut self, token: &MoveToken) -> ApplicationResult<NodeId> {
        let builder = TreeBuilder::new(self.rules.as_ref());
        self.cursor = builder.play(&mut self.tree, self.cursor, token)?;
        Ok(self.cursor)
    }

    /// Insert a line at the cursor and advance to its last node.
    #[instrument(level = "debug", skip(self, tokens), fields(count = tokens.len()))]
    pub fn import_line(
        &mut self,
        tokens: &[MoveToken],
        policy: ImportPolicy,
    ) -> ApplicationResult<ImportReport> {
        let builder = TreeBuilder::new(self.rules.as_ref());
        let mut skipped = Vec::new();

        match policy {
            ImportPolicy::Abort => {
                self.cursor = builder.insert_move_sequence(&mut self.tree, self.cursor, tokens)?;
            }
            ImportPolicy::Skip => {
                for (index, token) in tokens.iter().enumerate() {
                    match builder.play(&mut self.tree, self.cursor, token) {
                        Ok(next) => self.cursor = next,
                        Err(DomainError::IllegalMove { reason, .. }) => {
                            warn!(index, %token, %reason, "skipping illegal move");
                            skipped.push(SkippedToken {
                                index,
                                token: token.clone(),
                                reason,
                            });
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }

        debug!(nodes = self.tree.len(), skipped = skipped.len(), "line imported");
        Ok(ImportReport {
            end: self.cursor,
            skipped,
        })
    }

    pub fn back(&mut self) -> NodeId {
        self.cursor = self.tree.step_back(self.cursor);
        self.cursor
    }

    pub fn forward(&mut self) -> NodeId {
        self.cursor = self.tree.step_forward(self.cursor);
        self.cursor
    }

    pub fn to_start(&mut self) -> NodeId {
        self.cursor = self.tree.go_to_start(self.cursor);
        self.cursor
    }

    pub fn to_end(&mut self) -> NodeId {
        self.cursor = self.tree.go_to_end(self.cursor);
        self.cursor
    }

    pub fn jump(&mut self, target: NodeId) -> ApplicationResult<NodeId> {
        self.cursor = self.tree.jump(target).ok_or(DomainError::UnknownNode)?;
        Ok(self.cursor)
    }

    /// Jump along child indices from the root, e.g. `[0, 0, 1]`.
    pub fn jump_path(&mut self, path: &[usize]) -> ApplicationResult<NodeId> {
        let target = self.tree.node_at_path(path).ok_or_else(|| {
            ApplicationError::NoSuchVariation(
                path.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("."),
            )
        })?;
        self.cursor = target;
        Ok(target)
    }

    /// Discard the whole tree and start again from `fen`.
    ///
    /// The position is validated first; on failure the session is unchanged.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self, fen: &str) -> ApplicationResult<NodeId> {
        let position = self.rules.validate(fen)?;
        Ok(self.reset_to(position))
    }

    pub fn reset_to_start(&mut self) -> NodeId {
        let position = self.rules.starting_position();
        self.reset_to(position)
    }

    fn reset_to(&mut self, position: Position) -> NodeId {
        self.annotations.clear();
        self.cursor = self.tree.reset(position);
        self.cursor
    }

    pub fn annotate(&mut self, node: NodeId, comment: &str) -> ApplicationResult<()> {
        self.annotation_mut(node)?.comment = Some(comment.to_string());
        Ok(())
    }

    pub fn set_evaluation(&mut self, node: NodeId, evaluation: &str) -> ApplicationResult<()> {
        self.annotation_mut(node)?.evaluation = Some(evaluation.to_string());
        Ok(())
    }

    pub fn annotation(&self, node: NodeId) -> Option<&Annotation> {
        self.annotations.get(&node)
    }

    fn annotation_mut(&mut self, node: NodeId) -> ApplicationResult<&mut Annotation> {
        if !self.tree.contains(node) {
            return Err(DomainError::UnknownNode.into());
        }
        Ok(self.annotations.entry(node).or_default())
    }
}
