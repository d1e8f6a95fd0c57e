//! Tree builder: replays move tokens through the rules engine and inserts the
//! results into a variation tree.

use tracing::{debug, instrument};

use crate::domain::arena::{NodeId, VariationTree};
use crate::domain::error::TreeResult;
use crate::domain::position::{MoveToken, PlayedMove, Position};
use crate::domain::rules::RulesEngine;

/// Constructs and extends variation trees from move tokens.
pub struct TreeBuilder<'a> {
    rules: &'a dyn RulesEngine,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(rules: &'a dyn RulesEngine) -> Self {
        Self { rules }
    }

    /// Replay `tokens` one after another starting at `start`.
    ///
    /// Nothing is inserted anywhere. An illegal token fails with its index in `tokens`.
    #[instrument(level = "debug", skip(self, start, tokens), fields(count = tokens.len()))]
    pub fn replay(
        &self,
        start: &Position,
        tokens: &[MoveToken],
    ) -> TreeResult<Vec<(PlayedMove, Position)>> {
        let mut current = start.clone();
        let mut steps = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            let (mv, next) = self
                .rules
                .play(&current, token)
                .map_err(|e| e.at_index(i))?;
            steps.push((mv, next.clone()));
            current = next;
        }
        Ok(steps)
    }

    /// Build a fresh tree rooted at `start` holding `tokens` as its main line.
    ///
    /// Returns the tree and a cursor on the last inserted node (the root for an
    /// empty list).
    #[instrument(level = "debug", skip(self, tokens, start))]
    pub fn build_from_moves(
        &self,
        tokens: &[MoveToken],
        start: Position,
    ) -> TreeResult<(VariationTree, NodeId)> {
        let mut tree = VariationTree::new(start);
        let root = tree.root();
        let cursor = self.insert_move_sequence(&mut tree, root, tokens)?;
        debug!(nodes = tree.len(), "tree built");
        Ok((tree, cursor))
    }

    /// Replay one token at `cursor` and insert the result.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn play(
        &self,
        tree: &mut VariationTree,
        cursor: NodeId,
        token: &MoveToken,
    ) -> TreeResult<NodeId> {
        let position = tree.node(cursor)?.position.clone();
        let (mv, next) = self.rules.play(&position, token)?;
        tree.insert_move(cursor, mv, next)
    }

    /// Insert a whole line below `start` and return its last node.
    ///
    /// All tokens are replayed before the first node is inserted, so a failing
    /// token leaves the tree unchanged. Existing continuations are reused exactly
    /// as chained [`VariationTree::insert_move`] calls would reuse them.
    #[instrument(level = "debug", skip(self, tree, tokens), fields(count = tokens.len()))]
    pub fn insert_move_sequence(
        &self,
        tree: &mut VariationTree,
        start: NodeId,
        tokens: &[MoveToken],
    ) -> TreeResult<NodeId> {
        let position = tree.node(start)?.position.clone();
        let steps = self.replay(&position, tokens)?;
        let mut cursor = start;
        for (mv, next) in steps {
            cursor = tree.insert_move(cursor, mv, next)?;
        }
        Ok(cursor)
    }
}
