//! Boundary contract of the external chess rules engine

use crate::domain::error::TreeResult;
use crate::domain::position::{MoveToken, PlayedMove, Position};

/// Move legality, notation parsing and position validation.
///
/// The tree never fabricates positions: every child position is the result of
/// `play` from its parent's position.
pub trait RulesEngine: Send + Sync {
    /// The default starting position.
    fn starting_position(&self) -> Position;

    /// Validate a FEN string and return its canonical encoding.
    ///
    /// Fails with `DomainError::InvalidPosition`.
    fn validate(&self, fen: &str) -> TreeResult<Position>;

    /// Replay `token` from `position`.
    ///
    /// Fails with `DomainError::IllegalMove` (index 0) if the token does not
    /// denote a legal move in `position`.
    fn play(&self, position: &Position, token: &MoveToken) -> TreeResult<(PlayedMove, Position)>;
}
