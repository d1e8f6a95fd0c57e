//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::position::{MoveToken, Position};

/// Domain errors: rejected input from the rules engine or handles that do not
/// belong to the tree. The tree is left untouched whenever one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("illegal move '{token}' (token {index}) in position {position}: {reason}")]
    IllegalMove {
        token: MoveToken,
        /// Zero-based index of the token within the submitted sequence
        index: usize,
        position: Position,
        reason: String,
    },

    #[error("invalid position '{fen}': {reason}")]
    InvalidPosition { fen: String, reason: String },

    #[error("node is not part of this tree")]
    UnknownNode,
}

impl DomainError {
    /// Re-label an illegal move error with its index inside a sequence.
    pub fn at_index(self, idx: usize) -> Self {
        match self {
            DomainError::IllegalMove {
                token,
                position,
                reason,
                ..
            } => DomainError::IllegalMove {
                token,
                index: idx,
                position,
                reason,
            },
            other => other,
        }
    }
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;
