//! Domain layer: the variation tree and the algorithms that grow and navigate it
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).
//! Chess rules enter only through the [`RulesEngine`] trait.

pub mod arena;
pub mod builder;
pub mod cursor;
pub mod error;
pub mod position;
pub mod rules;

pub use arena::{NodeId, TreeIterator, VariationNode, VariationTree};
pub use builder::TreeBuilder;
pub use cursor::CursorState;
pub use error::{DomainError, TreeResult};
pub use position::{split_movetext, MoveToken, PlayedMove, Position, Side, STARTING_FEN};
pub use rules::RulesEngine;
