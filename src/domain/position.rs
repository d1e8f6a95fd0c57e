//! Position and move values exchanged with the rules engine
//!
//! The tree treats both as opaque: a position is compared by its canonical
//! encoding, a move is recorded as the engine reported it.

use std::fmt;

/// Canonical FEN of the standard initial position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Side to move, as read from a position's encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

/// A complete chess position in its canonical encoding.
///
/// Two positions are identical iff their encodings are equal. Values are only
/// produced by a rules engine, which guarantees the encoding is canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position(String);

impl Position {
    /// Wrap an already-canonical encoding.
    pub fn from_canonical(fen: impl Into<String>) -> Self {
        Self(fen.into())
    }

    pub fn starting() -> Self {
        Self(STARTING_FEN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn side_to_move(&self) -> Option<Side> {
        match self.0.split_whitespace().nth(1)? {
            "w" => Some(Side::White),
            "b" => Some(Side::Black),
            _ => None,
        }
    }

    pub fn fullmove_number(&self) -> Option<u32> {
        self.0.split_whitespace().nth(5)?.parse().ok()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A move as validated and described by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    /// Origin square, e.g. "g1"
    pub from: Option<String>,
    /// Destination square, e.g. "f3"
    pub to: String,
    /// Moving piece, lowercase letter (`p`, `n`, `b`, `r`, `q`, `k`)
    pub piece: char,
    /// Captured piece, if any
    pub captured: Option<char>,
    /// Promotion piece, if any
    pub promotion: Option<char>,
    /// Standard algebraic notation including check suffix, e.g. "Nf3", "Qxf7#"
    pub san: String,
    /// Coordinate notation, e.g. "g1f3"
    pub uci: String,
    /// Whether the move gives check
    pub check: bool,
}

impl fmt::Display for PlayedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.san)
    }
}

/// Input describing a move to replay: free notation or an explicit square pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MoveToken {
    /// Algebraic or coordinate notation, interpreted by the rules engine
    Notation(String),
    /// Origin/destination squares with optional promotion piece (board drag input)
    Coordinates {
        from: String,
        to: String,
        promotion: Option<char>,
    },
}

impl MoveToken {
    pub fn coordinates(from: &str, to: &str, promotion: Option<char>) -> Self {
        Self::Coordinates {
            from: from.to_string(),
            to: to.to_string(),
            promotion,
        }
    }
}

impl From<&str> for MoveToken {
    fn from(s: &str) -> Self {
        Self::Notation(s.to_string())
    }
}

impl From<String> for MoveToken {
    fn from(s: String) -> Self {
        Self::Notation(s)
    }
}

impl fmt::Display for MoveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveToken::Notation(s) => f.write_str(s),
            MoveToken::Coordinates {
                from,
                to,
                promotion,
            } => {
                write!(f, "{from}{to}")?;
                if let Some(p) = promotion {
                    write!(f, "{p}")?;
                }
                Ok(())
            }
        }
    }
}

/// Split move text into tokens.
///
/// Move numbers (`1.`, `12...`, the `3.` in `3.Nf3`) and game results are dropped.
pub fn split_movetext(text: &str) -> Vec<MoveToken> {
    text.split_whitespace()
        .filter_map(|word| {
            let digits = word.trim_start_matches(|c: char| c.is_ascii_digit());
            let rest = if digits.len() < word.len() && digits.starts_with('.') {
                digits.trim_start_matches('.')
            } else {
                word
            };
            match rest {
                "" | "*" | "1-0" | "0-1" | "1/2-1/2" => None,
                tok => Some(MoveToken::from(tok)),
            }
        })
        .collect()
}
