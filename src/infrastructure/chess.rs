//! Rules engine backed by `shakmaty`
//!
//! Positions are encoded as FEN with the en-passant square only emitted when a
//! legal en-passant capture exists, so transposed move orders compare equal.

use regex::Regex;
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Role, Square};
use tracing::{instrument, trace};

use crate::domain::{DomainError, MoveToken, PlayedMove, Position, RulesEngine, TreeResult};

/// Standard chess rules.
///
/// In strict mode notation must be SAN. Sloppy mode also accepts coordinate and
/// long algebraic notation (`e2e4`, `Ng1-f3`, `e4xd5`), a leading pawn letter,
/// digit castling (`0-0`) and trailing annotation glyphs. Coordinate tokens are
/// accepted in both modes.
#[derive(Debug, Clone)]
pub struct ShakmatyRules {
    sloppy: bool,
    long_algebraic: Regex,
}

impl Default for ShakmatyRules {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ShakmatyRules {
    pub fn new(sloppy: bool) -> Self {
        Self {
            sloppy,
            long_algebraic: Regex::new(r"^([PNBRQK])?([a-h][1-8])[-x:]?([a-h][1-8])=?([nbrqNBRQ])?$")
                .expect("static regex"),
        }
    }

    pub fn strict() -> Self {
        Self::new(false)
    }

    pub fn is_sloppy(&self) -> bool {
        self.sloppy
    }

    fn load(&self, position: &Position) -> TreeResult<Chess> {
        let invalid = |reason: String| DomainError::InvalidPosition {
            fen: position.to_string(),
            reason,
        };
        let fen: Fen = position
            .as_str()
            .parse()
            .map_err(|e: shakmaty::fen::ParseFenError| invalid(e.to_string()))?;
        fen.into_position(CastlingMode::Standard)
            .map_err(|e| invalid(e.to_string()))
    }

    fn encode(pos: &Chess) -> Position {
        Position::from_canonical(Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string())
    }

    fn resolve(&self, pos: &Chess, token: &MoveToken) -> Result<Move, String> {
        match token {
            MoveToken::Coordinates {
                from,
                to,
                promotion,
            } => coordinate_move(pos, from, to, *promotion),
            MoveToken::Notation(text) if self.sloppy => self.sloppy_move(pos, text.trim()),
            MoveToken::Notation(text) => san_move(pos, text.trim()),
        }
    }

    fn sloppy_move(&self, pos: &Chess, text: &str) -> Result<Move, String> {
        let cleaned = text.trim_end_matches(['!', '?', '+', '#']);

        if let Some(caps) = self.long_algebraic.captures(cleaned) {
            let promotion = caps.get(4).and_then(|m| m.as_str().chars().next());
            if let Ok(m) = coordinate_move(pos, &caps[2], &caps[3], promotion) {
                let piece_matches = caps
                    .get(1)
                    .and_then(|p| p.as_str().chars().next())
                    .map_or(true, |p| m.role().upper_char() == p);
                if piece_matches {
                    return Ok(m);
                }
            }
        }

        let san = match cleaned {
            "0-0" => "O-O",
            "0-0-0" => "O-O-O",
            s if s.len() > 2 && s.starts_with('P') && s[1..].starts_with(|c: char| matches!(c, 'a'..='h')) => &s[1..],
            s => s,
        };
        san_move(pos, san)
    }
}

fn san_move(pos: &Chess, text: &str) -> Result<Move, String> {
    let san: SanPlus = text
        .parse()
        .map_err(|e: shakmaty::san::ParseSanError| format!("not a SAN move: {e}"))?;
    san.san.to_move(pos).map_err(|e| e.to_string())
}

fn coordinate_move(pos: &Chess, from: &str, to: &str, promotion: Option<char>) -> Result<Move, String> {
    let square = |s: &str| -> Result<Square, String> {
        s.parse::<Square>().map_err(|_| format!("not a square: '{s}'"))
    };
    let promotion = promotion
        .map(|c| Role::from_char(c.to_ascii_lowercase()).ok_or(format!("not a piece: '{c}'")))
        .transpose()?;
    UciMove::Normal {
        from: square(from)?,
        to: square(to)?,
        promotion,
    }
    .to_move(pos)
    .map_err(|e| e.to_string())
}

fn describe(pos: &Chess, m: &Move) -> (PlayedMove, Chess) {
    let mut next = pos.clone();
    let san = SanPlus::from_move_and_play_unchecked(&mut next, m);
    let uci = m.to_uci(CastlingMode::Standard);
    let (from, to) = match &uci {
        UciMove::Normal { from, to, .. } => (Some(from.to_string()), to.to_string()),
        UciMove::Put { to, .. } => (None, to.to_string()),
        UciMove::Null => (None, uci.to_string()),
    };
    let played = PlayedMove {
        from,
        to,
        piece: m.role().char(),
        captured: m.capture().map(Role::char),
        promotion: m.promotion().map(Role::char),
        check: san.suffix.is_some(),
        san: san.to_string(),
        uci: uci.to_string(),
    };
    (played, next)
}

impl RulesEngine for ShakmatyRules {
    fn starting_position(&self) -> Position {
        Self::encode(&Chess::default())
    }

    #[instrument(level = "debug", skip(self))]
    fn validate(&self, fen: &str) -> TreeResult<Position> {
        let invalid = |reason: String| DomainError::InvalidPosition {
            fen: fen.to_string(),
            reason,
        };
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|e: shakmaty::fen::ParseFenError| invalid(e.to_string()))?;
        let pos: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(e.to_string()))?;
        Ok(Self::encode(&pos))
    }

    #[instrument(level = "trace", skip(self))]
    fn play(&self, position: &Position, token: &MoveToken) -> TreeResult<(PlayedMove, Position)> {
        let pos = self.load(position)?;
        let m = self
            .resolve(&pos, token)
            .map_err(|reason| DomainError::IllegalMove {
                token: token.clone(),
                index: 0,
                position: position.clone(),
                reason,
            })?;
        let (played, next) = describe(&pos, &m);
        trace!(san = %played.san, uci = %played.uci, "move replayed");
        Ok((played, Self::encode(&next)))
    }
}
