//! Move records and the human-readable move list
//!
//! Every move applied to the authoritative board produces a [`MoveRecord`].
//! The list of records is the single source for both the numbered history
//! shown to the player and the notation submitted to the engine service.
//!
//! # Formatting
//!
//! ```text
//! 1. ♙ e2-e4 ♟ e7-e5
//! 2. ♘ g1-f3
//! ```
//!
//! Castles render as `0-0` / `0-0-0`; a move without a reply renders the
//! black column as an empty string, leaving the trailing space in place.

use shakmaty::{CastlingSide, Role, Square};

use crate::game::types::PieceType;

/// One applied move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub piece: PieceType,
    pub from: Square,
    /// Destination; the king's destination for castling
    pub to: Square,
    pub castling: Option<CastlingSide>,
    pub promotion: Option<Role>,
}

impl MoveRecord {
    /// Move list entry: `0-0-0`, `0-0` or `<glyph> <from>-<to>`
    pub fn history_entry(&self) -> String {
        match self.castling {
            Some(CastlingSide::QueenSide) => "0-0-0".to_string(),
            Some(CastlingSide::KingSide) => "0-0".to_string(),
            None => format!("{} {}-{}", self.piece.glyph(), self.from, self.to),
        }
    }

    /// Encoding the engine service expects for submitted moves
    ///
    /// `e2e4`, `e7e8q` for promotions, `00` / `000` for castles.
    pub fn wire_notation(&self) -> String {
        match self.castling {
            Some(CastlingSide::QueenSide) => "000".to_string(),
            Some(CastlingSide::KingSide) => "00".to_string(),
            None => self.uci(),
        }
    }

    /// Coordinate notation, castles as king moves (`e1g1`)
    pub fn uci(&self) -> String {
        match self.promotion {
            Some(role) => format!("{}{}{}", self.from, self.to, role.char()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Whether an engine-suggested move names this move
    pub fn matches_engine_move(&self, engine_move: &str) -> bool {
        let engine_move = engine_move.trim();
        engine_move.eq_ignore_ascii_case(&self.wire_notation())
            || engine_move.eq_ignore_ascii_case(&self.uci())
    }
}

/// Pair records into numbered `"<n>. <white> <black>"` lines
pub fn format_history(records: &[MoveRecord]) -> Vec<String> {
    records
        .chunks(2)
        .enumerate()
        .map(|(index, pair)| {
            let white = pair[0].history_entry();
            let black = pair.get(1).map(MoveRecord::history_entry).unwrap_or_default();
            format!("{}. {} {}", index + 1, white, black)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(piece: PieceType, from: Square, to: Square) -> MoveRecord {
        MoveRecord {
            piece,
            from,
            to,
            castling: None,
            promotion: None,
        }
    }

    #[test]
    fn test_open_game_history() {
        let records = [
            record(PieceType::WhitePawn, Square::E2, Square::E4),
            record(PieceType::BlackPawn, Square::E7, Square::E5),
            record(PieceType::WhiteKnight, Square::G1, Square::F3),
        ];
        assert_eq!(
            format_history(&records),
            vec!["1. ♙ e2-e4 ♟ e7-e5".to_string(), "2. ♘ g1-f3 ".to_string()]
        );
    }

    #[test]
    fn test_empty_history() {
        assert!(format_history(&[]).is_empty());
    }

    #[test]
    fn test_castles_render_as_zeros() {
        let short = MoveRecord {
            castling: Some(CastlingSide::KingSide),
            ..record(PieceType::WhiteKing, Square::E1, Square::G1)
        };
        let long = MoveRecord {
            castling: Some(CastlingSide::QueenSide),
            ..record(PieceType::BlackKing, Square::E8, Square::C8)
        };
        assert_eq!(format_history(&[short, long]), vec!["1. 0-0 0-0-0".to_string()]);
        assert_eq!(short.wire_notation(), "00");
        assert_eq!(long.wire_notation(), "000");
        assert_eq!(short.uci(), "e1g1");
    }

    #[test]
    fn test_promotion_notation() {
        let promotion = MoveRecord {
            promotion: Some(Role::Queen),
            ..record(PieceType::WhitePawn, Square::E7, Square::E8)
        };
        assert_eq!(promotion.wire_notation(), "e7e8q");
        assert_eq!(promotion.history_entry(), "♙ e7-e8");
    }

    #[test]
    fn test_engine_move_matching_accepts_both_castle_forms() {
        let short = MoveRecord {
            castling: Some(CastlingSide::KingSide),
            ..record(PieceType::WhiteKing, Square::E1, Square::G1)
        };
        assert!(short.matches_engine_move("e1g1"));
        assert!(short.matches_engine_move("00"));
        assert!(!short.matches_engine_move("e1f1"));

        let push = record(PieceType::WhitePawn, Square::D2, Square::D4);
        assert!(push.matches_engine_move("d2d4 "));
        assert!(!push.matches_engine_move("d2d3"));
    }
}
