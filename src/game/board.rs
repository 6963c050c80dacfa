//! Authoritative board backed by `shakmaty`
//!
//! Thin wrapper that answers the questions the touch controller asks (what
//! can this piece reach, which moves go from here to there) and turns every
//! applied move into a [`MoveRecord`]. Castling is addressed by the king's
//! destination square, the way a player drags the king.

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{
    Board, CastlingMode, Chess, Color, EnPassantMode, File, Move, Position, Square,
};
use std::collections::BTreeSet;

use crate::game::error::{GameError, GameResult};
use crate::game::history::MoveRecord;
use crate::game::types::PieceType;

#[derive(Debug, Clone, Default)]
pub struct ChessBoard {
    position: Chess,
}

impl ChessBoard {
    /// Standard starting position
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fen(fen: &str) -> GameResult<Self> {
        let parsed: Fen = fen.trim().parse().map_err(|e| GameError::InvalidFen {
            fen: fen.to_string(),
            message: format!("{e}"),
        })?;
        let position: Chess =
            parsed
                .into_position(CastlingMode::Standard)
                .map_err(|e| GameError::InvalidFen {
                    fen: fen.to_string(),
                    message: format!("{e}"),
                })?;
        Ok(Self { position })
    }

    pub fn to_fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    /// Piece placement, for reconciliation
    pub fn layout(&self) -> &Board {
        self.position.board()
    }

    pub fn piece_at(&self, square: Square) -> Option<PieceType> {
        PieceType::from_engine(self.position.board().piece_at(square))
    }

    pub fn occupied_count(&self) -> usize {
        self.position.board().occupied().count()
    }

    /// Whether `square` holds a piece of the side to move
    pub fn is_own_piece(&self, square: Square) -> bool {
        self.piece_at(square)
            .is_some_and(|piece| piece.color() == self.turn())
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    /// Squares the piece on `from` can legally move to
    pub fn targets_from(&self, from: Square) -> BTreeSet<Square> {
        self.position
            .legal_moves()
            .iter()
            .filter_map(endpoints)
            .filter(|(move_from, _)| *move_from == from)
            .map(|(_, to)| to)
            .collect()
    }

    /// Legal moves from `from` to `to`
    ///
    /// More than one result means a promotion choice is needed.
    pub fn moves_between(&self, from: Square, to: Square) -> Vec<Move> {
        self.position
            .legal_moves()
            .into_iter()
            .filter(|m| endpoints(m) == Some((from, to)))
            .collect()
    }

    /// Play a legal move and describe it
    pub fn play(&mut self, mv: &Move) -> GameResult<MoveRecord> {
        if !self.position.is_legal(mv) {
            return Err(GameError::IllegalMove {
                notation: UciMove::from_move(mv, CastlingMode::Standard).to_string(),
                message: "not legal in the current position".to_string(),
            });
        }
        let record = self.describe(mv)?;
        self.position.play_unchecked(mv);
        Ok(record)
    }

    /// Play a move given in coordinate notation, e.g. an engine reply
    pub fn play_uci(&mut self, notation: &str) -> GameResult<MoveRecord> {
        let uci: UciMove = notation.trim().parse().map_err(|e| GameError::IllegalMove {
            notation: notation.to_string(),
            message: format!("{e}"),
        })?;
        let mv = uci
            .to_move(&self.position)
            .map_err(|e| GameError::IllegalMove {
                notation: notation.to_string(),
                message: format!("{e}"),
            })?;
        self.play(&mv)
    }

    fn describe(&self, mv: &Move) -> GameResult<MoveRecord> {
        let (from, to) = endpoints(mv).ok_or_else(|| GameError::IllegalMove {
            notation: UciMove::from_move(mv, CastlingMode::Standard).to_string(),
            message: "drops are not part of standard chess".to_string(),
        })?;
        let piece = PieceType::from_piece(shakmaty::Piece {
            color: self.turn(),
            role: mv.role(),
        });
        Ok(MoveRecord {
            piece,
            from,
            to,
            castling: mv.castling_side(),
            promotion: mv.promotion(),
        })
    }
}

/// Origin and destination of a move as the player sees it
fn endpoints(mv: &Move) -> Option<(Square, Square)> {
    match *mv {
        Move::Normal { from, to, .. } | Move::EnPassant { from, to } => Some((from, to)),
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() {
                File::G
            } else {
                File::C
            };
            Some((king, Square::from_coords(file, king.rank())))
        }
        Move::Put { .. } => None,
    }
}

/// Square from its name, e.g. `e4`; case-insensitive
pub fn parse_square(name: &str) -> GameResult<Square> {
    name.trim()
        .to_ascii_lowercase()
        .parse::<Square>()
        .map_err(|_| GameError::InvalidSquare {
            name: name.to_string(),
        })
}
