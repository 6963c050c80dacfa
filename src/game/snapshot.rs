//! Immutable view of the game handed to the presentation layer

use shakmaty::{Color, Square};
use std::collections::BTreeSet;

use crate::game::mode::{ModeKind, QuizProgress};
use crate::game::types::PieceType;

pub use crate::game::types::PieceOnSquare;

/// Quiz counters shown next to the board
#[derive(Debug, Clone, PartialEq)]
pub struct QuizStatus {
    pub progress: QuizProgress,
    /// Attempts left on the current puzzle, if one is loaded
    pub attempts: Option<u8>,
}

/// Everything needed to draw the board, rebuilt on every change
#[derive(Debug, Clone, PartialEq)]
pub struct UiSnapshot {
    pub pieces: Vec<PieceOnSquare>,
    pub selected_square: Option<Square>,
    pub reachable_squares: BTreeSet<Square>,
    /// Non-empty only while a promotion choice is outstanding
    pub pending_promotions: Vec<PieceType>,
    pub history: Vec<String>,
    pub mode: ModeKind,
    pub side_to_move: Color,
    pub input_locked: bool,
    pub checkmate: Option<Color>,
    pub quiz: QuizStatus,
    /// Last hint shown
    pub best_move: Option<String>,
}

impl UiSnapshot {
    pub fn piece_on(&self, square: Square) -> Option<&PieceOnSquare> {
        self.pieces.iter().find(|piece| piece.square == square)
    }

    /// Text diagram, white at the bottom
    pub fn render_board(&self) -> String {
        let mut out = String::with_capacity(11 * 9);
        for rank in (0..8u32).rev() {
            out.push(char::from(b'1' + rank as u8));
            out.push(' ');
            for file in 0..8u32 {
                let square = Square::new(rank * 8 + file);
                let cell = match self.piece_on(square) {
                    Some(piece) => piece.piece_type.glyph(),
                    None if self.reachable_squares.contains(&square) => '+',
                    None => '.',
                };
                out.push(cell);
            }
            out.push('\n');
        }
        out.push_str("  abcdefgh\n");
        out
    }
}
