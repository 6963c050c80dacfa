//! Piece vocabulary shared by the controller, the reconciler and the UI
//!
//! [`PieceType`] is the presentation-side name for a colored chess piece. It
//! maps losslessly onto [`shakmaty::Piece`]; the library's "empty square" is
//! represented by `Option::None` on both sides, so neither direction needs a
//! fallback arm.

use shakmaty::{Color, Piece, Role, Square};
use std::fmt;

use crate::game::error::{GameError, GameResult};

/// One of the twelve colored piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    WhitePawn,
    WhiteKnight,
    WhiteBishop,
    WhiteRook,
    WhiteQueen,
    WhiteKing,
    BlackPawn,
    BlackKnight,
    BlackBishop,
    BlackRook,
    BlackQueen,
    BlackKing,
}

impl PieceType {
    pub const ALL: [PieceType; 12] = [
        PieceType::WhitePawn,
        PieceType::WhiteKnight,
        PieceType::WhiteBishop,
        PieceType::WhiteRook,
        PieceType::WhiteQueen,
        PieceType::WhiteKing,
        PieceType::BlackPawn,
        PieceType::BlackKnight,
        PieceType::BlackBishop,
        PieceType::BlackRook,
        PieceType::BlackQueen,
        PieceType::BlackKing,
    ];

    /// Map a library square content onto a piece type
    ///
    /// `None` (empty square) maps to `None`.
    pub fn from_engine(piece: Option<Piece>) -> Option<PieceType> {
        piece.map(Self::from_piece)
    }

    /// Total mapping from an occupied square's piece
    pub fn from_piece(piece: Piece) -> PieceType {
        match (piece.color, piece.role) {
            (Color::White, Role::Pawn) => PieceType::WhitePawn,
            (Color::White, Role::Knight) => PieceType::WhiteKnight,
            (Color::White, Role::Bishop) => PieceType::WhiteBishop,
            (Color::White, Role::Rook) => PieceType::WhiteRook,
            (Color::White, Role::Queen) => PieceType::WhiteQueen,
            (Color::White, Role::King) => PieceType::WhiteKing,
            (Color::Black, Role::Pawn) => PieceType::BlackPawn,
            (Color::Black, Role::Knight) => PieceType::BlackKnight,
            (Color::Black, Role::Bishop) => PieceType::BlackBishop,
            (Color::Black, Role::Rook) => PieceType::BlackRook,
            (Color::Black, Role::Queen) => PieceType::BlackQueen,
            (Color::Black, Role::King) => PieceType::BlackKing,
        }
    }

    /// Inverse of [`PieceType::from_piece`]
    pub fn to_engine(self) -> Piece {
        let (color, role) = match self {
            PieceType::WhitePawn => (Color::White, Role::Pawn),
            PieceType::WhiteKnight => (Color::White, Role::Knight),
            PieceType::WhiteBishop => (Color::White, Role::Bishop),
            PieceType::WhiteRook => (Color::White, Role::Rook),
            PieceType::WhiteQueen => (Color::White, Role::Queen),
            PieceType::WhiteKing => (Color::White, Role::King),
            PieceType::BlackPawn => (Color::Black, Role::Pawn),
            PieceType::BlackKnight => (Color::Black, Role::Knight),
            PieceType::BlackBishop => (Color::Black, Role::Bishop),
            PieceType::BlackRook => (Color::Black, Role::Rook),
            PieceType::BlackQueen => (Color::Black, Role::Queen),
            PieceType::BlackKing => (Color::Black, Role::King),
        };
        Piece { color, role }
    }

    pub fn color(self) -> Color {
        self.to_engine().color
    }

    pub fn role(self) -> Role {
        self.to_engine().role
    }

    /// Unicode figurine used in the move list
    pub fn glyph(self) -> char {
        match self {
            PieceType::WhitePawn => '♙',
            PieceType::WhiteKnight => '♘',
            PieceType::WhiteBishop => '♗',
            PieceType::WhiteRook => '♖',
            PieceType::WhiteQueen => '♕',
            PieceType::WhiteKing => '♔',
            PieceType::BlackPawn => '♟',
            PieceType::BlackKnight => '♞',
            PieceType::BlackBishop => '♝',
            PieceType::BlackRook => '♜',
            PieceType::BlackQueen => '♛',
            PieceType::BlackKing => '♚',
        }
    }

    /// Parse a promotion choice (`q`, `r`, `b`, `n`, any case) for `color`
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPromotion`] for anything a pawn cannot
    /// promote to, including `k` and `p`.
    pub fn from_promotion_char(c: char, color: Color) -> GameResult<PieceType> {
        let role = match c.to_ascii_lowercase() {
            'q' => Role::Queen,
            'r' => Role::Rook,
            'b' => Role::Bishop,
            'n' => Role::Knight,
            _ => return Err(GameError::UnknownPromotion { choice: c }),
        };
        Ok(Self::from_piece(Piece { color, role }))
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// A displayed piece with a stable identity
///
/// The `id` follows the piece across moves so a renderer can animate it
/// instead of despawning and respawning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceOnSquare {
    pub id: u32,
    pub piece_type: PieceType,
    pub square: Square,
}

/// Monotonic source of piece ids; only rewound by a game reset
#[derive(Debug, Default, Clone)]
pub struct PieceIdAllocator {
    next: u32,
}

impl PieceIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }

    /// Number of ids handed out since the last reset
    pub fn issued(&self) -> u32 {
        self.next
    }
}
