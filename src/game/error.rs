//! Error types for game module
//!
//! Covers the ways data coming from outside the controller (server FENs and
//! engine moves, typed user choices) can fail to fit the board.

/// Errors that can occur in game logic
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Position string rejected by the rules library
    #[error("Invalid FEN '{fen}': {message}")]
    InvalidFen { fen: String, message: String },

    /// Engine or typed move that is not legal in the current position
    #[error("Illegal move '{notation}': {message}")]
    IllegalMove { notation: String, message: String },

    /// Difficulty name other than easy/medium/hard
    #[error("Unknown difficulty: {name}")]
    UnknownDifficulty { name: String },

    /// Promotion choice a pawn cannot promote to
    #[error("Unknown promotion piece: {choice}")]
    UnknownPromotion { choice: char },

    /// Square name outside a1..h8
    #[error("Invalid square: {name}")]
    InvalidSquare { name: String },
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
