//! Inputs accepted by the controller and events it raises for the UI
//!
//! Inputs are gestures and menu actions. Events are one-shot notifications
//! (dialogs, toasts) that do not belong in the snapshot because they must
//! not fire twice.

use shakmaty::{Color, Square};

use crate::game::mode::Difficulty;
use crate::game::types::PieceType;

/// Everything the player can do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    StartLocal,
    StartQuiz,
    /// Start an engine game; the difficulty is asked for separately
    StartStock,
    SetDifficulty(Difficulty),
    Reset,
    /// Tap: select an own piece, or move the selected piece here
    SquareClicked(Square),
    /// Drag start
    TakePiece(Square),
    /// Drag end
    ReleasePiece(Square),
    /// Must be one of the snapshot's `pending_promotions`
    PromotionSelected(PieceType),
    /// Device shake; asks for a hint
    Shake,
}

impl Input {
    /// Abandons the current game, so outstanding requests are obsolete
    pub fn starts_over(&self) -> bool {
        matches!(
            self,
            Input::Reset | Input::StartLocal | Input::StartQuiz | Input::StartStock
        )
    }
}

/// One-shot notifications for dialogs
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Checkmate {
        winner: Color,
    },
    /// Wrong puzzle move; the puzzle was reloaded
    QuizMistake,
    /// Current puzzle is over, solved or not
    QuizRoundOver,
    /// Last puzzle of the series is over
    QuizFinished {
        score: f64,
    },
    /// Stock game needs a difficulty before play starts
    DifficultyPrompt,
    Hint {
        best: String,
    },
    EngineThinking(bool),
}
