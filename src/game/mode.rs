//! Game modes and their per-mode state
//!
//! One tagged union replaces independent "is local / is quiz / is stock"
//! flags, so per-mode data (match id, puzzle FEN, attempts, difficulty) only
//! exists while that mode is active.

use engine_service::MatchId;
use shakmaty::{Color, Move, Square};
use std::fmt;
use std::str::FromStr;

use crate::game::error::GameError;

/// Attempts granted per puzzle
pub const QUIZ_ATTEMPTS: u8 = 2;
/// Puzzles per quiz series
pub const DEFAULT_QUIZ_ROUNDS: u32 = 10;
/// Hints per quiz series
pub const DEFAULT_QUIZ_HINTS: u32 = 3;

/// Engine strength for stock games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// ELO value sent to the engine service
    pub fn elo(self) -> &'static str {
        match self {
            Difficulty::Easy => "600",
            Difficulty::Medium => "1300",
            Difficulty::Hard => "2000",
        }
    }

    /// Inverse of [`Difficulty::elo`]; any unrecognized value counts as hard
    pub fn from_elo(elo: &str) -> Self {
        match elo.trim() {
            "600" => Difficulty::Easy,
            "1300" => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }

    /// Label stored in game-history entries
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(GameError::UnknownDifficulty {
                name: s.to_string(),
            }),
        }
    }
}

/// One puzzle in progress
#[derive(Debug, Clone, PartialEq)]
pub struct QuizRound {
    pub match_id: MatchId,
    /// Puzzle start position, restored after a mistake
    pub fen: String,
    pub attempts: u8,
    /// A hint was already shown for the current engine reply
    pub hint_shown: bool,
    /// Server's best move for the current position, once fetched
    pub best_move: Option<String>,
    pub best_move_requested: bool,
}

impl QuizRound {
    pub fn new(match_id: MatchId, fen: String) -> Self {
        Self {
            match_id,
            fen,
            attempts: QUIZ_ATTEMPTS,
            hint_shown: false,
            best_move: None,
            best_move_requested: false,
        }
    }

    /// Points for solving the puzzle with the attempts left
    pub fn points(&self) -> f64 {
        if self.attempts == QUIZ_ATTEMPTS {
            1.0
        } else {
            0.5
        }
    }

    /// Forget the best move after the position changed
    pub fn position_changed(&mut self) {
        self.best_move = None;
        self.best_move_requested = false;
    }
}

/// Quiz series bookkeeping; survives between puzzles
#[derive(Debug, Clone, PartialEq)]
pub struct QuizProgress {
    pub remaining: u32,
    pub score: f64,
    /// Points earned by the last solved puzzle
    pub earned: f64,
    pub hints_left: u32,
}

impl QuizProgress {
    pub fn new(rounds: u32, hints: u32) -> Self {
        Self {
            remaining: rounds,
            score: 0.0,
            earned: 0.0,
            hints_left: hints,
        }
    }
}

impl Default for QuizProgress {
    fn default() -> Self {
        Self::new(DEFAULT_QUIZ_ROUNDS, DEFAULT_QUIZ_HINTS)
    }
}

/// Active mode; match ids are `None` until the server assigned one
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GameMode {
    #[default]
    Idle,
    Local {
        match_id: Option<MatchId>,
    },
    Quiz {
        round: QuizRound,
    },
    Stock {
        match_id: Option<MatchId>,
        difficulty: Option<Difficulty>,
    },
}

impl GameMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            GameMode::Idle => ModeKind::Idle,
            GameMode::Local { .. } => ModeKind::Local,
            GameMode::Quiz { .. } => ModeKind::Quiz,
            GameMode::Stock { .. } => ModeKind::Stock,
        }
    }

    pub fn match_id(&self) -> Option<MatchId> {
        match self {
            GameMode::Idle => None,
            GameMode::Local { match_id } | GameMode::Stock { match_id, .. } => *match_id,
            GameMode::Quiz { round } => Some(round.match_id),
        }
    }
}

/// Mode without its data, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Idle,
    Local,
    Quiz,
    Stock,
}

/// Where the current turn stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    AwaitingSelection,
    /// A piece was picked up from `from` and is being dragged
    AwaitingRelease {
        from: Square,
    },
    /// A pawn reached the last rank; one move per promotion choice
    PromotionPending {
        moves: Vec<Move>,
    },
    /// A reply gating the board is outstanding
    AwaitingServer,
    /// Puzzle failed; waits for the next one
    RoundOver,
    Checkmate {
        winner: Color,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_elo_mapping() {
        assert_eq!(Difficulty::Easy.elo(), "600");
        assert_eq!(Difficulty::from_elo("1300"), Difficulty::Medium);
        assert_eq!(Difficulty::from_elo("2000"), Difficulty::Hard);
        assert_eq!(Difficulty::from_elo("1800"), Difficulty::Hard);
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(Difficulty::from_elo(difficulty.elo()), difficulty);
        }
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("Medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!(matches!(
            "grandmaster".parse::<Difficulty>(),
            Err(GameError::UnknownDifficulty { .. })
        ));
    }

    #[test]
    fn test_quiz_points_by_attempt() {
        let mut round = QuizRound::new(MatchId(3), "8/8/8/8/8/8/8/8 w - - 0 1".to_string());
        assert_eq!(round.points(), 1.0);
        round.attempts -= 1;
        assert_eq!(round.points(), 0.5);
    }

    #[test]
    fn test_match_id_per_mode() {
        assert_eq!(GameMode::Idle.match_id(), None);
        let stock = GameMode::Stock {
            match_id: Some(MatchId(9)),
            difficulty: None,
        };
        assert_eq!(stock.match_id(), Some(MatchId(9)));
        assert_eq!(stock.kind(), ModeKind::Stock);
    }
}
