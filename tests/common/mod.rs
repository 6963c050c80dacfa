//! In-memory stand-in for the remote engine service

#![allow(dead_code)]

use engine_service::{
    ChessService, EngineReply, MatchId, Reply, Request, ServiceError, ServiceResult,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// White to play, `d1d8` mates
pub const MATE_IN_ONE: &str = "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1";

pub const MATCH_ID: MatchId = MatchId(42);

/// Answers every request from a script and records what it was asked
pub struct FakeServer {
    pub puzzle: String,
    pub best_move: String,
    /// Move that `CheckMate` reports as mate
    pub mating_move: String,
    engine_replies: Mutex<VecDeque<EngineReply>>,
    log: Mutex<Vec<Request>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self {
            puzzle: MATE_IN_ONE.to_string(),
            best_move: "d1d8".to_string(),
            mating_move: "d8h4".to_string(),
            engine_replies: Mutex::new(VecDeque::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_engine_replies(self, replies: impl IntoIterator<Item = EngineReply>) -> Self {
        self.engine_replies.lock().unwrap().extend(replies);
        self
    }

    pub fn log(&self) -> Vec<Request> {
        self.log.lock().unwrap().clone()
    }

    /// Request names in the order they were executed
    pub fn names(&self) -> Vec<&'static str> {
        self.log().iter().map(Request::name).collect()
    }
}

impl ChessService for FakeServer {
    fn execute(&self, request: &Request) -> ServiceResult<Reply> {
        self.log.lock().unwrap().push(request.clone());
        match request {
            Request::StartMatch => Ok(Reply::MatchStarted(MATCH_ID)),
            Request::StartQuiz => Ok(Reply::QuizLoaded {
                match_id: MATCH_ID,
                fen: self.puzzle.clone(),
            }),
            Request::SetDifficulty { elo, .. } => Ok(Reply::DifficultySet { elo: elo.clone() }),
            Request::CheckMate { mv, .. } => Ok(Reply::MateChecked {
                mate: *mv == self.mating_move,
            }),
            Request::EngineMove { .. } => self
                .engine_replies
                .lock()
                .unwrap()
                .pop_front()
                .map(Reply::EngineReplied)
                .ok_or(ServiceError::MissingField { field: "response" }),
            Request::BestMove { .. } => Ok(Reply::BestMove(self.best_move.clone())),
            Request::Undo { fen, .. } => Ok(Reply::Undone { result: fen.clone() }),
            Request::ResetMatch { .. }
            | Request::StoreQuizScore { .. }
            | Request::StoreGameHistory { .. } => Ok(Reply::Ack),
        }
    }
}
