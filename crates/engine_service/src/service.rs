//! The seam between the game controller and the outside world

use reqwest::blocking::Client;
use std::time::Duration;
use tracing::info;

use crate::client::EngineClient;
use crate::error::ServiceResult;
use crate::protocol::{Reply, Request};
use crate::store::{Credentials, ScoreStore};

/// Executes one [`Request`] to completion
///
/// Implementations block the calling thread; drivers decide whether that is a
/// UI thread or a background task.
pub trait ChessService: Send + Sync {
    fn execute(&self, request: &Request) -> ServiceResult<Reply>;
}

/// Connection settings for [`HttpChessService`]
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub server_url: String,
    pub database_url: String,
    pub timeout: Duration,
    pub credentials: Option<Credentials>,
}

/// Production service: engine endpoints plus datastore
#[derive(Debug, Clone)]
pub struct HttpChessService {
    engine: EngineClient,
    store: ScoreStore,
}

impl HttpChessService {
    pub fn new(settings: &ServiceSettings) -> ServiceResult<Self> {
        let http = Client::builder().timeout(settings.timeout).build()?;
        let engine = EngineClient::with_http(http.clone(), &settings.server_url)?;
        let store = ScoreStore::new(http, &settings.database_url, settings.credentials.clone())?;
        info!(
            "[SERVICE] Engine at {} (timeout {:?}), signed in: {}",
            engine.base_url(),
            settings.timeout,
            store.is_signed_in()
        );
        Ok(Self { engine, store })
    }
}

impl ChessService for HttpChessService {
    fn execute(&self, request: &Request) -> ServiceResult<Reply> {
        match request {
            Request::StartMatch => self.engine.start_match().map(Reply::MatchStarted),
            Request::StartQuiz => self
                .engine
                .start_quiz()
                .map(|(match_id, fen)| Reply::QuizLoaded { match_id, fen }),
            Request::SetDifficulty { match_id, elo } => self
                .engine
                .set_difficulty(*match_id, elo)
                .map(|elo| Reply::DifficultySet { elo }),
            Request::ResetMatch { match_id } => self.engine.reset(*match_id).map(|_| Reply::Ack),
            Request::CheckMate { match_id, mv } => self
                .engine
                .check_mate(*match_id, mv)
                .map(|mate| Reply::MateChecked { mate }),
            Request::EngineMove { match_id, mv } => self
                .engine
                .engine_move(*match_id, mv)
                .map(Reply::EngineReplied),
            Request::BestMove { match_id } => self.engine.best_move(*match_id).map(Reply::BestMove),
            Request::Undo { match_id, fen } => self
                .engine
                .undo(*match_id, fen)
                .map(|result| Reply::Undone { result }),
            Request::StoreQuizScore { score, date } => {
                self.store.store_quiz_score(*score, date).map(|_| Reply::Ack)
            }
            Request::StoreGameHistory { entry } => {
                self.store.store_game_history(entry).map(|_| Reply::Ack)
            }
        }
    }
}
