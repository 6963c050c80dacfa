//! Client side of the remote stockfish/quiz service
//!
//! The service owns one engine instance per match id and exposes it through
//! ad hoc query-string endpoints. This crate turns those endpoints into a
//! typed [`Request`]/[`Reply`] vocabulary behind the [`ChessService`] trait,
//! and adds the leaderboard/history datastore writes.

pub mod client;
pub mod error;
pub mod protocol;
pub mod service;
pub mod store;

pub use client::EngineClient;
pub use error::{ServiceError, ServiceResult};
pub use protocol::{EngineReply, MatchId, Mate, Reply, Request};
pub use service::{ChessService, HttpChessService, ServiceSettings};
pub use store::{Credentials, ScoreStore};
