//! Chess client logic
//!
//! A board model on top of `shakmaty`, a controller state machine for the
//! three game modes, and two drivers that execute its requests against the
//! engine service.
//!
//! # Module Organization
//!
//! - `types` - piece kinds, glyphs and display identities
//! - `board` - [`ChessBoard`], legal targets and move application
//! - `history` - [`MoveRecord`] and the wire/history notations
//! - `reconcile` - keeps piece identities stable across position changes
//! - `mode` - game modes, phases, difficulty and quiz bookkeeping
//! - `events` - controller inputs and one-shot UI events
//! - `snapshot` - what a view needs to draw the current state
//! - `controller` - [`GameController`], the state machine itself
//! - `session` - synchronous driver used by the command line
//! - `plugin` - Bevy driver running requests on the async task pool
//!
//! # Request Flow
//!
//! The controller never performs I/O. [`GameController::handle`] and
//! [`GameController::on_reply`] return [`engine_service::Request`]s, and a
//! driver executes them in order, feeding each result back.

pub mod board;
pub mod controller;
pub mod error;
pub mod events;
pub mod history;
pub mod mode;
pub mod plugin;
pub mod reconcile;
pub mod session;
pub mod snapshot;
pub mod types;


pub use board::ChessBoard;
pub use controller::GameController;
pub use error::{GameError, GameResult};
pub use events::{Input, UiEvent};
pub use history::MoveRecord;
pub use mode::{Difficulty, GameMode, ModeKind, Phase};
pub use plugin::{ChessClientPlugin, ChessInput, ChessSnapshot, ChessUiEvent};
pub use session::Session;
pub use snapshot::UiSnapshot;
pub use types::{PieceOnSquare, PieceType};
