//! Pocket Chess client library
//!
//! Local two-player chess, a puzzle quiz and games against a remote engine.
//! See [`game`] for the client logic and [`core`] for configuration.

pub mod core;
pub mod game;
