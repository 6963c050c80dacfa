//! Core module - configuration and application infrastructure
//!
//! # Modules
//!
//! - `config` - [`ClientConfig`] and its JSON persistence in the platform
//!   config directory, plus datastore credentials from the environment
//! - `error` - [`CoreError`] and the [`CoreResult`] alias

pub mod config;
pub mod error;

pub use config::{credentials_from_env, ClientConfig};
pub use error::{CoreError, CoreResult};
