//! Shared building blocks for the Botsmith services.
//!
//! - [`config`]: environment-driven settings (Gemini credentials, model
//!   preference list, store location and caps, server bind).
//! - [`error`]: unified error type with HTTP status mapping.
//! - [`logging`]: tracing subscriber setup.

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::Settings;
pub use error::{Error, Result};
