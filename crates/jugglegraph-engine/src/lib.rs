//! Client for the engine service that enumerates juggling states.
//!
//! The engine owns every question about which throws are legal; this crate
//! only fetches its answers and turns failures into [`EngineError`]s the UI
//! can show as they are.

mod client;
mod config;
mod error;
mod types;

pub use client::EngineClient;
pub use config::{DEFAULT_ENGINE_URL, ENGINE_URL_ENV, EngineConfig, RetryPolicy};
pub use error::{DEFAULT_RETRY_AFTER_SECS, EngineError, error_from_response};
pub use types::{ServerConfig, TableResponse, ThrowOption, ThrowsResponse};
