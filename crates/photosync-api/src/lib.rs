//! PhotoSync API Library
//!
//! The ingestion orchestrator and the axum application that receives Telegram
//! webhook deliveries.

pub mod constants;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use services::ingest::{IngestOutcome, IngestionOrchestrator, OrchestratorSettings};
