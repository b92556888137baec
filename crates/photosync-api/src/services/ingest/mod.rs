//! Ingestion of media delivered by webhook

mod collaborators;
mod extract;
mod orchestrator;
mod outcome;

pub use collaborators::{Clock, MediaFetcher, OutcomeNotifier, SystemClock};
pub use extract::{extract_media, message_command};
pub use orchestrator::{IngestionOrchestrator, OrchestratorSettings};
pub use outcome::IngestOutcome;
