use std::fmt::Write;
use std::sync::Arc;

use axum::extract::State;
use photosync_core::constants::VERSION;

use crate::constants::API_PREFIX;
use crate::state::AppState;

/// Plain-text service banner
pub async fn index(State(state): State<Arc<AppState>>) -> String {
    let classifier = state.orchestrator.classifier();
    let mut banner = format!("PhotoSync v{}\n\nEndpoints:\n", VERSION);
    for (method, path) in [("POST", "/webhook"), ("GET", "/health"), ("GET", "/stats")] {
        let _ = writeln!(banner, "  {:<5}{}{}", method, API_PREFIX, path);
    }
    let _ = writeln!(banner, "\nCategories:");
    for name in classifier.table().category_names() {
        let _ = writeln!(banner, "  {}", name);
    }
    let _ = writeln!(banner, "  {} (default)", classifier.table().default_category());
    let _ = writeln!(
        banner,
        "\nAuto-classification: {}",
        if classifier.is_enabled() { "on" } else { "off" }
    );
    banner
}
