//! Telegram webhook endpoint

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use photosync_core::constants::WEBHOOK_SECRET_HEADER;
use photosync_core::AppError;
use photosync_telegram::Update;
use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::error::HttpAppError;
use crate::services::ingest::IngestOutcome;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&IngestOutcome> for WebhookResponse {
    fn from(outcome: &IngestOutcome) -> Self {
        let (category, reason) = match outcome {
            IngestOutcome::Saved { file, reason, .. } => {
                (Some(file.category.clone()), Some(reason.to_string()))
            }
            _ => (None, None),
        };
        Self {
            success: outcome.is_success(),
            code: outcome.code().to_string(),
            message: outcome.summary(),
            file_path: outcome.file_path().map(|p| p.display().to_string()),
            category,
            reason,
        }
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn verify_secret(expected: Option<&str>, headers: &HeaderMap) -> Result<(), HttpAppError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let provided = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if secure_compare(provided, expected) {
        Ok(())
    } else {
        tracing::warn!("Webhook call with missing or invalid secret token");
        Err(AppError::Unauthorized("invalid webhook secret".to_string()).into())
    }
}

/// Every processed delivery answers 200 so Telegram does not redeliver it;
/// the outcome travels in the body.
pub async fn receive_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<Update>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    verify_secret(state.webhook_secret(), &headers)?;
    let Json(update) = payload?;

    let outcome = state.orchestrator.handle_update(&update).await;
    Ok(Json(WebhookResponse::from(&outcome)))
}
