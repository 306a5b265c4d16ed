//! Event intake handler.
//!
//! The transport delivers the envelope as the POST body and redelivers on any
//! non-2xx answer. Skips are acknowledged with 200; fatal errors map to a
//! status that says what went wrong.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::json;
use tracing::Instrument;

use budgetguard_core::alert::EventEnvelope;
use budgetguard_core::error::{ErrorCode, GuardError, Result};

use crate::app_state::AppState;
use crate::guard::InvocationReport;

pub async fn handle_event(State(app): State<AppState>, body: Bytes) -> Response {
    let span = tracing::info_span!(
        "invocation",
        message_id = tracing::field::Empty,
        subscription = tracing::field::Empty
    );

    async move {
        match run(&app, &body).await {
            Ok(report) => (StatusCode::OK, Json(report)).into_response(),
            Err(e) => {
                tracing::error!(code = e.code().as_str(), error = %e, "budget guard invocation failed");
                let body = json!({
                    "status": "error",
                    "code": e.code().as_str(),
                    "message": e.to_string(),
                });
                (status_for(&e), Json(body)).into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn run(app: &AppState, body: &[u8]) -> Result<InvocationReport> {
    let env = EventEnvelope::from_slice(body)?;
    let span = tracing::Span::current();
    if let Some(id) = env.message_id() {
        span.record("message_id", id);
    }
    if let Some(sub) = env.subscription.as_deref() {
        span.record("subscription", sub);
    }
    app.guard().handle(&env).await
}

/// HTTP status for an invocation error. Skip-class errors are acknowledged.
pub fn status_for(e: &GuardError) -> StatusCode {
    match e.code() {
        ErrorCode::InvalidBudget | ErrorCode::MissingConfiguration => StatusCode::OK,
        ErrorCode::MalformedPayload => StatusCode::BAD_REQUEST,
        ErrorCode::OperationFailed | ErrorCode::ApiError => StatusCode::BAD_GATEWAY,
        ErrorCode::OperationTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::PolicyConflict => StatusCode::CONFLICT,
        ErrorCode::InvalidConfiguration
        | ErrorCode::Credentials
        | ErrorCode::PartialFailure
        | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
