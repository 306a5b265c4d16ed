//! Axum router wiring.
//!
//! - `POST /`      : budget alert intake
//! - `GET /healthz`: liveness

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, intake, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(intake::handle_event))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
