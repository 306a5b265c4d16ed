//! budgetguard intake server
//!
//! - Budget alert endpoint: POST / (Pub/Sub push envelope)
//! - Config from the environment (optionally a YAML file), validated at startup
//! - One access token per remediating invocation

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use budgetguard_core::error::{GuardError, Result};
use budgetguard_runtime::api::HttpConnector;
use budgetguard_runtime::auth::{MetadataServer, StaticToken, TokenSource};
use budgetguard_runtime::clock::SystemClock;
use budgetguard_runtime::{app_state, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "budgetguard failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg = config::load_from_env(std::env::vars())?;
    let listen: SocketAddr = cfg.server.listen.parse().map_err(|e| {
        GuardError::InvalidConfiguration(format!("server.listen must be a valid SocketAddr: {e}"))
    })?;

    let http = reqwest::Client::builder()
        .timeout(cfg.api.request_timeout())
        .build()
        .map_err(|e| GuardError::Internal(format!("failed to build HTTP client: {e}")))?;

    let tokens: Arc<dyn TokenSource> = match &cfg.api.access_token {
        Some(token) => Arc::new(StaticToken::new(token.expose())),
        None => Arc::new(MetadataServer::new(http.clone())),
    };
    let connector = HttpConnector::new(http, cfg.api.base_url.clone(), tokens);

    if cfg.target.resources().is_err() {
        tracing::error!("GCP_PROJECT_ID or CLOUD_RUN_SERVICES not set; alerts will be acknowledged without remediation");
    }
    tracing::info!(
        %listen,
        threshold = cfg.guard.threshold,
        dry_run = cfg.guard.dry_run,
        failure_policy = ?cfg.guard.failure_policy,
        services = cfg.target.services.len(),
        "budgetguard starting"
    );

    let state = app_state::AppState::new(cfg, Arc::new(connector), Arc::new(SystemClock));
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| GuardError::Internal(format!("failed to bind {listen}: {e}")))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| GuardError::Internal(format!("server failed: {e}")))
}
