use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use catalog_db::ProductRepository;
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    repository: Arc<dyn ProductRepository>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub repository: HealthCheck,
    pub checked_at: String,
}

pub fn router(repository: Arc<dyn ProductRepository>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { repository })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let repository = repository_check(state.repository.as_ref()).await;
    let ready = repository.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "catalog-server runtime initialized".to_string(),
        },
        repository,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn repository_check(repository: &dyn ProductRepository) -> HealthCheck {
    match repository.len().await {
        Ok(count) => {
            HealthCheck { status: "ready", detail: format!("{count} products in catalog") }
        }
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("catalog query failed: {error}") }
        }
    }
}
