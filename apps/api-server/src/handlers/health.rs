//! Health check endpoint.

use actix_web::{HttpResponse, web};
use quill_shared::dto::HealthResponse;

use crate::state::AppState;

/// GET /api/health
///
/// Reports `degraded` with 503 when a configured database stops answering.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let healthy = database_ok(&state).await;
    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[cfg(feature = "postgres")]
async fn database_ok(state: &AppState) -> bool {
    match &state.db {
        Some(db) => match db.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Database health check failed");
                false
            }
        },
        None => true,
    }
}

#[cfg(not(feature = "postgres"))]
async fn database_ok(_state: &AppState) -> bool {
    true
}
