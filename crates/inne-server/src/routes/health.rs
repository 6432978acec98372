//! Liveness check.

use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Highest applied migration.
    pub schema_version: i64,
}

/// GET /health
pub async fn health_check(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Json<HealthResponse>, AppError> {
    let with_id = |e: inne_core::Error| AppError::new(e).with_request_id(request_id.0.clone());

    let conn = inne_db::pool::get_conn(&ctx.db).map_err(with_id)?;
    let schema_version = inne_db::migrations::current_version(&conn).map_err(with_id)?;

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        schema_version,
    }))
}
