//! Health check endpoint

use crate::server::routes::ApiResponse;
use actix_web::HttpResponse;
use serde::Serialize;

/// Health payload
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness probe; public and unauthenticated
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        "Service is healthy",
        HealthStatus {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    ))
}
