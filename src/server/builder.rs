//! Server assembly and run loop

use crate::config::Config;
use crate::server::middleware::{AuthMiddleware, RateLimitMiddleware};
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{PortalError, Result};
use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_actix_web::TracingLogger;

/// Run the HTTP server until shutdown
///
/// Configuration is validated before anything binds; a missing signing
/// secret aborts startup here rather than surfacing later as broken
/// tokens.
pub async fn run_server(config: Config) -> Result<()> {
    config.validate()?;

    let host = config.server.host.clone();
    let port = config.server.port;
    let state = web::Data::new(AppState::new(config));

    info!("Starting portal API at http://{}:{}", host, port);
    info!("  GET  /health");
    info!("  POST /api/auth/register");
    info!("  POST /api/auth/login");
    info!("  POST /api/auth/refresh");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            // Outermost first: request logging, then the limiter, then auth
            .wrap(AuthMiddleware)
            .wrap(RateLimitMiddleware)
            .wrap(TracingLogger::default())
            .configure(routes::configure_routes)
    })
    .bind((host.as_str(), port))
    .map_err(|e| PortalError::config(format!("Cannot bind {}:{}: {}", host, port, e)))?
    .run()
    .await
    .map_err(|e| PortalError::internal(format!("Server error: {}", e)))
}
