//! Citizen registration endpoint

use crate::auth::Registration;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::PortalError;
use actix_web::{web, HttpResponse};
use tracing::info;

use super::models::{AccountInfo, RegisterRequest};

/// Register a new citizen account
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, PortalError> {
    let request = request.into_inner();
    info!("Registration attempt for {}", request.email);

    let account = state
        .auth
        .register(Registration {
            full_name: request.full_name,
            email: request.email,
            identity_number: request.identity_number,
            password: request.password,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Registration successful. Please check your email to verify your account.",
        AccountInfo::from(&account),
    )))
}
