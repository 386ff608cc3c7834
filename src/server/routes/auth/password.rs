//! Password endpoints: forgot, reset, change

use crate::server::middleware::current_account;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::PortalError;
use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;

use super::models::{ChangePasswordRequest, ForgotPasswordRequest, ResetPasswordRequest};

/// Begin a password reset
///
/// Answers identically whether or not the email is registered, so the
/// endpoint cannot be used to probe for accounts.
pub async fn forgot_password(
    state: web::Data<AppState>,
    request: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, PortalError> {
    state.auth.request_password_reset(&request.email).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message(
        "If the email exists, a reset link has been sent",
    )))
}

/// Redeem a reset token and set a new password
pub async fn reset_password(
    state: web::Data<AppState>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, PortalError> {
    state
        .auth
        .reset_password(&request.token, &request.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message(
        "Password has been reset. You can now log in with your new password.",
    )))
}

/// Change the password of the authenticated account
pub async fn change_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let account = current_account(&req)?;
    info!("Password change requested by account {}", account.id);

    state
        .auth
        .change_password(account.id, &request.current_password, &request.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Password changed")))
}
