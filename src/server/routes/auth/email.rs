//! Email verification endpoint

use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::PortalError;
use actix_web::{web, HttpResponse};

use super::models::{AccountInfo, VerifyEmailRequest};

/// Redeem an email-verification token, activating a pending account
pub async fn verify_email(
    state: web::Data<AppState>,
    request: web::Json<VerifyEmailRequest>,
) -> Result<HttpResponse, PortalError> {
    let account = state.auth.verify_email(&request.token).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Email verified",
        AccountInfo::from(&account),
    )))
}
