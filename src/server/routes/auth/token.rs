//! Token refresh endpoint

use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::PortalError;
use actix_web::{web, HttpResponse};

use super::models::RefreshRequest;

/// Exchange a refresh token for a new token pair
pub async fn refresh(
    state: web::Data<AppState>,
    request: web::Json<RefreshRequest>,
) -> Result<HttpResponse, PortalError> {
    let pair = state.auth.refresh(&request.refresh_token).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Token refreshed", pair)))
}
