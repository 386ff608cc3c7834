//! Login endpoint

use crate::server::middleware::helpers::SESSION_COOKIE;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::PortalError;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use tracing::info;

use super::models::{AccountInfo, LoginRequest, LoginResponse};

/// Authenticate credentials and issue tokens
///
/// Besides the JSON token pair, the access token is set as an HttpOnly
/// cookie for browser sessions.
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, PortalError> {
    info!("Login attempt for {}", request.email);

    let (account, pair) = state.auth.login(&request.email, &request.password).await?;

    let access_ttl_minutes = state.config.auth.access_ttl_minutes;
    let cookie = Cookie::build(SESSION_COOKIE, pair.access_token.clone())
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(CookieDuration::minutes(access_ttl_minutes as i64))
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(ApiResponse::success(
        "Login successful",
        LoginResponse {
            account: AccountInfo::from(&account),
            tokens: pair,
        },
    )))
}
