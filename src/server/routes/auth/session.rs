//! Session endpoints: current account and logout

use crate::server::middleware::current_account;
use crate::server::middleware::helpers::SESSION_COOKIE;
use crate::server::routes::ApiResponse;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse};
use tracing::info;

use super::models::AccountInfo;

/// Return the authenticated account's profile
pub async fn me(req: HttpRequest) -> Result<HttpResponse, actix_web::Error> {
    let account = current_account(&req)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Authenticated",
        AccountInfo::from(&account),
    )))
}

/// Clear the session cookie
///
/// Tokens are stateless; logout expires the browser cookie and leaves
/// token invalidation to the short access-token lifetime.
pub async fn logout(req: HttpRequest) -> Result<HttpResponse, actix_web::Error> {
    let account = current_account(&req)?;
    info!("Account {} logged out", account.id);

    let expired = Cookie::build(SESSION_COOKIE, "")
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(CookieDuration::ZERO)
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(expired)
        .json(ApiResponse::message("Logged out")))
}
