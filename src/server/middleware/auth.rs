//! Authentication middleware
//!
//! Rejects requests to protected routes unless they carry a valid
//! access token for an account in good standing. The account document
//! is re-fetched on every request so a suspension or deactivation
//! takes effect immediately, and the route policy table is applied
//! before the handler runs.

use crate::auth::policy::{self, RoutePolicy};
use crate::core::models::Account;
use crate::server::middleware::helpers::extract_access_token;
use crate::server::state::AppState;
use crate::utils::error::PortalError;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use tracing::{debug, warn};

/// Account attached to a request after authentication
#[derive(Debug, Clone)]
pub struct AuthedAccount(pub Account);

/// Auth middleware for Actix-web
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

/// Service implementation for auth middleware
pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let path = req.path().to_string();

        if policy::is_public_route(&path) {
            return Box::pin(service.call(req));
        }

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .ok_or_else(|| PortalError::internal("Application state missing"))?;

            let token = extract_access_token(req.headers())
                .ok_or_else(|| PortalError::auth("Authentication required"))?;

            let account = state.auth.authenticate_access(&token).await.map_err(|e| {
                warn!("Rejected request to {}: {}", path, e);
                e
            })?;

            if let Some(route) = policy::policy_for(&path) {
                authorize_logged(route, &account, &path)?;
            }

            debug!("Authenticated account {} for {}", account.id, path);
            req.extensions_mut().insert(AuthedAccount(account));

            service.call(req).await
        })
    }
}

fn authorize_logged(
    route: &RoutePolicy,
    account: &Account,
    path: &str,
) -> Result<(), actix_web::Error> {
    policy::authorize(route, account).map_err(|e| {
        warn!(
            "Account {} ({}) denied access to {}: {}",
            account.id, account.role, path, e
        );
        e.into()
    })
}

/// Extract the authenticated account from a handler's request
pub fn current_account(req: &HttpRequest) -> Result<Account, actix_web::Error> {
    req.extensions()
        .get::<AuthedAccount>()
        .map(|authed| authed.0.clone())
        .ok_or_else(|| PortalError::auth("Authentication required").into())
}
