//! End-to-end tests for the authentication surface
//!
//! Each test assembles the full app (rate limiter, authenticator,
//! routes) around a fresh in-memory store, so the flows are exercised
//! exactly as a client sees them.

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpResponse};
use govpass::config::Config;
use govpass::core::models::{Account, AccountStatus};
use govpass::server::middleware::{AuthMiddleware, RateLimitMiddleware};
use govpass::server::routes;
use govpass::server::state::AppState;
use govpass::services::email::LogEmailNotifier;
use govpass::storage::{AccountStore, MemoryAccountStore};
use serde_json::{json, Value};
use std::sync::Arc;

fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.access_secret = "integration-access-secret-0123456789abcdef".to_string();
    config.auth.refresh_secret = "integration-refresh-secret-0123456789abcde".to_string();
    config.auth.bcrypt_cost = 4;
    config
}

fn portal_state(config: Config) -> (web::Data<AppState>, Arc<MemoryAccountStore>) {
    let store = Arc::new(MemoryAccountStore::new());
    let state = AppState::with_collaborators(config, store.clone(), Arc::new(LogEmailNotifier));
    (web::Data::new(state), store)
}

macro_rules! portal_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .wrap(AuthMiddleware)
                .wrap(RateLimitMiddleware)
                .configure(routes::configure_routes),
        )
        .await
    };
}

/// Dispatch a request, rendering middleware rejections the way the
/// server would
async fn send<S, B, R>(app: &S, req: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            let body = test::read_body_json(resp).await;
            (status, body)
        }
        Err(err) => {
            let resp = HttpResponse::from_error(err);
            let status = resp.status();
            let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, body)
        }
    }
}

fn register_body(email: &str) -> Value {
    json!({
        "full_name": "Nimal Perera",
        "email": email,
        "identity_number": "853421671V",
        "password": "Sensible1Pass"
    })
}

fn login_body(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}

async fn registered_active(
    state: &web::Data<AppState>,
    store: &MemoryAccountStore,
    email: &str,
) -> Account {
    let account = state
        .auth
        .register(govpass::auth::Registration {
            full_name: "Nimal Perera".to_string(),
            email: email.to_string(),
            identity_number: None,
            password: "Sensible1Pass".to_string(),
        })
        .await
        .unwrap();
    store.mark_email_verified(account.id).await.unwrap()
}

#[actix_web::test]
async fn health_is_public() {
    let (state, _) = portal_state(test_config());
    let app = portal_app!(state);

    let (status, body) = send(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("ok"));
}

#[actix_web::test]
async fn register_login_me_flow() {
    let (state, _) = portal_state(test_config());
    let app = portal_app!(state);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(register_body("nimal@example.com"))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("pending_verification"));
    // The hash never leaves the server
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body("nimal@example.com", "Sensible1Pass"))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access_token = body["data"]["tokens"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("authorization", format!("Bearer {}", access_token)))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], json!("nimal@example.com"));
}

#[actix_web::test]
async fn me_requires_a_token() {
    let (state, _) = portal_state(test_config());
    let app = portal_app!(state);

    let (status, body) = send(
        &app,
        test::TestRequest::get().uri("/api/auth/me").to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
}

#[actix_web::test]
async fn session_cookie_authenticates() {
    let (state, store) = portal_state(test_config());
    registered_active(&state, &store, "nimal@example.com").await;
    let app = portal_app!(state);

    let (_, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body("nimal@example.com", "Sensible1Pass"))
            .to_request(),
    )
    .await;
    let access_token = body["data"]["tokens"]["access_token"].as_str().unwrap();

    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("cookie", format!("govpass_token={}", access_token)))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn register_reports_field_errors() {
    let (state, _) = portal_state(test_config());
    let app = portal_app!(state);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "full_name": "",
                "email": "not-an-email",
                "password": "weak"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    let errors = body["errors"].as_array().unwrap();
    assert!(errors.iter().any(|e| e.as_str().unwrap().starts_with("email:")));
    assert!(errors.iter().any(|e| e.as_str().unwrap().starts_with("password:")));
}

#[actix_web::test]
async fn duplicate_email_conflicts() {
    let (state, _) = portal_state(test_config());
    let app = portal_app!(state);

    let first = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(register_body("nimal@example.com"))
        .to_request();
    let (status, _) = send(&app, first).await;
    assert_eq!(status, StatusCode::CREATED);

    let second = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(register_body("nimal@example.com"))
        .to_request();
    let (status, body) = send(&app, second).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
}

#[actix_web::test]
async fn lockout_after_repeated_failures() {
    let (state, store) = portal_state(test_config());
    let account = registered_active(&state, &store, "nimal@example.com").await;
    let app = portal_app!(state);

    for attempt in 1..=4u32 {
        let (status, _) = send(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(login_body("nimal@example.com", "WrongPass1"))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let current = store.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(current.login_attempts, attempt);
    }

    // Fifth failure locks the account
    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body("nimal@example.com", "WrongPass1"))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().contains("minutes"));

    // Correct password is still rejected while the lockout holds
    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body("nimal@example.com", "Sensible1Pass"))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn suspension_cuts_off_live_sessions() {
    let (state, store) = portal_state(test_config());
    let account = registered_active(&state, &store, "nimal@example.com").await;
    let app = portal_app!(state);

    let (_, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body("nimal@example.com", "Sensible1Pass"))
            .to_request(),
    )
    .await;
    let access_token = body["data"]["tokens"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("authorization", format!("Bearer {}", access_token)))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    store
        .update_status(account.id, AccountStatus::Suspended)
        .await
        .unwrap();

    // Same unexpired token, now rejected
    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("authorization", format!("Bearer {}", access_token)))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().contains("suspended"));
}

#[actix_web::test]
async fn refresh_rotates_and_respects_status() {
    let (state, store) = portal_state(test_config());
    let account = registered_active(&state, &store, "nimal@example.com").await;
    let app = portal_app!(state);

    let (_, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body("nimal@example.com", "Sensible1Pass"))
            .to_request(),
    )
    .await;
    let refresh_token = body["data"]["tokens"]["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/refresh")
            .set_json(json!({ "refresh_token": refresh_token }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["access_token"].as_str().is_some());

    store
        .update_status(account.id, AccountStatus::Deactivated)
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/refresh")
            .set_json(json!({ "refresh_token": refresh_token }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().contains("not active"));
}

#[actix_web::test]
async fn access_token_rejected_as_refresh() {
    let (state, store) = portal_state(test_config());
    registered_active(&state, &store, "nimal@example.com").await;
    let app = portal_app!(state);

    let (_, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body("nimal@example.com", "Sensible1Pass"))
            .to_request(),
    )
    .await;
    let access_token = body["data"]["tokens"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/refresh")
            .set_json(json!({ "refresh_token": access_token }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Invalid token"));
}

#[actix_web::test]
async fn forgot_password_does_not_reveal_accounts() {
    let (state, store) = portal_state(test_config());
    registered_active(&state, &store, "nimal@example.com").await;
    let app = portal_app!(state);

    let known = test::TestRequest::post()
        .uri("/api/auth/forgot-password")
        .set_json(json!({ "email": "nimal@example.com" }))
        .to_request();
    let (known_status, known_body) = send(&app, known).await;

    let unknown = test::TestRequest::post()
        .uri("/api/auth/forgot-password")
        .set_json(json!({ "email": "ghost@example.com" }))
        .to_request();
    let (unknown_status, unknown_body) = send(&app, unknown).await;

    assert_eq!(known_status, StatusCode::OK);
    assert_eq!(known_status, unknown_status);
    assert_eq!(known_body["message"], unknown_body["message"]);
}

#[actix_web::test]
async fn reset_password_end_to_end() {
    let (state, store) = portal_state(test_config());
    registered_active(&state, &store, "nimal@example.com").await;
    let app = portal_app!(state);

    let token = state
        .auth
        .request_password_reset("nimal@example.com")
        .await
        .unwrap()
        .expect("reset token");

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/reset-password")
            .set_json(json!({ "token": token, "new_password": "Brand2NewPass" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body("nimal@example.com", "Brand2NewPass"))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The link is single-use
    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/reset-password")
            .set_json(json!({ "token": token, "new_password": "Other3Password" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn verify_email_activates_account() {
    let (state, store) = portal_state(test_config());
    let app = portal_app!(state);

    let (_, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(register_body("nimal@example.com"))
            .to_request(),
    )
    .await;
    let id: uuid::Uuid = serde_json::from_value(body["data"]["id"].clone()).unwrap();
    let account = store.find_by_id(id).await.unwrap().unwrap();

    let token = state
        .auth
        .tokens()
        .issue(govpass::TokenKind::EmailVerification, &account)
        .unwrap();

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/verify-email")
            .set_json(json!({ "token": token }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("active"));
    assert_eq!(body["data"]["email_verified"], json!(true));
}

#[actix_web::test]
async fn change_password_needs_current_password() {
    let (state, store) = portal_state(test_config());
    registered_active(&state, &store, "nimal@example.com").await;
    let app = portal_app!(state);

    let (_, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body("nimal@example.com", "Sensible1Pass"))
            .to_request(),
    )
    .await;
    let access_token = body["data"]["tokens"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/change-password")
            .insert_header(("authorization", format!("Bearer {}", access_token)))
            .set_json(json!({
                "current_password": "WrongPass1",
                "new_password": "Brand2NewPass"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/change-password")
            .insert_header(("authorization", format!("Bearer {}", access_token)))
            .set_json(json!({
                "current_password": "Sensible1Pass",
                "new_password": "Brand2NewPass"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn role_policy_blocks_citizens_from_admin_routes() {
    let (state, store) = portal_state(test_config());
    registered_active(&state, &store, "nimal@example.com").await;
    let app = portal_app!(state);

    let (_, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body("nimal@example.com", "Sensible1Pass"))
            .to_request(),
    )
    .await;
    let access_token = body["data"]["tokens"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/admin/accounts")
            .insert_header(("authorization", format!("Bearer {}", access_token)))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn booking_routes_require_a_complete_profile() {
    let (state, store) = portal_state(test_config());
    let account = registered_active(&state, &store, "nimal@example.com").await;
    let app = portal_app!(state);

    let (_, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(login_body("nimal@example.com", "Sensible1Pass"))
            .to_request(),
    )
    .await;
    let access_token = body["data"]["tokens"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/bookings")
            .insert_header(("authorization", format!("Bearer {}", access_token)))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().contains("profile"));

    store.set_profile_complete(account.id, true).await.unwrap();

    // Policy now passes; the path itself has no handler in this service
    let resp = test::try_call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/bookings")
            .insert_header(("authorization", format!("Bearer {}", access_token)))
            .to_request(),
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn auth_endpoints_are_rate_limited() {
    let mut config = test_config();
    config.rate_limit.auth.max_requests = 2;
    let (state, _) = portal_state(config);
    let app = portal_app!(state);

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .insert_header(("x-forwarded-for", "203.0.113.9"))
                .set_json(login_body("ghost@example.com", "Whatever1"))
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .insert_header(("x-forwarded-for", "203.0.113.9"))
            .set_json(login_body("ghost@example.com", "Whatever1"))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["message"].as_str().unwrap().contains("seconds"));

    // Another client still gets through
    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .insert_header(("x-forwarded-for", "203.0.113.10"))
            .set_json(login_body("ghost@example.com", "Whatever1"))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
