//! Authentication endpoints

mod email;
mod login;
mod models;
mod password;
mod register;
mod session;
mod token;

pub use email::verify_email;
pub use login::login;
pub use models::{
    AccountInfo, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LoginResponse,
    RefreshRequest, RegisterRequest, ResetPasswordRequest, VerifyEmailRequest,
};
pub use password::{change_password, forgot_password, reset_password};
pub use register::register;
pub use session::{logout, me};
pub use token::refresh;

use actix_web::web;

/// Configure authentication routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/refresh", web::post().to(refresh))
            .route("/forgot-password", web::post().to(forgot_password))
            .route("/reset-password", web::post().to(reset_password))
            .route("/verify-email", web::post().to(verify_email))
            .route("/change-password", web::post().to(change_password))
            .route("/me", web::get().to(me)),
    );
}
