//! Signed token issuance and verification
//!
//! Four token kinds share two symmetric secrets: access, email-verification
//! and password-reset tokens are signed with the primary secret, refresh
//! tokens with a second one. A common issuer/audience pair namespaces all
//! tokens; the kind itself travels as a claim and verification dispatches
//! on it, so a valid token of the wrong kind is rejected as wrong-kind
//! rather than invalid.

use crate::config::AuthConfig;
use crate::core::models::{Account, AccountRole, AccountStatus};
use crate::utils::error::TokenError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// Token kind discriminator
///
/// Closed set: adding a kind forces every dispatch site through an
/// exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived credential authorizing API requests
    Access,
    /// Long-lived credential for minting new access tokens
    Refresh,
    /// Single-purpose email-verification link token
    EmailVerification,
    /// Single-purpose password-reset link token
    PasswordReset,
}

impl TokenKind {
    /// Stable name used in claims and error messages
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::EmailVerification => "email_verification",
            TokenKind::PasswordReset => "password_reset",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim set carried by every token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: Uuid,
    /// Account email
    pub email: String,
    /// Account role
    pub role: AccountRole,
    /// Token kind discriminator
    pub token_type: TokenKind,
    /// Account status snapshot (access tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
    /// Email-verified snapshot (access tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    /// Profile-complete snapshot (access tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_complete: Option<bool>,
    /// Issued at (unix seconds)
    pub iat: u64,
    /// Expiry (unix seconds)
    pub exp: u64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Token ID
    pub jti: String,
}

/// Access/refresh pair minted at login or refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Scheme, always "Bearer"
    pub token_type: String,
    /// Access-token lifetime in seconds
    pub expires_in: u64,
}

/// Token issuer and verifier
#[derive(Clone)]
pub struct TokenService {
    primary_encoding: EncodingKey,
    primary_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    email_ttl_secs: u64,
    reset_ttl_secs: u64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl TokenService {
    /// Create a token service from validated configuration
    pub fn new(config: &AuthConfig) -> Self {
        let primary = config.access_secret.as_bytes();
        let refresh = config.refresh_secret.as_bytes();

        Self {
            primary_encoding: EncodingKey::from_secret(primary),
            primary_decoding: DecodingKey::from_secret(primary),
            refresh_encoding: EncodingKey::from_secret(refresh),
            refresh_decoding: DecodingKey::from_secret(refresh),
            algorithm: Algorithm::HS256,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl_secs: config.access_ttl_minutes * 60,
            refresh_ttl_secs: config.refresh_ttl_days * 86_400,
            email_ttl_secs: config.email_token_ttl_hours * 3_600,
            reset_ttl_secs: config.reset_token_ttl_minutes * 60,
        }
    }

    /// Access-token lifetime in seconds
    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl_secs
    }

    fn ttl_for(&self, kind: TokenKind) -> u64 {
        match kind {
            TokenKind::Access => self.access_ttl_secs,
            TokenKind::Refresh => self.refresh_ttl_secs,
            TokenKind::EmailVerification => self.email_ttl_secs,
            TokenKind::PasswordReset => self.reset_ttl_secs,
        }
    }

    fn encoding_key_for(&self, kind: TokenKind) -> &EncodingKey {
        match kind {
            TokenKind::Refresh => &self.refresh_encoding,
            _ => &self.primary_encoding,
        }
    }

    fn decoding_key_for(&self, kind: TokenKind) -> &DecodingKey {
        match kind {
            TokenKind::Refresh => &self.refresh_decoding,
            _ => &self.primary_decoding,
        }
    }

    fn alternate_decoding_key(&self, kind: TokenKind) -> &DecodingKey {
        match kind {
            TokenKind::Refresh => &self.primary_decoding,
            _ => &self.refresh_decoding,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation
    }

    /// Issue a token of the given kind for an account
    ///
    /// Access tokens embed a status snapshot; the snapshot is advisory
    /// only, as the authenticator re-checks live status on every request.
    pub fn issue(&self, kind: TokenKind, account: &Account) -> Result<String, TokenError> {
        let now = Utc::now().timestamp() as u64;

        let (status, email_verified, profile_complete) = match kind {
            TokenKind::Access => (
                Some(account.status),
                Some(account.email_verified),
                Some(account.profile_complete),
            ),
            _ => (None, None, None),
        };

        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            role: account.role,
            token_type: kind,
            status,
            email_verified,
            profile_complete,
            iat: now,
            exp: now + self.ttl_for(kind),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, self.encoding_key_for(kind)).map_err(|e| {
            warn!("Token signing failed: {}", e);
            TokenError::Invalid
        })?;

        debug!("Issued {} token for account {}", kind, account.id);
        Ok(token)
    }

    /// Issue an access/refresh pair for an account
    pub fn issue_pair(&self, account: &Account) -> Result<TokenPair, TokenError> {
        let access_token = self.issue(TokenKind::Access, account)?;
        let refresh_token = self.issue(TokenKind::Refresh, account)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl_secs,
        })
    }

    /// Verify a token, expecting a specific kind
    ///
    /// Failure reasons are distinct: `Expired`, `Invalid` (signature,
    /// issuer, audience or structure) and `WrongKind` (a genuine token
    /// of another kind presented to the wrong endpoint).
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let validation = self.validation();

        let claims = match decode::<Claims>(token, self.decoding_key_for(expected), &validation) {
            Ok(data) => data.claims,
            Err(e) => return Err(self.classify_failure(token, expected, &validation, e)),
        };

        if claims.token_type != expected {
            return Err(TokenError::WrongKind {
                expected: expected.as_str(),
                actual: claims.token_type.as_str(),
            });
        }

        Ok(claims)
    }

    /// Map a decode failure onto the error taxonomy
    ///
    /// A signature mismatch may just mean the token was signed with the
    /// other secret (access presented as refresh, or vice versa). Decoding
    /// once more with the alternate key distinguishes a cross-kind replay
    /// from a forged token.
    fn classify_failure(
        &self,
        token: &str,
        expected: TokenKind,
        validation: &Validation,
        error: jsonwebtoken::errors::Error,
    ) -> TokenError {
        use jsonwebtoken::errors::ErrorKind;

        match error.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => {
                match decode::<Claims>(token, self.alternate_decoding_key(expected), validation) {
                    Ok(data) if data.claims.token_type != expected => TokenError::WrongKind {
                        expected: expected.as_str(),
                        actual: data.claims.token_type.as_str(),
                    },
                    _ => TokenError::Invalid,
                }
            }
            _ => {
                warn!("Token verification failed: {}", error);
                TokenError::Invalid
            }
        }
    }
}
