//! Service configuration
//!
//! Loaded from an optional YAML file with environment overrides on top.
//! Signing secrets have no defaults: a missing secret is a fatal
//! configuration error at startup, never a silent fallback.

use crate::utils::error::{PortalError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Authentication settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// Rate limiter settings
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Signing secret for access, email-verification and reset tokens
    #[serde(default)]
    pub access_secret: String,
    /// Signing secret for refresh tokens
    #[serde(default)]
    pub refresh_secret: String,
    /// Issuer claim stamped on every token
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Audience claim stamped on every token
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Access-token lifetime in minutes
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: u64,
    /// Refresh-token lifetime in days
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: u64,
    /// Email-verification token lifetime in hours
    #[serde(default = "default_email_token_ttl_hours")]
    pub email_token_ttl_hours: u64,
    /// Password-reset token lifetime in minutes
    #[serde(default = "default_reset_token_ttl_minutes")]
    pub reset_token_ttl_minutes: u64,
    /// bcrypt cost factor
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            issuer: default_issuer(),
            audience: default_audience(),
            access_ttl_minutes: default_access_ttl_minutes(),
            refresh_ttl_days: default_refresh_ttl_days(),
            email_token_ttl_hours: default_email_token_ttl_hours(),
            reset_token_ttl_minutes: default_reset_token_ttl_minutes(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

/// Fixed-window settings for one named limiter
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LimiterSettings {
    /// Maximum requests allowed per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

/// Rate limiter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// General API traffic
    #[serde(default = "default_general_limiter")]
    pub general: LimiterSettings,
    /// Authentication endpoints (stricter)
    #[serde(default = "default_auth_limiter")]
    pub auth: LimiterSettings,
    /// Sensitive operations such as password reset requests (strictest)
    #[serde(default = "default_sensitive_limiter")]
    pub sensitive: LimiterSettings,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            general: default_general_limiter(),
            auth: default_auth_limiter(),
            sensitive: default_sensitive_limiter(),
        }
    }
}

impl Config {
    /// Load configuration from an optional YAML file plus the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    PortalError::config(format!(
                        "Cannot read config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                serde_yaml::from_str(&raw)
                    .map_err(|e| PortalError::config(format!("Invalid config file: {}", e)))?
            }
            None => Config::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Overlay environment variables onto the file/default values
    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("GOVPASS_ACCESS_SECRET") {
            self.auth.access_secret = secret;
        }
        if let Ok(secret) = std::env::var("GOVPASS_REFRESH_SECRET") {
            self.auth.refresh_secret = secret;
        }
        if let Ok(minutes) = std::env::var("GOVPASS_ACCESS_TTL_MINUTES") {
            if let Ok(minutes) = minutes.parse() {
                self.auth.access_ttl_minutes = minutes;
            }
        }
        if let Ok(days) = std::env::var("GOVPASS_REFRESH_TTL_DAYS") {
            if let Ok(days) = days.parse() {
                self.auth.refresh_ttl_days = days;
            }
        }
        if let Ok(cost) = std::env::var("GOVPASS_BCRYPT_COST") {
            if let Ok(cost) = cost.parse() {
                self.auth.bcrypt_cost = cost;
            }
        }
        if let Ok(port) = std::env::var("GOVPASS_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
    }

    /// Validate the configuration, failing startup on unusable values
    pub fn validate(&self) -> Result<()> {
        if self.auth.access_secret.is_empty() {
            return Err(PortalError::config(
                "Access-token signing secret is not set. Provide auth.access_secret or GOVPASS_ACCESS_SECRET",
            ));
        }
        if self.auth.refresh_secret.is_empty() {
            return Err(PortalError::config(
                "Refresh-token signing secret is not set. Provide auth.refresh_secret or GOVPASS_REFRESH_SECRET",
            ));
        }
        if self.auth.access_secret.len() < 32 || self.auth.refresh_secret.len() < 32 {
            return Err(PortalError::config(
                "Signing secrets must be at least 32 characters",
            ));
        }
        if self.auth.access_secret == self.auth.refresh_secret {
            return Err(PortalError::config(
                "Access and refresh secrets must differ",
            ));
        }
        if self.auth.access_ttl_minutes == 0 || self.auth.refresh_ttl_days == 0 {
            return Err(PortalError::config("Token lifetimes must be non-zero"));
        }
        if !(4..=16).contains(&self.auth.bcrypt_cost) {
            return Err(PortalError::config(
                "bcrypt cost must be between 4 and 16",
            ));
        }
        for limiter in [
            &self.rate_limit.general,
            &self.rate_limit.auth,
            &self.rate_limit.sensitive,
        ] {
            if limiter.max_requests == 0 || limiter.window_secs == 0 {
                return Err(PortalError::config(
                    "Rate limiter windows and request caps must be non-zero",
                ));
            }
        }
        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_issuer() -> String {
    "govpass".to_string()
}

fn default_audience() -> String {
    "govpass-portal".to_string()
}

fn default_access_ttl_minutes() -> u64 {
    15
}

fn default_refresh_ttl_days() -> u64 {
    7
}

fn default_email_token_ttl_hours() -> u64 {
    24
}

fn default_reset_token_ttl_minutes() -> u64 {
    60
}

fn default_bcrypt_cost() -> u32 {
    12
}

fn default_general_limiter() -> LimiterSettings {
    LimiterSettings {
        max_requests: 120,
        window_secs: 60,
    }
}

fn default_auth_limiter() -> LimiterSettings {
    LimiterSettings {
        max_requests: 10,
        window_secs: 60,
    }
}

fn default_sensitive_limiter() -> LimiterSettings {
    LimiterSettings {
        max_requests: 3,
        window_secs: 300,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.auth.access_secret = "a".repeat(40);
        config.auth.refresh_secret = "b".repeat(40);
        config
    }

    #[test]
    fn test_missing_secrets_fail_validation() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(PortalError::Config(_))));
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = valid_config();
        config.auth.access_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_identical_secrets_rejected() {
        let mut config = valid_config();
        config.auth.refresh_secret = config.auth.access_secret.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.auth.access_ttl_minutes, 15);
        assert_eq!(config.auth.refresh_ttl_days, 7);
        assert_eq!(config.auth.email_token_ttl_hours, 24);
        assert_eq!(config.auth.reset_token_ttl_minutes, 60);
        assert_eq!(config.rate_limit.sensitive.max_requests, 3);
        assert!(config.rate_limit.auth.max_requests < config.rate_limit.general.max_requests);
    }

    #[test]
    fn test_load_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            concat!(
                "server:\n",
                "  port: 9000\n",
                "auth:\n",
                "  access_secret: {}\n",
                "  refresh_secret: {}\n",
                "  access_ttl_minutes: 5\n"
            ),
            "x".repeat(40),
            "y".repeat(40)
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.access_ttl_minutes, 5);
        // Unspecified fields keep their defaults
        assert_eq!(config.auth.refresh_ttl_days, 7);
    }

    #[test]
    fn test_zero_limiter_rejected() {
        let mut config = valid_config();
        config.rate_limit.auth.max_requests = 0;
        assert!(config.validate().is_err());
    }
}
