//! Field-level input validation for registration and profile data

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

// Sri Lankan NIC: old format 9 digits + V/X, new format 12 digits.
static NIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]{9}[VvXx]|[0-9]{12})$").expect("valid NIC regex"));

/// Validate an email address, returning a field-level message on failure
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("email: is required".to_string());
    }
    if email.len() > 254 {
        return Err("email: is too long".to_string());
    }
    if !EMAIL_RE.is_match(email) {
        return Err("email: is not a valid email address".to_string());
    }
    Ok(())
}

/// Validate a person's full name
pub fn validate_full_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("full_name: is required".to_string());
    }
    if trimmed.len() < 2 {
        return Err("full_name: must be at least 2 characters".to_string());
    }
    if trimmed.len() > 100 {
        return Err("full_name: must be at most 100 characters".to_string());
    }
    Ok(())
}

/// Validate a national identity card number if supplied
pub fn validate_nic(nic: &str) -> Result<(), String> {
    if !NIC_RE.is_match(nic) {
        return Err("nic: is not a valid NIC number".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_accepts_normal_addresses() {
        assert!(validate_email("nimal@example.com").is_ok());
        assert!(validate_email("k.perera+tag@gov.lk").is_ok());
    }

    #[test]
    fn test_validate_email_rejects_malformed() {
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn test_validate_nic_formats() {
        assert!(validate_nic("853421671V").is_ok());
        assert!(validate_nic("199534216718").is_ok());
        assert!(validate_nic("12345").is_err());
        assert!(validate_nic("85342167AV").is_err());
    }

    #[test]
    fn test_validate_full_name() {
        assert!(validate_full_name("Nimal Perera").is_ok());
        assert!(validate_full_name(" ").is_err());
        assert!(validate_full_name("A").is_err());
    }
}
