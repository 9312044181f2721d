//! Input validation and display masking utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate phone number
///
/// Only presence is checked; the backend decides which formats it accepts.
pub fn validate_phone_number(phone_number: &str) -> Result<(), String> {
    if phone_number.trim().is_empty() {
        return Err("Please enter your phone number".to_string());
    }
    Ok(())
}

/// Validate one-time password
pub fn validate_otp(otp: &str) -> Result<(), String> {
    if otp.trim().is_empty() {
        return Err("Please enter the OTP".to_string());
    }
    Ok(())
}

/// Validate phone number and password for password login
pub fn validate_password_login(phone_number: &str, password: &str) -> Result<(), String> {
    if phone_number.trim().is_empty() || password.is_empty() {
        return Err("Please enter both phone number and password".to_string());
    }
    Ok(())
}

/// Hide the middle of a phone number: `919876543210` → `919******210`
///
/// Only the first run of eleven digits is masked; shorter numbers are shown
/// unchanged.
pub fn mask_phone_number(phone_number: &str) -> String {
    static MASK_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = MASK_REGEX.get_or_init(|| {
        Regex::new(r"(\d{3})\d{6}(\d{2})").expect("Failed to compile phone mask regex")
    });

    regex.replace(phone_number, "${1}******${2}").into_owned()
}

/// Hide most of the local part of an email: `lakshmi@example.org` → `la****@example.org`
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let visible: String = local.chars().take(2).collect();
            format!("{}****@{}", visible, domain)
        }
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number_only_needs_to_be_present() {
        assert!(validate_phone_number("9876543210").is_ok());
        assert!(validate_phone_number("+91 98765 43210").is_ok());
        assert!(validate_phone_number("98765").is_ok());
        assert_eq!(
            validate_phone_number("  ").unwrap_err(),
            "Please enter your phone number"
        );
    }

    #[test]
    fn test_otp_only_needs_to_be_present() {
        assert!(validate_otp("123456").is_ok());
        assert!(validate_otp("12 34").is_ok());
        assert_eq!(validate_otp(" ").unwrap_err(), "Please enter the OTP");
    }

    #[test]
    fn test_password_login_requires_both_fields() {
        assert_eq!(
            validate_password_login("9876543210", "").unwrap_err(),
            "Please enter both phone number and password"
        );
        assert_eq!(
            validate_password_login("", "secret").unwrap_err(),
            "Please enter both phone number and password"
        );
        assert!(validate_password_login("9876543210", "secret").is_ok());
    }

    #[test]
    fn test_masking() {
        assert_eq!(mask_phone_number("91987654321"), "919******21");
        assert_eq!(mask_phone_number("12345"), "12345");
        assert_eq!(mask_email("lakshmi@example.org"), "la****@example.org");
        assert_eq!(mask_email("no-at-sign"), "no-at-sign");
    }
}
