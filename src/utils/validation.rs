use crate::error::{AppError, AppResult};
use regex::Regex;

/// Lowercase and trim an email address. All storage and lookups go through
/// this so an address can never appear twice under different casings.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> AppResult<()> {
    let email_regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    if !email_regex.is_match(email) {
        return Err(AppError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }

    Ok(())
}

/// US 5-digit ZIP codes only.
pub fn validate_zip_code(zip: &str) -> AppResult<()> {
    let zip_regex = Regex::new(r"^\d{5}$").unwrap();

    if !zip_regex.is_match(zip) {
        return Err(AppError::ValidationError(
            "ZIP code must be 5 digits".to_string(),
        ));
    }

    Ok(())
}

/// Submitted verification codes must be exactly 6 ASCII digits.
pub fn validate_code_shape(code: &str) -> AppResult<()> {
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::ValidationError(
            "Verification code must be 6 digits".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Bob@Example.COM "), "bob@example.com");
        assert_eq!(normalize_email("a@b.co"), "a@b.co");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("bob@example.com").is_ok());
        assert!(validate_email("bob+lawn@example.co.uk").is_ok());
        assert!(validate_email("bob").is_err());
        assert!(validate_email("bob@").is_err());
        assert!(validate_email("bob@example").is_err());
        assert!(validate_email("bob smith@example.com").is_err());
    }

    #[test]
    fn test_validate_zip_code() {
        assert!(validate_zip_code("78701").is_ok());
        assert!(validate_zip_code("7870").is_err());
        assert!(validate_zip_code("787011").is_err());
        assert!(validate_zip_code("7870a").is_err());
    }

    #[test]
    fn test_validate_code_shape() {
        assert!(validate_code_shape("123456").is_ok());
        assert!(validate_code_shape("12345").is_err());
        assert!(validate_code_shape("1234567").is_err());
        assert!(validate_code_shape("12345a").is_err());
    }
}
