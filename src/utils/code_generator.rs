//! Short code generation and validation utilities.
//!
//! Provides cryptographically secure random code generation and validation
//! for custom user-provided codes.

use crate::error::AppError;
use base64::Engine as _;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Number of random bytes drawn per code.
const CODE_LENGTH_BYTES: usize = 6;

/// Length of a generated code after encoding and truncation.
pub const GENERATED_CODE_LENGTH: usize = 6;

/// Inclusive length bounds for user-chosen codes.
pub const CUSTOM_CODE_MIN_LENGTH: usize = 4;
pub const CUSTOM_CODE_MAX_LENGTH: usize = 12;

/// Compiled regex for custom code validation.
static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("custom code regex is valid"));

/// Generates a cryptographically secure random short code.
///
/// Draws 6 bytes from the operating system's random source and encodes them
/// with the URL-safe base64 alphabet, keeping the first 6 characters.
///
/// The result is not guaranteed to be unused; uniqueness is enforced by the
/// store when the code is inserted.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random source fails. There is
/// no fallback to a weaker generator.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code()?;
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
/// ```
pub fn generate_code() -> Result<String, AppError> {
    let mut buffer = [0u8; CODE_LENGTH_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random bytes",
            json!({ "reason": e.to_string() }),
        )
    })?;

    let mut code = base64::engine::general_purpose::URL_SAFE.encode(buffer);
    code.truncate(GENERATED_CODE_LENGTH);

    Ok(code)
}

/// Returns true if `code` is acceptable as a user-chosen short code.
///
/// # Rules
///
/// - Length: 4-12 characters
/// - Allowed characters: ASCII letters, digits, `_` and `-`
pub fn is_valid_custom_code(code: &str) -> bool {
    (CUSTOM_CODE_MIN_LENGTH..=CUSTOM_CODE_MAX_LENGTH).contains(&code.len())
        && CUSTOM_CODE_REGEX.is_match(code)
}

/// Validates a user-provided custom short code.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if [`is_valid_custom_code`] rejects it.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if is_valid_custom_code(code) {
        return Ok(());
    }

    Err(AppError::bad_request(
        "Invalid custom code format",
        json!({
            "code": code,
            "rule": "4-12 characters from [A-Za-z0-9_-]",
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_has_correct_length() {
        let code = generate_code().unwrap();
        assert_eq!(code.len(), GENERATED_CODE_LENGTH);
    }

    #[test]
    fn test_generate_code_url_safe_characters() {
        for _ in 0..100 {
            let code = generate_code().unwrap();
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "unexpected character in {code}"
            );
        }
    }

    #[test]
    fn test_generate_code_no_padding() {
        let code = generate_code().unwrap();
        assert!(!code.contains('='));
    }

    #[test]
    fn test_generated_codes_pass_custom_validation() {
        let code = generate_code().unwrap();
        assert!(is_valid_custom_code(&code));
    }

    #[test]
    fn test_generate_code_is_random() {
        let codes: HashSet<String> = (0..1000).map(|_| generate_code().unwrap()).collect();

        // 36 bits of entropy per code; a handful of collisions would still be
        // astronomically unlikely at this sample size.
        assert!(codes.len() > 990);
    }

    #[test]
    fn test_minimum_length_accepted() {
        assert!(is_valid_custom_code("abcd"));
    }

    #[test]
    fn test_maximum_length_accepted() {
        assert!(is_valid_custom_code("abcdefghijkl"));
    }

    #[test]
    fn test_too_short_rejected() {
        assert!(!is_valid_custom_code("ab"));
        assert!(!is_valid_custom_code("abc"));
    }

    #[test]
    fn test_too_long_rejected() {
        assert!(!is_valid_custom_code("thisistoolongcode123"));
        assert!(!is_valid_custom_code("abcdefghijklm"));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(!is_valid_custom_code(""));
    }

    #[test]
    fn test_mixed_case_digits_and_symbols_accepted() {
        assert!(is_valid_custom_code("My_Link-2024"));
        assert!(is_valid_custom_code("____"));
        assert!(is_valid_custom_code("1234"));
    }

    #[test]
    fn test_special_characters_rejected() {
        assert!(!is_valid_custom_code("my code"));
        assert!(!is_valid_custom_code("my.code"));
        assert!(!is_valid_custom_code("code@123"));
        assert!(!is_valid_custom_code("code/123"));
    }

    #[test]
    fn test_non_ascii_rejected() {
        assert!(!is_valid_custom_code("cödé"));
    }

    #[test]
    fn test_validate_custom_code_error_kind() {
        let err = validate_custom_code("ab").unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert!(err.to_string().contains("custom code"));
    }
}
