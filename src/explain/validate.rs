//! Request validation performed before any provider call.

use std::fmt;

/// Longest snippet accepted, in characters.
pub const MAX_CODE_CHARS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty,
    TooLong { chars: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty => write!(f, "Code is required"),
            ValidationError::TooLong { .. } => write!(
                f,
                "Code is too long. Maximum 10,000 characters allowed."
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks a snippet and hands it back untouched when it is acceptable.
pub fn validate_code(code: &str) -> Result<&str, ValidationError> {
    if code.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let chars = code.chars().count();
    if chars > MAX_CODE_CHARS {
        return Err(ValidationError::TooLong { chars });
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_blank_rejected() {
        assert_eq!(validate_code(""), Err(ValidationError::Empty));
        assert_eq!(validate_code("  \n\t "), Err(ValidationError::Empty));
    }

    #[test]
    fn test_exact_limit_accepted_unmodified() {
        let code = "a".repeat(MAX_CODE_CHARS);
        assert_eq!(validate_code(&code), Ok(code.as_str()));
    }

    #[test]
    fn test_one_over_limit_rejected() {
        let code = "a".repeat(MAX_CODE_CHARS + 1);
        assert_eq!(
            validate_code(&code),
            Err(ValidationError::TooLong { chars: 10_001 })
        );
    }

    #[test]
    fn test_limit_counts_characters_not_bytes() {
        // 10,000 characters, 20,000 bytes
        let code = "é".repeat(MAX_CODE_CHARS);
        assert!(validate_code(&code).is_ok());
    }

    #[test]
    fn test_surrounding_whitespace_is_kept() {
        assert_eq!(validate_code("  x = 1\n"), Ok("  x = 1\n"));
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::Empty.to_string(), "Code is required");
        assert!(
            ValidationError::TooLong { chars: 10_001 }
                .to_string()
                .contains("Maximum 10,000 characters")
        );
    }
}
