// src/types/domain_types.rs
//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use std::fmt;

/// Integration token used to authenticate against the Notion API.
///
/// Neither `Debug` nor `Display` ever print the full secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Create a token, trimming surrounding whitespace.
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();
        let trimmed = token.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::InvalidApiToken {
                reason: "token cannot be empty".to_string(),
            });
        }

        if trimmed.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err(ValidationError::InvalidApiToken {
                reason: "token cannot contain whitespace or control characters".to_string(),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The raw secret, for building the authorization header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// The token with everything but its last four characters masked.
    pub fn redacted(&self) -> String {
        redact_token(&self.0)
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiToken").field(&self.redacted()).finish()
    }
}

/// Redacts a token value for safe logging.
///
/// Whitespace is trimmed first. Tokens of four characters or fewer are fully
/// masked; longer ones keep their last four characters.
pub fn redact_token(token: &str) -> String {
    let stripped = token.trim();
    let len = stripped.chars().count();
    if len == 0 {
        return String::new();
    }
    if len <= 4 {
        return "*".repeat(len);
    }
    let tail: String = stripped.chars().skip(len - 4).collect();
    format!("{}{}", "*".repeat(len - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_token() {
        assert_eq!(redact_token("  secret "), "**cret");
        assert_eq!(redact_token("abcd"), "****");
        assert_eq!(redact_token("a"), "*");
        assert_eq!(redact_token(" "), "");
    }

    #[test]
    fn test_api_token_validation() {
        assert!(ApiToken::new("ntn_abcdefghijklmnopqrs").is_ok());
        assert!(ApiToken::new("token").is_ok());
        assert!(ApiToken::new("").is_err());
        assert!(ApiToken::new("   ").is_err());
        assert!(ApiToken::new("two words").is_err());
        assert_eq!(ApiToken::new("  token ").unwrap().expose(), "token");
    }

    #[test]
    fn test_api_token_never_prints_secret() {
        let token = ApiToken::new("secret_abcdefgh1234").unwrap();
        assert_eq!(token.to_string(), "***************1234");
        assert!(!format!("{:?}", token).contains("secret_"));
    }
}
