//! Request and response types exchanged between components.
//!
//! These types are serialised as JSON over the public HTTP API.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ProtectionError;

// ---------------------------------------------------------------------------
// Domain enums
// ---------------------------------------------------------------------------

/// Regulated-data pattern detected in a single line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveKind {
    Email,
    SocialSecurityNumber,
    CreditCardNumber,
    None,
}

/// Tokenization strategy requested by the caller.
///
/// Only [`TokenizationMethod::VaultBased`] is reversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenizationMethod {
    /// Irreversible mask that keeps the shape of the original value.
    FormatPreserving,
    /// Irreversible prefixed random token.
    VaultLess,
    /// Reversible authenticated-encryption envelope of the whole input.
    VaultBased,
}

impl TokenizationMethod {
    /// Wire name of the method, e.g. `"vault-based"`.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenizationMethod::FormatPreserving => "format-preserving",
            TokenizationMethod::VaultLess => "vault-less",
            TokenizationMethod::VaultBased => "vault-based",
        }
    }

    /// Whether output produced by this method can be revealed again.
    pub fn is_reversible(self) -> bool {
        matches!(self, TokenizationMethod::VaultBased)
    }
}

impl fmt::Display for TokenizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenizationMethod {
    type Err = ProtectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "format-preserving" => Ok(TokenizationMethod::FormatPreserving),
            "vault-less" => Ok(TokenizationMethod::VaultLess),
            "vault-based" => Ok(TokenizationMethod::VaultBased),
            other => Err(ProtectionError::UnsupportedMethod(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Session endpoints
// ---------------------------------------------------------------------------

/// Response body for `POST /sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Identifier to send in the session header on subsequent requests.
    pub session_id: String,
}

// ---------------------------------------------------------------------------
// Protect / reveal endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /protect`.
///
/// `method` is kept as a raw selector so that an unknown value surfaces as
/// [`ProtectionError::UnsupportedMethod`] rather than a deserialisation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectRequest {
    /// Raw input text, newline-delimited.
    pub text: String,
    /// Method selector; defaults to `"vault-based"` when omitted.
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    TokenizationMethod::VaultBased.as_str().into()
}

/// Outcome of a single protection call. Also the body returned by `POST /protect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionResult {
    /// Masked text or base64 envelope.
    pub text: String,
    /// `true` only when `text` is an envelope that `reveal` can open.
    pub reversible: bool,
    /// Method that produced `text`.
    pub method_used: TokenizationMethod,
}

/// Request body for `POST /reveal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealRequest {
    /// Envelope text previously returned by a `vault-based` protect call.
    pub text: String,
}

/// Successful response body for `POST /reveal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealResponse {
    /// The original plaintext.
    pub text: String,
}

// ---------------------------------------------------------------------------
// Classify endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /classify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
}

/// Response body for `POST /classify`: one kind per input line, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub lines: Vec<SensitiveKind>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"decryption_failed"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&ProtectionError> for ErrorResponse {
    fn from(err: &ProtectionError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status, always `"ok"` while the process is serving.
    pub status: String,
    /// Number of sessions currently held in memory.
    pub active_sessions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_selectors_parse() {
        assert_eq!(
            "format-preserving".parse::<TokenizationMethod>().unwrap(),
            TokenizationMethod::FormatPreserving
        );
        assert_eq!(
            "vault-less".parse::<TokenizationMethod>().unwrap(),
            TokenizationMethod::VaultLess
        );
        assert_eq!(
            " vault-based ".parse::<TokenizationMethod>().unwrap(),
            TokenizationMethod::VaultBased
        );
    }

    #[test]
    fn unknown_selector_is_unsupported() {
        let err = "homomorphic".parse::<TokenizationMethod>().unwrap_err();
        assert_eq!(err, ProtectionError::UnsupportedMethod("homomorphic".into()));
    }

    #[test]
    fn only_vault_based_is_reversible() {
        assert!(TokenizationMethod::VaultBased.is_reversible());
        assert!(!TokenizationMethod::VaultLess.is_reversible());
        assert!(!TokenizationMethod::FormatPreserving.is_reversible());
    }

    #[test]
    fn protect_request_defaults_to_vault_based() {
        let req: ProtectRequest = serde_json::from_value(json!({"text": "note"})).unwrap();
        assert_eq!(req.method, "vault-based");
    }

    #[test]
    fn protection_result_uses_wire_names() {
        let result = ProtectionResult {
            text: "***-**-****".into(),
            reversible: false,
            method_used: TokenizationMethod::FormatPreserving,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["method_used"], "format-preserving");
        assert_eq!(value["reversible"], false);
    }

    #[test]
    fn sensitive_kind_serialises_snake_case() {
        let resp = ClassifyResponse {
            lines: vec![SensitiveKind::SocialSecurityNumber, SensitiveKind::None],
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["lines"][0], "social_security_number");
        assert_eq!(value["lines"][1], "none");
    }

    #[test]
    fn error_response_from_protection_error() {
        let e = ErrorResponse::from(&ProtectionError::KeyUnavailable);
        assert_eq!(e.code, "key_unavailable");
        assert!(e.message.contains("no encryption key"));
    }
}
