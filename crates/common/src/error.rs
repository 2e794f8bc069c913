//! Common error types shared across crates.

use thiserror::Error;

/// Error taxonomy of the protection pipeline and the service around it.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ProtectionError::EmptyInput`], [`ProtectionError::UnsupportedMethod`],
///   [`ProtectionError::BadRequest`] → 400
/// - [`ProtectionError::Unauthenticated`] → 401
/// - [`ProtectionError::UnknownSession`] → 404
/// - [`ProtectionError::KeyUnavailable`] → 409
/// - [`ProtectionError::InputTooLarge`] → 413
/// - [`ProtectionError::NonReversibleInput`], [`ProtectionError::Decryption`] → 422
/// - [`ProtectionError::Internal`] → 500
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtectionError {
    /// The input text was empty or contained only whitespace.
    #[error("input text is empty")]
    EmptyInput,

    /// The method selector is not one of the known tokenization methods.
    #[error("unsupported tokenization method: {0}")]
    UnsupportedMethod(String),

    /// `reveal` was called on text produced by a non-reversible method.
    #[error("input was produced by a non-reversible tokenization method")]
    NonReversibleInput,

    /// Authenticated decryption failed.
    ///
    /// Deliberately carries no detail: a wrong key, a truncated envelope and a
    /// tag mismatch are indistinguishable to the caller.
    #[error("decryption failed: wrong key or corrupted data")]
    Decryption,

    /// `reveal` was requested before the session created a key.
    #[error("no encryption key exists for this session")]
    KeyUnavailable,

    /// The input exceeds the configured size limit.
    #[error("input exceeds the maximum size of {limit} bytes")]
    InputTooLarge { limit: usize },

    /// The caller is not authenticated.
    #[error("authentication required")]
    Unauthenticated,

    /// The session named by the request does not exist (or has expired).
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// The request was malformed, e.g. a missing or unparsable session header.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProtectionError {
    /// Short machine-readable code used in error response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ProtectionError::EmptyInput => "empty_input",
            ProtectionError::UnsupportedMethod(_) => "unsupported_method",
            ProtectionError::NonReversibleInput => "non_reversible_input",
            ProtectionError::Decryption => "decryption_failed",
            ProtectionError::KeyUnavailable => "key_unavailable",
            ProtectionError::InputTooLarge { .. } => "input_too_large",
            ProtectionError::Unauthenticated => "unauthenticated",
            ProtectionError::UnknownSession(_) => "unknown_session",
            ProtectionError::BadRequest(_) => "bad_request",
            ProtectionError::Internal(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ProtectionError::EmptyInput
            | ProtectionError::UnsupportedMethod(_)
            | ProtectionError::BadRequest(_) => 400,
            ProtectionError::Unauthenticated => 401,
            ProtectionError::UnknownSession(_) => 404,
            ProtectionError::KeyUnavailable => 409,
            ProtectionError::InputTooLarge { .. } => 413,
            ProtectionError::NonReversibleInput | ProtectionError::Decryption => 422,
            ProtectionError::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ProtectionError::EmptyInput.http_status(), 400);
        assert_eq!(
            ProtectionError::UnsupportedMethod("rot13".into()).http_status(),
            400
        );
        assert_eq!(ProtectionError::Unauthenticated.http_status(), 401);
        assert_eq!(
            ProtectionError::UnknownSession("x".into()).http_status(),
            404
        );
        assert_eq!(ProtectionError::KeyUnavailable.http_status(), 409);
        assert_eq!(
            ProtectionError::InputTooLarge { limit: 10 }.http_status(),
            413
        );
        assert_eq!(ProtectionError::NonReversibleInput.http_status(), 422);
        assert_eq!(ProtectionError::Decryption.http_status(), 422);
        assert_eq!(ProtectionError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn codes_are_distinct_for_user_facing_failures() {
        assert_ne!(
            ProtectionError::NonReversibleInput.code(),
            ProtectionError::Decryption.code()
        );
        assert_eq!(ProtectionError::KeyUnavailable.code(), "key_unavailable");
    }

    #[test]
    fn display_includes_message() {
        let e = ProtectionError::UnsupportedMethod("rot13".into());
        assert!(e.to_string().contains("rot13"));
    }

    #[test]
    fn decryption_message_is_opaque() {
        let msg = ProtectionError::Decryption.to_string();
        assert!(msg.contains("wrong key or corrupted data"));
    }
}
