//! [`ProtectionPipeline`]: the façade over tokenizer and envelope cipher.
//!
//! `protect` dispatches on [`TokenizationMethod`]: the two masking methods go
//! to the [`Tokenizer`] and are marked irreversible; `vault-based` seals the
//! whole input under the session key and is marked reversible. `reveal` only
//! ever opens envelopes and refuses tokenizer output up front.

use std::sync::OnceLock;

use common::{
    protocol::{ProtectionResult, SensitiveKind, TokenizationMethod},
    ProtectionError,
};
use regex::Regex;
use tracing::{debug, warn};

use crate::classify;
use crate::crypto::{
    cipher::{IV_LEN, TAG_LEN},
    CipherError, EnvelopeCipher, RandomSource, SymmetricKey,
};
use crate::session::Session;
use crate::tokenize::{Tokenizer, MASK_MARKER};

impl From<CipherError> for ProtectionError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::Decryption => ProtectionError::Decryption,
            other => ProtectionError::Internal(other.to_string()),
        }
    }
}

/// Whether `text` is structurally recognisable as tokenizer output.
///
/// Looks for a vault-less token (`TOKEN_EMAIL_…`, `TOKEN_SSN_…`, `TOKEN_CC_…`)
/// or the format-preserving mask marker `****`. Standard base64 has neither
/// `_` nor `*`, so an envelope never matches.
pub fn looks_like_tokenized_output(text: &str) -> bool {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let token = TOKEN
        .get_or_init(|| Regex::new(r"TOKEN_(?:EMAIL|SSN|CC)_[A-Z0-9]").expect("valid regex literal"));
    text.contains(MASK_MARKER) || token.is_match(text)
}

/// Combines tokenization and envelope encryption behind one entry point.
#[derive(Debug, Clone)]
pub struct ProtectionPipeline {
    tokenizer: Tokenizer,
    cipher: EnvelopeCipher,
    max_input_bytes: usize,
}

impl ProtectionPipeline {
    /// Build a pipeline whose tokens, keys and IVs all draw from `random`.
    pub fn new(random: RandomSource, max_input_bytes: usize) -> Self {
        Self {
            tokenizer: Tokenizer::new(random.clone()),
            cipher: EnvelopeCipher::new(random),
            max_input_bytes,
        }
    }

    /// Protect `text` with `method` on behalf of `session`.
    ///
    /// `text` is used as given. Leading and trailing whitespace is not
    /// trimmed, so a `vault-based` envelope reveals to exactly the bytes
    /// that were sealed, surrounding whitespace included.
    ///
    /// # Errors
    ///
    /// - [`ProtectionError::EmptyInput`] for empty or whitespace-only text.
    /// - [`ProtectionError::InputTooLarge`] above the configured limit.
    /// - [`ProtectionError::Internal`] if sealing fails.
    pub async fn protect(
        &self,
        session: &Session,
        text: &str,
        method: TokenizationMethod,
    ) -> Result<ProtectionResult, ProtectionError> {
        self.check_input(text)?;

        let protected = match method {
            TokenizationMethod::FormatPreserving | TokenizationMethod::VaultLess => {
                self.tokenizer.tokenize(text, method)?
            }
            TokenizationMethod::VaultBased => {
                let key = session.get_or_create_key(&self.cipher).await;
                self.cipher.seal(key, text).await?
            }
        };

        debug!(
            session = %session.id(),
            method = %method,
            reversible = method.is_reversible(),
            "protected input"
        );
        Ok(ProtectionResult {
            text: protected,
            reversible: method.is_reversible(),
            method_used: method,
        })
    }

    /// Open `envelope` with `key`.
    ///
    /// # Errors
    ///
    /// - [`ProtectionError::NonReversibleInput`] if `envelope` looks like
    ///   tokenizer output; no decryption is attempted.
    /// - [`ProtectionError::Decryption`] if the envelope does not open under `key`.
    pub async fn reveal(
        &self,
        envelope: &str,
        key: &SymmetricKey,
    ) -> Result<String, ProtectionError> {
        self.check_reveal_input(envelope)?;
        self.cipher.open(key, envelope).await.map_err(|e| {
            warn!(key = %key.fingerprint(), "envelope failed to open");
            ProtectionError::from(e)
        })
    }

    /// Open `envelope` with the key owned by `session`.
    ///
    /// # Errors
    ///
    /// As [`ProtectionPipeline::reveal`], plus [`ProtectionError::KeyUnavailable`]
    /// if the session has never protected anything with `vault-based`.
    pub async fn reveal_for_session(
        &self,
        session: &Session,
        envelope: &str,
    ) -> Result<String, ProtectionError> {
        self.check_reveal_input(envelope)?;
        let key = session.key().ok_or(ProtectionError::KeyUnavailable)?;
        let plaintext = self.reveal(envelope, key).await?;
        debug!(session = %session.id(), "revealed envelope");
        Ok(plaintext)
    }

    /// Classify every line of `text`, in order.
    ///
    /// # Errors
    ///
    /// Same input checks as [`ProtectionPipeline::protect`].
    pub fn classify_text(&self, text: &str) -> Result<Vec<SensitiveKind>, ProtectionError> {
        self.check_input(text)?;
        Ok(text
            .split('\n')
            .map(|line| classify::classify(line.strip_suffix('\r').unwrap_or(line)))
            .collect())
    }

    fn check_input(&self, text: &str) -> Result<(), ProtectionError> {
        if text.trim().is_empty() {
            return Err(ProtectionError::EmptyInput);
        }
        if text.len() > self.max_input_bytes {
            return Err(ProtectionError::InputTooLarge {
                limit: self.max_input_bytes,
            });
        }
        Ok(())
    }

    /// Encoded length of the envelope that sealing a maximum-size input yields.
    fn max_envelope_len(&self) -> usize {
        4 * (self.max_input_bytes + IV_LEN + TAG_LEN).div_ceil(3)
    }

    fn check_reveal_input(&self, envelope: &str) -> Result<(), ProtectionError> {
        let trimmed = envelope.trim();
        if trimmed.is_empty() {
            return Err(ProtectionError::EmptyInput);
        }
        if trimmed.len() > self.max_envelope_len() {
            return Err(ProtectionError::InputTooLarge {
                limit: self.max_envelope_len(),
            });
        }
        if looks_like_tokenized_output(envelope) {
            return Err(ProtectionError::NonReversibleInput);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    const LIMIT: usize = 1024 * 1024;

    fn pipeline() -> ProtectionPipeline {
        ProtectionPipeline::new(RandomSource::seeded(99), LIMIT)
    }

    #[tokio::test]
    async fn vault_based_round_trip_scenario() {
        let p = pipeline();
        let session = Session::new();
        let result = p
            .protect(&session, "top secret note", TokenizationMethod::VaultBased)
            .await
            .unwrap();
        assert!(result.reversible);
        assert_eq!(result.method_used, TokenizationMethod::VaultBased);
        assert_ne!(result.text, "top secret note");

        let key = session.key().unwrap();
        assert_eq!(p.reveal(&result.text, key).await.unwrap(), "top secret note");
        assert_eq!(
            p.reveal_for_session(&session, &result.text).await.unwrap(),
            "top secret note"
        );
    }

    #[tokio::test]
    async fn format_preserving_scenario() {
        let p = pipeline();
        let session = Session::new();
        let result = p
            .protect(
                &session,
                "Contact: a@b.com\nSSN: 123-45-6789\nNo sensitive data here",
                TokenizationMethod::FormatPreserving,
            )
            .await
            .unwrap();
        assert!(!result.reversible);
        assert_eq!(
            result.text,
            "Contact: user.****@****.com\nSSN: ***-**-****\nNo sensitive data here"
        );
        assert!(session.key().is_none(), "masking must not create a key");
    }

    #[tokio::test]
    async fn reveal_rejects_vault_less_output() {
        let p = pipeline();
        let session = Session::new();
        p.protect(&session, "seed key", TokenizationMethod::VaultBased)
            .await
            .unwrap();
        let masked = p
            .protect(&session, "a@b.com", TokenizationMethod::VaultLess)
            .await
            .unwrap();
        let key = session.key().unwrap();
        assert_eq!(
            p.reveal(&masked.text, key).await,
            Err(ProtectionError::NonReversibleInput)
        );
    }

    #[tokio::test]
    async fn reveal_rejects_format_preserving_output() {
        let p = pipeline();
        let session = Session::new();
        let masked = p
            .protect(&session, "4111-1111-1111-1111", TokenizationMethod::FormatPreserving)
            .await
            .unwrap();
        assert_eq!(
            p.reveal_for_session(&session, &masked.text).await,
            Err(ProtectionError::NonReversibleInput)
        );
    }

    #[tokio::test]
    async fn reveal_before_any_key_is_unavailable() {
        let p = pipeline();
        let session = Session::new();
        assert_eq!(
            p.reveal_for_session(&session, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA")
                .await,
            Err(ProtectionError::KeyUnavailable)
        );
    }

    #[tokio::test]
    async fn reveal_with_other_sessions_key_fails() {
        let p = pipeline();
        let alice = Session::new();
        let bob = Session::new();
        let sealed = p
            .protect(&alice, "alice only", TokenizationMethod::VaultBased)
            .await
            .unwrap();
        p.protect(&bob, "bob's own", TokenizationMethod::VaultBased)
            .await
            .unwrap();
        assert_eq!(
            p.reveal_for_session(&bob, &sealed.text).await,
            Err(ProtectionError::Decryption)
        );
    }

    #[tokio::test]
    async fn corrupted_envelope_is_decryption_error() {
        let p = pipeline();
        let session = Session::new();
        let sealed = p
            .protect(&session, "fragile", TokenizationMethod::VaultBased)
            .await
            .unwrap();
        let mut corrupted = sealed.text.clone();
        let replacement = if corrupted.starts_with('A') { "B" } else { "A" };
        corrupted.replace_range(0..1, replacement);
        assert_eq!(
            p.reveal_for_session(&session, &corrupted).await,
            Err(ProtectionError::Decryption)
        );
    }

    #[tokio::test]
    async fn session_key_is_reused_across_calls() {
        let p = pipeline();
        let session = Session::new();
        let first = p
            .protect(&session, "one", TokenizationMethod::VaultBased)
            .await
            .unwrap();
        let fp = session.key().unwrap().fingerprint();
        let second = p
            .protect(&session, "two", TokenizationMethod::VaultBased)
            .await
            .unwrap();
        assert_eq!(session.key().unwrap().fingerprint(), fp);
        assert_eq!(p.reveal_for_session(&session, &first.text).await.unwrap(), "one");
        assert_eq!(p.reveal_for_session(&session, &second.text).await.unwrap(), "two");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_vault_based_calls_share_key() {
        let p = Arc::new(ProtectionPipeline::new(RandomSource::os(), LIMIT));
        let session = Arc::new(Session::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let p = Arc::clone(&p);
                let session = Arc::clone(&session);
                tokio::spawn(async move {
                    let text = format!("note {i}");
                    let sealed = p
                        .protect(&session, &text, TokenizationMethod::VaultBased)
                        .await
                        .unwrap();
                    (text, sealed.text)
                })
            })
            .collect();

        let mut sealed = Vec::new();
        for handle in handles {
            sealed.push(handle.await.unwrap());
        }
        // Every envelope opens under the single surviving key.
        for (plaintext, envelope) in sealed {
            assert_eq!(
                p.reveal_for_session(&session, &envelope).await.unwrap(),
                plaintext
            );
        }
    }

    #[tokio::test]
    async fn empty_input_rejected_before_work() {
        let p = pipeline();
        let session = Session::new();
        assert_eq!(
            p.protect(&session, "   ", TokenizationMethod::VaultBased).await,
            Err(ProtectionError::EmptyInput)
        );
        assert!(session.key().is_none());
        assert_eq!(
            p.reveal_for_session(&session, "").await,
            Err(ProtectionError::EmptyInput)
        );
    }

    #[tokio::test]
    async fn oversized_input_rejected() {
        let p = ProtectionPipeline::new(RandomSource::seeded(1), 8);
        let session = Session::new();
        assert_eq!(
            p.protect(&session, "123456789", TokenizationMethod::FormatPreserving)
                .await,
            Err(ProtectionError::InputTooLarge { limit: 8 })
        );
    }

    #[tokio::test]
    async fn envelope_of_maximum_size_input_reveals() {
        let p = ProtectionPipeline::new(RandomSource::seeded(1), 64);
        let session = Session::new();
        let plaintext = "x".repeat(64);
        let sealed = p
            .protect(&session, &plaintext, TokenizationMethod::VaultBased)
            .await
            .unwrap();
        assert!(sealed.text.len() > 64);
        assert_eq!(
            p.reveal_for_session(&session, &sealed.text).await.unwrap(),
            plaintext
        );
        assert_eq!(
            p.reveal_for_session(&session, &format!("{}\n", sealed.text))
                .await
                .unwrap(),
            plaintext
        );
    }

    #[tokio::test]
    async fn reveal_input_beyond_largest_envelope_rejected() {
        let p = ProtectionPipeline::new(RandomSource::seeded(1), 64);
        let session = Session::new();
        // 64 + 12 + 16 = 92 bytes encode to 124 base64 characters.
        let oversized = "A".repeat(125);
        assert_eq!(
            p.reveal_for_session(&session, &oversized).await,
            Err(ProtectionError::InputTooLarge { limit: 124 })
        );
    }

    #[tokio::test]
    async fn whitespace_is_sealed_verbatim() {
        let p = pipeline();
        let session = Session::new();
        let sealed = p
            .protect(&session, "  note\n", TokenizationMethod::VaultBased)
            .await
            .unwrap();
        assert_eq!(
            p.reveal_for_session(&session, &sealed.text).await.unwrap(),
            "  note\n"
        );
    }

    #[test]
    fn classify_text_reports_each_line() {
        let kinds = pipeline()
            .classify_text("a@b.com\nSSN: 1\n4111-1111-1111-1111\n123-45-6789\r\nplain")
            .unwrap();
        assert_eq!(
            kinds,
            vec![
                SensitiveKind::Email,
                SensitiveKind::SocialSecurityNumber,
                SensitiveKind::CreditCardNumber,
                SensitiveKind::SocialSecurityNumber,
                SensitiveKind::None,
            ]
        );
    }

    #[test]
    fn detects_tokenizer_markers() {
        assert!(looks_like_tokenized_output("TOKEN_EMAIL_AB12CD34"));
        assert!(looks_like_tokenized_output("Contact: TOKEN_CC_ABCDEFGH1234"));
        assert!(looks_like_tokenized_output("***-**-****\n****-****-****-****"));
        assert!(!looks_like_tokenized_output("c2VjcmV0IG5vdGU+/w=="));
        assert!(!looks_like_tokenized_output("TOKEN_ alone"));
    }
}
