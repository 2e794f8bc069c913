//! [`EnvelopeCipher`]: key generation plus text-in/text-out sealing.
//!
//! Each operation is a single-shot `async` call so that callers treat it like
//! any other cryptographic primitive that may be offloaded.

use tracing::debug;

use super::{
    cipher::{self, CipherError, Envelope},
    key::SymmetricKey,
    random::RandomSource,
};

/// Authenticated encryption of whole texts into base64 envelopes.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeCipher {
    random: RandomSource,
}

impl EnvelopeCipher {
    pub fn new(random: RandomSource) -> Self {
        Self { random }
    }

    /// Produce a fresh 256-bit key.
    pub async fn generate_key(&self) -> SymmetricKey {
        let key = SymmetricKey::generate(&self.random);
        debug!(key = %key.fingerprint(), "generated symmetric key");
        key
    }

    /// Seal `plaintext` and return the base64 envelope text.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::SealFailure`] on an internal AEAD error.
    pub async fn seal(&self, key: &SymmetricKey, plaintext: &str) -> Result<String, CipherError> {
        let envelope = cipher::seal(key, plaintext.as_bytes(), &self.random)?;
        debug!(
            key = %key.fingerprint(),
            envelope_len = envelope.ciphertext.len() + cipher::IV_LEN,
            "sealed envelope"
        );
        Ok(envelope.encode())
    }

    /// Open base64 envelope text back into the original plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Decryption`] for every failure: bad encoding,
    /// truncation, wrong key, tag mismatch, or non-UTF-8 plaintext.
    pub async fn open(&self, key: &SymmetricKey, envelope: &str) -> Result<String, CipherError> {
        let parsed = Envelope::decode(envelope)?;
        let plaintext = cipher::open(key, &parsed)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::Decryption)
    }
}
