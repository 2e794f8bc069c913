//! AES-256-GCM-SIV sealing and opening of whole-text envelopes.
//!
//! **Algorithm choice:** AES-256-GCM-SIV (RFC 8452) is nonce-misuse-resistant:
//! an accidental IV repeat under one key leaks only plaintext equality instead
//! of breaking confidentiality and authentication as it would with plain GCM.
//! IVs are still generated fresh for every seal and are never caller-supplied.
//!
//! The envelope layout matches an AES-GCM envelope, but the ciphers are not
//! interchangeable: envelopes sealed with plain AES-GCM elsewhere do not open
//! here, and the reverse holds too.

use aes_gcm_siv::{
    aead::{Aead, KeyInit},
    Aes256GcmSiv, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use super::{key::SymmetricKey, random::RandomSource};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of the IV (12 bytes = 96 bits).
pub const IV_LEN: usize = 12;

/// Byte length of the authentication tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// Errors produced by the cipher layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes")]
    InvalidKeyLength,

    /// AEAD encryption failed.
    #[error("aead seal failed")]
    SealFailure,

    /// The envelope could not be decoded, authenticated, or decrypted.
    ///
    /// A single variant on purpose: callers must not learn which step failed.
    #[error("decryption failed")]
    Decryption,
}

/// A parsed envelope: `IV || ciphertext+tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Raw IV bytes.
    pub iv: [u8; IV_LEN],
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Concatenate IV and ciphertext into the binary envelope.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(IV_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split a binary envelope into IV and ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Decryption`] if `bytes` is too short to hold an
    /// IV and a tag.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        if bytes.len() < IV_LEN + TAG_LEN {
            return Err(CipherError::Decryption);
        }
        let (iv_bytes, ciphertext) = bytes.split_at(IV_LEN);
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(iv_bytes);
        Ok(Self {
            iv,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Standard (padded) base64 text of the binary envelope.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parse the base64 text form. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Decryption`] on invalid base64 or a truncated envelope.
    pub fn decode(text: &str) -> Result<Self, CipherError> {
        let bytes = STANDARD
            .decode(text.trim())
            .map_err(|_| CipherError::Decryption)?;
        Self::from_bytes(&bytes)
    }
}

/// Encrypt `plaintext` under `key` with a fresh random IV from `random`.
///
/// # Errors
///
/// Returns [`CipherError::SealFailure`] on an internal AEAD error (should be
/// unreachable with a valid key).
pub fn seal(
    key: &SymmetricKey,
    plaintext: &[u8],
    random: &RandomSource,
) -> Result<Envelope, CipherError> {
    let cipher = build_cipher(key)?;

    let mut iv = [0u8; IV_LEN];
    random.fill_bytes(&mut iv);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| CipherError::SealFailure)?;

    Ok(Envelope { iv, ciphertext })
}

/// Authenticate and decrypt an [`Envelope`]. All-or-nothing.
///
/// # Errors
///
/// Returns [`CipherError::Decryption`] if authentication fails (wrong key or
/// tampered data).
pub fn open(key: &SymmetricKey, envelope: &Envelope) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;
    cipher
        .decrypt(Nonce::from_slice(&envelope.iv), envelope.ciphertext.as_ref())
        .map_err(|_| CipherError::Decryption)
}

fn build_cipher(key: &SymmetricKey) -> Result<Aes256GcmSiv, CipherError> {
    Aes256GcmSiv::new_from_slice(key.as_bytes()).map_err(|_| CipherError::InvalidKeyLength)
}
