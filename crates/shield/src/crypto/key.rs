//! [`SymmetricKey`]: session-owned AES-256 key material.

use sha2::{Digest, Sha256};

use super::{cipher::KEY_LEN, random::RandomSource};

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// Owned by a single session and never persisted. When this type is dropped,
/// the memory is overwritten with zeroes to minimise the window during which
/// plaintext key material lives in RAM.
#[derive(Clone)]
pub struct SymmetricKey(Box<[u8; KEY_LEN]>);

impl SymmetricKey {
    /// Wrap raw key bytes (fixed keys for tests).
    #[cfg(test)]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, super::cipher::CipherError> {
        if bytes.len() != KEY_LEN {
            return Err(super::cipher::CipherError::InvalidKeyLength);
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Fill a new key from `random`.
    pub fn generate(random: &RandomSource) -> Self {
        let mut buf = Box::new([0u8; KEY_LEN]);
        random.fill_bytes(buf.as_mut_slice());
        Self(buf)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Non-secret identifier for logs: hex of the first 8 bytes of SHA-256(key).
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_slice());
        digest[..8].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, even in debug builds.
        f.write_str("SymmetricKey([REDACTED])")
    }
}
