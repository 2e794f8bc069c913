//! [`TokenGenerator`]: random fixed-length identifiers for masked output.

use crate::crypto::RandomSource;

/// Alphabet tokens are drawn from.
pub const TOKEN_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Produces opaque `[A-Z0-9]` substitutes for detected values.
///
/// Tokens are display substitutes only. They are not secrets and carry no
/// security guarantee of their own: never use one as key material, a session
/// identifier, or any other credential. Anything needing an unguessable value
/// must draw from a CSPRNG directly.
#[derive(Debug, Clone, Default)]
pub struct TokenGenerator {
    random: RandomSource,
}

impl TokenGenerator {
    pub fn new(random: RandomSource) -> Self {
        Self { random }
    }

    /// Generate a token of `length` characters, each uniform over [`TOKEN_ALPHABET`].
    pub fn generate(&self, length: usize) -> String {
        debug_assert!(length > 0, "token length must be positive");
        (0..length)
            .map(|_| char::from(TOKEN_ALPHABET[self.random.index_below(TOKEN_ALPHABET.len())]))
            .collect()
    }
}
