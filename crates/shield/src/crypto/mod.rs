//! AES-256-GCM-SIV envelope primitives and the randomness they draw on.
//!
//! This module is intentionally free of HTTP and session dependencies.
//! It provides the low-level seal/open operations used by the pipeline.
//!
//! # Envelope format
//!
//! ```text
//! base64(IV (12 bytes) || ciphertext || tag (16 bytes))
//! ```
//!
//! Standard padded base64 never contains `_` or `*`, which keeps envelopes
//! distinguishable from tokenizer output.

pub mod cipher;
pub mod envelope;
pub mod key;
pub mod random;

pub use cipher::CipherError;
pub use envelope::EnvelopeCipher;
pub use key::SymmetricKey;
pub use random::RandomSource;
