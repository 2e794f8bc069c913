//! Common types, protocol definitions, and errors shared across `privacy-shield` crates.

pub mod error;
pub mod protocol;

pub use error::ProtectionError;
