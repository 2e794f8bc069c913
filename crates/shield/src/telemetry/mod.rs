//! Tracing setup: structured JSON logs, plus OTLP span export when configured.
//!
//! # Telemetry invariants
//!
//! - **No plaintext, envelope text, tokens, or key material** may appear in any
//!   span attribute or log field. Keys are identified only by fingerprint.
//! - Log level is configurable via `SHIELD_LOG_LEVEL` (default: `info`) and
//!   overridden by `RUST_LOG` when set.

pub mod init;

pub use init::init_telemetry;
