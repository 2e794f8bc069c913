//! The authentication boundary.
//!
//! The pipeline only needs to know whether the caller is authenticated.
//! Credential issuance and expiry live outside this service; here a request
//! is authenticated when it presents the configured bearer token.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::crypto::RandomSource;

type HmacSha256 = Hmac<Sha256>;

/// Answers "is the presenter of this bearer credential authenticated".
#[cfg_attr(test, mockall::automock)]
pub trait Authenticator: Send + Sync {
    fn is_authenticated(&self, bearer: &str) -> bool;
}

/// Accepts exactly one configured token.
///
/// Tokens are compared as HMAC-SHA256 tags under a per-process random key, so
/// the comparison runs in constant time and the expected token itself is not
/// retained.
pub struct StaticTokenAuthenticator {
    mac_key: [u8; 32],
    expected_tag: Vec<u8>,
}

impl StaticTokenAuthenticator {
    pub fn new(token: &str, random: &RandomSource) -> Self {
        let mut mac_key = [0u8; 32];
        random.fill_bytes(&mut mac_key);
        let expected_tag = tag(&mac_key, token)
            .map(|mac| mac.finalize().into_bytes().to_vec())
            .unwrap_or_default();
        Self {
            mac_key,
            expected_tag,
        }
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn is_authenticated(&self, bearer: &str) -> bool {
        if self.expected_tag.is_empty() {
            return false;
        }
        tag(&self.mac_key, bearer)
            .map(|mac| mac.verify_slice(&self.expected_tag).is_ok())
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for StaticTokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticTokenAuthenticator([REDACTED])")
    }
}

fn tag(mac_key: &[u8], token: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(mac_key).ok()?;
    mac.update(token.as_bytes());
    Some(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_configured_token() {
        let auth = StaticTokenAuthenticator::new("s3cret", &RandomSource::seeded(1));
        assert!(auth.is_authenticated("s3cret"));
    }

    #[test]
    fn rejects_other_tokens() {
        let auth = StaticTokenAuthenticator::new("s3cret", &RandomSource::seeded(1));
        assert!(!auth.is_authenticated("s3cret "));
        assert!(!auth.is_authenticated("S3CRET"));
        assert!(!auth.is_authenticated(""));
    }

    #[test]
    fn debug_does_not_leak_token() {
        let auth = StaticTokenAuthenticator::new("s3cret", &RandomSource::seeded(1));
        assert!(!format!("{auth:?}").contains("s3cret"));
    }
}
