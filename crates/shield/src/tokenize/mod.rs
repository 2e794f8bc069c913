//! Non-reversible masking of newline-delimited text.
//!
//! Each line is scanned by [`crate::classify::detect`]. Lines without a match
//! pass through unchanged; in matching lines the context before the sensitive
//! region is kept and the region itself (to end of line) is replaced:
//!
//! | Rule         | format-preserving       | vault-less          |
//! |--------------|-------------------------|---------------------|
//! | email        | `user.****@****.com`    | `TOKEN_EMAIL_<8>`   |
//! | labelled SSN | `SSN: ***-**-****`      | `TOKEN_SSN_<8>`     |
//! | bare SSN     | `***-**-****`           | `TOKEN_SSN_<8>`     |
//! | credit card  | `****-****-****-****`   | `TOKEN_CC_<12>`     |
//!
//! The transform is lossy: nothing can reverse it.

pub mod token;

pub use token::TokenGenerator;

use common::{protocol::TokenizationMethod, ProtectionError};
use tracing::debug;

use crate::classify::{self, Rule};
use crate::crypto::RandomSource;

/// Prefix shared by every vault-less token.
pub const TOKEN_PREFIX: &str = "TOKEN_";

/// Marker present in every format-preserving mask that hides digits or an email.
pub const MASK_MARKER: &str = "****";

const EMAIL_MASK: &str = "user.****@****.com";
const LABELLED_SSN_MASK: &str = "SSN: ***-**-****";
const SSN_MASK: &str = "***-**-****";
const CREDIT_CARD_MASK: &str = "****-****-****-****";

const SHORT_TOKEN_LEN: usize = 8;
const CREDIT_CARD_TOKEN_LEN: usize = 12;

/// Irreversible masking strategies. [`TokenizationMethod::VaultBased`] has no
/// counterpart here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mask {
    FormatPreserving,
    VaultLess,
}

impl TryFrom<TokenizationMethod> for Mask {
    type Error = ProtectionError;

    fn try_from(method: TokenizationMethod) -> Result<Self, Self::Error> {
        match method {
            TokenizationMethod::FormatPreserving => Ok(Mask::FormatPreserving),
            TokenizationMethod::VaultLess => Ok(Mask::VaultLess),
            TokenizationMethod::VaultBased => {
                Err(ProtectionError::UnsupportedMethod(method.as_str().into()))
            }
        }
    }
}

/// Applies classification and token generation line by line.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    tokens: TokenGenerator,
}

impl Tokenizer {
    pub fn new(random: RandomSource) -> Self {
        Self {
            tokens: TokenGenerator::new(random),
        }
    }

    /// Mask every sensitive line of `text` with an irreversible `method`.
    ///
    /// Line order and count are preserved.
    ///
    /// # Errors
    ///
    /// - [`ProtectionError::EmptyInput`] if `text` is empty or whitespace-only.
    /// - [`ProtectionError::UnsupportedMethod`] for [`TokenizationMethod::VaultBased`].
    pub fn tokenize(&self, text: &str, method: TokenizationMethod) -> Result<String, ProtectionError> {
        if text.trim().is_empty() {
            return Err(ProtectionError::EmptyInput);
        }
        let mask = Mask::try_from(method)?;

        let mut masked_lines = 0usize;
        let lines: Vec<String> = text
            .split('\n')
            .map(|line| {
                let (out, masked) = self.tokenize_line(line, mask);
                masked_lines += usize::from(masked);
                out
            })
            .collect();

        debug!(
            method = %method,
            lines = lines.len(),
            masked_lines,
            "tokenized text"
        );
        Ok(lines.join("\n"))
    }

    fn tokenize_line(&self, line: &str, mask: Mask) -> (String, bool) {
        let (body, line_ending) = match line.strip_suffix('\r') {
            Some(body) => (body, "\r"),
            None => (line, ""),
        };
        let Some(detection) = classify::detect(body) else {
            return (line.to_owned(), false);
        };

        let replacement = match mask {
            Mask::FormatPreserving => format_preserving_mask(detection.rule).to_owned(),
            Mask::VaultLess => self.vault_less_token(detection.rule),
        };
        let out = format!("{}{}{}", &body[..detection.start], replacement, line_ending);
        (out, true)
    }

    fn vault_less_token(&self, rule: Rule) -> String {
        let (label, len) = match rule {
            Rule::Email => ("EMAIL", SHORT_TOKEN_LEN),
            Rule::LabelledSsn | Rule::BareSsn => ("SSN", SHORT_TOKEN_LEN),
            Rule::CreditCard => ("CC", CREDIT_CARD_TOKEN_LEN),
        };
        format!("{TOKEN_PREFIX}{label}_{}", self.tokens.generate(len))
    }
}

fn format_preserving_mask(rule: Rule) -> &'static str {
    match rule {
        Rule::Email => EMAIL_MASK,
        Rule::LabelledSsn => LABELLED_SSN_MASK,
        Rule::BareSsn => SSN_MASK,
        Rule::CreditCard => CREDIT_CARD_MASK,
    }
}
