//! Per-line detection of regulated-data patterns.
//!
//! Rules are checked in a fixed priority order and the first match wins:
//!
//! 1. contains `@` → email
//! 2. contains the label `SSN:` → social security number
//! 3. `####-####-####-####` → credit card number
//! 4. `###-##-####` → social security number
//!
//! Classification is a pure function of the line.

use std::sync::OnceLock;

use regex::Regex;

pub use common::protocol::SensitiveKind;

const SSN_LABEL: &str = "SSN:";

/// The rule that fired for a line. Finer-grained than [`SensitiveKind`]: the
/// tokenizer masks a labelled SSN differently from a bare one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Email,
    LabelledSsn,
    CreditCard,
    BareSsn,
}

impl Rule {
    pub fn kind(self) -> SensitiveKind {
        match self {
            Rule::Email => SensitiveKind::Email,
            Rule::LabelledSsn | Rule::BareSsn => SensitiveKind::SocialSecurityNumber,
            Rule::CreditCard => SensitiveKind::CreditCardNumber,
        }
    }
}

/// Result of scanning one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// Highest-priority rule that matched.
    pub rule: Rule,
    /// Byte offset where the sensitive region begins. Everything before it
    /// is context (e.g. `"Contact: "`); everything from it onwards is masked.
    pub start: usize,
}

/// Label a line with its [`SensitiveKind`].
pub fn classify(line: &str) -> SensitiveKind {
    detect(line).map_or(SensitiveKind::None, |d| d.rule.kind())
}

/// Scan a line, returning the winning rule and the start of the region to mask.
///
/// The region starts at the earliest position any rule matched, not only the
/// winning one, so a line like `123-45-6789 a@b.com` is masked from the SSN.
pub fn detect(line: &str) -> Option<Detection> {
    let email = line.find('@').map(|at| word_start(line, at));
    let label = line.find(SSN_LABEL);
    let card = credit_card_pattern().find(line).map(|m| m.start());
    let ssn = ssn_pattern().find(line).map(|m| m.start());

    let rule = if email.is_some() {
        Rule::Email
    } else if label.is_some() {
        Rule::LabelledSsn
    } else if card.is_some() {
        Rule::CreditCard
    } else if ssn.is_some() {
        Rule::BareSsn
    } else {
        return None;
    };

    let start = [email, label, card, ssn].into_iter().flatten().min()?;
    Some(Detection { rule, start })
}

/// Byte offset of the first character of the whitespace-delimited word
/// containing `at`.
fn word_start(line: &str, at: usize) -> usize {
    line[..at]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8())
}

fn credit_card_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d{4}-\d{4}-\d{4}-\d{4}").expect("valid regex literal"))
}

fn ssn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d{3}-\d{2}-\d{4}").expect("valid regex literal"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_detected() {
        assert_eq!(classify("reach me at a@b.com"), SensitiveKind::Email);
    }

    #[test]
    fn labelled_ssn_detected_without_digits() {
        assert_eq!(classify("SSN: pending"), SensitiveKind::SocialSecurityNumber);
        assert_eq!(detect("SSN: pending").unwrap().rule, Rule::LabelledSsn);
    }

    #[test]
    fn credit_card_detected() {
        assert_eq!(
            classify("card 4111-1111-1111-1111"),
            SensitiveKind::CreditCardNumber
        );
    }

    #[test]
    fn bare_ssn_detected() {
        let d = detect("id 123-45-6789").unwrap();
        assert_eq!(d.rule, Rule::BareSsn);
        assert_eq!(d.start, 3);
    }

    #[test]
    fn plain_text_is_none() {
        assert_eq!(classify("No sensitive data here"), SensitiveKind::None);
        assert_eq!(classify(""), SensitiveKind::None);
        assert_eq!(classify("call 555-1234"), SensitiveKind::None);
    }

    #[test]
    fn email_wins_over_everything() {
        assert_eq!(
            classify("SSN: 123-45-6789 a@b.com"),
            SensitiveKind::Email
        );
    }

    #[test]
    fn label_wins_over_card() {
        let d = detect("SSN: 4111-1111-1111-1111").unwrap();
        assert_eq!(d.rule, Rule::LabelledSsn);
    }

    #[test]
    fn card_wins_over_bare_ssn() {
        assert_eq!(
            classify("4111-1111-1111-1111 and 123-45-6789"),
            SensitiveKind::CreditCardNumber
        );
    }

    #[test]
    fn mask_starts_at_email_word() {
        let d = detect("Contact: a@b.com").unwrap();
        assert_eq!(d.start, "Contact: ".len());
    }

    #[test]
    fn mask_starts_at_earliest_match() {
        let d = detect("123-45-6789 a@b.com").unwrap();
        assert_eq!(d.rule, Rule::Email);
        assert_eq!(d.start, 0);
    }

    #[test]
    fn mask_starts_at_label() {
        let d = detect("Patient SSN: 123-45-6789").unwrap();
        assert_eq!(d.start, "Patient ".len());
    }

    #[test]
    fn word_start_handles_multibyte_whitespace() {
        let line = "x\u{3000}a@b.com";
        let d = detect(line).unwrap();
        assert_eq!(&line[d.start..], "a@b.com");
    }

    #[test]
    fn classification_is_deterministic() {
        let lines = [
            "a@b.com",
            "SSN: 123-45-6789",
            "4111-1111-1111-1111",
            "123-45-6789",
            "nothing",
        ];
        for line in lines {
            assert_eq!(classify(line), classify(line));
            assert_eq!(detect(line), detect(line));
        }
    }
}
