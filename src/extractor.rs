//! OTP extraction from email content using a prioritized strategy cascade.
//!
//! This module provides the [`ExtractStrategy`] trait and the built-in
//! strategies that [`OtpExtractor::standard`] applies in fixed priority order.
//! The first strategy that produces a valid six-digit candidate wins and
//! short-circuits the rest; there is no aggregation or voting. Unstructured
//! email bodies genuinely have no stable schema, so the ordered cascade is
//! intentional here.
//!
//! # Example
//!
//! ```
//! use webmail_otp::extractor::{EmailBody, OtpExtractor};
//!
//! let extractor = OtpExtractor::standard();
//! let body = EmailBody::from_text("Your code: 482913 expires in 5 minutes, ref 12345678");
//! assert_eq!(extractor.extract(&body).unwrap().as_str(), "482913");
//! ```

use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

/// A one-time passcode candidate: exactly six ASCII digits.
///
/// Anything that does not satisfy the invariant is treated as "no candidate",
/// never as a malformed result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCandidate(String);

impl OtpCandidate {
    /// Validates a raw string as an OTP candidate.
    ///
    /// Returns `None` unless the input is exactly six ASCII digits.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        (raw.len() == 6 && raw.bytes().all(|b| b.is_ascii_digit()))
            .then(|| Self(raw.to_string()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OtpCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OtpCandidate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Plain-text and raw-HTML renderings of one fetched message.
///
/// Ephemeral: owned by a single fetch, never cached across attempts. The HTML
/// is carried alongside the text so that DOM-structural strategies can run
/// without the extractor performing any I/O of its own.
#[derive(Debug, Clone, Default)]
pub struct EmailBody {
    /// Rendered text of the message-content frame.
    pub text: String,
    /// Raw HTML source of the message-content frame.
    pub html: String,
}

impl EmailBody {
    /// Creates a body from rendered text and raw HTML.
    #[must_use]
    pub fn new(text: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: html.into(),
        }
    }

    /// Creates a text-only body with no HTML source.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: String::new(),
        }
    }
}

/// One rule in the extraction cascade.
///
/// Implementations are pure functions over [`EmailBody`]; a returned string is
/// only a candidate and is still validated against the [`OtpCandidate`]
/// invariant by the cascade.
pub trait ExtractStrategy: Send + Sync {
    /// Attempts to find a candidate code in the body.
    fn find<'a>(&self, body: &'a EmailBody) -> Option<Cow<'a, str>>;

    /// Returns a human-readable description of what this strategy looks for.
    ///
    /// Used in logging.
    fn description(&self) -> &str;
}

/// Strategy 1: a maximal run of exactly six digits with non-digit boundaries.
///
/// The boundary requirement keeps a six-digit window inside a longer number
/// (timestamps, order ids, phone fragments) from matching.
#[derive(Debug, Clone)]
pub struct BoundedDigits {
    regex: Regex,
}

impl BoundedDigits {
    /// Creates the bounded six-digit strategy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regex: Regex::new(r"\b([0-9]{6})\b").expect("valid regex"),
        }
    }
}

impl Default for BoundedDigits {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractStrategy for BoundedDigits {
    fn find<'a>(&self, body: &'a EmailBody) -> Option<Cow<'a, str>> {
        self.regex
            .captures(&body.text)
            .and_then(|caps| caps.get(1))
            .map(|m| Cow::Borrowed(m.as_str()))
    }

    fn description(&self) -> &str {
        "bounded six-digit token"
    }
}

/// Strategy 2: a label token (`otp`, `code`, `verification code`) followed by
/// optional punctuation/whitespace and exactly six digits.
///
/// Returns the digit group, never the label.
#[derive(Debug, Clone)]
pub struct LabeledCode {
    regex: Regex,
}

impl LabeledCode {
    /// Creates the labeled-code strategy.
    #[must_use]
    pub fn new() -> Self {
        // "verification code" before "code" so the longer label wins
        Self {
            regex: Regex::new(r"(?i)(?:otp|verification code|code)[:.]?\s*([0-9]{6})\b")
                .expect("valid regex"),
        }
    }
}

impl Default for LabeledCode {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractStrategy for LabeledCode {
    fn find<'a>(&self, body: &'a EmailBody) -> Option<Cow<'a, str>> {
        self.regex
            .captures(&body.text)
            .and_then(|caps| caps.get(1))
            .map(|m| Cow::Borrowed(m.as_str()))
    }

    fn description(&self) -> &str {
        "labeled code"
    }
}

/// Strategy 3: an emphasized element (`strong`, `b`, `span`) whose normalized
/// text content is exactly six digits.
///
/// Operates on the raw HTML of the message frame, supplied by the caller.
#[derive(Debug, Clone)]
pub struct EmphasizedElement {
    regex: Regex,
}

impl EmphasizedElement {
    /// Creates the emphasized-element strategy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regex: Regex::new(r"(?is)<(?:strong|b|span)(?:\s[^>]*)?>\s*([0-9]{6})\s*</")
                .expect("valid regex"),
        }
    }
}

impl Default for EmphasizedElement {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractStrategy for EmphasizedElement {
    fn find<'a>(&self, body: &'a EmailBody) -> Option<Cow<'a, str>> {
        self.regex
            .captures(&body.html)
            .and_then(|caps| caps.get(1))
            .map(|m| Cow::Borrowed(m.as_str()))
    }

    fn description(&self) -> &str {
        "emphasized element"
    }
}

/// Strategy 4: the first run of six consecutive digits anywhere in the text,
/// with no boundary requirement.
///
/// Last resort with a known false-positive risk: any earlier six-digit window
/// (a date, a partial order id) wins over the real code when strategies 1-3
/// all miss. Kept as-is to preserve the observable extraction behavior.
#[derive(Debug, Clone)]
pub struct BareDigits {
    regex: Regex,
}

impl BareDigits {
    /// Creates the unbounded six-digit strategy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regex: Regex::new(r"([0-9]{6})").expect("valid regex"),
        }
    }
}

impl Default for BareDigits {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractStrategy for BareDigits {
    fn find<'a>(&self, body: &'a EmailBody) -> Option<Cow<'a, str>> {
        self.regex
            .captures(&body.text)
            .and_then(|caps| caps.get(1))
            .map(|m| Cow::Borrowed(m.as_str()))
    }

    fn description(&self) -> &str {
        "unbounded six-digit run"
    }
}

/// Ordered extraction cascade producing an [`OtpCandidate`].
///
/// Strategies are tried in order; the first valid candidate wins. A miss
/// across the whole cascade is a normal `None`, not an error.
pub struct OtpExtractor {
    strategies: Vec<Box<dyn ExtractStrategy>>,
}

impl OtpExtractor {
    /// The standard four-strategy cascade, in priority order:
    /// bounded token, labeled code, emphasized element, unbounded run.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            strategies: vec![
                Box::new(BoundedDigits::new()),
                Box::new(LabeledCode::new()),
                Box::new(EmphasizedElement::new()),
                Box::new(BareDigits::new()),
            ],
        }
    }

    /// Creates a cascade from custom strategies, tried in the given order.
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn ExtractStrategy>>) -> Self {
        Self { strategies }
    }

    /// Runs the cascade over the body.
    ///
    /// Returns the first candidate satisfying the [`OtpCandidate`] invariant,
    /// or `None` when every strategy misses.
    #[must_use]
    pub fn extract(&self, body: &EmailBody) -> Option<OtpCandidate> {
        for strategy in &self.strategies {
            match strategy.find(body).and_then(|raw| OtpCandidate::parse(&raw)) {
                Some(candidate) => {
                    debug!(
                        strategy = strategy.description(),
                        "Extraction strategy matched"
                    );
                    return Some(candidate);
                }
                None => {
                    debug!(
                        strategy = strategy.description(),
                        "Extraction strategy missed"
                    );
                }
            }
        }

        None
    }
}

impl Default for OtpExtractor {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for OtpExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.description()).collect();
        f.debug_struct("OtpExtractor")
            .field("strategies", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_invariant() {
        assert!(OtpCandidate::parse("123456").is_some());
        assert!(OtpCandidate::parse(" 123456 ").is_some()); // trimmed
        assert!(OtpCandidate::parse("12345").is_none()); // 5 digits
        assert!(OtpCandidate::parse("1234567").is_none()); // 7 digits
        assert!(OtpCandidate::parse("12a456").is_none());
        assert!(OtpCandidate::parse("١٢٣٤٥٦").is_none()); // non-ASCII digits
    }

    #[test]
    fn test_bounded_wins_over_longer_run() {
        let body =
            EmailBody::from_text("Your code: 482913 expires in 5 minutes, ref 12345678");
        let code = OtpExtractor::standard().extract(&body).unwrap();
        assert_eq!(code.as_str(), "482913");
    }

    #[test]
    fn test_no_candidate_on_plain_text() {
        let body = EmailBody::from_text("Welcome! Please confirm your email.");
        assert!(OtpExtractor::standard().extract(&body).is_none());
    }

    #[test]
    fn test_labeled_code_after_long_number() {
        let body = EmailBody::from_text("order 1234567890, OTP: 551234");
        let code = OtpExtractor::standard().extract(&body).unwrap();
        assert_eq!(code.as_str(), "551234");
    }

    #[test]
    fn test_bounded_strategy_isolation() {
        let strategy = BoundedDigits::new();
        let hit = EmailBody::from_text("use 482913 now");
        assert_eq!(strategy.find(&hit).as_deref(), Some("482913"));

        // Six digits embedded in a longer run must not match
        let miss = EmailBody::from_text("ref 12345678");
        assert!(strategy.find(&miss).is_none());
    }

    #[test]
    fn test_labeled_strategy_isolation() {
        let strategy = LabeledCode::new();

        let body = EmailBody::from_text("Verification Code: 998877");
        assert_eq!(strategy.find(&body).as_deref(), Some("998877"));

        let body = EmailBody::from_text("otp 112233");
        assert_eq!(strategy.find(&body).as_deref(), Some("112233"));

        // Label followed by a longer number is not a six-digit code
        let body = EmailBody::from_text("code: 1234567890");
        assert!(strategy.find(&body).is_none());

        // No label, no match
        let body = EmailBody::from_text("just 445566 digits");
        assert!(strategy.find(&body).is_none());
    }

    #[test]
    fn test_emphasized_strategy_isolation() {
        let strategy = EmphasizedElement::new();

        let body = EmailBody::new("", "<p>Your code is <strong>334455</strong></p>");
        assert_eq!(strategy.find(&body).as_deref(), Some("334455"));

        let body = EmailBody::new("", r#"<span class="otp"> 667788 </span>"#);
        assert_eq!(strategy.find(&body).as_deref(), Some("667788"));

        // <big> must not be mistaken for <b>
        let body = EmailBody::new("", "<big>123456</big>");
        assert!(strategy.find(&body).is_none());

        // Extra content inside the element is not a bare six-digit code
        let body = EmailBody::new("", "<b>code 123456</b>");
        assert!(strategy.find(&body).is_none());
    }

    #[test]
    fn test_bare_strategy_isolation() {
        let strategy = BareDigits::new();

        // Matches inside a longer run, by design
        let body = EmailBody::from_text("ref 12345678");
        assert_eq!(strategy.find(&body).as_deref(), Some("123456"));

        let body = EmailBody::from_text("no digits here");
        assert!(strategy.find(&body).is_none());
    }

    #[test]
    fn test_priority_order_is_fixed() {
        // Emphasized HTML code and a bounded text token both present:
        // the bounded token (strategy 1) must win.
        let body = EmailBody::new(
            "confirm with 111222 today",
            "<strong>999888</strong>",
        );
        let code = OtpExtractor::standard().extract(&body).unwrap();
        assert_eq!(code.as_str(), "111222");

        // Only the HTML side has a six-digit code: strategy 3 supplies it.
        let body = EmailBody::new("no numeric content", "<b>999888</b>");
        let code = OtpExtractor::standard().extract(&body).unwrap();
        assert_eq!(code.as_str(), "999888");
    }

    #[test]
    fn test_unbounded_fallback_last() {
        // Only an embedded run exists; strategies 1-3 miss, strategy 4 fires.
        let body = EmailBody::from_text("tracking 98765432 shipped");
        let code = OtpExtractor::standard().extract(&body).unwrap();
        assert_eq!(code.as_str(), "987654");
    }

    #[test]
    fn test_custom_cascade() {
        let extractor = OtpExtractor::new(vec![Box::new(LabeledCode::new())]);

        let body = EmailBody::from_text("code: 555666 and also 777888");
        assert_eq!(extractor.extract(&body).unwrap().as_str(), "555666");

        // The single-strategy cascade has no bare-digits fallback
        let body = EmailBody::from_text("only 777888 here");
        // Bounded token strategy is absent too, so nothing matches
        assert!(extractor.extract(&body).is_none());
    }
}
