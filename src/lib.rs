//! # webmail-otp
//!
//! Async retrieval of one-time passcodes (OTPs) from disposable webmail
//! inboxes, driven through a real browser session.
//!
//! This crate provides a high-level, async API for:
//! - Opening a public webmail provider (yopmail-style) in a dedicated,
//!   isolated browser session via WebDriver
//! - Navigating the provider's nested document frames to the latest message
//! - Extracting a 6-digit code from unstructured email content using a
//!   prioritized strategy cascade
//! - Retrying the whole pipeline under transient failure with a bounded
//!   retry policy
//!
//! ## Quick Start
//!
//! ```no_run
//! use webmail_otp::{OtpClient, WebmailConfig};
//!
//! # async fn example() -> webmail_otp::Result<()> {
//! // Configure the client - the provider profile is discovered from the
//! // mailbox domain
//! let config = WebmailConfig::builder()
//!     .mailbox("qa-device@yopmail.com")
//!     .webdriver_url("http://localhost:4444")
//!     .build()?;
//!
//! // Start the browser session
//! let mut client = OtpClient::connect(config).await?;
//!
//! // Fetch the inbox and extract a 6-digit code, retrying on transient failure
//! let otp = client.retrieve_otp().await?;
//! println!("Got OTP: {}", otp);
//!
//! // Clean up
//! client.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Extraction Cascade
//!
//! The standard cascade tries, in fixed priority order: a bounded six-digit
//! token, a labeled code (`otp`/`code`/`verification code`), an emphasized
//! DOM element, and finally any six-digit run. The first match wins. You can
//! supply your own cascade:
//!
//! ```
//! use webmail_otp::extractor::{EmailBody, LabeledCode, OtpExtractor};
//!
//! let extractor = OtpExtractor::new(vec![Box::new(LabeledCode::new())]);
//! let body = EmailBody::from_text("Your verification code: 482913");
//! assert_eq!(extractor.extract(&body).unwrap().as_str(), "482913");
//! ```
//!
//! ## RAII Guard for Automatic Cleanup
//!
//! ```no_run
//! use webmail_otp::{OtpClient, WebmailConfig};
//!
//! # async fn example() -> webmail_otp::Result<()> {
//! # let config = WebmailConfig::builder().mailbox("a@yopmail.com").build()?;
//! let client = OtpClient::connect(config).await?;
//! let mut guard = client.into_guard(); // Will close the session on drop
//!
//! let code = guard.retrieve_otp().await?;
//! // Guard automatically closes the browser session when dropped
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All errors implement `std::error::Error` and provide context. Everything
//! short of [`Error::RetriesExhausted`] is scoped to a single attempt and
//! absorbed by the retry loop; callers are expected to keep a fallback (such
//! as a known fixture code) for the exhausted case so a flaky provider does
//! not make a whole test suite non-runnable:
//!
//! ```no_run
//! use webmail_otp::Error;
//!
//! fn code_or_fallback(result: webmail_otp::Result<webmail_otp::OtpCandidate>) -> String {
//!     match result {
//!         Ok(code) => code.as_str().to_string(),
//!         Err(Error::RetriesExhausted { .. }) => "000000".to_string(),
//!         Err(e) => panic!("retrieval setup failed: {e}"),
//!     }
//! }
//! ```
//!
//! ## Observability
//!
//! The crate uses `tracing` for instrumentation. All major operations emit
//! spans with structured fields.
//!
//! ### Span Naming Convention
//!
//! - `OtpClient::connect` - Session startup
//! - `OtpClient::retrieve` - The retry loop
//! - `MailboxSession::fetch_latest_message` - One fetch attempt
//! - `FrameNavigator::enter_inbox_frame` / `enter_message_frame` - Frame transitions
//! - `WebDriverMailbox::launch` - WebDriver session creation
//!
//! ### Standard Fields
//!
//! - `mailbox` - The mailbox address being read
//! - `provider` - Provider profile name
//! - `attempt` - 1-based retry attempt number
//! - `strategy` - Extraction strategy description

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod provider;

// Internal modules
mod client;
mod navigator;
mod session;
mod webdriver;

// Re-exports for ergonomic API
pub use client::{OtpClient, OtpClientGuard, RetrievalState};
pub use config::{
    MailboxAddress, RetryPolicy, TimeoutConfig, WebmailConfig, WebmailConfigBuilder,
};
pub use driver::MailboxDriver;
pub use error::{Error, ErrorCategory, Result};
pub use extractor::{EmailBody, OtpCandidate, OtpExtractor};
pub use navigator::FrameNavigator;
pub use provider::{ProviderProfile, ProviderRegistry};
pub use session::MailboxSession;
pub use webdriver::WebDriverMailbox;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // Ensure all public types are accessible
        let _ = WebmailConfig::builder();
        let _ = ProviderProfile::yopmail();
        let _ = OtpExtractor::standard();
        let _ = provider::ProviderRegistry::with_defaults();
    }
}
