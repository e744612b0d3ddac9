//! Example: custom provider profiles and a custom extraction cascade.
//!
//! This example demonstrates how to:
//! - Register a provider profile for a webmail frontend the built-in
//!   registry does not know about
//! - Replace the standard extraction cascade with a custom strategy order
//!
//! # Usage
//!
//! ```bash
//! export OTP_MAILBOX="qa-device@mail.example.net"
//! export WEBDRIVER_URL="http://localhost:4444"
//! cargo run --example custom_provider
//! ```

use std::env;
use webmail_otp::extractor::{BoundedDigits, LabeledCode, OtpExtractor};
use webmail_otp::provider::{ProviderProfile, ProviderRegistry};
use webmail_otp::{OtpClient, WebmailConfig};

/// A profile for a self-hosted webmail frontend with its own selectors.
fn staging_webmail_profile() -> ProviderProfile {
    ProviderProfile {
        name: "staging-webmail".to_string(),
        base_url: "https://mail.example.net/".to_string(),
        lookup_field: "input#mailbox-name".to_string(),
        open_inbox_button: "button#open-inbox".to_string(),
        refresh_button: "button.reload".to_string(),
        inbox_frame: "iframe#messages".to_string(),
        message_frame: "iframe#content".to_string(),
        message_row: "li.message-row".to_string(),
    }
}

#[tokio::main]
async fn main() -> webmail_otp::Result<()> {
    let mailbox = env::var("OTP_MAILBOX").expect("OTP_MAILBOX environment variable required");
    let webdriver_url =
        env::var("WEBDRIVER_URL").unwrap_or_else(|_| "http://localhost:4444".to_string());

    // Custom registrations take precedence over the built-in profiles
    let mut registry = ProviderRegistry::with_defaults();
    registry.register("mail.example.net", staging_webmail_profile());

    let config = WebmailConfig::builder()
        .mailbox(&mailbox)
        .webdriver_url(&webdriver_url)
        .provider_registry(registry)
        .build()?;

    let mut client = OtpClient::connect(config).await?;

    // A stricter cascade: only accept a labeled code or a word-bounded
    // six-digit run; never fall back to bare digits
    let extractor = OtpExtractor::new(vec![
        Box::new(LabeledCode::new()),
        Box::new(BoundedDigits::new()),
    ]);

    println!("Retrieving OTP with a strict cascade...");
    let otp = client.retrieve_with(&extractor).await?;

    println!("Got OTP code: {}", otp);

    client.close().await?;

    Ok(())
}
