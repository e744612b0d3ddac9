//! Basic example: retrieve an OTP code from a disposable webmail inbox.
//!
//! This example demonstrates the most common use case - opening a browser
//! session against the webmail provider and retrieving a 6-digit OTP code
//! from the latest message in a mailbox.
//!
//! # Usage
//!
//! ```bash
//! # Start a WebDriver endpoint first, e.g.:
//! #   chromedriver --port=4444
//! export OTP_MAILBOX="qa-device@yopmail.com"
//! export WEBDRIVER_URL="http://localhost:4444"
//! cargo run --example basic_otp
//! ```

use std::env;
use webmail_otp::{OtpClient, WebmailConfig};

#[tokio::main]
async fn main() -> webmail_otp::Result<()> {
    // Read the target mailbox from environment
    let mailbox = env::var("OTP_MAILBOX").expect("OTP_MAILBOX environment variable required");
    let webdriver_url =
        env::var("WEBDRIVER_URL").unwrap_or_else(|_| "http://localhost:4444".to_string());

    println!("Opening webmail session for {}...", mailbox);

    // Build configuration - the provider profile is discovered from the
    // mailbox domain
    let config = WebmailConfig::builder()
        .mailbox(&mailbox)
        .webdriver_url(&webdriver_url)
        .build()?;

    // Start the browser session
    let mut client = OtpClient::connect(config).await?;

    println!("Session started! Retrieving OTP code...");
    println!("(Send a 6-digit code to the mailbox, or press Ctrl+C to cancel)");

    // Fetch the inbox and extract a 6-digit code, retrying on transient failure
    let otp = client.retrieve_otp().await?;

    println!("Got OTP code: {}", otp);

    // Clean up
    client.close().await?;

    Ok(())
}
