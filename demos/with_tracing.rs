//! Example: using tracing for observability.
//!
//! This example demonstrates how to enable structured logging using
//! the `tracing` ecosystem. All major operations in webmail-otp emit
//! tracing spans and events.
//!
//! # Usage
//!
//! ```bash
//! export OTP_MAILBOX="qa-device@yopmail.com"
//! export WEBDRIVER_URL="http://localhost:4444"
//! # Set log level (trace, debug, info, warn, error)
//! export RUST_LOG=webmail_otp=debug
//!
//! cargo run --example with_tracing
//! ```

use std::env;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;
use webmail_otp::{OtpClient, WebmailConfig};

#[tokio::main]
async fn main() -> webmail_otp::Result<()> {
    // Initialize tracing subscriber with environment filter
    // Use RUST_LOG environment variable to control log levels
    // Example: RUST_LOG=webmail_otp=debug,info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("webmail_otp=info")),
        )
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let mailbox = env::var("OTP_MAILBOX").expect("OTP_MAILBOX environment variable required");
    let webdriver_url =
        env::var("WEBDRIVER_URL").unwrap_or_else(|_| "http://localhost:4444".to_string());

    tracing::info!(mailbox = %mailbox, "Starting webmail-otp example");

    let config = WebmailConfig::builder()
        .mailbox(&mailbox)
        .webdriver_url(&webdriver_url)
        .max_attempts(5)
        .retry_delay(Duration::from_secs(3))
        .build()?;

    tracing::debug!("Configuration built successfully");

    // Connect - this will emit spans for session startup
    let mut client = OtpClient::connect(config).await?;

    tracing::info!("Session established, retrieving OTP code");

    // Retrieval emits spans for each attempt, frame transition, and
    // extraction strategy evaluation
    match client.retrieve_otp().await {
        Ok(otp) => {
            tracing::info!(code = %otp, "OTP retrieved");
            println!("Got OTP code: {}", otp);
        }
        Err(e) => {
            tracing::error!(error = %e, category = %e.category(), "Retrieval failed");
        }
    }

    client.close().await?;
    tracing::info!("Session closed");

    Ok(())
}
