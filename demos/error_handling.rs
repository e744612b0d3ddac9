//! Example: proper error handling around retrieval.
//!
//! This example demonstrates how to classify errors by category and
//! retryability, how to retry session startup for transient failures, and
//! how to fall back to a fixture code when the provider never delivers.
//!
//! # Usage
//!
//! ```bash
//! export OTP_MAILBOX="qa-device@yopmail.com"
//! export WEBDRIVER_URL="http://localhost:4444"
//! cargo run --example error_handling
//! ```

use std::env;
use std::time::Duration;
use webmail_otp::{Error, ErrorCategory, OtpClient, WebmailConfig};

const MAX_CONNECT_RETRIES: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// A known fixture code accepted by the system under test, so a flaky
/// provider does not make the whole suite non-runnable.
const FALLBACK_CODE: &str = "000000";

/// Start a session with automatic retry for transient failures.
async fn connect_with_retry(config: &WebmailConfig) -> Result<OtpClient, Error> {
    let mut last_error = None;
    let mut backoff = INITIAL_BACKOFF;

    for attempt in 1..=MAX_CONNECT_RETRIES {
        println!("Session attempt {}/{}...", attempt, MAX_CONNECT_RETRIES);

        match OtpClient::connect(config.clone()).await {
            Ok(client) => {
                println!("Session started successfully!");
                return Ok(client);
            }
            Err(e) => {
                println!("  Error: {}", e);
                println!("  Category: {}", e.category());
                println!("  Retryable: {}", e.is_retryable());

                if e.is_retryable() && attempt < MAX_CONNECT_RETRIES {
                    println!("  Retrying in {:?}...", backoff);
                    tokio::time::sleep(backoff).await;
                    backoff *= 2; // Exponential backoff
                    last_error = Some(e);
                } else {
                    return Err(e);
                }
            }
        }
    }

    Err(last_error.expect("at least one attempt was made"))
}

/// Retrieval with category-aware handling and a fixture fallback.
async fn retrieve_with_fallback(client: &mut OtpClient) -> Result<String, Error> {
    match client.retrieve_otp().await {
        Ok(code) => Ok(code.as_str().to_string()),
        Err(e) => match e.category() {
            // All attempts ran and no code arrived; fall back
            ErrorCategory::Terminal => {
                println!("No code delivered in time, using fallback: {}", FALLBACK_CODE);
                Ok(FALLBACK_CODE.to_string())
            }
            // Anything else at this level is a setup or lifecycle bug
            _ => Err(e),
        },
    }
}

#[tokio::main]
async fn main() -> webmail_otp::Result<()> {
    let mailbox = env::var("OTP_MAILBOX").expect("OTP_MAILBOX environment variable required");
    let webdriver_url =
        env::var("WEBDRIVER_URL").unwrap_or_else(|_| "http://localhost:4444".to_string());

    let config = WebmailConfig::builder()
        .mailbox(&mailbox)
        .webdriver_url(&webdriver_url)
        .max_attempts(3)
        .retry_delay(Duration::from_secs(5))
        .build()?;

    let mut client = connect_with_retry(&config).await?;

    let code = retrieve_with_fallback(&mut client).await?;
    println!("Using code: {}", code);

    client.close().await?;

    Ok(())
}
