//! Configuration for webmail OTP retrieval.
//!
//! Use [`WebmailConfigBuilder`] to create a configuration with sensible defaults:
//!
//! ```
//! use webmail_otp::WebmailConfig;
//!
//! let config = WebmailConfig::builder()
//!     .mailbox("qa-device@yopmail.com")
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::{Error, Result};
use crate::provider::{ProviderProfile, ProviderRegistry};
use email_address::EmailAddress;
use std::time::Duration;

/// A disposable mailbox address, structurally `localpart@domain`.
///
/// Only the local part is submitted to the provider's public mailbox lookup;
/// the domain selects the provider profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxAddress(EmailAddress);

impl MailboxAddress {
    /// Parses and validates a mailbox address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMailboxAddress`] if the address is not a valid
    /// `localpart@domain` form with a non-empty local part.
    pub fn parse(raw: &str) -> Result<Self> {
        EmailAddress::parse_with_options(raw, email_address::Options::default())
            .map(Self)
            .map_err(|_| Error::InvalidMailboxAddress {
                address: raw.to_string(),
            })
    }

    /// Returns the full address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the part before the `@`, used to address the provider's
    /// public mailbox view.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.local_part()
    }

    /// Returns the part after the `@`, used for provider discovery.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.domain()
    }
}

impl std::str::FromStr for MailboxAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for MailboxAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for one OTP retrieval client.
///
/// Create using [`WebmailConfig::builder()`].
#[derive(Debug, Clone)]
pub struct WebmailConfig {
    /// The mailbox to read, validated at build time.
    mailbox: MailboxAddress,
    /// WebDriver endpoint URL (default: `http://localhost:4444`).
    pub webdriver_url: String,
    /// Resolved provider profile for the mailbox domain.
    pub provider: ProviderProfile,
    /// Whether to run the browser headless.
    pub headless: bool,
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
    /// Retry policy for the retrieval loop.
    pub retry: RetryPolicy,
}

impl WebmailConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> WebmailConfigBuilder {
        WebmailConfigBuilder::default()
    }

    /// Returns the mailbox address.
    #[must_use]
    pub fn mailbox(&self) -> &MailboxAddress {
        &self.mailbox
    }
}

/// Timeout configuration for navigation steps.
///
/// Each step blocks until complete or until its window elapses; there is no
/// mid-step cancellation.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Wait for the mailbox lookup field on the landing page.
    pub lookup: Duration,
    /// Wait for an expected frame to be present.
    pub frame: Duration,
    /// Wait for at least one message row in the inbox frame.
    pub message: Duration,
    /// Fixed settle delay after triggering an inbox refresh.
    pub settle: Duration,
    /// Timeout for closing the browser session.
    pub close: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            lookup: Duration::from_secs(20),
            frame: Duration::from_secs(20),
            message: Duration::from_secs(20),
            settle: Duration::from_secs(2),
            close: Duration::from_secs(5),
        }
    }
}

/// Retry policy for the retrieval loop.
///
/// Immutable once built; one policy governs one retrieval request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of fetch-and-extract attempts. Must be at least 1.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Builder for [`WebmailConfig`].
#[derive(Debug, Default)]
pub struct WebmailConfigBuilder {
    mailbox: Option<String>,
    webdriver_url: Option<String>,
    provider: Option<ProviderProfile>,
    provider_registry: Option<ProviderRegistry>,
    headless: Option<bool>,
    timeouts: Option<TimeoutConfig>,
    retry: Option<RetryPolicy>,
}

impl WebmailConfigBuilder {
    /// Sets the mailbox address (required).
    ///
    /// The domain is used to resolve the provider profile unless one is set
    /// explicitly.
    #[must_use]
    pub fn mailbox(mut self, address: impl Into<String>) -> Self {
        self.mailbox = Some(address.into());
        self
    }

    /// Sets the WebDriver endpoint URL.
    ///
    /// Default is `http://localhost:4444`.
    #[must_use]
    pub fn webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = Some(url.into());
        self
    }

    /// Sets the provider profile explicitly, bypassing domain discovery.
    #[must_use]
    pub fn provider(mut self, profile: ProviderProfile) -> Self {
        self.provider = Some(profile);
        self
    }

    /// Sets a custom provider registry for domain discovery.
    ///
    /// Used during [`build()`](Self::build) when no explicit
    /// [`provider`](Self::provider) is set.
    #[must_use]
    pub fn provider_registry(mut self, registry: ProviderRegistry) -> Self {
        self.provider_registry = Some(registry);
        self
    }

    /// Sets whether the browser runs headless. Default is `true`.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = Some(headless);
        self
    }

    /// Sets timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Sets the frame-presence wait window.
    #[must_use]
    pub fn frame_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .frame = timeout;
        self
    }

    /// Sets the message-row wait window.
    #[must_use]
    pub fn message_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .message = timeout;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Sets the maximum number of retrieval attempts.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.retry
            .get_or_insert_with(RetryPolicy::default)
            .max_attempts = attempts;
        self
    }

    /// Sets the delay between retrieval attempts.
    #[must_use]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry
            .get_or_insert_with(RetryPolicy::default)
            .retry_delay = delay;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or invalid, or if no
    /// provider profile can be resolved for the mailbox domain.
    pub fn build(self) -> Result<WebmailConfig> {
        let mailbox_raw = self.mailbox.ok_or_else(|| Error::InvalidConfig {
            message: "mailbox is required".into(),
        })?;
        let mailbox = MailboxAddress::parse(&mailbox_raw)?;

        let webdriver_url = self
            .webdriver_url
            .unwrap_or_else(|| "http://localhost:4444".to_string());
        url::Url::parse(&webdriver_url).map_err(|e| Error::InvalidConfig {
            message: format!("invalid webdriver url '{webdriver_url}': {e}"),
        })?;

        let retry = self.retry.unwrap_or_default();
        if retry.max_attempts < 1 {
            return Err(Error::InvalidConfig {
                message: "max_attempts must be at least 1".into(),
            });
        }

        // Resolve provider: explicit > registry > built-in defaults
        let provider = match self.provider {
            Some(profile) => profile,
            None => {
                let registry = self
                    .provider_registry
                    .unwrap_or_else(ProviderRegistry::with_defaults);
                registry
                    .discover(mailbox.domain())
                    .ok_or_else(|| Error::UnknownProvider {
                        domain: mailbox.domain().to_string(),
                    })?
            }
        };

        Ok(WebmailConfig {
            mailbox,
            webdriver_url,
            provider,
            headless: self.headless.unwrap_or(true),
            timeouts: self.timeouts.unwrap_or_default(),
            retry,
        })
    }
}
