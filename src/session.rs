//! Mailbox session: one exclusive browser session against the webmail provider.
//!
//! A [`MailboxSession`] is created once per test case (or per login attempt,
//! at the caller's discretion), used for one or more fetches across retry
//! attempts, and closed exactly once on teardown. The inbox is re-read on
//! every fetch; nothing is cached across attempts.

use crate::config::{MailboxAddress, TimeoutConfig, WebmailConfig};
use crate::driver::MailboxDriver;
use crate::error::{Error, Result};
use crate::extractor::EmailBody;
use crate::navigator::FrameNavigator;
use crate::provider::ProviderProfile;
use crate::webdriver::WebDriverMailbox;
use tracing::{debug, instrument};

/// Owns one isolated browser session for the webmail provider.
///
/// The session is read-only from the provider's perspective and holds no
/// persisted state. [`close`](Self::close) is idempotent and safe after a
/// failed or partial fetch.
pub struct MailboxSession {
    driver: Option<Box<dyn MailboxDriver>>,
    provider: ProviderProfile,
    timeouts: TimeoutConfig,
}

impl MailboxSession {
    /// Starts a WebDriver-backed session using the configuration's endpoint
    /// and provider profile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionStart`] if the WebDriver endpoint rejects the
    /// session request.
    #[instrument(
        name = "MailboxSession::start",
        skip_all,
        fields(provider = %config.provider.name, webdriver_url = %config.webdriver_url)
    )]
    pub async fn start(config: &WebmailConfig) -> Result<Self> {
        let driver = WebDriverMailbox::launch(&config.webdriver_url, config.headless).await?;

        Ok(Self::with_driver(
            Box::new(driver),
            config.provider.clone(),
            config.timeouts.clone(),
        ))
    }

    /// Creates a session over a custom driver implementation.
    ///
    /// Useful for alternative backends and for test doubles.
    #[must_use]
    pub fn with_driver(
        driver: Box<dyn MailboxDriver>,
        provider: ProviderProfile,
        timeouts: TimeoutConfig,
    ) -> Self {
        Self {
            driver: Some(driver),
            provider,
            timeouts,
        }
    }

    /// Returns `true` once the session has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.driver.is_none()
    }

    /// Performs one complete fetch of the latest message's content for the
    /// given mailbox.
    ///
    /// Steps: navigate to the provider's landing page, submit the local part
    /// into the lookup field, open the inbox, trigger a best-effort refresh
    /// (absence of the control is tolerated), then navigate
    /// top → inbox frame → message row → top → content frame and read the
    /// body.
    ///
    /// # Errors
    ///
    /// Any step failure is this attempt's failure and is reported to the
    /// caller; nothing is retried inside the session. A missing refresh
    /// control is the one exception: it is logged and swallowed.
    #[instrument(
        name = "MailboxSession::fetch_latest_message",
        skip(self),
        fields(mailbox = %mailbox, provider = %self.provider.name)
    )]
    pub async fn fetch_latest_message(&mut self, mailbox: &MailboxAddress) -> Result<EmailBody> {
        let Self {
            driver,
            provider,
            timeouts,
        } = self;
        let driver: &mut dyn MailboxDriver = driver.as_mut().ok_or(Error::SessionClosed)?.as_mut();

        // Landing page and mailbox lookup
        driver.open(&provider.base_url).await?;
        driver
            .fill(&provider.lookup_field, mailbox.local_part(), timeouts.lookup)
            .await?;
        driver.click(&provider.open_inbox_button).await?;

        // Best-effort refresh; provider UI variability makes the control optional
        if driver.click_if_present(&provider.refresh_button).await {
            debug!("Inbox refreshed, settling");
            tokio::time::sleep(timeouts.settle).await;
        } else {
            debug!("Refresh control absent, continuing");
        }

        // Frame navigation: always through the top-level context
        let mut navigator = FrameNavigator::new(driver, provider, timeouts);
        navigator.enter_inbox_frame().await?;
        navigator.select_most_recent_message().await?;
        navigator.enter_message_frame().await?;

        let text = navigator.body_text().await?;
        let html = navigator.body_html().await?;

        debug!(text_len = text.len(), "Fetched latest message");

        Ok(EmailBody::new(text, html))
    }

    /// Releases the browser session.
    ///
    /// Safe to call multiple times and after a failed or partial fetch; the
    /// underlying session is released unconditionally on the first call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClose`] if the WebDriver session did not shut
    /// down cleanly. The session is considered closed regardless.
    #[instrument(name = "MailboxSession::close", skip(self))]
    pub async fn close(&mut self) -> Result<()> {
        match self.driver.take() {
            Some(mut driver) => driver.shutdown().await,
            None => {
                debug!("Session already closed");
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for MailboxSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailboxSession")
            .field("provider", &self.provider.name)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
