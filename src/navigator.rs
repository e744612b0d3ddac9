//! Frame navigation through the webmail's nested document structure.
//!
//! The provider renders three logical viewing contexts: the top-level page,
//! the inbox-list frame, and the message-content frame. Frame switches are
//! not nestable, so every entry goes through an explicit reset to the
//! top-level context first. That invariant removes the "stuck in the wrong
//! frame" class of bugs entirely.

use crate::config::TimeoutConfig;
use crate::driver::MailboxDriver;
use crate::error::{Error, Result};
use crate::provider::ProviderProfile;
use tracing::{debug, instrument};

/// Drives transitions between the webmail's viewing contexts.
///
/// Borrows the session's driver for the duration of one fetch; holds no state
/// of its own beyond the provider constants and wait windows.
pub struct FrameNavigator<'a> {
    driver: &'a mut dyn MailboxDriver,
    provider: &'a ProviderProfile,
    timeouts: &'a TimeoutConfig,
}

impl<'a> FrameNavigator<'a> {
    /// Creates a navigator over the given driver and provider constants.
    pub fn new(
        driver: &'a mut dyn MailboxDriver,
        provider: &'a ProviderProfile,
        timeouts: &'a TimeoutConfig,
    ) -> Self {
        Self {
            driver,
            provider,
            timeouts,
        }
    }

    /// Switches focus to the frame hosting the message list.
    ///
    /// Resets to the top-level context first to guarantee a known starting
    /// point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameNotFound`] if the inbox frame is absent after
    /// the bounded wait.
    #[instrument(name = "FrameNavigator::enter_inbox_frame", skip(self))]
    pub async fn enter_inbox_frame(&mut self) -> Result<()> {
        let frame = self.provider.inbox_frame.clone();
        self.enter_frame_from_top(&frame).await
    }

    /// Activates the first message row in display order (most recent first,
    /// matching the provider's default sort).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMessagesAvailable`] if no row appears within the
    /// wait window.
    #[instrument(name = "FrameNavigator::select_most_recent_message", skip(self))]
    pub async fn select_most_recent_message(&mut self) -> Result<()> {
        let row = self.provider.message_row.clone();
        let waited = self.timeouts.message;

        if !self.driver.wait_for(&row, waited).await? {
            return Err(Error::NoMessagesAvailable { waited });
        }

        debug!(selector = %row, "Opening most recent message");
        self.driver.click(&row).await
    }

    /// Switches focus to the frame hosting the opened message's rendered body.
    ///
    /// Resets to the top-level context first; never chained directly from the
    /// inbox frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameNotFound`] if the content frame is absent after
    /// the bounded wait.
    #[instrument(name = "FrameNavigator::enter_message_frame", skip(self))]
    pub async fn enter_message_frame(&mut self) -> Result<()> {
        let frame = self.provider.message_frame.clone();
        self.enter_frame_from_top(&frame).await
    }

    /// Returns the full rendered text of the document currently in focus.
    pub async fn body_text(&mut self) -> Result<String> {
        self.driver.body_text().await
    }

    /// Returns the raw HTML source of the document currently in focus.
    pub async fn body_html(&mut self) -> Result<String> {
        self.driver.page_source().await
    }

    /// Top-level reset followed by a bounded wait and the frame switch.
    async fn enter_frame_from_top(&mut self, frame: &str) -> Result<()> {
        self.driver.leave_frames().await?;

        let waited = self.timeouts.frame;
        if !self.driver.wait_for(frame, waited).await? {
            return Err(Error::FrameNotFound {
                frame: frame.to_string(),
                waited,
            });
        }

        self.driver.enter_frame(frame).await
    }
}

impl std::fmt::Debug for FrameNavigator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameNavigator")
            .field("provider", &self.provider.name)
            .finish_non_exhaustive()
    }
}
