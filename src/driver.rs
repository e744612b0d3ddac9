//! The browser-operation boundary used by the mailbox session.
//!
//! [`MailboxDriver`] abstracts the handful of raw WebDriver operations the
//! retrieval pipeline needs. The production implementation is
//! [`WebDriverMailbox`](crate::WebDriverMailbox); tests substitute a scripted
//! driver to assert navigation order and retry counts without a browser.
//!
//! Every operation blocks until complete or until a bounded wait elapses;
//! there is no mid-step cancellation.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Raw browser operations against the webmail provider.
///
/// All selectors are CSS. Implementations own exactly one browser session and
/// must tolerate [`shutdown`](Self::shutdown) being the last call regardless
/// of how far a fetch progressed.
#[async_trait]
pub trait MailboxDriver: Send {
    /// Navigates the session to a URL.
    async fn open(&mut self, url: &str) -> Result<()>;

    /// Waits for an element, clears it, and types into it.
    async fn fill(&mut self, selector: &str, text: &str, timeout: Duration) -> Result<()>;

    /// Clicks the first element matching the selector.
    async fn click(&mut self, selector: &str) -> Result<()>;

    /// Clicks the element if it is present right now.
    ///
    /// Returns `true` if a click happened. Absence and click failures are
    /// both reported as `false`; this is a best-effort operation.
    async fn click_if_present(&mut self, selector: &str) -> bool;

    /// Waits up to `timeout` for an element to be present.
    ///
    /// Returns `Ok(false)` when the wait window elapses without the element
    /// appearing; `Err` is reserved for protocol-level failures.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Switches focus into the iframe matching the selector.
    ///
    /// Callers are expected to have reset to the top-level context first;
    /// frame switches are not nestable.
    async fn enter_frame(&mut self, selector: &str) -> Result<()>;

    /// Returns focus to the top-level browsing context.
    async fn leave_frames(&mut self) -> Result<()>;

    /// Returns the rendered text of the document currently in focus.
    async fn body_text(&mut self) -> Result<String>;

    /// Returns the raw HTML source of the document currently in focus.
    async fn page_source(&mut self) -> Result<String>;

    /// Ends the browser session. Called exactly once by the owning session.
    async fn shutdown(&mut self) -> Result<()>;
}
