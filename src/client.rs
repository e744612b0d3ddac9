//! OTP retrieval client: the retry loop over fetch-and-extract attempts.
//!
//! The [`OtpClient`] is the main entry point for this crate. It owns a
//! [`MailboxSession`] and drives a bounded retry loop: fetch the latest
//! message, run the extraction cascade, return the first valid code or a
//! terminal [`Error::RetriesExhausted`].
//!
//! # Example
//!
//! ```no_run
//! use webmail_otp::{OtpClient, WebmailConfig};
//!
//! # async fn example() -> webmail_otp::Result<()> {
//! let config = WebmailConfig::builder()
//!     .mailbox("qa-device@yopmail.com")
//!     .build()?;
//!
//! let mut client = OtpClient::connect(config).await?;
//! let code = client.retrieve_otp().await?;
//! println!("Got OTP: {}", code);
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

use crate::config::{MailboxAddress, WebmailConfig};
use crate::error::{Error, Result};
use crate::extractor::{OtpCandidate, OtpExtractor};
use crate::session::MailboxSession;
use tracing::{debug, instrument, warn};

/// Where the retry loop currently stands.
///
/// Transitions: `Idle → Attempting → {Success, Exhausted}`, then back to
/// `Attempting` on the next retrieval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalState {
    /// No retrieval has been requested yet.
    Idle,
    /// A retrieval attempt is in flight.
    Attempting {
        /// The 1-based attempt number.
        attempt: u32,
    },
    /// The last retrieval produced a valid code.
    Success,
    /// The last retrieval exhausted all attempts.
    Exhausted,
}

/// Async client retrieving OTP codes from a disposable webmail inbox.
///
/// Create using [`OtpClient::connect`].
///
/// # Lifecycle
///
/// 1. Create a client with [`connect`](Self::connect)
/// 2. Call [`retrieve_otp`](Self::retrieve_otp) one or more times
/// 3. Call [`close`](Self::close) on teardown (or use
///    [`into_guard`](Self::into_guard) for RAII)
pub struct OtpClient {
    session: MailboxSession,
    config: WebmailConfig,
    extractor: OtpExtractor,
    state: RetrievalState,
}

impl OtpClient {
    /// Starts a browser session and prepares for retrieval.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionStart`] if the WebDriver endpoint cannot be
    /// reached.
    #[instrument(
        name = "OtpClient::connect",
        skip_all,
        fields(mailbox = %config.mailbox(), provider = %config.provider.name)
    )]
    pub async fn connect(config: WebmailConfig) -> Result<Self> {
        let session = MailboxSession::start(&config).await?;
        Ok(Self::with_session(session, config))
    }

    /// Creates a client over an existing session.
    ///
    /// Useful with [`MailboxSession::with_driver`] for custom backends and
    /// test doubles.
    #[must_use]
    pub fn with_session(session: MailboxSession, config: WebmailConfig) -> Self {
        Self {
            session,
            config,
            extractor: OtpExtractor::standard(),
            state: RetrievalState::Idle,
        }
    }

    /// Retrieves an OTP using the standard extraction cascade.
    ///
    /// Runs up to `retry.max_attempts` fetch-and-extract attempts with
    /// `retry.retry_delay` between them. Every per-attempt failure - a
    /// navigation error as much as an extraction miss - is treated uniformly
    /// as "no candidate this attempt" and retried; delivery latency makes
    /// both expected and cheap to retry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetriesExhausted`] after `max_attempts` attempts
    /// without a valid code, or [`Error::SessionClosed`] if the session was
    /// closed before the call.
    pub async fn retrieve_otp(&mut self) -> Result<OtpCandidate> {
        let Self {
            session,
            config,
            extractor,
            state,
        } = self;
        retrieve_loop(session, config, extractor, state).await
    }

    /// Retrieves an OTP using a custom extraction cascade.
    ///
    /// See [`retrieve_otp`](Self::retrieve_otp) for the retry semantics.
    ///
    /// # Errors
    ///
    /// Same as [`retrieve_otp`](Self::retrieve_otp).
    pub async fn retrieve_with(&mut self, extractor: &OtpExtractor) -> Result<OtpCandidate> {
        let Self {
            session,
            config,
            state,
            ..
        } = self;
        retrieve_loop(session, config, extractor, state).await
    }

    /// Closes the underlying browser session.
    ///
    /// Idempotent; safe on teardown regardless of retrieval outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClose`] if the session did not shut down
    /// cleanly.
    pub async fn close(&mut self) -> Result<()> {
        self.session.close().await
    }

    /// Converts this client into a guard that closes the session on drop.
    #[must_use]
    pub fn into_guard(self) -> OtpClientGuard {
        OtpClientGuard { inner: Some(self) }
    }

    /// Returns the mailbox address this client reads.
    #[must_use]
    pub fn mailbox(&self) -> &MailboxAddress {
        self.config.mailbox()
    }

    /// Returns the current retry-loop state.
    #[must_use]
    pub fn state(&self) -> RetrievalState {
        self.state
    }
}

/// The bounded retry loop shared by the retrieval entry points.
#[instrument(
    name = "OtpClient::retrieve",
    skip_all,
    fields(
        mailbox = %config.mailbox(),
        max_attempts = config.retry.max_attempts
    )
)]
async fn retrieve_loop(
    session: &mut MailboxSession,
    config: &WebmailConfig,
    extractor: &OtpExtractor,
    state: &mut RetrievalState,
) -> Result<OtpCandidate> {
    let policy = &config.retry;

    for attempt in 1..=policy.max_attempts {
        *state = RetrievalState::Attempting { attempt };
        debug!(attempt, "Attempt started");

        let candidate = match session.fetch_latest_message(config.mailbox()).await {
            Ok(body) => extractor.extract(&body),
            // A closed session is a caller bug, not mailbox latency
            Err(Error::SessionClosed) => return Err(Error::SessionClosed),
            Err(e) => {
                warn!(
                    attempt,
                    error = %e,
                    category = %e.category(),
                    "Fetch failed, treating as no candidate this attempt"
                );
                None
            }
        };

        if let Some(code) = candidate {
            *state = RetrievalState::Success;
            debug!(attempt, "Attempt succeeded");
            return Ok(code);
        }

        debug!(attempt, "Attempt ended without a candidate");

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.retry_delay).await;
        }
    }

    *state = RetrievalState::Exhausted;
    Err(Error::RetriesExhausted {
        attempts: policy.max_attempts,
    })
}

impl std::fmt::Debug for OtpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpClient")
            .field("mailbox", &self.config.mailbox().as_str())
            .field("provider", &self.config.provider.name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// RAII guard for [`OtpClient`] that closes the session on drop.
///
/// Created by [`OtpClient::into_guard`].
pub struct OtpClientGuard {
    inner: Option<OtpClient>,
}

impl OtpClientGuard {
    /// Retrieves an OTP using the standard extraction cascade.
    ///
    /// See [`OtpClient::retrieve_otp`].
    ///
    /// # Panics
    ///
    /// Panics if the guard has already been consumed (e.g., after calling
    /// [`close`](Self::close)).
    ///
    /// # Errors
    ///
    /// Same as [`OtpClient::retrieve_otp`].
    pub async fn retrieve_otp(&mut self) -> Result<OtpCandidate> {
        self.inner
            .as_mut()
            .expect("guard already consumed")
            .retrieve_otp()
            .await
    }

    /// Explicitly closes the session and consumes the guard.
    ///
    /// If not called, the guard will attempt to close on drop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClose`] if the session did not shut down
    /// cleanly.
    pub async fn close(mut self) -> Result<()> {
        if let Some(mut client) = self.inner.take() {
            client.close().await
        } else {
            Ok(())
        }
    }

    /// Returns the mailbox address this guard's client reads.
    ///
    /// # Panics
    ///
    /// Panics if the guard has already been consumed.
    #[must_use]
    pub fn mailbox(&self) -> &MailboxAddress {
        self.inner
            .as_ref()
            .expect("guard already consumed")
            .mailbox()
    }
}

impl Drop for OtpClientGuard {
    fn drop(&mut self) {
        if let Some(mut client) = self.inner.take() {
            let close_timeout = client.config.timeouts.close;

            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        match tokio::time::timeout(close_timeout, client.close()).await {
                            Ok(Ok(())) => debug!("Session closed on drop"),
                            Ok(Err(e)) => warn!(error = %e, "Session close failed on drop"),
                            Err(_) => warn!(
                                timeout_secs = close_timeout.as_secs(),
                                "Session close timed out on drop"
                            ),
                        }
                    });
                }
                Err(_) => {
                    warn!(
                        "OtpClientGuard dropped outside of a tokio runtime context. \
                         The browser session will be dropped without a clean close. \
                         Consider calling .close().await explicitly before dropping."
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for OtpClientGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpClientGuard")
            .field("inner", &self.inner)
            .finish()
    }
}
