//! Error types for the webmail-otp crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are categorized by their retryability - see [`Error::is_retryable`].
//! Everything short of [`Error::RetriesExhausted`] is scoped to a single retrieval
//! attempt; the retry loop in [`OtpClient`](crate::OtpClient) absorbs those and
//! tries again.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during OTP retrieval.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration / validation errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid mailbox address format.
    #[error("invalid mailbox address: {address}")]
    InvalidMailboxAddress {
        /// The invalid mailbox address.
        address: String,
    },

    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// No provider profile is known for the mailbox domain.
    #[error("no webmail provider profile for domain '{domain}'")]
    UnknownProvider {
        /// The mailbox domain that could not be resolved.
        domain: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Session lifecycle errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to start a WebDriver session.
    #[error("failed to start WebDriver session at {webdriver_url}")]
    SessionStart {
        /// The WebDriver endpoint that was contacted.
        webdriver_url: String,
        /// The underlying session error.
        #[source]
        source: fantoccini::error::NewSessionError,
    },

    /// The mailbox session has already been closed.
    #[error("mailbox session is closed")]
    SessionClosed,

    /// Closing the browser session failed.
    #[error("failed to close WebDriver session")]
    SessionClose {
        /// The underlying WebDriver error.
        #[source]
        source: fantoccini::error::CmdError,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Per-attempt navigation errors (RETRYABLE)
    // ─────────────────────────────────────────────────────────────────────────
    /// Navigation to the webmail landing page failed.
    #[error("webmail provider unreachable at {url}")]
    ProviderUnreachable {
        /// The landing page URL.
        url: String,
        /// The underlying WebDriver error.
        #[source]
        source: fantoccini::error::CmdError,
    },

    /// An expected element did not appear within the wait window.
    #[error("element '{selector}' not found after {waited:?}")]
    ElementMissing {
        /// The selector that was waited on.
        selector: String,
        /// The wait window that elapsed.
        waited: Duration,
    },

    /// Interacting with an element failed.
    #[error("interaction with '{selector}' failed")]
    Interaction {
        /// The selector of the element.
        selector: String,
        /// The underlying WebDriver error.
        #[source]
        source: fantoccini::error::CmdError,
    },

    /// An expected frame was absent after a bounded wait.
    #[error("frame '{frame}' not found after {waited:?}")]
    FrameNotFound {
        /// The frame selector.
        frame: String,
        /// The wait window that elapsed.
        waited: Duration,
    },

    /// Switching into a frame failed at the protocol level.
    #[error("failed to switch into frame '{frame}'")]
    FrameSwitch {
        /// The frame selector.
        frame: String,
        /// The underlying WebDriver error.
        #[source]
        source: fantoccini::error::CmdError,
    },

    /// Inbox frame loaded but no message row appeared within the wait window.
    #[error("no messages available in inbox after {waited:?}")]
    NoMessagesAvailable {
        /// The wait window that elapsed.
        waited: Duration,
    },

    /// Reading the rendered document of the focused frame failed.
    #[error("failed to read document content")]
    ReadBody {
        /// The underlying WebDriver error.
        #[source]
        source: fantoccini::error::CmdError,
    },

    /// Waiting for an element failed at the protocol level (not a timeout).
    #[error("wait for '{selector}' failed")]
    WaitFailed {
        /// The selector that was waited on.
        selector: String,
        /// The underlying WebDriver error.
        #[source]
        source: fantoccini::error::CmdError,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Terminal errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// All retrieval attempts were exhausted without a valid code.
    #[error("no OTP retrieved after {attempts} attempts")]
    RetriesExhausted {
        /// How many attempts were made.
        attempts: u32,
    },
}

impl Error {
    /// Returns `true` if this error represents a single failed attempt that
    /// might succeed on retry.
    ///
    /// The retry loop uses this only for logging: per the retrieval design,
    /// every non-success within an attempt is retried uniformly. Callers that
    /// surface errors directly can use it to decide on a fallback:
    ///
    /// ```ignore
    /// if error.is_retryable() {
    ///     // Fetch again later
    /// } else {
    ///     // Fall back to a fixture code
    /// }
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            // RETRYABLE: session startup and anything scoped to one attempt
            Error::SessionStart { .. }
            | Error::ProviderUnreachable { .. }
            | Error::ElementMissing { .. }
            | Error::Interaction { .. }
            | Error::FrameNotFound { .. }
            | Error::FrameSwitch { .. }
            | Error::NoMessagesAvailable { .. }
            | Error::ReadBody { .. }
            | Error::WaitFailed { .. } => true,

            // NOT retryable: config errors, closed session, exhausted retries
            Error::InvalidMailboxAddress { .. }
            | Error::InvalidConfig { .. }
            | Error::UnknownProvider { .. }
            | Error::SessionClosed
            | Error::SessionClose { .. }
            | Error::RetriesExhausted { .. } => false,
        }
    }

    /// Returns the error category for metrics/logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidMailboxAddress { .. }
            | Error::InvalidConfig { .. }
            | Error::UnknownProvider { .. } => ErrorCategory::Configuration,

            Error::SessionStart { .. } | Error::SessionClosed | Error::SessionClose { .. } => {
                ErrorCategory::Session
            }

            Error::ProviderUnreachable { .. }
            | Error::Interaction { .. }
            | Error::FrameSwitch { .. }
            | Error::ReadBody { .. }
            | Error::WaitFailed { .. } => ErrorCategory::Navigation,

            Error::ElementMissing { .. }
            | Error::FrameNotFound { .. }
            | Error::NoMessagesAvailable { .. } => ErrorCategory::NotFound,

            Error::RetriesExhausted { .. } => ErrorCategory::Terminal,
        }
    }
}

/// Error categories for metrics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration or validation errors.
    Configuration,
    /// Browser session lifecycle errors.
    Session,
    /// WebDriver navigation or interaction errors.
    Navigation,
    /// Expected content did not appear within the wait window.
    NotFound,
    /// Terminal retrieval failure.
    Terminal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Session => write!(f, "session"),
            ErrorCategory::Navigation => write!(f, "navigation"),
            ErrorCategory::NotFound => write!(f, "not_found"),
            ErrorCategory::Terminal => write!(f, "terminal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        // Configuration errors are not retryable
        let err = Error::InvalidMailboxAddress {
            address: "bad".into(),
        };
        assert!(!err.is_retryable());

        // Missing frames are retryable (the mail may simply not be there yet)
        let err = Error::FrameNotFound {
            frame: "iframe#ifmail".into(),
            waited: Duration::from_secs(20),
        };
        assert!(err.is_retryable());

        let err = Error::NoMessagesAvailable {
            waited: Duration::from_secs(20),
        };
        assert!(err.is_retryable());

        // Exhausted retries are terminal
        let err = Error::RetriesExhausted { attempts: 3 };
        assert!(!err.is_retryable());

        // A closed session will not heal on retry
        assert!(!Error::SessionClosed.is_retryable());
    }

    #[test]
    fn test_error_categories() {
        let err = Error::InvalidConfig {
            message: "mailbox is required".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);

        let err = Error::NoMessagesAvailable {
            waited: Duration::from_secs(20),
        };
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let err = Error::RetriesExhausted { attempts: 3 };
        assert_eq!(err.category(), ErrorCategory::Terminal);

        assert_eq!(Error::SessionClosed.category(), ErrorCategory::Session);
    }

    #[test]
    fn test_display_includes_context() {
        let err = Error::FrameNotFound {
            frame: "iframe#ifinbox".into(),
            waited: Duration::from_secs(20),
        };
        let msg = err.to_string();
        assert!(msg.contains("iframe#ifinbox"));

        let err = Error::RetriesExhausted { attempts: 5 };
        assert!(err.to_string().contains('5'));
    }
}
