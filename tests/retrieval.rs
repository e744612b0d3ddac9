//! Retrieval-pipeline tests against a scripted driver.
//!
//! These tests exercise the retry loop, the frame-navigation invariant, and
//! session lifecycle without a browser: a scripted [`MailboxDriver`] plays
//! back one outcome per fetch attempt and records every operation it sees.
//! Timer-dependent assertions run under paused tokio time.

use async_trait::async_trait;
use fantoccini::error::CmdError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use webmail_otp::{
    Error, MailboxDriver, MailboxSession, OtpClient, ProviderProfile, RetrievalState,
    TimeoutConfig, WebmailConfig,
};

/// Outcome of one scripted fetch attempt.
#[derive(Clone)]
enum FetchScript {
    /// The landing page navigation fails.
    Unreachable,
    /// Inbox loads but no message row ever appears.
    NoMessages,
    /// A message is present with the given renderings.
    Message {
        text: &'static str,
        html: &'static str,
    },
}

/// Driver double that plays back one [`FetchScript`] per `open` call and
/// records every operation.
struct ScriptedDriver {
    script: VecDeque<FetchScript>,
    current: Option<FetchScript>,
    message_row: String,
    ops: Arc<Mutex<Vec<String>>>,
    shutdowns: Arc<Mutex<u32>>,
}

impl ScriptedDriver {
    fn new(script: impl IntoIterator<Item = FetchScript>) -> Self {
        Self {
            script: script.into_iter().collect(),
            current: None,
            message_row: ProviderProfile::yopmail().message_row,
            ops: Arc::new(Mutex::new(Vec::new())),
            shutdowns: Arc::new(Mutex::new(0)),
        }
    }

    fn ops_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.ops)
    }

    fn shutdowns_handle(&self) -> Arc<Mutex<u32>> {
        Arc::clone(&self.shutdowns)
    }

    fn record(&self, op: impl Into<String>) {
        self.ops.lock().unwrap().push(op.into());
    }
}

#[async_trait]
impl MailboxDriver for ScriptedDriver {
    async fn open(&mut self, url: &str) -> webmail_otp::Result<()> {
        self.record("open");
        let step = self.script.pop_front().expect("fetch script exhausted");
        let unreachable = matches!(step, FetchScript::Unreachable);
        self.current = Some(step);

        if unreachable {
            return Err(Error::ProviderUnreachable {
                url: url.to_string(),
                source: CmdError::NotW3C(serde_json::Value::String("scripted outage".into())),
            });
        }
        Ok(())
    }

    async fn fill(
        &mut self,
        selector: &str,
        _text: &str,
        _timeout: Duration,
    ) -> webmail_otp::Result<()> {
        self.record(format!("fill:{selector}"));
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> webmail_otp::Result<()> {
        self.record(format!("click:{selector}"));
        Ok(())
    }

    async fn click_if_present(&mut self, selector: &str) -> bool {
        self.record(format!("click_if_present:{selector}"));
        // No refresh control in the scripted provider
        false
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> webmail_otp::Result<bool> {
        self.record(format!("wait_for:{selector}"));

        if selector == self.message_row {
            return Ok(!matches!(self.current, Some(FetchScript::NoMessages)));
        }
        Ok(true)
    }

    async fn enter_frame(&mut self, selector: &str) -> webmail_otp::Result<()> {
        self.record(format!("enter_frame:{selector}"));
        Ok(())
    }

    async fn leave_frames(&mut self) -> webmail_otp::Result<()> {
        self.record("leave_frames");
        Ok(())
    }

    async fn body_text(&mut self) -> webmail_otp::Result<String> {
        match &self.current {
            Some(FetchScript::Message { text, .. }) => Ok((*text).to_string()),
            _ => panic!("body_text read outside a scripted message"),
        }
    }

    async fn page_source(&mut self) -> webmail_otp::Result<String> {
        match &self.current {
            Some(FetchScript::Message { html, .. }) => Ok((*html).to_string()),
            _ => panic!("page_source read outside a scripted message"),
        }
    }

    async fn shutdown(&mut self) -> webmail_otp::Result<()> {
        self.record("shutdown");
        *self.shutdowns.lock().unwrap() += 1;
        Ok(())
    }
}

fn test_config(max_attempts: u32) -> WebmailConfig {
    WebmailConfig::builder()
        .mailbox("device@yopmail.com")
        .max_attempts(max_attempts)
        .retry_delay(Duration::from_secs(5))
        .build()
        .expect("valid config")
}

fn client_with_script(
    script: impl IntoIterator<Item = FetchScript>,
    max_attempts: u32,
) -> (OtpClient, Arc<Mutex<Vec<String>>>, Arc<Mutex<u32>>) {
    let driver = ScriptedDriver::new(script);
    let ops = driver.ops_handle();
    let shutdowns = driver.shutdowns_handle();

    let session = MailboxSession::with_driver(
        Box::new(driver),
        ProviderProfile::yopmail(),
        TimeoutConfig::default(),
    );
    let client = OtpClient::with_session(session, test_config(max_attempts));

    (client, ops, shutdowns)
}

fn count_ops(ops: &Arc<Mutex<Vec<String>>>, name: &str) -> usize {
    ops.lock().unwrap().iter().filter(|op| *op == name).count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Retry Loop Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_success_on_third_attempt() {
    let (mut client, ops, _) = client_with_script(
        [
            FetchScript::NoMessages,
            FetchScript::NoMessages,
            FetchScript::Message {
                text: "Your code: 482913 expires in 5 minutes",
                html: "",
            },
        ],
        3,
    );

    let start = tokio::time::Instant::now();
    let code = client.retrieve_otp().await.expect("code on third attempt");

    assert_eq!(code.as_str(), "482913");
    assert_eq!(client.state(), RetrievalState::Success);

    // Exactly 3 fetches and 2 inter-attempt delays
    assert_eq!(count_ops(&ops, "open"), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_after_max_attempts() {
    let (mut client, ops, _) = client_with_script(
        [
            FetchScript::NoMessages,
            FetchScript::NoMessages,
            FetchScript::NoMessages,
        ],
        3,
    );

    let start = tokio::time::Instant::now();
    let err = client.retrieve_otp().await.unwrap_err();

    assert!(matches!(err, Error::RetriesExhausted { attempts: 3 }));
    assert_eq!(client.state(), RetrievalState::Exhausted);

    // Exactly max_attempts fetches and max_attempts - 1 delays
    assert_eq!(count_ops(&ops, "open"), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_transient_fetch_failure_is_retried() {
    let (mut client, ops, _) = client_with_script(
        [
            FetchScript::Unreachable,
            FetchScript::Message {
                text: "otp 715263",
                html: "",
            },
        ],
        2,
    );

    let code = client.retrieve_otp().await.expect("recovered on retry");

    assert_eq!(code.as_str(), "715263");
    assert_eq!(count_ops(&ops, "open"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_first_attempt_success_skips_delay() {
    let (mut client, ops, _) = client_with_script(
        [FetchScript::Message {
            text: "code: 123456",
            html: "",
        }],
        3,
    );

    let start = tokio::time::Instant::now();
    let code = client.retrieve_otp().await.expect("immediate code");

    assert_eq!(code.as_str(), "123456");
    assert_eq!(count_ops(&ops, "open"), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_emphasized_html_code_is_found() {
    // No six-digit run in the rendered text; the HTML strategy supplies it
    let (mut client, _, _) = client_with_script(
        [FetchScript::Message {
            text: "Use the highlighted code below.",
            html: "<p>Use <strong>765432</strong> to sign in</p>",
        }],
        1,
    );

    let code = client.retrieve_otp().await.expect("code from HTML");
    assert_eq!(code.as_str(), "765432");
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame Navigation Invariant
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_frame_entries_always_reset_to_top() {
    let (mut client, ops, _) = client_with_script(
        [FetchScript::Message {
            text: "code: 998811",
            html: "",
        }],
        1,
    );

    client.retrieve_otp().await.expect("code");

    // Project the log onto frame transitions only
    let transitions: Vec<String> = ops
        .lock()
        .unwrap()
        .iter()
        .filter(|op| *op == "leave_frames" || op.starts_with("enter_frame:"))
        .cloned()
        .collect();

    assert_eq!(
        transitions,
        vec![
            "leave_frames",
            "enter_frame:iframe#ifinbox",
            "leave_frames",
            "enter_frame:iframe#ifmail",
        ],
        "every frame entry must be preceded by a top-level reset"
    );
}

#[tokio::test(start_paused = true)]
async fn test_lookup_precedes_frame_navigation() {
    let (mut client, ops, _) = client_with_script(
        [FetchScript::Message {
            text: "code: 998811",
            html: "",
        }],
        1,
    );

    client.retrieve_otp().await.expect("code");

    let ops = ops.lock().unwrap();
    let fill_pos = ops
        .iter()
        .position(|op| op.starts_with("fill:"))
        .expect("lookup field filled");
    let frame_pos = ops
        .iter()
        .position(|op| op.starts_with("enter_frame:"))
        .expect("frame entered");
    assert!(fill_pos < frame_pos);
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Lifecycle Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_close_is_idempotent() {
    let (mut client, _, shutdowns) = client_with_script([], 1);

    client.close().await.expect("first close");
    client.close().await.expect("second close is a no-op");

    assert_eq!(*shutdowns.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_close_after_failed_fetch() {
    let (mut client, _, shutdowns) = client_with_script([FetchScript::NoMessages], 1);

    let err = client.retrieve_otp().await.unwrap_err();
    assert!(matches!(err, Error::RetriesExhausted { .. }));

    client.close().await.expect("close after failure");
    assert_eq!(*shutdowns.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retrieve_after_close_fails_fast() {
    let (mut client, ops, _) = client_with_script([], 1);

    client.close().await.expect("close");

    let err = client.retrieve_otp().await.unwrap_err();
    assert!(matches!(err, Error::SessionClosed));

    // No fetch was attempted on the closed session
    assert_eq!(count_ops(&ops, "open"), 0);
}
