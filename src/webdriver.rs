//! WebDriver-backed [`MailboxDriver`] implementation.
//!
//! Wraps a `fantoccini` client with the error mapping and bounded waits the
//! retrieval pipeline expects. One [`WebDriverMailbox`] owns one browser
//! session from [`launch`](WebDriverMailbox::launch) to
//! [`shutdown`](MailboxDriver::shutdown).

use crate::driver::MailboxDriver;
use crate::error::{Error, Result};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;
use tracing::{debug, instrument};

/// How often presence waits re-query the DOM.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser session against the webmail provider, speaking the WebDriver
/// protocol to an endpoint such as chromedriver or geckodriver.
pub struct WebDriverMailbox {
    client: Client,
}

impl WebDriverMailbox {
    /// Starts a new browser session at the given WebDriver endpoint.
    ///
    /// The session is configured for unattended runs: notifications and popup
    /// blocking disabled, fixed window size, optionally headless.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionStart`] if the endpoint is unreachable or
    /// rejects the session request.
    #[instrument(
        name = "WebDriverMailbox::launch",
        skip_all,
        fields(webdriver_url = %webdriver_url, headless)
    )]
    pub async fn launch(webdriver_url: &str, headless: bool) -> Result<Self> {
        let mut args = vec![
            "--disable-notifications".to_string(),
            "--disable-popup-blocking".to_string(),
            "--window-size=1920,1080".to_string(),
        ];
        if headless {
            args.push("--headless=new".to_string());
        }

        let mut caps = serde_json::map::Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({ "args": args }),
        );

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .map_err(|source| Error::SessionStart {
                webdriver_url: webdriver_url.to_string(),
                source,
            })?;

        debug!("WebDriver session established");

        Ok(Self { client })
    }
}

#[async_trait]
impl MailboxDriver for WebDriverMailbox {
    async fn open(&mut self, url: &str) -> Result<()> {
        debug!(url = %url, "Navigating");

        self.client
            .goto(url)
            .await
            .map_err(|source| Error::ProviderUnreachable {
                url: url.to_string(),
                source,
            })
    }

    async fn fill(&mut self, selector: &str, text: &str, timeout: Duration) -> Result<()> {
        if !self.wait_for(selector, timeout).await? {
            return Err(Error::ElementMissing {
                selector: selector.to_string(),
                waited: timeout,
            });
        }

        let elem = self
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(|source| Error::Interaction {
                selector: selector.to_string(),
                source,
            })?;

        elem.clear().await.map_err(|source| Error::Interaction {
            selector: selector.to_string(),
            source,
        })?;

        elem.send_keys(text)
            .await
            .map_err(|source| Error::Interaction {
                selector: selector.to_string(),
                source,
            })
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        let elem = self
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(|source| Error::Interaction {
                selector: selector.to_string(),
                source,
            })?;

        elem.click().await.map_err(|source| Error::Interaction {
            selector: selector.to_string(),
            source,
        })
    }

    async fn click_if_present(&mut self, selector: &str) -> bool {
        match self.client.find(Locator::Css(selector)).await {
            Ok(elem) => match elem.click().await {
                Ok(()) => true,
                Err(e) => {
                    debug!(selector = %selector, error = %e, "Optional control click failed");
                    false
                }
            },
            Err(_) => false,
        }
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            match self.client.find(Locator::Css(selector)).await {
                Ok(_) => return Ok(true),
                Err(e) if e.is_no_such_element() => {}
                Err(source) => {
                    return Err(Error::WaitFailed {
                        selector: selector.to_string(),
                        source,
                    })
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn enter_frame(&mut self, selector: &str) -> Result<()> {
        debug!(frame = %selector, "Entering frame");

        let elem = self
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(|source| Error::FrameSwitch {
                frame: selector.to_string(),
                source,
            })?;

        elem.enter_frame()
            .await
            .map_err(|source| Error::FrameSwitch {
                frame: selector.to_string(),
                source,
            })?;

        Ok(())
    }

    async fn leave_frames(&mut self) -> Result<()> {
        debug!("Returning to top-level context");

        self.client
            .enter_frame(None)
            .await
            .map_err(|source| Error::FrameSwitch {
                frame: "top-level".to_string(),
                source,
            })?;

        Ok(())
    }

    async fn body_text(&mut self) -> Result<String> {
        let body = self
            .client
            .find(Locator::Css("body"))
            .await
            .map_err(|source| Error::ReadBody { source })?;

        body.text().await.map_err(|source| Error::ReadBody { source })
    }

    async fn page_source(&mut self) -> Result<String> {
        self.client
            .source()
            .await
            .map_err(|source| Error::ReadBody { source })
    }

    async fn shutdown(&mut self) -> Result<()> {
        debug!("Closing WebDriver session");

        self.client
            .clone()
            .close()
            .await
            .map_err(|source| Error::SessionClose { source })
    }
}

impl std::fmt::Debug for WebDriverMailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDriverMailbox").finish_non_exhaustive()
    }
}
