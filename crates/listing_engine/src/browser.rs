//! Browser-driven transport.
//!
//! The driver renders each results page in a real browser. Pages after the
//! first are reached the way a person would: by clicking the "next page"
//! control, dismissing the job-alert popover once if it is in the way.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use crawl_logging::{crawl_debug, crawl_info, crawl_warn};
use futures_util::StreamExt;
use tokio::task::JoinHandle;

use crate::fetch::{Transport, DESKTOP_USER_AGENT};
use crate::{FailureKind, FetchError, PageContent};

/// Driver failures. `ElementNotFound` and `ElementNotInteractable` are
/// expected conditions the transport reacts to; the rest are fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    #[error("no element matches {0}")]
    ElementNotFound(String),
    #[error("element {0} cannot be interacted with")]
    ElementNotInteractable(String),
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("browser protocol error: {0}")]
    Protocol(String),
}

/// The operations the browser transport needs from a page-driving backend.
#[async_trait::async_trait]
pub trait BrowserDriver: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    async fn current_url(&mut self) -> Result<String, DriverError>;

    /// Serialized live DOM of the current page.
    async fn page_source(&mut self) -> Result<String, DriverError>;

    async fn click(&mut self, selector: &str) -> Result<(), DriverError>;

    async fn wait_for_navigation(&mut self) -> Result<(), DriverError>;

    /// Terminates the browser process.
    async fn quit(&mut self) -> Result<(), DriverError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserNavigation {
    /// Load every page by URL.
    Goto,
    /// Load the first page by URL, then click the "next page" control.
    #[default]
    ClickNext,
}

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub navigation: BrowserNavigation,
    pub next_selector: String,
    pub dismiss_selector: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            request_timeout: Duration::from_secs(30),
            user_agent: DESKTOP_USER_AGENT.to_string(),
            navigation: BrowserNavigation::ClickNext,
            next_selector: r#"a[aria-label="Next"]"#.to_string(),
            dismiss_selector: "#popover-x".to_string(),
        }
    }
}

pub struct BrowserTransport<D> {
    driver: D,
    navigation: BrowserNavigation,
    next_selector: String,
    dismiss_selector: String,
    on_results_page: bool,
    closed: bool,
}

impl<D: BrowserDriver> BrowserTransport<D> {
    pub fn new(driver: D, settings: &BrowserSettings) -> Self {
        Self {
            driver,
            navigation: settings.navigation,
            next_selector: settings.next_selector.clone(),
            dismiss_selector: settings.dismiss_selector.clone(),
            on_results_page: false,
            closed: false,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Clicks the next-page control. Returns `Ok(false)` when there is no such
    /// control on the current page.
    ///
    /// A click that leaves the browser on the same URL counts as obstructed,
    /// the same as one the driver reports as not interactable. An obstructed
    /// click is retried once after the dismiss control is clicked.
    async fn click_next(&mut self) -> Result<bool, FetchError> {
        let before = self.driver.current_url().await.map_err(driver_error)?;
        match self.try_click_next(&before).await? {
            ClickOutcome::Moved => return Ok(true),
            ClickOutcome::Missing => return Ok(false),
            ClickOutcome::Obstructed => {}
        }

        crawl_info!("next-page control obstructed, dismissing {}", self.dismiss_selector);
        match self.driver.click(&self.dismiss_selector).await {
            Ok(()) | Err(DriverError::ElementNotFound(_)) => {}
            Err(DriverError::ElementNotInteractable(msg)) => {
                return Err(FetchError::new(FailureKind::Interaction, msg));
            }
            Err(err) => return Err(driver_error(err)),
        }

        match self.try_click_next(&before).await? {
            ClickOutcome::Moved => Ok(true),
            ClickOutcome::Missing => Err(FetchError::new(
                FailureKind::Interaction,
                format!("{} disappeared after dismissing the popover", self.next_selector),
            )),
            ClickOutcome::Obstructed => Err(FetchError::new(
                FailureKind::Interaction,
                format!("{} still obstructed on {}", self.next_selector, before),
            )),
        }
    }

    async fn try_click_next(&mut self, before: &str) -> Result<ClickOutcome, FetchError> {
        match self.driver.click(&self.next_selector).await {
            Ok(()) => {}
            Err(DriverError::ElementNotFound(_)) => return Ok(ClickOutcome::Missing),
            Err(DriverError::ElementNotInteractable(_)) => return Ok(ClickOutcome::Obstructed),
            Err(err) => return Err(driver_error(err)),
        }
        self.driver.wait_for_navigation().await.map_err(driver_error)?;
        let after = self.driver.current_url().await.map_err(driver_error)?;
        if after == before {
            crawl_debug!("click on {} did not leave {}", self.next_selector, before);
            return Ok(ClickOutcome::Obstructed);
        }
        Ok(ClickOutcome::Moved)
    }
}

enum ClickOutcome {
    Moved,
    Missing,
    Obstructed,
}

#[async_trait::async_trait]
impl<D: BrowserDriver> Transport for BrowserTransport<D> {
    async fn fetch(&mut self, url: &str) -> Result<PageContent, FetchError> {
        if self.closed {
            return Err(FetchError::new(FailureKind::Browser, "transport closed"));
        }

        let clicked = match self.navigation {
            BrowserNavigation::ClickNext if self.on_results_page => self.click_next().await?,
            _ => false,
        };
        if !clicked {
            crawl_debug!("navigating to {}", url);
            self.driver.navigate(url).await.map_err(driver_error)?;
        }
        self.on_results_page = true;

        let final_url = self.driver.current_url().await.map_err(driver_error)?;
        let html = self.driver.page_source().await.map_err(driver_error)?;
        Ok(PageContent::new(final_url, html))
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.driver.quit().await.map_err(driver_error)
    }
}

fn driver_error(err: DriverError) -> FetchError {
    FetchError::new(FailureKind::Browser, err.to_string())
}

fn interaction_error(err: DriverError) -> FetchError {
    FetchError::new(FailureKind::Interaction, err.to_string())
}

/// [`BrowserDriver`] over a Chromium instance controlled with chromiumoxide.
pub struct ChromiumDriver {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
}

impl ChromiumDriver {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, DriverError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(settings.request_timeout)
            .window_size(1920, 1080)
            .arg(format!("--user-agent={}", settings.user_agent))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &settings.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(DriverError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;
        // The handler must be polled for the browser connection to make progress.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    crawl_warn!("browser handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(DriverError::Launch(e.to_string()));
            }
        };

        Ok(Self {
            browser,
            handler,
            page,
        })
    }
}

#[async_trait::async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.page.goto(url).await.map_err(protocol_error)?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        Ok(self
            .page
            .url()
            .await
            .map_err(protocol_error)?
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn page_source(&mut self) -> Result<String, DriverError> {
        self.page.content().await.map_err(protocol_error)
    }

    async fn click(&mut self, selector: &str) -> Result<(), DriverError> {
        // find_elements answers an empty list for no match; its errors are transport failures.
        let element = self
            .page
            .find_elements(selector)
            .await
            .map_err(protocol_error)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::ElementNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|err| click_error(selector, err))?;
        Ok(())
    }

    async fn wait_for_navigation(&mut self) -> Result<(), DriverError> {
        self.page
            .wait_for_navigation()
            .await
            .map_err(protocol_error)?;
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), DriverError> {
        let closed = self.browser.close().await.map_err(protocol_error);
        if closed.is_ok() {
            if let Err(err) = self.browser.wait().await {
                crawl_warn!("failed to reap browser process: {}", err);
            }
        }
        self.handler.abort();
        closed.map(|_| ())
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        // Browser's own Drop kills the child process if quit was never reached.
        self.handler.abort();
    }
}

fn protocol_error(err: CdpError) -> DriverError {
    DriverError::Protocol(err.to_string())
}

/// Connection-level failures stay protocol errors. Any other click failure
/// means the element could not be clicked.
fn click_error(selector: &str, err: CdpError) -> DriverError {
    match err {
        CdpError::Ws(_)
        | CdpError::Io(_)
        | CdpError::NoResponse
        | CdpError::ChannelSendError(_)
        | CdpError::Timeout => protocol_error(err),
        _ => DriverError::ElementNotInteractable(format!("{selector}: {err}")),
    }
}
