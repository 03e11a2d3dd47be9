use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::ScrapeError;

const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const VIEWPORT: (u32, u32) = (1280, 800);

const NAV_TIMEOUT: Duration = Duration::from_secs(60);
// Empirical: lets client-side rendering populate the product grid.
const SETTLE_AFTER_NAV: Duration = Duration::from_secs(8);
const SETTLE_AFTER_CLICK: Duration = Duration::from_secs(5);
// Termination guard in case the control never reports disabled.
const MAX_LOAD_MORE_CLICKS: u32 = 100;

/// Launch a Chrome session. The returned task pumps CDP events and exits
/// when the browser connection closes; the caller owns the browser and
/// must close it exactly once.
pub async fn launch(headless: bool) -> Result<(Browser, JoinHandle<()>)> {
    let mut config = BrowserConfig::builder().window_size(VIEWPORT.0, VIEWPORT.1);
    if !headless {
        config = config.with_head();
    }
    let (browser, mut handler) = Browser::launch(config.build().map_err(|e| anyhow!(e))?)
        .await
        .context("failed to launch browser")?;

    let task = tokio::spawn(async move { while handler.next().await.is_some() {} });
    Ok((browser, task))
}

/// Open `url` in a fresh page with the fixed desktop identity. Waits for
/// the DOM to parse (not network idle; the site keeps background
/// connections open) plus a settle delay for client-side rendering.
pub async fn open_catalog(browser: &Browser, url: &str) -> Result<Page, ScrapeError> {
    let nav = |reason: String| ScrapeError::Navigation {
        url: url.to_string(),
        reason,
    };

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| nav(e.to_string()))?;

    let identity = SetUserAgentOverrideParams::builder()
        .user_agent(DESKTOP_USER_AGENT)
        .accept_language(ACCEPT_LANGUAGE)
        .build()
        .map_err(nav)?;
    page.set_user_agent(identity)
        .await
        .map_err(|e| nav(e.to_string()))?;

    match timeout(NAV_TIMEOUT, page.goto(url)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => return Err(nav(e.to_string())),
        Err(_) => return Err(nav(format!("timed out after {}s", NAV_TIMEOUT.as_secs()))),
    }

    debug!("navigated to {}, settling {}s", url, SETTLE_AFTER_NAV.as_secs());
    sleep(SETTLE_AFTER_NAV).await;
    Ok(page)
}

/// Best-effort filter interaction; absence or failure is never fatal.
pub async fn apply_filter(page: &Page, selector: Option<&str>) {
    let Some(selector) = selector else {
        debug!("no filter configured for this vendor");
        return;
    };
    match page.find_element(selector).await {
        Ok(control) => match control.click().await {
            Ok(_) => {
                info!("applied catalog filter {}", selector);
                sleep(SETTLE_AFTER_CLICK).await;
            }
            Err(e) => warn!("filter {} not clickable, continuing: {}", selector, e),
        },
        Err(_) => info!("filter {} absent, continuing without it", selector),
    }
}

/// Outcome of one interaction with the "load more" control.
pub enum ControlState {
    Clicked,
    Missing,
    Disabled,
}

/// One incremental-loading control. The DOM-backed implementation lives
/// below; tests substitute their own.
#[async_trait]
pub trait LoadMoreControl {
    async fn advance(&mut self) -> ControlState;
}

/// Click the control until it is missing or disabled. Bounded, so the
/// loop terminates even against a control that never disables itself.
/// Returns the number of clicks that landed.
pub async fn exhaust_load_more<C>(control: &mut C) -> u32
where
    C: LoadMoreControl + Send,
{
    let mut clicks = 0u32;
    while clicks < MAX_LOAD_MORE_CLICKS {
        match control.advance().await {
            ControlState::Clicked => clicks += 1,
            ControlState::Missing => {
                debug!("load-more control gone after {} clicks", clicks);
                return clicks;
            }
            ControlState::Disabled => {
                debug!("load-more control disabled after {} clicks", clicks);
                return clicks;
            }
        }
    }
    warn!("load-more still active after {} clicks, stopping anyway", clicks);
    clicks
}

/// "Load more" button on a live page. Any error while locating, probing,
/// or clicking stops pagination gracefully; partial result sets are fine.
pub struct PageLoadMore<'a> {
    page: &'a Page,
    selector: &'static str,
}

impl<'a> PageLoadMore<'a> {
    pub fn new(page: &'a Page, selector: &'static str) -> Self {
        Self { page, selector }
    }
}

#[async_trait]
impl LoadMoreControl for PageLoadMore<'_> {
    async fn advance(&mut self) -> ControlState {
        let button = match self.page.find_element(self.selector).await {
            Ok(el) => el,
            Err(_) => return ControlState::Missing,
        };

        match button.attribute("disabled").await {
            Ok(Some(_)) => return ControlState::Disabled,
            Ok(None) => {}
            Err(e) => {
                warn!("stopped loading more paints: {}", e);
                return ControlState::Missing;
            }
        }

        if let Err(e) = button.click().await {
            warn!("stopped loading more paints: {}", e);
            return ControlState::Missing;
        }
        sleep(SETTLE_AFTER_CLICK).await;
        ControlState::Clicked
    }
}
