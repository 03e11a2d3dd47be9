use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::Page;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::browser::{self, PageLoadMore};
use crate::model::PaintRecord;
use crate::scraper::{extract_records, CardSelectors, Scraper};

const CATALOG_URL: &str = "https://www.warhammer.com/en-WW/paint";
const ORIGIN: &str = "https://www.warhammer.com";

const LOAD_MORE_BUTTON: &str = r#"[data-testid="load-more-widget"] button"#;

const SELECTORS: CardSelectors = CardSelectors {
    card: r#"[data-test="product-card"]"#,
    name: r#"[data-testid="product-card-name"]"#,
    price: r#"[data-testid="product-card-current-price"]"#,
    tags: r#"[data-testid="product-card-tags"] li"#,
    image: "img",
};

/// Scraper for the Citadel range on warhammer.com. Owns the browser it
/// launched; `parse` releases it on success and failure alike.
pub struct CitadelScraper {
    browser: Option<Browser>,
    handler_task: JoinHandle<()>,
    client: reqwest::Client,
}

impl CitadelScraper {
    pub async fn launch(headless: bool) -> Result<Self> {
        let (browser, handler_task) = browser::launch(headless).await?;
        Ok(Self {
            browser: Some(browser),
            handler_task,
            client: reqwest::Client::new(),
        })
    }

    /// Close the browser session. Safe to call once; later calls no-op.
    async fn shutdown(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("failed to close browser cleanly: {}", e);
            }
            let _ = browser.wait().await;
        }
        self.handler_task.abort();
    }
}

#[async_trait]
impl Scraper for CitadelScraper {
    fn vendor(&self) -> &'static str {
        "Citadel"
    }

    fn slug(&self) -> &'static str {
        "citadel"
    }

    async fn load_page(&self) -> Result<Page> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| anyhow!("browser session already closed"))?;

        let page = browser::open_catalog(browser, CATALOG_URL).await?;
        browser::apply_filter(&page, None).await;

        let mut control = PageLoadMore::new(&page, LOAD_MORE_BUTTON);
        let clicks = browser::exhaust_load_more(&mut control).await;
        info!("catalog fully loaded after {} load-more clicks", clicks);

        Ok(page)
    }

    async fn parse(&mut self) -> Result<Vec<PaintRecord>> {
        let result = async {
            let page = self.load_page().await?;
            extract_records(&page, &SELECTORS, self.vendor(), ORIGIN, &self.client).await
        }
        .await;

        self.shutdown().await;
        result
    }
}
