pub mod citadel;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chromiumoxide::{Element, Page};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::color;
use crate::model::PaintRecord;

/// Known vendors: (CLI name, display name).
pub const VENDORS: &[(&str, &str)] = &[("citadel", "Citadel")];

/// A vendor catalog scraper. Implementations own the browser session they
/// opened and release it on every exit path of `parse`.
#[async_trait]
pub trait Scraper {
    /// Vendor name stamped on every record.
    fn vendor(&self) -> &'static str;

    /// Directory slug for the output path.
    fn slug(&self) -> &'static str;

    /// Drive the catalog page until all entries are loaded. The page stays
    /// open; the scraper still owns the underlying browser.
    async fn load_page(&self) -> Result<Page>;

    /// Load the page, extract all records, close the browser. The session
    /// is released whether extraction succeeds or fails.
    async fn parse(&mut self) -> Result<Vec<PaintRecord>>;
}

/// Look up a scraper by CLI name, launching its browser session.
pub async fn by_name(name: &str, headless: bool) -> Result<Box<dyn Scraper>> {
    match name {
        "citadel" => Ok(Box::new(citadel::CitadelScraper::launch(headless).await?)),
        other => bail!(
            "unknown vendor '{}' (known: {})",
            other,
            VENDORS
                .iter()
                .map(|(n, _)| *n)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// CSS selectors for the pieces of one product card.
pub(crate) struct CardSelectors {
    pub card: &'static str,
    pub name: &'static str,
    pub price: &'static str,
    pub tags: &'static str,
    pub image: &'static str,
}

/// Card fields as read from the DOM, before sentinels apply.
pub(crate) struct RawCard {
    pub name: Option<String>,
    pub price: Option<String>,
    pub tags: Vec<String>,
    pub image_src: Option<String>,
}

/// Apply sentinel defaults and resolve the image URL against the site
/// origin. Pure; the DOM walk feeds it.
pub(crate) fn assemble_record(manufacturer: &str, origin: &str, raw: RawCard) -> PaintRecord {
    let name = raw.name.unwrap_or_else(|| "Unknown".to_string());
    let price = raw.price.unwrap_or_else(|| "N/A".to_string());
    let image_url = raw.image_src.map(|src| {
        if src.starts_with("http") {
            src
        } else {
            format!("{}{}", origin, src)
        }
    });
    PaintRecord::new(manufacturer, &name, Some(price), raw.tags, image_url)
}

/// Enumerate product cards in DOM order and build one record per card.
/// Missing fields fall back to sentinels; a failed image fetch aborts the
/// whole run (no partial output file gets written).
pub(crate) async fn extract_records(
    page: &Page,
    selectors: &CardSelectors,
    manufacturer: &str,
    origin: &str,
    client: &reqwest::Client,
) -> Result<Vec<PaintRecord>> {
    let cards = match page.find_elements(selectors.card).await {
        Ok(cards) => cards,
        Err(e) => {
            warn!("no product cards found: {}", e);
            Vec::new()
        }
    };
    info!("Found {} product cards", cards.len());

    let mut raws = Vec::with_capacity(cards.len());
    for card in &cards {
        raws.push(read_card(card, selectors).await);
    }
    build_records(raws, manufacturer, origin, client).await
}

/// Turn raw card fields into finished records, sampling a color for each
/// resolved image URL. Empty input yields an empty list, never an error.
pub(crate) async fn build_records(
    raws: Vec<RawCard>,
    manufacturer: &str,
    origin: &str,
    client: &reqwest::Client,
) -> Result<Vec<PaintRecord>> {
    let pb = ProgressBar::new(raws.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut records = Vec::with_capacity(raws.len());
    for (i, raw) in raws.into_iter().enumerate() {
        let record = assemble_record(manufacturer, origin, raw);
        info!("Paint {} located: {}", i, record.name);

        let record = match record.image_url.clone() {
            Some(url) => match color::fetch_center_color(client, &url).await? {
                Some(rgb) => record.with_color(rgb),
                None => record,
            },
            None => record,
        };

        records.push(record);
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(records)
}

/// Read one card's fields. Every lookup is optional; absence is handled
/// by `assemble_record`, never by an error.
async fn read_card(card: &Element, selectors: &CardSelectors) -> RawCard {
    let name = text_of(card, selectors.name).await;
    let price = text_of(card, selectors.price).await;

    let tags = match card.find_elements(selectors.tags).await {
        Ok(els) => {
            let mut tags = Vec::with_capacity(els.len());
            for el in &els {
                if let Some(text) = inner_text(el).await {
                    tags.push(text);
                }
            }
            tags
        }
        Err(_) => Vec::new(),
    };

    let image_src = match card.find_element(selectors.image).await {
        Ok(img) => img.attribute("src").await.ok().flatten(),
        Err(_) => None,
    };

    RawCard {
        name,
        price,
        tags,
        image_src,
    }
}

async fn text_of(card: &Element, selector: &str) -> Option<String> {
    match card.find_element(selector).await {
        Ok(el) => inner_text(&el).await,
        Err(_) => None,
    }
}

async fn inner_text(el: &Element) -> Option<String> {
    el.inner_text()
        .await
        .ok()
        .flatten()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://www.warhammer.com";

    fn raw(name: Option<&str>, src: Option<&str>) -> RawCard {
        RawCard {
            name: name.map(String::from),
            price: Some("£2.75".to_string()),
            tags: vec![],
            image_src: src.map(String::from),
        }
    }

    #[test]
    fn missing_name_becomes_unknown() {
        let rec = assemble_record("Citadel", ORIGIN, raw(None, None));
        assert_eq!(rec.name, "Unknown");
    }

    #[test]
    fn missing_price_becomes_na() {
        let rec = assemble_record(
            "Citadel",
            ORIGIN,
            RawCard {
                name: Some("Wraithbone".into()),
                price: None,
                tags: vec![],
                image_src: None,
            },
        );
        assert_eq!(rec.price.as_deref(), Some("N/A"));
    }

    #[test]
    fn relative_src_resolves_against_origin() {
        let rec = assemble_record("Citadel", ORIGIN, raw(Some("Wraithbone"), Some("/img/w.svg")));
        assert_eq!(
            rec.image_url.as_deref(),
            Some("https://www.warhammer.com/img/w.svg")
        );
    }

    #[test]
    fn absolute_src_kept_as_is() {
        let url = "https://cdn.example.com/w.svg";
        let rec = assemble_record("Citadel", ORIGIN, raw(Some("Wraithbone"), Some(url)));
        assert_eq!(rec.image_url.as_deref(), Some(url));
    }

    #[test]
    fn no_image_leaves_url_and_color_unset() {
        let rec = assemble_record("Citadel", ORIGIN, raw(Some("Wraithbone"), None));
        assert!(rec.image_url.is_none());
        assert!(rec.rgb_color.is_none());
        assert!(rec.hex_color.is_none());
    }

    #[tokio::test]
    async fn empty_catalog_yields_empty_list() {
        let records = build_records(vec![], "Citadel", ORIGIN, &reqwest::Client::new())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn cards_without_images_need_no_network() {
        let raws = vec![raw(Some("Wraithbone"), None), raw(None, None)];
        let records = build_records(raws, "Citadel", ORIGIN, &reqwest::Client::new())
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Wraithbone");
        assert_eq!(records[1].name, "Unknown");
    }

    #[test]
    fn manufacturer_is_stamped() {
        let rec = assemble_record("Citadel", ORIGIN, raw(Some("Wraithbone"), None));
        assert_eq!(rec.manufacturer, "Citadel");
    }
}
