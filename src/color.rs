use reqwest::header;
use resvg::{tiny_skia, usvg};
use tracing::debug;

use crate::error::ScrapeError;

// Sites reject requests carrying reqwest's default identifier.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36";

/// Fetch a product image and, when it is an SVG swatch, return its
/// rasterized center-pixel color. Non-SVG media is never sampled, so the
/// caller leaves both color fields unset for it.
///
/// A non-2xx status is fatal: it aborts the whole extraction run rather
/// than degrading one record.
pub async fn fetch_center_color(
    client: &reqwest::Client,
    url: &str,
) -> Result<Option<(u8, u8, u8)>, ScrapeError> {
    let response = client
        .get(url)
        .header(header::USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .await
        .map_err(|e| ScrapeError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Fetch {
            url: url.to_string(),
            reason: format!("HTTP {}", status.as_u16()),
        });
    }

    let is_svg = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("image/svg+xml"))
        .unwrap_or(false);
    if !is_svg {
        debug!("skipping color sampling, non-SVG content at {}", url);
        return Ok(None);
    }

    let body = response.bytes().await.map_err(|e| ScrapeError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    sample_center(&body)
        .map(Some)
        .map_err(|reason| ScrapeError::Decode {
            url: url.to_string(),
            reason,
        })
}

/// Rasterize an SVG at its intrinsic size and sample the pixel at
/// `(width / 2, height / 2)`, integer division.
fn sample_center(svg: &[u8]) -> Result<(u8, u8, u8), String> {
    let tree =
        usvg::Tree::from_data(svg, &usvg::Options::default()).map_err(|e| e.to_string())?;

    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| "zero-sized SVG".to_string())?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let (cx, cy) = (size.width() / 2, size.height() / 2);
    let pixel = pixmap
        .pixel(cx, cy)
        .ok_or_else(|| format!("center pixel ({}, {}) out of bounds", cx, cy))?
        .demultiply();

    Ok((pixel.red(), pixel.green(), pixel.blue()))
}
