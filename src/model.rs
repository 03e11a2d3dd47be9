use serde::{Deserialize, Serialize};

/// One catalog entry. Constructed once during extraction, immutable after,
/// serialized wholesale to the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintRecord {
    pub manufacturer: String,
    pub name: String,
    pub price: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub rgb_color: Option<(u8, u8, u8)>,
    pub hex_color: Option<String>,
}

impl PaintRecord {
    /// Build a record without color fields. `name` is trimmed; an empty
    /// name collapses to the `"Unknown"` sentinel.
    pub fn new(
        manufacturer: &str,
        name: &str,
        price: Option<String>,
        tags: Vec<String>,
        image_url: Option<String>,
    ) -> Self {
        let name = name.trim();
        let name = if name.is_empty() { "Unknown" } else { name };
        Self {
            manufacturer: manufacturer.to_string(),
            name: name.to_string(),
            price,
            tags,
            image_url,
            rgb_color: None,
            hex_color: None,
        }
    }

    /// Attach a sampled color. Sets both fields from the one triple so
    /// `rgb_color` and `hex_color` can never disagree.
    pub fn with_color(mut self, rgb: (u8, u8, u8)) -> Self {
        self.hex_color = Some(hex_from_rgb(rgb));
        self.rgb_color = Some(rgb);
        self
    }
}

/// Lowercase `#rrggbb`, each channel zero-padded to two digits.
pub fn hex_from_rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}
