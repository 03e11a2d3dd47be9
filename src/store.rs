use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::model::PaintRecord;

/// Root of the output tree; records land at `<DATA_ROOT>/<vendor>/paints.json`.
pub const DATA_ROOT: &str = "data";

/// Write the full record list as one pretty-printed JSON array (2-space
/// indent, UTF-8, non-ASCII left unescaped). Creates missing directories
/// and overwrites any existing file unconditionally.
pub fn save(records: &[PaintRecord], path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;

    info!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("paint_scraper_{}_{}", std::process::id(), name))
            .join("citadel")
            .join("paints.json")
    }

    fn cleanup(path: &Path) {
        let root = path.ancestors().nth(2).unwrap();
        let _ = fs::remove_dir_all(root);
    }

    fn sample_records() -> Vec<PaintRecord> {
        vec![
            PaintRecord::new(
                "Citadel",
                "Mephiston Red",
                Some("£2.75".to_string()),
                vec!["Base".to_string()],
                Some("https://www.warhammer.com/img/mephiston.svg".to_string()),
            )
            .with_color((155, 16, 16)),
            PaintRecord::new("Citadel", "Unknown", Some("N/A".to_string()), vec![], None),
        ]
    }

    #[test]
    fn round_trip_preserves_all_fields() {
        let path = temp_path("round_trip");
        let records = sample_records();

        save(&records, &path).unwrap();
        let json = fs::read_to_string(&path).unwrap();
        let parsed: Vec<PaintRecord> = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, records);
        cleanup(&path);
    }

    #[test]
    fn absent_color_round_trips_as_null() {
        let path = temp_path("nulls");
        save(&sample_records(), &path).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value[1]["rgb_color"].is_null());
        assert!(value[1]["hex_color"].is_null());
        assert_eq!(value[1]["price"], "N/A");
        cleanup(&path);
    }

    #[test]
    fn output_is_two_space_indented() {
        let path = temp_path("indent");
        save(&sample_records(), &path).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        assert!(json.starts_with("[\n  {"));
        assert!(json.contains("\n    \"manufacturer\": \"Citadel\""));
        cleanup(&path);
    }

    #[test]
    fn non_ascii_left_unescaped() {
        let path = temp_path("unicode");
        save(&sample_records(), &path).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains("£2.75"));
        assert!(!json.contains("\\u"));
        cleanup(&path);
    }

    #[test]
    fn overwrites_existing_file() {
        let path = temp_path("overwrite");
        save(&sample_records(), &path).unwrap();
        save(&[], &path).unwrap();

        let parsed: Vec<PaintRecord> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(parsed.is_empty());
        cleanup(&path);
    }
}
