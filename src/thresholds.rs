use crate::decimal::Milli;
use crate::error::{Error, Result};
use log::{debug, info};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Expected X/autosome and Y/autosome coverage ratio contributed by one copy
/// of the chromosome on a capture platform, with the tolerable deviation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformThresholds {
    pub ratio_mean_x: Milli,
    pub tolerance_x: Milli,
    pub ratio_mean_y: Milli,
    pub tolerance_y: Milli,
}

#[derive(Debug, Deserialize)]
struct ThresholdsRow {
    platform: String,
    ratio_mean_x: Milli,
    tolerance_x: Milli,
    ratio_mean_y: Milli,
    tolerance_y: Milli,
}

/// Calibration per capture platform, loaded once and shared read-only between evaluations
#[derive(Debug, Default)]
pub struct ThresholdsTable {
    platforms: HashMap<String, PlatformThresholds>,
}

impl ThresholdsTable {
    pub fn from_path(path: &Path) -> Result<ThresholdsTable> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(crate::utils::reader(path)?);
        let mut platforms = HashMap::new();
        for result in rdr.deserialize() {
            let row: ThresholdsRow = result.map_err(|e| Error::thresholds(path, e.to_string()))?;
            let thresholds = PlatformThresholds {
                ratio_mean_x: row.ratio_mean_x,
                tolerance_x: row.tolerance_x,
                ratio_mean_y: row.ratio_mean_y,
                tolerance_y: row.tolerance_y,
            };
            if thresholds.ratio_mean_x.is_zero() || thresholds.ratio_mean_y.is_zero() {
                return Err(Error::thresholds(
                    path,
                    format!("ratio means for platform '{}' must be non-zero", row.platform),
                ));
            }
            if platforms
                .insert(row.platform.clone(), thresholds)
                .is_some()
            {
                return Err(Error::thresholds(
                    path,
                    format!("platform '{}' is listed more than once", row.platform),
                ));
            }
            debug!("Loaded thresholds for {}: {:?}", row.platform, thresholds);
        }
        info!(
            "Loaded thresholds for {} capture platform(s) from {}",
            platforms.len(),
            path.display()
        );
        Ok(ThresholdsTable { platforms })
    }

    pub fn get(&self, platform: &str) -> Result<&PlatformThresholds> {
        self.platforms
            .get(platform)
            .ok_or_else(|| Error::MissingThresholds {
                platform: platform.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_table(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.tsv");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_thresholds() {
        let (_dir, path) = write_table(
            "# calibrated on 200 samples\n\
             platform\tratio_mean_x\ttolerance_x\tratio_mean_y\ttolerance_y\n\
             SureSelect_V5\t0.5\t0.15\t0.5\t0.15\n\
             Nextera_Exome\t0.482\t0.2\t0.31\t0.12\n",
        );
        let table = ThresholdsTable::from_path(&path).unwrap();
        assert_eq!(table.len(), 2);
        let t = table.get("Nextera_Exome").unwrap();
        assert_eq!(t.ratio_mean_x.to_string(), "0.482");
        assert_eq!(t.tolerance_y.to_string(), "0.120");
    }

    #[test]
    fn test_missing_platform() {
        let (_dir, path) = write_table(
            "platform\tratio_mean_x\ttolerance_x\tratio_mean_y\ttolerance_y\n\
             SureSelect_V5\t0.5\t0.15\t0.5\t0.15\n",
        );
        let table = ThresholdsTable::from_path(&path).unwrap();
        assert!(matches!(
            table.get("Agilent_V6"),
            Err(Error::MissingThresholds { .. })
        ));
    }

    #[test]
    fn test_duplicate_platform() {
        let (_dir, path) = write_table(
            "platform\tratio_mean_x\ttolerance_x\tratio_mean_y\ttolerance_y\n\
             SureSelect_V5\t0.5\t0.15\t0.5\t0.15\n\
             SureSelect_V5\t0.4\t0.15\t0.5\t0.15\n",
        );
        assert!(matches!(
            ThresholdsTable::from_path(&path),
            Err(Error::Thresholds { .. })
        ));
    }

    #[test]
    fn test_zero_ratio_mean_rejected() {
        let (_dir, path) = write_table(
            "platform\tratio_mean_x\ttolerance_x\tratio_mean_y\ttolerance_y\n\
             Broken\t0\t0.15\t0.5\t0.15\n",
        );
        assert!(matches!(
            ThresholdsTable::from_path(&path),
            Err(Error::Thresholds { .. })
        ));
    }

    #[test]
    fn test_unparsable_value() {
        let (_dir, path) = write_table(
            "platform\tratio_mean_x\ttolerance_x\tratio_mean_y\ttolerance_y\n\
             SureSelect_V5\thalf\t0.15\t0.5\t0.15\n",
        );
        assert!(matches!(
            ThresholdsTable::from_path(&path),
            Err(Error::Thresholds { .. })
        ));
    }
}
