use crate::error::{Error, Result};
use crate::evaluate::SampleInputs;
use crate::karyotype::Gender;
use crate::reconcile::{DeclaredMetadata, SexChromosomes};
use crate::utils::resolve_relative;
use log::info;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SampleSheetRow {
    individual: String,
    platform: String,
    gender: String,
    sex_chromosomes: String,
    autosomal_summary: String,
    x_summary: String,
    y_summary: String,
    bam: Option<String>,
    destination: Option<String>,
}

/// Parse a tab-separated sample sheet, one individual per row.
/// Relative paths are taken relative to the sample sheet itself.
pub fn read_sample_sheet(path: &Path) -> Result<Vec<SampleInputs>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(crate::utils::reader(path)?);
    let mut seen = HashSet::new();
    let mut samples = vec![];
    for (i, result) in rdr.deserialize().enumerate() {
        let row: SampleSheetRow = result.map_err(|e| Error::sample_sheet(path, e.to_string()))?;
        if !seen.insert(row.individual.clone()) {
            return Err(Error::sample_sheet(
                path,
                format!("individual '{}' is listed more than once", row.individual),
            ));
        }
        let gender: Gender = row
            .gender
            .parse()
            .map_err(|e: String| Error::sample_sheet(path, format!("row {}: {e}", i + 1)))?;
        let link = match (row.bam, row.destination) {
            (Some(bam), Some(dest)) => Some((
                resolve_relative(path, &bam),
                resolve_relative(path, &dest),
            )),
            (None, None) => None,
            _ => {
                return Err(Error::sample_sheet(
                    path,
                    format!(
                        "individual '{}' needs both a bam and a destination, or neither",
                        row.individual
                    ),
                ))
            }
        };
        samples.push(SampleInputs {
            declared: DeclaredMetadata {
                gender,
                sex_chromosomes: SexChromosomes::from_field(&row.sex_chromosomes),
            },
            autosomal_summary: resolve_relative(path, &row.autosomal_summary),
            x_summary: resolve_relative(path, &row.x_summary),
            y_summary: resolve_relative(path, &row.y_summary),
            individual: row.individual,
            platform: row.platform,
            link,
        });
    }
    info!("Read {} individual(s) from {}", samples.len(), path.display());
    Ok(samples)
}
