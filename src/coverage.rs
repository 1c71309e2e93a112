use crate::decimal::Milli;
use crate::error::{Error, Result};
use log::debug;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locus {
    X,
    Y,
    Autosomal,
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Locus::X => write!(f, "X"),
            Locus::Y => write!(f, "Y"),
            Locus::Autosomal => write!(f, "autosomal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageSummary {
    pub locus: Locus,
    pub mean_depth: Milli,
}

/// Read the mean depth from a DepthOfCoverage sample_summary file (optionally gzipped)
/// The header names the columns, the first data row holds the sample, a `Total` row follows
pub fn read_coverage(path: &Path, locus: Locus) -> Result<CoverageSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(crate::utils::reader(path)?);

    let headers = rdr
        .headers()
        .map_err(|e| Error::coverage(path, e.to_string()))?
        .clone();
    let mean_col = headers
        .iter()
        .position(|h| h.trim() == "mean")
        .ok_or_else(|| Error::coverage(path, "no 'mean' column in header"))?;

    let record = match rdr.records().next() {
        Some(rec) => rec.map_err(|e| Error::coverage(path, e.to_string()))?,
        None => return Err(Error::coverage(path, "no sample row after the header")),
    };
    let field = record
        .get(mean_col)
        .ok_or_else(|| Error::coverage(path, "sample row has no 'mean' field"))?;
    let mean_depth: Milli = field
        .parse()
        .map_err(|e: crate::decimal::ParseMilliError| Error::coverage(path, e.to_string()))?;
    if mean_depth.is_negative() {
        return Err(Error::coverage(
            path,
            format!("negative mean depth {mean_depth}"),
        ));
    }
    debug!("{locus} mean depth {mean_depth} from {}", path.display());
    Ok(CoverageSummary { locus, mean_depth })
}
