use crate::decimal::Milli;
use crate::error::{Error, Result};
use crate::thresholds::PlatformThresholds;
use log::debug;

/// Continuous copy-number estimates for the sex chromosomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyNumberEstimate {
    pub xa_ratio: Milli,
    pub ya_ratio: Milli,
    pub x_count: Milli,
    pub y_count: Milli,
}

/// X and Y depth relative to autosomal depth, scaled by the expected ratio of a single copy.
/// Every division truncates to three decimals.
pub fn estimate_copy_numbers(
    x_coverage: Milli,
    y_coverage: Milli,
    autosomal_coverage: Milli,
    thresholds: &PlatformThresholds,
) -> Result<CopyNumberEstimate> {
    let xa_ratio = divide(x_coverage, autosomal_coverage, "X/A ratio", "autosomal coverage")?;
    let ya_ratio = divide(y_coverage, autosomal_coverage, "Y/A ratio", "autosomal coverage")?;
    let x_count = divide(xa_ratio, thresholds.ratio_mean_x, "X count", "ratio_mean_x")?;
    let y_count = divide(ya_ratio, thresholds.ratio_mean_y, "Y count", "ratio_mean_y")?;
    debug!("X/A ratio {xa_ratio}, Y/A ratio {ya_ratio}, X count {x_count}, Y count {y_count}");
    Ok(CopyNumberEstimate {
        xa_ratio,
        ya_ratio,
        x_count,
        y_count,
    })
}

fn divide(numerator: Milli, divisor: Milli, quotient: &str, divisor_name: &str) -> Result<Milli> {
    if divisor.is_zero() {
        return Err(Error::division_by_zero(divisor_name));
    }
    numerator.checked_div(divisor).ok_or_else(|| Error::Overflow {
        what: quotient.to_string(),
    })
}
