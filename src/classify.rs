use crate::decimal::Milli;
use log::{debug, warn};

pub const MAX_CHROMOSOMES: u8 = 4;
/// Upper bound on the symbols emitted after an excess marker
pub const MAX_EXCESS_COUNT: u32 = 16;

/// Discrete call for one sex chromosome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisCall {
    /// copies in 0..=4, 0 when no integer fell inside the tolerance window
    pub chromes: u8,
    /// signal above the single-copy floor that matched no window
    pub excess: bool,
    /// integer part of the count, only meaningful with `excess`
    pub excess_count: u32,
}

/// Map a continuous copy-number estimate to a discrete chromosome count.
/// Every integer i in 1..=4 with count - tolerance < i < count + tolerance is a candidate;
/// the scan runs to the end so the highest candidate wins when the window spans two integers.
pub fn classify_axis(count: Milli, tolerance: Milli) -> AxisCall {
    let min = count - tolerance;
    let max = count + tolerance;
    let mut chromes = 0;
    for i in 1..=MAX_CHROMOSOMES {
        let candidate = Milli::from_int(i as i64);
        if min < candidate && candidate < max {
            chromes = i;
        }
    }
    if chromes > 0 {
        return AxisCall {
            chromes,
            ..Default::default()
        };
    }
    if count > Milli::ONE - tolerance {
        debug!("Count {count} is outside every window (+/- {tolerance}), flagging excess");
        let excess_count = match u32::try_from(count.floor()) {
            Ok(n) if n <= MAX_EXCESS_COUNT => n,
            _ => {
                warn!("Count {count} is implausibly high, rendering {MAX_EXCESS_COUNT} copies");
                MAX_EXCESS_COUNT
            }
        };
        AxisCall {
            chromes: 0,
            excess: true,
            excess_count,
        }
    } else {
        AxisCall::default()
    }
}
