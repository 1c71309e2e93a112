use serde::{Deserialize, Deserializer};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

const SCALE: i64 = 1000;

/// Fixed-point decimal with three fractional digits, stored as thousandths.
/// Parsing and division truncate toward zero, they never round:
/// a ratio of 1.9996 is 1.999 and stays on the low side of a window boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Milli(i64);

impl Milli {
    pub const ZERO: Milli = Milli(0);
    pub const ONE: Milli = Milli(SCALE);

    pub fn from_int(value: i64) -> Milli {
        Milli(value * SCALE)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Division truncated to three decimals, None when dividing by zero
    /// or when the quotient does not fit
    pub fn checked_div(self, divisor: Milli) -> Option<Milli> {
        if divisor.0 == 0 {
            return None;
        }
        // i128 so that the scaled numerator of a deep sample cannot overflow
        let quotient = (self.0 as i128 * SCALE as i128) / divisor.0 as i128;
        i64::try_from(quotient).ok().map(Milli)
    }

    /// Integer part, e.g. the number of symbols to emit for an excess count.
    /// 0.999 gives 0, 2.5 gives 2.
    pub fn floor(&self) -> i64 {
        self.0.div_euclid(SCALE)
    }
}

impl Add for Milli {
    type Output = Milli;
    fn add(self, other: Milli) -> Milli {
        Milli(self.0 + other.0)
    }
}

impl Sub for Milli {
    type Output = Milli;
    fn sub(self, other: Milli) -> Milli {
        Milli(self.0 - other.0)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseMilliError(String);

impl fmt::Display for ParseMilliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}' is not a decimal number", self.0)
    }
}

impl std::error::Error for ParseMilliError {}

impl FromStr for Milli {
    type Err = ParseMilliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMilliError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(err());
        }
        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| err())?
        };
        // keep three fractional digits, drop the rest
        let mut frac: i64 = 0;
        for (i, c) in frac_part.chars().chain("000".chars()).take(3).enumerate() {
            frac += (c as i64 - '0' as i64) * 10_i64.pow(2 - i as u32);
        }
        let value = whole
            .checked_mul(SCALE)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(err)?;
        Ok(Milli(if negative { -value } else { value }))
    }
}

impl fmt::Display for Milli {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{sign}{}.{:03}",
            abs / SCALE as u64,
            abs % SCALE as u64
        )
    }
}

impl<'de> Deserialize<'de> for Milli {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
