use crate::classify::{classify_axis, AxisCall};
use crate::decimal::Milli;
use crate::ratio::CopyNumberEstimate;
use crate::thresholds::PlatformThresholds;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Unknown => write!(f, "Unknown"),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    /// An empty field or any of the usual "not known" spellings is Unknown
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "" | "unknown" | "unspecified" | "na" | "." => Ok(Gender::Unknown),
            other => Err(format!("'{other}' is not a valid gender")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KaryotypeEstimate {
    pub x: AxisCall,
    pub y: AxisCall,
    pub rendered: String,
    pub calculated_gender: Gender,
}

impl KaryotypeEstimate {
    pub fn has_excess_marker(&self) -> bool {
        self.rendered.contains('E')
    }
}

impl fmt::Display for KaryotypeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.rendered, self.calculated_gender)
    }
}

/// Classify both axes and derive the karyotype string and gender
pub fn infer_karyotype(
    estimate: &CopyNumberEstimate,
    thresholds: &PlatformThresholds,
) -> KaryotypeEstimate {
    let x = classify_axis(estimate.x_count, thresholds.tolerance_x);
    let y = classify_axis(estimate.y_count, thresholds.tolerance_y);
    KaryotypeEstimate {
        x,
        y,
        rendered: render(&x, &y),
        calculated_gender: calculated_gender(&x, &y, estimate.y_count, thresholds.tolerance_y),
    }
}

/// X symbols first, then Y symbols, `E` marks an excess call and `0` an absent chromosome.
/// An absent Y is only written as `0` next to a single X; with zero or several X and no Y
/// signal nothing is appended for Y.
pub fn render(x: &AxisCall, y: &AxisCall) -> String {
    let mut rendered = String::new();
    if x.chromes > 0 {
        rendered.push_str(&"X".repeat(x.chromes as usize));
    } else if x.excess {
        rendered.push('E');
        rendered.push_str(&"X".repeat(x.excess_count as usize));
    } else {
        rendered.push('0');
    }

    if y.chromes > 0 {
        rendered.push_str(&"Y".repeat(y.chromes as usize));
    } else if y.excess {
        rendered.push('E');
        rendered.push_str(&"Y".repeat(y.excess_count as usize));
    } else if x.chromes == 1 {
        rendered.push('0');
    }
    rendered
}

/// No X call means Unknown. Female needs both no Y call and a Y count under the single-copy floor,
/// so any detected or excess Y signal is Male.
pub fn calculated_gender(x: &AxisCall, y: &AxisCall, y_count: Milli, tolerance_y: Milli) -> Gender {
    if x.chromes == 0 {
        Gender::Unknown
    } else if y.chromes == 0 && y_count < Milli::ONE - tolerance_y {
        Gender::Female
    } else {
        Gender::Male
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratio::estimate_copy_numbers;

    fn m(s: &str) -> Milli {
        s.parse().unwrap()
    }

    fn thresholds() -> PlatformThresholds {
        PlatformThresholds {
            ratio_mean_x: m("0.5"),
            tolerance_x: m("0.15"),
            ratio_mean_y: m("0.5"),
            tolerance_y: m("0.15"),
        }
    }

    fn karyotype(x: &str, y: &str, a: &str) -> KaryotypeEstimate {
        let t = thresholds();
        let est = estimate_copy_numbers(m(x), m(y), m(a), &t).unwrap();
        infer_karyotype(&est, &t)
    }

    fn call(chromes: u8, excess: bool, excess_count: u32) -> AxisCall {
        AxisCall {
            chromes,
            excess,
            excess_count,
        }
    }

    #[test]
    fn test_female_sample() {
        let k = karyotype("100", "0.5", "100");
        assert_eq!(k.x.chromes, 2);
        assert_eq!(k.y.chromes, 0);
        assert_eq!(k.rendered, "XX");
        assert_eq!(k.calculated_gender, Gender::Female);
    }

    #[test]
    fn test_male_sample() {
        let k = karyotype("50", "50", "100");
        assert_eq!(k.rendered, "XY");
        assert_eq!(k.calculated_gender, Gender::Male);
    }

    #[test]
    fn test_no_signal_is_unknown() {
        let k = karyotype("1", "1", "100");
        assert_eq!(k.x, AxisCall::default());
        assert_eq!(k.rendered, "0");
        assert_eq!(k.calculated_gender, Gender::Unknown);
    }

    #[test]
    fn test_render_single_x_without_y() {
        assert_eq!(render(&call(1, false, 0), &call(0, false, 0)), "X0");
    }

    #[test]
    fn test_render_aneuploidies() {
        assert_eq!(render(&call(2, false, 0), &call(1, false, 0)), "XXY");
        assert_eq!(render(&call(1, false, 0), &call(2, false, 0)), "XYY");
        assert_eq!(render(&call(3, false, 0), &call(0, false, 0)), "XXX");
    }

    #[test]
    fn test_render_excess() {
        assert_eq!(render(&call(0, true, 5), &call(1, false, 0)), "EXXXXXY");
        assert_eq!(render(&call(1, false, 0), &call(0, true, 1)), "XEY");
    }

    #[test]
    fn test_render_no_y_component_without_single_x() {
        // neither axis has a call and X is not 1: nothing is appended for Y
        assert_eq!(render(&call(0, false, 0), &call(0, false, 0)), "0");
        assert_eq!(render(&call(0, true, 2), &call(0, false, 0)), "EXX");
    }

    #[test]
    fn test_excess_y_is_male() {
        let x = call(1, false, 0);
        let y = call(0, true, 1);
        assert_eq!(calculated_gender(&x, &y, m("1.5"), m("0.15")), Gender::Male);
    }

    #[test]
    fn test_detected_y_is_never_female() {
        let t = thresholds();
        for y_cov in ["20", "25", "50", "75", "100", "150", "200"] {
            let est = estimate_copy_numbers(m("50"), m(y_cov), m("100"), &t).unwrap();
            let k = infer_karyotype(&est, &t);
            if k.y.chromes >= 1 {
                assert_eq!(k.calculated_gender, Gender::Male, "Y coverage {y_cov}");
            }
        }
    }

    #[test]
    fn test_y_count_on_floor_is_male() {
        // y_count == 1 - tolerance is not strictly below the floor
        let x = call(2, false, 0);
        let y = call(0, false, 0);
        assert_eq!(calculated_gender(&x, &y, m("0.85"), m("0.15")), Gender::Male);
        assert_eq!(calculated_gender(&x, &y, m("0.849"), m("0.15")), Gender::Female);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let a = karyotype("73.2", "12.9", "98.1");
        let b = karyotype("73.2", "12.9", "98.1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_gender() {
        assert_eq!("Male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("f".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("".parse::<Gender>().unwrap(), Gender::Unknown);
        assert_eq!("Unspecified".parse::<Gender>().unwrap(), Gender::Unknown);
        assert!("robot".parse::<Gender>().is_err());
    }
}
