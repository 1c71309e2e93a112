use crate::karyotype::{Gender, KaryotypeEstimate};
use std::fmt;

/// Sex chromosomes as recorded in the sample metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SexChromosomes {
    Unspecified,
    Declared(String),
}

impl SexChromosomes {
    /// An empty field or `.` means the metadata has no value
    pub fn from_field(field: &str) -> SexChromosomes {
        match field.trim() {
            "" | "." => SexChromosomes::Unspecified,
            value => SexChromosomes::Declared(value.to_string()),
        }
    }
}

impl fmt::Display for SexChromosomes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SexChromosomes::Unspecified => write!(f, "unspecified"),
            SexChromosomes::Declared(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredMetadata {
    pub gender: Gender,
    pub sex_chromosomes: SexChromosomes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Allow,
    WarnAllow,
    Fail,
}

impl Outcome {
    pub fn permits_link(&self) -> bool {
        !matches!(self, Outcome::Fail)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Allow => write!(f, "ALLOW"),
            Outcome::WarnAllow => write!(f, "WARN_ALLOW"),
            Outcome::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub outcome: Outcome,
    pub calculated_gender: Gender,
    pub calculated_karyotype: String,
    pub messages: Vec<String>,
}

/// Compare the calculated karyotype with the declared metadata.
/// The first matching rule decides the chromosome outcome, then a gender mismatch
/// turns any outcome into a failure.
pub fn reconcile(karyotype: &KaryotypeEstimate, declared: &DeclaredMetadata) -> Decision {
    let rendered = karyotype.rendered.as_str();
    let calculated = karyotype.calculated_gender;
    let mut messages = vec![];

    let outcome = match &declared.sex_chromosomes {
        SexChromosomes::Declared(chromosomes) if chromosomes != rendered => {
            messages.push(format!(
                "Declared sex chromosomes {chromosomes} conflict with calculated {rendered}; \
                 the declared value will be used by downstream steps"
            ));
            Outcome::WarnAllow
        }
        _ if calculated == Gender::Unknown => {
            messages.push(format!(
                "No gender could be calculated from karyotype {rendered}: \
                 likely a wrong capture platform, contamination or mosaic aneuploidy"
            ));
            Outcome::Fail
        }
        _ if declared.gender == Gender::Unknown => {
            messages.push(format!(
                "Gender newly identified as {calculated} ({rendered}); \
                 update the sample metadata and rerun this sample"
            ));
            Outcome::Fail
        }
        SexChromosomes::Unspecified if !rendered.is_empty() && !karyotype.has_excess_marker() => {
            messages.push(format!(
                "Chromosomal gender calculated successfully as {rendered}; \
                 it may be recorded in the sample metadata"
            ));
            Outcome::Allow
        }
        _ if rendered != "XX" && rendered != "XY" => {
            messages.push(format!(
                "Karyotype {rendered} suggests a sex chromosome aneuploidy; \
                 an operator has to confirm it in the sample metadata"
            ));
            Outcome::Fail
        }
        // only a declared value equal to the rendered karyotype is left
        _ => {
            messages.push(format!(
                "Calculated karyotype {rendered} matches the declared sex chromosomes"
            ));
            Outcome::Allow
        }
    };

    let outcome = if declared.gender != calculated {
        messages.push(format!(
            "Declared gender {} does not match calculated gender {calculated}; \
             manual review of sample identity and quality is required",
            declared.gender
        ));
        Outcome::Fail
    } else {
        outcome
    };

    Decision {
        outcome,
        calculated_gender: calculated,
        calculated_karyotype: rendered.to_string(),
        messages,
    }
}
