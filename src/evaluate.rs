use crate::coverage::{read_coverage, Locus};
use crate::decimal::Milli;
use crate::error::Result;
use crate::karyotype::infer_karyotype;
use crate::link::{LinkStatus, Linker};
use crate::ratio::{estimate_copy_numbers, CopyNumberEstimate};
use crate::reconcile::{reconcile, Decision, DeclaredMetadata, SexChromosomes};
use crate::thresholds::PlatformThresholds;
use log::{debug, info, warn};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Everything needed to check one individual
#[derive(Debug, Clone)]
pub struct SampleInputs {
    pub individual: String,
    pub platform: String,
    pub declared: DeclaredMetadata,
    pub autosomal_summary: PathBuf,
    pub x_summary: PathBuf,
    pub y_summary: PathBuf,
    /// source BAM and destination, absent when only the decision is wanted
    pub link: Option<(PathBuf, PathBuf)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub autosomal_coverage: Milli,
    pub x_coverage: Milli,
    pub y_coverage: Milli,
    pub copy_numbers: CopyNumberEstimate,
    pub decision: Decision,
}

/// A settled decision and, when the BAM was handed on, how linking went.
/// A failed link does not undo the decision.
#[derive(Debug)]
pub struct SampleResult {
    pub evaluation: Evaluation,
    pub link: Option<Result<LinkStatus>>,
}

fn karyotype_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(0|EX*|X{1,4})(EY*|Y{1,4}|0)?$").expect("valid karyotype pattern")
    })
}

/// Pure part of the check: coverage values in, decision out
pub fn evaluate(
    x_coverage: Milli,
    y_coverage: Milli,
    autosomal_coverage: Milli,
    thresholds: &PlatformThresholds,
    declared: &DeclaredMetadata,
) -> Result<Evaluation> {
    let copy_numbers = estimate_copy_numbers(x_coverage, y_coverage, autosomal_coverage, thresholds)?;
    let karyotype = infer_karyotype(&copy_numbers, thresholds);
    debug!(
        "X call {:?}, Y call {:?}, calculated karyotype {karyotype}",
        karyotype.x, karyotype.y
    );
    let decision = reconcile(&karyotype, declared);
    Ok(Evaluation {
        autosomal_coverage,
        x_coverage,
        y_coverage,
        copy_numbers,
        decision,
    })
}

/// Read the three coverage summaries of a sample and evaluate it
pub fn evaluate_sample(
    inputs: &SampleInputs,
    thresholds: &PlatformThresholds,
) -> Result<Evaluation> {
    if let SexChromosomes::Declared(declared) = &inputs.declared.sex_chromosomes {
        if !karyotype_pattern().is_match(declared) {
            warn!(
                "{}: declared sex chromosomes '{declared}' do not look like a karyotype",
                inputs.individual
            );
        }
    }
    let autosomal = read_coverage(&inputs.autosomal_summary, Locus::Autosomal)?;
    let x = read_coverage(&inputs.x_summary, Locus::X)?;
    let y = read_coverage(&inputs.y_summary, Locus::Y)?;
    for cov in [&autosomal, &x, &y] {
        debug!("{}: {} coverage {}", inputs.individual, cov.locus, cov.mean_depth);
    }
    let evaluation = evaluate(
        x.mean_depth,
        y.mean_depth,
        autosomal.mean_depth,
        thresholds,
        &inputs.declared,
    )?;
    let decision = &evaluation.decision;
    info!(
        "{}: karyotype {} ({}) -> {}",
        inputs.individual, decision.calculated_karyotype, decision.calculated_gender, decision.outcome
    );
    for message in &decision.messages {
        if decision.outcome.permits_link() {
            info!("{}: {message}", inputs.individual);
        } else {
            warn!("{}: {message}", inputs.individual);
        }
    }
    Ok(evaluation)
}

/// Hand the BAM of an evaluated sample to the linker, unless the sample failed.
/// None when nothing was linked.
pub fn link_sample(
    inputs: &SampleInputs,
    evaluation: &Evaluation,
    linker: Option<&dyn Linker>,
) -> Option<Result<LinkStatus>> {
    match (&inputs.link, linker) {
        (Some((source, destination)), Some(linker)) if evaluation.decision.outcome.permits_link() => {
            Some(linker.link(source, destination))
        }
        _ => None,
    }
}
