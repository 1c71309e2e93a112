use crate::error::Error;
use crate::evaluate::{evaluate_sample, link_sample, SampleInputs, SampleResult};
use crate::karyotype::Gender;
use crate::link::{HardLinker, Linker};
use crate::reconcile::{DeclaredMetadata, Outcome, SexChromosomes};
use crate::thresholds::ThresholdsTable;
use crate::Cli;
use anyhow::{bail, Context};
use human_sort::compare as human_compare;
use indicatif::ProgressBar;
use log::{debug, error, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Counts over all checked individuals, used for the exit code
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
}

pub fn check_karyotypes(args: &Cli) -> anyhow::Result<RunSummary> {
    let thresholds = ThresholdsTable::from_path(Path::new(&args.thresholds))
        .context("Could not load the capture platform thresholds")?;
    if thresholds.is_empty() {
        bail!("The thresholds table {} lists no capture platforms", args.thresholds);
    }
    debug!("{} capture platform(s) available", thresholds.len());
    let samples = match (&args.samplesheet, &args.platform) {
        (Some(_samplesheet), Some(_platform)) => {
            bail!("Specify either a sample sheet (-S) or a single sample (--platform ...), not both!");
        }
        (None, None) => {
            bail!("Specify one of a sample sheet (-S) or a single sample (--platform ...)!");
        }
        (Some(samplesheet), None) => crate::samplesheet::read_sample_sheet(Path::new(samplesheet))
            .context("Could not read the sample sheet")?,
        (None, Some(platform)) => vec![single_sample(args, platform)?],
    };

    // dry runs only report decisions
    let linker = HardLinker {
        force: args.force,
        verify_index: !args.skip_bam_check,
    };
    let linker: Option<&dyn Linker> = if args.dry_run { None } else { Some(&linker) };

    let mut results = if args.threads > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build()
            .context("Could not build the thread pool")?;
        let bar = ProgressBar::new(samples.len() as u64);
        // individuals are independent, only the report of each individual is written to
        let results: Vec<_> = pool.install(|| {
            samples
                .par_iter()
                .map(|sample| {
                    let res = check_sample(sample, &thresholds, linker, args.report_dir.as_deref());
                    bar.inc(1);
                    (sample.individual.clone(), res)
                })
                .collect()
        });
        bar.finish_and_clear();
        results
    } else {
        samples
            .iter()
            .map(|sample| {
                (
                    sample.individual.clone(),
                    check_sample(sample, &thresholds, linker, args.report_dir.as_deref()),
                )
            })
            .collect::<Vec<_>>()
    };
    results.sort_by(|a, b| human_compare(&a.0, &b.0));

    let mut summary = RunSummary::default();
    for (individual, result) in results {
        match result {
            Ok(res) => {
                let decision = &res.evaluation.decision;
                let link = match &res.link {
                    Some(Ok(status)) => format!("{status:?}"),
                    Some(Err(e)) => {
                        error!("{individual}: {e}");
                        "ERROR".to_string()
                    }
                    None => ".".to_string(),
                };
                if matches!(res.link, Some(Err(_))) {
                    summary.errors += 1;
                } else if decision.outcome == Outcome::Fail {
                    summary.failed += 1;
                } else {
                    summary.passed += 1;
                }
                println!(
                    "{individual}\t{}\t{}\t{}\t{link}",
                    decision.calculated_karyotype, decision.calculated_gender, decision.outcome
                );
            }
            Err(e) => {
                summary.errors += 1;
                error!("{individual}: {e}");
                println!("{individual}\t.\t.\tERROR\t.");
            }
        }
    }
    info!(
        "Checked {} individual(s): {} passed, {} failed, {} with input errors",
        summary.passed + summary.failed + summary.errors,
        summary.passed,
        summary.failed,
        summary.errors
    );
    Ok(summary)
}

/// Look up the platform calibration and evaluate. The decision is appended to the
/// report of this individual before linking, the link result follows as its own line.
fn check_sample(
    sample: &SampleInputs,
    thresholds: &ThresholdsTable,
    linker: Option<&dyn Linker>,
    report_dir: Option<&str>,
) -> Result<SampleResult, Error> {
    debug!("Checking {} on {}", sample.individual, sample.platform);
    let report = report_dir.map(|dir| crate::report::report_path(Path::new(dir), &sample.individual));
    let evaluation = match thresholds
        .get(&sample.platform)
        .and_then(|t| evaluate_sample(sample, t))
    {
        Ok(evaluation) => evaluation,
        Err(e) => {
            write_report(report.as_deref(), &crate::report::format_error(&sample.individual, &e));
            return Err(e);
        }
    };
    write_report(
        report.as_deref(),
        &crate::report::format_report(&sample.individual, &evaluation),
    );
    let link = link_sample(sample, &evaluation, linker);
    if let Some(link) = &link {
        write_report(report.as_deref(), &crate::report::format_link(link));
    }
    Ok(SampleResult { evaluation, link })
}

/// A report that cannot be written is logged, it does not change a settled outcome
fn write_report(path: Option<&Path>, block: &str) {
    if let Some(path) = path {
        if let Err(e) = crate::report::append_report(path, block) {
            error!("Report not written: {e}");
        }
    }
}

/// Build the inputs of the single-sample mode from the command line
fn single_sample(args: &Cli, platform: &str) -> anyhow::Result<SampleInputs> {
    let (autosomal, x, y) = match (&args.autosomal_summary, &args.x_summary, &args.y_summary) {
        (Some(a), Some(x), Some(y)) => (a, x, y),
        _ => bail!(
            "A single sample needs --autosomal-summary, --x-summary and --y-summary"
        ),
    };
    let gender: Gender = match &args.gender {
        Some(g) => g.parse().map_err(anyhow::Error::msg)?,
        None => Gender::Unknown,
    };
    let sex_chromosomes = match &args.sex_chromosomes {
        Some(s) => SexChromosomes::from_field(s),
        None => SexChromosomes::Unspecified,
    };
    let link = match (&args.bam, &args.destination) {
        (Some(bam), Some(dest)) => Some((PathBuf::from(bam), PathBuf::from(dest))),
        (None, None) => None,
        _ => bail!("--bam and --destination have to be given together"),
    };
    Ok(SampleInputs {
        individual: args.individual.clone(),
        platform: platform.to_string(),
        declared: DeclaredMetadata {
            gender,
            sex_chromosomes,
        },
        autosomal_summary: PathBuf::from(autosomal),
        x_summary: PathBuf::from(x),
        y_summary: PathBuf::from(y),
        link,
    })
}
