use clap::AppSettings::DeriveDisplayOrder;
use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;
use std::process;

pub mod call;
pub mod classify;
pub mod coverage;
pub mod decimal;
pub mod error;
pub mod evaluate;
pub mod karyotype;
pub mod link;
pub mod ratio;
pub mod reconcile;
pub mod report;
pub mod samplesheet;
pub mod thresholds;
pub mod utils;

// The arguments end up in the Cli struct
#[derive(Parser, Debug)]
#[structopt(global_settings=&[DeriveDisplayOrder])]
#[clap(author, version, about="Tool to infer and check the sex chromosome karyotype of sequenced samples", long_about = None)]
pub struct Cli {
    /// Tab-separated table of X and Y coverage ratios and tolerances per capture platform
    #[clap(validator=is_file)]
    thresholds: String,

    /// Sample sheet with one individual per row to check in batch
    #[clap(short = 'S', long, validator=is_file)]
    samplesheet: Option<String>,

    /// Capture platform of a single sample
    #[clap(short, long, value_parser)]
    platform: Option<String>,

    /// Depth of coverage summary of the autosomes
    #[clap(short, long, validator=is_file)]
    autosomal_summary: Option<String>,

    /// Depth of coverage summary of chromosome X
    #[clap(short, long, validator=is_file)]
    x_summary: Option<String>,

    /// Depth of coverage summary of chromosome Y
    #[clap(short, long, validator=is_file)]
    y_summary: Option<String>,

    /// Declared gender (Male, Female or Unknown)
    #[clap(short, long, value_parser)]
    gender: Option<String>,

    /// Declared sex chromosomes, e.g. XX or XXY
    #[clap(long, value_parser)]
    sex_chromosomes: Option<String>,

    /// Name of the single individual, used in the output and the report
    #[clap(short, long, value_parser, default_value = "sample")]
    individual: String,

    /// BAM file to link when the check passes (its index has to be next to it)
    #[clap(short, long, validator=is_file)]
    bam: Option<String>,

    /// Where to link the BAM to
    #[clap(short, long, value_parser)]
    destination: Option<String>,

    /// Directory for the per-individual report logs
    #[clap(short, long, value_parser)]
    report_dir: Option<String>,

    /// Number of parallel threads to use
    #[clap(short, long, value_parser, default_value_t = 1)]
    threads: usize,

    /// Replace existing files at the link destination
    #[clap(long, value_parser, default_value_t = false)]
    force: bool,

    /// Only report the decisions, do not link
    #[clap(long, value_parser, default_value_t = false)]
    dry_run: bool,

    /// Do not open the BAM and its index with htslib before linking
    #[clap(long, value_parser, default_value_t = false)]
    skip_bam_check: bool,
}

fn is_file(pathname: &str) -> Result<(), String> {
    let path = PathBuf::from(pathname);
    if path.is_file() {
        Ok(())
    } else {
        Err(format!("Input file {} is invalid", path.display()))
    }
}

fn main() {
    env_logger::init();
    let args = Cli::parse();
    if args.force && args.dry_run {
        warn!("--force has no effect with --dry-run");
    }
    info!("Collected arguments");
    match call::check_karyotypes(&args) {
        Ok(summary) if summary.errors > 0 => process::exit(2),
        Ok(summary) if summary.failed > 0 => process::exit(1),
        Ok(_) => (),
        Err(e) => {
            error!("{e:#}");
            eprintln!("ERROR: {e:#}");
            process::exit(2);
        }
    }
}

#[cfg(test)]
#[ctor::ctor]
fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn verify_app() {
    use clap::CommandFactory;
    Cli::command().debug_assert()
}
