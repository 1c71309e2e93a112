use crate::error::{Error, Result};
use crate::evaluate::Evaluation;
use crate::link::LinkStatus;
use chrono::{SecondsFormat, Utc};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn report_path(report_dir: &Path, individual: &str) -> PathBuf {
    report_dir.join(format!("{individual}.karyotype.log"))
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Render one evaluation as a block of report lines
pub fn format_report(individual: &str, evaluation: &Evaluation) -> String {
    let est = &evaluation.copy_numbers;
    let decision = &evaluation.decision;
    let mut block = format!(
        "[{}] karyotype check for {individual}\n\
         coverage: autosomal={} X={} Y={}\n\
         ratios: X/A={} Y/A={} X count={} Y count={}\n\
         karyotype: {} calculated gender: {}\n",
        timestamp(),
        evaluation.autosomal_coverage,
        evaluation.x_coverage,
        evaluation.y_coverage,
        est.xa_ratio,
        est.ya_ratio,
        est.x_count,
        est.y_count,
        decision.calculated_karyotype,
        decision.calculated_gender,
    );
    for message in &decision.messages {
        block.push_str(&format!("message: {message}\n"));
    }
    block.push_str(&format!("outcome: {}\n", decision.outcome));
    block
}

/// One line with the result of linking, appended after the decision block
pub fn format_link(link: &Result<LinkStatus>) -> String {
    match link {
        Ok(status) => format!("[{}] link: {status:?}\n", timestamp()),
        Err(e) => format!("[{}] link failed: {e}\n", timestamp()),
    }
}

/// Block for a sample that could not be evaluated
pub fn format_error(individual: &str, error: &Error) -> String {
    format!("[{}] karyotype check for {individual} stopped: {error}\n", timestamp())
}

/// Append a block to the per-individual log. The exclusive lock keeps concurrent
/// writers for the same individual from interleaving lines.
pub fn append_report(path: &Path, block: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    file.lock_exclusive().map_err(|e| Error::io(path, e))?;
    let written = file
        .write_all(block.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| Error::io(path, e));
    let unlocked = FileExt::unlock(&file).map_err(|e| Error::io(path, e));
    written.and(unlocked)
}
