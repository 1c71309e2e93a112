use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Integration tests for the karyocheck command line
/// These tests run the binary on coverage summaries written to a temporary directory
/// Get the project root directory
fn get_project_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn run(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .current_dir(get_project_dir())
        .output()
        .expect("Failed to execute karyocheck")
}

fn write_summary(dir: &Path, name: &str, mean: &str) -> String {
    let path = dir.join(name);
    fs::write(
        &path,
        format!(
            "sample_id\ttotal\tmean\tgranular_third_quartile\tgranular_median\tgranular_first_quartile\t%_bases_above_15\n\
             IND\t1000\t{mean}\t1\t1\t1\t50.0\n\
             Total\t1000\t{mean}\tN/A\tN/A\tN/A\n"
        ),
    )
    .expect("Failed to write coverage summary");
    path.to_str().unwrap().to_string()
}

fn write_thresholds(dir: &Path) -> String {
    let path = dir.join("thresholds.tsv");
    fs::write(
        &path,
        "platform\tratio_mean_x\ttolerance_x\tratio_mean_y\ttolerance_y\n\
         SureSelect_V5\t0.5\t0.15\t0.5\t0.15\n",
    )
    .expect("Failed to write thresholds");
    path.to_str().unwrap().to_string()
}

#[test]
fn test_help_output() {
    let output = run(&["--help"]);
    let help_text = String::from_utf8_lossy(&output.stdout);
    assert!(help_text.contains("--samplesheet"), "Help should mention --samplesheet");
    assert!(help_text.contains("--dry-run"), "Help should mention --dry-run");
}

#[test]
fn test_requires_existing_thresholds() {
    let output = run(&["nonexistent_thresholds.tsv", "--platform", "SureSelect_V5"]);
    assert!(
        !output.status.success(),
        "Should fail with a nonexistent thresholds table"
    );
}

#[test]
fn test_female_sample_passes_and_links() {
    let dir = tempfile::tempdir().unwrap();
    let thresholds = write_thresholds(dir.path());
    let a = write_summary(dir.path(), "a.sample_summary", "100");
    let x = write_summary(dir.path(), "x.sample_summary", "100");
    let y = write_summary(dir.path(), "y.sample_summary", "0.5");
    let bam = dir.path().join("IND001.bam");
    fs::write(&bam, "mock_bam_content").unwrap();
    fs::write(dir.path().join("IND001.bam.bai"), "mock_index_content").unwrap();
    let dest = dir.path().join("next_stage/IND001.bam");

    let output = run(&[
        &thresholds,
        "--platform",
        "SureSelect_V5",
        "-a",
        &a,
        "-x",
        &x,
        "-y",
        &y,
        "--gender",
        "Female",
        "--sex-chromosomes",
        "XX",
        "--individual",
        "IND001",
        "--bam",
        bam.to_str().unwrap(),
        "--destination",
        dest.to_str().unwrap(),
        "--skip-bam-check",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "STDERR: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout.trim(), "IND001\tXX\tFemale\tALLOW\tCreated");
    assert!(dest.is_file());
    assert!(dir.path().join("next_stage/IND001.bam.bai").is_file());
}

#[test]
fn test_gender_mismatch_fails_without_link() {
    let dir = tempfile::tempdir().unwrap();
    let thresholds = write_thresholds(dir.path());
    let a = write_summary(dir.path(), "a.sample_summary", "100");
    let xy = write_summary(dir.path(), "xy.sample_summary", "50");
    let bam = dir.path().join("IND002.bam");
    fs::write(&bam, "mock_bam_content").unwrap();
    fs::write(dir.path().join("IND002.bam.bai"), "mock_index_content").unwrap();
    let dest = dir.path().join("next_stage/IND002.bam");
    let reports = dir.path().join("reports");

    let output = run(&[
        &thresholds,
        "--platform",
        "SureSelect_V5",
        "-a",
        &a,
        "-x",
        &xy,
        "-y",
        &xy,
        "--gender",
        "Female",
        "--individual",
        "IND002",
        "--bam",
        bam.to_str().unwrap(),
        "--destination",
        dest.to_str().unwrap(),
        "--report-dir",
        reports.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "IND002\tXY\tMale\tFAIL\t.");
    assert!(!dest.exists());
    let report = fs::read_to_string(reports.join("IND002.karyotype.log")).unwrap();
    assert!(report.contains("does not match calculated gender Male"));
    assert!(report.contains("outcome: FAIL"));
}

#[test]
fn test_zero_autosomal_depth_is_an_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let thresholds = write_thresholds(dir.path());
    let a = write_summary(dir.path(), "a.sample_summary", "0");
    let x = write_summary(dir.path(), "x.sample_summary", "10");
    let output = run(&[
        &thresholds,
        "--platform",
        "SureSelect_V5",
        "-a",
        &a,
        "-x",
        &x,
        "-y",
        &x,
        "--dry-run",
    ]);
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ERROR"));
}
