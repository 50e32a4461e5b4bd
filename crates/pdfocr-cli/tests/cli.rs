use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn pdfocr() -> Command {
    Command::cargo_bin("pdfocr").unwrap()
}

/// Write a config into `dir` so runs ignore any user config. Model files are
/// empty placeholders: enough to build the pipeline, never loaded.
fn isolated_config(dir: &Path) -> String {
    let models = dir.join("models");
    std::fs::create_dir_all(&models).unwrap();
    for name in ["det.onnx", "latin_rec.onnx", "latin_dict.txt"] {
        std::fs::write(models.join(name), b"").unwrap();
    }

    let path = dir.join("config.json");
    let path = path.to_str().unwrap().to_string();
    pdfocr().args(["-c", &path, "config", "init"]).assert().success();
    pdfocr()
        .args(["-c", &path, "config", "set", "ocr.model_dir", models.to_str().unwrap()])
        .assert()
        .success();
    path
}

/// A data directory holding two files that are not PDFs.
fn data_without_pdfs(dir: &Path) -> PathBuf {
    let data = dir.join("data");
    std::fs::create_dir(&data).unwrap();
    std::fs::write(data.join("notes.txt"), b"not a pdf").unwrap();
    std::fs::write(data.join("readme.md"), b"# not a pdf either").unwrap();
    data
}

#[test]
fn test_help_lists_commands() {
    pdfocr()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("file"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_init_then_get_and_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    let config = config.to_str().unwrap();

    pdfocr()
        .args(["-c", config, "config", "init"])
        .assert()
        .success();

    pdfocr()
        .args(["-c", config, "config", "get", "pdf.render_dpi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("200"));

    pdfocr()
        .args(["-c", config, "config", "set", "concurrency.max_files", "8"])
        .assert()
        .success();

    pdfocr()
        .args(["-c", config, "config", "get", "concurrency.max_files"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    let config = config.to_str().unwrap();

    pdfocr().args(["-c", config, "config", "init"]).assert().success();
    pdfocr()
        .args(["-c", config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_run_empty_directory_reports_timing() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir(&data).unwrap();

    pdfocr()
        .args(["-c", &isolated_config(dir.path()), "run"])
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 0 files"))
        .stdout(
            predicate::str::is_match(r"Took us \[\d+\.\d{2}s\] to run \[process_directory\]")
                .unwrap(),
        );
}

#[test]
fn test_run_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();

    pdfocr()
        .args(["-c", &isolated_config(dir.path()), "run"])
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to list directory"));
}

#[test]
fn test_run_without_models_fails_before_processing() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir(&data).unwrap();
    std::fs::write(data.join("scan.pdf"), b"%PDF-1.5").unwrap();

    pdfocr()
        .args(["-c", &isolated_config(dir.path()), "run"])
        .arg(&data)
        .arg("--model-dir")
        .arg(dir.path().join("no-models"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("det.onnx"));
}

#[test]
fn test_file_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();

    pdfocr()
        .args(["-c", &isolated_config(dir.path()), "file", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_run_stops_on_first_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = data_without_pdfs(dir.path());

    pdfocr()
        .args(["-c", &isolated_config(dir.path()), "run"])
        .arg(&data)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to process"))
        .stdout(predicate::str::contains("Took us").not());
}

#[test]
fn test_run_continue_on_error_records_failures() {
    let dir = tempfile::tempdir().unwrap();
    let data = data_without_pdfs(dir.path());
    let out = dir.path().join("out");

    pdfocr()
        .args(["-c", &isolated_config(dir.path()), "run"])
        .arg(&data)
        .args(["--continue-on-error", "--summary", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"))
        .stdout(predicate::str::contains("Failed files:"))
        .stdout(predicate::str::contains("failed to process").not())
        .stdout(
            predicate::str::is_match(r"Took us \[\d+\.\d{2}s\] to run \[process_directory\]")
                .unwrap(),
        );

    let summary = std::fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,pages,characters,processing_time_ms,error"));
    assert!(summary.contains("notes.txt,error,,,,"), "{}", summary);
    assert!(summary.contains("readme.md,error,,,,"), "{}", summary);
}
