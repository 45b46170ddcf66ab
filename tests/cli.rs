use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE_CSV: &str = "Title,Username,Password,URL,Notes\n\
                          Acme,bob,hunter2,https://acme.example,\n\
                          Bank,alice,s3cret,https://bank.example,pin on file\n";

fn vault_pdf(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vault-pdf").unwrap();
    cmd.env("VAULT_PDF_EXPORT_DIR", home)
        .env_remove("VAULT_PDF_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn write_csv(dir: &TempDir) -> String {
    let path = dir.path().join("export.csv");
    fs::write(&path, SAMPLE_CSV).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn non_interactive_without_password_fails() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir);
    let out = dir.path().join("out.pdf");

    vault_pdf(dir.path())
        .args(["export", "--no-interactive", "--i-understand-the-risk", "--csv", &csv])
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("access password"));

    assert!(!out.exists());
}

#[test]
fn non_interactive_without_risk_flag_fails() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir);

    vault_pdf(dir.path())
        .args(["export", "--no-interactive", "--csv", &csv, "--password", "pw"])
        .args(["--out", "ignored.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--i-understand-the-risk"));
}

#[test]
fn csv_filtered_to_nothing_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir);
    let out = dir.path().join("out.pdf");

    vault_pdf(dir.path())
        .args(["export", "--no-interactive", "--i-understand-the-risk"])
        .args(["--csv", &csv, "--password", "pw", "--search", "nomatch"])
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No entries left"));

    assert!(!out.exists());
}

#[test]
fn csv_export_writes_protected_pdf() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir);
    let out = dir.path().join("backup");

    vault_pdf(dir.path())
        .args(["export", "--no-interactive", "--i-understand-the-risk"])
        .args(["--csv", &csv, "--password", "open-sesame", "--search", "bank"])
        .args(["--layout", "detailed", "--mask-passwords"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK:").and(predicate::str::contains("backup.pdf")));

    let bytes = fs::read(dir.path().join("backup.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.windows(8).any(|w| w == b"/Encrypt"));
    assert!(!bytes.windows(11).any(|w| w == b"open-sesame"));
    assert!(!dir.path().join("backup.pdf.tmp").exists());
}

#[test]
fn header_only_csv_is_empty_source() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("empty.csv");
    fs::write(&csv, "Title,Username,Password\n").unwrap();

    vault_pdf(dir.path())
        .args(["export", "--no-interactive", "--i-understand-the-risk", "--password", "pw"])
        .arg("--csv")
        .arg(&csv)
        .arg("--out")
        .arg(dir.path().join("out.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source is empty"));
}

#[test]
fn non_zip_archive_fails() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("export.1pux");
    fs::write(&archive, "not a zip").unwrap();

    vault_pdf(dir.path())
        .args(["export", "--no-interactive", "--i-understand-the-risk", "--password", "pw"])
        .arg("--onepux")
        .arg(&archive)
        .arg("--out")
        .arg(dir.path().join("out.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Archive error"));
}

#[test]
fn config_init_writes_settings() {
    let dir = TempDir::new().unwrap();

    vault_pdf(dir.path())
        .args(["config", "--init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Default layout:  compact"));

    assert!(dir.path().join("config.json").exists());
}
