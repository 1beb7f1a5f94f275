use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

/// Binary run against an empty home so no stored settings are picked up
fn cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("allergyscan").unwrap();
    cmd.env("LANG", "en_US.UTF-8")
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("XDG_DOCUMENTS_DIR")
        .env_remove("ALLERGYSCAN_PAGE_ORIGIN");
    cmd
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("camera"))
        .stdout(contains("upload"));
}

#[test]
fn endpoint_defaults_to_local_backend() {
    let home = tempfile::tempdir().unwrap();
    cmd(&home)
        .arg("endpoint")
        .assert()
        .success()
        .stdout(contains("http://localhost:8000/api/chatbot/ocr/"));
}

#[test]
fn endpoint_follows_page_origin() {
    let home = tempfile::tempdir().unwrap();
    cmd(&home)
        .env("ALLERGYSCAN_PAGE_ORIGIN", "https://allergybuster.example")
        .arg("endpoint")
        .assert()
        .success()
        .stdout(contains("https://allergybuster.example/api/chatbot/ocr/"));
}

#[test]
fn text_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "milk, eggs").unwrap();

    cmd(&dir)
        .args(["upload", "--no-report"])
        .arg(&notes)
        .assert()
        .failure()
        .stdout(contains("Please select an image file (jpg, png, etc.)"));
}

#[test]
fn rejected_file_still_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.html");

    cmd(&dir)
        .arg("--html")
        .arg(&report)
        .args(["upload", "notes.txt"])
        .assert()
        .failure()
        .stdout(contains("Report saved to"));

    let html = std::fs::read_to_string(&report).unwrap();
    assert!(html.contains("role=\"alert\""));
    assert!(html.contains("Please select an image file"));
}

#[test]
fn unreachable_backend_is_analysis_failure() {
    let dir = tempfile::tempdir().unwrap();
    let label = dir.path().join("label.png");
    image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 255, 255, 255]))
        .save(&label)
        .unwrap();

    cmd(&dir)
        .env("ALLERGYSCAN_PAGE_ORIGIN", "http://127.0.0.1:1")
        .args(["upload", "--no-report"])
        .arg(&label)
        .assert()
        .failure()
        .stdout(contains("Error processing image"));
}

#[test]
fn default_report_lands_in_home_documents() {
    let home = tempfile::tempdir().unwrap();

    cmd(&home)
        .args(["upload", "notes.txt"])
        .assert()
        .failure()
        .stdout(contains("Report saved to"));

    let documents = home.path().join("Documents");
    let reports: Vec<_> = std::fs::read_dir(&documents)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].starts_with("allergyscan-"));
    assert!(reports[0].ends_with(".html"));
}
