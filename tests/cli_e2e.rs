//! End-to-end CLI tests for the kakomon binary.
//!
//! Only offline commands are exercised here; fetching is covered by the
//! mock-archive integration tests.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with an empty config directory so a user's config cannot leak in.
fn kakomon(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kakomon").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    kakomon(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fetch and parse past exam questions"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    kakomon(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kakomon"));
}

#[test]
fn test_binary_without_command_fails() {
    let home = TempDir::new().unwrap();
    kakomon(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_parse_prints_json_record() {
    let home = TempDir::new().unwrap();
    kakomon(&home)
        .args(["parse", "tests/fixtures/question_image.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"hasImage\": true"))
        .stdout(predicate::str::contains("\"answer\": \"イ\""))
        .stdout(predicate::str::contains("\"version\": \"1.0.0\""));
}

#[test]
fn test_parse_error_page_fails() {
    let home = TempDir::new().unwrap();
    kakomon(&home)
        .args(["parse", "tests/fixtures/not_found.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("page layout not recognized"));
}

#[test]
fn test_parse_missing_file_fails() {
    let home = TempDir::new().unwrap();
    kakomon(&home)
        .args(["parse", "tests/fixtures/absent.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_url_for_builtin_source() {
    let home = TempDir::new().unwrap();
    kakomon(&home)
        .args(["url", "-s", "fe", "--year", "28", "--season", "haru", "--no", "2"])
        .assert()
        .success()
        .stdout("http://www.fe-siken.com/kakomon/28_haru/q2.html\n");
}

#[test]
fn test_url_random_stays_in_requested_range() {
    let home = TempDir::new().unwrap();
    kakomon(&home)
        .args([
            "url",
            "-s",
            "ap",
            "--random",
            "--min-year",
            "20",
            "--max-year",
            "20",
            "--min-no",
            "7",
            "--max-no",
            "7",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^http://www\.ap-siken\.com/kakomon/20_(haru|aki)/q7\.html\n$").unwrap());
}

#[test]
fn test_url_out_of_range_fails() {
    let home = TempDir::new().unwrap();
    kakomon(&home)
        .args(["url", "-s", "fe", "--year", "30", "--season", "aki", "--no", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("year must be in [13:29], but 30"));
}

#[test]
fn test_url_unknown_source_lists_configured() {
    let home = TempDir::new().unwrap();
    kakomon(&home)
        .args(["url", "-s", "sc", "--random"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configured sources: fe, ap"));
}

#[test]
fn test_url_uses_config_file_sources() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.toml");
    std::fs::write(
        &config,
        r#"
[[sources]]
name = "sg"
sub_addr = "/sg"
url = "https://www.sg-siken.com/kakomon/{{.Year}}_{{.Season}}/q{{.No}}.html"
[sources.range]
min_year = 28
max_year = 29
min_no = 1
max_no = 50
season = "haru"
"#,
    )
    .unwrap();

    kakomon(&home)
        .arg("--config")
        .arg(&config)
        .args(["url", "-s", "sg", "--year", "29", "--season", "haru", "--no", "50"])
        .assert()
        .success()
        .stdout("https://www.sg-siken.com/kakomon/29_haru/q50.html\n");

    kakomon(&home)
        .arg("--config")
        .arg(&config)
        .args(["url", "-s", "sg", "--year", "29", "--season", "aki", "--no", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("season must be haru, but aki"));
}

#[test]
fn test_invalid_config_file_fails() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("bad.toml");
    std::fs::write(&config, "port = 0\n").unwrap();

    kakomon(&home)
        .arg("--config")
        .arg(&config)
        .args(["url", "-s", "fe", "--random"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("port"));
}
