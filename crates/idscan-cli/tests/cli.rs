use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};

fn idscan() -> Command {
    let mut cmd = Command::cargo_bin("idscan").unwrap();
    // Keep user config files out of the tests
    cmd.env("XDG_CONFIG_HOME", "/nonexistent-idscan-config")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    serde_json::from_slice(&output.stdout).unwrap()
}

fn write_config(dir: &Path, json: Value) -> std::path::PathBuf {
    let path = dir.join("config.json");
    std::fs::write(&path, json.to_string()).unwrap();
    path
}

#[test]
fn missing_argument_exits_with_failure_record() {
    idscan()
        .assert()
        .code(1)
        .stdout(predicate::str::diff(
            "{\"success\":false,\"error\":\"File path not provided\"}\n",
        ));
}

#[test]
fn extra_arguments_exit_with_failure_record() {
    idscan()
        .args(["front.png", "back.png"])
        .assert()
        .code(1)
        .stdout(predicate::str::diff(
            "{\"success\":false,\"error\":\"File path not provided\"}\n",
        ));
}

#[test]
fn missing_file_is_reported_as_data() {
    let value = stdout_json(idscan().arg("/nonexistent/card.jpg"));
    assert_eq!(
        value,
        json!({"success": false, "error": "File not found: /nonexistent/card.jpg"})
    );

    idscan().arg("/nonexistent/card.jpg").assert().success();
}

#[test]
fn unsupported_type_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "just some notes").unwrap();

    idscan()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Unable to determine file type for:"));
}

#[test]
fn text_mode_extracts_all_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ocr.txt");
    std::fs::write(&path, "Jane Doe\n12/05/1990\n1234 5678 9012\nFEMALE\n560001").unwrap();

    let value = stdout_json(idscan().arg("--text").arg(&path));
    assert_eq!(
        value,
        json!({
            "success": true,
            "identifier": "123456789012",
            "name": "Jane Doe",
            "dob": "12/05/1990",
            "gender": "Female",
            "pin_code": "560001",
            "raw_text": "Jane Doe\n12/05/1990\n1234 5678 9012\nFEMALE\n560001",
        })
    );
}

#[test]
fn text_mode_with_devanagari_gender() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ocr.txt");
    std::fs::write(&path, "राम कुमार\nRam Kumar\n01/01/1985\nपुरुष / MALE").unwrap();

    let value = stdout_json(idscan().arg("--text").arg(&path));
    assert_eq!(value["gender"], "Male");
    assert_eq!(value["name"], "Ram Kumar");
    assert_eq!(value["identifier"], Value::Null);
}

#[test]
fn pretty_output_is_indented() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ocr.txt");
    std::fs::write(&path, "").unwrap();

    idscan()
        .args(["--text", "--pretty"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  \"success\": true"));
}

#[test]
fn unavailable_ocr_engine_fails_the_image_only() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("card.png");
    image::RgbImage::from_pixel(16, 16, image::Rgb([255, 255, 255]))
        .save(&image_path)
        .unwrap();
    let config = write_config(
        dir.path(),
        json!({"ocr": {"tesseract_cmd": "/nonexistent/tesseract"}}),
    );

    let value = stdout_json(idscan().arg("--config").arg(&config).arg(&image_path));
    assert_eq!(value["success"], false);
    assert!(value["error"].as_str().unwrap().contains("tesseract"));
    assert!(value.get("page").is_none());
}

#[test]
fn invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{not json").unwrap();

    let value = stdout_json(idscan().arg("--config").arg(&config).arg("card.png"));
    assert_eq!(value["success"], false);
    assert!(
        value["error"]
            .as_str()
            .unwrap()
            .starts_with("configuration error:")
    );
}

#[test]
fn config_path_subcommand() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    idscan()
        .arg("--config")
        .arg(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));

    idscan()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.is_file());
}

#[test]
fn serve_subcommand_is_available() {
    idscan()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--max-upload-mb"));
}
