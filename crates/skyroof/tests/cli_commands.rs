#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

fn skyroof(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_skyroof"))
        .env_remove("SKYROOF_ROOF_DEVICE")
        .env_remove("SKYROOF_TELESCOPE_DEVICE")
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("skyroof should run")
}

fn missing_device(tag: &str) -> String {
    PathBuf::from(format!(
        "/tmp/skyroof-missing-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ))
    .display()
    .to_string()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).expect("stdout should be one JSON document")
}

fn permitted(doc: &serde_json::Value) -> Vec<String> {
    doc["decisions"]
        .as_array()
        .expect("decisions should be an array")
        .iter()
        .filter(|d| d["permitted"] == true)
        .map(|d| d["command"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn authorize_parked_roof_when_armed() {
    let output = skyroof(&[
        "--format",
        "json",
        "authorize",
        "--roof-state",
        "lowered",
        "--lock-state",
        "lowered",
        "--enable",
    ]);

    assert!(output.status.success());
    let doc = stdout_json(&output);
    assert_eq!(doc["type"], "authorize");
    let allowed = permitted(&doc);
    assert!(allowed.contains(&"raise-roof".to_string()));
    assert!(!allowed.contains(&"lower-roof".to_string()));
    assert!(allowed.contains(&"stop-roof".to_string()));
}

#[test]
fn authorize_disarmed_allows_only_stops() {
    let output = skyroof(&[
        "--format",
        "json",
        "authorize",
        "--roof-state",
        "lowered",
        "--lock-state",
        "lowered",
    ]);

    assert!(output.status.success());
    assert_eq!(
        permitted(&stdout_json(&output)),
        vec!["stop-roof", "stop-lock", "heartbeat"]
    );
}

#[test]
fn info_lists_schemas_and_opcodes() {
    let output = skyroof(&["--format", "json", "info"]);

    assert!(output.status.success());
    let doc = stdout_json(&output);
    assert_eq!(doc["sync_marker"], "50 50 50");
    assert_eq!(doc["schemas"][0]["name"], "roof-legacy");
    assert_eq!(doc["schemas"][0]["packet_size"], 19);
    assert_eq!(doc["schemas"][1]["packet_size"], 21);
    assert_eq!(doc["schemas"][2]["packet_size"], 26);
    assert_eq!(doc["roof_commands"][0]["opcode"], "0xAB");
}

#[test]
fn send_to_missing_device_is_a_link_error() {
    let device = missing_device("send");
    let output = skyroof(&[
        "send",
        "stop-roof",
        "--roof",
        &device,
        "--settle",
        "300ms",
        "--tick",
        "50ms",
    ]);

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not open"));
}

#[test]
fn unknown_roof_command_is_a_usage_error() {
    let output = skyroof(&["send", "open-sesame", "--roof", "/dev/null"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn send_requires_a_device() {
    let output = skyroof(&["send", "stop-roof"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn version_prints_package_version() {
    let output = skyroof(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("skyroof {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn monitor_reports_disconnected_roof() {
    let device = missing_device("monitor");
    let output = skyroof(&[
        "--format", "json", "monitor", "--roof", &device, "--tick", "10ms", "--count", "2",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect();
    assert_eq!(lines.len(), 2);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line["type"], "status");
        assert_eq!(line["tick"], i as u64 + 1);
        assert_eq!(line["roof"]["link"], "disconnected");
        assert_eq!(line["roof"]["telemetry_valid"], false);
        assert_eq!(line["roof"]["enabled"], false);
        assert!(line.get("telescope").is_none());
    }
}
