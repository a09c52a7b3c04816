use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[calibration]
wait_ms = 100
drive_ms = 200
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

/// Validate the JSON schema of a calibration run.
#[rstest]
fn calibrate_json_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir);

    let mut cmd = Command::cargo_bin("rover_cli").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("calibrate");
    let out = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out).unwrap();
    let v: serde_json::Value = serde_json::from_str(text.trim()).unwrap();

    assert_eq!(v["max_motor_speed"], 3000);
    for dir in ["backward", "forward"] {
        assert_eq!(v[dir]["left"], 3000);
        assert_eq!(v[dir]["right"], 3000);
    }
    assert!(v["duration_ms"].as_u64().unwrap() >= 500);
}

/// Every drive telemetry line is a JSON object with the same keys.
#[rstest]
fn drive_jsonl_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir);

    let mut cmd = Command::cargo_bin("rover_cli").unwrap();
    cmd.arg("--json")
        .arg("--config")
        .arg(&cfg)
        .args([
            "drive",
            "--left",
            "400",
            "--right",
            "200",
            "--duration-ms",
            "500",
            "--every-ms",
            "100",
        ]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out).unwrap();

    let rows: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(rows.len(), 5);
    for (i, row) in rows.iter().enumerate() {
        let obj = row.as_object().unwrap();
        for key in [
            "t_ms",
            "speed_left",
            "speed_right",
            "speed_center_avg",
            "mileage_mm",
        ] {
            assert!(obj.contains_key(key), "missing {key} in {row}");
        }
        assert_eq!(row["t_ms"], (i as u64 + 1) * 100);
    }
    let last = rows.last().unwrap();
    assert_eq!(last["speed_left"], 3000);
    assert_eq!(last["speed_right"], 1500);
    assert_eq!(last["speed_center_avg"], 2250);
}

/// Errors are reported as a JSON object on stderr.
#[rstest]
fn error_json_schema() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, "[simulation]\nleft_steps_per_sec = 0\n[calibration]\nwait_ms = 10\ndrive_ms = 50\n").unwrap();

    let mut cmd = Command::cargo_bin("rover_cli").unwrap();
    cmd.arg("--json").arg("--config").arg(&cfg).arg("calibrate");
    let out = cmd.assert().code(3).get_output().stderr.clone();
    let text = String::from_utf8(out).unwrap();
    let line = text
        .lines()
        .rev()
        .find(|l| l.contains("\"reason\""))
        .expect("error json line");
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["reason"], "Calibration");
    assert!(v["message"].as_str().unwrap().contains("calibration failed"));
}
