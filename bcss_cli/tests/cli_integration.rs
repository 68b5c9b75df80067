use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

const PROGRAM: &str = "G97S8000M03\nX0Y0B12.3\nG1X1\nX0Y0B12.8\nG1X2\nX0Y0B13.1\nG1X3\nM05\nX0Y0B14.0\nG1X4\n";

// Relative mode with B read as theta directly.
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[speed]
mode = "relative"
theta_ref_deg = 12.0
s_ref_rpm = 8000

[angle]
step_deg = 1.0
min_deg = 1.0
invert_b = false

[spindle]
s_min_rpm = 1000
s_max_rpm = 20000
round_unit_rpm = 10
deadband_rpm = 50
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn write_program(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, PROGRAM).unwrap();
    path
}

fn bcss() -> Command {
    let mut cmd = Command::cargo_bin("bcss").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&[], 2, "required", "stderr")]
#[case(&["--mode", "sideways", "a.EIA"], 2, "invalid value", "stderr")]
#[case(&["--invert-b", "--no-invert-b", "a.EIA"], 2, "cannot be used with", "stderr")]
fn cli_usage_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let assert = bcss().args(args).assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn converts_program_and_writes_report() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let input = write_program(&dir, "part.EIA");

    bcss()
        .arg("--config")
        .arg(&cfg)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("inserted=1"));

    let out = fs::read_to_string(dir.path().join("part-bcss.EIA")).unwrap();
    assert!(out.contains("X0Y0B13.1\nS7390\nG1X3\n"), "{out}");
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("part-bcss.report.json")).unwrap())
            .unwrap();
    assert_eq!(report["changes"]["inserted_s_lines"], 1);
    assert_eq!(report["config"]["invert_b_to_theta"], false);
}

#[test]
fn json_mode_prints_one_object_per_file() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let a = write_program(&dir, "a.EIA");
    let b = write_program(&dir, "b.nc");
    let out_dir = dir.path().join("out");

    let assert = bcss()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .arg("--out-dir")
        .arg(&out_dir)
        .arg(&a)
        .arg(&b)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let objs: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(objs.len(), 2);
    for obj in &objs {
        assert_eq!(obj["inserted"], 1);
        assert_eq!(obj["skipped_deadband"], 1);
        assert_eq!(obj["s_min"], 7390);
        assert_eq!(obj["s_max"], 8000);
    }
    assert!(out_dir.join("a-bcss.EIA").is_file());
    assert!(out_dir.join("b-bcss.nc").is_file());
}

#[test]
fn flags_override_config_file() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let input = write_program(&dir, "part.EIA");

    // A deadband wider than any change suppresses every insertion.
    bcss()
        .arg("--config")
        .arg(&cfg)
        .args(["--deadband", "5000"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("inserted=0"));

    assert_eq!(
        fs::read_to_string(dir.path().join("part-bcss.EIA")).unwrap(),
        PROGRAM
    );
}

#[test]
fn missing_input_exits_3() {
    let dir = tempdir().unwrap();
    bcss()
        .arg(dir.path().join("absent.EIA"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("was not found"));
}

#[test]
fn missing_input_json_error() {
    let dir = tempdir().unwrap();
    let assert = bcss()
        .arg("--json")
        .arg(dir.path().join("absent.EIA"))
        .assert()
        .code(3);
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    let last = stderr.lines().last().unwrap();
    let v: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(v["reason"], "InputNotFound");
}

#[rstest]
#[case::surface_speed_without_vc("[speed]\nmode = \"surface_speed\"\n")]
#[case::empty_suffix("[output]\nsuffix = \"\"\n")]
#[case::bad_rotation("[logging]\nrotation = \"weekly\"\n")]
#[case::not_toml("this is = = not toml")]
fn invalid_config_exits_4(#[case] toml: &str) {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("bad.toml");
    fs::write(&cfg, toml).unwrap();
    let input = write_program(&dir, "part.EIA");

    bcss()
        .arg("--config")
        .arg(&cfg)
        .arg(&input)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Invalid configuration"));
    assert!(!dir.path().join("part-bcss.EIA").exists());
}

#[test]
fn missing_config_file_exits_4() {
    let dir = tempdir().unwrap();
    let input = write_program(&dir, "part.EIA");
    bcss()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg(&input)
        .assert()
        .code(4);
}

#[test]
fn log_file_is_written() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("bcss.log");
    let cfg = dir.path().join("cfg.toml");
    fs::write(
        &cfg,
        format!(
            "[logging]\nfile = {:?}\nlevel = \"info\"\n",
            log.display().to_string()
        ),
    )
    .unwrap();
    let input = write_program(&dir, "part.EIA");

    bcss().arg("--config").arg(&cfg).arg(&input).assert().success();

    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("converted"), "{text}");
}
