//! End-to-end conversions through the filesystem.

use std::path::Path;

use bcss_core::encoding::TextEncoding;
use bcss_core::{BcssConfig, BcssError, OutputPaths, process_file, process_file_with};
use bcss_traits::FixedClock;
use encoding_rs::SHIFT_JIS;
use rstest::rstest;

const SCENARIO: &str = "G97S8000M03\nX0Y0B12.3\nG1X1\nX0Y0B12.8\nG1X2\nX0Y0B13.1\nG1X3\nM05\nX0Y0B14.0\nG1X4\n";

fn cfg() -> BcssConfig {
    BcssConfig {
        theta_ref_deg: 12.0,
        s_ref_rpm: 8000,
        theta_step_deg: 1.0,
        theta_min_deg: 1.0,
        s_round_unit_rpm: 10,
        deadband_rpm: 50,
        s_min_rpm: 1000,
        s_max_rpm: 20000,
        invert_b_to_theta: false,
        ..BcssConfig::default()
    }
}

fn clock() -> FixedClock {
    FixedClock::parse("2024-05-01T09:30:15+09:00").unwrap()
}

fn sjis(text: &str) -> Vec<u8> {
    SHIFT_JIS.encode(text).0.into_owned()
}

fn write(dir: &Path, name: &str, body: &[u8]) -> std::path::PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, body).unwrap();
    p
}

#[test]
fn reference_program_gets_one_insert_before_g1x3() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "part.EIA", SCENARIO.as_bytes());

    let report = process_file(&input, None, &cfg()).unwrap();

    let out = std::fs::read_to_string(dir.path().join("part-bcss.EIA")).unwrap();
    assert_eq!(
        out,
        "G97S8000M03\nX0Y0B12.3\nG1X1\nX0Y0B12.8\nG1X2\nX0Y0B13.1\nS7390\nG1X3\nM05\nX0Y0B14.0\nG1X4\n"
    );
    assert_eq!(report.changes.inserted_s_lines, 1);
    assert_eq!(report.changes.skipped_deadband, 1);
    assert_eq!(report.changes.pending_at_eof, 0);
    assert_eq!(report.detect.total_lines, 10);
    assert_eq!(report.detect.b_lines, 3);
    assert_eq!(report.s_range.s_min, Some(7390));
    assert_eq!(report.s_range.s_max, Some(8000));
    assert!(dir.path().join("part-bcss.report.json").is_file());
}

#[test]
fn report_file_matches_returned_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "part.EIA", SCENARIO.as_bytes());
    let paths = OutputPaths::derive(&input, None, "-bcss").unwrap();

    let report = process_file_with(&input, &paths, &cfg(), &clock()).unwrap();

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.report).unwrap()).unwrap();
    assert_eq!(on_disk["processed_at"], "2024-05-01T09:30:15+09:00");
    assert_eq!(on_disk["changes"]["inserted_s_lines"], 1);
    assert_eq!(on_disk["config"]["s_ref_rpm"], 8000);
    assert_eq!(on_disk["encoding"]["detected"], "utf8");
    assert_eq!(on_disk["encoding"]["newline"], "lf");
    assert_eq!(
        on_disk["output_file"],
        paths.output.display().to_string().as_str()
    );
    assert_eq!(report.processed_at, "2024-05-01T09:30:15+09:00");
}

#[test]
fn repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "part.EIA", SCENARIO.as_bytes());
    let paths = OutputPaths::derive(&input, None, "-bcss").unwrap();

    process_file_with(&input, &paths, &cfg(), &clock()).unwrap();
    let first = (
        std::fs::read(&paths.output).unwrap(),
        std::fs::read(&paths.report).unwrap(),
    );
    process_file_with(&input, &paths, &cfg(), &clock()).unwrap();
    let second = (
        std::fs::read(&paths.output).unwrap(),
        std::fs::read(&paths.report).unwrap(),
    );
    assert_eq!(first, second);
}

#[rstest]
#[case::lf("G97S8000M03\nG1X1Y1\n(NO TILT)\nG1X2Y2\n")]
#[case::crlf("G97S8000M03\r\nG1X1Y1\r\nM05\r\nM30\r\n")]
#[case::mixed_unterminated("G97S8000M03\r\nG1X1\nG1X2\r\nM30")]
fn programs_without_b_are_copied_verbatim(#[case] body: &str) {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "flat.nc", body.as_bytes());
    let report = process_file(&input, None, &cfg()).unwrap();
    assert_eq!(
        std::fs::read(dir.path().join("flat-bcss.nc")).unwrap(),
        body.as_bytes()
    );
    assert_eq!(report.changes.inserted_s_lines, 0);
    assert_eq!(report.detect.b_lines, 0);
}

#[test]
fn mixed_newlines_are_kept_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let body = "G97S8000M03\r\nX0Y0B14.0\nG1X1\r\nX0Y0B20.0\r\nG1X2\n";
    let input = write(dir.path(), "mix.EIA", body.as_bytes());
    let report = process_file(&input, None, &cfg()).unwrap();
    let out = std::fs::read_to_string(dir.path().join("mix-bcss.EIA")).unwrap();
    assert_eq!(
        out,
        "G97S8000M03\r\nX0Y0B14.0\nS6880\r\nG1X1\r\nX0Y0B20.0\r\nS4860\nG1X2\n"
    );
    assert_eq!(report.encoding.newline, bcss_core::encoding::Newline::CrLf);
}

#[test]
fn b_change_on_last_line_is_only_counted() {
    let dir = tempfile::tempdir().unwrap();
    let body = "G97S8000M03\nG1X1\nX0Y0B20.0\n";
    let input = write(dir.path(), "tail.EIA", body.as_bytes());
    let report = process_file(&input, None, &cfg()).unwrap();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("tail-bcss.EIA")).unwrap(),
        body
    );
    assert_eq!(report.changes.inserted_s_lines, 0);
    assert_eq!(report.changes.pending_at_eof, 1);
}

#[test]
fn shift_jis_program_is_preserved_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let body = sjis("(工具径 20)\r\nG97S8000M03\r\nX0Y0B14.0\r\nG1X1\r\n");
    let input = write(dir.path(), "jp.EIA", &body);

    let report = process_file(&input, None, &cfg()).unwrap();

    let expected = sjis("(工具径 20)\r\nG97S8000M03\r\nX0Y0B14.0\r\nS6880\r\nG1X1\r\n");
    assert_eq!(std::fs::read(dir.path().join("jp-bcss.EIA")).unwrap(), expected);
    assert_eq!(report.encoding.detected, TextEncoding::ShiftJis);
    assert_eq!(report.encoding.fallback_lines, 0);
}

#[test]
fn late_shift_jis_line_switches_decoder() {
    let dir = tempfile::tempdir().unwrap();
    let mut body = Vec::new();
    body.extend_from_slice(b"G97S8000M03\r\n");
    while body.len() < 70 * 1024 {
        body.extend_from_slice(b"G1X1Y1Z1\r\n");
    }
    body.extend_from_slice(&sjis("(仕上げ)\r\n"));
    body.extend_from_slice(b"X0Y0B14.0\r\nG1X2\r\n");
    let input = write(dir.path(), "late.EIA", &body);

    let report = process_file(&input, None, &cfg()).unwrap();

    assert_eq!(report.encoding.detected, TextEncoding::Utf8);
    assert_eq!(report.encoding.fallback_lines, 1);
    assert_eq!(report.changes.inserted_s_lines, 1);
    let out = std::fs::read(dir.path().join("late-bcss.EIA")).unwrap();
    assert!(out.ends_with(b"X0Y0B14.0\r\nS6880\r\nG1X2\r\n"));
    assert!(out.starts_with(&body[..body.len() - b"X0Y0B14.0\r\nG1X2\r\n".len()]));
}

#[test]
fn output_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "part.EIA", SCENARIO.as_bytes());
    let out_dir = dir.path().join("out").join("nested");
    let report = process_file(&input, Some(&out_dir), &cfg()).unwrap();
    assert!(out_dir.join("part-bcss.EIA").is_file());
    assert!(out_dir.join("part-bcss.report.json").is_file());
    assert_eq!(report.changes.inserted_s_lines, 1);
}

#[test]
fn missing_input_is_typed_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("absent.EIA");
    let err = process_file(&input, None, &cfg()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<BcssError>(),
        Some(&BcssError::InputNotFound(input.clone()))
    );
    assert!(!dir.path().join("absent-bcss.EIA").exists());
    assert!(!dir.path().join("absent-bcss.report.json").exists());
}
