use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const DISPERSIVE_MOMENTS_SETTINGS: &str = r#"
{
  "electron_energy_in_GeV": 6.0,
  "electron_energy_spread": 0.001,
  "ring_current": 0.2,
  "moment_xx": 9.0e-10,
  "moment_xpxp": 2.5e-11,
  "moment_yy": 1.0e-11,
  "moment_ypyp": 4.0e-12,
  "electron_beam_emittance_h": 1.3e-10,
  "electron_beam_beta_h": 6.1,
  "electron_beam_eta_h": 0.001,
  "type_of_properties": 0
}
"#;

#[test]
fn defaults_command_prints_widget_defaults() {
    let output = run_ebeam(&["defaults"]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(parsed["electron_energy_in_GeV"], 1.9);
    assert_eq!(parsed["ring_current"], 0.4);
    assert_eq!(parsed["type_of_properties"], 1);
}

#[test]
fn check_command_reports_stale_views() {
    let temp = TempDir::new().expect("tempdir should be created");
    let settings_path = temp.path().join("settings.json");
    write_file(
        &settings_path,
        r#"{"type_of_properties": 1, "electron_energy_spread": 0.001}"#,
    );

    let output = run_ebeam(&["check", settings_path.to_str().expect("utf-8 path")]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Settings valid (From Size/Divergence)"));
    assert!(stdout.contains("moment_xx"));
}

#[test]
fn check_command_fails_on_first_invalid_field() {
    let temp = TempDir::new().expect("tempdir should be created");
    let settings_path = temp.path().join("settings.json");
    write_file(
        &settings_path,
        r#"{"electron_energy_in_GeV": -1.0, "ring_current": -1.0}"#,
    );

    let output = run_ebeam(&["check", settings_path.to_str().expect("utf-8 path")]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("[INPUT.FIELD] Energy must be strictly positive"), "{stderr}");
    assert!(!stderr.contains("Ring Current"));
}

#[test]
fn resolve_with_allow_lossy_writes_repopulated_settings() {
    let temp = TempDir::new().expect("tempdir should be created");
    let settings_path = temp.path().join("settings.json");
    let output_path = temp.path().join("out/resolved.json");
    let beam_path = temp.path().join("out/beam.json");
    write_file(&settings_path, DISPERSIVE_MOMENTS_SETTINGS);

    let output = run_ebeam(&[
        "resolve",
        settings_path.to_str().expect("utf-8 path"),
        "--allow-lossy",
        "--output",
        output_path.to_str().expect("utf-8 path"),
        "--beam-output",
        beam_path.to_str().expect("utf-8 path"),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Electron beam: E=6 GeV"));

    let resolved: Value = read_json(&output_path);
    assert_eq!(resolved["type_of_properties"], 0);
    assert_eq!(resolved["electron_beam_eta_h"], 0.0);
    assert_eq!(resolved["electron_beam_size_h"], 3.0e-5);

    let beam: Value = read_json(&beam_path);
    assert_eq!(beam["CLASS_NAME"], "ElectronBeam");
    assert_eq!(beam["moment_xx"], 9.0e-10);
    assert_eq!(beam["dispersion_x"], 0.0);
}

#[test]
fn resolve_declined_on_stdin_reverts_to_twiss() {
    let temp = TempDir::new().expect("tempdir should be created");
    let settings_path = temp.path().join("settings.json");
    let output_path = temp.path().join("reverted.json");
    write_file(&settings_path, DISPERSIVE_MOMENTS_SETTINGS);

    let output = run_ebeam_with_stdin(
        &[
            "resolve",
            settings_path.to_str().expect("utf-8 path"),
            "--output",
            output_path.to_str().expect("utf-8 path"),
        ],
        "n\n",
    );

    assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr_of(&output));
    assert!(stderr_of(&output).contains("set \u{03B7}, \u{03B7}' to zero"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("no beam produced"));

    let reverted: Value = read_json(&output_path);
    assert_eq!(reverted["type_of_properties"], 2);
    assert_eq!(reverted["electron_beam_eta_h"], 0.001);
    assert_eq!(reverted["electron_beam_beta_h"], 6.1);
}

#[test]
fn import_builds_twiss_settings_for_dispersive_syned_beam() {
    let temp = TempDir::new().expect("tempdir should be created");
    let syned_path = temp.path().join("beam.json");
    write_file(
        &syned_path,
        r#"{
          "CLASS_NAME": "ElectronBeam",
          "energy_in_GeV": 3.0,
          "energy_spread": 0.001,
          "current": 0.5,
          "moment_xx": 1.0e-9,
          "moment_xxp": 0.0,
          "moment_xpxp": 1.0e-9,
          "moment_yy": 4.0e-12,
          "moment_yyp": 0.0,
          "moment_ypyp": 1.0e-12,
          "dispersion_x": 0.01,
          "dispersionp_x": 0.0
        }"#,
    );

    let output = run_ebeam(&["import", syned_path.to_str().expect("utf-8 path")]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let settings: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(settings["type_of_properties"], 2);
    assert_eq!(settings["flag_energy_spread"], 1);
    assert_eq!(settings["electron_beam_eta_h"], 0.01);
    assert_eq!(settings["electron_energy_in_GeV"], 3.0);
}

#[test]
fn check_command_rejects_default_zero_energy_spread() {
    let temp = TempDir::new().expect("tempdir should be created");
    let settings_path = temp.path().join("settings.json");
    write_file(&settings_path, r#"{"type_of_properties": 1}"#);

    let output = run_ebeam(&["check", settings_path.to_str().expect("utf-8 path")]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("[INPUT.FIELD] Energy Spread must be strictly positive"));
}

#[test]
fn import_rejects_beam_whose_dispersion_exceeds_its_moments() {
    let temp = TempDir::new().expect("tempdir should be created");
    let syned_path = temp.path().join("beam.json");
    write_file(
        &syned_path,
        r#"{
          "CLASS_NAME": "ElectronBeam",
          "energy_in_GeV": 3.0,
          "energy_spread": 0.001,
          "current": 0.5,
          "moment_xx": 1.0e-10,
          "moment_xxp": 0.0,
          "moment_xpxp": 1.0e-10,
          "moment_yy": 4.0e-12,
          "moment_ypyp": 1.0e-12,
          "dispersion_x": 1.0,
          "dispersionp_x": 0.0
        }"#,
    );

    let output = run_ebeam(&["import", syned_path.to_str().expect("utf-8 path")]);

    assert_eq!(output.status.code(), Some(4), "stderr: {}", stderr_of(&output));
    assert!(stderr_of(&output).contains("[RUN.DOMAIN]"));
    assert!(output.stdout.is_empty());
}

#[test]
fn twiss_command_rejects_zero_emittance_and_negative_emittance() {
    for emittance in ["0", "-1e-9"] {
        let output = run_ebeam(&["twiss", "--emittance", emittance, "--beta", "2.0"]);

        assert_eq!(output.status.code(), Some(4), "emittance {emittance}");
        assert!(stderr_of(&output).contains("Horizontal Twiss parameters are inconsistent"));
    }
}

#[test]
fn twiss_command_rejects_negative_beta() {
    let output = run_ebeam(&["twiss", "--emittance", "1e-9", "--beta", "-1.0"]);

    assert_eq!(output.status.code(), Some(4));
    assert!(stderr_of(&output).contains("Horizontal Twiss parameters are inconsistent"));
}

#[test]
fn twiss_command_prints_moments() {
    let output = run_ebeam(&[
        "twiss",
        "--emittance",
        "1e-9",
        "--beta",
        "1.0",
        "--plane",
        "vertical",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Vertical plane"));
    assert!(stdout.contains("<qq>   = 1e-9 m^2"));
    assert!(stdout.contains("<q'q'> = 1e-9 rad^2"));
}

#[test]
fn missing_settings_file_is_an_io_failure() {
    let temp = TempDir::new().expect("tempdir should be created");
    let missing = temp.path().join("absent.json");

    let output = run_ebeam(&["resolve", missing.to_str().expect("utf-8 path"), "--deny-lossy"]);

    assert_eq!(output.status.code(), Some(3));
    assert!(stderr_of(&output).contains("[IO.READ]"));
}

fn run_ebeam(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ebeam"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("ebeam should run")
}

fn run_ebeam_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ebeam"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("ebeam should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin.as_bytes())
        .expect("stdin should accept input");
    child.wait_with_output().expect("ebeam should finish")
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn read_json(path: &Path) -> Value {
    let text = fs::read_to_string(path).expect("JSON file should exist");
    serde_json::from_str(&text).expect("file should contain JSON")
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir should be created");
    }
    fs::write(path, content).expect("file should be written");
}
