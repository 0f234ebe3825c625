//! Integration tests for synthdef-cli.
//!
//! Tests run the built binary and check its output and the files it writes.

use std::process::Command;

use tempfile::TempDir;

/// Helper to get the path to the `synthdef` binary built by cargo.
fn synthdef_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_synthdef"))
}

const SINE_FIXTURE: &[u8] = include_bytes!("../../synthdef-ugens/tests/fixtures/sine.scsyndef");

// ---------------------------------------------------------------------------
// compile
// ---------------------------------------------------------------------------

#[test]
fn cli_compile_factory_definition() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("sine.scsyndef");

    let output = synthdef_bin()
        .args(["compile", "sine", "--output"])
        .arg(&out)
        .output()
        .expect("failed to run synthdef compile");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(std::fs::read(&out).unwrap(), SINE_FIXTURE);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("({} bytes)", SINE_FIXTURE.len())), "stdout: {stdout}");
}

#[test]
fn cli_compile_all_into_directory() {
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("defs");

    let output = synthdef_bin()
        .args(["compile", "--all", "--out-dir"])
        .arg(&out_dir)
        .output()
        .expect("failed to run synthdef compile --all");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    for name in ["sine", "param_sine", "pan", "gated", "feedback", "demand_poll"] {
        assert!(out_dir.join(format!("{name}.scsyndef")).exists(), "missing {name}");
    }
    assert_eq!(std::fs::read(out_dir.join("sine.scsyndef")).unwrap(), SINE_FIXTURE);
}

#[test]
fn cli_compile_definition_file() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("tone.toml");
    let out = dir.path().join("tone.scsyndef");
    std::fs::write(
        &src,
        r#"
name = "tone"

[[params]]
name = "freq"
default = 330.0

[[nodes]]
id = "osc"
ugen = "Saw"
args = { freq = "freq", mul = 0.1 }

[[nodes]]
ugen = "Out"
args = { channels = "osc" }
"#,
    )
    .unwrap();

    let output = synthdef_bin()
        .args(["compile", "--file"])
        .arg(&src)
        .arg("--output")
        .arg(&out)
        .output()
        .expect("failed to run synthdef compile --file");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(&bytes[..4], b"SCgf");
}

#[test]
fn cli_compile_unknown_definition_fails() {
    let output = synthdef_bin()
        .args(["compile", "nonexistent"])
        .output()
        .expect("failed to run synthdef compile");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown definition"), "stderr: {stderr}");
}

#[test]
fn cli_compile_all_requires_out_dir() {
    let output = synthdef_bin()
        .args(["compile", "--all"])
        .output()
        .expect("failed to run synthdef compile --all");

    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[test]
fn cli_inspect_prints_graph() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sine.scsyndef");
    std::fs::write(&path, SINE_FIXTURE).unwrap();

    let output = synthdef_bin()
        .arg("inspect")
        .arg(&path)
        .arg("--constants")
        .output()
        .expect("failed to run synthdef inspect");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("sine"), "stdout: {stdout}");
    assert!(stdout.contains("SinOsc audio"), "stdout: {stdout}");
    assert!(stdout.contains("Out audio"), "stdout: {stdout}");
    assert!(stdout.contains("constants:"), "stdout: {stdout}");
    assert!(stdout.contains("440"), "stdout: {stdout}");
}

#[test]
fn cli_inspect_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("junk.scsyndef");
    std::fs::write(&path, b"not a synthdef").unwrap();

    let output = synthdef_bin()
        .arg("inspect")
        .arg(&path)
        .output()
        .expect("failed to run synthdef inspect");

    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// list / ugens
// ---------------------------------------------------------------------------

#[test]
fn cli_list_shows_factory_definitions() {
    let output = synthdef_bin().arg("list").output().expect("failed to run synthdef list");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Factory Definitions"));
    for name in ["sine", "param_sine", "pan", "gated", "feedback", "demand_poll"] {
        assert!(stdout.contains(name), "listing should contain '{name}'");
    }
}

#[test]
fn cli_list_prints_definition_toml() {
    let output = synthdef_bin()
        .args(["list", "gated"])
        .output()
        .expect("failed to run synthdef list gated");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name = \"gated\""), "stdout: {stdout}");
    assert!(stdout.contains("EnvGen"), "stdout: {stdout}");
}

#[test]
fn cli_ugens_lists_categories() {
    let output = synthdef_bin().arg("ugens").output().expect("failed to run synthdef ugens");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Available Unit Generators"));
    for name in ["SinOsc", "Pan2", "EnvGen", "LocalBuf", "Dseq", "Poll"] {
        assert!(stdout.contains(name), "listing should contain '{name}'");
    }
}

#[test]
fn cli_ugens_shows_arguments() {
    let output = synthdef_bin()
        .args(["ugens", "sinosc"])
        .output()
        .expect("failed to run synthdef ugens sinosc");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SinOsc"));
    assert!(stdout.contains("freq"));
    assert!(stdout.contains("phase"));
}

#[test]
fn cli_ugens_unknown_name_fails() {
    let output = synthdef_bin()
        .args(["ugens", "NotAUGen"])
        .output()
        .expect("failed to run synthdef ugens");

    assert!(!output.status.success());
}
