//! Integration tests that lock main-binary startup behavior and smoke paths.

use std::io::Write;
use std::process::{Command, Stdio};

#[test]
fn main_lists_input_devices() {
    let bin = env!("CARGO_BIN_EXE_vitalscan");
    let output = Command::new(bin)
        .arg("--list-input-devices")
        .env("VITALSCAN_TEST_DEVICES", "Built-in Microphone,USB Headset")
        .output()
        .expect("run vitalscan");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Available audio input devices:"));
    assert!(stdout.contains("Built-in Microphone"));
    assert!(stdout.contains("USB Headset"));
}

#[test]
fn main_reports_no_input_devices() {
    let bin = env!("CARGO_BIN_EXE_vitalscan");
    let output = Command::new(bin)
        .arg("--list-input-devices")
        .env("VITALSCAN_TEST_DEVICES", "")
        .output()
        .expect("run vitalscan");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("No audio input devices detected."),
        "unexpected device listing: {stdout}"
    );
}

#[test]
fn ipc_session_emits_capabilities_and_honors_exit() {
    let bin = env!("CARGO_BIN_EXE_vitalscan");
    let mut child = Command::new(bin)
        .arg("--user-id")
        .arg("test-user")
        .env("VITALSCAN_TEST_DEVICES", "")
        .env_remove("VITALSCAN_STORE_URL")
        .env_remove("VITALSCAN_STORE_KEY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn vitalscan");

    {
        let stdin = child.stdin.as_mut().expect("child stdin");
        writeln!(stdin, r#"{{"cmd":"accept_consent"}}"#).expect("send accept_consent");
        writeln!(stdin, r#"{{"cmd":"exit"}}"#).expect("send exit");
    }
    drop(child.stdin.take());

    let output = child.wait_with_output().expect("wait for vitalscan");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(r#""event":"capabilities""#),
        "missing capabilities event in: {stdout}"
    );
    assert!(
        stdout.contains(r#""signed_in":true"#),
        "session should start signed in: {stdout}"
    );
    assert!(
        stdout.contains(r#""event":"step_changed""#),
        "accept_consent should report the step: {stdout}"
    );
}

#[test]
fn ipc_session_rejects_malformed_commands() {
    let bin = env!("CARGO_BIN_EXE_vitalscan");
    let mut child = Command::new(bin)
        .env("VITALSCAN_TEST_DEVICES", "")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn vitalscan");

    {
        let stdin = child.stdin.as_mut().expect("child stdin");
        writeln!(stdin, "this is not json").expect("send garbage");
        writeln!(stdin, r#"{{"cmd":"exit"}}"#).expect("send exit");
    }
    drop(child.stdin.take());

    let output = child.wait_with_output().expect("wait for vitalscan");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Invalid command"),
        "malformed input should produce an error event: {stdout}"
    );
}
