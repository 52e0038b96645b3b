use assert_cmd::Command;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use predicates::str::contains;
use serde_json::Value;
use std::io::Write as _;
use tempfile::NamedTempFile;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("ping-libsignal").unwrap();
    cmd.env_remove("PING_LIBSIGNAL_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn json_output(args: &[&str]) -> Value {
    let output = cmd().arg("--json").args(args).output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn hello() {
    cmd()
        .arg("hello")
        .assert()
        .success()
        .stdout(contains("Hello world!"));
}

#[test]
fn pi() {
    cmd()
        .arg("pi")
        .assert()
        .success()
        .stdout(contains("3.141592653589793"));
}

#[test]
fn identity_json() {
    let value = json_output(&["identity"]);
    let public = STANDARD.decode(value["pub"].as_str().unwrap()).unwrap();
    let private = STANDARD.decode(value["priv"].as_str().unwrap()).unwrap();
    assert_eq!(public.len(), 33);
    assert_eq!(private.len(), 32);
}

#[test]
fn pre_keys_count() {
    let value = json_output(&["pre-keys", "--count", "4"]);
    assert_eq!(value["preKeys"].as_array().unwrap().len(), 4);
}

#[test]
fn pre_keys_default_count_from_config() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[module]\npre_key_count = 2").unwrap();

    let output = cmd()
        .args(["--json", "--config"])
        .arg(file.path())
        .arg("pre-keys")
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["preKeys"].as_array().unwrap().len(), 2);
}

#[test]
fn signed_pre_key_from_identity() {
    let identity = json_output(&["identity"]);
    let private = identity["priv"].as_str().unwrap();

    let value = json_output(&["signed-pre-key", "--identity-private", private]);
    let record = STANDARD
        .decode(value["signedPreKey"].as_str().unwrap())
        .unwrap();
    assert_eq!(record.len(), 141);
}

#[test]
fn signed_pre_key_rejects_bad_base64() {
    cmd()
        .args(["signed-pre-key", "--identity-private", "%%%"])
        .assert()
        .failure()
        .stderr(contains("generateSignedPreKey failed"))
        .stderr(contains("invalid base64"));
}

#[test]
fn screen_renders() {
    cmd()
        .args(["screen", "--count", "2"])
        .assert()
        .success()
        .stdout(contains("pingLibSignal Test Screen"))
        .stdout(contains("Module loaded successfully!"))
        .stdout(contains("[Pre-Keys (2)]"))
        .stdout(contains("[Signed Pre-Key]"));
}

#[test]
fn screen_json_state() {
    let value = json_output(&["screen", "--count", "1"]);
    assert_eq!(value["isLoading"], Value::Bool(false));
    assert_eq!(value["alerts"].as_array().unwrap().len(), 0);
    assert_eq!(value["preKeysResult"]["preKeys"].as_array().unwrap().len(), 1);
}

#[test]
fn per_target_log_directive_is_accepted() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "log_level = \"ping_libsignal=debug\"").unwrap();

    cmd()
        .arg("--config")
        .arg(file.path())
        .arg("hello")
        .assert()
        .success()
        .stdout(contains("Hello world!"));
}

#[test]
fn bad_config_fails() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "log_level = \"ping_libsignal=loud\"").unwrap();

    cmd()
        .arg("--config")
        .arg(file.path())
        .arg("hello")
        .assert()
        .failure()
        .stderr(contains("invalid log directive"));
}
