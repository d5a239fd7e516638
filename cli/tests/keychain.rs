use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const RSA2048_RAW: &[u8] = include_bytes!("../../testdata/rsa2048_raw.bin");
const RSA2048_PEM: &str = include_str!("../../testdata/rsa2048_pub.pem");
const EC256_SPKI: &[u8] = include_bytes!("../../testdata/ec256_pub.der");

fn keywrap() -> Command {
    Command::cargo_bin("keywrap").unwrap()
}

#[test]
fn test_export_then_delete() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("com.example.keys.RSA.pub"), RSA2048_RAW).unwrap();

    keywrap()
        .args(["keychain", "export", "--tag", "com.example.keys", "--key-type", "rsa", "--key-size", "2048"])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(RSA2048_PEM);

    keywrap()
        .args(["keychain", "delete", "--tag", "com.example.keys", "--key-type", "rsa"])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout("Deleted com.example.keys.RSA\n");
    assert!(!dir.path().join("com.example.keys.RSA.pub").exists());

    keywrap()
        .args(["keychain", "delete", "--tag", "com.example.keys", "--key-type", "rsa"])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "no key pair stored under tag 'com.example.keys.RSA'",
        ));
}

#[test]
fn test_export_tags_are_per_key_type() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("app.EC.pub"),
        &EC256_SPKI[EC256_SPKI.len() - 65..],
    )
    .unwrap();

    keywrap()
        .args(["keychain", "export", "--tag", "app", "--key-type", "ec", "--key-size", "256"])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("-----BEGIN PUBLIC KEY-----\n"));

    // the RSA pair under the same prefix is absent and cannot be generated here
    keywrap()
        .args(["keychain", "export", "--tag", "app", "--key-type", "rsa", "--key-size", "2048"])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("key pair generation failed"));
}

#[test]
fn test_export_rejects_stored_key_of_wrong_size() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("app.EC.pub"), [0x04; 97]).unwrap();

    keywrap()
        .args(["keychain", "export", "--tag", "app", "--key-type", "ec", "--key-size", "256"])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("raw key must be 65 bytes, got 97"));
}

#[test]
fn test_export_rejects_path_tag() {
    let dir = tempdir().unwrap();

    keywrap()
        .args(["keychain", "export", "--tag", "../app", "--key-type", "ec", "--key-size", "256"])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid tag"));
}
