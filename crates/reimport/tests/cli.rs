//! CLI behavior: stdin/stdout mode, in-place fixing, config loading.

use assert_cmd::Command;
use std::fs;

fn reimport() -> Command {
    Command::cargo_bin("reimport").unwrap()
}

#[test]
fn stdin_goes_to_stdout() {
    reimport()
        .write_stdin("foo = Path('x')\n")
        .assert()
        .success()
        .stdout("from pathlib import Path\n\n\nfoo = Path('x')\n");
}

#[test]
fn dash_reads_stdin() {
    reimport()
        .arg("-")
        .write_stdin("import os\nos.getcwd()\n")
        .assert()
        .success()
        .stdout("import os\n\n\nos.getcwd()\n");
}

#[test]
fn fixes_files_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("module.py");
    fs::write(&file, "import os\nimport sys\nos.getcwd()\n").unwrap();

    reimport().arg(&file).assert().success();
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "import os\n\n\nos.getcwd()\n"
    );
}

#[test]
fn clean_file_is_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("module.py");
    let source = "import os\n\n\nos.getcwd()\n";
    fs::write(&file, source).unwrap();

    reimport().arg(&file).assert().success();
    assert_eq!(fs::read_to_string(&file).unwrap(), source);
}

#[test]
fn config_file_overrides_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("reimport.toml");
    fs::write(
        &config,
        "[common_statements]\nFrob = \"from frobnicate import Frob\"\n",
    )
    .unwrap();

    reimport()
        .arg("--config-file")
        .arg(&config)
        .write_stdin("x = Frob()\n")
        .assert()
        .success()
        .stdout("from frobnicate import Frob\n\n\nx = Frob()\n");
}

#[test]
fn missing_file_fails_with_a_message() {
    let output = reimport().arg("/no/such/module.py").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"), "stderr: {stderr}");
}
