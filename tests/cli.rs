use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The `run` and `compile` tests need a host interpreter; they pass trivially without one
fn python3_available() -> bool {
    let available = Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !available {
        eprintln!("python3 not found, skipping");
    }
    available
}

#[test]
fn transpile_prints_python() {
    let mut cmd = cargo_bin_cmd!("slang");
    cmd.arg("transpile")
        .arg(fixture_path("hello.genz"))
        .arg("-m")
        .arg(fixture_path("genz.json"));

    let output_pred = predicate::str::starts_with("import math\n")
        .and(predicate::str::contains("def area(r):"))
        .and(predicate::str::contains("print(\"rizz is a word\")"));

    cmd.assert().success().stdout(output_pred);
}

#[test]
fn transpile_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("hello.py");

    let mut cmd = cargo_bin_cmd!("slang");
    cmd.arg("transpile")
        .arg(fixture_path("hello.genz"))
        .arg("--mapping")
        .arg(fixture_path("genz.yaml"))
        .arg("-o")
        .arg(&out);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("Transpiled to "));
    assert!(fs::read_to_string(&out).unwrap().contains("assert area(1) > 3"));
}

#[test]
fn transpile_reverse_writes_slang() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prog.py");
    fs::write(&input, "import os\ndef f():\n    return True\n").unwrap();

    let mut cmd = cargo_bin_cmd!("slang");
    cmd.arg("transpile")
        .arg(&input)
        .arg("-m")
        .arg(fixture_path("genz.json"))
        .arg("--reverse");

    cmd.assert()
        .success()
        .stdout("slide into os\nvibe f():\n    rizz no_cap\n");
}

#[test]
fn legacy_mapping_warns_on_stderr() {
    let mut cmd = cargo_bin_cmd!("slang");
    cmd.env_remove("RUST_LOG")
        .arg("transpile")
        .arg(fixture_path("hello.genz"))
        .arg("-m")
        .arg(fixture_path("legacy.json"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("def area(r):"))
        .stderr(predicate::str::contains("legacy flat format is deprecated"));
}

#[test]
fn missing_mapping_fails() {
    let mut cmd = cargo_bin_cmd!("slang");
    cmd.arg("transpile")
        .arg(fixture_path("hello.genz"))
        .arg("-m")
        .arg(fixture_path("does-not-exist.json"));

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn invalid_pattern_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mapping = dir.path().join("bad.json");
    fs::write(&mapping, r#"{"keywords": {}, "special_patterns": {"(": "x"}}"#).unwrap();

    let mut cmd = cargo_bin_cmd!("slang");
    cmd.arg("transpile")
        .arg(fixture_path("hello.genz"))
        .arg("-m")
        .arg(&mapping);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does not compile"));
}

#[test]
fn explicit_settings_file_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("custom.toml");
    fs::write(&settings, "[transpile]\nnormalize = false\n").unwrap();
    let input = dir.path().join("indented.genz");
    fs::write(&input, "   rizz cap\n").unwrap();

    let mut cmd = cargo_bin_cmd!("slang");
    cmd.arg("--settings")
        .arg(&settings)
        .arg("transpile")
        .arg(&input)
        .arg("-m")
        .arg(fixture_path("genz.json"));

    cmd.assert().success().stdout("   return False\n");
}

#[test]
fn vscode_generates_extension() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("ext");

    let mut cmd = cargo_bin_cmd!("slang");
    cmd.arg("vscode")
        .arg("-m")
        .arg(fixture_path("genz.json"))
        .arg("-o")
        .arg(&out);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Generated VS Code extension"));

    let grammar = fs::read_to_string(out.join("syntaxes").join("gen-z.tmLanguage.json")).unwrap();
    assert!(grammar.contains("keyword.control.gen-z"));
    assert!(out.join("package.json").is_file());
    assert!(out.join("language-configuration.json").is_file());
}

#[test]
fn subcommand_is_required() {
    let mut cmd = cargo_bin_cmd!("slang");
    cmd.assert().failure();
}

#[test]
fn compile_refuses_to_overwrite_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prog.py");
    let source = "slide into os\nyap(os.name)\n";
    fs::write(&input, source).unwrap();

    let mut cmd = cargo_bin_cmd!("slang");
    cmd.arg("compile")
        .arg(&input)
        .arg("-m")
        .arg(fixture_path("genz.json"));

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("refusing to overwrite"));
    assert_eq!(fs::read_to_string(&input).unwrap(), source);
    assert!(!dir.path().join("prog.pyc").exists());
}

#[test]
fn compile_writes_bytecode() {
    if !python3_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("hello.genz");
    fs::copy(fixture_path("hello.genz"), &input).unwrap();

    let mut cmd = cargo_bin_cmd!("slang");
    cmd.arg("compile")
        .arg(&input)
        .arg("-m")
        .arg(fixture_path("genz.json"));

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("Compiled to ").and(predicate::str::contains("hello.pyc")));
    assert!(dir.path().join("hello.pyc").is_file());
    assert!(fs::read_to_string(dir.path().join("hello.py"))
        .unwrap()
        .starts_with("import math\n"));
    assert!(fs::read_to_string(&input).unwrap().starts_with("slide into math\n"));
}

#[test]
fn run_propagates_exit_code() {
    if !python3_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("exit.genz");
    fs::write(&input, "slide into sys\nyap(\"bye\")\nsys.exit(3)\n").unwrap();

    let mut cmd = cargo_bin_cmd!("slang");
    cmd.arg("run")
        .arg(&input)
        .arg("-m")
        .arg(fixture_path("genz.json"));

    cmd.assert().code(3).stdout("bye\n");
}

#[test]
fn run_succeeds_on_sample_program() {
    if !python3_available() {
        return;
    }
    let mut cmd = cargo_bin_cmd!("slang");
    cmd.arg("run")
        .arg(fixture_path("hello.genz"))
        .arg("-m")
        .arg(fixture_path("genz.json"));

    cmd.assert()
        .success()
        .stdout("rizz is a word\nTrue\n");
}
