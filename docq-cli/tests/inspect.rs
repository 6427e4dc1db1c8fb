use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_inspect_prints_tree() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cat.xml");
    fs::write(&input, "<!-- before --><cat>3</cat>").unwrap();

    let mut cmd = cargo_bin_cmd!("docq");
    cmd.arg("inspect").arg(input.as_os_str());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("⚷ cat"))
        .stdout(predicate::str::contains("# before"))
        .stdout(predicate::str::contains("\"3\""));
}

#[test]
fn test_list_formats() {
    let mut cmd = cargo_bin_cmd!("docq");
    cmd.arg("--list-formats");

    let output = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(output).unwrap();
    for name in [
        "yaml",
        "json",
        "xml",
        "csv",
        "tsv",
        "properties",
        "base64",
        "uri",
        "sh",
    ] {
        assert!(
            stdout.lines().any(|line| line.trim_start().starts_with(name)),
            "{name} missing from:\n{stdout}"
        );
    }
}

#[test]
fn test_no_arguments_prints_help() {
    let mut cmd = cargo_bin_cmd!("docq");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
