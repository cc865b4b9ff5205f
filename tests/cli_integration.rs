#![cfg(feature = "cli")]

mod common;

use std::path::Path;
use std::process::Command;

use common::Fixture;
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_tagfile").to_string()
}

fn write_fixture(dir: &Path, name: &str, fixture: &Fixture) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, fixture.build()).unwrap();
    path
}

#[test]
fn cli_info_prints_summary() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path(), "graph.tag", &Fixture::graph());

    let out = Command::new(bin()).arg("info").arg(&input).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("SDK version:   20150100"), "{stdout}");
    assert!(stdout.contains("Types:         6"), "{stdout}");
    assert!(stdout.contains("Items:         4"), "{stdout}");
    assert!(stdout.contains("Patches:       2"), "{stdout}");
    assert!(stdout.contains("Data size:     48"), "{stdout}");
}

#[test]
fn cli_info_json_for_many_files() {
    let dir = tempdir().unwrap();
    let a = write_fixture(dir.path(), "a.tag", &Fixture::foo());
    let b = write_fixture(dir.path(), "b.tag", &Fixture::graph());

    let out = Command::new(bin())
        .args(["--json", "info"])
        .arg(&a)
        .arg(&b)
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["types"], 1);
    assert_eq!(arr[0]["items"], 1);
    assert_eq!(arr[1]["types"], 6);
    assert_eq!(arr[1]["sdk_version"], "20150100");
}

#[test]
fn cli_info_fails_on_corrupt_file() {
    let dir = tempdir().unwrap();
    let good = write_fixture(dir.path(), "good.tag", &Fixture::foo());
    let bad = dir.path().join("bad.tag");
    let mut bytes = Fixture::foo().build();
    bytes.push(0);
    std::fs::write(&bad, bytes).unwrap();

    let out = Command::new(bin())
        .arg("info")
        .arg(&good)
        .arg(&bad)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("tagfile:"), "{stderr}");
    assert!(stderr.contains("bad.tag"), "{stderr}");
    // The good file is still reported.
    assert!(String::from_utf8_lossy(&out.stdout).contains("good.tag"));
}

#[test]
fn cli_types_xml_to_file_respects_force() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path(), "graph.tag", &Fixture::graph());
    let output = dir.path().join("types.xml");

    let st = Command::new(bin())
        .arg("types")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    let xml = std::fs::read_to_string(&output).unwrap();
    assert!(xml.contains(r#"name="Derived" parent="2""#), "{xml}");
    assert!(xml.contains(r#"<member flags="2" name="m_next" offset="8" type="4" />"#));

    let st = Command::new(bin())
        .arg("types")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .status()
        .unwrap();
    assert!(!st.success());

    let st = Command::new(bin())
        .arg("--force")
        .arg("types")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
}

#[test]
fn cli_types_json_to_stdout() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path(), "foo.tag", &Fixture::foo());

    let out = Command::new(bin())
        .args(["types", "--format", "json"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v[0]["name"], "Foo");
    assert_eq!(v[0]["byte_size"], 4);
    assert_eq!(v[0]["alignment"], 4);
}

#[test]
fn cli_items_and_patches() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path(), "graph.tag", &Fixture::graph());

    let out = Command::new(bin())
        .args(["--json", "items"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 4);
    assert_eq!(v[2]["type_name"], "Ptr");
    assert_eq!(v[2]["pointer"], true);
    assert_eq!(v[0]["type_name"], serde_json::Value::Null);

    let out = Command::new(bin())
        .arg("items")
        .arg(&input)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let labels: Vec<&str> = stdout
        .lines()
        .skip(1)
        .filter_map(|l| l.split_whitespace().nth(1))
        .collect();
    assert_eq!(labels, ["-", "Derived", "Ptr", "int"], "{stdout}");

    let out = Command::new(bin())
        .arg("patches")
        .arg(&input)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Derived"), "{stdout}");
    assert!(stdout.contains("8 16"), "{stdout}");
}

#[test]
fn cli_missing_file_fails() {
    let dir = tempdir().unwrap();
    let out = Command::new(bin())
        .arg("items")
        .arg(dir.path().join("absent.tag"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("tagfile:"));
}

#[test]
fn cli_config_works() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("SDK_VERSION=20150100"), "{stderr}");
}
