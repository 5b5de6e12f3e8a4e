//! End-to-end tests for the `groove` binary.
//!
//! Each test writes a Groovy source to a temp dir, runs a subcommand, and
//! checks stdout.

use std::path::Path;
use std::process::{Command, Output};

fn groove(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_groove"))
        .args(args)
        .output()
        .expect("failed to invoke groove")
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("failed to write fixture");
    path.to_str().unwrap().to_string()
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "groove failed:\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn complete_lists_one_candidate_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let source = "File f = new File('a')\nf.getN";
    let file = write(dir.path(), "Main.groovy", source);
    let offset = source.len().to_string();

    let out = stdout(&groove(&["complete", &file, "--offset", &offset]));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 1, "{out}");
    assert!(lines[0].starts_with("getName"), "{out}");
    assert!(lines[0].ends_with("String"), "{out}");
}

#[test]
fn complete_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = "List xs = new ";
    let file = write(dir.path(), "Main.groovy", source);
    let offset = source.len().to_string();

    let out = stdout(&groove(&["complete", &file, "--offset", &offset, "--smart", "--json"]));
    let list: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
    let lookups: Vec<&str> = list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["lookup"].as_str().unwrap())
        .collect();
    assert!(lookups.contains(&"ArrayList"), "{lookups:?}");
    assert!(!lookups.contains(&"List"), "{lookups:?}");
    assert_eq!(list["incomplete"], false);
}

#[test]
fn apply_prints_edited_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = "Map m = new ";
    let file = write(dir.path(), "Main.groovy", source);
    let offset = source.len().to_string();

    let out = stdout(&groove(&[
        "apply",
        &file,
        "--offset",
        &offset,
        "--smart",
        "--pick",
        "ConcurrentHashMap",
    ]));
    assert_eq!(
        out,
        "import java.util.concurrent.ConcurrentHashMap\n\nMap m = new ConcurrentHashMap()"
    );
}

#[test]
fn extra_index_and_config_are_used() {
    let dir = tempfile::tempdir().unwrap();
    let index = write(
        dir.path(),
        "index.json",
        r#"{ "classes": [
            { "fqn": "org.acme.Widget", "supers": ["java.util.AbstractList"] }
        ] }"#,
    );
    let config = write(dir.path(), "groove.toml", "qualify = \"always\"\n");
    let source = "List xs = new Wid";
    let file = write(dir.path(), "Main.groovy", source);
    let offset = source.len().to_string();

    let out = stdout(&groove(&[
        "apply", &file, "--offset", &offset, "--smart", "--pick", "Widget", "--index", &index,
        "--config", &config,
    ]));
    assert_eq!(out, "List xs = new org.acme.Widget()");
}

#[test]
fn errors_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "Main.groovy", "def x = 1");

    let output = groove(&["complete", &file, "--offset", "99"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("outside the document"), "{stderr}");

    let output = groove(&["apply", &file, "--offset", "9", "--pick", "Nope"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no candidate `Nope`"), "{stderr}");

    let missing = dir.path().join("missing.groovy");
    let output = groove(&["complete", missing.to_str().unwrap(), "--offset", "0"]);
    assert!(!output.status.success());
}
