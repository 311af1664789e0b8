#![allow(dead_code)]

use std::process::{Command, Output};

use tempfile::TempDir;

/// Run the CLI inside `dir`, so the default `.graphfed/graph.db` lands there
pub fn graphfed(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_graphfed-cli"))
        .current_dir(dir.path())
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

/// Run the CLI and require success; returns stdout lines
pub fn graphfed_ok(dir: &TempDir, args: &[&str]) -> Vec<String> {
    let output = graphfed(dir, args);
    assert!(
        output.status.success(),
        "graphfed {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

/// Run the CLI and require exit status 1; returns stderr
pub fn graphfed_err(dir: &TempDir, args: &[&str]) -> String {
    let output = graphfed(dir, args);
    assert_eq!(
        output.status.code(),
        Some(1),
        "graphfed {:?} should fail, stdout: {}",
        args,
        String::from_utf8_lossy(&output.stdout)
    );
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Path column of a `path<TAB>id` line
pub fn path_of(line: &str) -> &str {
    line.split('\t').next().unwrap_or(line)
}

/// Id column of a `path<TAB>id` line
pub fn id_of(line: &str) -> &str {
    line.split('\t').nth(1).expect("line has no id column")
}
