use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A `vibe` command isolated from the user's config and environment.
pub fn vibe(config_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("vibe");
    cmd.env("VIBECHECK_CONFIG_DIR", config_dir)
        .env_remove("VIBECHECK_API_KEY")
        .env_remove("VIBECHECK_URL")
        .env_remove("VIBECHECK_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Write a suite file into `dir` and return its path
pub fn write_suite(dir: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, yaml).unwrap();
    path
}

#[allow(dead_code)]
pub const VALID_SUITE: &str = r#"metadata:
  name: math-basics
  model: openai/gpt-4o-mini
evals:
  - prompt: "What is 2+2?"
    checks:
      - match: "*4*"
      - max_tokens: 20
  - prompt: "Name a primary color"
    checks:
      or:
        - match: "*red*"
        - match: "*blue*"
"#;

/// A closed localhost port, for unreachable-server tests
#[allow(dead_code)]
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    format!("http://{}", listener.local_addr().unwrap())
}
