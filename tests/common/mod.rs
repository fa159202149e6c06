//! Common test utilities for go-dev-mcp integration tests.
//!
//! Provides `TestEnv` for building throwaway Go projects and
//! workspaces on disk, plus a toolchain probe for tests that need a
//! real `go` binary.

#![allow(dead_code)] // Test utilities may not all be used in every test file

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temp directory populated with Go project fixtures.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    /// Creates a new empty test environment.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Writes a file to the test directory, creating parents as needed.
    pub fn write_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write test file");
    }

    /// Gets the full path to a file in the test directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// True when a real Go toolchain is installed. Tests that execute the
/// toolchain skip themselves when it is absent.
pub fn go_available() -> bool {
    go_dev_mcp::exec::runner::find_binary("go").is_ok()
}

/// True when gofmt is installed.
pub fn gofmt_available() -> bool {
    go_dev_mcp::exec::runner::find_binary("gofmt").is_ok()
}

/// A minimal buildable single-module project printing a marker string.
pub fn single_module_project(marker: &str) -> TestEnv {
    let env = TestEnv::new();
    env.write_file("go.mod", "module example.com/demo\n\ngo 1.21\n");
    env.write_file(
        "main.go",
        &format!(
            "package main\n\nimport \"fmt\"\n\nfunc main() {{\n\tfmt.Println(\"{marker}\")\n}}\n"
        ),
    );
    env
}

/// A two-module workspace declared by a go.work file.
pub fn two_module_workspace() -> TestEnv {
    let env = TestEnv::new();
    env.write_file("go.work", "go 1.21\n\nuse (\n\t./svc-a\n\t./lib-x\n)\n");
    for (module, marker) in [("svc-a", "service a"), ("lib-x", "lib x")] {
        env.write_file(
            &format!("{module}/go.mod"),
            &format!("module example.com/{module}\n\ngo 1.21\n"),
        );
        env.write_file(
            &format!("{module}/main.go"),
            &format!(
                "package main\n\nimport \"fmt\"\n\nfunc main() {{\n\tfmt.Println(\"{marker}\")\n}}\n"
            ),
        );
    }
    env
}

/// Two sibling modules with no go.work: a workspace by the walk rule.
pub fn implicit_workspace() -> TestEnv {
    let env = TestEnv::new();
    for module in ["alpha", "beta"] {
        env.write_file(
            &format!("{module}/go.mod"),
            &format!("module example.com/{module}\n\ngo 1.21\n"),
        );
    }
    env
}
