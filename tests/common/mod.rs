//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary firmware tree and runs the lvbuild binary inside it.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Lay out a port with its HAL header, port manifest and the binding's
    /// framework helpers
    pub fn with_port(self, target: &str, header: &str) -> Self {
        self.create_file(&format!("lib/micropython/ports/{target}/{header}"), SAMPLE_HAL);
        let manifest = if target == "teensy" {
            format!("lib/micropython/ports/{target}/manifest.py")
        } else {
            format!("lib/micropython/ports/{target}/boards/manifest.py")
        };
        self.create_file(&manifest, "freeze('$(PORT_DIR)/modules')\n");
        for file in FRAMEWORK_FILES {
            self.create_file(file, "# helper\n");
        }
        self
    }

    /// Install an executable script under `fake-bin/`
    #[cfg(unix)]
    pub fn fake_tool(&self, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = self.dir.path().join("fake-bin").join(name);
        self.create_file(&format!("fake-bin/{name}"), &format!("#!/bin/sh\n{body}\n"));
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make tool executable");
    }

    /// `PATH` with `fake-bin/` first
    pub fn fake_path(&self) -> String {
        format!(
            "{}:{}",
            self.dir.path().join("fake-bin").display(),
            std::env::var("PATH").unwrap_or_default()
        )
    }

    /// Run lvbuild in the project with the fake tools on `PATH`
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_lvbuild"))
            .current_dir(self.dir.path())
            .env("PATH", self.fake_path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("xdg"))
            .env("HOME", self.dir.path())
            .args(args)
            .output()
            .expect("Failed to execute lvbuild")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal port HAL header
pub const SAMPLE_HAL: &str = "static inline mp_uint_t mp_hal_ticks_ms(void);\n";

/// Framework helpers frozen into every image
pub const FRAMEWORK_FILES: &[&str] = &[
    "driver/display/display_driver_framework.py",
    "driver/fs_driver.py",
    "utils/lv_utils.py",
];
