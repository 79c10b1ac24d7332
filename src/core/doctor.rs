//! Doctor command logic
//!
//! Checks that the tools a build shells out to are installed and that the
//! settings files parse.

use std::path::Path;

use crate::config::defaults::BUILD_TOOL;
use crate::core::config::Settings;
use crate::infra::toolchain;

/// Result of a single dependency check
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the dependency being checked
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Version if available
    pub version: Option<String>,
    /// Error message if check failed
    pub error: Option<String>,
    /// Suggestion for fixing the issue
    pub suggestion: Option<String>,
}

impl CheckResult {
    /// Create a passing check result
    pub fn pass(name: &str, version: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            version,
            error: None,
            suggestion: None,
        }
    }

    /// Create a failing check result
    pub fn fail(name: &str, error: &str, suggestion: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            version: None,
            error: Some(error.to_string()),
            suggestion: Some(suggestion.to_string()),
        }
    }
}

/// Overall doctor report
#[derive(Debug, Default)]
pub struct DoctorReport {
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Configuration issues found
    pub config_issues: Vec<String>,
}

impl DoctorReport {
    /// Check if every tool was found and settings parsed
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed) && self.config_issues.is_empty()
    }

    /// Count passed checks
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Get all failed checks
    pub fn failed(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }
}

/// Check that a tool is on `PATH`
pub fn check_tool(tool: &str, suggestion: &str) -> CheckResult {
    match toolchain::locate(tool) {
        Some(path) => CheckResult::pass(tool, toolchain::version(&path)),
        None => CheckResult::fail(tool, &format!("{tool} not found in PATH"), suggestion),
    }
}

/// Run all doctor checks
pub fn run_doctor(project_dir: &Path, global_dir: Option<&Path>) -> DoctorReport {
    let mut report = DoctorReport {
        checks: vec![
            check_tool("git", "Install Git from https://git-scm.com/ or use your package manager"),
            check_tool(
                BUILD_TOOL,
                "Install GNU make (e.g. build-essential or the Xcode command line tools)",
            ),
        ],
        config_issues: Vec::new(),
    };

    if !cfg!(windows) {
        report
            .checks
            .push(check_tool("sh", "A POSIX shell is required to run build commands"));
    }

    if let Err(e) = Settings::load(global_dir, project_dir) {
        report.config_issues.push(e.to_string());
    }

    report
}
