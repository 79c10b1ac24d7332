//! CLI command for `lvbuild doctor`
//!
//! Checks system dependencies and reports issues with suggestions.

use anyhow::Result;
use std::path::Path;

use crate::cli::output::{is_json, is_quiet, print_detail, print_info, print_success, print_warning, status};
use crate::core::config::global_config_dir;
use crate::core::doctor::run_doctor;

/// Execute the doctor command
pub fn execute(project_dir: &Path) -> Result<()> {
    let global_dir = global_config_dir();
    let report = run_doctor(project_dir, global_dir.as_deref());

    // JSON output mode
    if is_json() {
        let json_result = serde_json::json!({
            "status": if report.all_passed() { "success" } else { "error" },
            "checks": report.checks.iter().map(|c| serde_json::json!({
                "name": c.name,
                "passed": c.passed,
                "version": c.version,
                "error": c.error,
                "suggestion": c.suggestion
            })).collect::<Vec<_>>(),
            "config_issues": report.config_issues,
            "passed_count": report.passed_count(),
            "total_count": report.checks.len()
        });
        println!("{}", serde_json::to_string_pretty(&json_result)?);
        if !report.all_passed() {
            anyhow::bail!("Doctor found problems");
        }
        return Ok(());
    }

    // Quiet mode - only show errors
    if is_quiet() {
        for check in report.failed() {
            eprintln!("{} Missing required: {}", status::ERROR, check.name);
        }
        for issue in &report.config_issues {
            eprintln!("{} {issue}", status::ERROR);
        }
        if !report.all_passed() {
            anyhow::bail!("Doctor found problems");
        }
        return Ok(());
    }

    print_info("Checking build dependencies...");
    println!();

    for check in &report.checks {
        let version_str = check
            .version
            .as_ref()
            .map(|v| format!(" ({v})"))
            .unwrap_or_default();

        if check.passed {
            println!("  {} {}{version_str}", status::SUCCESS, check.name);
        } else {
            println!("  {} {}", status::ERROR, check.name);
            if let Some(error) = &check.error {
                print_detail(&format!("Error: {error}"));
            }
            if let Some(suggestion) = &check.suggestion {
                print_detail(&format!("Suggestion: {suggestion}"));
            }
        }
    }

    if !report.config_issues.is_empty() {
        println!();
        print_warning("Configuration issues:");
        for issue in &report.config_issues {
            print_detail(&format!("• {issue}"));
        }
    }

    println!();
    let passed = report.passed_count();
    let total = report.checks.len();
    if report.all_passed() {
        print_success(&format!("All checks passed ({passed}/{total})"));
        Ok(())
    } else {
        println!("{} {passed}/{total} checks passed", status::ERROR);
        anyhow::bail!("Missing build dependencies. Run 'lvbuild doctor' for details.")
    }
}
