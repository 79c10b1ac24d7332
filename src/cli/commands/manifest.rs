//! CLI implementation for `lvbuild manifest`
//!
//! Patches the port header and writes `build/manifest.py` without running
//! any build tool.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::load_settings;
use crate::cli::output::{is_json, print_detail, print_success};
use crate::core::manifest::build_manifest;

/// Execute the manifest command
pub fn execute(
    project_dir: &Path,
    target: &str,
    script_dir: Option<PathBuf>,
    frozen_manifest: Option<PathBuf>,
) -> Result<()> {
    let settings = load_settings(project_dir)?;
    let script_dir = super::script_dir(project_dir, script_dir, &settings);
    let frozen_manifest = frozen_manifest.or_else(|| settings.build.frozen_manifest.clone());

    let written = build_manifest(project_dir, target, &script_dir, frozen_manifest.as_deref())
        .with_context(|| format!("Failed to prepare manifest for port '{target}'"))?;

    if is_json() {
        let json = serde_json::json!({
            "status": "success",
            "target": target,
            "manifest": written,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print_success(&format!("Prepared port '{target}'"));
        print_detail(&format!("Manifest: {}", written.display()));
    }

    Ok(())
}
