//! CLI implementation for `lvbuild fetch`
//!
//! Initialises and updates the vendored git submodules.

use std::path::Path;

use anyhow::{Context, Result};

use super::{console_sink, load_settings, replay_failure, runner, step_spinner};
use crate::cli::output::{is_json, print_success};
use crate::error::LvbuildError;
use crate::infra::git::{self, Submodule};

/// Execute the fetch command
pub async fn execute(project_dir: &Path, submodules: Vec<Submodule>) -> Result<()> {
    let settings = load_settings(project_dir)?;
    let runner = runner(project_dir, &settings);
    let mut sink = console_sink(&settings);

    let submodules = if submodules.is_empty() {
        Submodule::ALL.to_vec()
    } else {
        submodules
    };

    for submodule in &submodules {
        let spinner = step_spinner(&settings, &format!("Fetching {}...", submodule.path()));
        let result = git::fetch_submodule(&runner, *submodule, sink.as_mut())
            .await
            .map_err(LvbuildError::from);
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        if let Err(e) = &result {
            replay_failure(&settings, e);
        }
        result.with_context(|| format!("Failed to fetch submodule {}", submodule.path()))?;
        print_success(&format!("Fetched {}", submodule.path()));
    }

    if is_json() {
        let json = serde_json::json!({
            "status": "success",
            "fetched": submodules,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    }

    Ok(())
}
