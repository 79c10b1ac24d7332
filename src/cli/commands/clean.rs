//! CLI implementation for `lvbuild clean`
//!
//! Runs the port's `make clean`.

use std::path::Path;

use anyhow::Result;

use super::build::{run_single_step, Step};
use super::TargetArgs;

/// Execute the clean command
pub async fn execute(project_dir: &Path, target: &TargetArgs) -> Result<()> {
    run_single_step(project_dir, target, Step::Clean).await
}
