//! Build command implementation
//!
//! Implements `lvbuild build`, `lvbuild compile` and `lvbuild submodules`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{console_sink, load_settings, replay_failure, runner, step_spinner, TargetArgs};
use crate::cli::output::{is_json, print_detail, print_success};
use crate::core::builder::{run_build, BuildPlan, Orchestrator};
use crate::error::LvbuildError;

/// Build options
pub struct BuildOptions {
    /// Port selection
    pub target: TargetArgs,
    /// User manifest included after the port manifest
    pub frozen_manifest: Option<PathBuf>,
    /// Skip fetching git submodules
    pub skip_fetch: bool,
    /// Run `make clean` before compiling
    pub clean: bool,
}

/// Execute the build command
pub async fn execute(project_dir: &Path, options: BuildOptions) -> Result<()> {
    let settings = load_settings(project_dir)?;

    let mut plan = BuildPlan::new(options.target.request(project_dir, &settings));
    plan.fetch_submodules = !options.skip_fetch;
    plan.clean = options.clean;
    plan.frozen_manifest = options
        .frozen_manifest
        .or_else(|| settings.build.frozen_manifest.clone());

    let target = plan.request.target.clone();
    tracing::info!(
        "Building port '{target}' with {} jobs",
        plan.request.jobs
    );

    let runner = runner(project_dir, &settings);
    let mut sink = console_sink(&settings);
    let spinner = step_spinner(&settings, &format!("Building {target}..."));
    let result = run_build(project_dir, &runner, &plan, sink.as_mut()).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if let Err(e) = &result {
        replay_failure(&settings, e);
    }
    let summary = result.with_context(|| format!("Build failed for port '{target}'"))?;

    if is_json() {
        let json = serde_json::json!({
            "status": "success",
            "target": target,
            "steps": summary.steps,
            "manifest": summary.manifest,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print_success(&format!("Built port '{target}'"));
        print_detail(&format!("Steps: {}", summary.steps.join(", ")));
        print_detail(&format!("Manifest: {}", summary.manifest.display()));
    }

    Ok(())
}

/// Execute `make` for a port without fetching or preparing anything
pub async fn execute_compile(project_dir: &Path, target: &TargetArgs) -> Result<()> {
    run_single_step(project_dir, target, Step::Compile).await
}

/// Execute `make submodules` for a port
pub async fn execute_submodules(project_dir: &Path, target: &TargetArgs) -> Result<()> {
    run_single_step(project_dir, target, Step::Submodules).await
}

/// A single port command
#[derive(Debug, Clone, Copy)]
pub(crate) enum Step {
    Clean,
    Compile,
    Submodules,
}

impl Step {
    fn name(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Compile => "compile",
            Self::Submodules => "submodules",
        }
    }
}

/// Run one port command with the usual settings, spinner and reporting
pub(crate) async fn run_single_step(
    project_dir: &Path,
    target: &TargetArgs,
    step: Step,
) -> Result<()> {
    let settings = load_settings(project_dir)?;
    let request = target.request(project_dir, &settings);
    let orchestrator = Orchestrator::for_request(runner(project_dir, &settings), &request);
    let mut sink = console_sink(&settings);

    let spinner = step_spinner(
        &settings,
        &format!("Running {} for {}...", step.name(), target.target),
    );
    let result = match step {
        Step::Clean => orchestrator.clean(sink.as_mut()).await,
        Step::Compile => orchestrator.compile(sink.as_mut()).await,
        Step::Submodules => orchestrator.submodules(sink.as_mut()).await,
    }
    .map_err(LvbuildError::from);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if let Err(e) = &result {
        replay_failure(&settings, e);
    }
    let output = result.with_context(|| {
        format!("'{}' failed for port '{}'", step.name(), target.target)
    })?;

    if is_json() {
        let json = serde_json::json!({
            "status": "success",
            "target": target.target,
            "step": step.name(),
            "exit_code": output.code,
            "output": output.output,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print_success(&format!("{} finished for port '{}'", step.name(), target.target));
    }

    Ok(())
}
