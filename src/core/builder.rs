//! Build orchestration logic
//!
//! Runs the port commands assembled by [`crate::core::command`] and chains
//! them into a full firmware build. A failing step stops the build and
//! returns [`ProcessError::Failed`] carrying the child's exit code and
//! output; deciding whether to exit the process is left to the caller.

use std::path::{Path, PathBuf};

use crate::config::paths;
use crate::core::command::{assemble, mpy_cross_command, BuildRequest, CommandLine, CommandSet};
use crate::core::manifest;
use crate::error::{LvbuildError, ProcessError};
use crate::infra::git::{self, Submodule};
use crate::infra::process::{ConsoleSink, ProcessRunner, ShellScript, SpawnOutput};

/// Runs the port commands for one request
#[derive(Debug, Clone)]
pub struct Orchestrator {
    runner: ProcessRunner,
    commands: CommandSet,
}

impl Orchestrator {
    /// Create an orchestrator from pre-assembled commands
    pub fn new(runner: ProcessRunner, commands: CommandSet) -> Self {
        Self { runner, commands }
    }

    /// Assemble the commands for `request` and wrap them
    pub fn for_request(runner: ProcessRunner, request: &BuildRequest) -> Self {
        Self::new(runner, assemble(request))
    }

    /// The assembled commands
    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    /// The process runner
    pub fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    async fn run_step(
        &self,
        step: &str,
        command: &CommandLine,
        sink: &mut dyn ConsoleSink,
    ) -> Result<SpawnOutput, ProcessError> {
        run_command(&self.runner, step, command, sink).await
    }

    /// `make clean` for the port
    pub async fn clean(&self, sink: &mut dyn ConsoleSink) -> Result<SpawnOutput, ProcessError> {
        self.run_step("clean", &self.commands.clean, sink).await
    }

    /// `make submodules` for the port
    pub async fn submodules(
        &self,
        sink: &mut dyn ConsoleSink,
    ) -> Result<SpawnOutput, ProcessError> {
        self.run_step("submodules", &self.commands.submodules, sink)
            .await
    }

    /// Build the firmware
    pub async fn compile(&self, sink: &mut dyn ConsoleSink) -> Result<SpawnOutput, ProcessError> {
        self.run_step("compile", &self.commands.compile, sink).await
    }

    /// Build the `mpy-cross` bytecode compiler
    pub async fn mpy_cross(
        &self,
        sink: &mut dyn ConsoleSink,
    ) -> Result<SpawnOutput, ProcessError> {
        self.run_step("mpy-cross", &mpy_cross_command(), sink).await
    }
}

/// Run one command as a named build step
async fn run_command(
    runner: &ProcessRunner,
    step: &str,
    command: &CommandLine,
    sink: &mut dyn ConsoleSink,
) -> Result<SpawnOutput, ProcessError> {
    tracing::info!("{step}: {command}");
    runner
        .run(&ShellScript::single(command), sink)
        .await?
        .into_result(step)
}

/// What a full build should do
#[derive(Debug, Clone)]
pub struct BuildPlan {
    /// Port selection and make arguments
    pub request: BuildRequest,
    /// Fetch git submodules first
    pub fetch_submodules: bool,
    /// Run `make clean` before compiling
    pub clean: bool,
    /// User manifest included after the port manifest
    pub frozen_manifest: Option<PathBuf>,
}

impl BuildPlan {
    /// Plan with submodule fetching on and cleaning off
    pub fn new(request: BuildRequest) -> Self {
        Self {
            request,
            fetch_submodules: true,
            clean: false,
            frozen_manifest: None,
        }
    }
}

/// Result of a successful build
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    /// Steps that ran, in order
    pub steps: Vec<String>,
    /// Generated freeze manifest
    pub manifest: PathBuf,
}

/// Run a complete port build
///
/// Steps, stopping at the first failure:
/// 1. fetch micropython, lvgl and pycparser (unless disabled)
/// 2. build `mpy-cross`
/// 3. patch the port header and write `build/manifest.py`
/// 4. `make submodules`
/// 5. `make clean` (if requested)
/// 6. `make`, with `FROZEN_MANIFEST` pointing at the generated manifest
pub async fn run_build(
    project_root: &Path,
    runner: &ProcessRunner,
    plan: &BuildPlan,
    sink: &mut dyn ConsoleSink,
) -> Result<BuildSummary, LvbuildError> {
    let mut summary = BuildSummary::default();

    if plan.fetch_submodules {
        for submodule in Submodule::ALL {
            git::fetch_submodule(runner, submodule, sink).await?;
            summary.steps.push(format!("fetch {submodule}"));
        }
    }

    run_command(runner, "mpy-cross", &mpy_cross_command(), sink).await?;
    summary.steps.push("mpy-cross".to_string());

    let mut request = plan.request.clone();
    request.script_dir = paths::resolve(project_root, &request.script_dir);

    summary.manifest = manifest::build_manifest(
        project_root,
        &request.target,
        &request.script_dir,
        plan.frozen_manifest.as_deref(),
    )?;
    summary.steps.push("manifest".to_string());

    request.extra_args.push(format!(
        "FROZEN_MANIFEST={}",
        project_root.join(paths::GENERATED_MANIFEST).display()
    ));
    let orchestrator = Orchestrator::for_request(runner.clone(), &request);

    orchestrator.submodules(sink).await?;
    summary.steps.push("submodules".to_string());

    if plan.clean {
        orchestrator.clean(sink).await?;
        summary.steps.push("clean".to_string());
    }

    orchestrator.compile(sink).await?;
    summary.steps.push("compile".to_string());

    Ok(summary)
}
