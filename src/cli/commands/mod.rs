//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod clean;
pub mod doctor;
pub mod fetch;
pub mod manifest;
pub mod show;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::output::{create_spinner, is_json, is_quiet, status};
use crate::config::defaults::DEFAULT_SCRIPT_DIR;
use crate::config::paths;
use crate::core::command::BuildRequest;
use crate::core::config::Settings;
use crate::error::{LvbuildError, ProcessError};
use crate::infra::git::Submodule;
use crate::infra::process::{ConsoleSink, ProcessRunner, SilentSink, TerminalSink};

/// Port selection shared by the build commands
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Port to build (e.g. esp32, rp2, stm32, samd, unix)
    pub target: String,

    /// Board passed to make as BOARD=<board>
    #[arg(short, long)]
    pub board: Option<String>,

    /// Extra C flags passed to make as LV_CFLAGS
    #[arg(long, allow_hyphen_values = true)]
    pub cflags: Option<String>,

    /// Binding checkout containing ext_mod/, driver/ and utils/
    #[arg(long)]
    pub script_dir: Option<PathBuf>,

    /// Number of parallel make jobs (defaults to the number of CPUs)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Arguments passed to make verbatim (after `--`)
    #[arg(last = true)]
    pub extra: Vec<String>,
}

impl TargetArgs {
    /// Build request from flags, falling back to settings
    pub fn request(&self, project_dir: &Path, settings: &Settings) -> BuildRequest {
        let mut request = BuildRequest::new(&self.target)
            .with_script_dir(script_dir(project_dir, self.script_dir.clone(), settings))
            .with_cflags(self.cflags.clone().or_else(|| settings.build.cflags.clone()))
            .with_board(self.board.clone().or_else(|| settings.build.board.clone()))
            .with_extra_args(self.extra.clone());
        if let Some(jobs) = self.jobs.or(settings.build.jobs) {
            request = request.with_jobs(jobs);
        }
        request
    }
}

/// Absolute script directory from flags, settings, or the default
pub(crate) fn script_dir(
    project_dir: &Path,
    flag: Option<PathBuf>,
    settings: &Settings,
) -> PathBuf {
    let dir = flag
        .or_else(|| settings.build.script_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT_DIR));
    paths::resolve(project_dir, &dir)
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch submodules, prepare the port and build the firmware
    Build {
        #[command(flatten)]
        target: TargetArgs,

        /// User manifest included after the port's own manifest
        #[arg(long)]
        frozen_manifest: Option<PathBuf>,

        /// Skip fetching git submodules
        #[arg(long)]
        skip_fetch: bool,

        /// Run `make clean` before compiling
        #[arg(long)]
        clean: bool,
    },

    /// Run `make clean` for a port
    Clean {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Run `make` for a port without preparing it
    Compile {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Run `make submodules` for a port
    Submodules {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Fetch git submodules (all of them when none are named)
    Fetch {
        /// Submodules to fetch: lvgl, micropython, pycparser
        submodules: Vec<Submodule>,
    },

    /// Patch the port header and write build/manifest.py
    Manifest {
        /// Port to prepare
        target: String,

        /// Binding checkout containing driver/ and utils/
        #[arg(long)]
        script_dir: Option<PathBuf>,

        /// User manifest included after the port's own manifest
        #[arg(long)]
        frozen_manifest: Option<PathBuf>,
    },

    /// Print the make commands for a port without running them
    Show {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Check that required tools are installed
    Doctor,
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> Result<()> {
        let current_dir = std::env::current_dir()?;
        match self {
            Self::Build {
                target,
                frozen_manifest,
                skip_fetch,
                clean,
            } => {
                let options = build::BuildOptions {
                    target,
                    frozen_manifest,
                    skip_fetch,
                    clean,
                };
                build::execute(&current_dir, options).await
            }
            Self::Clean { target } => clean::execute(&current_dir, &target).await,
            Self::Compile { target } => build::execute_compile(&current_dir, &target).await,
            Self::Submodules { target } => {
                build::execute_submodules(&current_dir, &target).await
            }
            Self::Fetch { submodules } => fetch::execute(&current_dir, submodules).await,
            Self::Manifest {
                target,
                script_dir,
                frozen_manifest,
            } => manifest::execute(&current_dir, &target, script_dir, frozen_manifest),
            Self::Show { target } => show::execute(&current_dir, &target),
            Self::Doctor => doctor::execute(&current_dir),
        }
    }
}

/// Load layered settings for a project
pub(crate) fn load_settings(project_dir: &Path) -> Result<Settings> {
    Settings::load_default(project_dir)
        .with_context(|| format!("Failed to load settings for {}", project_dir.display()))
}

/// Process runner configured from settings
pub(crate) fn runner(project_dir: &Path, settings: &Settings) -> ProcessRunner {
    ProcessRunner::new(project_dir)
        .stop_on_prompt(settings.stop_on_prompt())
        .prompt_idle(settings.prompt_idle())
}

/// Console sink for child output
///
/// Output is echoed unless disabled in settings or the CLI is in quiet or
/// JSON mode.
pub(crate) fn console_sink(settings: &Settings) -> Box<dyn ConsoleSink> {
    if settings.echo() && !is_quiet() && !is_json() {
        Box::new(TerminalSink::stdio())
    } else {
        Box::new(SilentSink)
    }
}

/// Spinner shown while child output is not echoed
pub(crate) fn step_spinner(settings: &Settings, message: &str) -> Option<indicatif::ProgressBar> {
    if settings.echo() {
        None
    } else {
        Some(create_spinner(message))
    }
}

/// Show a failed child's output when it was not echoed live
pub(crate) fn replay_failure(settings: &Settings, error: &LvbuildError) {
    let LvbuildError::Process(process_error @ ProcessError::Failed { .. }) = error else {
        return;
    };
    if settings.echo() || is_json() {
        return;
    }
    if let Some(output) = process_error.output().filter(|o| !o.is_empty()) {
        eprintln!("{} Output of the failed step:", status::ERROR);
        eprintln!("{}", output.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::assemble;

    fn target_args(target: &str, script_dir: Option<&str>) -> TargetArgs {
        TargetArgs {
            target: target.to_string(),
            board: None,
            cflags: None,
            script_dir: script_dir.map(PathBuf::from),
            jobs: Some(1),
            extra: Vec::new(),
        }
    }

    #[test]
    fn test_default_script_dir_resolves_to_project() {
        let args = target_args("rp2", None);

        let request = args.request(Path::new("/work/fw"), &Settings::default());

        assert_eq!(request.script_dir, PathBuf::from("/work/fw"));
        assert!(assemble(&request)
            .compile
            .tokens()
            .contains(&"USER_C_MODULES=/work/fw/ext_mod".to_string()));
    }

    #[test]
    fn test_relative_script_dir_from_settings_resolves_to_project() {
        let mut settings = Settings::default();
        settings.build.script_dir = Some(PathBuf::from("./binding"));

        let request = target_args("esp32", None).request(Path::new("/work/fw"), &settings);

        assert_eq!(request.script_dir, PathBuf::from("/work/fw/binding"));
    }

    #[test]
    fn test_absolute_script_dir_flag_wins() {
        let mut settings = Settings::default();
        settings.build.script_dir = Some(PathBuf::from("binding"));

        let request = target_args("esp32", Some("/opt/lv_binding"))
            .request(Path::new("/work/fw"), &settings);

        assert_eq!(request.script_dir, PathBuf::from("/opt/lv_binding"));
    }
}
