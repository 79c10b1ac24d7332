//! Git submodule fetching
//!
//! The firmware tree vendors MicroPython, LVGL and pycparser as git
//! submodules. They are fetched on demand with the `git` CLI, streaming its
//! progress to the console.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::paths;
use crate::core::command::CommandLine;
use crate::error::ProcessError;
use crate::infra::process::{ConsoleSink, ProcessRunner, ShellScript, SpawnOutput};

/// A vendored dependency checked out as a git submodule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Submodule {
    /// `lib/lvgl`
    Lvgl,
    /// `lib/micropython`
    Micropython,
    /// `lib/pycparser`
    Pycparser,
}

impl Submodule {
    /// Every submodule, in fetch order
    pub const ALL: [Submodule; 3] = [Self::Micropython, Self::Lvgl, Self::Pycparser];

    /// Path of the submodule in the tree
    pub fn path(self) -> &'static str {
        match self {
            Self::Lvgl => paths::LVGL_DIR,
            Self::Micropython => paths::MICROPYTHON_DIR,
            Self::Pycparser => paths::PYCPARSER_DIR,
        }
    }

    /// Short name
    pub fn name(self) -> &'static str {
        match self {
            Self::Lvgl => "lvgl",
            Self::Micropython => "micropython",
            Self::Pycparser => "pycparser",
        }
    }

    /// `git submodule update --init -- <path>`
    pub fn command(self) -> CommandLine {
        CommandLine::new(["git", "submodule", "update", "--init", "--", self.path()])
    }
}

impl fmt::Display for Submodule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Submodule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lvgl" => Ok(Self::Lvgl),
            "micropython" => Ok(Self::Micropython),
            "pycparser" => Ok(Self::Pycparser),
            other => Err(format!(
                "unknown submodule '{other}' (expected lvgl, micropython or pycparser)"
            )),
        }
    }
}

/// Initialise and update one submodule
///
/// A non-zero exit from git becomes [`ProcessError::Failed`].
pub async fn fetch_submodule(
    runner: &ProcessRunner,
    submodule: Submodule,
    sink: &mut dyn ConsoleSink,
) -> Result<SpawnOutput, ProcessError> {
    tracing::info!("Fetching submodule {}", submodule.path());
    runner
        .run(&ShellScript::single(&submodule.command()), sink)
        .await?
        .into_result(&format!("git submodule update ({})", submodule.path()))
}

/// Fetch `lib/lvgl`
pub async fn get_lvgl(
    runner: &ProcessRunner,
    sink: &mut dyn ConsoleSink,
) -> Result<SpawnOutput, ProcessError> {
    fetch_submodule(runner, Submodule::Lvgl, sink).await
}

/// Fetch `lib/micropython`
pub async fn get_micropython(
    runner: &ProcessRunner,
    sink: &mut dyn ConsoleSink,
) -> Result<SpawnOutput, ProcessError> {
    fetch_submodule(runner, Submodule::Micropython, sink).await
}

/// Fetch `lib/pycparser`
pub async fn get_pycparser(
    runner: &ProcessRunner,
    sink: &mut dyn ConsoleSink,
) -> Result<SpawnOutput, ProcessError> {
    fetch_submodule(runner, Submodule::Pycparser, sink).await
}
