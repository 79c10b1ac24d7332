//! Settings
//!
//! Settings come from up to three layers, later layers winning:
//!
//! 1. the global `config.toml` in the user's `lvbuild` config directory,
//! 2. `lvbuild.toml` in the project root,
//! 3. command-line flags (applied by the CLI).
//!
//! A missing file is not an error; an unparseable one is.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::defaults::{GLOBAL_CONFIG_FILE, PROJECT_CONFIG_FILE, PROMPT_IDLE_MS};
use crate::error::ConfigError;

/// Settings file contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Build defaults
    #[serde(default)]
    pub build: BuildSettings,

    /// Child process behavior
    #[serde(default)]
    pub process: ProcessSettings,
}

/// `[build]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Parallel make jobs
    pub jobs: Option<usize>,
    /// Binding checkout
    pub script_dir: Option<PathBuf>,
    /// Default board
    pub board: Option<String>,
    /// Default `LV_CFLAGS`
    pub cflags: Option<String>,
    /// User manifest included after the port manifest
    pub frozen_manifest: Option<PathBuf>,
}

/// `[process]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSettings {
    /// Stream child output to the console
    pub echo: Option<bool>,
    /// Stop reading when child output ends at a shell prompt
    pub stop_on_prompt: Option<bool>,
    /// Idle window for the prompt heuristic, in milliseconds
    pub prompt_idle_ms: Option<u64>,
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load one settings file, defaulting when it does not exist
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::from_toml(&content, path)
    }

    /// Load global then project settings
    ///
    /// # Arguments
    ///
    /// * `global_dir` - Directory holding the global `config.toml`, if any
    /// * `project_root` - Directory holding `lvbuild.toml`
    pub fn load(global_dir: Option<&Path>, project_root: &Path) -> Result<Self, ConfigError> {
        let global = match global_dir {
            Some(dir) => Self::load_file(&dir.join(GLOBAL_CONFIG_FILE))?,
            None => Self::default(),
        };
        let project = Self::load_file(&project_root.join(PROJECT_CONFIG_FILE))?;
        tracing::debug!("Loaded settings for {}", project_root.display());
        Ok(global.merge(project))
    }

    /// Load settings using the platform config directory for the global layer
    pub fn load_default(project_root: &Path) -> Result<Self, ConfigError> {
        let global_dir = global_config_dir();
        Self::load(global_dir.as_deref(), project_root)
    }

    /// Overlay `other` on top of `self`
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            build: BuildSettings {
                jobs: other.build.jobs.or(self.build.jobs),
                script_dir: other.build.script_dir.or(self.build.script_dir),
                board: other.build.board.or(self.build.board),
                cflags: other.build.cflags.or(self.build.cflags),
                frozen_manifest: other.build.frozen_manifest.or(self.build.frozen_manifest),
            },
            process: ProcessSettings {
                echo: other.process.echo.or(self.process.echo),
                stop_on_prompt: other.process.stop_on_prompt.or(self.process.stop_on_prompt),
                prompt_idle_ms: other.process.prompt_idle_ms.or(self.process.prompt_idle_ms),
            },
        }
    }

    /// Whether child output is echoed (default: yes)
    pub fn echo(&self) -> bool {
        self.process.echo.unwrap_or(true)
    }

    /// Whether the prompt heuristic is active (default: yes)
    pub fn stop_on_prompt(&self) -> bool {
        self.process.stop_on_prompt.unwrap_or(true)
    }

    /// Idle window for the prompt heuristic
    pub fn prompt_idle(&self) -> Duration {
        Duration::from_millis(self.process.prompt_idle_ms.unwrap_or(PROMPT_IDLE_MS))
    }
}

/// `<config dir>/lvbuild`, e.g. `~/.config/lvbuild` on Linux
pub fn global_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lvbuild"))
}
