//! Build command assembly
//!
//! Turns a [`BuildRequest`] into the `make` invocations for a port. All
//! three port commands share every token except the sub-action that follows
//! the tool name: `clean`, nothing (compile), or `submodules`.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::defaults::{BUILD_TOOL, TINY_TTF_DISABLE_FLAG, TINY_TTF_TARGET};
use crate::config::paths;

/// A single command line as an ordered list of tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandLine(Vec<String>);

impl CommandLine {
    /// Create a command line from tokens
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    /// All tokens in order
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Position of the first token equal to `token`
    pub fn position(&self, token: &str) -> Option<usize> {
        self.0.iter().position(|t| t == token)
    }

    /// Copy of this command with a sub-action inserted after the program
    #[must_use]
    fn with_action(&self, action: Option<&str>) -> Self {
        let mut tokens = self.0.clone();
        if let Some(action) = action {
            tokens.insert(1.min(tokens.len()), action.to_string());
        }
        Self(tokens)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Inputs that select a port build
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Port name, e.g. `esp32`
    pub target: String,
    /// Binding checkout containing `ext_mod/`
    pub script_dir: PathBuf,
    /// Extra C flags passed as `LV_CFLAGS`
    pub cflags: Option<String>,
    /// Board passed as `BOARD`
    pub board: Option<String>,
    /// Arguments appended verbatim
    pub extra_args: Vec<String>,
    /// Parallel make jobs
    pub jobs: usize,
}

impl BuildRequest {
    /// Request for a target with defaults for everything else
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            script_dir: PathBuf::from(crate::config::defaults::DEFAULT_SCRIPT_DIR),
            cflags: None,
            board: None,
            extra_args: Vec::new(),
            jobs: num_cpus::get(),
        }
    }

    /// Set the script directory
    #[must_use]
    pub fn with_script_dir(mut self, script_dir: impl Into<PathBuf>) -> Self {
        self.script_dir = script_dir.into();
        self
    }

    /// Set the C flags
    #[must_use]
    pub fn with_cflags(mut self, cflags: Option<String>) -> Self {
        self.cflags = cflags;
        self
    }

    /// Set the board
    #[must_use]
    pub fn with_board(mut self, board: Option<String>) -> Self {
        self.board = board;
        self
    }

    /// Set the extra arguments
    #[must_use]
    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    /// Set the job count
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// C flags after target-specific adjustments
    ///
    /// `samd` cannot fit TinyTTF, so it is always disabled there.
    pub fn effective_cflags(&self) -> Option<String> {
        if self.target == TINY_TTF_TARGET {
            return Some(match &self.cflags {
                Some(flags) => format!("{flags} {TINY_TTF_DISABLE_FLAG}"),
                None => TINY_TTF_DISABLE_FLAG.to_string(),
            });
        }
        self.cflags.clone()
    }
}

/// The port commands derived from one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSet {
    /// `make clean ...`
    pub clean: CommandLine,
    /// `make ...`
    pub compile: CommandLine,
    /// `make submodules ...`
    pub submodules: CommandLine,
}

/// Assemble the port commands for a request
pub fn assemble(request: &BuildRequest) -> CommandSet {
    let base = base_command(request);
    tracing::debug!("Base command: {base}");

    CommandSet {
        clean: base.with_action(Some("clean")),
        compile: base.with_action(None),
        submodules: base.with_action(Some("submodules")),
    }
}

/// Tokens shared by every port command, without a sub-action
fn base_command(request: &BuildRequest) -> CommandLine {
    let mut tokens = vec![
        BUILD_TOOL.to_string(),
        format!("-j {}", request.jobs),
        "-C".to_string(),
        paths::port_dir(&request.target),
        format!("LV_PORT={}", request.target),
    ];

    let cflags = request.effective_cflags();
    if let Some(flags) = &cflags {
        tokens.push(format!("LV_CFLAGS=\"{flags}\""));
    }

    // BOARD follows LV_CFLAGS when present, otherwise LV_PORT; either way it
    // is the last token before USER_C_MODULES.
    if let Some(board) = &request.board {
        tokens.push(format!("BOARD={board}"));
    }

    tokens.push(format!(
        "USER_C_MODULES={}/ext_mod",
        request.script_dir.to_string_lossy()
    ));
    tokens.extend(request.extra_args.iter().cloned());

    CommandLine(tokens)
}

/// `make -C lib/micropython/mpy-cross`
pub fn mpy_cross_command() -> CommandLine {
    CommandLine::new([BUILD_TOOL, "-C", paths::MPY_CROSS_DIR])
}
