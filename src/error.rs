//! Error types for lvbuild
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Port header patching errors
#[derive(Error, Debug)]
pub enum HeaderError {
    /// Header file for the target does not exist
    #[error("Port header not found: {path}")]
    NotFound { path: PathBuf },

    /// Filesystem error while reading or rewriting the header
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Freeze manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The port's own manifest is missing
    #[error("Unable to locate manifest file \"{path}\"")]
    PortManifestNotFound { path: PathBuf },

    /// A file requested for freezing is missing
    #[error("File not found \"{path}\"")]
    FreezeFileNotFound { path: PathBuf },

    /// Header patch failed before the manifest could be written
    #[error(transparent)]
    Header(#[from] HeaderError),

    /// Filesystem error while writing the manifest
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Child process errors
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The shell could not be started
    #[error("Failed to spawn '{command}': {error}")]
    Spawn { command: String, error: String },

    /// Reading the child's pipes or waiting on it failed
    #[error("IO error while running '{command}': {error}")]
    Io { command: String, error: String },

    /// The child exited unsuccessfully
    ///
    /// `code` is `None` when the child was stopped by the prompt heuristic
    /// or terminated by a signal.
    #[error("{step} failed with exit code {}", code.map_or_else(|| "<none>".to_string(), |c| c.to_string()))]
    Failed {
        step: String,
        code: Option<i32>,
        output: String,
    },
}

impl ProcessError {
    /// Exit status the orchestrator should terminate with
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Failed { code: Some(code), .. } if *code != 0 => *code,
            _ => 1,
        }
    }

    /// Buffered child output, if the child ran
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Failed { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    Parse { path: PathBuf, error: String },
}

/// Top-level lvbuild error type
#[derive(Error, Debug)]
pub enum LvbuildError {
    /// Header error
    #[error("Header error: {0}")]
    Header(#[from] HeaderError),

    /// Manifest error
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Process error
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}

impl LvbuildError {
    /// Exit status for this error
    ///
    /// A failed child propagates its own code, everything else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Process(e) => e.exit_code(),
            _ => 1,
        }
    }
}
