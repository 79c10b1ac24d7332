//! lvbuild - MicroPython + LVGL firmware build orchestrator
//!
//! This library prepares a MicroPython port for building with the LVGL
//! binding and drives the port's make build.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Build logic: header guard, freeze manifest, command assembly, orchestration
//! - [`infra`] - Infrastructure layer (filesystem, child processes, git, tool lookup)
//! - [`config`] - Paths and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
