//! Core build logic
//!
//! # Submodules
//!
//! - [`header`] - Port header include guard
//! - [`manifest`] - Freeze manifest generation
//! - [`command`] - Make command assembly
//! - [`builder`] - Build orchestration
//! - [`config`] - Layered settings
//! - [`doctor`] - Dependency checks

pub mod builder;
pub mod command;
pub mod config;
pub mod doctor;
pub mod header;
pub mod manifest;
