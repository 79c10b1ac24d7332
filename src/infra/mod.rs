//! Infrastructure layer
//!
//! Handles all I/O operations: filesystem, child processes and tool lookup.

pub mod filesystem;
pub mod git;
pub mod process;
pub mod toolchain;
