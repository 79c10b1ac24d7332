//! Configuration and constants
//!
//! Fixed paths into the firmware tree and default values.

pub mod defaults;
pub mod paths;
