//! CLI implementation for `lvbuild show`
//!
//! Prints the assembled make commands so they can be inspected or run by
//! hand.

use std::path::Path;

use anyhow::Result;

use super::{load_settings, TargetArgs};
use crate::cli::output::{is_json, is_quiet};
use crate::core::command::{assemble, mpy_cross_command};

/// Execute the show command
pub fn execute(project_dir: &Path, target: &TargetArgs) -> Result<()> {
    let settings = load_settings(project_dir)?;
    let commands = assemble(&target.request(project_dir, &settings));
    let mpy_cross = mpy_cross_command();

    if is_json() {
        let json = serde_json::json!({
            "target": target.target,
            "mpy_cross": mpy_cross,
            "commands": commands,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    if is_quiet() {
        println!("{}", commands.compile);
        return Ok(());
    }

    println!("mpy-cross:  {mpy_cross}");
    println!("submodules: {}", commands.submodules);
    println!("clean:      {}", commands.clean);
    println!("compile:    {}", commands.compile);
    Ok(())
}
