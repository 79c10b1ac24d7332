//! External tool discovery
//!
//! Locates the tools the build shells out to.

use std::path::{Path, PathBuf};

/// Find a tool on `PATH`
pub fn locate(tool: &str) -> Option<PathBuf> {
    which::which(tool).ok()
}

/// First line of `<tool> --version`, if the tool runs successfully
pub fn version(tool: &Path) -> Option<String> {
    let output = std::process::Command::new(tool)
        .arg("--version")
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(String::from)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_locate_shell() {
        assert!(locate("sh").is_some());
    }

    #[test]
    fn test_locate_missing_tool() {
        assert!(locate("lvbuild-no-such-tool").is_none());
    }
}
