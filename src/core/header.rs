//! Port header guard
//!
//! Some MicroPython ports ship their HAL header without an include guard,
//! which breaks once the binding includes it a second time. This module
//! wraps the header in `_MPHALPORT_H_` exactly once.

use std::path::{Path, PathBuf};

use crate::config::defaults::HEADER_GUARD;
use crate::config::paths;
use crate::error::HeaderError;
use crate::infra::filesystem;

/// Outcome of [`ensure_header_guard`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderPatch {
    /// The guard was added
    Patched(PathBuf),
    /// The guard was already present; the file was not touched
    AlreadyGuarded(PathBuf),
}

impl HeaderPatch {
    /// Path of the header that was inspected
    pub fn path(&self) -> &Path {
        match self {
            Self::Patched(p) | Self::AlreadyGuarded(p) => p,
        }
    }
}

/// Marker whose presence means the header is already guarded
pub fn guard_marker() -> String {
    format!("#ifndef {HEADER_GUARD}")
}

/// Wrap header text in the include guard
pub fn wrap_in_guard(content: &str) -> String {
    format!("#ifndef {HEADER_GUARD}\n#define {HEADER_GUARD}\n{content}\n#endif /* {HEADER_GUARD} */\n")
}

/// Ensure the target's port header carries the include guard
///
/// Safe to call any number of times: a guarded header is left byte-for-byte
/// unchanged.
pub fn ensure_header_guard(project_root: &Path, target: &str) -> Result<HeaderPatch, HeaderError> {
    let path = project_root.join(paths::port_header(target));
    if !path.exists() {
        return Err(HeaderError::NotFound { path });
    }

    let content = filesystem::read_file(&path)?;
    if content.contains(&guard_marker()) {
        tracing::debug!("{} already guarded", path.display());
        return Ok(HeaderPatch::AlreadyGuarded(path));
    }

    filesystem::write_file(&path, &wrap_in_guard(&content))?;
    tracing::info!("Added include guard to {}", path.display());
    Ok(HeaderPatch::Patched(path))
}
