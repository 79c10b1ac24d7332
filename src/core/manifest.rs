//! Freeze manifest generation
//!
//! Writes `build/manifest.py`, the file MicroPython's build reads to decide
//! which Python modules are frozen into the firmware image. The generated
//! manifest includes the port's own manifest, an optional user manifest, and
//! one `freeze()` directive per extra file.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::paths;
use crate::core::header;
use crate::error::ManifestError;
use crate::infra::filesystem;

/// One line of a freeze manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    /// `include('<path>')`
    Include(String),
    /// `freeze('<dir>', '<file>')`
    Freeze { dir: String, file: String },
}

impl ManifestEntry {
    /// Freeze directive for a file path, split into directory and file name
    pub fn freeze(path: &Path) -> Self {
        let dir = path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = path.file_name().map_or_else(
            || path.to_string_lossy().into_owned(),
            |f| f.to_string_lossy().into_owned(),
        );
        Self::Freeze { dir, file }
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include(path) => write!(f, "include('{path}')"),
            Self::Freeze { dir, file } => write!(f, "freeze('{dir}', '{file}')"),
        }
    }
}

/// Render manifest entries as file content (newline separated, no trailing newline)
pub fn render(entries: &[ManifestEntry]) -> String {
    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate `build/manifest.py` under the project root
///
/// # Arguments
///
/// * `project_root` - Firmware checkout; relative paths are resolved against it
/// * `manifest_path` - Primary manifest, included by absolute path
/// * `frozen_manifest` - Optional secondary manifest, included as given
/// * `extra_files` - Files to freeze; each must exist
///
/// # Returns
///
/// Path of the written manifest. If any extra file is missing nothing is
/// written.
pub fn generate_manifest(
    project_root: &Path,
    manifest_path: &Path,
    frozen_manifest: Option<&Path>,
    extra_files: &[PathBuf],
) -> Result<PathBuf, ManifestError> {
    let build_dir = project_root.join(paths::BUILD_DIR);
    if !build_dir.exists() {
        filesystem::create_dir_all(&build_dir)?;
    }

    let mut entries = vec![ManifestEntry::Include(
        project_root.join(manifest_path).to_string_lossy().into_owned(),
    )];

    if let Some(frozen) = frozen_manifest {
        entries.push(ManifestEntry::Include(frozen.to_string_lossy().into_owned()));
    }

    for file in extra_files {
        tracing::debug!("Freezing {}", file.display());
        if !project_root.join(file).exists() {
            return Err(ManifestError::FreezeFileNotFound { path: file.clone() });
        }
        entries.push(ManifestEntry::freeze(file));
    }

    let output = project_root.join(paths::GENERATED_MANIFEST);
    filesystem::write_file(&output, &render(&entries))?;
    tracing::info!("Wrote {} ({} entries)", output.display(), entries.len());
    Ok(output)
}

/// Framework helpers frozen into every image, relative to the script directory
pub const FRAMEWORK_FILES: &[&str] = &[
    "driver/display/display_driver_framework.py",
    "driver/fs_driver.py",
    "utils/lv_utils.py",
];

/// Prepare the freeze manifest for a port
///
/// Patches the port header, checks the port's manifest exists, and freezes
/// the display driver framework helpers from `script_dir`. A relative
/// `script_dir` is resolved against `project_root` so the freeze entries stay
/// valid when read from `build/`.
pub fn build_manifest(
    project_root: &Path,
    target: &str,
    script_dir: &Path,
    frozen_manifest: Option<&Path>,
) -> Result<PathBuf, ManifestError> {
    header::ensure_header_guard(project_root, target)?;

    let port_manifest = paths::port_manifest(target);
    if !project_root.join(&port_manifest).exists() {
        return Err(ManifestError::PortManifestNotFound {
            path: port_manifest,
        });
    }

    let script_dir = paths::resolve(project_root, script_dir);
    let files: Vec<PathBuf> = FRAMEWORK_FILES.iter().map(|f| script_dir.join(f)).collect();
    generate_manifest(project_root, &port_manifest, frozen_manifest, &files)
}
