//! Paths inside the firmware tree, relative to the project root

use std::path::{Component, Path, PathBuf};

/// MicroPython checkout
pub const MICROPYTHON_DIR: &str = "lib/micropython";

/// LVGL checkout
pub const LVGL_DIR: &str = "lib/lvgl";

/// pycparser checkout
pub const PYCPARSER_DIR: &str = "lib/pycparser";

/// mpy-cross sources
pub const MPY_CROSS_DIR: &str = "lib/micropython/mpy-cross";

/// Build output directory
pub const BUILD_DIR: &str = "build";

/// Generated freeze manifest
pub const GENERATED_MANIFEST: &str = "build/manifest.py";

/// Port directory for a target, e.g. `lib/micropython/ports/esp32`
pub fn port_dir(target: &str) -> String {
    format!("{MICROPYTHON_DIR}/ports/{target}")
}

/// Port HAL header for a target
///
/// Three ports ship their HAL under a bespoke name, every other port uses
/// `mphalport.h`.
pub fn port_header(target: &str) -> PathBuf {
    let file = match target {
        "esp8266" => "esp_mphal.h",
        "pic16bit" => "pic16bit_mphal.h",
        "teensy" => "teensy_hal.h",
        _ => "mphalport.h",
    };
    PathBuf::from(port_dir(target)).join(file)
}

/// Port's own freeze manifest
pub fn port_manifest(target: &str) -> PathBuf {
    let port = PathBuf::from(port_dir(target));
    if target == "teensy" {
        port.join("manifest.py")
    } else {
        port.join("boards").join("manifest.py")
    }
}

/// Absolute form of `path`, resolving a relative one against `root`
///
/// `.` components are dropped so `root` + `.` is just `root`. Make runs with
/// `-C <port dir>` and the freeze manifest lives in `build/`, so paths handed
/// to either must not be relative to the project root.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .fold(root.to_path_buf(), |acc, c| acc.join(c))
}
