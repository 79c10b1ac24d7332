//! Default configuration values

/// Build tool invoked for every port command
pub const BUILD_TOOL: &str = "make";

/// Default location of the binding checkout (holds `ext_mod/`, `driver/`, `utils/`)
pub const DEFAULT_SCRIPT_DIR: &str = ".";

/// Project configuration file name
pub const PROJECT_CONFIG_FILE: &str = "lvbuild.toml";

/// Global configuration file name (inside the `lvbuild` config directory)
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Include guard symbol wrapped around port HAL headers
pub const HEADER_GUARD: &str = "_MPHALPORT_H_";

/// Target whose build needs TinyTTF disabled
pub const TINY_TTF_TARGET: &str = "samd";

/// Flag disabling TinyTTF
pub const TINY_TTF_DISABLE_FLAG: &str = "-DLV_USE_TINY_TTF=0";

/// Milliseconds of silence after a trailing prompt byte before the child is
/// treated as sitting at a shell prompt
pub const PROMPT_IDLE_MS: u64 = 2000;

/// Trailing byte treated as "the child is waiting at a shell prompt"
#[cfg(windows)]
pub const SHELL_PROMPT: &[u8] = b">";

/// Trailing byte treated as "the child is waiting at a shell prompt"
#[cfg(not(windows))]
pub const SHELL_PROMPT: &[u8] = b"$";
