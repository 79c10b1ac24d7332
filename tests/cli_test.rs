//! Integration tests for the lvbuild binary
//!
//! Build tools are replaced with scripts in `fake-bin/` so the tests exercise
//! command assembly, process spawning and exit code propagation end to end.

mod common;

use common::TestProject;
use predicates::prelude::*;

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================
// show
// ============================================

#[test]
fn test_show_samd_disables_tiny_ttf() {
    let project = TestProject::new();

    let output = project.run(&["show", "samd", "--jobs", "4"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(predicate::str::contains("LV_CFLAGS=\"-DLV_USE_TINY_TTF=0\"").eval(&text));
    assert!(predicate::str::contains(
        "make clean -j 4 -C lib/micropython/ports/samd LV_PORT=samd"
    )
    .eval(&text));
    assert!(predicate::str::contains("make -C lib/micropython/mpy-cross").eval(&text));
}

#[test]
fn test_show_json_lists_token_arrays() {
    let project = TestProject::new();

    let output = project.run(&[
        "--json", "show", "stm32", "--board", "PYBV11", "--cflags", "-DFOO", "--", "V=1",
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let compile: Vec<&str> = json["commands"]["compile"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap())
        .collect();
    let cflags = compile.iter().position(|t| *t == "LV_CFLAGS=\"-DFOO\"").unwrap();
    assert_eq!(compile[cflags + 1], "BOARD=PYBV11");
    assert_eq!(compile.last(), Some(&"V=1"));
    assert_eq!(json["commands"]["submodules"][1], "submodules");
}

#[test]
fn test_show_uses_project_settings() {
    let project = TestProject::new();
    project.create_file(
        "lvbuild.toml",
        "[build]\njobs = 3\nboard = \"FROM_CONFIG\"\nscript_dir = \"/opt/binding\"\n",
    );

    let output = project.run(&["-q", "show", "rp2"]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "make -j 3 -C lib/micropython/ports/rp2 LV_PORT=rp2 BOARD=FROM_CONFIG \
         USER_C_MODULES=/opt/binding/ext_mod"
    );
}

#[test]
fn test_invalid_settings_fail() {
    let project = TestProject::new();
    project.create_file("lvbuild.toml", "[build\n");

    let output = project.run(&["show", "rp2"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(predicate::str::contains("lvbuild.toml").eval(&stderr(&output)));
}

// ============================================
// manifest
// ============================================

#[test]
fn test_manifest_patches_header_and_writes_manifest() {
    let project = TestProject::new().with_port("esp8266", "esp_mphal.h");

    let output = project.run(&["manifest", "esp8266", "--frozen-manifest", "app/manifest.py"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let header = project.read_file("lib/micropython/ports/esp8266/esp_mphal.h");
    assert!(header.starts_with("#ifndef _MPHALPORT_H_\n#define _MPHALPORT_H_\n"));
    assert!(header.ends_with("#endif /* _MPHALPORT_H_ */\n"));

    let manifest = project.read_file("build/manifest.py");
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].ends_with("lib/micropython/ports/esp8266/boards/manifest.py')"));
    assert_eq!(lines[1], "include('app/manifest.py')");
    let root = project.path().canonicalize().unwrap();
    assert_eq!(
        lines[4],
        format!("freeze('{}', 'lv_utils.py')", root.join("utils").display())
    );
}

#[test]
fn test_manifest_twice_leaves_header_unchanged() {
    let project = TestProject::new().with_port("teensy", "teensy_hal.h");

    assert!(project.run(&["manifest", "teensy"]).status.success());
    let first = project.read_file("lib/micropython/ports/teensy/teensy_hal.h");
    assert!(project.run(&["manifest", "teensy"]).status.success());
    let second = project.read_file("lib/micropython/ports/teensy/teensy_hal.h");

    assert_eq!(first, second);
    assert_eq!(first.matches("#ifndef _MPHALPORT_H_").count(), 1);
}

#[test]
fn test_manifest_missing_header_fails() {
    let project = TestProject::new();

    let output = project.run(&["manifest", "rp2"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(predicate::str::contains("Port header not found").eval(&stderr(&output)));
    assert!(!project.file_exists("build/manifest.py"));
}

#[test]
fn test_manifest_missing_framework_file_fails_without_writing() {
    use assert_fs::prelude::*;

    let tree = assert_fs::TempDir::new().unwrap();
    tree.child("lib/micropython/ports/rp2/mphalport.h")
        .write_str(common::SAMPLE_HAL)
        .unwrap();
    tree.child("lib/micropython/ports/rp2/boards/manifest.py")
        .write_str("")
        .unwrap();
    tree.child("driver/fs_driver.py").write_str("").unwrap();

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_lvbuild"))
        .current_dir(tree.path())
        .env("XDG_CONFIG_HOME", tree.path().join("xdg"))
        .args(["manifest", "rp2"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(predicate::str::contains("File not found").eval(&stderr(&output)));
    tree.child("build/manifest.py")
        .assert(predicate::path::missing());
}

// ============================================
// build steps and exit codes
// ============================================

#[cfg(unix)]
#[test]
fn test_clean_propagates_make_exit_code() {
    let project = TestProject::new();
    project.fake_tool("make", "echo \"make: *** No rule to make target 'clean'\" >&2\nexit 7");

    let output = project.run(&["clean", "unix"]);

    assert_eq!(output.status.code(), Some(7));
    assert!(predicate::str::contains("No rule to make target").eval(&stderr(&output)));
}

#[cfg(unix)]
#[test]
fn test_failed_step_output_replayed_when_echo_disabled() {
    let project = TestProject::new();
    project.create_file("lvbuild.toml", "[process]\necho = false\n");
    project.fake_tool("make", "echo 'undefined reference to lv_init'\nexit 2");

    let output = project.run(&["compile", "rp2"]);

    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(predicate::str::contains("Output of the failed step").eval(&err));
    assert!(predicate::str::contains("undefined reference to lv_init").eval(&err));
}

#[cfg(unix)]
#[test]
fn test_compile_passes_arguments_to_make() {
    let project = TestProject::new();
    project.fake_tool("make", "echo \"$*\" > make-args.txt");

    let output = project.run(&[
        "compile", "esp32", "--jobs", "2", "--board", "ESP32_GENERIC", "--", "V=1",
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    let root = project.path().canonicalize().unwrap();
    assert_eq!(
        project.read_file("make-args.txt").trim(),
        format!(
            "-j 2 -C lib/micropython/ports/esp32 LV_PORT=esp32 BOARD=ESP32_GENERIC \
             USER_C_MODULES={}/ext_mod V=1",
            root.display()
        )
    );
}

#[cfg(unix)]
#[test]
fn test_fetch_propagates_git_failure() {
    let project = TestProject::new();
    project.fake_tool("git", "echo \"fatal: not a git repository\" >&2\nexit 128");

    let output = project.run(&["fetch", "lvgl"]);

    assert_eq!(output.status.code(), Some(128));
    assert!(predicate::str::contains("lib/lvgl").eval(&stderr(&output)));
}

/// Fake make that logs its call, enters the `-C` directory and fails unless
/// `USER_C_MODULES` names an existing directory from there
#[cfg(unix)]
const CHECKING_MAKE: &str = r#"echo "make $*" >> "$LVBUILD_TEST_LOG"
prev=
for arg in "$@"; do
  if [ "$prev" = "-C" ]; then cd "$arg" || exit 8; fi
  prev="$arg"
done
for arg in "$@"; do
  case "$arg" in USER_C_MODULES=*) [ -d "${arg#USER_C_MODULES=}" ] || exit 9;; esac
done"#;

#[cfg(unix)]
fn checking_make(project: &TestProject) -> String {
    let log = project.path().join("calls.log");
    CHECKING_MAKE.replace("$LVBUILD_TEST_LOG", &log.display().to_string())
}

#[cfg(unix)]
#[test]
fn test_full_build_with_fake_toolchain() {
    let project = TestProject::new().with_port("rp2", "mphalport.h");
    project.create_file("ext_mod/micropython.cmake", "");
    project.create_file("lib/micropython/mpy-cross/Makefile", "");
    project.fake_tool("git", "echo \"git $*\" >> calls.log");
    project.fake_tool("make", &checking_make(&project));

    let output = project.run(&["--json", "build", "rp2", "--jobs", "2", "--clean"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["steps"].as_array().unwrap().len(), 8);

    let calls = project.read_file("calls.log");
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(calls.len(), 7);
    assert!(calls[..3].iter().all(|c| c.starts_with("git submodule update --init -- lib/")));
    assert!(calls[6].contains("FROZEN_MANIFEST="));

    let manifest = project.read_file("build/manifest.py");
    let freeze_dirs: Vec<&str> = manifest
        .lines()
        .filter_map(|l| l.strip_prefix("freeze('"))
        .filter_map(|rest| rest.split('\'').next())
        .collect();
    assert_eq!(freeze_dirs.len(), 3);
    for dir in freeze_dirs {
        let dir = std::path::Path::new(dir);
        assert!(dir.is_absolute() && dir.is_dir(), "bad freeze dir {}", dir.display());
    }
}

#[cfg(unix)]
#[test]
fn test_build_fails_when_user_c_modules_missing() {
    let project = TestProject::new().with_port("rp2", "mphalport.h");
    project.create_file("lib/micropython/mpy-cross/Makefile", "");
    project.fake_tool("make", &checking_make(&project));

    let output = project.run(&["build", "rp2", "--skip-fetch"]);

    assert_eq!(output.status.code(), Some(9));
}

#[cfg(unix)]
#[test]
fn test_build_stops_when_step_fails() {
    let project = TestProject::new().with_port("rp2", "mphalport.h");
    project.fake_tool(
        "make",
        "echo \"make $*\" >> calls.log\ncase \"$*\" in *submodules*) exit 4;; esac",
    );

    let output = project.run(&["build", "rp2", "--skip-fetch"]);

    assert_eq!(output.status.code(), Some(4));
    let calls = project.read_file("calls.log");
    assert_eq!(calls.lines().count(), 2);
    assert!(calls.lines().last().unwrap().starts_with("make submodules"));
}

// ============================================
// doctor
// ============================================

#[test]
fn test_doctor_json_reports_checks() {
    let project = TestProject::new();

    let output = project.run(&["--json", "doctor"]);

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<&str> = json["checks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"git"));
    assert!(names.contains(&"make"));
}
