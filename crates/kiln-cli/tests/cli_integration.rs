//! CLI subprocess integration tests.
//!
//! These tests invoke the `kiln` binary as a subprocess and verify exit
//! codes, stdout content, and JSON output stability.

use std::process::Command;

fn kiln_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_kiln"))
}

fn write_request_file(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("kiln.toml");
    std::fs::write(
        &path,
        r#"version = "0.8.0"
platform = "linux"

[variants]
cuda = true
"#,
    )
    .unwrap();
    path
}

#[test]
fn cli_version_exits_zero() {
    let output = kiln_bin().arg("--version").output().unwrap();
    assert!(output.status.success(), "kiln --version must exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("kiln"),
        "version output must contain 'kiln': {stdout}"
    );
}

#[test]
fn cli_help_lists_commands() {
    let output = kiln_bin().arg("--help").output().unwrap();
    assert!(output.status.success(), "kiln --help must exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("flags"), "help must list 'flags' command");
    assert!(stdout.contains("plan"), "help must list 'plan' command");
}

#[test]
fn cli_info_shows_versions_and_variants() {
    let output = kiln_bin().arg("info").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tvm"));
    assert!(stdout.contains("0.8.0"));
    assert!(stdout.contains("cuda"));
    assert!(stdout.contains("C++14 support is required to build tvm"));
}

#[test]
fn cli_flags_json_emits_ordered_args() {
    let output = kiln_bin()
        .args(["--json", "flags", "--platform", "linux"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON");
    let args: Vec<&str> = payload["args"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(args.contains(&"-DUSE_SORT=ON"));
    assert!(args.contains(&"-DUSE_LLVM=ON"));
    assert!(args.contains(&"-DCMAKE_BUILD_TYPE=Release"));
    assert_eq!(payload["generator"], "Ninja");
    assert_eq!(payload["effective"]["USE_LLVM"], true);
    assert_eq!(payload["effective"]["CMAKE_BUILD_TYPE"], "Release");
}

#[test]
fn cli_flags_darwin_forces_metal_last() {
    let output = kiln_bin()
        .args(["--json", "flags", "--platform", "darwin", "~metal"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let args = payload["args"].as_array().unwrap();
    assert_eq!(args.last().unwrap(), "-DUSE_METAL=ON");
    // Last writer wins: the effective view reflects the forced override
    assert_eq!(payload["effective"]["USE_METAL"], true);
}

#[test]
fn cli_info_json_lists_build_dependencies() {
    let output = kiln_bin().args(["--json", "info"]).output().unwrap();
    assert!(output.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let build = payload["build_dependencies"].as_array().unwrap();
    assert!(build.iter().any(|v| v == "ninja"));
}

#[test]
fn cli_rejects_unknown_variant_with_request_exit_code() {
    let output = kiln_bin().args(["resolve", "+vulkan"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("vulkan"), "stderr: {stderr}");
}

#[test]
fn cli_rejects_enum_value_outside_domain() {
    let output = kiln_bin()
        .args(["resolve", "build_type=Profile"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_plan_writes_verifiable_lock_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("kiln.lock");

    let output = kiln_bin()
        .args([
            "--json",
            "plan",
            "--platform",
            "linux",
            "--out",
            &out.to_string_lossy(),
            "+cuda",
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(out.is_file());

    let verify = kiln_bin()
        .args(["verify", "--plan", &out.to_string_lossy()])
        .output()
        .unwrap();
    assert!(
        verify.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&verify.stderr)
    );
}

#[test]
fn cli_verify_fails_on_tampered_plan() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("kiln.lock");

    let output = kiln_bin()
        .args(["plan", "--platform", "linux", "--out", &out.to_string_lossy()])
        .output()
        .unwrap();
    assert!(output.status.success());

    // Flip a resolved variant without updating the stored plan_id
    let content = std::fs::read_to_string(&out).unwrap();
    assert!(content.contains("llvm = true"));
    std::fs::write(&out, content.replace("llvm = true", "llvm = false")).unwrap();

    let verify = kiln_bin()
        .args(["verify", "--plan", &out.to_string_lossy()])
        .output()
        .unwrap();
    assert_eq!(verify.status.code(), Some(3));
}

#[test]
fn cli_plan_identity_is_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let mut ids = Vec::new();
    for name in ["a.lock", "b.lock"] {
        let out = dir.path().join(name);
        let output = kiln_bin()
            .args([
                "--json",
                "plan",
                "--platform",
                "linux",
                "--out",
                &out.to_string_lossy(),
                "+rocm",
            ])
            .output()
            .unwrap();
        assert!(output.status.success());
        let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        ids.push(payload["plan_id"].as_str().unwrap().to_owned());
    }
    assert_eq!(ids[0], ids[1]);
}

#[test]
fn cli_request_file_is_honored() {
    let dir = tempfile::tempdir().unwrap();
    let request = write_request_file(dir.path());

    let output = kiln_bin()
        .args([
            "--json",
            "resolve",
            "--request",
            &request.to_string_lossy(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["platform"], "linux");
    assert_eq!(payload["variants"]["cuda"], true);
}

#[test]
fn cli_post_install_copies_bindings() {
    let source = tempfile::tempdir().unwrap();
    let platlib = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(source.path().join("python/tvm")).unwrap();
    std::fs::write(source.path().join("python/tvm/__init__.py"), "# init").unwrap();

    let output = kiln_bin()
        .args([
            "post-install",
            "--source",
            &source.path().to_string_lossy(),
            "--platlib",
            &platlib.path().to_string_lossy(),
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(platlib.path().join("tvm/__init__.py").is_file());
}

#[test]
fn cli_post_install_fails_without_bindings() {
    let source = tempfile::tempdir().unwrap();
    let platlib = tempfile::tempdir().unwrap();

    let output = kiln_bin()
        .args([
            "post-install",
            "--source",
            &source.path().to_string_lossy(),
            "--platlib",
            &platlib.path().to_string_lossy(),
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
