//! Unit tests for the CLI runner.

use std::cell::RefCell;
use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;

use archivist_archive::fixture::ArchiveWriter;
use archivist_archive::{ArchiveIndex, PluginVersion};
use archivist_config::{LoaderSettings, SettingsError};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::{run, run_with_loader};
use crate::config::SettingsLoader;

struct Outcome {
    code: ExitCode,
    stdout: String,
    stderr: String,
}

fn invoke(args: &[&str]) -> Outcome {
    let argv: Vec<OsString> = std::iter::once("archivist")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run(argv, &mut stdout, &mut stderr);
    Outcome {
        code,
        stdout: String::from_utf8(stdout).expect("utf-8 stdout"),
        stderr: String::from_utf8(stderr).expect("utf-8 stderr"),
    }
}

fn write_plugin(dir: &Path, file_name: &str, id: &str, version: PluginVersion, format: u32) {
    let index =
        ArchiveIndex::new(id, format!("{id} plugin"), version, format).with_author("Acme");
    ArchiveWriter::new(&index)
        .expect("index")
        .write_to(&dir.join(file_name))
        .expect("write archive");
}

#[fixture]
fn plugin_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    write_plugin(dir.path(), "A.1.0.plugin", "A", PluginVersion::new(1, 0, 0), 2);
    write_plugin(dir.path(), "A.2.0.plugin", "A", PluginVersion::new(2, 0, 0), 9);
    std::fs::write(dir.path().join("Broken.1.2.plugin"), b"junk").expect("write junk");
    dir
}

fn path_arg(dir: &TempDir) -> &str {
    dir.path().to_str().expect("utf-8 temp path")
}

#[rstest]
fn list_groups_plugins(plugin_dir: TempDir) {
    let outcome = invoke(&["--plugin-dir", path_arg(&plugin_dir), "list"]);

    assert_eq!(outcome.code, ExitCode::SUCCESS, "{}", outcome.stderr);
    let text = &outcome.stdout;
    assert!(text.contains("Visible plugins:\n  A 1.0.0  A plugin (Acme)"), "{text}");
    assert!(text.contains("Hidden plugins:\n  A 2.0.0"), "{text}");
    assert!(
        text.contains("Unavailable plugins:\n  Broken 1.2.0  The plugin couldn't be loaded"),
        "{text}"
    );
}

#[rstest]
fn list_renders_json(plugin_dir: TempDir) {
    let dir = path_arg(&plugin_dir);
    let outcome = invoke(&["--plugin-dir", dir, "list", "--format", "json"]);

    assert_eq!(outcome.code, ExitCode::SUCCESS, "{}", outcome.stderr);
    let document: serde_json::Value = serde_json::from_str(&outcome.stdout).expect("valid json");
    assert_eq!(document["visible"].as_array().map(Vec::len), Some(1));
    assert_eq!(document["visible"][0]["version"], "1.0.0");
    assert_eq!(document["hidden"][0]["version"], "2.0.0");
    assert_eq!(document["degraded"][0]["id"], "Broken");
}

#[test]
fn list_of_missing_directory_is_empty() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("absent");
    let outcome = invoke(&["--plugin-dir", missing.to_str().expect("utf-8"), "list"]);

    assert_eq!(outcome.code, ExitCode::SUCCESS);
    assert!(outcome.stdout.starts_with("No plugins found in "), "{}", outcome.stdout);
}

#[rstest]
fn inspect_describes_readable_archive(plugin_dir: TempDir) {
    let file = plugin_dir.path().join("A.1.0.plugin");
    let outcome = invoke(&["inspect", file.to_str().expect("utf-8")]);

    assert_eq!(outcome.code, ExitCode::SUCCESS, "{}", outcome.stderr);
    assert!(outcome.stdout.contains("id: A\n"));
    assert!(outcome.stdout.contains("usable: yes\n"));
    assert!(outcome.stdout.contains("installed: yes\n"));
    assert!(outcome.stdout.contains("capabilities: none\n"));
}

#[rstest]
fn inspect_flags_incompatible_archive(plugin_dir: TempDir) {
    let file = plugin_dir.path().join("A.2.0.plugin");
    let path = file.to_str().expect("utf-8");
    let outcome = invoke(&["inspect", path, "--format", "json"]);

    assert_eq!(outcome.code, ExitCode::SUCCESS);
    let document: serde_json::Value = serde_json::from_str(&outcome.stdout).expect("valid json");
    assert_eq!(document["usable"], false);
    assert_eq!(document["installed"], true);
}

#[rstest]
fn inspect_of_corrupt_archive_fails(plugin_dir: TempDir) {
    let file = plugin_dir.path().join("Broken.1.2.plugin");
    let outcome = invoke(&["inspect", file.to_str().expect("utf-8")]);

    assert_eq!(outcome.code, ExitCode::FAILURE);
    assert!(outcome.stdout.contains("error: The plugin couldn't be loaded"));
}

#[test]
fn invalid_settings_flag_is_reported() {
    let outcome = invoke(&["--extension", ".", "list"]);

    assert_eq!(outcome.code, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("extension must not be empty"), "{}", outcome.stderr);
}

#[test]
fn settings_file_is_layered_under_flags() {
    let dir = TempDir::new().expect("temp dir");
    let from_file = dir.path().join("from-file");
    let config = dir.path().join("archivist.toml");
    std::fs::write(
        &config,
        format!("plugin_dir = \"{}\"\n", from_file.display()),
    )
    .expect("write settings");
    let config_arg = config.to_str().expect("utf-8");

    let from_settings = invoke(&["--config-path", config_arg, "list"]);
    assert!(
        from_settings.stdout.contains("from-file"),
        "{}",
        from_settings.stdout
    );

    let flagged = dir.path().join("from-flag");
    let flag_arg = flagged.to_str().expect("utf-8");
    let overridden = invoke(&["--config-path", config_arg, "--plugin-dir", flag_arg, "list"]);
    assert!(overridden.stdout.contains("from-flag"), "{}", overridden.stdout);
}

struct RejectingLoader {
    seen: RefCell<Vec<OsString>>,
}

impl SettingsLoader for RejectingLoader {
    fn load(&self, args: Vec<OsString>) -> Result<LoaderSettings, SettingsError> {
        *self.seen.borrow_mut() = args;
        Err(SettingsError::EmptyExtension)
    }
}

#[test]
fn settings_loader_receives_only_settings_flags() {
    let loader = RejectingLoader {
        seen: RefCell::new(Vec::new()),
    };
    let argv = ["archivist", "--log-filter", "debug", "inspect", "A.plugin"].map(OsString::from);
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let code = run_with_loader(argv, &mut stdout, &mut stderr, &loader);

    assert_eq!(code, ExitCode::FAILURE);
    assert!(stdout.is_empty());
    assert_eq!(
        *loader.seen.borrow(),
        ["archivist", "--log-filter", "debug"].map(OsString::from)
    );
    let message = String::from_utf8(stderr).expect("utf-8 stderr");
    assert_eq!(message, "archivist: extension must not be empty\n");
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let outcome = invoke(&[]);
    assert_eq!(outcome.code, ExitCode::from(2));
    assert!(outcome.stderr.contains("Usage"), "{}", outcome.stderr);
}
