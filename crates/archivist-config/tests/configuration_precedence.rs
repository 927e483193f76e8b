//! Behavioural tests for settings layering: defaults, file, env, CLI.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use archivist_config::{
    LoaderSettings, LogFormat, default_current_format_version, default_extension,
    default_log_filter, default_log_format, default_minimum_format_version, default_plugin_dir,
};
use once_cell::sync::Lazy;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const SETTINGS_ENV: &[&str] = &[
    "ARCHIVIST_CONFIG_PATH",
    "ARCHIVIST_PLUGIN_DIR",
    "ARCHIVIST_EXTENSION",
    "ARCHIVIST_MINIMUM_FORMAT_VERSION",
    "ARCHIVIST_CURRENT_FORMAT_VERSION",
    "ARCHIVIST_LOG_FILTER",
    "ARCHIVIST_LOG_FORMAT",
];

struct Harness {
    temp_dir: TempDir,
    file_lines: RefCell<Vec<String>>,
    cli_args: RefCell<Vec<OsString>>,
    env_overrides: RefCell<Vec<(String, Option<OsString>)>>,
    loaded: RefCell<Option<Result<LoaderSettings, String>>>,
    _env_lock: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let env_lock = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        let harness = Self {
            temp_dir,
            file_lines: RefCell::new(Vec::new()),
            cli_args: RefCell::new(vec![OsString::from("archivist")]),
            env_overrides: RefCell::new(Vec::new()),
            loaded: RefCell::new(None),
            _env_lock: env_lock,
        };
        for key in SETTINGS_ENV {
            harness.record_env(key);
            unsafe { std::env::remove_var(key) };
        }
        harness
    }

    fn record_env(&self, key: &str) {
        let previous = std::env::var_os(key);
        self.env_overrides
            .borrow_mut()
            .push((key.to_owned(), previous));
    }

    fn set_env(&self, key: &str, value: &str) {
        self.record_env(key);
        unsafe { std::env::set_var(key, value) };
    }

    fn settings_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("archivist.toml")
    }

    fn write_setting(&self, key: &str, value: &str) {
        let first = self.file_lines.borrow().is_empty();
        self.file_lines
            .borrow_mut()
            .push(format!("{key} = \"{value}\""));
        let contents = self.file_lines.borrow().join("\n");
        if let Err(error) = fs::write(self.settings_path(), contents) {
            panic!("failed to write settings: {error}");
        }
        if first {
            self.push_cli_arg("--config-path");
            self.push_cli_arg(self.settings_path());
        }
    }

    fn push_cli_arg(&self, arg: impl Into<OsString>) {
        self.cli_args.borrow_mut().push(arg.into());
    }

    fn settings(&self) -> LoaderSettings {
        if self.loaded.borrow().is_none() {
            let args = self.cli_args.borrow().clone();
            let outcome = LoaderSettings::from_args(args).map_err(|error| error.to_string());
            *self.loaded.borrow_mut() = Some(outcome);
        }
        match self.loaded.borrow().as_ref() {
            Some(Ok(settings)) => settings.clone(),
            Some(Err(error)) => panic!("settings failed to load: {error}"),
            None => panic!("settings were not loaded"),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let mut overrides = self.env_overrides.borrow_mut();
        while let Some((key, value)) = overrides.pop() {
            match value {
                Some(previous) => unsafe { std::env::set_var(&key, previous) },
                None => unsafe { std::env::remove_var(&key) },
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("a settings file setting the plugin directory to \"{dir}\"")]
fn given_file_plugin_dir(harness: &Harness, dir: String) {
    harness.write_setting("plugin_dir", &dir);
}

#[given("a settings file setting the log format to \"{format}\"")]
fn given_file_log_format(harness: &Harness, format: String) {
    harness.write_setting("log_format", &format);
}

#[given("the environment sets the plugin directory to \"{dir}\"")]
fn given_env_plugin_dir(harness: &Harness, dir: String) {
    harness.set_env("ARCHIVIST_PLUGIN_DIR", &dir);
}

#[when("the command line sets the plugin directory to \"{dir}\"")]
fn when_cli_plugin_dir(harness: &Harness, dir: String) {
    harness.push_cli_arg("--plugin-dir");
    harness.push_cli_arg(dir);
}

#[when("the settings load without overrides")]
fn when_load_without_overrides(harness: &Harness) {
    let _settings = harness.settings();
}

#[then("loading the settings applies the built-in defaults")]
fn then_defaults_applied(harness: &Harness) {
    let settings = harness.settings();
    assert_eq!(settings.plugin_dir(), default_plugin_dir().as_path());
    assert_eq!(settings.extension(), default_extension());
    assert_eq!(
        settings.minimum_format_version(),
        default_minimum_format_version()
    );
    assert_eq!(
        settings.current_format_version(),
        default_current_format_version()
    );
    assert_eq!(settings.log_filter(), default_log_filter());
    assert_eq!(settings.log_format(), default_log_format());
    assert_eq!(settings, LoaderSettings::default());
}

#[then("loading the settings resolves the plugin directory to \"{dir}\"")]
fn then_plugin_dir(harness: &Harness, dir: String) {
    assert_eq!(harness.settings().plugin_dir(), Path::new(&dir));
}

#[then("loading the settings resolves the log format to \"{format}\"")]
fn then_log_format(harness: &Harness, format: String) {
    let expected: LogFormat = match format.parse() {
        Ok(parsed) => parsed,
        Err(error) => panic!("invalid expected format '{format}': {error}"),
    };
    assert_eq!(harness.settings().log_format(), expected);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Built-in defaults apply without overrides"
)]
fn defaults_apply(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "The settings file overrides the defaults"
)]
fn file_overrides_defaults(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "The environment overrides the settings file"
)]
fn environment_overrides_file(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "The command line overrides the environment"
)]
fn command_line_overrides_environment(#[from(harness)] harness: Harness) {
    let _ = harness;
}
