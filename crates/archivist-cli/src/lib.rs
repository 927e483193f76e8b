//! Command-line inspector for Archivist plugin directories.
//!
//! `archivist list` shows which plugins the loader would make visible, which
//! readable archives it would hide, and which archives are broken.
//! `archivist inspect FILE` describes a single archive. The CLI links no
//! plugin modules, so it reports metadata only and never activates plugins.

mod cli;
mod config;
mod errors;
mod report;
pub mod telemetry;

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use archivist_archive::{ModuleCatalog, PackedArchiveOpener};
use archivist_config::LoaderSettings;
use archivist_loader::{FormatWindow, PluginArchiveLoader};
use clap::Parser;

use crate::cli::{Cli, Command, OutputFormat};
use crate::config::{OrthoSettingsLoader, SettingsLoader, split_arguments};
pub use crate::errors::AppError;
use crate::report::{Inspection, Listing};

type Loader = PluginArchiveLoader<PackedArchiveOpener>;

/// Runs the CLI using the provided arguments and IO handles.
///
/// Leading settings flags such as `--plugin-dir` are resolved together with
/// the settings file and `ARCHIVIST_*` environment variables; the rest of
/// the command line selects the command.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoSettingsLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: SettingsLoader,
{
    let arguments: Vec<OsString> = args.into_iter().collect();
    let split = split_arguments(&arguments);
    let cli = match Cli::try_parse_from(split.command) {
        Ok(cli) => cli,
        Err(error) if error.use_stderr() => {
            let _ = write!(stderr, "{}", error.render());
            return ExitCode::from(2);
        }
        Err(error) => {
            let _ = write!(stdout, "{}", error.render());
            return ExitCode::SUCCESS;
        }
    };

    match execute(&cli, loader, split.settings, stdout) {
        Ok(code) => code,
        Err(error) => {
            let _ = writeln!(stderr, "archivist: {error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W: Write, L: SettingsLoader>(
    cli: &Cli,
    settings_loader: &L,
    settings_args: Vec<OsString>,
    stdout: &mut W,
) -> Result<ExitCode, AppError> {
    let settings = settings_loader.load(settings_args)?;
    telemetry::initialise(&settings)?;

    let plugins = build_loader(&settings);
    match &cli.command {
        Command::List { format } => list(plugins, settings.plugin_dir(), *format, stdout),
        Command::Inspect { file, format } => inspect(plugins, file, *format, stdout),
    }
}

fn build_loader(settings: &LoaderSettings) -> Loader {
    let opener = PackedArchiveOpener::new(Arc::new(ModuleCatalog::new()));
    PluginArchiveLoader::new(opener)
        .with_format_window(FormatWindow::new(
            settings.minimum_format_version(),
            settings.current_format_version(),
        ))
        .with_extension(settings.extension())
}

fn list<W: Write>(
    mut loader: Loader,
    plugin_dir: &Path,
    format: OutputFormat,
    stdout: &mut W,
) -> Result<ExitCode, AppError> {
    loader.discover_in(plugin_dir);
    let listing = Listing::new(plugin_dir, &loader.all_plugins(), &loader.visible_plugins());
    listing.write(format, stdout)?;
    loader.dispose();
    Ok(ExitCode::SUCCESS)
}

/// Exits with failure when the archive cannot be read.
fn inspect<W: Write>(
    mut loader: Loader,
    file: &Path,
    format: OutputFormat,
    stdout: &mut W,
) -> Result<ExitCode, AppError> {
    let description = loader.reflect_path(file);
    let usable = loader
        .visible_plugins()
        .iter()
        .any(|d| d.handle() == description.handle());
    let installed = loader.status(Some(&description)).is_installed();
    Inspection::new(&description, usable, installed).write(format, stdout)?;
    loader.dispose();

    Ok(if description.is_degraded() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[cfg(test)]
mod tests;
