//! Loader settings layered by `ortho_config`.
//!
//! Values resolve from built-in defaults, then a TOML file, then
//! `ARCHIVIST_*` environment variables, then command-line flags. The file is
//! located through `--config-path`, `ARCHIVIST_CONFIG_PATH`, or the usual
//! `.archivist.toml` discovery.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::defaults::{
    default_current_format_version, default_extension, default_log_filter, default_log_format,
    default_minimum_format_version, default_plugin_dir,
};

/// How the CLI renders `tracing` events on stderr.
///
/// Accepts `json` or `compact`, case-insensitively, from every layer.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Flattened JSON objects.
    #[default]
    Json,
    /// Compact text lines.
    Compact,
}

/// Errors raised while resolving [`LoaderSettings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A layer could not be read or merged.
    #[error("failed to load configuration: {0}")]
    Load(Arc<OrthoError>),

    /// The archive format range is empty.
    #[error(
        "minimum_format_version ({minimum}) must not exceed current_format_version ({current})"
    )]
    InvalidFormatWindow {
        /// Configured minimum.
        minimum: u32,
        /// Configured current version.
        current: u32,
    },

    /// The archive extension is blank.
    #[error("extension must not be empty")]
    EmptyExtension,
}

/// Settings shared by hosts embedding the plugin loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ARCHIVIST")]
pub struct LoaderSettings {
    /// Directory scanned for plugin archives.
    #[ortho_config(default = default_plugin_dir())]
    plugin_dir: PathBuf,
    /// Archive file extension.
    #[ortho_config(default = default_extension().to_owned())]
    extension: String,
    /// Oldest accepted archive format version.
    #[ortho_config(default = default_minimum_format_version())]
    minimum_format_version: u32,
    /// Newest accepted archive format version.
    #[ortho_config(default = default_current_format_version())]
    current_format_version: u32,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter().to_owned())]
    log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    log_format: LogFormat,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            plugin_dir: default_plugin_dir(),
            extension: default_extension().to_owned(),
            minimum_format_version: default_minimum_format_version(),
            current_format_version: default_current_format_version(),
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
        }
    }
}

impl LoaderSettings {
    /// Resolves every layer using `args` as the command line, then validates
    /// the result.
    ///
    /// `args` starts with the program name and holds only settings flags.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Load`] when a layer fails to load, including
    /// every malformed file at once, and a validation error otherwise.
    pub fn from_args<I>(args: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::load_from_iter(args)
            .map_err(SettingsError::Load)?
            .validated()
    }

    /// Checks the settings for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidFormatWindow`] when the minimum format
    /// exceeds the current one and [`SettingsError::EmptyExtension`] when the
    /// extension is blank.
    pub fn validated(self) -> Result<Self, SettingsError> {
        if self.minimum_format_version > self.current_format_version {
            return Err(SettingsError::InvalidFormatWindow {
                minimum: self.minimum_format_version,
                current: self.current_format_version,
            });
        }
        if self.extension().trim().is_empty() {
            return Err(SettingsError::EmptyExtension);
        }
        Ok(self)
    }

    /// Directory scanned for plugin archives.
    #[must_use]
    pub fn plugin_dir(&self) -> &Path {
        self.plugin_dir.as_path()
    }

    /// File extension of plugin archives, without the leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    /// Oldest accepted archive format version.
    #[must_use]
    pub const fn minimum_format_version(&self) -> u32 {
        self.minimum_format_version
    }

    /// Newest accepted archive format version.
    #[must_use]
    pub const fn current_format_version(&self) -> u32 {
        self.current_format_version
    }

    /// `tracing` filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
