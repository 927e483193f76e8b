use std::env;
use std::path::PathBuf;

use archivist_archive::{
    CURRENT_ARCHIVE_VERSION, MINIMUM_SUPPORTED_ARCHIVE_VERSION, PLUGIN_EXTENSION,
};

use crate::settings::LogFormat;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default archive file extension.
#[must_use]
pub const fn default_extension() -> &'static str {
    PLUGIN_EXTENSION
}

/// Oldest archive format accepted by default.
#[must_use]
pub const fn default_minimum_format_version() -> u32 {
    MINIMUM_SUPPORTED_ARCHIVE_VERSION
}

/// Newest archive format accepted by default.
#[must_use]
pub const fn default_current_format_version() -> u32 {
    CURRENT_ARCHIVE_VERSION
}

/// Default plugin directory: `archivist/plugins` under the user data
/// directory, or under the temporary directory when there is none.
#[must_use]
pub fn default_plugin_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join("archivist")
        .join("plugins")
}
