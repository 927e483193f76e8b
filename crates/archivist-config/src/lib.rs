//! Shared configuration for Archivist hosts.
//!
//! [`LoaderSettings`] gathers the plugin directory, archive extension,
//! accepted archive format range, and logging preferences. `ortho_config`
//! merges defaults, a TOML file, `ARCHIVIST_*` environment variables, and
//! command-line flags, later layers winning.

mod defaults;
mod settings;

pub use defaults::{
    DEFAULT_LOG_FILTER, default_current_format_version, default_extension, default_log_filter,
    default_log_format, default_minimum_format_version, default_plugin_dir,
};
pub use settings::{LoaderSettings, LogFormat, SettingsError};
