//! Errors surfaced by the CLI.

use std::io;

use archivist_config::SettingsError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Failures that abort a CLI invocation.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings could not be loaded.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    /// Output could not be encoded as JSON.
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}
