//! CLI entrypoint for the Archivist plugin inspector.
//!
//! The binary delegates to [`archivist_cli::run`], which loads settings,
//! installs telemetry, and renders plugin listings.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    archivist_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
