//! Separates settings flags from command tokens.
//!
//! Settings flags lead the command line and are handed to `ortho_config`
//! through [`LoaderSettings::from_args`]; the remaining tokens go to clap.

use std::ffi::{OsStr, OsString};

use archivist_config::{LoaderSettings, SettingsError};

/// Flags `ortho_config` understands for [`LoaderSettings`].
pub(crate) const SETTINGS_FLAGS: &[&str] = &[
    "--config-path",
    "--plugin-dir",
    "--extension",
    "--minimum-format-version",
    "--current-format-version",
    "--log-filter",
    "--log-format",
];

/// Source of loader settings for a CLI invocation.
pub(crate) trait SettingsLoader {
    /// Resolves settings from the leading settings flags in `args`.
    fn load(&self, args: Vec<OsString>) -> Result<LoaderSettings, SettingsError>;
}

/// Loader layering defaults, file, environment, and flags.
pub(crate) struct OrthoSettingsLoader;

impl SettingsLoader for OrthoSettingsLoader {
    fn load(&self, args: Vec<OsString>) -> Result<LoaderSettings, SettingsError> {
        LoaderSettings::from_args(args)
    }
}

/// Command line split at the first token that is not a settings flag.
///
/// Both halves start with the program name.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ArgumentSplit {
    pub(crate) settings: Vec<OsString>,
    pub(crate) command: Vec<OsString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Flag { takes_value: bool },
    Other,
}

fn classify(argument: &OsStr) -> Token {
    let text = argument.to_string_lossy();
    let (flag, inline) = text
        .split_once('=')
        .map_or((text.as_ref(), false), |(name, _)| (name, true));
    if SETTINGS_FLAGS.contains(&flag) {
        Token::Flag {
            takes_value: !inline,
        }
    } else {
        Token::Other
    }
}

pub(crate) fn split_arguments(args: &[OsString]) -> ArgumentSplit {
    let Some((program, mut rest)) = args.split_first() else {
        return ArgumentSplit {
            settings: Vec::new(),
            command: Vec::new(),
        };
    };

    let mut settings = vec![program.clone()];
    while let Some((first, tail)) = rest.split_first() {
        let Token::Flag { takes_value } = classify(first) else {
            break;
        };
        settings.push(first.clone());
        rest = tail;
        if takes_value && let Some((value, after)) = rest.split_first() {
            settings.push(value.clone());
            rest = after;
        }
    }

    let mut command = vec![program.clone()];
    command.extend(rest.iter().cloned());
    ArgumentSplit { settings, command }
}
