//! Errors raised by plugin registration and activation.
//!
//! Registration never fails outright: a [`RegistrationError`] is folded into
//! a degraded description. [`LoadError`] is returned by activation and
//! classified by [`LoadError::kind`] so hosts can separate caller bugs from
//! plugin defects.

use archivist_archive::{ArchiveError, InstantiateError, PluginId, PluginVersion};
use thiserror::Error;

use crate::description::PluginHandle;

/// Reasons an archive could not be registered as a usable plugin.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The archive could not be opened or read.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Another readable archive already provides this exact identity.
    #[error("plugin '{id}' version {version} is already provided by another archive")]
    Duplicate {
        /// Plugin id declared by both archives.
        id: PluginId,
        /// Version declared by both archives.
        version: PluginVersion,
    },
}

/// Broad classes of activation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// The caller passed a description this loader does not know.
    InvalidArgument,
    /// The plugin does not provide the requested capability.
    NotImplemented,
    /// The plugin provides the capability but failed to start.
    Activation,
}

/// Errors returned when activating a plugin.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The description was not registered with this loader.
    #[error("plugin registration {handle} is unknown to this loader")]
    UnknownArchive {
        /// Handle carried by the rejected description.
        handle: PluginHandle,
    },

    /// The plugin does not declare the capability.
    #[error("plugin '{plugin}' does not implement '{capability}'")]
    UnsupportedCapability {
        /// Plugin that was asked.
        plugin: PluginId,
        /// Requested capability.
        capability: &'static str,
    },

    /// The declared implementation type does not exist in the plugin module.
    #[error("plugin '{plugin}' declares '{type_name}' for '{capability}' but does not provide it")]
    TypeResolution {
        /// Plugin that was asked.
        plugin: PluginId,
        /// Implementation type named by the archive index.
        type_name: String,
        /// Requested capability.
        capability: &'static str,
    },

    /// The plugin module could not be materialised.
    #[error("plugin '{plugin}' payload could not be loaded: {source}")]
    Payload {
        /// Plugin that was asked.
        plugin: PluginId,
        /// Underlying archive error.
        #[source]
        source: ArchiveError,
    },

    /// The implementation type could not be instantiated.
    #[error("plugin '{plugin}' could not be activated: {source}")]
    Instantiate {
        /// Plugin that was asked.
        plugin: PluginId,
        /// Underlying instantiation error.
        #[source]
        source: InstantiateError,
    },
}

impl LoadError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> LoadErrorKind {
        match self {
            Self::UnknownArchive { .. } => LoadErrorKind::InvalidArgument,
            Self::UnsupportedCapability { .. }
            | Self::TypeResolution { .. }
            | Self::Instantiate {
                source:
                    InstantiateError::NotImplemented { .. } | InstantiateError::TypeMismatch { .. },
                ..
            } => LoadErrorKind::NotImplemented,
            Self::Payload { .. }
            | Self::Instantiate {
                source: InstantiateError::Constructor { .. },
                ..
            } => LoadErrorKind::Activation,
        }
    }
}
