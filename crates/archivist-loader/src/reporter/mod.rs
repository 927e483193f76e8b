//! Structured reporting for loader events.
//!
//! The loader never logs directly. It reports to a [`LoaderReporter`], which
//! defaults to [`TracingReporter`]. Tests substitute recording reporters to
//! assert on events without capturing log output.

use std::io;
use std::path::Path;
use std::sync::Arc;

use archivist_archive::PluginId;

use crate::description::PluginDescription;
use crate::error::LoadError;

/// Observer notified of discovery, registration, and activation events.
pub trait LoaderReporter: Send + Sync {
    /// Invoked before a directory is scanned for archives.
    fn discovery_started(&self, directory: &Path);

    /// Invoked when the plugin directory does not exist.
    fn discovery_skipped(&self, directory: &Path);

    /// Invoked when the plugin directory exists but cannot be listed.
    fn discovery_failed(&self, directory: &Path, error: &io::Error);

    /// Invoked after a readable archive is registered.
    fn plugin_registered(&self, description: &PluginDescription);

    /// Invoked after an unreadable archive is registered as degraded.
    fn plugin_degraded(&self, description: &PluginDescription);

    /// Invoked when a declared type is missing from a plugin module.
    fn type_unresolved(&self, plugin: &PluginId, type_name: &str);

    /// Invoked when a declared serialisable type exists in a plugin module
    /// but was not registered there as serialisable.
    fn type_not_serializable(&self, plugin: &PluginId, type_name: &str);

    /// Invoked when a plugin fails to activate during a batch or type scan.
    fn activation_failed(&self, plugin: &PluginId, error: &LoadError);

    /// Invoked before all plugins implementing `capability` are activated.
    fn batch_started(&self, capability: &str);

    /// Invoked after a batch activation, with the number of live instances.
    fn batch_finished(&self, capability: &str, activated: usize);

    /// Invoked when the loader releases its archives.
    fn disposed(&self, released: usize);
}

impl<T> LoaderReporter for Arc<T>
where
    T: LoaderReporter + ?Sized,
{
    fn discovery_started(&self, directory: &Path) {
        (**self).discovery_started(directory);
    }

    fn discovery_skipped(&self, directory: &Path) {
        (**self).discovery_skipped(directory);
    }

    fn discovery_failed(&self, directory: &Path, error: &io::Error) {
        (**self).discovery_failed(directory, error);
    }

    fn plugin_registered(&self, description: &PluginDescription) {
        (**self).plugin_registered(description);
    }

    fn plugin_degraded(&self, description: &PluginDescription) {
        (**self).plugin_degraded(description);
    }

    fn type_unresolved(&self, plugin: &PluginId, type_name: &str) {
        (**self).type_unresolved(plugin, type_name);
    }

    fn type_not_serializable(&self, plugin: &PluginId, type_name: &str) {
        (**self).type_not_serializable(plugin, type_name);
    }

    fn activation_failed(&self, plugin: &PluginId, error: &LoadError) {
        (**self).activation_failed(plugin, error);
    }

    fn batch_started(&self, capability: &str) {
        (**self).batch_started(capability);
    }

    fn batch_finished(&self, capability: &str, activated: usize) {
        (**self).batch_finished(capability, activated);
    }

    fn disposed(&self, released: usize) {
        (**self).disposed(released);
    }
}

/// Default reporter that records loader events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TracingReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LoaderReporter for TracingReporter {
    fn discovery_started(&self, directory: &Path) {
        tracing::info!(
            target: "archivist::loader",
            event = "discovery_started",
            directory = %directory.display(),
            "loading plugins"
        );
    }

    fn discovery_skipped(&self, directory: &Path) {
        tracing::warn!(
            target: "archivist::loader",
            event = "discovery_skipped",
            directory = %directory.display(),
            "plugin directory does not exist; no plugins will be loaded"
        );
    }

    fn discovery_failed(&self, directory: &Path, error: &io::Error) {
        tracing::error!(
            target: "archivist::loader",
            event = "discovery_failed",
            directory = %directory.display(),
            error = %error,
            "failed to list plugin directory"
        );
    }

    fn plugin_registered(&self, description: &PluginDescription) {
        tracing::info!(
            target: "archivist::loader",
            event = "plugin_registered",
            plugin = %description.id(),
            version = %description.version(),
            handle = %description.handle(),
            "registered plugin"
        );
    }

    fn plugin_degraded(&self, description: &PluginDescription) {
        tracing::error!(
            target: "archivist::loader",
            event = "plugin_degraded",
            plugin = %description.id(),
            path = ?description.file_path(),
            error = description.error().unwrap_or_default(),
            "plugin archive could not be loaded"
        );
    }

    fn type_unresolved(&self, plugin: &PluginId, type_name: &str) {
        tracing::warn!(
            target: "archivist::loader",
            event = "type_unresolved",
            plugin = %plugin,
            type_name,
            "plugin module does not provide declared type"
        );
    }

    fn type_not_serializable(&self, plugin: &PluginId, type_name: &str) {
        tracing::warn!(
            target: "archivist::loader",
            event = "type_not_serializable",
            plugin = %plugin,
            type_name,
            "declared type is not registered as serialisable"
        );
    }

    fn activation_failed(&self, plugin: &PluginId, error: &LoadError) {
        tracing::error!(
            target: "archivist::loader",
            event = "activation_failed",
            plugin = %plugin,
            kind = ?error.kind(),
            error = %error,
            "plugin could not be activated"
        );
    }

    fn batch_started(&self, capability: &str) {
        tracing::info!(
            target: "archivist::loader",
            event = "batch_started",
            capability,
            "loading plugins implementing capability"
        );
    }

    fn batch_finished(&self, capability: &str, activated: usize) {
        tracing::info!(
            target: "archivist::loader",
            event = "batch_finished",
            capability,
            activated,
            "loaded plugins"
        );
    }

    fn disposed(&self, released: usize) {
        tracing::debug!(
            target: "archivist::loader",
            event = "disposed",
            released,
            "released plugin archives"
        );
    }
}
