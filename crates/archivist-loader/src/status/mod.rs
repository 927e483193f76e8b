//! Installation status of a logical plugin.

/// Whether any version of a plugin id is installed.
///
/// One status exists per plugin id, not per version. Ids the loader has never
/// seen report [`PluginStatus::not_installed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PluginStatus {
    installed: bool,
}

impl PluginStatus {
    /// Status of an id with at least one successfully registered archive.
    #[must_use]
    pub const fn installed() -> Self {
        Self { installed: true }
    }

    /// Status synthesised for ids that were never registered.
    #[must_use]
    pub const fn not_installed() -> Self {
        Self { installed: false }
    }

    /// Returns `true` when the plugin is installed.
    #[must_use]
    pub const fn is_installed(self) -> bool {
        self.installed
    }
}
