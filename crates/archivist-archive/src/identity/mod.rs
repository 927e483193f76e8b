//! Logical plugin identity and version numbers.
//!
//! A plugin is identified by a stable [`PluginId`] shared across all of its
//! releases. Each release carries a [`PluginVersion`]; several versions of
//! the same id may sit side by side in a plugin directory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VersionParseError;

const UNKNOWN_ID: &str = "Unknown";
const MAX_COMPONENTS: usize = 4;

/// Stable identity shared by every version of one plugin.
///
/// # Example
///
/// ```
/// use archivist_archive::PluginId;
///
/// let id = PluginId::new("Acme.Events");
/// assert_eq!(id.as_str(), "Acme.Events");
/// assert_eq!(PluginId::unknown().as_str(), "Unknown");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(String);

impl PluginId {
    /// Creates an id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Sentinel id used when an archive's identity cannot be inferred.
    #[must_use]
    pub fn unknown() -> Self {
        Self(String::from(UNKNOWN_ID))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Release number of a plugin archive.
///
/// Versions hold up to four numeric components
/// (`major.minor[.patch[.build]]`); absent trailing components are zero.
/// Ordering is numeric and component-wise, so `1.10` sorts after `1.9`.
///
/// # Example
///
/// ```
/// use archivist_archive::PluginVersion;
///
/// let older: PluginVersion = "1.9".parse().unwrap();
/// let newer: PluginVersion = "1.10".parse().unwrap();
/// assert!(newer > older);
/// assert_eq!(newer.to_string(), "1.10.0");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct PluginVersion {
    major: u32,
    minor: u32,
    patch: u32,
    build: u32,
}

impl PluginVersion {
    /// Sentinel version used when no version can be inferred.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Creates a three-component version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build: 0,
        }
    }

    /// Sets the fourth (build) component.
    #[must_use]
    pub const fn with_build(mut self, build: u32) -> Self {
        self.build = build;
        self
    }

    /// Returns the major component.
    #[must_use]
    pub const fn major(self) -> u32 {
        self.major
    }

    /// Returns the minor component.
    #[must_use]
    pub const fn minor(self) -> u32 {
        self.minor
    }

    /// Returns the patch component.
    #[must_use]
    pub const fn patch(self) -> u32 {
        self.patch
    }

    /// Returns the build component.
    #[must_use]
    pub const fn build(self) -> u32 {
        self.build
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.build != 0 {
            write!(f, ".{}", self.build)?;
        }
        Ok(())
    }
}

impl FromStr for PluginVersion {
    type Err = VersionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionParseError {
            input: input.to_owned(),
        };

        let mut components = [0_u32; MAX_COMPONENTS];
        let mut count = 0_usize;
        for part in input.split('.') {
            let slot = components.get_mut(count).ok_or_else(invalid)?;
            *slot = part.parse().map_err(|_| invalid())?;
            count += 1;
        }

        let [major, minor, patch, build] = components;
        Ok(Self::new(major, minor, patch).with_build(build))
    }
}

impl TryFrom<String> for PluginVersion {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PluginVersion> for String {
    fn from(value: PluginVersion) -> Self {
        value.to_string()
    }
}
