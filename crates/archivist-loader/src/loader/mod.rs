//! The plugin archive loader.
//!
//! [`PluginArchiveLoader`] owns every archive it registers together with the
//! per-id installation status. Registration never fails: unreadable archives
//! are kept as degraded descriptions so hosts can show why a plugin is
//! missing. Queries recompute the visible set on each call, so a newly
//! registered version supersedes an older one immediately.
//!
//! Mutation (`discover`, `reflect_*`, `dispose`) takes `&mut self`; queries
//! and activation take `&self` and may run concurrently. A module payload is
//! materialised at most once per archive.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Read};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use archivist_archive::{
    ArchiveError, ArchiveOpener, Capability, PLUGIN_EXTENSION, PluginArchive, PluginId,
    PluginModule, TypeDescriptor,
};
use once_cell::sync::OnceCell;

use crate::compat::FormatWindow;
use crate::description::{PluginDescription, PluginHandle};
use crate::discovery::{FileEnumerator, StdFileEnumerator};
use crate::error::{LoadError, RegistrationError};
use crate::reporter::{LoaderReporter, TracingReporter};
use crate::selection::{Candidate, select_visible};
use crate::status::PluginStatus;

/// A serialisable type resolved inside a plugin module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedType {
    plugin: PluginHandle,
    descriptor: TypeDescriptor,
}

impl ResolvedType {
    /// Registration that provided the type.
    #[must_use]
    pub const fn plugin(self) -> PluginHandle {
        self.plugin
    }

    /// Runtime descriptor of the type.
    #[must_use]
    pub const fn descriptor(self) -> TypeDescriptor {
        self.descriptor
    }
}

struct OpenArchive {
    archive: Mutex<Box<dyn PluginArchive>>,
    format_version: u32,
    module: OnceCell<PluginModule>,
}

impl OpenArchive {
    fn new(archive: Box<dyn PluginArchive>) -> Self {
        let format_version = archive.index().archive_format_version();
        Self {
            archive: Mutex::new(archive),
            format_version,
            module: OnceCell::new(),
        }
    }

    fn module(&self) -> Result<&PluginModule, ArchiveError> {
        self.module.get_or_try_init(|| {
            self.archive
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .load_payload()
        })
    }
}

enum ArchiveSlot {
    Open(OpenArchive),
    /// Stand-in for archives that could not be read.
    Empty,
}

impl ArchiveSlot {
    const fn open(&self) -> Option<&OpenArchive> {
        match self {
            Self::Open(archive) => Some(archive),
            Self::Empty => None,
        }
    }
}

struct Registration {
    description: PluginDescription,
    slot: ArchiveSlot,
}

/// Discovers plugin archives and activates the plugins they contain.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use std::sync::Arc;
/// use archivist_archive::{ModuleCatalog, PackedArchiveOpener};
/// use archivist_loader::PluginArchiveLoader;
///
/// let opener = PackedArchiveOpener::new(Arc::new(ModuleCatalog::new()));
/// let loader = PluginArchiveLoader::from_directory(opener, Path::new("/no/such/plugins"));
/// assert!(loader.visible_plugins().is_empty());
/// ```
pub struct PluginArchiveLoader<O, R = TracingReporter> {
    opener: O,
    reporter: R,
    window: FormatWindow,
    extension: String,
    registrations: BTreeMap<PluginHandle, Registration>,
    statuses: HashMap<PluginId, PluginStatus>,
}

impl<O: ArchiveOpener> PluginArchiveLoader<O> {
    /// Creates an empty loader reporting through `tracing`.
    #[must_use]
    pub fn new(opener: O) -> Self {
        Self {
            opener,
            reporter: TracingReporter::new(),
            window: FormatWindow::default(),
            extension: String::from(PLUGIN_EXTENSION),
            registrations: BTreeMap::new(),
            statuses: HashMap::new(),
        }
    }

    /// Creates a loader and registers every archive in `directory`.
    ///
    /// Discovery runs synchronously to completion before this returns.
    #[must_use]
    pub fn from_directory(opener: O, directory: &Path) -> Self {
        let mut loader = Self::new(opener);
        loader.discover_in(directory);
        loader
    }
}

impl<O, R> PluginArchiveLoader<O, R>
where
    O: ArchiveOpener,
    R: LoaderReporter,
{
    /// Replaces the reporter.
    #[must_use]
    pub fn with_reporter<R2: LoaderReporter>(self, reporter: R2) -> PluginArchiveLoader<O, R2> {
        PluginArchiveLoader {
            opener: self.opener,
            reporter,
            window: self.window,
            extension: self.extension,
            registrations: self.registrations,
            statuses: self.statuses,
        }
    }

    /// Replaces the accepted archive format range.
    #[must_use]
    pub const fn with_format_window(mut self, window: FormatWindow) -> Self {
        self.window = window;
        self
    }

    /// Replaces the file extension used during discovery.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Returns the accepted archive format range.
    #[must_use]
    pub const fn format_window(&self) -> FormatWindow {
        self.window
    }

    /// Registers every archive in `directory` using the file system.
    ///
    /// Returns the number of archives registered, degraded ones included.
    pub fn discover_in(&mut self, directory: &Path) -> usize {
        self.discover(directory, &StdFileEnumerator)
    }

    /// Registers every archive `enumerator` lists in `directory`.
    ///
    /// A missing directory is reported as skipped; any other listing failure
    /// is reported as failed. Neither is returned to the caller, and a bad
    /// archive never stops the remaining ones from registering.
    pub fn discover(&mut self, directory: &Path, enumerator: &dyn FileEnumerator) -> usize {
        self.reporter.discovery_started(directory);
        let paths = match enumerator.list_files(directory, &self.extension) {
            Ok(paths) => paths,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                self.reporter.discovery_skipped(directory);
                return 0;
            }
            Err(error) => {
                self.reporter.discovery_failed(directory, &error);
                return 0;
            }
        };

        for path in &paths {
            self.reflect_path(path);
        }
        paths.len()
    }

    /// Registers the archive at `path` and returns its description.
    pub fn reflect_path(&mut self, path: &Path) -> PluginDescription {
        let opened = self.opener.open_path(path);
        self.register(Some(path), opened)
    }

    /// Registers an archive read from `reader` and returns its description.
    ///
    /// The reader is borrowed: pass `&mut stream` to keep using it afterwards
    /// or a temporary to have it dropped once the call returns.
    pub fn reflect_reader(&mut self, reader: &mut dyn Read) -> PluginDescription {
        let opened = self.opener.open_reader(reader);
        self.register(None, opened)
    }

    fn register(
        &mut self,
        path: Option<&Path>,
        opened: Result<Box<dyn PluginArchive>, ArchiveError>,
    ) -> PluginDescription {
        let handle = PluginHandle::next();
        match self.describe(handle, path, opened) {
            Ok((description, archive)) => {
                self.statuses
                    .entry(description.id().clone())
                    .or_insert_with(PluginStatus::installed);
                self.reporter.plugin_registered(&description);
                self.insert(description, ArchiveSlot::Open(OpenArchive::new(archive)))
            }
            Err(cause) => {
                let description = match &cause {
                    RegistrationError::Duplicate { id, version } => {
                        PluginDescription::rejected(handle, id.clone(), *version, path, &cause)
                    }
                    RegistrationError::Archive(_) => {
                        PluginDescription::degraded(handle, path, &cause)
                    }
                };
                self.reporter.plugin_degraded(&description);
                self.insert(description, ArchiveSlot::Empty)
            }
        }
    }

    fn describe(
        &self,
        handle: PluginHandle,
        path: Option<&Path>,
        opened: Result<Box<dyn PluginArchive>, ArchiveError>,
    ) -> Result<(PluginDescription, Box<dyn PluginArchive>), RegistrationError> {
        let mut archive = opened?;
        let icon = archive.read_icon()?;
        let description = PluginDescription::from_index(handle, archive.index(), path, icon);

        if self.is_duplicate(&description) {
            return Err(RegistrationError::Duplicate {
                id: description.id().clone(),
                version: description.version(),
            });
        }
        Ok((description, archive))
    }

    /// Only an incumbent the format window accepts can shadow a newcomer.
    fn is_duplicate(&self, candidate: &PluginDescription) -> bool {
        self.registrations.values().any(|r| {
            r.slot
                .open()
                .is_some_and(|archive| self.window.is_usable(archive.format_version))
                && r.description.id() == candidate.id()
                && r.description.version() == candidate.version()
        })
    }

    fn insert(&mut self, description: PluginDescription, slot: ArchiveSlot) -> PluginDescription {
        let copy = description.clone();
        self.registrations
            .insert(description.handle(), Registration { description, slot });
        copy
    }

    /// Releases every archive and forgets all registrations.
    ///
    /// Afterwards the loader behaves as if nothing had been registered.
    pub fn dispose(&mut self) {
        let released = self.registrations.len();
        self.registrations.clear();
        self.statuses.clear();
        self.reporter.disposed(released);
    }
}

impl<O, R> PluginArchiveLoader<O, R>
where
    R: LoaderReporter,
{
    /// Returns the plugins the host should treat as installed.
    ///
    /// At most one description per plugin id is returned: the highest
    /// version among readable archives whose format the host accepts.
    #[must_use]
    pub fn visible_plugins(&self) -> Vec<&PluginDescription> {
        let candidates = self.registrations.values().map(|r| Candidate {
            description: &r.description,
            format_version: r.slot.open().map(|archive| archive.format_version),
        });
        select_visible(candidates, self.window)
    }

    /// Returns every registered description, degraded ones included, in
    /// registration order.
    #[must_use]
    pub fn all_plugins(&self) -> Vec<&PluginDescription> {
        self.registrations.values().map(|r| &r.description).collect()
    }

    /// Returns the installation status of the plugin `description` names.
    ///
    /// `None` and unregistered ids yield a not-installed status.
    #[must_use]
    pub fn status(&self, description: Option<&PluginDescription>) -> PluginStatus {
        description.map_or_else(PluginStatus::not_installed, |d| self.status_of(d.id()))
    }

    /// Returns the installation status of `id`.
    #[must_use]
    pub fn status_of(&self, id: &PluginId) -> PluginStatus {
        self.statuses
            .get(id)
            .copied()
            .unwrap_or_else(PluginStatus::not_installed)
    }

    /// Activates the implementation of `C` declared by `description`.
    ///
    /// The archive's module is materialised on first use and reused by
    /// later calls.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnknownArchive`] when `description` was not
    /// registered here, [`LoadError::UnsupportedCapability`] when it declares
    /// no implementation of `C`, [`LoadError::TypeResolution`] when the
    /// declared type is missing from the module, and [`LoadError::Payload`]
    /// or [`LoadError::Instantiate`] when the plugin fails to start.
    pub fn load<C: Capability>(
        &self,
        description: &PluginDescription,
    ) -> Result<Box<C::Instance>, LoadError> {
        let registration = self
            .registrations
            .get(&description.handle())
            .ok_or(LoadError::UnknownArchive {
                handle: description.handle(),
            })?;
        let plugin = registration.description.id();

        let unsupported = || LoadError::UnsupportedCapability {
            plugin: plugin.clone(),
            capability: C::NAME,
        };
        let type_name = registration
            .description
            .capabilities()
            .get(C::NAME)
            .ok_or_else(unsupported)?;
        let archive = registration.slot.open().ok_or_else(unsupported)?;

        let module = archive.module().map_err(|source| LoadError::Payload {
            plugin: plugin.clone(),
            source,
        })?;
        let Some(ty) = module.resolve_type(type_name) else {
            self.reporter.type_unresolved(plugin, type_name);
            return Err(LoadError::TypeResolution {
                plugin: plugin.clone(),
                type_name: type_name.clone(),
                capability: C::NAME,
            });
        };

        ty.instantiate::<C>()
            .map_err(|source| LoadError::Instantiate {
                plugin: plugin.clone(),
                source,
            })
    }

    /// Activates every visible plugin that declares capability `C`.
    ///
    /// Plugins that fail are reported and skipped. Instances are returned in
    /// visible-set order.
    #[must_use]
    pub fn load_all<C: Capability>(&self) -> Vec<Box<C::Instance>> {
        self.reporter.batch_started(C::NAME);
        let mut instances = Vec::new();
        for description in self.visible_plugins() {
            if !description.capabilities().contains_key(C::NAME) {
                continue;
            }
            match self.load::<C>(description) {
                Ok(instance) => instances.push(instance),
                Err(error) => self.reporter.activation_failed(description.id(), &error),
            }
        }
        self.reporter.batch_finished(C::NAME, instances.len());
        instances
    }

    /// Resolves the serialisable types declared by every readable archive.
    ///
    /// Visibility is ignored. Names missing from the module, or exported only
    /// as capability implementations, are reported and skipped. When two
    /// archives declare the same friendly name the later registration wins.
    #[must_use]
    pub fn resolve_serializable_types(&self) -> BTreeMap<String, ResolvedType> {
        let mut resolved = BTreeMap::new();
        for registration in self.registrations.values() {
            let Some(archive) = registration.slot.open() else {
                continue;
            };
            let plugin = registration.description.id();
            let module = match archive.module() {
                Ok(module) => module,
                Err(source) => {
                    let error = LoadError::Payload {
                        plugin: plugin.clone(),
                        source,
                    };
                    self.reporter.activation_failed(plugin, &error);
                    continue;
                }
            };

            for (name, full_name) in registration.description.serializable_types() {
                let Some(ty) = module.resolve_type(full_name) else {
                    self.reporter.type_unresolved(plugin, full_name);
                    continue;
                };
                let Some(descriptor) = ty.descriptor() else {
                    self.reporter.type_not_serializable(plugin, full_name);
                    continue;
                };
                resolved.insert(
                    name.clone(),
                    ResolvedType {
                        plugin: registration.description.handle(),
                        descriptor,
                    },
                );
            }
        }
        resolved
    }
}
