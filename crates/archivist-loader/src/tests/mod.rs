//! Crate-level test doubles, fixtures, and BDD tests.

use std::collections::HashMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use archivist_archive::fixture::ArchiveWriter;
use archivist_archive::{
    ArchiveError, ArchiveIndex, ArchiveOpener, Capability, CapabilityImplementation,
    ModuleCatalog, PluginArchive, PluginId, PluginModule, SerializableTypeDescription,
};
use mockall::mock;

use crate::description::PluginDescription;
use crate::discovery::FileEnumerator;
use crate::error::LoadError;
use crate::reporter::LoaderReporter;


// ---------------------------------------------------------------------------
// Capability and module under test
// ---------------------------------------------------------------------------

pub(crate) trait Analyser {
    fn matches(&self, line: &str) -> bool;
}

pub(crate) struct AnalyserCapability;

impl Capability for AnalyserCapability {
    const NAME: &'static str = "LogAnalyser";
    type Instance = dyn Analyser;
}

struct Keyword(&'static str);

impl Analyser for Keyword {
    fn matches(&self, line: &str) -> bool {
        line.contains(self.0)
    }
}

pub(crate) struct EventSettings;

pub(crate) const MODULE_KEY: &str = "acme-analysers";
pub(crate) const ERROR_ANALYSER: &str = "Acme.ErrorAnalyser";
pub(crate) const WARNING_ANALYSER: &str = "Acme.WarningAnalyser";
pub(crate) const BROKEN_ANALYSER: &str = "Acme.BrokenAnalyser";
pub(crate) const SETTINGS_TYPE: &str = "Acme.EventSettings";

pub(crate) fn analysers_module() -> PluginModule {
    PluginModule::builder("acme")
        .export::<AnalyserCapability, _>(ERROR_ANALYSER, || Box::new(Keyword("error")))
        .export::<AnalyserCapability, _>(WARNING_ANALYSER, || Box::new(Keyword("warn")))
        .try_export::<AnalyserCapability, _>(BROKEN_ANALYSER, || Err("licence expired".into()))
        .serializable::<EventSettings>(SETTINGS_TYPE)
        .build()
}

pub(crate) fn catalog() -> ModuleCatalog {
    ModuleCatalog::new().with_module(MODULE_KEY, analysers_module)
}

// ---------------------------------------------------------------------------
// Archive helpers
// ---------------------------------------------------------------------------

pub(crate) fn index(id: &str, version: &str, format_version: u32) -> ArchiveIndex {
    let parsed = version.parse().expect("valid version");
    ArchiveIndex::new(id, id, parsed, format_version)
}

pub(crate) fn analyser_index(
    id: &str,
    version: &str,
    format_version: u32,
    implementation: &str,
) -> ArchiveIndex {
    index(id, version, format_version).with_capabilities(vec![CapabilityImplementation::new(
        AnalyserCapability::NAME,
        implementation,
    )])
}

pub(crate) fn serializing_index(id: &str, types: &[(&str, &str)]) -> ArchiveIndex {
    let declared = types
        .iter()
        .map(|(name, full_name)| SerializableTypeDescription::new(*name, *full_name))
        .collect();
    index(id, "1.0", 2).with_serializable_types(declared)
}

/// Writes a packed archive for `index` whose payload names [`MODULE_KEY`].
pub(crate) fn write_archive(dir: &Path, file_name: &str, index: &ArchiveIndex) -> PathBuf {
    let path = dir.join(file_name);
    ArchiveWriter::new(index)
        .expect("serialise index")
        .with_payload(MODULE_KEY)
        .write_to(&path)
        .expect("write archive");
    path
}

pub(crate) fn write_corrupt(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, b"this is not an archive").expect("write corrupt file");
    path
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

mock! {
    pub Archive {}

    impl PluginArchive for Archive {
        fn index(&self) -> &ArchiveIndex;
        fn read_icon(&mut self) -> Result<Option<Vec<u8>>, ArchiveError>;
        fn load_payload(&mut self) -> Result<PluginModule, ArchiveError>;
    }
}

mock! {
    pub Enumerator {}

    impl FileEnumerator for Enumerator {
        fn list_files(&self, directory: &Path, extension: &str) -> io::Result<Vec<PathBuf>>;
    }
}

/// Mock archive exposing `index` and no icon.
pub(crate) fn mock_archive(index: ArchiveIndex) -> MockArchive {
    let mut archive = MockArchive::new();
    archive.expect_index().return_const(index);
    archive.expect_read_icon().returning(|| Ok(None));
    archive
}

/// Opener handing out pre-built archives by path.
#[derive(Default)]
pub(crate) struct ScriptedOpener {
    archives: Mutex<HashMap<PathBuf, Result<Box<dyn PluginArchive>, ArchiveError>>>,
}

impl ScriptedOpener {
    pub(crate) fn with_archive(self, path: &str, archive: MockArchive) -> Self {
        self.with_result(path, Ok(Box::new(archive)))
    }

    pub(crate) fn with_result(
        self,
        path: &str,
        result: Result<Box<dyn PluginArchive>, ArchiveError>,
    ) -> Self {
        self.archives
            .lock()
            .expect("opener lock")
            .insert(PathBuf::from(path), result);
        self
    }
}

impl ArchiveOpener for ScriptedOpener {
    fn open_path(&self, path: &Path) -> Result<Box<dyn PluginArchive>, ArchiveError> {
        self.archives
            .lock()
            .expect("opener lock")
            .remove(path)
            .unwrap_or_else(|| {
                Err(ArchiveError::io(
                    path.display().to_string(),
                    io::Error::from(io::ErrorKind::NotFound),
                ))
            })
    }

    fn open_reader(&self, reader: &mut dyn Read) -> Result<Box<dyn PluginArchive>, ArchiveError> {
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .map_err(|error| ArchiveError::io("<stream>", error))?;
        Err(ArchiveError::MissingEntry {
            origin: String::from("<stream>"),
            entry: "index.json",
        })
    }
}

/// Reporter recording each event as a short string.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().expect("events lock").clone()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    fn record(&self, event: String) {
        self.events.lock().expect("events lock").push(event);
    }
}

impl LoaderReporter for RecordingReporter {
    fn discovery_started(&self, _directory: &Path) {
        self.record(String::from("discovery_started"));
    }

    fn discovery_skipped(&self, _directory: &Path) {
        self.record(String::from("discovery_skipped"));
    }

    fn discovery_failed(&self, _directory: &Path, error: &io::Error) {
        self.record(format!("discovery_failed:{:?}", error.kind()));
    }

    fn plugin_registered(&self, description: &PluginDescription) {
        self.record(format!("plugin_registered:{}", description.id()));
    }

    fn plugin_degraded(&self, description: &PluginDescription) {
        self.record(format!("plugin_degraded:{}", description.id()));
    }

    fn type_unresolved(&self, plugin: &PluginId, type_name: &str) {
        self.record(format!("type_unresolved:{plugin}:{type_name}"));
    }

    fn type_not_serializable(&self, plugin: &PluginId, type_name: &str) {
        self.record(format!("type_not_serializable:{plugin}:{type_name}"));
    }

    fn activation_failed(&self, plugin: &PluginId, error: &LoadError) {
        self.record(format!("activation_failed:{plugin}:{:?}", error.kind()));
    }

    fn batch_started(&self, capability: &str) {
        self.record(format!("batch_started:{capability}"));
    }

    fn batch_finished(&self, capability: &str, activated: usize) {
        self.record(format!("batch_finished:{capability}:{activated}"));
    }

    fn disposed(&self, released: usize) {
        self.record(format!("disposed:{released}"));
    }
}
