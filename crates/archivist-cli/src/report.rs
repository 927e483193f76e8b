//! Rendering of plugin descriptions.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use archivist_loader::PluginDescription;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::errors::AppError;

/// Serialisable view of one plugin description.
#[derive(Debug, Serialize)]
pub(crate) struct PluginRow {
    id: String,
    version: String,
    name: String,
    author: String,
    description: String,
    website: Option<String>,
    path: Option<String>,
    has_icon: bool,
    capabilities: BTreeMap<String, String>,
    serializable_types: BTreeMap<String, String>,
    error: Option<String>,
}

impl From<&PluginDescription> for PluginRow {
    fn from(description: &PluginDescription) -> Self {
        Self {
            id: description.id().to_string(),
            version: description.version().to_string(),
            name: description.name().to_owned(),
            author: description.author().to_owned(),
            description: description.description().to_owned(),
            website: description.website().map(ToString::to_string),
            path: description.file_path().map(|p| p.display().to_string()),
            has_icon: description.icon().is_some(),
            capabilities: description.capabilities().clone(),
            serializable_types: description.serializable_types().clone(),
            error: description.error().map(str::to_owned),
        }
    }
}

/// Plugins of a directory grouped by how the loader treats them.
#[derive(Debug, Serialize)]
pub(crate) struct Listing {
    plugin_dir: String,
    /// Selected versions.
    visible: Vec<PluginRow>,
    /// Readable archives not selected: superseded or of an unsupported format.
    hidden: Vec<PluginRow>,
    /// Archives that could not be read.
    degraded: Vec<PluginRow>,
}

impl Listing {
    pub(crate) fn new(
        plugin_dir: &Path,
        all: &[&PluginDescription],
        visible: &[&PluginDescription],
    ) -> Self {
        let is_visible = |d: &PluginDescription| visible.iter().any(|v| v.handle() == d.handle());
        let (degraded, readable): (Vec<&&PluginDescription>, Vec<&&PluginDescription>) = all.iter().partition(|d| d.is_degraded());
        Self {
            plugin_dir: plugin_dir.display().to_string(),
            visible: visible.iter().map(|d| PluginRow::from(*d)).collect(),
            hidden: readable
                .into_iter()
                .filter(|d| !is_visible(d))
                .map(|d| PluginRow::from(*d))
                .collect(),
            degraded: degraded.into_iter().map(|d| PluginRow::from(*d)).collect(),
        }
    }

    pub(crate) fn write<W: Write>(
        &self,
        format: OutputFormat,
        out: &mut W,
    ) -> Result<(), AppError> {
        match format {
            OutputFormat::Json => write_json(self, out),
            OutputFormat::Human => self.write_human(out),
        }
    }

    fn write_human<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        if self.visible.is_empty() && self.hidden.is_empty() && self.degraded.is_empty() {
            writeln!(out, "No plugins found in {}", self.plugin_dir)?;
            return Ok(());
        }
        write_section(out, "Visible plugins", &self.visible)?;
        write_section(out, "Hidden plugins", &self.hidden)?;
        write_section(out, "Unavailable plugins", &self.degraded)?;
        Ok(())
    }
}

fn write_section<W: Write>(out: &mut W, title: &str, rows: &[PluginRow]) -> Result<(), AppError> {
    if rows.is_empty() {
        return Ok(());
    }
    writeln!(out, "{title}:")?;
    for row in rows {
        match &row.error {
            Some(error) => writeln!(out, "  {} {}  {error}", row.id, row.version)?,
            None if row.author.is_empty() => {
                writeln!(out, "  {} {}  {}", row.id, row.version, row.name)?;
            }
            None => writeln!(
                out,
                "  {} {}  {} ({})",
                row.id, row.version, row.name, row.author
            )?,
        }
    }
    Ok(())
}

/// Detailed view of a single archive.
#[derive(Debug, Serialize)]
pub(crate) struct Inspection {
    #[serde(flatten)]
    plugin: PluginRow,
    usable: bool,
    installed: bool,
}

impl Inspection {
    pub(crate) fn new(description: &PluginDescription, usable: bool, installed: bool) -> Self {
        Self {
            plugin: PluginRow::from(description),
            usable,
            installed,
        }
    }

    pub(crate) fn write<W: Write>(
        &self,
        format: OutputFormat,
        out: &mut W,
    ) -> Result<(), AppError> {
        match format {
            OutputFormat::Json => write_json(self, out),
            OutputFormat::Human => self.write_human(out),
        }
    }

    fn write_human<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        let row = &self.plugin;
        writeln!(out, "id: {}", row.id)?;
        writeln!(out, "version: {}", row.version)?;
        writeln!(out, "name: {}", row.name)?;
        writeln!(out, "author: {}", row.author)?;
        writeln!(out, "description: {}", row.description)?;
        writeln!(out, "website: {}", row.website.as_deref().unwrap_or("-"))?;
        writeln!(out, "path: {}", row.path.as_deref().unwrap_or("-"))?;
        writeln!(out, "icon: {}", if row.has_icon { "yes" } else { "no" })?;
        writeln!(out, "usable: {}", if self.usable { "yes" } else { "no" })?;
        writeln!(out, "installed: {}", if self.installed { "yes" } else { "no" })?;
        write_map(out, "capabilities", &row.capabilities)?;
        write_map(out, "serializable types", &row.serializable_types)?;
        if let Some(error) = &row.error {
            writeln!(out, "error: {error}")?;
        }
        Ok(())
    }
}

fn write_map<W: Write>(
    out: &mut W,
    title: &str,
    entries: &BTreeMap<String, String>,
) -> Result<(), AppError> {
    if entries.is_empty() {
        writeln!(out, "{title}: none")?;
        return Ok(());
    }
    writeln!(out, "{title}:")?;
    for (key, value) in entries {
        writeln!(out, "  {key} -> {value}")?;
    }
    Ok(())
}

fn write_json<T: Serialize, W: Write>(value: &T, out: &mut W) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
