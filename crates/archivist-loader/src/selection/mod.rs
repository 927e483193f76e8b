//! Selection of the visible plugin set.
//!
//! Candidates are grouped by plugin id in first-seen order. Within a group
//! only readable archives whose format version passes the [`FormatWindow`]
//! are eligible, and the highest version wins. Equal versions keep the
//! earliest registration. Groups without an eligible candidate contribute
//! nothing.

use std::collections::HashMap;

use archivist_archive::PluginId;

use crate::compat::FormatWindow;
use crate::description::PluginDescription;

/// A registered description paired with its archive's format version.
///
/// `format_version` is `None` for degraded registrations.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Description of the registered archive.
    pub description: &'a PluginDescription,
    /// Format version declared by the archive index.
    pub format_version: Option<u32>,
}

impl Candidate<'_> {
    fn is_usable(&self, window: FormatWindow) -> bool {
        !self.description.is_degraded() && self.format_version.is_some_and(|v| window.is_usable(v))
    }
}

/// Picks at most one description per plugin id.
///
/// The result is ordered by the first appearance of each id in `candidates`.
#[must_use]
pub fn select_visible<'a, I>(candidates: I, window: FormatWindow) -> Vec<&'a PluginDescription>
where
    I: IntoIterator<Item = Candidate<'a>>,
{
    let mut groups: Vec<Option<&'a PluginDescription>> = Vec::new();
    let mut positions: HashMap<&'a PluginId, usize> = HashMap::new();

    for candidate in candidates {
        let id = candidate.description.id();
        let position = *positions.entry(id).or_insert_with(|| {
            groups.push(None);
            groups.len() - 1
        });
        if !candidate.is_usable(window) {
            continue;
        }
        if let Some(best) = groups.get_mut(position) {
            let replace = best.is_none_or(|current| {
                candidate.description.version() > current.version()
            });
            if replace {
                *best = Some(candidate.description);
            }
        }
    }

    groups.into_iter().flatten().collect()
}
