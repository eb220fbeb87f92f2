use crate::core::engine::ModEngine;
use crate::models::error::SError;
use crate::utils::file::FileUtils;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, instrument};

/// Leftovers under the mods root that no catalog entry accounts for.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Orphans {
    /// Entries of the mods root with no mod of that name (stray files included).
    pub folders: Vec<Utf8PathBuf>,
    /// Files inside a catalogued mod's folder that the mod does not list.
    pub files: Vec<Utf8PathBuf>,
}

impl Orphans {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// Scans the mods root without changing anything.
pub fn find_orphans(engine: &ModEngine) -> Result<Orphans, SError> {
    let mods_root = engine.paths.mod_storage_root();
    let mut orphans = Orphans::default();
    if !mods_root.exists() {
        return Ok(orphans);
    }

    let known: HashSet<&Utf8Path> = engine
        .catalog
        .iter()
        .flat_map(|m| m.files())
        .map(|p| p.as_path())
        .collect();

    let mut entries = std::fs::read_dir(mods_root)
        .map_err(|e| SError::io(mods_root, e))?
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|p| SError::ParseError(format!("Invalid UTF-8 path: {p:?}")))?;
        let Some(name) = path.file_name() else {
            continue;
        };

        if !path.is_dir() || !engine.catalog.contains_name(name) {
            orphans.folders.push(path);
            continue;
        }

        orphans.files.extend(
            FileUtils::list_files(&path)?
                .into_iter()
                .filter(|f| !known.contains(f.as_path())),
        );
    }

    Ok(orphans)
}

impl ModEngine {
    /// Deletes everything [`find_orphans`] reports and returns it.
    #[instrument(skip(self))]
    pub fn purge_orphans(&mut self) -> Result<Orphans, SError> {
        let orphans = find_orphans(self)?;

        for folder in &orphans.folders {
            if folder.is_dir() {
                FileUtils::remove_dir_if_exists(folder)?;
            } else {
                FileUtils::remove_file_if_exists(folder)?;
            }
        }
        for file in &orphans.files {
            FileUtils::remove_file_if_exists(file)?;
        }

        if !orphans.is_empty() {
            info!(
                "Purged {} orphan folder(s) and {} orphan file(s)",
                orphans.folders.len(),
                orphans.files.len()
            );
        }
        Ok(orphans)
    }
}
