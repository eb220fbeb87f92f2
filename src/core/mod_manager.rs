use crate::core::engine::ModEngine;
use crate::core::ingest::FileIngestor;
use crate::core::package::ArchivePackager;
use crate::models::error::SError;
use crate::models::game::{GameLayout, ResourceKind};
use crate::models::mod_dto::{Mod, ModEdit};
use crate::utils::file::FileUtils;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, instrument, warn};

/// Checks that `name` can double as a storage folder name.
pub fn validate_name(name: &str) -> Result<&str, SError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SError::Validation("mod name cannot be empty".into()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(SError::Validation(format!(
            "'{name}' cannot be used as a mod name"
        )));
    }
    Ok(name)
}

/// Pairs every file with its resource kind; unknown extensions are rejected.
fn classify_all(
    layout: &GameLayout,
    files: &[Utf8PathBuf],
) -> Result<Vec<(ResourceKind, Utf8PathBuf)>, SError> {
    files
        .iter()
        .map(|f| {
            layout.classify(f).map(|kind| (kind, f.clone())).ok_or_else(|| {
                SError::Validation(format!(
                    "'{f}' is neither a .{} nor a .{} file",
                    layout.patch_extension, layout.music_extension
                ))
            })
        })
        .collect()
}

fn music_count<'a>(kinds: impl IntoIterator<Item = &'a ResourceKind>) -> usize {
    kinds
        .into_iter()
        .filter(|k| **k == ResourceKind::Music)
        .count()
}

fn too_many_music(count: usize) -> SError {
    SError::Validation(format!("only one music file allowed per mod, got {count}"))
}

impl ModEngine {
    /// Copies `files` into a new storage folder and registers the mod.
    #[instrument(skip(self, files), fields(files = files.len()))]
    pub fn install(&mut self, name: &str, files: &[Utf8PathBuf]) -> Result<Mod, SError> {
        let name = validate_name(name)?;
        let classified = classify_all(&self.paths.layout, files)?;

        let music = music_count(classified.iter().map(|(k, _)| k));
        if music > 1 {
            return Err(too_many_music(music));
        }
        if self.catalog.contains_name(name) {
            return Err(SError::Conflict(name.to_string()));
        }

        let folder = self.mod_folder(name);
        if folder.exists() {
            return Err(SError::ModAlreadyExists(name.to_string()));
        }
        std::fs::create_dir_all(&folder).map_err(|e| SError::io(&folder, e))?;

        let mut new_mod = Mod::new(name);
        for (kind, src) in &classified {
            match FileIngestor::ingest(src, &folder) {
                Ok(stored) => new_mod.push_file(*kind, stored),
                Err(e) => {
                    warn!("Install of '{name}' failed, removing {folder}");
                    FileUtils::remove_dir_if_exists(&folder)?;
                    return Err(e);
                }
            }
        }

        self.catalog.insert(new_mod.clone());
        if let Err(e) = self.save_catalog() {
            self.catalog.remove(&new_mod.id);
            FileUtils::remove_dir_if_exists(&folder)?;
            return Err(e);
        }

        info!("Installed '{name}' with {} file(s)", classified.len());
        Ok(new_mod)
    }

    /// Renames a mod and/or adds and removes files.
    ///
    /// Removed files are deleted from storage right away. When the mod is
    /// active, the live game files are left alone; activate it again to apply
    /// the change.
    #[instrument(skip(self, edit))]
    pub fn edit(&mut self, name: &str, edit: ModEdit) -> Result<Mod, SError> {
        let current = self.require_mod(name)?.clone();

        let new_name = match edit.new_name.as_deref() {
            Some(n) => validate_name(n)?.to_string(),
            None => current.name.clone(),
        };
        let renaming = new_name != current.name;
        if renaming
            && (self.catalog.contains_name(&new_name) || self.mod_folder(&new_name).exists())
        {
            return Err(SError::Conflict(new_name));
        }

        let removals = edit
            .remove_files
            .iter()
            .map(|r| Self::resolve_stored_file(&current, r))
            .collect::<Result<Vec<_>, _>>()?;
        let additions = classify_all(&self.paths.layout, &edit.add_files)?;

        let kept_music = current
            .music_file
            .as_ref()
            .filter(|m| !removals.contains(m))
            .map(|_| ResourceKind::Music);
        let music = music_count(kept_music.iter().chain(additions.iter().map(|(k, _)| k)));
        if music > 1 {
            return Err(too_many_music(music));
        }

        let old_folder = self.mod_folder(&current.name);
        let mut updated = current.clone();

        // Additions first: the only step that can be rolled back cleanly.
        let mut ingested = Vec::new();
        for (kind, src) in &additions {
            match FileIngestor::ingest(src, &old_folder) {
                Ok(stored) => {
                    ingested.push(stored.clone());
                    updated.push_file(*kind, stored);
                }
                Err(e) => {
                    for f in &ingested {
                        FileUtils::remove_file_if_exists(f)?;
                    }
                    return Err(e);
                }
            }
        }

        for path in &removals {
            FileUtils::remove_file_if_exists(path)?;
            updated.forget_file(path);
            debug!("Removed {path} from '{}'", current.name);
        }

        if renaming {
            let new_folder = self.mod_folder(&new_name);
            if old_folder.exists() {
                std::fs::rename(&old_folder, &new_folder)
                    .map_err(|e| SError::io(&old_folder, e))?;
            } else {
                std::fs::create_dir_all(&new_folder).map_err(|e| SError::io(&new_folder, e))?;
            }
            updated.rebase(&old_folder, &new_folder);
            updated.name = new_name.clone();
            info!("Renamed '{}' to '{new_name}'", current.name);
        }

        self.catalog.insert(updated.clone());
        if let Err(e) = self.save_catalog() {
            self.catalog.insert(current.clone());
            if renaming {
                let new_folder = self.mod_folder(&updated.name);
                if let Err(undo) = std::fs::rename(&new_folder, &old_folder) {
                    warn!("Could not move {new_folder} back to {old_folder}: {undo}");
                }
            }
            for f in &ingested {
                let f = if renaming {
                    old_folder.join(f.file_name().unwrap_or_default())
                } else {
                    f.clone()
                };
                FileUtils::remove_file_if_exists(&f)?;
            }
            return Err(e);
        }

        if self.activation.active_mod.as_deref() == Some(updated.id.as_str())
            && (!additions.is_empty() || !removals.is_empty())
        {
            info!("'{}' is active; re-activate it to apply the file changes", updated.name);
        }
        Ok(updated)
    }

    /// Matches a removal request against the mod's stored files, either by
    /// full path or by bare file name.
    fn resolve_stored_file(m: &Mod, request: &Utf8Path) -> Result<Utf8PathBuf, SError> {
        if m.owns(request) {
            return Ok(request.to_owned());
        }
        m.files()
            .find(|f| f.file_name().is_some() && f.file_name() == request.file_name())
            .filter(|_| request.components().count() == 1)
            .cloned()
            .ok_or_else(|| {
                SError::Validation(format!("'{request}' is not a file of mod '{}'", m.name))
            })
    }

    /// Deletes a mod's storage and catalog entry. An active mod is switched
    /// back to vanilla first.
    #[instrument(skip(self))]
    pub fn delete(&mut self, name: &str) -> Result<(), SError> {
        let target = self.require_mod(name)?.clone();

        if self.activation.active_mod.as_deref() == Some(target.id.as_str()) {
            info!("'{name}' is active, restoring vanilla before deleting");
            self.restore_vanilla()?;
        }

        FileUtils::remove_dir_if_exists(&self.mod_folder(&target.name))?;
        self.catalog.remove(&target.id);
        self.save_catalog()?;

        info!("Deleted '{name}'");
        Ok(())
    }

    /// Installs a mod from a package produced by [`ModEngine::export_package`].
    #[instrument(skip(self))]
    pub fn import_package(&mut self, archive: &Utf8Path) -> Result<Mod, SError> {
        let listing = ArchivePackager::inspect(archive)?;
        let name = validate_name(&listing.mod_name)
            .map_err(|e| SError::InvalidPackage(e.to_string()))?
            .to_string();
        // The folder is extracted under its raw name, so it must already be clean.
        if name != listing.mod_name {
            return Err(SError::InvalidPackage(format!(
                "mod folder '{}' has leading or trailing whitespace",
                listing.mod_name
            )));
        }

        if self.catalog.contains_name(&name) {
            return Err(SError::Conflict(name));
        }

        let layout = &self.paths.layout;
        let music = listing
            .files
            .iter()
            .filter(|f| layout.classify(f) == Some(ResourceKind::Music))
            .count();
        if music > 1 {
            return Err(SError::InvalidPackage(format!(
                "'{name}' carries {music} music files, only one is allowed"
            )));
        }

        let name = ArchivePackager::unpack(archive, self.paths.mod_storage_root())?;
        let folder = self.mod_folder(&name);

        let mut imported = Mod::new(&name);
        for file in FileUtils::list_files(&folder)? {
            match self.paths.layout.classify(&file) {
                Some(kind) => imported.push_file(kind, file),
                None => warn!("Ignoring {file}: not a game resource"),
            }
        }

        self.catalog.insert(imported.clone());
        if let Err(e) = self.save_catalog() {
            self.catalog.remove(&imported.id);
            FileUtils::remove_dir_if_exists(&folder)?;
            return Err(e);
        }

        info!("Imported '{name}' from {archive}");
        Ok(imported)
    }

    /// Writes the mod's storage folder into a package at `output`.
    #[instrument(skip(self))]
    pub fn export_package(&self, name: &str, output: &Utf8Path) -> Result<(), SError> {
        let m = self.require_mod(name)?;
        ArchivePackager::pack(&self.mod_folder(&m.name), output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_must_be_usable_as_folders() {
        assert_eq!(validate_name("  Neon Nights ").unwrap(), "Neon Nights");
        assert!(matches!(validate_name("   "), Err(SError::Validation(_))));
        assert!(matches!(validate_name("a/b"), Err(SError::Validation(_))));
        assert!(matches!(validate_name(".."), Err(SError::Validation(_))));
    }

    #[test]
    fn removal_by_bare_file_name() {
        let mut m = Mod::new("A");
        m.patch_files = vec!["/m/A/x.patchwad".into()];
        m.music_file = Some("/m/A/song.wad".into());

        let found = ModEngine::resolve_stored_file(&m, Utf8Path::new("song.wad")).unwrap();
        assert_eq!(found, Utf8PathBuf::from("/m/A/song.wad"));

        let full = ModEngine::resolve_stored_file(&m, Utf8Path::new("/m/A/x.patchwad")).unwrap();
        assert_eq!(full, Utf8PathBuf::from("/m/A/x.patchwad"));

        assert!(ModEngine::resolve_stored_file(&m, Utf8Path::new("other.wad")).is_err());
        assert!(ModEngine::resolve_stored_file(&m, Utf8Path::new("/elsewhere/song.wad")).is_err());
    }
}
