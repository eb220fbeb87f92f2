use crate::models::mod_dto::Mod;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Every known mod, keyed by its stable id.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(from = "Vec<Mod>", into = "Vec<Mod>")]
pub struct Catalog {
    mods: BTreeMap<String, Mod>,
    /// Set when loading had to repair the stored data.
    repaired: bool,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Mod> {
        self.mods.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Mod> {
        self.mods.get_mut(id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Mod> {
        self.mods.values().find(|m| m.name == name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name(name).is_some()
    }

    /// The mod that stores `path`, if any.
    pub fn owner_of(&self, path: &Utf8Path) -> Option<&Mod> {
        self.mods.values().find(|m| m.owns(path))
    }

    pub fn insert(&mut self, m: Mod) {
        self.mods.insert(m.id.clone(), m);
    }

    pub fn remove(&mut self, id: &str) -> Option<Mod> {
        self.mods.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mod> {
        self.mods.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Mod> {
        self.mods.values_mut()
    }

    /// Mods ordered by name, the way they are listed to the user.
    pub fn sorted_by_name(&self) -> Vec<&Mod> {
        let mut out: Vec<&Mod> = self.mods.values().collect();
        out.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        out
    }

    pub fn mark_repaired(&mut self) {
        self.repaired = true;
    }

    /// Returns and clears the repaired flag.
    pub fn take_repaired(&mut self) -> bool {
        std::mem::take(&mut self.repaired)
    }
}

impl From<Vec<Mod>> for Catalog {
    fn from(records: Vec<Mod>) -> Self {
        let mut catalog = Catalog::default();

        for mut m in records {
            if m.id.is_empty() {
                m.id = uuid::Uuid::new_v4().to_string();
                catalog.repaired = true;
            }

            // Older files could hold the same name twice, both pointing into one folder.
            let existing_id = catalog.by_name(&m.name).map(|e| e.id.clone());
            if let Some(existing) = existing_id.and_then(|id| catalog.mods.get_mut(&id)) {
                warn!("Merging duplicate catalog entry '{}'", m.name);
                for p in m.patch_files {
                    if !existing.patch_files.contains(&p) {
                        existing.patch_files.push(p);
                    }
                }
                if existing.music_file.is_none() {
                    existing.music_file = m.music_file;
                }
                catalog.repaired = true;
                continue;
            }

            catalog.mods.insert(m.id.clone(), m);
        }

        catalog
    }
}

impl From<Catalog> for Vec<Mod> {
    fn from(c: Catalog) -> Self {
        let mut mods: Vec<Mod> = c.mods.into_values().collect();
        mods.sort_by(|a, b| a.name.cmp(&b.name));
        mods
    }
}
