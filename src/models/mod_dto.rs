use crate::models::game::ResourceKind;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

const PATCH_SEPARATOR: &str = "; ";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(from = "ModRecord", into = "ModRecord")]
pub struct Mod {
    /// Stable identity; survives renames.
    pub id: String,
    pub name: String,
    pub patch_files: Vec<Utf8PathBuf>,
    pub music_file: Option<Utf8PathBuf>,
}

impl Mod {
    pub fn new(name: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            patch_files: Vec::new(),
            music_file: None,
        }
    }

    /// All stored files, patches first.
    pub fn files(&self) -> impl Iterator<Item = &Utf8PathBuf> {
        self.patch_files.iter().chain(self.music_file.iter())
    }

    pub fn owns(&self, path: &Utf8Path) -> bool {
        self.files().any(|f| f == path)
    }

    pub fn push_file(&mut self, kind: ResourceKind, path: Utf8PathBuf) {
        match kind {
            ResourceKind::Patch => self.patch_files.push(path),
            ResourceKind::Music => self.music_file = Some(path),
        }
    }

    /// Drops a stored file from either slot. Returns whether it was present.
    pub fn forget_file(&mut self, path: &Utf8Path) -> bool {
        if self.music_file.as_deref() == Some(path) {
            self.music_file = None;
            return true;
        }
        let before = self.patch_files.len();
        self.patch_files.retain(|p| p != path);
        before != self.patch_files.len()
    }

    /// Rewrites every stored path living under `from` to live under `to`.
    pub fn rebase(&mut self, from: &Utf8Path, to: &Utf8Path) {
        let move_one = |p: &mut Utf8PathBuf| {
            if let Ok(rel) = p.strip_prefix(from) {
                *p = to.join(rel);
            }
        };
        self.patch_files.iter_mut().for_each(move_one);
        self.music_file.iter_mut().for_each(move_one);
    }
}

/// On-disk shape of a catalog entry, kept compatible with existing `mods.json` files.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ModRecord {
    #[serde(default)]
    pub id: String,
    pub mod_name: String,
    #[serde(default)]
    pub patch_wads: Option<String>,
    #[serde(default)]
    pub music_wad: Option<String>,
}

impl From<ModRecord> for Mod {
    fn from(r: ModRecord) -> Self {
        let patch_files = r
            .patch_wads
            .unwrap_or_default()
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Utf8PathBuf::from)
            .collect();
        let music_file = r
            .music_wad
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(Utf8PathBuf::from);

        Mod {
            id: r.id,
            name: r.mod_name,
            patch_files,
            music_file,
        }
    }
}

impl From<Mod> for ModRecord {
    fn from(m: Mod) -> Self {
        ModRecord {
            id: m.id,
            mod_name: m.name,
            patch_wads: Some(
                m.patch_files
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(PATCH_SEPARATOR),
            ),
            music_wad: Some(m.music_file.map(|p| p.into_string()).unwrap_or_default()),
        }
    }
}

/// Changes applied by an edit. Empty fields leave the mod as it is.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ModEdit {
    pub new_name: Option<String>,
    pub add_files: Vec<Utf8PathBuf>,
    /// Stored paths or bare file names of files to delete from the mod.
    pub remove_files: Vec<Utf8PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_both_patch_separators() {
        let raw = r#"{"mod_name":"A","patch_wads":"/m/A/x.patchwad;/m/A/y.patchwad; /m/A/z.patchwad","music_wad":""}"#;
        let m: Mod = serde_json::from_str(raw).unwrap();
        assert_eq!(m.patch_files.len(), 3);
        assert_eq!(m.patch_files[2], Utf8PathBuf::from("/m/A/z.patchwad"));
        assert!(m.music_file.is_none());
        assert!(m.id.is_empty());
    }

    #[test]
    fn writes_legacy_shape() {
        let mut m = Mod::new("Neon");
        m.patch_files = vec!["/m/Neon/a.patchwad".into(), "/m/Neon/b.patchwad".into()];
        m.music_file = Some("/m/Neon/music.wad".into());

        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(value["mod_name"], "Neon");
        assert_eq!(value["patch_wads"], "/m/Neon/a.patchwad; /m/Neon/b.patchwad");
        assert_eq!(value["music_wad"], "/m/Neon/music.wad");
        assert_eq!(value["id"], m.id.as_str());
    }

    #[test]
    fn null_fields_are_empty() {
        let raw = r#"{"mod_name":"B","patch_wads":null,"music_wad":null}"#;
        let m: Mod = serde_json::from_str(raw).unwrap();
        assert!(m.patch_files.is_empty());
        assert!(m.music_file.is_none());
    }

    #[test]
    fn rebase_moves_paths_under_new_folder() {
        let mut m = Mod::new("Old");
        m.patch_files = vec!["/m/Old/a.patchwad".into()];
        m.music_file = Some("/m/Old/b.wad".into());
        m.rebase(Utf8Path::new("/m/Old"), Utf8Path::new("/m/New"));
        assert_eq!(m.patch_files[0], Utf8PathBuf::from("/m/New/a.patchwad"));
        assert_eq!(m.music_file, Some(Utf8PathBuf::from("/m/New/b.wad")));
    }
}
