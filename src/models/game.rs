use camino::Utf8Path;
use serde::{Deserialize, Serialize};

/// The two kinds of game resource a mod can ship.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Patch,
    Music,
}

/// File names and extensions of the managed game.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GameLayout {
    /// Folder name under the per-user data dir where the game keeps its save data.
    pub game_id: String,
    /// Live music archive inside the installation folder.
    pub music_file: String,
    /// Sibling archive used to tell a real installation folder apart.
    pub data_file: String,
    /// Live patch archive inside the game data dir.
    pub patch_file: String,
    pub patch_extension: String,
    pub music_extension: String,
}

impl Default for GameLayout {
    fn default() -> Self {
        Self {
            game_id: "HotlineMiami2".into(),
            music_file: "hlm2_music_desktop.wad".into(),
            data_file: "hlm2_data_desktop.wad".into(),
            patch_file: "patchwad.wad".into(),
            patch_extension: "patchwad".into(),
            music_extension: "wad".into(),
        }
    }
}

impl GameLayout {
    pub fn classify(&self, path: &Utf8Path) -> Option<ResourceKind> {
        let ext = path.extension()?.to_ascii_lowercase();
        if ext == self.patch_extension.to_ascii_lowercase() {
            Some(ResourceKind::Patch)
        } else if ext == self.music_extension.to_ascii_lowercase() {
            Some(ResourceKind::Music)
        } else {
            None
        }
    }
}
