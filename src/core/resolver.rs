use crate::models::error::SError;
use crate::models::game::GameLayout;
use crate::models::paths::{BackupPaths, GameDataRules, LibPathRules};
use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;

/// Computes every location the engine touches. Holds no mutable state.
#[derive(Clone, Debug)]
pub struct PathResolver {
    pub layout: GameLayout,
    pub home: Utf8PathBuf,
    pub lib_paths: LibPathRules,
    pub game_paths: GameDataRules,
    pub backup_paths: BackupPaths,
}

impl PathResolver {
    /// Resolves the game data dir from the environment.
    pub fn new(home: &Utf8Path, layout: GameLayout) -> Self {
        let game_data_dir = Self::default_game_data_dir(&layout.game_id);
        Self::with_game_data_dir(home, &game_data_dir, layout)
    }

    /// Relative roots are taken against the current directory, so every
    /// location the resolver hands out is absolute.
    pub fn with_game_data_dir(home: &Utf8Path, game_data_dir: &Utf8Path, layout: GameLayout) -> Self {
        let home = Self::anchor(home);
        let lib_paths = LibPathRules::new(&home);
        Self {
            game_paths: GameDataRules::for_layout(&Self::anchor(game_data_dir), &layout),
            backup_paths: BackupPaths::new(&lib_paths.backups, &layout),
            home,
            lib_paths,
            layout,
        }
    }

    fn anchor(path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            return path.to_owned();
        }
        std::path::absolute(path)
            .ok()
            .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
            .unwrap_or_else(|| path.to_owned())
    }

    /// `%LOCALAPPDATA%\<game>` on Windows, `~/.local/share/<game>` elsewhere.
    pub fn default_game_data_dir(game_id: &str) -> Utf8PathBuf {
        BaseDirs::new()
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.data_local_dir().to_path_buf()).ok())
            .unwrap_or_else(|| Utf8PathBuf::from("."))
            .join(game_id)
    }

    pub fn game_data_dir(&self) -> &Utf8Path {
        self.game_paths
            .patch_wad
            .parent()
            .unwrap_or_else(|| Utf8Path::new("."))
    }

    pub fn live_patch_path(&self) -> &Utf8Path {
        &self.game_paths.patch_wad
    }

    pub fn backup_dir(&self) -> &Utf8Path {
        &self.lib_paths.backups
    }

    pub fn catalog_store_location(&self) -> &Utf8Path {
        &self.lib_paths.catalog
    }

    pub fn activation_store_location(&self) -> &Utf8Path {
        &self.lib_paths.state
    }

    pub fn mod_storage_root(&self) -> &Utf8Path {
        &self.lib_paths.mods
    }

    pub fn log_dir(&self) -> &Utf8Path {
        &self.lib_paths.logs
    }

    /// Storage folder of the mod called `name`.
    pub fn mod_folder(&self, name: &str) -> Utf8PathBuf {
        self.lib_paths.mods.join(name)
    }

    /// Makes a stored path absolute; older catalogs kept paths relative to the data root.
    pub fn absolutize(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.home.join(path)
        }
    }

    /// Creates the folders the engine writes into.
    pub fn ensure_dirs(&self) -> Result<(), SError> {
        for dir in [
            &self.lib_paths.mods,
            &self.lib_paths.backups,
            &self.game_paths.mods,
        ] {
            std::fs::create_dir_all(dir).map_err(|e| SError::io(dir, e))?;
        }
        Ok(())
    }

    /// Accepts the installation folder or the music file inside it.
    /// Returns the music file path once the sibling data file is confirmed.
    pub fn validate_game_folder(&self, selected: &Utf8Path) -> Result<Utf8PathBuf, SError> {
        let music = if selected.is_dir() {
            selected.join(&self.layout.music_file)
        } else {
            selected.to_owned()
        };

        if music.file_name() != Some(self.layout.music_file.as_str()) || !music.is_file() {
            return Err(SError::InvalidGameFolder(format!(
                "'{selected}' does not contain {}",
                self.layout.music_file
            )));
        }

        let folder = music.parent().unwrap_or_else(|| Utf8Path::new("."));
        let data = folder.join(&self.layout.data_file);
        if !data.is_file() {
            return Err(SError::InvalidGameFolder(format!(
                "'{folder}' has no {} next to the music file",
                self.layout.data_file
            )));
        }

        let canonical = dunce::canonicalize(&music).map_err(|e| SError::io(&music, e))?;
        Utf8PathBuf::from_path_buf(canonical)
            .map_err(|p| SError::ParseError(format!("Invalid UTF-8 path: {p:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_follow_home_and_game_dir() {
        let r = PathResolver::with_game_data_dir(
            Utf8Path::new("/data"),
            Utf8Path::new("/games/HM2data"),
            GameLayout::default(),
        );
        assert_eq!(r.mod_storage_root().as_str(), "/data/mods");
        assert_eq!(r.backup_dir().as_str(), "/data/backup");
        assert_eq!(r.catalog_store_location().as_str(), "/data/mods.json");
        assert_eq!(r.activation_store_location().as_str(), "/data/state.json");
        assert_eq!(r.live_patch_path().as_str(), "/games/HM2data/patchwad.wad");
        assert_eq!(r.game_data_dir().as_str(), "/games/HM2data");
        assert_eq!(r.backup_paths.music.as_str(), "/data/backup/hlm2_music_desktop.wad");
        assert_eq!(r.absolutize(Utf8Path::new("mods/A/x.wad")).as_str(), "/data/mods/A/x.wad");
    }

    #[test]
    fn relative_roots_become_absolute() {
        let r = PathResolver::with_game_data_dir(
            Utf8Path::new("data"),
            Utf8Path::new("gamedata"),
            GameLayout::default(),
        );
        let cwd = Utf8PathBuf::from_path_buf(std::env::current_dir().unwrap()).unwrap();
        assert_eq!(r.home, cwd.join("data"));
        assert_eq!(r.mod_folder("Neon"), cwd.join("data/mods/Neon"));
        assert_eq!(r.live_patch_path().to_owned(), cwd.join("gamedata/patchwad.wad"));
        assert!(r.absolutize(Utf8Path::new("mods/A/x.wad")).is_absolute());
    }

    #[test]
    fn default_game_dir_ends_with_game_id() {
        let dir = PathResolver::default_game_data_dir("HotlineMiami2");
        assert_eq!(dir.file_name(), Some("HotlineMiami2"));
    }
}
