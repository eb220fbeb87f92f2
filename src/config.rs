use crate::models::error::SError;
use crate::models::game::GameLayout;
use camino::Utf8PathBuf;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "wad_keeper";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    pub version: u8,
    /// Data root holding stored mods, backups and the two state files.
    pub home: Utf8PathBuf,
    pub log_level: String,
    pub layout: GameLayout,
}

impl Default for AppSettings {
    fn default() -> Self {
        let base_dir = ProjectDirs::from("com", "martes", APP_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .or_else(|| {
                std::env::current_exe()
                    .ok()
                    .and_then(|exe_path| exe_path.parent().map(|p| p.to_path_buf()))
            })
            .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
            .unwrap_or_else(|| Utf8PathBuf::from("."));

        Self {
            version: 1,
            home: base_dir,
            log_level: "info".to_string(),
            layout: GameLayout::default(),
        }
    }
}

impl AppSettings {
    pub fn load() -> Result<AppSettings, SError> {
        Ok(confy::load(APP_NAME, None)?)
    }

    pub fn save(&self) -> Result<(), SError> {
        Ok(confy::store(APP_NAME, None, self)?)
    }

    pub fn load_path(path: &Utf8PathBuf) -> Result<AppSettings, SError> {
        Ok(confy::load_path(path)?)
    }

    pub fn save_path(&self, path: &Utf8PathBuf) -> Result<(), SError> {
        Ok(confy::store_path(path, self)?)
    }
}
