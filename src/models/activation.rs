use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Which mod is live, plus what the first-run setup discovered.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ActivationRecord {
    /// Id of the active mod; `None` means vanilla.
    #[serde(default)]
    pub active_mod: Option<String>,
    #[serde(default)]
    pub game_music_path: Option<Utf8PathBuf>,
    #[serde(default = "default_last_folder")]
    pub last_folder: String,
}

impl Default for ActivationRecord {
    fn default() -> Self {
        Self {
            active_mod: None,
            game_music_path: None,
            last_folder: default_last_folder(),
        }
    }
}

fn default_last_folder() -> String {
    std::env::current_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| ".".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_state_file() {
        let raw = r#"{"active_mod":"Neon","game_music_path":"/games/HM2/hlm2_music_desktop.wad","last_folder":"/home/u"}"#;
        let record: ActivationRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.active_mod.as_deref(), Some("Neon"));
        assert_eq!(record.last_folder, "/home/u");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let record: ActivationRecord = serde_json::from_str("{}").unwrap();
        assert!(record.active_mod.is_none());
        assert!(record.game_music_path.is_none());
        assert!(!record.last_folder.is_empty());
    }
}
