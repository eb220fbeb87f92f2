use crate::models::game::GameLayout;
use camino::{Utf8Path, Utf8PathBuf};

macro_rules! define_paths {
    ($name:ident { $($field:ident : $default:expr),* $(,)? }) => {
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: Utf8PathBuf,)*
        }

        impl $name {
            pub fn to_absolute(mut self, base: &Utf8Path) -> Self {
                $(self.$field = base.join(self.$field);)*
                self
            }

            pub fn new(base: &Utf8Path) -> Self {
                Self::default().to_absolute(base)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $($field: $default.into(),)*
                }
            }
        }
    };
}

define_paths!(LibPathRules {
    backups: "backup",
    mods: "mods",
    catalog: "mods.json",
    state: "state.json",
    logs: "logs",
});

define_paths!(GameDataRules {
    patch_wad: "patchwad.wad",
    mods: "mods",
});

impl GameDataRules {
    /// Builds the game data rules for a layout whose live patch file may be renamed.
    pub fn for_layout(base: &Utf8Path, layout: &GameLayout) -> Self {
        Self {
            patch_wad: layout.patch_file.as_str().into(),
            ..Self::default()
        }
        .to_absolute(base)
    }
}

/// Where the write-once snapshots of the live files live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackupPaths {
    pub music: Utf8PathBuf,
    pub patch: Utf8PathBuf,
    pub patch_absent: Utf8PathBuf,
}

impl BackupPaths {
    pub fn new(backup_dir: &Utf8Path, layout: &GameLayout) -> Self {
        Self {
            music: backup_dir.join(&layout.music_file),
            patch: backup_dir.join(&layout.patch_file),
            patch_absent: backup_dir.join(format!("{}.absent", layout.patch_file)),
        }
    }
}
