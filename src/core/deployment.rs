use crate::core::engine::ModEngine;
use crate::models::error::SError;
use crate::models::mod_backup::{BackupOutcome, BackupReport, RestoreOutcome, RestoreReport};
use crate::utils::file::FileUtils;
use camino::Utf8Path;
use tracing::{debug, info, instrument, warn};

impl ModEngine {
    /// Makes `name` the live mod.
    ///
    /// Order matters: live files go back to vanilla, vanilla gets backed up
    /// (first time only), then the mod's files are copied over the live paths.
    /// Calling this for the mod that is already active does nothing.
    #[instrument(skip(self))]
    pub fn activate(&mut self, name: &str) -> Result<(), SError> {
        let target = self.require_mod(name)?.clone();

        if self.activation.active_mod.as_deref() == Some(target.id.as_str()) {
            debug!("'{name}' is already active");
            return Ok(());
        }

        let live_music = self
            .activation
            .game_music_path
            .clone()
            .ok_or(SError::SetupIncomplete)?;

        // Refuse before touching live files if storage lost a file.
        if let Some(missing) = target.files().find(|f| !f.is_file()) {
            return Err(SError::FileOrDirectoryNotFound(missing.to_string()));
        }

        self.restore_vanilla()?;
        self.backup_vanilla()?;

        let live_patch = self.paths.live_patch_path().to_owned();
        if target.patch_files.len() > 1 {
            warn!(
                "'{name}' has {} patch files; they share one live path, the last one wins",
                target.patch_files.len()
            );
        }
        for patch in &target.patch_files {
            FileUtils::copy_over(patch, &live_patch)?;
            debug!("Copied {patch} over {live_patch}");
        }
        if let Some(music) = &target.music_file {
            FileUtils::copy_over(music, &live_music)?;
            debug!("Copied {music} over {live_music}");
        }

        self.activation.active_mod = Some(target.id.clone());
        self.save_activation()?;

        info!("Activated '{name}'");
        Ok(())
    }

    /// Copies the backups back over the live files and marks vanilla active.
    ///
    /// A resource with no backup is left untouched and reported as
    /// [`RestoreOutcome::NoBackup`].
    #[instrument(skip(self))]
    pub fn restore_vanilla(&mut self) -> Result<RestoreReport, SError> {
        let backups = self.paths.backup_paths.clone();

        let music = match self.activation.game_music_path.as_deref() {
            Some(live) if backups.music.is_file() => {
                FileUtils::copy_over(&backups.music, live)?;
                RestoreOutcome::Restored
            }
            Some(live) => {
                warn!("No music backup at {}, leaving {live} as is", backups.music);
                RestoreOutcome::NoBackup
            }
            None => {
                warn!("No game music path known, music not restored");
                RestoreOutcome::NoBackup
            }
        };

        let live_patch = self.paths.live_patch_path();
        let patch = if backups.patch.is_file() {
            FileUtils::copy_over(&backups.patch, live_patch)?;
            RestoreOutcome::Restored
        } else if backups.patch_absent.is_file() {
            FileUtils::remove_file_if_exists(live_patch)?;
            RestoreOutcome::Removed
        } else {
            warn!("No patch backup at {}, leaving {live_patch} as is", backups.patch);
            RestoreOutcome::NoBackup
        };

        self.activation.active_mod = None;
        self.save_activation()?;

        let report = RestoreReport { music, patch };
        info!("Restored vanilla: {report:?}");
        Ok(report)
    }

    /// Snapshots the current live files unless a snapshot already exists.
    /// Backups are never overwritten.
    #[instrument(skip(self))]
    pub fn backup_vanilla(&self) -> Result<BackupReport, SError> {
        let backups = &self.paths.backup_paths;
        let backup_dir = self.paths.backup_dir();
        std::fs::create_dir_all(backup_dir).map_err(|e| SError::io(backup_dir, e))?;

        let music = match self.activation.game_music_path.as_deref() {
            _ if backups.music.exists() => BackupOutcome::AlreadyPresent,
            Some(live) if live.is_file() => {
                FileUtils::copy_over(live, &backups.music)?;
                info!("Backed up {live}");
                BackupOutcome::Created
            }
            Some(live) => {
                warn!("Live music file {live} is missing, nothing to back up");
                BackupOutcome::Skipped
            }
            None => BackupOutcome::Skipped,
        };

        let live_patch = self.paths.live_patch_path();
        let patch = if backups.patch.exists() || backups.patch_absent.exists() {
            BackupOutcome::AlreadyPresent
        } else if live_patch.is_file() {
            FileUtils::copy_over(live_patch, &backups.patch)?;
            info!("Backed up {live_patch}");
            BackupOutcome::Created
        } else {
            Self::mark_absent(&backups.patch_absent)?;
            info!("{live_patch} does not exist in vanilla, recorded its absence");
            BackupOutcome::MarkedAbsent
        };

        Ok(BackupReport { music, patch })
    }

    fn mark_absent(marker: &Utf8Path) -> Result<(), SError> {
        FileUtils::write_atomic(marker, b"")
    }
}
