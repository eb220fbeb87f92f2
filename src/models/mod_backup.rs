use serde::{Deserialize, Serialize};

/// What happened to one live resource during a backup pass.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackupOutcome {
    Created,
    AlreadyPresent,
    /// The live file did not exist; an absence marker was written instead.
    MarkedAbsent,
    /// Nothing to back up (e.g. no music path known yet).
    Skipped,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackupReport {
    pub music: BackupOutcome,
    pub patch: BackupOutcome,
}

/// What happened to one live resource during a restore.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    /// The resource was absent in vanilla, so the live file was deleted.
    Removed,
    /// No backup exists; the live file was left as is.
    NoBackup,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestoreReport {
    pub music: RestoreOutcome,
    pub patch: RestoreOutcome,
}

impl RestoreReport {
    /// True when both resources are back to their original state.
    pub fn is_complete(&self) -> bool {
        self.music != RestoreOutcome::NoBackup && self.patch != RestoreOutcome::NoBackup
    }
}
