//! Display preference store, persisted apart from task state.

use std::path::{Path, PathBuf};

use tracing::error;

use crate::db::{load_snapshot, save_snapshot, snapshot_path, Preferences, THEME_NAMESPACE};

#[derive(Debug, Default)]
pub struct PreferenceStore {
    prefs: Preferences,
    path: Option<PathBuf>,
}

impl PreferenceStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open(dir: &Path) -> Self {
        let path = snapshot_path(dir, THEME_NAMESPACE);
        PreferenceStore {
            prefs: load_snapshot(&path),
            path: Some(path),
        }
    }

    pub fn dark_mode(&self) -> bool {
        self.prefs.dark_mode
    }

    pub fn toggle_dark_mode(&mut self) {
        self.set_dark_mode(!self.prefs.dark_mode);
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.prefs.dark_mode = enabled;
        if let Some(path) = &self.path {
            if let Err(e) = save_snapshot(path, &self.prefs) {
                error!(path = %path.display(), error = %e, "failed to persist preferences");
            }
        }
    }
}
