//! Settings loading and hot reload.
//!
//! Settings are read from RON files in `data/settings`; the first file
//! that parses wins, and defaults apply when none do. A directory watcher
//! reloads the resource at runtime.

use crate::hotload::{self, FileWatcher};
use crate::settings::Settings;
use bevy::prelude::*;

pub const SETTINGS_DIR: &str = "data/settings";

#[derive(Resource)]
pub struct SettingsWatcher(pub FileWatcher);

impl SettingsWatcher {
    #[must_use]
    pub fn stub() -> Self {
        SettingsWatcher(FileWatcher::stub())
    }
}

/// Load settings from `path`. With several `.ron` files present the first
/// parsed `Settings` is used; with none, defaults.
#[must_use]
pub fn load_settings_from_dir(path: &str) -> Settings {
    let items: Vec<Settings> = hotload::load_ron_files(path);
    items.into_iter().next().unwrap_or_else(Settings::defaults)
}

/// Create a watcher over the settings directory.
///
/// # Errors
/// Returns a `notify::Error` if the OS watcher cannot be created.
pub fn setup_settings_watcher(path: &str) -> Result<SettingsWatcher, notify::Error> {
    hotload::watch_dir(path).map(SettingsWatcher)
}

/// Reload the settings resource when a file under the settings directory
/// changes.
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<Settings>) {
    if watcher.0.take_changed() {
        info!("settings changed, reloading");
        *settings = load_settings_from_dir(SETTINGS_DIR);
    }
}
