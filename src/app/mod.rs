pub mod input;
pub mod setup;

pub use input::capture_steering_sample;
pub use setup::setup;

use bevy::prelude::*;
use bevy::window::{PresentMode, PrimaryWindow};
use gridlock::settings::Settings;

/// Apply the vsync setting to the live window when settings reload.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_vsync_settings(
    settings: Res<Settings>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if !settings.is_changed() {
        return;
    }
    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };
    let desired = if settings.window.vsync {
        PresentMode::AutoVsync
    } else {
        PresentMode::AutoNoVsync
    };
    if window.present_mode != desired {
        window.present_mode = desired;
    }
}
