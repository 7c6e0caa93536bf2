//! Raw input capture: turns mouse/keyboard state into a steering sample.
//!
//! The simulation core only ever sees a `SteeringSample`; this is the one
//! place that knows about windows, cursors and key state. The sample slot
//! is overwritten every frame, so a stale sample is simply dropped.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use gridlock::player::SteeringSample;
use gridlock::settings::{InputMode, Settings};

/// Capture the steering sample for this frame.
///
/// Pointer mode steers toward the cursor while the left button is held;
/// releasing yields `Pointer(None)` so gravity freezes at its last value.
/// Tilt mode synthesizes an accelerometer-style sample from the arrow
/// keys, the desktop stand-in for a device tilt.
#[allow(clippy::needless_pass_by_value)]
pub fn capture_steering_sample(
    settings: Res<Settings>,
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut sample: ResMut<SteeringSample>,
) {
    match settings.controls.input_mode {
        InputMode::Pointer => {
            let pointer = if buttons.pressed(MouseButton::Left) {
                windows
                    .get_single()
                    .ok()
                    .and_then(Window::cursor_position)
                    .and_then(|cursor| {
                        let (camera, camera_transform) = cameras.get_single().ok()?;
                        camera.viewport_to_world_2d(camera_transform, cursor)
                    })
            } else {
                None
            };
            *sample = SteeringSample::Pointer(pointer);
        }
        InputMode::Tilt => {
            let step = settings.controls.tilt_step;
            let mut tilt = Vec2::ZERO;
            // device frame: +x tips the top edge up, +y tips it left
            if keys.pressed(KeyCode::ArrowUp) {
                tilt.x += step;
            }
            if keys.pressed(KeyCode::ArrowDown) {
                tilt.x -= step;
            }
            if keys.pressed(KeyCode::ArrowLeft) {
                tilt.y += step;
            }
            if keys.pressed(KeyCode::ArrowRight) {
                tilt.y -= step;
            }
            *sample = SteeringSample::Tilt(tilt);
        }
    }
}
