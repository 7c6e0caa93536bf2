//! Steering-to-gravity mapping.
//!
//! The game has no direct movement input: steering works by bending the
//! world gravity vector toward where the player wants to go. Two sample
//! shapes exist, a pointer position (touch/mouse) or a raw two-axis tilt
//! reading, and the host decides which one is live. The mapping itself is
//! a pure function, applied once per tick before the physics step.

use crate::rules::GameState;
use crate::player::Player;
use bevy::prelude::*;

/// Divisor turning a pointer-to-player offset into gravity units.
pub const POINTER_PULL: f32 = 100.0;

/// Gain applied to tilt samples. The axes are swapped and one sign flipped
/// to rotate the device frame into the world frame.
pub const TILT_GAIN: f32 = 50.0;

/// Latest steering input, single slot: a fresh sample simply overwrites a
/// stale one.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub enum SteeringSample {
    /// Pointer position in world space, `None` while no touch is active.
    Pointer(Option<Vec2>),
    /// Raw accelerometer reading in device units.
    Tilt(Vec2),
}

impl Default for SteeringSample {
    fn default() -> Self {
        SteeringSample::Pointer(None)
    }
}

/// The world gravity vector driving the player body.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct Gravity(pub Vec2);

/// Emitted whenever the gravity vector changes, for physics/render sync on
/// the host side.
#[derive(Event, Debug, Clone, Copy)]
pub struct GravityUpdated(pub Vec2);

/// Map a steering sample to a gravity vector.
///
/// Returns `None` when there is nothing to apply (pointer released), in
/// which case gravity holds its last value until the next sample arrives.
#[must_use]
pub fn compute_gravity(sample: SteeringSample, player_position: Vec2) -> Option<Vec2> {
    match sample {
        SteeringSample::Pointer(None) => None,
        SteeringSample::Pointer(Some(pointer)) => {
            Some((pointer - player_position) / POINTER_PULL)
        }
        SteeringSample::Tilt(tilt) => Some(Vec2::new(tilt.y * -TILT_GAIN, tilt.x * TILT_GAIN)),
    }
}

/// Update the gravity resource from the latest sample. Skipped entirely
/// while the game is over: the respawn window must not be steerable.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_steering(
    sample: Res<SteeringSample>,
    state: Res<GameState>,
    mut gravity: ResMut<Gravity>,
    players: Query<&Transform, With<Player>>,
    mut updated: EventWriter<GravityUpdated>,
) {
    if state.is_game_over() {
        return;
    }
    let Ok(transform) = players.get_single() else {
        return;
    };
    if let Some(g) = compute_gravity(*sample, transform.translation.truncate()) {
        if g != gravity.0 {
            gravity.0 = g;
            updated.send(GravityUpdated(g));
        }
    }
}
