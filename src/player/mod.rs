//! Player body and the systems that drive it (steering, physics).

pub mod physics;
pub mod steering;

use bevy::prelude::*;

pub use physics::{player_physics, ContactEvent};
pub use steering::{apply_steering, Gravity, GravityUpdated, SteeringSample};

/// Collision-circle radius of the vehicle. The sprite is a 64-unit tile;
/// the circle is shrunk so brushing a wall corner does not count as a hit.
pub const PLAYER_RADIUS: f32 = 64.0 / 2.2;

/// Component tracking the single active player body.
#[derive(Component, Debug, Clone, Copy)]
pub struct Player {
    /// Current velocity in world units per second.
    pub velocity: Vec2,
    /// Cleared when the player falls into a hole; an inactive body neither
    /// steers nor steps until it is replaced on respawn.
    pub active: bool,
}
