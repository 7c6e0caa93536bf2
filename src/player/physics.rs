//! Player physics: gravity integration, wall contact and sensor overlap.
//!
//! One tick advances the player body under the current gravity vector with
//! linear damping, pushes it back out of any wall it penetrated, and then
//! tests the collision circle against every sensor tile (holes, stars,
//! fuel, finish). Sensors exert no collision response; they only raise
//! `ContactEvent`s, edge-triggered through `ActiveContacts`.
//!
//! The pure core is `step_player`, so tests and benchmarks exercise exactly
//! what the `player_physics` system runs.

use crate::level::{TileKind, TILE_SIZE};
use crate::player::{Player, PLAYER_RADIUS};
use crate::player::steering::Gravity;
use crate::rules::GameState;
use crate::settings::Settings;
use crate::world::{ActiveContacts, Solid, Tile};
use bevy::prelude::*;
use std::collections::HashSet;

/// Gravity samples arrive in accelerometer-style units; this converts them
/// to world units per second squared (SpriteKit's point-per-metre ratio).
pub const PIXELS_PER_METRE: f32 = 150.0;

/// Wall-correction passes per tick. Corner contacts can re-introduce a
/// small penetration against the neighbouring wall, so correction iterates
/// until the position settles.
const MAX_CORRECTION_PASSES: usize = 4;

/// Raised once per sensor entry; the rules module turns these into score,
/// removal or respawn effects.
#[derive(Event, Debug, Clone, Copy)]
pub struct ContactEvent {
    pub tile: Entity,
    pub kind: TileKind,
}

/// Collision footprint of a sensor tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorShape {
    Circle(f32),
    Rect(Vec2),
}

/// Footprint per tile kind. Holes are shrunk below the tile so the player
/// only falls in when genuinely over the gap, not when touching the cracks.
#[must_use]
pub fn sensor_shape(kind: TileKind) -> SensorShape {
    match kind {
        TileKind::Hole => SensorShape::Circle(TILE_SIZE / 2.2),
        TileKind::Star => SensorShape::Circle(TILE_SIZE / 2.0),
        TileKind::Fuel | TileKind::Finish | TileKind::Wall => {
            SensorShape::Rect(Vec2::splat(TILE_SIZE / 2.0))
        }
    }
}

/// Advance a velocity one tick: accelerate under gravity, then apply
/// per-second linear damping (`(1 - damping)^dt`).
#[must_use]
pub fn integrate(velocity: Vec2, gravity: Vec2, damping: f32, dt: f32) -> Vec2 {
    let v = velocity + gravity * PIXELS_PER_METRE * dt;
    v * (1.0 - damping).clamp(0.0, 1.0).powf(dt)
}

/// Minimum translation pushing a circle out of a rectangle, or `None` when
/// they do not overlap.
#[must_use]
pub fn circle_rect_mtv(centre: Vec2, radius: f32, rect_centre: Vec2, half: Vec2) -> Option<Vec2> {
    let closest = centre.clamp(rect_centre - half, rect_centre + half);
    let delta = centre - closest;
    let dist_sq = delta.length_squared();
    if dist_sq >= radius * radius {
        return None;
    }
    if dist_sq > 1e-12 {
        let dist = dist_sq.sqrt();
        return Some(delta / dist * (radius - dist));
    }
    // Centre inside the rectangle: push out along the shallower axis.
    let offset = centre - rect_centre;
    let pen_x = half.x + radius - offset.x.abs();
    let pen_y = half.y + radius - offset.y.abs();
    if pen_x < pen_y {
        Some(Vec2::new(pen_x * offset.x.signum(), 0.0))
    } else {
        Some(Vec2::new(0.0, pen_y * offset.y.signum()))
    }
}

/// Does the player circle overlap a sensor tile of `kind` centred at
/// `tile_centre`?
#[must_use]
pub fn player_overlaps(player_centre: Vec2, kind: TileKind, tile_centre: Vec2) -> bool {
    match sensor_shape(kind) {
        SensorShape::Circle(r) => {
            let reach = PLAYER_RADIUS + r;
            player_centre.distance_squared(tile_centre) < reach * reach
        }
        SensorShape::Rect(half) => {
            circle_rect_mtv(player_centre, PLAYER_RADIUS, tile_centre, half).is_some()
        }
    }
}

/// Step the player body one tick and resolve wall contact.
///
/// `walls` are tile centres (all walls are full-tile rectangles). Returns
/// the corrected position and velocity; the position never penetrates any
/// wall on return, and the velocity component into each contact normal is
/// removed so the body slides instead of bouncing.
#[must_use]
pub fn step_player(
    position: Vec2,
    velocity: Vec2,
    gravity: Vec2,
    damping: f32,
    dt: f32,
    walls: &[Vec2],
) -> (Vec2, Vec2) {
    let half = Vec2::splat(TILE_SIZE / 2.0);
    let mut vel = integrate(velocity, gravity, damping, dt);
    let mut pos = position + vel * dt;

    for _ in 0..MAX_CORRECTION_PASSES {
        let mut corrected = false;
        for &wall in walls {
            if let Some(mtv) = circle_rect_mtv(pos, PLAYER_RADIUS, wall, half) {
                pos += mtv;
                let normal = mtv.normalize_or_zero();
                let into = vel.dot(normal);
                if into < 0.0 {
                    vel -= normal * into;
                }
                corrected = true;
            }
        }
        if !corrected {
            break;
        }
    }

    (pos, vel)
}

/// Advance the player one tick and emit contact events for sensors entered
/// this tick. Does nothing while the game is over.
#[allow(clippy::needless_pass_by_value, clippy::too_many_arguments)]
pub fn player_physics(
    time: Res<Time>,
    gravity: Res<Gravity>,
    state: Res<GameState>,
    settings: Res<Settings>,
    mut players: Query<(&mut Transform, &mut Player)>,
    walls: Query<&Transform, (With<Solid>, Without<Player>)>,
    sensors: Query<(Entity, &Tile, &Transform), (Without<Solid>, Without<Player>)>,
    mut contacts: ResMut<ActiveContacts>,
    mut events: EventWriter<ContactEvent>,
) {
    if state.is_game_over() {
        debug!("physics step skipped while game over");
        return;
    }
    let Ok((mut transform, mut player)) = players.get_single_mut() else {
        return;
    };
    if !player.active {
        return;
    }
    let dt = time.delta_seconds();
    if dt <= 0.0 {
        return;
    }

    let wall_centres: Vec<Vec2> = walls.iter().map(|t| t.translation.truncate()).collect();
    let (pos, vel) = step_player(
        transform.translation.truncate(),
        player.velocity,
        gravity.0,
        settings.physics.linear_damping,
        dt,
        &wall_centres,
    );
    transform.translation.x = pos.x;
    transform.translation.y = pos.y;
    player.velocity = vel;

    let mut current = HashSet::new();
    for (entity, tile, tile_transform) in sensors.iter() {
        if player_overlaps(pos, tile.kind, tile_transform.translation.truncate()) {
            current.insert(entity);
            if !contacts.0.contains(&entity) {
                events.send(ContactEvent {
                    tile: entity,
                    kind: tile.kind,
                });
            }
        }
    }
    contacts.0 = current;
}
