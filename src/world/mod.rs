//! World model: the authoritative set of spawned level entities.
//!
//! Tiles and the player are plain ECS entities; this module owns their
//! spawning, the level start position used for respawns, and the contact
//! memory that makes sensor overlaps edge-triggered. Physics and the
//! collision rules read from here, nothing else mutates it mid-tick.

use crate::level::{ParsedLevel, TileKind, TILE_SIZE};
use crate::player;
use bevy::prelude::*;
use std::collections::HashSet;

/// One placed level tile. Position is carried by the `Transform`.
#[derive(Component, Debug, Clone, Copy)]
pub struct Tile {
    pub kind: TileKind,
    pub row: usize,
    pub column: usize,
}

/// Marker for tiles that block the player (walls).
#[derive(Component)]
pub struct Solid;

/// Marker for everything despawned wholesale on a level reload.
#[derive(Component)]
pub struct LevelEntity;

/// Where the player (re)spawns. Single source of truth for the level start.
#[derive(Resource, Debug, Clone, Copy)]
pub struct LevelLayout {
    pub start: Vec2,
}

/// Sensor entities the player currently overlaps. Contacts only fire on
/// entry; cleared on respawn so a hole can claim the player again.
#[derive(Resource, Default)]
pub struct ActiveContacts(pub HashSet<Entity>);

fn tile_sprite(kind: TileKind) -> Sprite {
    let (color, size) = match kind {
        TileKind::Wall => (Color::srgb(0.35, 0.35, 0.4), Vec2::splat(TILE_SIZE)),
        TileKind::Hole => (Color::srgb(0.05, 0.05, 0.05), Vec2::splat(56.0)),
        TileKind::Star => (Color::srgb(0.95, 0.85, 0.2), Vec2::splat(40.0)),
        TileKind::Fuel => (Color::srgb(0.2, 0.8, 0.3), Vec2::new(44.0, 52.0)),
        TileKind::Finish => (Color::srgb(0.9, 0.9, 0.9), Vec2::splat(TILE_SIZE)),
    };
    Sprite {
        color,
        custom_size: Some(size),
        ..default()
    }
}

/// Spawn every tile of a parsed level plus a fresh player at its start.
pub fn spawn_level(commands: &mut Commands, level: &ParsedLevel) {
    for placed in &level.tiles {
        let mut entity = commands.spawn((
            Tile {
                kind: placed.kind,
                row: placed.row,
                column: placed.column,
            },
            LevelEntity,
            SpriteBundle {
                sprite: tile_sprite(placed.kind),
                transform: Transform::from_translation(placed.position.extend(0.0)),
                ..default()
            },
        ));
        if placed.kind.is_solid() {
            entity.insert(Solid);
        }
    }

    spawn_player(commands, level.start);
}

/// Spawn a fresh player body at `position`. Respawn replaces the old entity
/// wholesale rather than patching it, so stale velocity or contact state
/// cannot leak across a crash.
pub fn spawn_player(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            player::Player {
                velocity: Vec2::ZERO,
                active: true,
            },
            SpriteBundle {
                sprite: Sprite {
                    color: Color::srgb(0.85, 0.2, 0.15),
                    custom_size: Some(Vec2::splat(player::PLAYER_RADIUS * 2.0)),
                    ..default()
                },
                transform: Transform::from_translation(position.extend(1.0)),
                ..default()
            },
        ))
        .id()
}
