//! Scene setup: camera, background, and the initial level spawn.

use bevy::prelude::*;
use gridlock::level::ParsedLevel;
use gridlock::settings::Settings;
use gridlock::world;

/// Spawn the camera and background, then build the level.
///
/// The camera sits at the scene centre so world coordinates run from the
/// bottom-left corner, matching the level grid's row-0-at-the-bottom
/// convention.
#[allow(clippy::needless_pass_by_value)]
pub fn setup(mut commands: Commands, settings: Res<Settings>, level: Res<ParsedLevel>) {
    let centre = Vec2::new(settings.window.width / 2.0, settings.window.height / 2.0);

    let mut camera = Camera2dBundle::default();
    camera.transform.translation.x = centre.x;
    camera.transform.translation.y = centre.y;
    commands.spawn(camera);

    // asphalt-coloured backdrop behind everything
    commands.spawn(SpriteBundle {
        sprite: Sprite {
            color: Color::srgb(0.16, 0.16, 0.18),
            custom_size: Some(Vec2::new(settings.window.width, settings.window.height)),
            ..default()
        },
        transform: Transform::from_translation(centre.extend(-1.0)),
        ..default()
    });

    world::spawn_level(&mut commands, &level);
}
