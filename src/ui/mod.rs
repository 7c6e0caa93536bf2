//! HUD and debug overlay.
//!
//! Thin presentation glue: a score label and status banner fed by the
//! rules events, an F1 overlay with simulation internals refreshed on a
//! timer, and an F2 gizmo overlay outlining the collision shapes.

use crate::level::TileKind;
use crate::player::steering::Gravity;
use crate::player::{Player, PLAYER_RADIUS};
use crate::rules::{GameState, LevelCompleted, Phase, PlayerRespawning, ScoreChanged};
use crate::settings::Settings;
use crate::world::Tile;
use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

#[derive(Component)]
pub struct ScoreText;

#[derive(Component)]
pub struct StatusText;

#[derive(Component)]
pub struct DebugOverlayText;

/// Whether the F1 overlay is currently shown.
#[derive(Resource, Default)]
pub struct DebugOverlayState {
    pub visible: bool,
}

#[derive(Resource, Default)]
pub struct DebugOverlayTimer(pub Timer);

#[derive(Resource, Default)]
pub struct ColliderOverlayVisible(pub bool);

/// What the status banner currently shows, tracked separately so clearing
/// never depends on the rendered string.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    #[default]
    Empty,
    Crashed,
    Complete,
}

/// Insert the overlay resources.
pub fn setup_debug_overlay(mut commands: Commands) {
    commands.insert_resource(DebugOverlayTimer(Timer::from_seconds(
        0.5,
        TimerMode::Repeating,
    )));
    commands.insert_resource(DebugOverlayState::default());
    commands.insert_resource(ColliderOverlayVisible::default());
}

fn hud_text(value: &str, font_size: f32, color: Color) -> Text {
    Text::from_section(
        value,
        TextStyle {
            font_size,
            color,
            ..default()
        },
    )
}

/// Spawn the score label, status banner and the (initially empty) debug
/// overlay text.
pub fn spawn_hud(mut commands: Commands) {
    commands.insert_resource(Banner::default());

    commands.spawn((
        TextBundle {
            text: hud_text("Score: 0", 28.0, Color::WHITE),
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(16.0),
                bottom: Val::Px(12.0),
                ..default()
            },
            ..default()
        },
        ScoreText,
    ));

    commands.spawn((
        TextBundle {
            text: hud_text("", 40.0, Color::srgb(1.0, 0.9, 0.3)),
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Percent(38.0),
                top: Val::Percent(42.0),
                ..default()
            },
            ..default()
        },
        StatusText,
    ));

    commands.spawn((
        TextBundle {
            text: hud_text("", 18.0, Color::srgb(1.0, 1.0, 0.0)),
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            ..default()
        },
        DebugOverlayText,
    ));
}

/// Mirror `ScoreChanged` events into the score label.
pub fn update_score_text(
    mut events: EventReader<ScoreChanged>,
    mut query: Query<&mut Text, With<ScoreText>>,
) {
    let Some(ScoreChanged(score)) = events.read().last() else {
        return;
    };
    if let Ok(mut text) = query.get_single_mut() {
        text.sections[0].value = format!("Score: {score}");
    }
}

/// Drive the status banner from the game phase: crash notice during the
/// respawn window, a persistent banner on completion.
#[allow(clippy::needless_pass_by_value)]
pub fn update_status_banner(
    state: Res<GameState>,
    mut banner: ResMut<Banner>,
    mut respawns: EventReader<PlayerRespawning>,
    mut completed: EventReader<LevelCompleted>,
    mut query: Query<&mut Text, With<StatusText>>,
) {
    let completed_now = completed.read().next().is_some();
    let crashed_now = respawns.read().next().is_some();

    let next = if completed_now {
        Banner::Complete
    } else if crashed_now {
        Banner::Crashed
    } else if *banner == Banner::Crashed && matches!(state.phase, Phase::Playing) {
        Banner::Empty
    } else {
        *banner
    };
    if next == *banner {
        return;
    }
    *banner = next;

    if let Ok(mut text) = query.get_single_mut() {
        text.sections[0].value = match next {
            Banner::Empty => String::new(),
            Banner::Crashed => "Crashed!".to_string(),
            Banner::Complete => "Level complete!".to_string(),
        };
    }
}

/// Toggle the debug overlay with the bound key (default F1).
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_debug_overlay(
    mut state: ResMut<DebugOverlayState>,
    settings: Res<Settings>,
    input: Res<ButtonInput<KeyCode>>,
) {
    if input.just_pressed(settings.keybind("toggle_debug", KeyCode::F1)) {
        state.visible = !state.visible;
    }
}

/// Toggle the collider outlines with the bound key (default F2).
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_collider_overlay(
    mut overlay: ResMut<ColliderOverlayVisible>,
    settings: Res<Settings>,
    input: Res<ButtonInput<KeyCode>>,
) {
    if input.just_pressed(settings.keybind("toggle_colliders", KeyCode::F2)) {
        overlay.0 = !overlay.0;
    }
}

#[derive(bevy::ecs::system::SystemParam)]
pub struct DebugOverlayCtx<'w, 's> {
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub state: Res<'w, DebugOverlayState>,
    pub game: Res<'w, GameState>,
    pub gravity: Res<'w, Gravity>,
    pub time: Res<'w, Time>,
    pub timer: ResMut<'w, DebugOverlayTimer>,
    pub query: Query<'w, 's, &'static mut Text, With<DebugOverlayText>>,
    pub player_query: Query<'w, 's, (&'static Transform, &'static Player)>,
}

/// Refresh the debug overlay at a fixed interval so diagnostics are not
/// queried every frame.
pub fn update_debug_overlay(mut ctx: DebugOverlayCtx<'_, '_>) {
    if !ctx.timer.0.tick(ctx.time.delta()).just_finished() {
        return;
    }
    let Ok(mut text) = ctx.query.get_single_mut() else {
        return;
    };
    if !ctx.state.visible {
        text.sections[0].value = String::new();
        return;
    }

    let fps = ctx
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    let (pos_str, vel_str) = if let Ok((transform, player)) = ctx.player_query.get_single() {
        (
            format!(
                "Pos: ({:.1}, {:.1})",
                transform.translation.x, transform.translation.y
            ),
            format!("Vel: ({:.1}, {:.1})", player.velocity.x, player.velocity.y),
        )
    } else {
        ("Pos: N/A".to_string(), "Vel: N/A".to_string())
    };

    let phase = match ctx.game.phase {
        Phase::Playing => "playing",
        Phase::Transitioning { .. } => "respawning",
        Phase::LevelComplete => "complete",
    };

    text.sections[0].value = format!(
        "FPS: {:.1}\nGravity: ({:.2}, {:.2})\n{}\n{}\nScore: {} | Fuel: {:.0} | {}",
        fps,
        ctx.gravity.0.x,
        ctx.gravity.0.y,
        pos_str,
        vel_str,
        ctx.game.score,
        ctx.game.fuel,
        phase,
    );
}

/// Outline every collision shape with gizmos when the overlay is on.
#[allow(clippy::needless_pass_by_value)]
pub fn render_collider_shapes(
    overlay: Res<ColliderOverlayVisible>,
    mut gizmos: Gizmos,
    tiles: Query<(&Tile, &Transform)>,
    players: Query<&Transform, With<Player>>,
) {
    if !overlay.0 {
        return;
    }
    let green = Color::srgb(0.0, 1.0, 0.0);

    for (tile, transform) in tiles.iter() {
        let centre = transform.translation.truncate();
        match crate::player::physics::sensor_shape(tile.kind) {
            crate::player::physics::SensorShape::Circle(r) => {
                gizmos.circle_2d(centre, r, green);
            }
            crate::player::physics::SensorShape::Rect(half) => {
                let color = if tile.kind == TileKind::Wall {
                    Color::srgb(1.0, 0.3, 0.3)
                } else {
                    green
                };
                gizmos.rect_2d(centre, 0.0, half * 2.0, color);
            }
        }
    }

    if let Ok(transform) = players.get_single() {
        gizmos.circle_2d(
            transform.translation.truncate(),
            PLAYER_RADIUS,
            Color::srgb(0.3, 0.6, 1.0),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn banner_app() -> App {
        let mut app = App::new();
        app.add_event::<PlayerRespawning>()
            .add_event::<LevelCompleted>();
        app.insert_resource(GameState::new(100.0));
        app.insert_resource(Banner::default());
        app.add_systems(Update, update_status_banner);
        app.world_mut()
            .spawn((hud_text("", 40.0, Color::WHITE), StatusText));
        app
    }

    fn banner_text(app: &mut App) -> String {
        let mut query = app.world_mut().query_filtered::<&Text, With<StatusText>>();
        query.single(app.world()).sections[0].value.clone()
    }

    #[test]
    fn crash_banner_clears_when_playing_resumes() {
        let mut app = banner_app();
        app.world_mut()
            .resource_mut::<GameState>()
            .apply_contact(TileKind::Hole, 0.5, 25.0);
        app.world_mut().send_event(PlayerRespawning {
            position: Vec2::ZERO,
            delay: 0.5,
        });
        app.update();
        assert_eq!(banner_text(&mut app), "Crashed!");

        // the banner stays up for the whole respawn window
        app.update();
        assert_eq!(banner_text(&mut app), "Crashed!");
        assert_eq!(*app.world().resource::<Banner>(), Banner::Crashed);

        app.world_mut()
            .resource_mut::<GameState>()
            .tick_transition(Duration::from_secs(1));
        app.update();
        assert_eq!(banner_text(&mut app), "");
        assert_eq!(*app.world().resource::<Banner>(), Banner::Empty);
    }

    #[test]
    fn completion_banner_persists() {
        let mut app = banner_app();
        app.world_mut()
            .resource_mut::<GameState>()
            .apply_contact(TileKind::Finish, 0.5, 25.0);
        app.world_mut().send_event(LevelCompleted);
        app.update();
        app.update();
        assert_eq!(banner_text(&mut app), "Level complete!");
        assert_eq!(*app.world().resource::<Banner>(), Banner::Complete);
    }
}
