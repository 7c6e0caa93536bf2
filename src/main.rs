use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use gridlock::level::loader as level_loader;
use gridlock::level::loader::LevelWatcher;
use gridlock::player::physics::ContactEvent;
use gridlock::player::{apply_steering, player_physics, Gravity, GravityUpdated, SteeringSample};
use gridlock::rules::{
    advance_respawn, handle_contacts, GameState, LevelCompleted, PlayerRespawning, ScoreChanged,
    TileRemoved,
};
use gridlock::settings::loader as settings_loader;
use gridlock::settings::loader::{SettingsWatcher, SETTINGS_DIR};
use gridlock::ui::{
    render_collider_shapes, setup_debug_overlay, spawn_hud, toggle_collider_overlay,
    toggle_debug_overlay, update_debug_overlay, update_score_text, update_status_banner,
};
use gridlock::world::{ActiveContacts, LevelLayout};

mod app;
use app::{capture_steering_sample, setup, sync_vsync_settings};

const LEVEL_DIR: &str = "data/levels";
const LEVEL_FILE: &str = "level1.txt";

fn main() {
    let settings = settings_loader::load_settings_from_dir(SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(SETTINGS_DIR)
        .unwrap_or_else(|_| SettingsWatcher::stub());

    // The initial level load is fatal on failure: no partial level is usable.
    let level = match level_loader::load_level_from_path(format!("{LEVEL_DIR}/{LEVEL_FILE}")) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("fatal: {e}");
            std::process::exit(1);
        }
    };
    let level_watcher = level_loader::setup_level_watcher(LEVEL_DIR, LEVEL_FILE)
        .unwrap_or_else(|_| LevelWatcher::stub(LEVEL_DIR, LEVEL_FILE));

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: settings.window.title.clone(),
            resolution: (settings.window.width, settings.window.height).into(),
            present_mode: if settings.window.vsync {
                PresentMode::AutoVsync
            } else {
                PresentMode::AutoNoVsync
            },
            ..default()
        }),
        ..default()
    }))
    .add_plugins(FrameTimeDiagnosticsPlugin);

    app.add_event::<ContactEvent>()
        .add_event::<ScoreChanged>()
        .add_event::<TileRemoved>()
        .add_event::<PlayerRespawning>()
        .add_event::<LevelCompleted>()
        .add_event::<GravityUpdated>();

    app.insert_resource(LevelLayout { start: level.start });
    app.insert_resource(GameState::new(settings.physics.starting_fuel));
    app.insert_resource(ActiveContacts::default());
    app.insert_resource(Gravity::default());
    app.insert_resource(SteeringSample::default());
    app.insert_resource(level);
    app.insert_resource(level_watcher);
    app.insert_resource(settings.clone());
    app.insert_resource(settings_watcher);

    app.add_systems(Startup, (setup_debug_overlay, spawn_hud, setup));

    // one simulation tick: input -> steering -> physics -> response -> respawn
    app.add_systems(
        Update,
        (
            capture_steering_sample,
            apply_steering,
            player_physics,
            handle_contacts,
            advance_respawn,
        )
            .chain(),
    );

    app.add_systems(
        Update,
        (
            settings_loader::check_settings_changes,
            level_loader::check_level_changes,
            sync_vsync_settings,
        ),
    );

    app.add_systems(
        Update,
        (
            update_score_text,
            update_status_banner,
            toggle_debug_overlay,
            toggle_collider_overlay,
            update_debug_overlay,
            render_collider_shapes,
        ),
    );

    app.run();
}
