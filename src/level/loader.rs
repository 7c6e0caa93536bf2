//! Level file loading and hot reload.
//!
//! The level grid lives as plain text under `data/levels/`. The initial load
//! happens before the app starts and is fatal on failure; once running, a
//! watcher lets the grid be edited live, with a full world rebuild on each
//! successful reload.

use crate::hotload::{self, FileWatcher};
use crate::level::{self, ParseError, ParsedLevel};
use crate::player::steering::{Gravity, GravityUpdated};
use crate::player::Player;
use crate::rules::GameState;
use crate::settings::Settings;
use crate::world::{self, ActiveContacts, LevelEntity, LevelLayout};
use bevy::prelude::*;
use std::fmt;
use std::path::Path;

/// Why a level failed to load.
#[derive(Debug)]
pub enum LevelLoadError {
    Io(std::io::Error),
    Parse(ParseError),
}

impl fmt::Display for LevelLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelLoadError::Io(e) => write!(f, "could not read level file: {e}"),
            LevelLoadError::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LevelLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelLoadError::Io(e) => Some(e),
            LevelLoadError::Parse(e) => Some(e),
        }
    }
}

impl From<ParseError> for LevelLoadError {
    fn from(e: ParseError) -> Self {
        LevelLoadError::Parse(e)
    }
}

impl From<std::io::Error> for LevelLoadError {
    fn from(e: std::io::Error) -> Self {
        LevelLoadError::Io(e)
    }
}

/// Read and parse a level file.
///
/// # Errors
/// Fails if the file cannot be read or any glyph falls outside the level
/// grammar. Either way the level is unusable; there is no partial load.
pub fn load_level_from_path(path: impl AsRef<Path>) -> Result<ParsedLevel, LevelLoadError> {
    let text = std::fs::read_to_string(path)?;
    Ok(level::parse_level(&text)?)
}

#[derive(Resource)]
pub struct LevelWatcher {
    pub watcher: FileWatcher,
    pub path: String,
}

/// Watch the level directory for edits.
///
/// # Errors
/// Returns a `notify::Error` if the OS watcher cannot be created.
pub fn setup_level_watcher(dir: &str, file: &str) -> Result<LevelWatcher, notify::Error> {
    Ok(LevelWatcher {
        watcher: hotload::watch_dir(dir)?,
        path: format!("{dir}/{file}"),
    })
}

impl LevelWatcher {
    #[must_use]
    pub fn stub(dir: &str, file: &str) -> Self {
        LevelWatcher {
            watcher: FileWatcher::stub(),
            path: format!("{dir}/{file}"),
        }
    }
}

/// Rebuild the world when the level file changes on disk.
///
/// A reload is a full `load`: every level entity and the player are
/// despawned and respawned, and score, contacts, gravity and any in-flight
/// respawn countdown are discarded. A parse failure on *reload* keeps the
/// running level (only the initial load is fatal).
#[allow(clippy::needless_pass_by_value, clippy::too_many_arguments)]
pub fn check_level_changes(
    mut commands: Commands,
    watcher: Res<LevelWatcher>,
    settings: Res<Settings>,
    mut current: ResMut<ParsedLevel>,
    mut layout: ResMut<LevelLayout>,
    mut state: ResMut<GameState>,
    mut contacts: ResMut<ActiveContacts>,
    mut gravity: ResMut<Gravity>,
    mut gravity_events: EventWriter<GravityUpdated>,
    tiles: Query<Entity, With<LevelEntity>>,
    players: Query<Entity, With<Player>>,
) {
    if !watcher.watcher.take_changed() {
        return;
    }

    let reloaded = match load_level_from_path(&watcher.path) {
        Ok(level) => level,
        Err(e) => {
            warn!("level reload failed, keeping current level: {e}");
            return;
        }
    };

    info!("level changed, rebuilding world");
    for entity in tiles.iter().chain(players.iter()) {
        commands.entity(entity).despawn();
    }

    layout.start = reloaded.start;
    *state = GameState::new(settings.physics.starting_fuel);
    contacts.0.clear();
    gravity.0 = Vec2::ZERO;
    gravity_events.send(GravityUpdated(Vec2::ZERO));

    world::spawn_level(&mut commands, &reloaded);
    *current = reloaded;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{parse_level, TileKind};
    use crate::world::Tile;

    fn write_temp_level(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).expect("temp level file");
        path.to_string_lossy().into_owned()
    }

    fn reload_app(path: String) -> App {
        let mut app = App::new();
        app.add_event::<GravityUpdated>();
        app.insert_resource(Settings::default());
        let initial = parse_level("x").unwrap();
        app.insert_resource(LevelLayout {
            start: initial.start,
        });
        app.insert_resource(initial);
        app.insert_resource(GameState::new(100.0));
        app.insert_resource(ActiveContacts::default());
        app.insert_resource(Gravity(Vec2::new(3.0, -2.0)));
        app.insert_resource(LevelWatcher {
            watcher: FileWatcher::stub(),
            path,
        });
        app.add_systems(Update, check_level_changes);
        app
    }

    /// Spawn the running world's remnants: one wall tile and an inactive
    /// player, with the tile held in the standing-contact set.
    fn seed_running_world(app: &mut App) -> (Entity, Entity) {
        let tile = app
            .world_mut()
            .spawn((
                Tile {
                    kind: TileKind::Wall,
                    row: 0,
                    column: 0,
                },
                LevelEntity,
            ))
            .id();
        let player = app
            .world_mut()
            .spawn(Player {
                velocity: Vec2::new(10.0, 0.0),
                active: false,
            })
            .id();
        app.world_mut()
            .resource_mut::<ActiveContacts>()
            .0
            .insert(tile);
        (tile, player)
    }

    #[test]
    fn reload_rebuilds_world_and_resets_state() {
        let path = write_temp_level(
            &format!("gridlock_reload_ok_{}.txt", std::process::id()),
            "  z\np  \n",
        );
        let mut app = reload_app(path);
        let (old_tile, old_player) = seed_running_world(&mut app);
        app.world_mut()
            .resource_mut::<GameState>()
            .apply_contact(TileKind::Hole, 0.5, 25.0);

        app.world()
            .resource::<LevelWatcher>()
            .watcher
            .mark_changed();
        app.update();

        // a reload is a fresh load: score, countdown, contacts and gravity
        // are all discarded
        let state = app.world().resource::<GameState>();
        assert_eq!(state.score, 0);
        assert!(!state.is_game_over());
        assert!(app.world().resource::<ActiveContacts>().0.is_empty());
        assert_eq!(app.world().resource::<Gravity>().0, Vec2::ZERO);
        assert!(!app.world().resource::<Events<GravityUpdated>>().is_empty());

        assert!(app.world().get_entity(old_tile).is_none());
        assert!(app.world().get_entity(old_player).is_none());
        assert_eq!(
            app.world().resource::<LevelLayout>().start,
            level::tile_centre(0, 0)
        );
        assert_eq!(
            *app.world().resource::<ParsedLevel>(),
            parse_level("  z\np  \n").unwrap()
        );

        let mut tiles = app.world_mut().query::<&Tile>();
        let kinds: Vec<TileKind> = tiles.iter(app.world()).map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TileKind::Finish]);

        let mut bodies = app.world_mut().query::<(&Player, &Transform)>();
        let players: Vec<_> = bodies.iter(app.world()).collect();
        assert_eq!(players.len(), 1);
        assert!(players[0].0.active);
        assert_eq!(
            players[0].1.translation.truncate(),
            level::tile_centre(0, 0)
        );
    }

    #[test]
    fn failed_reload_keeps_running_level() {
        let path = write_temp_level(
            &format!("gridlock_reload_bad_{}.txt", std::process::id()),
            "q\n",
        );
        let mut app = reload_app(path);
        let (tile, player) = seed_running_world(&mut app);
        app.world_mut()
            .resource_mut::<GameState>()
            .apply_contact(TileKind::Star, 0.5, 25.0);

        app.world()
            .resource::<LevelWatcher>()
            .watcher
            .mark_changed();
        app.update();

        assert_eq!(
            *app.world().resource::<ParsedLevel>(),
            parse_level("x").unwrap()
        );
        assert!(app.world().get_entity(tile).is_some());
        assert!(app.world().get_entity(player).is_some());
        assert_eq!(app.world().resource::<GameState>().score, 1);
        assert!(!app.world().resource::<ActiveContacts>().0.is_empty());
        assert_eq!(app.world().resource::<Gravity>().0, Vec2::new(3.0, -2.0));
        assert!(app.world().resource::<Events<GravityUpdated>>().is_empty());
    }
}
