//! Collision response: score, fuel, respawn and level completion.
//!
//! Contacts reported by the physics step land here and drive a small state
//! machine: `Playing` until the player hits a hole, `Transitioning` while
//! the respawn countdown runs, `LevelComplete` once the finish tile is
//! reached. The state transitions themselves are pure (`apply_contact`,
//! `tick_transition`); the systems only wire them to entities and events.

use crate::level::TileKind;
use crate::player::physics::ContactEvent;
use crate::player::Player;
use crate::settings::Settings;
use crate::world::{self, ActiveContacts, LevelLayout};
use bevy::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

/// Score after a change. Consumed by the HUD.
#[derive(Event, Debug, Clone, Copy)]
pub struct ScoreChanged(pub i32);

/// A collectible was picked up and despawned.
#[derive(Event, Debug, Clone, Copy)]
pub struct TileRemoved(pub Entity);

/// The player fell into a hole; a fresh body appears at `position` once
/// `delay` has elapsed. The presentation layer keys its crash animation off
/// this window.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerRespawning {
    pub position: Vec2,
    pub delay: f32,
}

/// The finish tile was reached. Emitted exactly once per level instance.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct LevelCompleted;

/// Where the level currently stands.
#[derive(Debug, Clone)]
pub enum Phase {
    Playing,
    /// Respawn countdown after a hole. The window exists so the host can
    /// play a crash animation before the fresh body appears.
    Transitioning { countdown: Timer },
    LevelComplete,
}

/// What a contact asks the ECS side to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOutcome {
    RemoveTile,
    Respawn { delay: f32 },
    Complete,
}

/// Per-level game state, mutated only by collision response.
#[derive(Resource, Debug, Clone)]
pub struct GameState {
    /// May go negative; holes cost a point.
    pub score: i32,
    /// Refilled by fuel pickups. Drain and gauge display are host concerns.
    pub fuel: f32,
    pub phase: Phase,
}

impl GameState {
    #[must_use]
    pub fn new(starting_fuel: f32) -> Self {
        GameState {
            score: 0,
            fuel: starting_fuel,
            phase: Phase::Playing,
        }
    }

    /// True outside `Playing`: physics stepping and steering are suspended.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        !matches!(self.phase, Phase::Playing)
    }

    /// Apply one contact to the state machine.
    ///
    /// Returns `None` for contacts that change nothing, including any
    /// contact arriving outside `Playing`: a hole reported during the
    /// respawn window must not double-charge the player.
    pub fn apply_contact(
        &mut self,
        kind: TileKind,
        respawn_delay: f32,
        fuel_refill: f32,
    ) -> Option<ContactOutcome> {
        if self.is_game_over() {
            return None;
        }
        match kind {
            TileKind::Wall => None,
            TileKind::Hole => {
                self.score -= 1;
                self.phase = Phase::Transitioning {
                    countdown: Timer::from_seconds(respawn_delay, TimerMode::Once),
                };
                Some(ContactOutcome::Respawn {
                    delay: respawn_delay,
                })
            }
            TileKind::Star => {
                self.score += 1;
                Some(ContactOutcome::RemoveTile)
            }
            TileKind::Fuel => {
                self.score += 1;
                self.fuel += fuel_refill;
                Some(ContactOutcome::RemoveTile)
            }
            TileKind::Finish => {
                self.phase = Phase::LevelComplete;
                Some(ContactOutcome::Complete)
            }
        }
    }

    /// Advance the respawn countdown. Returns true exactly once, when the
    /// countdown elapses; the phase flips back to `Playing` at that moment.
    pub fn tick_transition(&mut self, delta: Duration) -> bool {
        let Phase::Transitioning { countdown } = &mut self.phase else {
            return false;
        };
        if countdown.tick(delta).just_finished() {
            self.phase = Phase::Playing;
            return true;
        }
        false
    }
}

/// Turn contact events into score, removals, respawns and completion.
#[allow(clippy::needless_pass_by_value, clippy::too_many_arguments)]
pub fn handle_contacts(
    mut commands: Commands,
    mut events: EventReader<ContactEvent>,
    settings: Res<Settings>,
    layout: Res<LevelLayout>,
    mut state: ResMut<GameState>,
    mut players: Query<&mut Player>,
    mut score_events: EventWriter<ScoreChanged>,
    mut removed_events: EventWriter<TileRemoved>,
    mut respawn_events: EventWriter<PlayerRespawning>,
    mut completed_events: EventWriter<LevelCompleted>,
) {
    // Duplicate events for one tile in a single tick are no-ops.
    let mut handled: HashSet<Entity> = HashSet::new();

    for contact in events.read() {
        if contact.kind.is_collectible() && !handled.insert(contact.tile) {
            continue;
        }

        let score_before = state.score;
        let Some(outcome) = state.apply_contact(
            contact.kind,
            settings.physics.respawn_delay,
            settings.physics.fuel_refill,
        ) else {
            continue;
        };
        if state.score != score_before {
            score_events.send(ScoreChanged(state.score));
        }

        match outcome {
            ContactOutcome::RemoveTile => {
                if let Some(mut tile) = commands.get_entity(contact.tile) {
                    tile.despawn();
                    removed_events.send(TileRemoved(contact.tile));
                }
            }
            ContactOutcome::Respawn { delay } => {
                if let Ok(mut player) = players.get_single_mut() {
                    player.active = false;
                    player.velocity = Vec2::ZERO;
                }
                respawn_events.send(PlayerRespawning {
                    position: layout.start,
                    delay,
                });
            }
            ContactOutcome::Complete => {
                completed_events.send(LevelCompleted);
            }
        }
    }
}

/// Tick the respawn countdown; when it elapses, replace the player body
/// wholesale at the level start and forget all standing contacts.
#[allow(clippy::needless_pass_by_value)]
pub fn advance_respawn(
    mut commands: Commands,
    time: Res<Time>,
    layout: Res<LevelLayout>,
    mut state: ResMut<GameState>,
    mut contacts: ResMut<ActiveContacts>,
    players: Query<Entity, With<Player>>,
) {
    if !state.tick_transition(time.delta()) {
        return;
    }
    for entity in players.iter() {
        commands.entity(entity).despawn();
    }
    contacts.0.clear();
    world::spawn_player(&mut commands, layout.start);
    info!("player respawned at {:?}", layout.start);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::DEFAULT_START;
    use crate::world::Tile;

    const DELAY: f32 = 0.5;
    const REFILL: f32 = 25.0;

    fn contact(state: &mut GameState, kind: TileKind) -> Option<ContactOutcome> {
        state.apply_contact(kind, DELAY, REFILL)
    }

    #[test]
    fn star_scores_and_removes() {
        let mut state = GameState::new(100.0);
        assert_eq!(contact(&mut state, TileKind::Star), Some(ContactOutcome::RemoveTile));
        assert_eq!(state.score, 1);
        assert!(!state.is_game_over());
    }

    #[test]
    fn fuel_scores_and_refills() {
        let mut state = GameState::new(100.0);
        assert_eq!(contact(&mut state, TileKind::Fuel), Some(ContactOutcome::RemoveTile));
        assert_eq!(state.score, 1);
        assert!((state.fuel - 125.0).abs() < f32::EPSILON);
    }

    #[test]
    fn hole_penalizes_and_starts_countdown() {
        let mut state = GameState::new(100.0);
        assert_eq!(
            contact(&mut state, TileKind::Hole),
            Some(ContactOutcome::Respawn { delay: DELAY })
        );
        assert_eq!(state.score, -1, "score may go negative");
        assert!(state.is_game_over());
    }

    #[test]
    fn contacts_ignored_during_transition() {
        let mut state = GameState::new(100.0);
        contact(&mut state, TileKind::Hole);
        assert_eq!(contact(&mut state, TileKind::Star), None);
        assert_eq!(contact(&mut state, TileKind::Hole), None);
        assert_eq!(state.score, -1);
    }

    #[test]
    fn countdown_elapses_once_then_playing() {
        let mut state = GameState::new(100.0);
        contact(&mut state, TileKind::Hole);
        assert!(!state.tick_transition(Duration::from_millis(300)));
        assert!(state.tick_transition(Duration::from_millis(300)));
        assert!(!state.is_game_over());
        assert!(!state.tick_transition(Duration::from_millis(300)));
    }

    #[test]
    fn finish_completes_without_scoring() {
        let mut state = GameState::new(100.0);
        contact(&mut state, TileKind::Star);
        assert_eq!(contact(&mut state, TileKind::Finish), Some(ContactOutcome::Complete));
        assert_eq!(state.score, 1);
        // a second finish contact is inert: LevelCompleted fires exactly once
        assert_eq!(contact(&mut state, TileKind::Finish), None);
        assert!(state.is_game_over());
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.add_event::<ContactEvent>()
            .add_event::<ScoreChanged>()
            .add_event::<TileRemoved>()
            .add_event::<PlayerRespawning>()
            .add_event::<LevelCompleted>();
        app.insert_resource(Settings::default());
        app.insert_resource(LevelLayout {
            start: DEFAULT_START,
        });
        app.insert_resource(GameState::new(100.0));
        app.insert_resource(ActiveContacts::default());
        app.init_resource::<Time>();
        app.add_systems(Update, (handle_contacts, advance_respawn).chain());
        app
    }

    #[test]
    fn duplicate_contact_events_remove_once() {
        let mut app = test_app();
        let tile = app
            .world_mut()
            .spawn(Tile {
                kind: TileKind::Star,
                row: 3,
                column: 4,
            })
            .id();

        app.world_mut().send_event(ContactEvent {
            tile,
            kind: TileKind::Star,
        });
        app.world_mut().send_event(ContactEvent {
            tile,
            kind: TileKind::Star,
        });
        app.update();

        assert_eq!(app.world().resource::<GameState>().score, 1);
        assert!(app.world().get_entity(tile).is_none());
    }

    #[test]
    fn hole_contact_deactivates_player() {
        let mut app = test_app();
        let player = app
            .world_mut()
            .spawn(Player {
                velocity: Vec2::new(40.0, 0.0),
                active: true,
            })
            .id();
        let tile = app
            .world_mut()
            .spawn(Tile {
                kind: TileKind::Hole,
                row: 1,
                column: 1,
            })
            .id();

        app.world_mut().send_event(ContactEvent {
            tile,
            kind: TileKind::Hole,
        });
        app.update();

        let body = app.world().get::<Player>(player).unwrap();
        assert!(!body.active);
        assert_eq!(body.velocity, Vec2::ZERO);
        // holes are permanent: the tile survives
        assert!(app.world().get_entity(tile).is_some());
        assert!(app.world().resource::<GameState>().is_game_over());
    }

    #[test]
    fn respawn_replaces_player_after_delay() {
        let mut app = test_app();
        let old_player = app
            .world_mut()
            .spawn(Player {
                velocity: Vec2::new(25.0, 0.0),
                active: true,
            })
            .id();
        let hole = app
            .world_mut()
            .spawn(Tile {
                kind: TileKind::Hole,
                row: 2,
                column: 2,
            })
            .id();
        app.world_mut()
            .resource_mut::<ActiveContacts>()
            .0
            .insert(hole);

        app.world_mut().send_event(ContactEvent {
            tile: hole,
            kind: TileKind::Hole,
        });
        app.update();

        // halfway through the countdown the old body is still there
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(300));
        app.update();
        assert!(app.world().resource::<GameState>().is_game_over());
        assert!(!app.world().get::<Player>(old_player).unwrap().active);

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(300));
        app.update();

        assert!(!app.world().resource::<GameState>().is_game_over());
        assert!(app.world().get_entity(old_player).is_none());
        assert!(app.world().resource::<ActiveContacts>().0.is_empty());

        let mut bodies = app.world_mut().query::<(&Player, &Transform)>();
        let players: Vec<_> = bodies.iter(app.world()).collect();
        assert_eq!(players.len(), 1);
        assert!(players[0].0.active);
        assert_eq!(players[0].0.velocity, Vec2::ZERO);
        assert_eq!(players[0].1.translation.truncate(), DEFAULT_START);
    }
}
