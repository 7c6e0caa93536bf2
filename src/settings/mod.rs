//! Settings, types and defaults.
//!
//! Settings live as a RON file under `data/settings/` and hot-reload
//! through the shared file watcher (see `hotload`). Every field has a
//! defaulting function so a partial file still loads.

use bevy::prelude::{KeyCode, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "WindowSettings::default_title")]
    pub title: String,
    #[serde(default = "WindowSettings::default_width")]
    pub width: f32, // Scene width in world units; the level grid assumes 16 tiles
    #[serde(default = "WindowSettings::default_height")]
    pub height: f32, // Scene height in world units; 12 tiles
    #[serde(default = "WindowSettings::default_vsync")]
    pub vsync: bool, // Cap FPS to the display refresh rate
}

impl WindowSettings {
    fn default_title() -> String { "Gridlock".to_string() }
    fn default_width() -> f32 { 1024.0 }
    fn default_height() -> f32 { 768.0 }
    fn default_vsync() -> bool { true }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            width: Self::default_width(),
            height: Self::default_height(),
            vsync: Self::default_vsync(),
        }
    }
}

/// Which steering source drives gravity. Exactly one mode is active per
/// run; the simulation core never switches modes on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Steer toward the held pointer (touch or mouse).
    Pointer,
    /// Steer from a two-axis tilt sample (arrow keys stand in on desktop).
    Tilt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default = "ControlsSettings::default_input_mode")]
    pub input_mode: InputMode,
    #[serde(default = "ControlsSettings::default_tilt_step")]
    pub tilt_step: f32, // Device-unit magnitude of the simulated tilt sample per held arrow key
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Action name -> key identifier
}

impl ControlsSettings {
    fn default_input_mode() -> InputMode { InputMode::Pointer }
    fn default_tilt_step() -> f32 { 0.25 }

    fn default_keybinds() -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("toggle_debug".to_string(), "F1".to_string());
        m.insert("toggle_colliders".to_string(), "F2".to_string());
        m
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            input_mode: Self::default_input_mode(),
            tilt_step: Self::default_tilt_step(),
            keybinds: Self::default_keybinds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsSettings {
    #[serde(default = "PhysicsSettings::default_linear_damping")]
    pub linear_damping: f32, // Per-second velocity decay fraction
    #[serde(default = "PhysicsSettings::default_respawn_delay")]
    pub respawn_delay: f32, // Seconds between falling into a hole and the fresh body appearing
    #[serde(default = "PhysicsSettings::default_fuel_refill")]
    pub fuel_refill: f32, // Fuel units added per fuel pickup
    #[serde(default = "PhysicsSettings::default_starting_fuel")]
    pub starting_fuel: f32, // Fuel at level start
}

impl PhysicsSettings {
    fn default_linear_damping() -> f32 { 0.5 }
    fn default_respawn_delay() -> f32 { 0.5 }
    fn default_fuel_refill() -> f32 { 25.0 }
    fn default_starting_fuel() -> f32 { 100.0 }
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            linear_damping: Self::default_linear_damping(),
            respawn_delay: Self::default_respawn_delay(),
            fuel_refill: Self::default_fuel_refill(),
            starting_fuel: Self::default_starting_fuel(),
        }
    }
}

/// Top-level settings.
#[derive(Resource, Clone, Debug, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
    #[serde(default)]
    pub physics: PhysicsSettings,
}

impl Settings {
    #[must_use]
    pub fn defaults() -> Self {
        Settings::default()
    }

    /// Resolve a keybind action to a `KeyCode`, falling back when the
    /// entry is missing or unparseable.
    #[must_use]
    pub fn keybind(&self, action: &str, fallback: KeyCode) -> KeyCode {
        self.controls
            .keybinds
            .get(action)
            .and_then(|name| Self::keycode_from_str(name))
            .unwrap_or(fallback)
    }

    /// Convert a key identifier from `controls.keybinds` into a `KeyCode`.
    /// Only the keys this game actually binds are understood: letters,
    /// digits, function keys and a few named keys.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        let s = name.to_ascii_uppercase();
        if s.len() == 1 {
            let c = s.chars().next()?;
            if c.is_ascii_uppercase() {
                let offset = c as u32 - 'A' as u32;
                return KEY_LETTERS.get(offset as usize).copied();
            }
            if c.is_ascii_digit() {
                let offset = c as u32 - '0' as u32;
                return KEY_DIGITS.get(offset as usize).copied();
            }
        }

        Some(match s.as_str() {
            "F1" => KeyCode::F1,
            "F2" => KeyCode::F2,
            "F3" => KeyCode::F3,
            "F4" => KeyCode::F4,
            "F5" => KeyCode::F5,
            "F6" => KeyCode::F6,
            "F7" => KeyCode::F7,
            "F8" => KeyCode::F8,
            "F9" => KeyCode::F9,
            "F10" => KeyCode::F10,
            "F11" => KeyCode::F11,
            "F12" => KeyCode::F12,
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "ENTER" | "RETURN" => KeyCode::Enter,
            _ => return None,
        })
    }
}

const KEY_LETTERS: [KeyCode; 26] = [
    KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
    KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
    KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
    KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
    KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
    KeyCode::KeyZ,
];

const KEY_DIGITS: [KeyCode; 10] = [
    KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3,
    KeyCode::Digit4, KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7,
    KeyCode::Digit8, KeyCode::Digit9,
];

pub mod loader;
