//! Simulation settings
//!
//! Loaded from JSON by the host. Every field has a default, and
//! [`SimSettings::sanitized`] clamps out-of-range values instead of rejecting
//! them so a bad config never stops a running game.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Render smoothing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Draw the latest logic position as-is
    None,
    /// Blend previous and current logic positions (up to one tick of lag)
    #[default]
    Interpolate,
    /// Project past the current position (no lag, may overshoot)
    Extrapolate,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::None => "none",
            FilterMode::Interpolate => "interpolate",
            FilterMode::Extrapolate => "extrapolate",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Some(FilterMode::None),
            "interpolate" | "lerp" => Some(FilterMode::Interpolate),
            "extrapolate" | "predict" => Some(FilterMode::Extrapolate),
            _ => None,
        }
    }
}

/// Settings loading failure
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simulation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Render smoothing
    pub filter: FilterMode,

    // === World ===
    /// Map width in tiles (power of two)
    pub map_width: i32,
    /// Map height in tiles (power of two)
    pub map_height: i32,
    /// Tile edge in pixels (power of two)
    pub tile_size: i32,
    /// Visible window in pixels
    pub view_width: i32,
    pub view_height: i32,

    // === Capacity ===
    /// Pooled objects shared by ship, bolts and actors
    pub object_capacity: usize,
    /// Actor table slots
    pub actor_capacity: usize,

    // === Ship ===
    /// Pixels per tick, fixed point
    pub ship_speed: i32,
    /// Contact radius in pixels
    pub ship_radius: i32,
    pub ship_health: i32,
    /// Damage the ship deals to what it rams
    pub ram_damage: i32,

    // === Bolts ===
    /// Pixels per tick, fixed point
    pub bolt_speed: i32,
    /// Ticks before a bolt fizzles
    pub bolt_lifetime: u32,
    pub bolt_damage: i32,
    /// Ticks between volleys
    pub fire_interval: u32,

    // === Damage ===
    /// Splash multiplier applied to actors
    pub splash_multiplier: i32,
    /// Splash multiplier applied to the ship
    pub player_splash_multiplier: i32,

    /// 1 (gentle) to 10 (brutal); shortens enemy fire delays
    pub difficulty: u32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            filter: FilterMode::Interpolate,

            map_width: 64,
            map_height: 64,
            tile_size: 16,
            view_width: 320,
            view_height: 240,

            object_capacity: DEFAULT_OBJECT_CAPACITY,
            actor_capacity: DEFAULT_ACTOR_CAPACITY,

            ship_speed: 2 * 256,
            ship_radius: 6,
            ship_health: 100,
            ram_damage: 50,

            bolt_speed: 6 * 256,
            bolt_lifetime: 40,
            bolt_damage: 10,
            fire_interval: 6,

            splash_multiplier: 1,
            player_splash_multiplier: 1,

            difficulty: 3,
        }
    }
}

fn pow2_in(v: i32, lo: i32, hi: i32) -> i32 {
    (v.clamp(lo, hi) as u32).next_power_of_two().min(hi as u32) as i32
}

impl SimSettings {
    /// Parse settings from JSON. Missing fields take their defaults; the
    /// result is sanitized.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: SimSettings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Read settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Read settings, falling back to defaults on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Clamp every field into its valid range.
    pub fn sanitized(mut self) -> Self {
        self.map_width = pow2_in(self.map_width, 4, 1024);
        self.map_height = pow2_in(self.map_height, 4, 1024);
        self.tile_size = pow2_in(self.tile_size, 4, 64);
        self.view_width = self.view_width.clamp(16, 4096);
        self.view_height = self.view_height.clamp(16, 4096);

        self.object_capacity = self.object_capacity.clamp(MIN_OBJECT_CAPACITY, MAX_OBJECT_CAPACITY);
        self.actor_capacity = self.actor_capacity.clamp(MIN_ACTOR_CAPACITY, MAX_ACTOR_CAPACITY);

        self.ship_speed = self.ship_speed.clamp(0, 16 * 256);
        self.ship_radius = self.ship_radius.clamp(1, 64);
        self.ship_health = self.ship_health.max(1);
        self.ram_damage = self.ram_damage.max(0);

        self.bolt_speed = self.bolt_speed.clamp(256, 32 * 256);
        self.bolt_lifetime = self.bolt_lifetime.clamp(1, 600);
        self.bolt_damage = self.bolt_damage.max(0);
        self.fire_interval = self.fire_interval.max(1);

        self.splash_multiplier = self.splash_multiplier.max(0);
        self.player_splash_multiplier = self.player_splash_multiplier.max(0);

        self.difficulty = self.difficulty.clamp(1, 10);
        self
    }

    /// Scale a fire delay by difficulty (never below a quarter of `base`).
    pub fn fire_delay(&self, base: i32) -> i32 {
        let d = self.difficulty.clamp(1, 10) as i32;
        (base * 12 / (9 + d)).max(base / 4).max(1)
    }
}
