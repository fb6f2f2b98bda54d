//! Game balance and tuning
//!
//! Defaults mirror `crate::consts`. Overrides can be stored as JSON in
//! LocalStorage for playtesting without a rebuild.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors from loading a tuning override
#[derive(Debug)]
pub enum TuningError {
    /// JSON did not parse into a `Tuning`
    Parse(serde_json::Error),
    /// A value parsed but cannot be used
    Invalid(&'static str),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TuningError::Parse(e) => write!(f, "Invalid tuning JSON: {}", e),
            TuningError::Invalid(what) => write!(f, "Invalid tuning value: {}", what),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Parse(e) => Some(e),
            TuningError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(error: serde_json::Error) -> Self {
        TuningError::Parse(error)
    }
}

/// Gameplay balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Heat ===
    /// Heat at which every further kill calls in a police unit
    pub heat_threshold: u32,

    // === Spawning ===
    pub pedestrian_spawn_ms: u64,
    pub spawn_margin: f32,
    pub pedestrian_speed: f32,
    pub police_speed: f32,
    pub police_health: i32,
    pub police_fire_ms: u64,

    // === Player ===
    pub player_health: i32,
    pub steer_speed: f32,

    // === Bullets ===
    pub bullet_speed: f32,
    pub bullet_ttl_ms: u64,
    pub police_bullet_speed: f32,
    pub police_bullet_ttl_ms: u64,

    // === Scoring & damage ===
    pub score_shot_pedestrian: u64,
    pub score_run_over: u64,
    pub score_police_down: u64,
    pub police_bullet_damage: i32,
    pub police_ram_damage: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            heat_threshold: HEAT_THRESHOLD,

            pedestrian_spawn_ms: PEDESTRIAN_SPAWN_MS,
            spawn_margin: SPAWN_MARGIN,
            pedestrian_speed: PEDESTRIAN_SPEED,
            police_speed: POLICE_SPEED,
            police_health: POLICE_HEALTH,
            police_fire_ms: POLICE_FIRE_MS,

            player_health: PLAYER_START_HEALTH,
            steer_speed: PLAYER_STEER_SPEED,

            bullet_speed: BULLET_SPEED,
            bullet_ttl_ms: BULLET_TTL_MS,
            police_bullet_speed: POLICE_BULLET_SPEED,
            police_bullet_ttl_ms: POLICE_BULLET_TTL_MS,

            score_shot_pedestrian: SCORE_SHOT_PEDESTRIAN,
            score_run_over: SCORE_RUN_OVER,
            score_police_down: SCORE_POLICE_DOWN,
            police_bullet_damage: POLICE_BULLET_DAMAGE,
            police_ram_damage: POLICE_RAM_DAMAGE,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON override. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the session cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.pedestrian_spawn_ms == 0 {
            return Err(TuningError::Invalid("pedestrian_spawn_ms must be > 0"));
        }
        if self.police_fire_ms == 0 {
            return Err(TuningError::Invalid("police_fire_ms must be > 0"));
        }
        if self.player_health <= 0 {
            return Err(TuningError::Invalid("player_health must be > 0"));
        }
        if self.police_health <= 0 {
            return Err(TuningError::Invalid("police_health must be > 0"));
        }
        if self.spawn_margin < 0.0 {
            return Err(TuningError::Invalid("spawn_margin must be >= 0"));
        }
        if self.police_bullet_damage < 0 || self.police_ram_damage < 0 {
            return Err(TuningError::Invalid("damage must be >= 0"));
        }
        Ok(())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "heat_run_tuning";

    /// Parse an optional stored override, falling back to defaults on error
    pub fn from_stored(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(tuning)) => {
                log::info!("Loaded tuning override");
                tuning
            }
            Some(Err(e)) => {
                log::warn!("{}; using default tuning", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Load tuning from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok())
            .flatten();
        Self::from_stored(stored.as_deref())
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
