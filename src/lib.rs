//! Heat Run - A top-down street arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (session state machine, timers, reference arena)
//! - `runner`: Fixed timestep driver gluing the arena and the session together
//! - `tuning`: Data-driven game balance
//! - `highscores`: Local leaderboard

pub mod highscores;
pub mod runner;
pub mod sim;
pub mod tuning;

pub use highscores::{HighScores, RunRecord};
pub use runner::Runner;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (125 Hz)
    pub const SIM_DT_MS: u64 = 8;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = SIM_DT_MS as f32 / 1000.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Track edges (the car must stay between these)
    pub const TRACK_LEFT: f32 = 200.0;
    pub const TRACK_RIGHT: f32 = 600.0;
    /// Spawn margin from each track edge
    pub const SPAWN_MARGIN: f32 = 20.0;
    /// Spawn height for pedestrians and police (just above the screen)
    pub const SPAWN_Y: f32 = -50.0;

    /// Player car
    pub const PLAYER_START_HEALTH: i32 = 100;
    pub const PLAYER_STEER_SPEED: f32 = 300.0;
    /// Distance from the car's center to the muzzle
    pub const MUZZLE_OFFSET: f32 = 20.0;

    /// Pedestrians
    pub const PEDESTRIAN_SPEED: f32 = 100.0;
    pub const PEDESTRIAN_SPAWN_MS: u64 = 2000;

    /// Police
    pub const HEAT_THRESHOLD: u32 = 5;
    pub const POLICE_SPEED: f32 = 150.0;
    pub const POLICE_HEALTH: i32 = 3;
    pub const POLICE_FIRE_MS: u64 = 2000;

    /// Bullets (negative = up the screen)
    pub const BULLET_SPEED: f32 = -400.0;
    pub const BULLET_TTL_MS: u64 = 3000;
    pub const POLICE_BULLET_SPEED: f32 = 300.0;
    pub const POLICE_BULLET_TTL_MS: u64 = 5000;

    /// Scoring
    pub const SCORE_SHOT_PEDESTRIAN: u64 = 10;
    pub const SCORE_RUN_OVER: u64 = 5;
    pub const SCORE_POLICE_DOWN: u64 = 50;

    /// Damage taken by the player
    pub const POLICE_BULLET_DAMAGE: i32 = 20;
    pub const POLICE_RAM_DAMAGE: i32 = 50;
}
