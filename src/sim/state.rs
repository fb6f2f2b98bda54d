//! Session state and core simulation types
//!
//! Entities are tracked by ID only: positions and velocities live in the
//! engine that draws and moves them.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Engine-assigned handle for a spawned entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Entity groups the engine keeps apart for overlap checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Pedestrian,
    Police,
    Bullet,
    PoliceBullet,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Car left the track
    OffTrack,
    /// Health depleted by police bullets
    ShotDown,
    /// Health depleted by ramming a police car
    Crashed,
}

impl GameOverReason {
    /// Text shown under the GAME OVER banner
    pub fn message(&self) -> &'static str {
        match self {
            GameOverReason::OffTrack => "You drove off the track!",
            GameOverReason::ShotDown => "You were taken out by the police!",
            GameOverReason::Crashed => "You crashed into the police!",
        }
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Run ended (terminal)
    GameOver(GameOverReason),
}

/// HUD text slots the engine can display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextSlot {
    Score,
    Heat,
    Health,
    /// Centered game over banner
    Banner,
}

/// Horizontal extent of the drivable track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackBounds {
    pub left: f32,
    pub right: f32,
}

impl Default for TrackBounds {
    fn default() -> Self {
        Self {
            left: TRACK_LEFT,
            right: TRACK_RIGHT,
        }
    }
}

impl TrackBounds {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// True if `x` is on the track (edges inclusive)
    pub fn contains(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    /// Inclusive x range for spawning, inset by `margin` from each edge.
    /// Collapses to the track center if the track is narrower than the margins.
    pub fn spawn_range(&self, margin: f32) -> (f32, f32) {
        let lo = self.left + margin;
        let hi = self.right - margin;
        if lo <= hi {
            (lo, hi)
        } else {
            let mid = (self.left + self.right) / 2.0;
            (mid, mid)
        }
    }
}

/// A pedestrian walking down the track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pedestrian {
    pub id: EntityId,
}

/// A police car chasing the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoliceUnit {
    pub id: EntityId,
    pub health: i32,
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletKind {
    Player,
    Police,
}

impl BulletKind {
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            BulletKind::Player => EntityKind::Bullet,
            BulletKind::Police => EntityKind::PoliceBullet,
        }
    }
}

/// A bullet in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: EntityId,
    pub kind: BulletKind,
}

/// Player input for a single frame (keyboard state, not edges)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Fire key currently held
    pub fire: bool,
}

impl TickInput {
    /// Horizontal velocity for the player car. Left wins if both are held.
    pub fn steer_velocity(&self, speed: f32) -> f32 {
        if self.left {
            -speed
        } else if self.right {
            speed
        } else {
            0.0
        }
    }
}
