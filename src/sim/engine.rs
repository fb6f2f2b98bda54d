//! Engine collaborator contract
//!
//! The session never draws or moves anything itself. It asks an `Engine` to
//! create and destroy bodies, reads positions back, and pushes HUD text.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{EntityId, EntityKind, TextSlot};

/// Capabilities the session consumes from the host engine
pub trait Engine {
    /// Create a body of the given group at `pos` moving at `vel`
    fn spawn(&mut self, kind: EntityKind, pos: Vec2, vel: Vec2) -> EntityId;

    /// Destroy a body. Destroying an unknown or already destroyed ID is a no-op.
    fn despawn(&mut self, id: EntityId);

    /// Current position of a live body
    fn position(&self, id: EntityId) -> Option<Vec2>;

    /// Current position of the player's car
    fn player_position(&self) -> Vec2;

    /// Set the car's horizontal velocity (vertical is always 0)
    fn set_player_velocity_x(&mut self, vx: f32);

    /// Replace the text shown in a HUD slot
    fn set_text(&mut self, slot: TextSlot, text: &str);

    /// Freeze the scene (physics stops, text stays visible)
    fn pause(&mut self);
}

/// Overlap notifications, one variant per bound group pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overlap {
    BulletPedestrian { bullet: EntityId, pedestrian: EntityId },
    BulletPolice { bullet: EntityId, police: EntityId },
    PlayerPoliceBullet { bullet: EntityId },
    PlayerPedestrian { pedestrian: EntityId },
    PlayerPolice { police: EntityId },
}

/// Events reported by the engine after a physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldEvent {
    Overlap(Overlap),
    /// Body moved out of the world area and was removed by the engine
    Exited(EntityId),
}
