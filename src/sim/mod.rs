//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod arena;
pub mod engine;
pub mod session;
pub mod state;
pub mod timer;

pub use arena::Arena;
pub use engine::{Engine, Overlap, WorldEvent};
pub use session::Session;
pub use state::{
    Bullet, BulletKind, EntityId, EntityKind, GameOverReason, GamePhase, Pedestrian, PoliceUnit,
    TextSlot, TickInput, TrackBounds,
};
pub use timer::{Scheduler, TimerAction};
