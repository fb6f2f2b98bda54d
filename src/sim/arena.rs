//! Minimal kinematic world implementing `Engine`
//!
//! Bodies move at constant velocity and overlap as axis-aligned boxes. This is
//! enough to drive a session headless and in tests; a real host engine
//! replaces it wholesale.

use std::collections::HashMap;

use glam::Vec2;

use super::engine::{Engine, Overlap, WorldEvent};
use super::state::{EntityId, EntityKind, TextSlot};
use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};

/// Bodies further than this outside the world vertically are removed,
/// except police
pub const EXIT_MARGIN: f32 = 100.0;

/// Half extents of the player's car
pub const PLAYER_HALF: Vec2 = Vec2::new(25.0, 25.0);

/// Half extents per entity group (sprite size at half scale)
pub fn half_extents(kind: EntityKind) -> Vec2 {
    match kind {
        EntityKind::Pedestrian => Vec2::new(20.0, 20.0),
        EntityKind::Police => Vec2::new(25.0, 25.0),
        EntityKind::Bullet => Vec2::new(4.0, 10.0),
        EntityKind::PoliceBullet => Vec2::new(10.0, 10.0),
    }
}

/// A moving body
#[derive(Debug, Clone)]
pub struct Body {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Body {
    fn overlaps(&self, pos: Vec2, half: Vec2) -> bool {
        let d = (self.pos - pos).abs();
        let reach = half_extents(self.kind) + half;
        d.x < reach.x && d.y < reach.y
    }
}

/// The reference world
#[derive(Debug, Clone)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub player_pos: Vec2,
    pub player_vel: Vec2,
    /// Live bodies, sorted by id
    pub bodies: Vec<Body>,
    texts: HashMap<TextSlot, String>,
    paused: bool,
    next_id: u32,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(WORLD_WIDTH, WORLD_HEIGHT)
    }
}

impl Arena {
    /// Empty world with the car near the bottom center
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            player_pos: Vec2::new(width / 2.0, height - 100.0),
            player_vel: Vec2::ZERO,
            bodies: Vec::new(),
            texts: HashMap::new(),
            paused: false,
            next_id: 1,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Last text written to a HUD slot
    pub fn text(&self, slot: TextSlot) -> Option<&str> {
        self.texts.get(&slot).map(String::as_str)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.bodies.iter().filter(|b| b.kind == kind).count()
    }

    /// Move everything by `dt` seconds and report what happened
    pub fn step(&mut self, dt: f32) -> Vec<WorldEvent> {
        if self.paused {
            return Vec::new();
        }

        self.player_pos += self.player_vel * dt;
        for body in &mut self.bodies {
            body.pos += body.vel * dt;
        }

        let mut events = Vec::new();

        let (top, bottom) = (-EXIT_MARGIN, self.height + EXIT_MARGIN);
        self.bodies.retain(|b| {
            // Police stay in play until shot down or rammed
            let inside = b.kind == EntityKind::Police || (b.pos.y >= top && b.pos.y <= bottom);
            if !inside {
                events.push(WorldEvent::Exited(b.id));
            }
            inside
        });

        self.collect_overlaps(&mut events);
        events
    }

    fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(move |b| b.kind == kind)
    }

    /// Overlaps in binding order: bullet x pedestrian, bullet x police,
    /// player x police bullet, player x pedestrian, player x police
    fn collect_overlaps(&self, events: &mut Vec<WorldEvent>) {
        for bullet in self.of_kind(EntityKind::Bullet) {
            let half = half_extents(EntityKind::Bullet);
            for ped in self.of_kind(EntityKind::Pedestrian) {
                if ped.overlaps(bullet.pos, half) {
                    events.push(WorldEvent::Overlap(Overlap::BulletPedestrian {
                        bullet: bullet.id,
                        pedestrian: ped.id,
                    }));
                }
            }
        }

        for bullet in self.of_kind(EntityKind::Bullet) {
            let half = half_extents(EntityKind::Bullet);
            for unit in self.of_kind(EntityKind::Police) {
                if unit.overlaps(bullet.pos, half) {
                    events.push(WorldEvent::Overlap(Overlap::BulletPolice {
                        bullet: bullet.id,
                        police: unit.id,
                    }));
                }
            }
        }

        let player_pairs = [
            EntityKind::PoliceBullet,
            EntityKind::Pedestrian,
            EntityKind::Police,
        ];
        for kind in player_pairs {
            for body in self.of_kind(kind) {
                if !body.overlaps(self.player_pos, PLAYER_HALF) {
                    continue;
                }
                let overlap = match kind {
                    EntityKind::PoliceBullet => Overlap::PlayerPoliceBullet { bullet: body.id },
                    EntityKind::Pedestrian => Overlap::PlayerPedestrian { pedestrian: body.id },
                    EntityKind::Police => Overlap::PlayerPolice { police: body.id },
                    EntityKind::Bullet => continue,
                };
                events.push(WorldEvent::Overlap(overlap));
            }
        }
    }
}

impl Engine for Arena {
    fn spawn(&mut self, kind: EntityKind, pos: Vec2, vel: Vec2) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.bodies.push(Body { id, kind, pos, vel });
        id
    }

    fn despawn(&mut self, id: EntityId) {
        self.bodies.retain(|b| b.id != id);
    }

    fn position(&self, id: EntityId) -> Option<Vec2> {
        self.bodies.iter().find(|b| b.id == id).map(|b| b.pos)
    }

    fn player_position(&self) -> Vec2 {
        self.player_pos
    }

    fn set_player_velocity_x(&mut self, vx: f32) {
        self.player_vel.x = vx;
    }

    fn set_text(&mut self, slot: TextSlot, text: &str) {
        self.texts.insert(slot, text.to_string());
    }

    fn pause(&mut self) {
        self.paused = true;
    }
}
