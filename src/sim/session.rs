//! Game session state machine
//!
//! Owns score, heat and health plus the entity tables, and exposes the
//! handlers the engine calls on overlaps, timer ticks and every frame.
//! Every handler is a no-op once the session reaches `GameOver`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::engine::{Engine, Overlap, WorldEvent};
use super::state::{
    Bullet, BulletKind, EntityId, EntityKind, GameOverReason, GamePhase, Pedestrian, PoliceUnit,
    TextSlot, TickInput, TrackBounds,
};
use super::timer::{Scheduler, TimerAction};
use crate::consts::{MUZZLE_OFFSET, SPAWN_Y};
use crate::tuning::Tuning;

/// One run of the game, from first pedestrian to game over
#[derive(Debug, Clone)]
pub struct Session {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub track: TrackBounds,
    pub score: u64,
    /// Pedestrians eliminated so far. Only ever increases.
    pub heat: u32,
    /// May go below zero on the killing blow; display floors it at 0
    pub health: i32,
    /// Fire latch: consumed on fire, re-armed when the fire key is seen up
    pub can_fire: bool,
    pub phase: GamePhase,
    /// Live entities, in spawn order
    pub pedestrians: Vec<Pedestrian>,
    pub police: Vec<PoliceUnit>,
    pub bullets: Vec<Bullet>,
    scheduler: Scheduler,
    rng: Pcg32,
}

impl Session {
    /// Create a running session and arm the pedestrian spawner
    pub fn new(seed: u64, tuning: Tuning, track: TrackBounds) -> Self {
        let mut scheduler = Scheduler::new();
        scheduler.every(tuning.pedestrian_spawn_ms, None, TimerAction::SpawnPedestrian);

        Self {
            seed,
            health: tuning.player_health,
            tuning,
            track,
            score: 0,
            heat: 0,
            can_fire: true,
            phase: GamePhase::Running,
            pedestrians: Vec::new(),
            police: Vec::new(),
            bullets: Vec::new(),
            scheduler,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver(_))
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        match self.phase {
            GamePhase::GameOver(reason) => Some(reason),
            GamePhase::Running => None,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Elapsed simulation time
    pub fn clock_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.pedestrians.iter().any(|p| p.id == id)
            || self.police.iter().any(|p| p.id == id)
            || self.bullets.iter().any(|b| b.id == id)
    }

    pub fn police_health(&self, id: EntityId) -> Option<i32> {
        self.police.iter().find(|p| p.id == id).map(|p| p.health)
    }

    /// True once enough pedestrians are down to draw police. Not a latch.
    pub fn heat_threshold_reached(&self) -> bool {
        self.heat >= self.tuning.heat_threshold
    }

    /// Push score, heat and health to the HUD
    pub fn refresh_hud(&self, engine: &mut impl Engine) {
        engine.set_text(TextSlot::Score, &format!("Score: {}", self.score));
        engine.set_text(TextSlot::Heat, &format!("Heat: {}", self.heat));
        engine.set_text(TextSlot::Health, &format!("Health: {}", self.health.max(0)));
    }

    // === Per-frame ===

    /// Per-frame hook: steering, the fire latch, then the off-track check
    pub fn tick(&mut self, engine: &mut impl Engine, input: &TickInput) {
        if self.is_over() {
            return;
        }

        engine.set_player_velocity_x(input.steer_velocity(self.tuning.steer_speed));

        if input.fire && self.can_fire {
            self.fire_bullet(engine);
            self.can_fire = false;
        } else if !input.fire {
            self.can_fire = true;
        }

        let x = engine.player_position().x;
        if !self.track.contains(x) {
            self.end_game(engine, GameOverReason::OffTrack);
        }
    }

    /// Advance the clock by `dt_ms`, running every timer that falls due
    pub fn advance(&mut self, engine: &mut impl Engine, dt_ms: u64) {
        let until = self.scheduler.now_ms() + dt_ms;
        while !self.is_over() {
            let Some(action) = self.scheduler.pop_due(until) else {
                break;
            };
            self.run_timer(engine, action);
        }
        self.scheduler.set_now(until);
    }

    fn run_timer(&mut self, engine: &mut impl Engine, action: TimerAction) {
        match action {
            TimerAction::SpawnPedestrian => self.on_pedestrian_spawn_timer(engine),
            TimerAction::PoliceFire(unit) => {
                // Timer is cancelled with its unit, but the engine may have lost the body
                if !self.police.iter().any(|p| p.id == unit) {
                    return;
                }
                if let Some(pos) = engine.position(unit) {
                    self.fire_police_bullet(engine, pos);
                }
            }
            TimerAction::Expire(bullet) => {
                if self.take_bullet(bullet).is_some() {
                    self.destroy(engine, bullet);
                }
            }
        }
    }

    /// Dispatch one engine event to its handler
    pub fn handle_event(&mut self, engine: &mut impl Engine, event: WorldEvent) {
        match event {
            WorldEvent::Overlap(overlap) => self.handle_overlap(engine, overlap),
            WorldEvent::Exited(id) => self.forget(id),
        }
    }

    /// Overlap handler table
    pub fn handle_overlap(&mut self, engine: &mut impl Engine, overlap: Overlap) {
        match overlap {
            Overlap::BulletPedestrian { bullet, pedestrian } => {
                self.hit_pedestrian(engine, bullet, pedestrian)
            }
            Overlap::BulletPolice { bullet, police } => self.hit_police(engine, bullet, police),
            Overlap::PlayerPoliceBullet { bullet } => self.player_hit(engine, bullet),
            Overlap::PlayerPedestrian { pedestrian } => {
                self.run_over_pedestrian(engine, pedestrian)
            }
            Overlap::PlayerPolice { police } => self.player_collide_police(engine, police),
        }
    }

    // === Spawning ===

    /// Whole-unit x within the spawn margins
    fn random_spawn_x(&mut self) -> f32 {
        let (lo, hi) = self.track.spawn_range(self.tuning.spawn_margin);
        let (first, last) = (lo.ceil() as i32, hi.floor() as i32);
        if first > last {
            return ((lo + hi) / 2.0).round();
        }
        self.rng.random_range(first..=last) as f32
    }

    /// Drop one pedestrian at a random point along the top of the track
    pub fn on_pedestrian_spawn_timer(&mut self, engine: &mut impl Engine) {
        if self.is_over() {
            return;
        }
        let x = self.random_spawn_x();
        let id = engine.spawn(
            EntityKind::Pedestrian,
            Vec2::new(x, SPAWN_Y),
            Vec2::new(0.0, self.tuning.pedestrian_speed),
        );
        self.pedestrians.push(Pedestrian { id });
        log::debug!("Pedestrian {:?} spawned at x={:.0}", id, x);
    }

    /// Call in a police unit; it shoots back on its own timer while alive
    pub fn spawn_police(&mut self, engine: &mut impl Engine) {
        if self.is_over() {
            return;
        }
        let x = self.random_spawn_x();
        let id = engine.spawn(
            EntityKind::Police,
            Vec2::new(x, SPAWN_Y),
            Vec2::new(0.0, self.tuning.police_speed),
        );
        self.police.push(PoliceUnit {
            id,
            health: self.tuning.police_health,
        });
        self.scheduler
            .every(self.tuning.police_fire_ms, Some(id), TimerAction::PoliceFire(id));
        log::info!("Police unit {:?} dispatched (heat {})", id, self.heat);
    }

    /// Fire from the car's muzzle, straight up the track
    pub fn fire_bullet(&mut self, engine: &mut impl Engine) {
        if self.is_over() {
            return;
        }
        let pos = engine.player_position() - Vec2::new(0.0, MUZZLE_OFFSET);
        self.spawn_bullet(engine, BulletKind::Player, pos);
    }

    /// Police shot from `pos`, straight down the track
    pub fn fire_police_bullet(&mut self, engine: &mut impl Engine, pos: Vec2) {
        if self.is_over() {
            return;
        }
        self.spawn_bullet(engine, BulletKind::Police, pos);
    }

    fn spawn_bullet(&mut self, engine: &mut impl Engine, kind: BulletKind, pos: Vec2) {
        let (speed, ttl_ms) = match kind {
            BulletKind::Player => (self.tuning.bullet_speed, self.tuning.bullet_ttl_ms),
            BulletKind::Police => (
                self.tuning.police_bullet_speed,
                self.tuning.police_bullet_ttl_ms,
            ),
        };
        let id = engine.spawn(kind.entity_kind(), pos, Vec2::new(0.0, speed));
        self.bullets.push(Bullet { id, kind });
        self.scheduler.after(ttl_ms, Some(id), TimerAction::Expire(id));
    }

    // === Overlap handlers ===

    /// Player bullet hits a pedestrian
    pub fn hit_pedestrian(
        &mut self,
        engine: &mut impl Engine,
        bullet: EntityId,
        pedestrian: EntityId,
    ) {
        if self.is_over()
            || !self.has_bullet(bullet, BulletKind::Player)
            || !self.pedestrians.iter().any(|p| p.id == pedestrian)
        {
            return;
        }
        self.take_bullet(bullet);
        self.destroy(engine, bullet);
        self.take_pedestrian(pedestrian);
        self.destroy(engine, pedestrian);

        self.score += self.tuning.score_shot_pedestrian;
        self.add_heat(engine);
    }

    /// Car runs over a pedestrian (the car is unharmed)
    pub fn run_over_pedestrian(&mut self, engine: &mut impl Engine, pedestrian: EntityId) {
        if self.is_over() || self.take_pedestrian(pedestrian).is_none() {
            return;
        }
        self.destroy(engine, pedestrian);

        self.score += self.tuning.score_run_over;
        self.add_heat(engine);
    }

    fn add_heat(&mut self, engine: &mut impl Engine) {
        self.heat += 1;
        self.refresh_hud(engine);

        if self.heat_threshold_reached() {
            self.spawn_police(engine);
        }
    }

    /// Player bullet hits a police car
    pub fn hit_police(&mut self, engine: &mut impl Engine, bullet: EntityId, police: EntityId) {
        if self.is_over()
            || !self.has_bullet(bullet, BulletKind::Player)
            || !self.police.iter().any(|p| p.id == police)
        {
            return;
        }
        self.take_bullet(bullet);
        self.destroy(engine, bullet);

        let Some(idx) = self.police.iter().position(|p| p.id == police) else {
            return;
        };
        self.police[idx].health -= 1;
        if self.police[idx].health <= 0 {
            self.police.remove(idx);
            self.destroy(engine, police);
            self.score += self.tuning.score_police_down;
            self.refresh_hud(engine);
            log::info!("Police unit {:?} taken down", police);
        }
    }

    /// Police bullet hits the car
    pub fn player_hit(&mut self, engine: &mut impl Engine, bullet: EntityId) {
        if self.is_over() || !self.has_bullet(bullet, BulletKind::Police) {
            return;
        }
        self.take_bullet(bullet);
        self.destroy(engine, bullet);

        self.health -= self.tuning.police_bullet_damage;
        self.refresh_hud(engine);
        if self.health <= 0 {
            self.end_game(engine, GameOverReason::ShotDown);
        }
    }

    /// Car rams a police car; the police car is wrecked
    pub fn player_collide_police(&mut self, engine: &mut impl Engine, police: EntityId) {
        if self.is_over() {
            return;
        }
        let Some(idx) = self.police.iter().position(|p| p.id == police) else {
            return;
        };
        self.police.remove(idx);
        self.destroy(engine, police);

        self.health -= self.tuning.police_ram_damage;
        self.refresh_hud(engine);
        if self.health <= 0 {
            self.end_game(engine, GameOverReason::Crashed);
        }
    }

    /// Enter the terminal state: pause the scene and show the banner
    pub fn end_game(&mut self, engine: &mut impl Engine, reason: GameOverReason) {
        if self.is_over() {
            return;
        }
        self.phase = GamePhase::GameOver(reason);
        engine.pause();
        engine.set_text(TextSlot::Banner, &format!("GAME OVER\n{}", reason.message()));
        log::info!(
            "Game over: {} (score {}, heat {})",
            reason.message(),
            self.score,
            self.heat
        );
    }

    // === Entity bookkeeping ===

    fn has_bullet(&self, id: EntityId, kind: BulletKind) -> bool {
        self.bullets.iter().any(|b| b.id == id && b.kind == kind)
    }

    fn take_bullet(&mut self, id: EntityId) -> Option<Bullet> {
        let idx = self.bullets.iter().position(|b| b.id == id)?;
        Some(self.bullets.remove(idx))
    }

    fn take_pedestrian(&mut self, id: EntityId) -> Option<Pedestrian> {
        let idx = self.pedestrians.iter().position(|p| p.id == id)?;
        Some(self.pedestrians.remove(idx))
    }

    /// Destroy the body and every timer it owns
    fn destroy(&mut self, engine: &mut impl Engine, id: EntityId) {
        self.scheduler.cancel_owned_by(id);
        engine.despawn(id);
    }

    /// Drop an entity the engine already removed (left the world)
    fn forget(&mut self, id: EntityId) {
        if self.is_over() {
            return;
        }
        self.pedestrians.retain(|p| p.id != id);
        self.police.retain(|p| p.id != id);
        self.bullets.retain(|b| b.id != id);
        self.scheduler.cancel_owned_by(id);
    }
}
