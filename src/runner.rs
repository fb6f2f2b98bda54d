//! Fixed timestep driver
//!
//! Glues the reference arena to a session: each substep moves the world,
//! dispatches overlaps, runs due timers, then calls the per-frame hook.

use crate::consts::*;
use crate::sim::{Arena, Session, TickInput, TrackBounds};
use crate::tuning::Tuning;

/// A running game: world, session and held keys
pub struct Runner {
    pub session: Session,
    pub arena: Arena,
    /// Keyboard state, updated by the host between frames
    pub input: TickInput,
    accumulator: f32,
}

impl Runner {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut arena = Arena::default();
        let session = Session::new(seed, tuning, TrackBounds::default());
        session.refresh_hud(&mut arena);
        log::info!("Session started with seed: {}", seed);
        Self {
            session,
            arena,
            input: TickInput::default(),
            accumulator: 0.0,
        }
    }

    /// Throw away the current run and start a fresh one
    pub fn restart(&mut self, seed: u64) {
        let tuning = self.session.tuning.clone();
        *self = Self::new(seed, tuning);
    }

    /// Run as many fixed steps as `dt` seconds cover. Returns steps taken.
    pub fn update(&mut self, dt: f32) -> u32 {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// One fixed simulation step
    pub fn step(&mut self) {
        for event in self.arena.step(SIM_DT) {
            self.session.handle_event(&mut self.arena, event);
        }
        self.session.advance(&mut self.arena, SIM_DT_MS);
        let input = self.input;
        self.session.tick(&mut self.arena, &input);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::sim::{EntityKind, GameOverReason, TextSlot};

    fn runner() -> Runner {
        Runner::new(12345, Tuning::default())
    }

    /// Spawn a session-tracked pedestrian and move it to `pos`
    fn place_pedestrian(r: &mut Runner, pos: Vec2) {
        r.session.on_pedestrian_spawn_timer(&mut r.arena);
        let body = r.arena.bodies.last_mut().unwrap();
        body.pos = pos;
    }

    #[test]
    fn test_initial_hud() {
        let r = runner();
        assert_eq!(r.arena.text(TextSlot::Score), Some("Score: 0"));
        assert_eq!(r.arena.text(TextSlot::Heat), Some("Heat: 0"));
        assert_eq!(r.arena.text(TextSlot::Health), Some("Health: 100"));
        assert_eq!(r.arena.text(TextSlot::Banner), None);
    }

    #[test]
    fn test_pedestrians_arrive() {
        let mut r = runner();
        // 2 seconds of 125 Hz steps
        for _ in 0..250 {
            r.step();
        }
        assert_eq!(r.session.clock_ms(), 2000);
        assert_eq!(r.arena.count(EntityKind::Pedestrian), 1);
        assert_eq!(r.session.pedestrians.len(), 1);
    }

    #[test]
    fn test_run_over_in_world() {
        let mut r = runner();
        place_pedestrian(&mut r, Vec2::new(400.0, 400.0));

        for _ in 0..125 {
            r.step();
            if r.session.score > 0 {
                break;
            }
        }
        assert_eq!(r.session.score, 5);
        assert_eq!(r.session.heat, 1);
    }

    #[test]
    fn test_shoot_in_world() {
        let mut r = runner();
        place_pedestrian(&mut r, Vec2::new(400.0, 300.0));
        r.input.fire = true;

        for _ in 0..125 {
            r.step();
            if r.session.score > 0 {
                break;
            }
        }
        assert_eq!(r.session.score, 10);
        assert!(r.session.bullets.is_empty());
        assert_eq!(r.arena.count(EntityKind::Bullet), 0);
    }

    #[test]
    fn test_drive_off_track() {
        let mut r = runner();
        r.input.left = true;

        // 200 units at 300/s is under a second
        for _ in 0..125 {
            r.step();
        }
        assert_eq!(r.session.game_over_reason(), Some(GameOverReason::OffTrack));
        assert!(r.arena.is_paused());
        assert_eq!(
            r.arena.text(TextSlot::Banner),
            Some("GAME OVER\nYou drove off the track!")
        );
    }

    #[test]
    fn test_update_caps_substeps() {
        let mut r = runner();
        assert_eq!(r.update(0.0), 0);
        // Long frames are clamped and capped
        assert_eq!(r.update(5.0), MAX_SUBSTEPS);
    }

    #[test]
    fn test_determinism() {
        let mut a = runner();
        let mut b = runner();

        for i in 0..2000 {
            let input = TickInput {
                fire: i % 20 < 10,
                ..Default::default()
            };
            a.input = input;
            b.input = input;
            a.step();
            b.step();
        }

        assert_eq!(a.session.score, b.session.score);
        assert_eq!(a.session.heat, b.session.heat);
        let pos_a: Vec<_> = a.arena.bodies.iter().map(|body| body.pos).collect();
        let pos_b: Vec<_> = b.arena.bodies.iter().map(|body| body.pos).collect();
        assert_eq!(pos_a, pos_b);
    }

    #[test]
    fn test_restart() {
        let mut r = runner();
        r.input.left = true;
        for _ in 0..125 {
            r.step();
        }
        assert!(r.session.is_over());

        r.restart(7);
        assert!(!r.session.is_over());
        assert_eq!(r.session.seed, 7);
        assert!(!r.arena.is_paused());
    }
}
