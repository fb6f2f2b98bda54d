//! Heat Run entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent};

    use heat_run::consts::*;
    use heat_run::sim::TextSlot;
    use heat_run::{HighScores, RunRecord, Runner, Tuning};

    /// Game instance holding all state
    struct Game {
        runner: Runner,
        high_scores: HighScores,
        last_time: f64,
        /// Set once the finished run has been offered to the leaderboard
        recorded: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                runner: Runner::new(seed, Tuning::load()),
                high_scores: HighScores::load(),
                last_time: 0.0,
                recorded: false,
            }
        }

        fn restart(&mut self, seed: u64) {
            self.runner.restart(seed);
            self.last_time = 0.0;
            self.recorded = false;
        }

        /// Record the run once it ends
        fn record_result(&mut self) {
            if self.recorded {
                return;
            }
            let session = &self.runner.session;
            if !session.is_over() {
                return;
            }
            self.recorded = true;
            let run = RunRecord::from_session(session, js_sys::Date::now());
            if let Some(rank) = self.high_scores.record(run) {
                log::info!("New high score! Rank #{}", rank);
                self.high_scores.save();
            }
        }

        /// Copy HUD text from the arena into the DOM
        fn update_hud(&self, document: &Document) {
            let slots = [
                (TextSlot::Score, "hud-score"),
                (TextSlot::Heat, "hud-heat"),
                (TextSlot::Health, "hud-health"),
            ];
            for (slot, id) in slots {
                if let (Some(el), Some(text)) =
                    (document.get_element_by_id(id), self.runner.arena.text(slot))
                {
                    el.set_text_content(Some(text));
                }
            }

            if let Some(el) = document.get_element_by_id("game-over") {
                match self.runner.arena.text(TextSlot::Banner) {
                    Some(text) if self.runner.session.is_over() => {
                        el.set_text_content(Some(text));
                        let _ = el.set_attribute("class", "");
                    }
                    _ => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }

            if let Some(el) = document.get_element_by_id("hud-best") {
                let best = self.high_scores.best().map_or(0, |r| r.score);
                el.set_text_content(Some(&format!("Best: {}", best)));
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Heat Run starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));

        setup_input_handlers(&window, game.clone());
        setup_restart_button(&document, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Heat Run running!");
    }

    /// Map a key to the held-key flag it drives
    fn apply_key(game: &Rc<RefCell<Game>>, key: &str, down: bool) -> bool {
        let mut g = game.borrow_mut();
        let input = &mut g.runner.input;
        match key {
            "ArrowLeft" | "a" | "A" => input.left = down,
            "ArrowRight" | "d" | "D" => input.right = down,
            " " => input.fire = down,
            _ => return false,
        }
        true
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if apply_key(&game, &event.key(), true) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                apply_key(&game, &event.key(), false);
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur: keyup never arrives, so release everything
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().runner.input = Default::default();
                log::debug!("Input released (window blur)");
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(document: &Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart(seed);
                log::info!("Game restarted with seed: {}", seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.runner.update(dt);
            g.record_result();

            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run with a simple autopilot, for checking balance from a terminal
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use heat_run::consts::*;
    use heat_run::sim::{Engine, EntityKind};
    use heat_run::{HighScores, RunRecord, Runner, Tuning};

    env_logger::init();
    log::info!("Heat Run (native) starting...");
    log::info!("Native mode runs headless - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(12345);
    let mut runner = Runner::new(seed, Tuning::load());

    // Two minutes of simulated play at most
    let max_steps = 120_000 / SIM_DT_MS;
    let mut steps = 0;
    while steps < max_steps && !runner.session.is_over() {
        // Chase the lowest pedestrian, tapping fire every 200 ms
        let player_x = runner.arena.player_position().x;
        let target = runner
            .arena
            .bodies
            .iter()
            .filter(|b| b.kind == EntityKind::Pedestrian)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|b| b.pos.x.clamp(TRACK_LEFT + 30.0, TRACK_RIGHT - 30.0));

        runner.input.left = matches!(target, Some(x) if x < player_x - 5.0);
        runner.input.right = matches!(target, Some(x) if x > player_x + 5.0);
        runner.input.fire = steps % 25 < 12;

        runner.step();
        steps += 1;
    }

    let session = &runner.session;
    let outcome = session
        .game_over_reason()
        .map(|r| r.message())
        .unwrap_or("Survived");
    println!(
        "{} after {:.1}s - score {}, heat {}, health {}",
        outcome,
        session.clock_ms() as f32 / 1000.0,
        session.score,
        session.heat,
        session.health.max(0)
    );

    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0.0, |d| d.as_millis() as f64);
    let mut board = HighScores::load();
    match board.record(RunRecord::from_session(session, now_ms)) {
        Some(rank) => {
            println!("New high score! Rank #{} of {}", rank, board.runs.len());
            board.save();
        }
        None => {
            let best = board.best().map_or(0, |r| r.score);
            println!("No high score this time (best {})", best);
        }
    }
}
