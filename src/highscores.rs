//! Best runs leaderboard
//!
//! Runs rank by score, then by heat reached. The board lives in LocalStorage
//! on the web and in a JSON file under the user's data directory natively.

use serde::{Deserialize, Serialize};

use crate::sim::{GameOverReason, Session};

/// Maximum number of runs kept on the board
pub const MAX_HIGH_SCORES: usize = 10;

/// Outcome of one finished (or abandoned) run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub score: u64,
    pub heat: u32,
    /// `None` if the run was stopped before game over
    pub reason: Option<GameOverReason>,
    /// Simulated time the car stayed on the road
    pub survived_ms: u64,
    /// Unix timestamp (ms) when the run was recorded
    pub timestamp: f64,
}

impl RunRecord {
    pub fn from_session(session: &Session, timestamp: f64) -> Self {
        Self {
            score: session.score,
            heat: session.heat,
            reason: session.game_over_reason(),
            survived_ms: session.clock_ms(),
            timestamp,
        }
    }

    /// Strictly better: higher score, or equal score with more heat
    pub fn outranks(&self, other: &RunRecord) -> bool {
        (self.score, self.heat) > (other.score, other.heat)
    }
}

/// Top runs, best first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub runs: Vec<RunRecord>,
}

impl HighScores {
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "heat_run_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Where `run` would land (1-indexed), or None if it would not make the board.
    /// Scoreless runs never place; ties go below the run already on the board.
    pub fn rank_of(&self, run: &RunRecord) -> Option<usize> {
        if run.score == 0 {
            return None;
        }
        let slot = self
            .runs
            .iter()
            .position(|r| run.outranks(r))
            .unwrap_or(self.runs.len());
        (slot < MAX_HIGH_SCORES).then_some(slot + 1)
    }

    /// Insert `run` if it places, returning its rank
    pub fn record(&mut self, run: RunRecord) -> Option<usize> {
        let rank = self.rank_of(&run)?;
        self.runs.insert(rank - 1, run);
        self.runs.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn best(&self) -> Option<&RunRecord> {
        self.runs.first()
    }

    /// Parse a stored board. Unreadable data starts a fresh board.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<HighScores>(json) {
            Ok(mut board) => {
                // Stored data may predate the tie-break or the size cap
                board.runs.sort_by(|a, b| (b.score, b.heat).cmp(&(a.score, a.heat)));
                board.runs.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", board.runs.len());
                board
            }
            Err(e) => {
                log::warn!("Discarding unreadable high scores: {}", e);
                Self::new()
            }
        }
    }

    /// Load the board from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok())
            .flatten();
        stored.as_deref().map(Self::from_json).unwrap_or_default()
    }

    /// Save the board to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
        else {
            log::warn!("LocalStorage unavailable, high scores not saved");
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) => {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("LocalStorage rejected high scores");
                }
            }
            Err(e) => log::warn!("Could not encode high scores: {}", e),
        }
    }

    /// Board file, e.g. `~/.local/share/heat-run/highscores.json`
    #[cfg(not(target_arch = "wasm32"))]
    fn store_path() -> Option<std::path::PathBuf> {
        dirs::data_dir().map(|p| p.join("heat-run").join("highscores.json"))
    }

    /// Load the board from the user's data directory
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Some(path) = Self::store_path() else {
            return Self::new();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => Self::from_json(&json),
            Err(_) => Self::new(),
        }
    }

    /// Save the board to the user's data directory
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        let Some(path) = Self::store_path() else {
            log::warn!("No data directory, high scores not saved");
            return;
        };
        let written = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| {
                serde_json::to_string_pretty(self)
                    .map_err(std::io::Error::other)
                    .and_then(|json| std::fs::write(&path, json))
            });
        match written {
            Ok(()) => log::info!("High scores saved to {}", path.display()),
            Err(e) => log::warn!("Could not save high scores: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::sim::TrackBounds;

    fn run(score: u64, heat: u32) -> RunRecord {
        RunRecord {
            score,
            heat,
            reason: Some(GameOverReason::ShotDown),
            survived_ms: 0,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_scoreless_run_never_places() {
        let board = HighScores::new();
        assert_eq!(board.rank_of(&run(0, 3)), None);
        assert_eq!(board.rank_of(&run(5, 1)), Some(1));
    }

    #[test]
    fn test_heat_breaks_score_ties() {
        let mut board = HighScores::new();
        assert_eq!(board.record(run(50, 3)), Some(1));
        assert_eq!(board.record(run(120, 9)), Some(1));
        // Same score, more heat: above the earlier 50
        assert_eq!(board.record(run(50, 6)), Some(2));
        // Exact tie goes below
        assert_eq!(board.record(run(50, 3)), Some(4));

        let order: Vec<_> = board.runs.iter().map(|r| (r.score, r.heat)).collect();
        assert_eq!(order, vec![(120, 9), (50, 6), (50, 3), (50, 3)]);
        assert_eq!(board.best().map(|r| r.score), Some(120));
    }

    #[test]
    fn test_board_is_capped() {
        let mut board = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u64 {
            board.record(run(i * 10, 0));
        }
        assert_eq!(board.record(run(10, 0)), None);
        assert_eq!(board.record(run(10, 1)), Some(10));
        assert_eq!(board.runs.len(), MAX_HIGH_SCORES);
        assert_eq!(board.runs.last().map(|r| (r.score, r.heat)), Some((10, 1)));
    }

    #[test]
    fn test_record_from_finished_session() {
        let mut session = Session::new(1, Tuning::default(), TrackBounds::default());
        session.score = 65;
        session.heat = 7;
        session.phase = crate::sim::GamePhase::GameOver(GameOverReason::Crashed);

        let record = RunRecord::from_session(&session, 1_700_000_000_000.0);
        assert_eq!(record.reason, Some(GameOverReason::Crashed));
        assert_eq!((record.score, record.heat), (65, 7));
    }

    #[test]
    fn test_from_json_resorts_and_recovers() {
        let mut board = HighScores::new();
        board.runs = vec![run(10, 0), run(90, 2)];
        let json = serde_json::to_string(&board).unwrap();

        let loaded = HighScores::from_json(&json);
        assert_eq!(loaded.best().map(|r| r.score), Some(90));

        assert!(HighScores::from_json("{ nope").runs.is_empty());
    }
}
