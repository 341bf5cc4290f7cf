//! Score, counters, timer and the persisted high score.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::SolitaireError;

pub const UNDO_PENALTY: i32 = -15;
pub const RECYCLE_PENALTY: i32 = -100;
pub const TIME_BONUS_NUMERATOR: i64 = 700_000;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScoreEvent {
    WasteToTableau,
    WasteToFoundation,
    TableauToFoundation,
    FoundationToTableau,
    TableauReveal,
    RecycleWaste
}

impl ScoreEvent {
    pub fn delta(self) -> i32 {
        match self {
            ScoreEvent::WasteToTableau => 5,
            ScoreEvent::WasteToFoundation => 10,
            ScoreEvent::TableauToFoundation => 10,
            ScoreEvent::FoundationToTableau => -15,
            ScoreEvent::TableauReveal => 5,
            ScoreEvent::RecycleWaste => RECYCLE_PENALTY
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Score {
    pub score: i32,
    pub moves: u32,
    pub undos: u32,
    /// Seconds of active play.
    pub elapsed: f64
}

impl Score {
    /// Applies `delta` with a floor of zero and returns the change actually made.
    pub fn apply(&mut self, delta: i32) -> i32 {
        let before = self.score;
        self.score = (self.score + delta).max(0);
        self.score - before
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.elapsed as i64
    }
}

pub fn time_bonus(elapsed: f64) -> i32 {
    let seconds = (elapsed as i64).max(1);
    (TIME_BONUS_NUMERATOR / seconds) as i32
}

/// Best score across sessions, stored as four native-endian bytes.
#[derive(Debug, Clone)]
pub struct HighScore {
    pub best: i32,
    path: PathBuf,
    dirty: bool
}

impl HighScore {
    /// Loads the stored value, falling back to 0 when the file is missing or malformed.
    pub fn load(path: impl Into<PathBuf>) -> HighScore {
        let path = path.into();
        let best = match read_high_score(&path) {
            Ok(best) => {
                info!("high score {} loaded from {}", best, path.display());
                best
            }
            Err(e) => {
                warn!("no high score from {}: {}", path.display(), e);
                0
            }
        };
        HighScore { best, path, dirty: false }
    }

    pub fn observe(&mut self, score: i32) {
        if score > self.best {
            self.best = score;
            self.dirty = true;
        }
    }

    pub fn save_if_changed(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        match write_high_score(&self.path, self.best) {
            Ok(()) => info!("high score {} saved", self.best),
            Err(e) => warn!("could not save high score to {}: {}", self.path.display(), e)
        }
    }
}

pub fn read_high_score(path: &Path) -> Result<i32, SolitaireError> {
    let bytes = fs::read(path)?;
    let bytes: [u8; 4] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| SolitaireError::InvalidHighScore { len: bytes.len() })?;
    Ok(i32::from_ne_bytes(bytes))
}

pub fn write_high_score(path: &Path, value: i32) -> Result<(), SolitaireError> {
    fs::write(path, value.to_ne_bytes())?;
    Ok(())
}
