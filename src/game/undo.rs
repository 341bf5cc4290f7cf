//! Move history.
//!
//! Reversible changes are recorded into a pending buffer while a move is being
//! made. Committing pushes a marker followed by the pending entries onto the
//! history, so one undo replays back to the most recent marker.

use circular_buffer::CircularBuffer;

use super::table::{CardId, PileId};

pub const UNDO_LEVELS: usize = 1024;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UndoEntry {
    Commit,
    Score(i32),
    Transfer {
        card: CardId,
        source: PileId,
        was_face_up: bool,
        /// The card that was directly beneath `card` in `source`, and whether it was face up then.
        parent: Option<(CardId, bool)>
    }
}

pub struct UndoLog {
    pending: Vec<UndoEntry>,
    history: CircularBuffer<UNDO_LEVELS, UndoEntry>
}

impl Default for UndoLog {
    fn default() -> Self {
        UndoLog { pending: Vec::new(), history: CircularBuffer::new() }
    }
}

impl UndoLog {
    pub fn record(&mut self, entry: UndoEntry) {
        debug_assert!(entry != UndoEntry::Commit);
        self.pending.push(entry);
    }

    /// Moves the pending entries into the history behind a marker. Returns false
    /// when nothing was pending, so an idle frame is not counted as a move.
    pub fn commit(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        self.push(UndoEntry::Commit);
        for entry in std::mem::take(&mut self.pending) {
            self.push(entry);
        }
        true
    }

    fn push(&mut self, entry: UndoEntry) {
        if self.history.is_full() {
            self.drop_oldest_move();
        }
        self.history.push_back(entry);
    }

    fn drop_oldest_move(&mut self) {
        log::debug!("undo history full, forgetting the oldest move");
        self.history.pop_front();
        while self.history.front().is_some_and(|entry| *entry != UndoEntry::Commit) {
            self.history.pop_front();
        }
    }

    /// Removes the most recent move, returning its entries newest first.
    pub fn pop_move(&mut self) -> Option<Vec<UndoEntry>> {
        if self.history.is_empty() {
            return None;
        }
        let mut entries = Vec::new();
        loop {
            match self.history.pop_back() {
                Some(UndoEntry::Commit) => break,
                Some(entry) => entries.push(entry),
                None => {
                    debug_assert!(false, "undo history without a commit marker");
                    break;
                }
            }
        }
        Some(entries)
    }
}
