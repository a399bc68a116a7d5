//! # Correction decision history
//!
//! A linear undo/redo timeline of [`CorrectionBatch`] snapshots. Every
//! transition takes a state by value and returns the next one, so callers can
//! hold on to old states and compare them. Snapshots are full copies of the
//! batch, not deltas.
//!
//! `undo` and `redo` at the ends of the timeline return the state unchanged.

use crate::correction::CorrectionBatch;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Undoable history of correction decisions.
///
/// `past` is ordered oldest first, `future` nearest-undone first. Together
/// with `present` they form one timeline with no branches.
///
/// # Example
///
/// ```rust
/// use eyd_core::correction::{CorrectionBatch, CorrectionCandidate};
/// use eyd_core::history::HistoryState;
///
/// let batch = CorrectionBatch::from_candidates(vec![
///     CorrectionCandidate::new("yg", "yang", "abbreviation"),
/// ]);
/// let state = HistoryState::load(batch.clone());
/// let next = batch.with_decision(0, true)?;
///
/// let applied = state.clone().apply(next);
/// assert!(applied.can_undo());
/// let undone = applied.undo();
/// assert_eq!(undone.present(), state.present());
/// assert!(undone.can_redo());
/// # Ok::<(), eyd_core::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    past: Vec<CorrectionBatch>,
    present: CorrectionBatch,
    future: VecDeque<CorrectionBatch>,
}

impl HistoryState {
    /// Start a fresh timeline with `batch` as the only snapshot.
    pub fn load(batch: CorrectionBatch) -> Self {
        debug!(corrections = batch.len(), "Loading correction batch");
        Self {
            past: Vec::new(),
            present: batch,
            future: VecDeque::new(),
        }
    }

    /// Commit `next` as the current snapshot.
    ///
    /// The old current snapshot moves to the end of `past`, and any redo
    /// history is dropped.
    pub fn apply(mut self, next: CorrectionBatch) -> Self {
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push(previous);
        if !self.future.is_empty() {
            debug!(dropped = self.future.len(), "Discarding redo history");
            self.future.clear();
        }
        self
    }

    /// Step back one snapshot. No-op when there is nothing to undo.
    pub fn undo(mut self) -> Self {
        match self.past.pop() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.present, previous);
                self.future.push_front(current);
                self
            }
            None => self,
        }
    }

    /// Step forward one snapshot. No-op when there is nothing to redo.
    pub fn redo(mut self) -> Self {
        match self.future.pop_front() {
            Some(next) => {
                let current = std::mem::replace(&mut self.present, next);
                self.past.push(current);
                self
            }
            None => self,
        }
    }

    /// The current snapshot.
    pub fn present(&self) -> &CorrectionBatch {
        &self.present
    }

    /// Earlier snapshots, oldest first.
    pub fn past(&self) -> &[CorrectionBatch] {
        &self.past
    }

    /// Undone snapshots, nearest first.
    pub fn future(&self) -> &VecDeque<CorrectionBatch> {
        &self.future
    }

    /// Whether [`HistoryState::undo`] would change anything.
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether [`HistoryState::redo`] would change anything.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}
