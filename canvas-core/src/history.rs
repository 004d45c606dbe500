//! Bounded undo/redo history of layer states.
//!
//! ## Semantics
//!
//! ```text
//! record:  past.push_back(copy of current), future.clear()
//! undo:    current -> future.front, past.back -> current
//! redo:    current -> past.back, future.front -> current
//! ```
//!
//! Both stacks hold at most `max_history` entries. `past` evicts from the
//! front (oldest), `future` evicts from the back (furthest redo).
//!
//! Entries are always owned copies, so later edits to the current state can
//! never reach back into history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::layer::LayerState;

/// Default number of snapshots kept on each stack.
pub const DEFAULT_MAX_HISTORY: usize = 128;

/// Past and future snapshots of a [`LayerState`].
///
/// Only `max_history` is serialized; the stacks are session-local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(skip)]
    past: VecDeque<LayerState>,
    #[serde(skip)]
    future: VecDeque<LayerState>,
    max_history: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    /// Create an empty history keeping at most `max_history` entries per stack.
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            max_history,
        }
    }

    /// Maximum entries per stack.
    #[must_use]
    pub const fn max_history(&self) -> usize {
        self.max_history
    }

    /// Change the bound, evicting entries that no longer fit.
    pub fn set_max_history(&mut self, max_history: usize) {
        self.max_history = max_history;
        self.trim_past();
        self.trim_future();
    }

    /// Snapshots available to undo, oldest first.
    #[must_use]
    pub fn past(&self) -> &VecDeque<LayerState> {
        &self.past
    }

    /// Snapshots available to redo, nearest first.
    #[must_use]
    pub fn future(&self) -> &VecDeque<LayerState> {
        &self.future
    }

    /// Whether [`History::undo`] would change anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether [`History::redo`] would change anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Snapshot `current` before a history-affecting mutation.
    ///
    /// Forecloses redo.
    pub fn record(&mut self, current: &LayerState) {
        self.past.push_back(current.clone());
        self.trim_past();
        self.future.clear();
        tracing::debug!(
            past = self.past.len(),
            max = self.max_history,
            "Recorded layer snapshot"
        );
    }

    /// Restore the most recent snapshot into `current`.
    ///
    /// Returns `false` without touching anything when there is nothing to undo.
    pub fn undo(&mut self, current: &mut LayerState) -> bool {
        let Some(target) = self.past.pop_back() else {
            tracing::trace!("Undo with empty past; ignoring");
            return false;
        };
        let previous = std::mem::replace(current, target);
        self.future.push_front(previous);
        self.trim_future();
        tracing::debug!(
            past = self.past.len(),
            future = self.future.len(),
            "Undo"
        );
        true
    }

    /// Re-apply the nearest undone snapshot into `current`.
    ///
    /// Returns `false` without touching anything when there is nothing to redo.
    pub fn redo(&mut self, current: &mut LayerState) -> bool {
        let Some(target) = self.future.pop_front() else {
            tracing::trace!("Redo with empty future; ignoring");
            return false;
        };
        let previous = std::mem::replace(current, target);
        self.past.push_back(previous);
        self.trim_past();
        tracing::debug!(
            past = self.past.len(),
            future = self.future.len(),
            "Redo"
        );
        true
    }

    /// Forget both stacks.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    fn trim_past(&mut self) {
        while self.past.len() > self.max_history {
            self.past.pop_front();
        }
    }

    fn trim_future(&mut self) {
        self.future.truncate(self.max_history);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{CanvasLine, Layer, LayerObject, Tool};

    fn state_with_lines(count: usize) -> LayerState {
        let mut state = LayerState::default();
        for i in 0..count {
            #[allow(clippy::cast_precision_loss)]
            let coord = i as f32;
            state.objects.push(LayerObject::Line(CanvasLine {
                layer: Layer::Base,
                tool: Tool::Brush,
                stroke_width: 1.0,
                points: vec![coord, coord],
                color: None,
            }));
        }
        state
    }

    #[test]
    fn test_record_clears_future() {
        let mut history = History::default();
        let mut current = state_with_lines(1);
        history.record(&LayerState::default());
        assert!(history.undo(&mut current));
        assert!(history.can_redo());

        history.record(&current);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = History::default();
        let before = LayerState::default();
        let after = state_with_lines(1);

        history.record(&before);
        let mut current = after.clone();

        assert!(history.undo(&mut current));
        assert_eq!(current, before);
        assert_eq!(history.future().len(), 1);

        assert!(history.redo(&mut current));
        assert_eq!(current, after);
        assert!(history.future().is_empty());
        assert_eq!(history.past().len(), 1);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = History::default();
        let mut current = state_with_lines(2);
        assert!(!history.undo(&mut current));
        assert!(!history.redo(&mut current));
        assert_eq!(current, state_with_lines(2));
    }

    #[test]
    fn test_past_evicts_oldest() {
        let mut history = History::new(2);
        for n in 0..3 {
            history.record(&state_with_lines(n));
        }
        assert_eq!(history.past().len(), 2);
        assert_eq!(history.past()[0], state_with_lines(1));
        assert_eq!(history.past()[1], state_with_lines(2));
    }

    #[test]
    fn test_future_evicts_furthest() {
        let mut history = History::new(2);
        for n in 0..2 {
            history.record(&state_with_lines(n));
        }
        let mut current = state_with_lines(2);
        assert!(history.undo(&mut current));
        assert!(history.undo(&mut current));
        assert_eq!(history.future().len(), 2);

        history.set_max_history(1);
        assert_eq!(history.future().len(), 1);
        assert_eq!(history.future()[0], state_with_lines(1));
    }

    #[test]
    fn test_zero_capacity_disables_history() {
        let mut history = History::new(0);
        history.record(&LayerState::default());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_snapshot_is_not_aliased() {
        let mut history = History::default();
        let mut current = state_with_lines(1);
        history.record(&current);

        if let Some(line) = current.last_line_mut() {
            line.points.push(99.0);
        }
        assert_eq!(history.past()[0], state_with_lines(1));
    }

    #[test]
    fn test_serialization_keeps_only_bound() {
        let mut history = History::new(7);
        history.record(&state_with_lines(1));
        let json = serde_json::to_string(&history).expect("serialize");
        let restored: History = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.max_history(), 7);
        assert!(!restored.can_undo());
    }
}
