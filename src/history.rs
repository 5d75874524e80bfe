//! Undo/Redo history of annotation-set snapshots.
//!
//! Every committed change stores a full copy of the annotation set. The
//! history is linear: recording after an undo discards the redo entries.

/// Configuration for the history
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of snapshots to keep (at least one)
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: crate::constants::HISTORY_LIMIT,
        }
    }
}

/// Snapshot history with a cursor.
///
/// `index` always points at an existing entry; the entry at `index` is the
/// state currently shown.
#[derive(Debug, Clone)]
pub struct History<T: Clone + PartialEq> {
    entries: Vec<T>,
    index: usize,
    config: HistoryConfig,
}

impl<T: Clone + PartialEq> History<T> {
    /// Create a history holding only the initial state.
    ///
    /// The initial entry is the baseline, not a change.
    pub fn new(initial: T) -> Self {
        Self::with_config(initial, HistoryConfig::default())
    }

    pub fn with_config(initial: T, config: HistoryConfig) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            config,
        }
    }

    /// Record a committed state.
    ///
    /// Returns false (and records nothing) when `state` equals the current entry.
    pub fn record(&mut self, state: T) -> bool {
        if self.entries[self.index] == state {
            return false;
        }

        self.entries.truncate(self.index + 1);
        self.entries.push(state);
        self.index += 1;

        // Limit history size
        let max = self.config.max_entries.max(1);
        while self.entries.len() > max {
            self.entries.remove(0);
            self.index -= 1;
        }

        log::debug!("History: recorded entry {}/{}", self.index + 1, self.entries.len());
        true
    }

    /// Step back. Returns the restored state, or None at the first entry.
    pub fn undo(&mut self) -> Option<&T> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        log::debug!("⏪ Undo to entry {}/{}", self.index + 1, self.entries.len());
        Some(&self.entries[self.index])
    }

    /// Step forward. Returns the restored state, or None at the last entry.
    pub fn redo(&mut self) -> Option<&T> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        log::debug!("⏩ Redo to entry {}/{}", self.index + 1, self.entries.len());
        Some(&self.entries[self.index])
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn current(&self) -> &T {
        &self.entries[self.index]
    }

    /// Rewrite every entry in place without creating a new step.
    pub fn update_entries(&mut self, mut f: impl FnMut(&mut T)) {
        for entry in &mut self.entries {
            f(entry);
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_entry_is_not_a_change() {
        let history = History::new(vec![1]);
        assert_eq!(history.entries.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_record_ignores_identical_state() {
        let mut history = History::new(vec![1]);
        assert!(!history.record(vec![1]));
        assert_eq!(history.entries.len(), 1);
        assert!(history.record(vec![1, 2]));
        assert_eq!(history.index, 1);
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut history = History::new(vec![1]);
        assert!(history.undo().is_none());
        assert_eq!(history.index, 0);
    }

    #[test]
    fn test_undo_redo_restores_snapshots() {
        let mut history = History::new(vec![]);
        history.record(vec![1]);
        history.record(vec![1, 2]);

        assert_eq!(history.undo(), Some(&vec![1]));
        assert_eq!(history.undo(), Some(&vec![]));
        assert_eq!(history.redo(), Some(&vec![1]));
        assert_eq!(history.redo(), Some(&vec![1, 2]));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_record_after_undo_discards_redo() {
        let mut history = History::new(vec![]);
        history.record(vec![1]);
        history.record(vec![1, 2]);
        history.undo();
        assert!(history.can_redo());

        history.record(vec![1, 3]);
        assert!(!history.can_redo());
        assert_eq!(history.entries.len(), 3);
        assert_eq!(history.current(), &vec![1, 3]);
    }

    #[test]
    fn test_max_entries() {
        let mut history = History::with_config(0, HistoryConfig { max_entries: 3 });
        for i in 1..=5 {
            history.record(i);
        }
        assert_eq!(history.entries.len(), 3);
        assert_eq!(history.index, 2);
        assert_eq!(history.current(), &5);
        history.undo();
        history.undo();
        assert_eq!(history.current(), &3);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_update_entries_does_not_add_step() {
        let mut history = History::new(vec![1]);
        history.record(vec![2]);
        history.update_entries(|entry| entry.push(3));
        assert_eq!(history.entries.len(), 2);
        assert_eq!(history.current(), &vec![2, 3]);
        assert_eq!(history.undo(), Some(&vec![1, 3]));
    }
}
