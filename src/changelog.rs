//! Generic changelog supporting scoped rollback.
//!
//! A stack of `(action, datum)` records. `Marker` entries delimit undo
//! scopes; [`ChangeLog::revert`] pops and replays entries in reverse until
//! (and including) the next `Marker`.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Add,
    Remove,
    Processed,
    Marker,
}

/// A single changelog entry. `Marker` entries carry no datum.
#[derive(Clone, Debug)]
struct Entry<T> {
    action: Action,
    datum: Option<T>,
}

#[derive(Clone, Debug)]
pub struct ChangeLog<T: Clone> {
    entries: Vec<Entry<T>>,
}

impl<T: Clone> Default for ChangeLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ChangeLog<T> {
    pub fn new() -> Self {
        ChangeLog { entries: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn push(&mut self, action: Action, datum: T) {
        debug_assert!(action != Action::Marker, "use push_marker for Marker entries");
        self.entries.push(Entry {
            action,
            datum: Some(datum),
        });
    }

    pub fn push_marker(&mut self) {
        self.entries.push(Entry {
            action: Action::Marker,
            datum: None,
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Pops entries back to (and including) the most recent `Marker`,
    /// invoking the appropriate callback for each non-marker entry
    /// encountered, in reverse (most-recent-first) order.
    ///
    /// - `Action::Add` entries call `on_undo_add` (the datum should be
    ///   removed from wherever it was added).
    /// - `Action::Remove` entries call `on_undo_remove` (the datum should be
    ///   force-re-added, bypassing any superset filter).
    /// - `Action::Processed` entries call `on_undo_processed` (the
    ///   "processed" flag on the datum should be cleared).
    pub fn revert<FAdd, FRemove, FProcessed>(
        &mut self,
        mut on_undo_add: FAdd,
        mut on_undo_remove: FRemove,
        mut on_undo_processed: FProcessed,
    ) where
        FAdd: FnMut(&T),
        FRemove: FnMut(&T),
        FProcessed: FnMut(&T),
    {
        while let Some(entry) = self.entries.pop() {
            match entry.action {
                Action::Marker => break,
                Action::Add => on_undo_add(entry.datum.as_ref().unwrap()),
                Action::Remove => on_undo_remove(entry.datum.as_ref().unwrap()),
                Action::Processed => on_undo_processed(entry.datum.as_ref().unwrap()),
            }
        }
    }
}
