//! Bounded undo/redo over whole-state snapshots.

pub const MAX_HISTORY: usize = 50;

/// Snapshot history with a cursor. Anything cloneable works; the viewer keeps
/// whole house maps in it, so a layout run is a single `push`.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    cursor: usize,
    limit: usize,
}

impl<T: Clone + PartialEq> History<T> {
    pub fn new(initial: T) -> Self {
        Self::with_limit(initial, MAX_HISTORY)
    }

    pub fn with_limit(initial: T, limit: usize) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            limit: limit.max(1),
        }
    }

    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    /// Record a new state. Drops any redo branch; a value equal to the
    /// current one is ignored.
    pub fn push(&mut self, next: T) {
        if next == *self.current() {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(next);
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(..overflow);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Overwrite the current state without creating an undo step.
    pub fn replace(&mut self, next: T) {
        self.entries[self.cursor] = next;
    }

    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// Forget everything, e.g. after loading a fresh snapshot from storage.
    pub fn reset(&mut self, state: T) {
        self.entries = vec![state];
        self.cursor = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
