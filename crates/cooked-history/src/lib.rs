//! Per-process command history for cooked reads.
//!
//! Indices are signed: the popup navigation code computes candidate
//! selections like `selected - height / 2` that go negative before being
//! clamped, so an unsigned index type would just push casts to every
//! call site.
//!
//! The retrieval cursor (`position`) ranges over `[0, len]`, where `len`
//! means "nothing recalled yet"; `last_displayed` remembers the index the
//! user last saw, which seeds the command-list selection and the prefix
//! search (F8) start point.

pub mod alias;

pub use alias::AliasTable;

pub type Index = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Previous,
    Next,
}

#[derive(Debug, Clone)]
pub struct CommandHistory {
    commands: Vec<String>,
    capacity: usize,
    position: Index,
    /// Index of the command the user last saw through recall or the
    /// command-list popup.
    pub last_displayed: Index,
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            commands: Vec::new(),
            capacity: capacity.max(1),
            position: 0,
            last_displayed: 0,
        }
    }

    pub fn count(&self) -> Index {
        self.commands.len() as Index
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether the retrieval cursor sits on the oldest command.
    pub fn at_first(&self) -> bool {
        self.position <= 0
    }

    /// Whether the retrieval cursor sits on the newest command.
    pub fn at_last(&self) -> bool {
        self.position >= self.count() - 1
    }

    /// The most recently appended command, or `""`.
    pub fn last_command(&self) -> &str {
        self.commands.last().map_or("", String::as_str)
    }

    /// Append a committed line. Empty lines are not recorded. With
    /// `dedup`, an identical older entry is removed first so the history
    /// holds each command once.
    pub fn add(&mut self, command: &str, dedup: bool) {
        if command.is_empty() {
            return;
        }
        if dedup {
            self.commands.retain(|c| c != command);
        }
        if self.commands.len() == self.capacity {
            self.commands.remove(0);
        }
        self.commands.push(command.to_string());
        self.position = self.count();
        self.last_displayed = self.count() - 1;
        tracing::debug!(target: "cooked.history", count = self.commands.len(), "command recorded");
    }

    /// Step the retrieval cursor and return the command there.
    pub fn retrieve(&mut self, direction: SearchDirection) -> &str {
        let last = (self.count() - 1).max(0);
        self.position = match direction {
            SearchDirection::Previous => (self.position - 1).clamp(0, last),
            SearchDirection::Next => (self.position + 1).clamp(0, last),
        };
        self.last_displayed = self.position;
        self.nth(self.position)
    }

    /// Jump the retrieval cursor to `index` (clamped; `Index::MAX` means
    /// the newest command) and return the command there.
    pub fn retrieve_nth(&mut self, index: Index) -> &str {
        let last = (self.count() - 1).max(0);
        self.position = index.clamp(0, last);
        self.last_displayed = self.position;
        self.nth(self.position)
    }

    /// Peek without touching the cursor; out-of-range yields `""` (the
    /// command-list popup paints blank rows with it).
    pub fn nth(&self, index: Index) -> &str {
        if index < 0 {
            return "";
        }
        self.commands.get(index as usize).map_or("", String::as_str)
    }

    /// Find the next command whose text starts with `prefix`, searching
    /// backwards from just before `start` and wrapping around. An empty
    /// prefix matches every command.
    pub fn find_matching(&self, prefix: &str, start: Index) -> Option<Index> {
        let count = self.count();
        if count == 0 {
            return None;
        }
        let start = start.clamp(0, count - 1);
        let mut index = start;
        for _ in 0..count {
            index -= 1;
            if index < 0 {
                index = count - 1;
            }
            if self.nth(index).starts_with(prefix) {
                return Some(index);
            }
        }
        None
    }

    /// Remove the command at `index`; out-of-range is a no-op.
    pub fn remove(&mut self, index: Index) {
        if index < 0 || index >= self.count() {
            return;
        }
        self.commands.remove(index as usize);
        let last = (self.count() - 1).max(0);
        self.position = self.position.clamp(0, self.count().max(0));
        self.last_displayed = self.last_displayed.clamp(0, last);
    }

    /// Swap two entries; out-of-range pairs are a no-op.
    pub fn swap(&mut self, a: Index, b: Index) {
        let count = self.count();
        if a < 0 || b < 0 || a >= count || b >= count || a == b {
            return;
        }
        self.commands.swap(a as usize, b as usize);
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.position = 0;
        self.last_displayed = 0;
        tracing::debug!(target: "cooked.history", "history cleared");
    }
}
