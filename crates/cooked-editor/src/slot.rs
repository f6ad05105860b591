//! The process-wide "current cooked read" slot.
//!
//! Ctrl-C handling needs a back-reference to whatever read is pending so
//! it can alert it. The slot stores only an opaque identifier: the
//! editor attaches itself on entry and detaches on every terminal
//! outcome, and a stale detach (after another read already attached) is
//! a no-op.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_READ_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one cooked read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadId(u64);

impl ReadId {
    pub(crate) fn allocate() -> Self {
        Self(NEXT_READ_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Default)]
pub struct CurrentReadSlot {
    // 0 means vacant; allocated ids start at 1.
    id: AtomicU64,
}

impl CurrentReadSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, id: ReadId) {
        self.id.store(id.0, Ordering::Release);
    }

    /// Clear the slot if it still belongs to `id`.
    pub fn detach(&self, id: ReadId) {
        let _ = self
            .id
            .compare_exchange(id.0, 0, Ordering::AcqRel, Ordering::Relaxed);
    }

    pub fn current(&self) -> Option<ReadId> {
        match self.id.load(Ordering::Acquire) {
            0 => None,
            id => Some(ReadId(id)),
        }
    }
}
