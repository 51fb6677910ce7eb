use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A queue with room for exactly one task.
///
/// `try_acquire` hands out at most one permit at a time; while it is alive,
/// further attempts fail and the caller drops its work instead of queueing it.
#[derive(Debug, Clone, Default)]
pub struct SingleSlot {
    busy: Arc<AtomicBool>,
}

/// Occupies the slot until dropped.
#[derive(Debug)]
pub struct SlotPermit {
    busy: Arc<AtomicBool>,
}

impl SingleSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<SlotPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SlotPermit {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for SlotPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
