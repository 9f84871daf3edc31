use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::NodeId;

/// Hands out identity tokens for freshly built nodes.
pub trait IdSource {
    fn next_id(&self) -> NodeId;
}

static NEXT_GLOBAL_ID: AtomicU64 = AtomicU64::new(0);

/// Process-wide counter. Tokens never collide, even across threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalIds;

impl IdSource for GlobalIds {
    fn next_id(&self) -> NodeId {
        NodeId(NEXT_GLOBAL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Deterministic counter owned by a single forest.
///
/// Tokens are only unique among nodes built through the same source, so do
/// not compare ids of trees that came from different `SequentialIds`.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: Cell::new(first),
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> NodeId {
        let id = self.next.get();
        self.next.set(id + 1);
        NodeId(id)
    }
}
