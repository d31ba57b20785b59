//! Shared work queue for the fetch lanes
//!
//! Every lane pulls its next path from one [`WorkQueue`]. Pops are
//! serialised by a mutex, so each path is handed to exactly one lane and
//! lanes never skip or repeat a path.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Ordered queue of paths still to crawl
#[derive(Debug, Clone, Default)]
pub struct WorkQueue {
    pending: Arc<Mutex<VecDeque<String>>>,
}

impl WorkQueue {
    /// Creates a queue holding a copy of `paths` in order
    pub fn new(paths: &[String]) -> Self {
        Self {
            pending: Arc::new(Mutex::new(paths.iter().cloned().collect())),
        }
    }

    /// Claims the next path, or `None` once the queue is exhausted
    pub fn pop(&self) -> Option<String> {
        self.lock().pop_front()
    }

    /// Number of paths not yet claimed
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        // A panicking lane cannot leave the deque half-updated
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
