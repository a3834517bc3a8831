//! Bounded per-attempt error log.
//!
//! The retrier records one entry per completed attempt: `Some(err)` when the operation returned an
//! error and `None` when it did not. Only the most recent `capacity` entries are kept; `recorded()`
//! still counts every attempt so truncation is visible.

use std::collections::VecDeque;

/// Default number of attempts kept in an [`ErrorLog`].
pub const DEFAULT_ERROR_LOG_CAPACITY: usize = 10;

/// Ring buffer of per-attempt errors.
#[derive(Debug, Clone)]
pub struct ErrorLog<E> {
    entries: VecDeque<Option<E>>,
    capacity: usize,
    recorded: usize,
}

impl<E> ErrorLog<E> {
    /// Create a log keeping at most `capacity` entries. A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity), capacity, recorded: 0 }
    }

    /// Append the outcome of one attempt, evicting the oldest entry when full.
    pub fn record(&mut self, error: Option<E>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(error);
        self.recorded += 1;
    }

    /// Retained entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Option<&E>> + '_ {
        self.entries.iter().map(Option::as_ref)
    }

    /// Retained errors only, skipping attempts that reported none.
    pub fn errors(&self) -> impl Iterator<Item = &E> + '_ {
        self.entries.iter().flatten()
    }

    /// Most recent entry; `None` when nothing was recorded.
    pub fn last(&self) -> Option<Option<&E>> {
        self.entries.back().map(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Attempts recorded since the last reset, including evicted ones.
    pub fn recorded(&self) -> usize {
        self.recorded
    }

    /// Attempts evicted to respect the capacity.
    pub fn dropped(&self) -> usize {
        self.recorded - self.entries.len()
    }

    /// Forget every entry and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recorded = 0;
    }

    /// Take the retained entries, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Option<E>> {
        self.recorded = 0;
        self.entries.drain(..).collect()
    }
}

impl<E> Default for ErrorLog<E> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ERROR_LOG_CAPACITY)
    }
}
