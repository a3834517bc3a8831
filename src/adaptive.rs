//! Live-updatable values for policy knobs such as the attempt limit.
//!
//! Default uses `ArcSwap` for lock-free reads; feature `adaptive-rwlock` (or building without
//! `arc-swap`) switches to an `RwLock`.

use std::sync::Arc;

#[cfg(any(feature = "adaptive-rwlock", not(feature = "arc-swap")))]
use std::sync::RwLock;

#[cfg(all(feature = "arc-swap", not(feature = "adaptive-rwlock")))]
use arc_swap::ArcSwap;

/// Shared handle to a value that policies re-read on every attempt.
///
/// Clones observe the same value, so a handle taken from a combinator can retune a retrier that is
/// already running.
#[derive(Debug)]
pub struct DynamicConfig<T> {
    #[cfg(all(feature = "arc-swap", not(feature = "adaptive-rwlock")))]
    inner: Arc<ArcSwap<T>>,
    #[cfg(any(feature = "adaptive-rwlock", not(feature = "arc-swap")))]
    inner: Arc<RwLock<T>>,
}

impl<T> Clone for DynamicConfig<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Copy> DynamicConfig<T> {
    /// Current value.
    #[cfg(all(feature = "arc-swap", not(feature = "adaptive-rwlock")))]
    pub fn get(&self) -> T {
        **self.inner.load()
    }

    /// Current value. A poisoned lock still yields the last written value.
    #[cfg(any(feature = "adaptive-rwlock", not(feature = "arc-swap")))]
    pub fn get(&self) -> T {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Update via closure.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        self.set(f(self.get()));
    }
}

impl<T> DynamicConfig<T> {
    pub fn new(value: T) -> Self {
        #[cfg(all(feature = "arc-swap", not(feature = "adaptive-rwlock")))]
        {
            Self { inner: Arc::new(ArcSwap::from_pointee(value)) }
        }
        #[cfg(any(feature = "adaptive-rwlock", not(feature = "arc-swap")))]
        {
            Self { inner: Arc::new(RwLock::new(value)) }
        }
    }

    /// Replace the value entirely.
    pub fn set(&self, value: T) {
        #[cfg(all(feature = "arc-swap", not(feature = "adaptive-rwlock")))]
        {
            self.inner.store(Arc::new(value));
        }
        #[cfg(any(feature = "adaptive-rwlock", not(feature = "arc-swap")))]
        {
            match self.inner.write() {
                Ok(mut guard) => *guard = value,
                Err(poisoned) => *poisoned.into_inner() = value,
            }
        }
    }
}
