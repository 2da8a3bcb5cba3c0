//! Optimistically updated shared values.
//!
//! [`SharedCell`] holds an immutable value behind an [`Arc`]. Readers take a cheap clone of the
//! current `Arc`. Writers compute a replacement from what they read without holding the lock,
//! then take the write lock only for the pointer comparison and swap, installing the
//! replacement if the cell still holds the value they started from. A writer that loses the
//! race recomputes from the newer value.
//!
//! ```rust
//! use groupscope::utils::SharedCell;
//!
//! let cell = SharedCell::new(1);
//! let update = cell.update(|value| value + 1);
//! assert_eq!((*update.previous, *update.updated), (1, 2));
//! assert_eq!(*cell.load(), 2);
//! ```

use std::sync::{Arc, RwLock};

/// The values on both sides of a successful [`SharedCell::update`].
#[derive(Debug)]
pub struct Update<T> {
    /// The value the update was computed from
    pub previous: Arc<T>,
    /// The value now held by the cell
    pub updated: Arc<T>,
}

/// A shared, immutable value replaced by compare-and-swap.
#[derive(Debug, Default)]
pub struct SharedCell<T> {
    value: RwLock<Arc<T>>,
}

impl<T> SharedCell<T> {
    /// Create a cell holding `value`.
    pub fn new(value: T) -> Self {
        SharedCell {
            value: RwLock::new(Arc::new(value)),
        }
    }

    /// The current value.
    pub fn load(&self) -> Arc<T> {
        read_lock!(self.value).clone()
    }

    /// Install `new` if the cell still holds `current`, compared by pointer identity.
    ///
    /// The comparison and the swap happen under the write lock.
    ///
    /// Returns `Err(actual)` with the value found in the cell otherwise.
    pub fn compare_and_swap(&self, current: &Arc<T>, new: Arc<T>) -> Result<(), Arc<T>> {
        let mut value = write_lock!(self.value);
        if Arc::ptr_eq(&value, current) {
            *value = new;
            Ok(())
        } else {
            Err(value.clone())
        }
    }

    /// Replace the value unconditionally, returning the previous one.
    pub fn swap(&self, new: Arc<T>) -> Arc<T> {
        std::mem::replace(&mut *write_lock!(self.value), new)
    }

    /// Replace the value with `f(current)`, retrying until no other writer interferes.
    ///
    /// `f` runs outside the lock and may run more than once. The lock is held only by the
    /// final [`SharedCell::compare_and_swap`].
    pub fn update<F>(&self, mut f: F) -> Update<T>
    where
        F: FnMut(&T) -> T,
    {
        let mut previous = self.load();
        loop {
            let updated = Arc::new(f(&previous));
            match self.compare_and_swap(&previous, updated.clone()) {
                Ok(()) => return Update { previous, updated },
                Err(actual) => previous = actual,
            }
        }
    }
}
