//! Utility macros and functions for the message crate.
//!
//! This module provides helpers that are used internally by the value types.

use triomphe::Arc;

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Applies `f` to a copy of the shared value.
///
/// Returns the original `Arc` when the copy is still equal to the shared value, so
/// callers can rely on pointer identity for no-op updates.
pub(crate) fn copy_on_write<T, F>(shared: &Arc<T>, f: F) -> Arc<T>
where
    T: Clone + PartialEq,
    F: FnOnce(&mut T),
{
    let mut copy = T::clone(shared);
    f(&mut copy);
    if copy == **shared { Arc::clone(shared) } else { Arc::new(copy) }
}
