//! Synchronization utilities for robust mutex handling
//!
//! Converts lock poisoning into domain errors instead of panicking, so a
//! panicked executor thread can never take the queue down with it.

use std::sync::LockResult;

/// Handle poisoned mutex cases with consistent error handling
///
/// Converts mutex poison errors into application-specific errors using a
/// provided error constructor.
///
/// # Arguments
/// * `result` - The result from a mutex lock operation
/// * `error_constructor` - Function to create the appropriate error type
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use scangate::core::sync::handle_mutex_poison;
/// use scangate::queue::QueueError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(
///     mutex.lock(),
///     |message| QueueError::LockPoisoned { message }
/// ).unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). This indicates a panic occurred while holding a lock. PoisonError: {:?}",
            poison_err
        ))
    })
}
