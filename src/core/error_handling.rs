//! Generic error handling utilities
//!
//! Provides unified error handling that can work across different error types
//! while maintaining domain-specific error logging patterns.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// This trait enables generic error handling functions to determine whether an error
/// should show specific user messages or generic context with debug details.
///
/// # Implementation Consistency
/// When `is_user_actionable()` returns `true` and a specific message exists,
/// `user_message()` should return `Some(message)`; `log_error_with_context`
/// falls back to the operation context otherwise. When `is_user_actionable()`
/// returns `false`, `user_message()` should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error contains a specific, user-actionable message
    /// that should be displayed directly to the user
    ///
    /// Examples of user-actionable errors:
    /// - Configuration validation failures
    /// - Duplicate request submission
    ///
    /// Examples of system errors:
    /// - Poisoned locks
    /// - Event channel failures
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// - Shows specific messages for user-actionable errors (preserves detail)
/// - Shows generic context with debug details for system errors
/// - Ensures consistent error formatting across all modules
///
/// # Arguments
/// * `error` - The error to handle (must implement ContextualError)
/// * `operation_context` - Human-readable description of the operation that failed
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    if error.is_user_actionable() {
        if let Some(user_msg) = error.user_message() {
            log::error!("{}: {}", operation_context, user_msg);
        } else {
            log::error!("{}", operation_context);
        }
    } else {
        log::error!("{}", operation_context);
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct TestUserError {
        message: String,
    }

    impl fmt::Display for TestUserError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for TestUserError {}

    impl ContextualError for TestUserError {
        fn is_user_actionable(&self) -> bool {
            true
        }

        fn user_message(&self) -> Option<&str> {
            Some(&self.message)
        }
    }

    #[derive(Debug)]
    struct TestSystemError;

    impl fmt::Display for TestSystemError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "internal failure")
        }
    }

    impl std::error::Error for TestSystemError {}

    impl ContextualError for TestSystemError {
        fn is_user_actionable(&self) -> bool {
            false
        }

        fn user_message(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn test_user_actionable_error_exposes_message() {
        let err = TestUserError {
            message: "duplicate request id".to_string(),
        };
        assert!(err.is_user_actionable());
        assert_eq!(err.user_message(), Some("duplicate request id"));
    }

    #[test]
    fn test_system_error_hides_message() {
        let err = TestSystemError;
        assert!(!err.is_user_actionable());
        assert!(err.user_message().is_none());
    }

    #[test]
    fn test_log_error_with_context_does_not_panic() {
        let err = TestUserError {
            message: "bad input".to_string(),
        };
        log_error_with_context(&err, "Submitting scan");
        log_error_with_context(&TestSystemError, "Promoting entry");
    }
}
