//! Operational error context propagation with `anyhow`.
//!
//! Extension traits and utilities for enhancing error context and
//! reporting failures that should not interrupt the listener.

use std::{error::Error as StdError, fmt::Display};

use {
    anyhow::{Context, Error, Result as AnyhowResult},
    tracing::{error, warn},
};

/// Extension trait for enhanced error context.
pub trait ResultExt<T, E> {
    /// Adds context to an error with a static string.
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;

    /// Adds context to an error with a formatted string.
    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(context)
    }

    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(format.to_string())
    }
}

/// Centralized reporting for errors surfaced to the listener.
pub struct ErrorReporter;

impl ErrorReporter {
    /// Reports a recoverable issue.
    pub fn warn(error: &Error, context: &str) {
        warn!(context = context, error = %error, "recoverable error");
    }

    /// Reports a non-recoverable issue.
    pub fn error(error: &Error, context: &str) {
        error!(context = context, error = %error, "operation failed");
    }

    /// Converts an error to a user-friendly message.
    ///
    /// Extracts the top of the error chain for display; callers decide
    /// whether to show it at all, since most control failures are plain
    /// no-ops from the listener's point of view.
    pub fn to_user_message(error: &Error) -> String {
        error.to_string()
    }
}
