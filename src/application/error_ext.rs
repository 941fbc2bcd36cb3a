//! Error conversion helpers for hub calls and operator I/O
//!
//! Provides extension traits for cleaner error handling with context.

use std::io;

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::HubResult;

/// Extension trait for converting `HubResult` to `ApplicationResult` with context.
pub trait HubResultExt<T> {
    /// Describe the failed hub operation.
    ///
    /// # Example
    /// ```ignore
    /// hub.list_repo_files(repo)
    ///     .context(|| format!("list files of {repo}"))?;
    /// ```
    fn context<F: FnOnce() -> String>(self, context: F) -> ApplicationResult<T>;
}

impl<T> HubResultExt<T> for HubResult<T> {
    fn context<F: FnOnce() -> String>(self, context: F) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: context(),
            source: Box::new(e),
        })
    }
}

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    fn with_context(self, action: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_context(self, action: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: action.to_string(),
            source: Box::new(e),
        })
    }
}
