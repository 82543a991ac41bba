//! Unified error types for wiki-changes.
//!
//! Parsing and diffing are lenient by design and never fail, so the error
//! surface covers the three places a failure can actually originate: the
//! artifact cache, the host-implemented build collaborators, and file IO at
//! the CLI boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for wiki-changes operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum WikiDiffError {
    /// Errors during cache operations
    #[error("Cache operation failed: {context}")]
    Cache {
        context: String,
        #[source]
        source: CacheErrorKind,
    },

    /// Errors raised by a build collaborator (renderer, page store, account
    /// switcher). Caught at the orchestrator boundary and logged, never
    /// propagated to end users.
    #[error("Change build failed: {context}")]
    Build {
        context: String,
        #[source]
        source: BuildErrorKind,
    },

    /// IO errors with path context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Specific cache error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CacheErrorKind {
    #[error("Stored artifact could not be deserialized: {0}")]
    CorruptEntry(String),
}

/// Specific build error kinds
///
/// Collaborator trait implementations use these to report failures; see the
/// construction helpers on [`WikiDiffError`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BuildErrorKind {
    #[error("Renderer failed for revision {revision}: {message}")]
    RenderFailed { revision: String, message: String },

    #[error("Page store error: {0}")]
    PageStore(String),

    #[error("Account switch failed: {0}")]
    AccountSwitch(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for wiki-changes operations
pub type Result<T> = std::result::Result<T, WikiDiffError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl WikiDiffError {
    /// Create a cache error
    pub fn cache(context: impl Into<String>, source: CacheErrorKind) -> Self {
        Self::Cache {
            context: context.into(),
            source,
        }
    }

    /// Create a build error
    pub fn build(context: impl Into<String>, source: BuildErrorKind) -> Self {
        Self::Build {
            context: context.into(),
            source,
        }
    }

    /// Create a build error for a failed render
    pub fn render_failed(revision: impl Into<String>, message: impl Into<String>) -> Self {
        Self::build(
            "rendering revision",
            BuildErrorKind::RenderFailed {
                revision: revision.into(),
                message: message.into(),
            },
        )
    }

    /// Create a build error for a page store failure
    pub fn page_store(message: impl Into<String>) -> Self {
        Self::build(
            "querying page store",
            BuildErrorKind::PageStore(message.into()),
        )
    }

    /// Create a build error for a failed account switch
    pub fn account_switch(message: impl Into<String>) -> Self {
        Self::build(
            "switching account",
            BuildErrorKind::AccountSwitch(message.into()),
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let message = format!("{source}");
        Self::Io {
            path: path.into(),
            message,
            source,
        }
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<serde_json::Error> for WikiDiffError {
    fn from(err: serde_json::Error) -> Self {
        Self::cache(
            "artifact serialization",
            CacheErrorKind::CorruptEntry(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings are chained front-to-back so the resulting message shows
/// the path through the code, outermost caller first.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    ///
    /// The closure is only called if the result is an error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<WikiDiffError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: WikiDiffError, new_ctx: &str) -> WikiDiffError {
    match err {
        WikiDiffError::Cache {
            context: existing,
            source,
        } => WikiDiffError::Cache {
            context: chain_context(new_ctx, &existing),
            source,
        },
        WikiDiffError::Build {
            context: existing,
            source,
        } => WikiDiffError::Build {
            context: chain_context(new_ctx, &existing),
            source,
        },
        WikiDiffError::Io {
            path,
            message,
            source,
        } => WikiDiffError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WikiDiffError::render_failed("3", "renderer panicked");
        let display = err.to_string();
        assert!(
            display.contains("build failed"),
            "Error message should mention the build: {}",
            display
        );

        let err = WikiDiffError::page_store("revision query timed out");
        assert!(err.to_string().contains("build failed"));
    }

    #[test]
    fn test_error_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = WikiDiffError::io("/path/to/revision.html", io_err);

        assert!(err.to_string().contains("/path/to/revision.html"));
    }

    #[test]
    fn test_serde_error_becomes_corrupt_entry() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = WikiDiffError::from(json_err);
        assert!(matches!(
            err,
            WikiDiffError::Cache {
                source: CacheErrorKind::CorruptEntry(_),
                ..
            }
        ));
    }

    #[test]
    fn test_context_chaining() {
        let initial_err: Result<()> = Err(WikiDiffError::page_store("initial context"));

        let err_with_context = initial_err.context("outer context");

        match err_with_context {
            Err(WikiDiffError::Build { context, .. }) => {
                assert!(
                    context.contains("outer context"),
                    "Should contain outer context: {}",
                    context
                );
            }
            _ => panic!("Expected Build error"),
        }
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(WikiDiffError::build(
                "base",
                BuildErrorKind::PageStore("boom".to_string()),
            ))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(WikiDiffError::Build { context, .. }) => {
                assert!(context.contains("outer layer"), "Missing outer: {}", context);
                assert!(
                    context.contains("middle layer"),
                    "Missing middle: {}",
                    context
                );
                assert!(context.contains("base"), "Missing base: {}", context);
            }
            _ => panic!("Expected Build error"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(WikiDiffError::account_switch("session gone"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
        assert_eq!(
            chain_context("outer", "middle: inner"),
            "outer: middle: inner"
        );
    }
}
