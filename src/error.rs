//! Error handling for the graph-statistics engine
//!
//! This module defines the crate-wide error type and a Result alias.
//!
//! Two error families deserve a note. Script and function errors are
//! recoverable at single-graph granularity: one faulty script must never
//! prevent other graphs from evaluating, so they are surfaced inside
//! [`GraphResult`](crate::scripting::GraphResult) rather than torn across
//! component boundaries. Resource errors (cursor disposal, I/O) are
//! reported to the caller and not retried.

use crate::scripting::{FunctionError, ParseColorError};
use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Errors releasing or reading an underlying resource (e.g. a row cursor)
    #[error("Resource error: {0}")]
    Resource(String),

    /// Errors raised by script compilation or execution
    #[error("Script error: {0}")]
    Script(String),

    /// Typed, localizable diagnostics from function/script argument checking
    #[error(transparent)]
    Function(#[from] FunctionError),

    /// Malformed color strings passed by scripts or configuration
    #[error(transparent)]
    Color(#[from] ParseColorError),

    /// Errors decoding persisted configuration
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A script returned a value no graph adapter recognised
    #[error("Script did not return a usable graph result")]
    NoUsableResult,

    /// Lease acquisition gave up waiting
    #[error("Timeout: {0}")]
    Timeout(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EngineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a script error from a rhai error
    pub fn from_rhai_error(err: Box<rhai::EvalAltResult>) -> Self {
        EngineError::Script(err.to_string())
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, Box<rhai::EvalAltResult>> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EngineError::from_rhai_error(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| EngineError::from_rhai_error(e).with_context(f()))
    }
}
