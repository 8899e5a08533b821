//! Typed, localizable diagnostics for script function arguments
//!
//! Scripts are written by end users, so argument errors must be precise
//! and translated. Each variant carries the failing function name, the
//! zero-based argument index and the source position; rendered messages
//! show the argument position one-based.

use crate::types::{Value, ValueKind};
use std::fmt;

/// The kind of a datapoints collection, used when a function requires a
/// specific interpretation of the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatapointsKind {
    Numeric,
    Duration,
}

impl DatapointsKind {
    pub fn localized_name(&self) -> String {
        match self {
            DatapointsKind::Numeric => rust_i18n::t!("datapoints_kind.numeric").into_owned(),
            DatapointsKind::Duration => rust_i18n::t!("datapoints_kind.duration").into_owned(),
        }
    }
}

/// An argument-checking failure in a script function call.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// A required argument was not supplied.
    ArgMissing {
        function: String,
        /// Zero-based argument index.
        index: usize,
        expected: ValueKind,
        line: usize,
        column: usize,
    },
    /// An argument was supplied with the wrong type.
    ArgWrongType {
        function: String,
        index: usize,
        /// Acceptable kinds, in declaration order.
        expected: Vec<ValueKind>,
        actual: ValueKind,
        line: usize,
        column: usize,
    },
    /// A datapoints argument had the wrong interpretation (e.g. a duration
    /// series passed to a numeric-only function).
    DatapointsWrongType {
        function: String,
        expected: DatapointsKind,
        actual: DatapointsKind,
        line: usize,
        column: usize,
    },
}

impl FunctionError {
    /// Stable, non-localized error class name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FunctionError::ArgMissing { .. } => "ArgMissingError",
            FunctionError::ArgWrongType { .. } => "ArgWrongTypeError",
            FunctionError::DatapointsWrongType { .. } => "DatapointsWrongTypeError",
        }
    }

    fn position(&self) -> (usize, usize) {
        match self {
            FunctionError::ArgMissing { line, column, .. }
            | FunctionError::ArgWrongType { line, column, .. }
            | FunctionError::DatapointsWrongType { line, column, .. } => (*line, *column),
        }
    }

    /// Full message in the currently selected language. Argument positions
    /// are rendered one-based.
    pub fn localized_message(&self) -> String {
        let body = match self {
            FunctionError::ArgMissing {
                function,
                index,
                expected,
                ..
            } => rust_i18n::t!(
                "errors.arg_missing",
                function = function,
                expected = expected.localized_name(),
                position = index + 1
            )
            .into_owned(),
            FunctionError::ArgWrongType {
                function,
                index,
                expected,
                actual,
                ..
            } => {
                let or = format!(" {} ", rust_i18n::t!("errors.or"));
                let expected = expected
                    .iter()
                    .map(|k| k.localized_name())
                    .collect::<Vec<_>>()
                    .join(&or);
                rust_i18n::t!(
                    "errors.arg_wrong_type",
                    function = function,
                    position = index + 1,
                    expected = expected,
                    actual = actual.localized_name()
                )
                .into_owned()
            }
            FunctionError::DatapointsWrongType {
                function,
                expected,
                actual,
                ..
            } => rust_i18n::t!(
                "errors.datapoints_wrong_type",
                function = function,
                expected = expected.localized_name(),
                actual = actual.localized_name()
            )
            .into_owned(),
        };
        let (line, column) = self.position();
        format!(
            "{} at Line {}, Column {}: {}",
            self.kind_name(),
            line,
            column,
            body
        )
    }
}

impl fmt::Display for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.localized_message())
    }
}

impl std::error::Error for FunctionError {}

/// Fetch argument `index` from a script function's argument list, checking
/// its kind. Returns the typed error scripts surface to the user when the
/// argument is absent or mistyped.
pub fn get_argument<'a>(
    args: &'a [Value],
    function: &str,
    index: usize,
    expected: ValueKind,
) -> Result<&'a Value, FunctionError> {
    match args.get(index) {
        None => Err(FunctionError::ArgMissing {
            function: function.to_string(),
            index,
            expected,
            line: 0,
            column: 0,
        }),
        Some(value) if value.kind() != expected => Err(FunctionError::ArgWrongType {
            function: function.to_string(),
            index,
            expected: vec![expected],
            actual: value.kind(),
            line: 0,
            column: 0,
        }),
        Some(value) => Ok(value),
    }
}
