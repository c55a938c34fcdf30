//! Error types for the Leave Entitlement Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all hard failures that can occur during a balance calculation.
//! Data-quality problems (missing day totals) and reconciliation mismatches
//! are not errors: they are reported as warnings and report entries.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the Leave Entitlement Engine.
///
/// # Example
///
/// ```
/// use leave_engine::error::EngineError;
///
/// let error = EngineError::EmployeeNotFound {
///     employee_id: "emp_404".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Cannot compute balance for invalid employee 'emp_404': not found"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The leave policy tables are internally inconsistent.
    #[error("Invalid leave policy: {message}")]
    InvalidPolicy {
        /// A description of what made the policy invalid.
        message: String,
    },

    /// A date window whose end precedes its start.
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange {
        /// The start of the rejected window.
        start: NaiveDate,
        /// The end of the rejected window.
        end: NaiveDate,
    },

    /// The employee directory has no record for the requested identifier.
    #[error("Cannot compute balance for invalid employee '{employee_id}': not found")]
    EmployeeNotFound {
        /// The identifier that was looked up.
        employee_id: String,
    },

    /// The leave request store could not be read.
    #[error("Leave history unavailable: {message}")]
    HistoryUnavailable {
        /// A description of the read failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
