//! Error types for the Shift Rotation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during schedule generation and
//! repair.
//!
//! Rule violations are deliberately *not* errors: a schedule that breaches a
//! scheduling rule is still a schedule, and violations flow through the
//! engine as [`crate::models::Violation`] values so the repair engine can
//! act on them. Errors here are the conditions that prevent the engine from
//! producing a schedule at all.

use thiserror::Error;

use crate::models::{Shift, YearMonth};

/// The main error type for the Shift Rotation Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use rota_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/policy.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/policy.yaml");
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

    /// The roster cannot satisfy the team's staffing minimums.
    ///
    /// This is fatal to generation: the engine reports it to the caller and
    /// returns no partial schedule.
    #[error(
        "Team '{team_id}' cannot staff {month}: {required} fixed slots but only {available} active employees"
    )]
    StructuralInfeasibility {
        /// The team that cannot be staffed.
        team_id: String,
        /// The month being generated.
        month: YearMonth,
        /// Fixed slots required by the shift template.
        required: usize,
        /// Active (non-full-month-leave) employees available.
        available: usize,
    },

    /// A shift remained understaffed after every legal rebalancing move was
    /// exhausted.
    ///
    /// Like [`EngineError::StructuralInfeasibility`] this is terminal: the
    /// allocator reports it instead of silently patching the schedule.
    #[error(
        "Team '{team_id}' cannot legally staff {shift} in {month}: {assigned} assigned, {required} required"
    )]
    UnstaffableShift {
        /// The team being scheduled.
        team_id: String,
        /// The month being generated.
        month: YearMonth,
        /// The shift that could not be staffed.
        shift: Shift,
        /// Employees currently assigned to the shift.
        assigned: usize,
        /// The declared per-shift requirement.
        required: usize,
    },

    /// A team definition was invalid or contained inconsistent data.
    #[error("Invalid team '{team_id}': {message}")]
    InvalidTeam {
        /// The ID of the invalid team.
        team_id: String,
        /// A description of what made the team invalid.
        message: String,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee '{employee_id}': {message}")]
    InvalidEmployee {
        /// The ID of the invalid employee.
        employee_id: String,
        /// A description of what made the record invalid.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
