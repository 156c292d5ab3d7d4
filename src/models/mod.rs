//! Core data models for the Shift Rotation Engine.
//!
//! This module contains all the domain value types used throughout the
//! engine. The engine owns no long-lived store: schedules and histories are
//! plain values passed in and returned.

mod employee;
mod month;
mod schedule;
mod team;
mod violation;

pub use employee::{Designation, Employee, Gender};
pub use month::{ParseYearMonthError, YearMonth};
pub use schedule::{Assignment, MonthlySchedule, ScheduleHistory};
pub use team::{Shift, ShiftTemplate, Team};
pub use violation::{
    Reassignment, RepairOutcome, RepairReport, RuleId, Severity, Subject, Violation,
};
