//! Employee model and related types.
//!
//! This module defines the [`Employee`], [`Gender`] and [`Designation`]
//! types that describe the people being scheduled. All of them are plain
//! value objects: the engine receives them as input and never stores them.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::YearMonth;

/// Gender tracked for team composition checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
}

/// A job designation carrying the seniority rank used by the rotation rules.
///
/// Hierarchy level 1 is the most senior; larger numbers are more junior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Designation {
    /// Unique identifier for the designation.
    pub id: String,
    /// Human-readable title (e.g. "Shift Supervisor").
    pub title: String,
    /// Seniority rank; 1 = most senior.
    pub hierarchy_level: u8,
    /// Maximum leave days an employee of this designation may take per month.
    pub monthly_leave_allowance: u8,
}

/// An employee subject to shift rotation.
///
/// Immutable within a scheduling run.
///
/// # Example
///
/// ```
/// use rota_engine::models::{Designation, Employee, Gender};
/// use std::collections::BTreeSet;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     name: "Priya Nair".to_string(),
///     gender: Gender::Female,
///     designation: Designation {
///         id: "des_supervisor".to_string(),
///         title: "Shift Supervisor".to_string(),
///         hierarchy_level: 1,
///         monthly_leave_allowance: 2,
///     },
///     leave_dates: BTreeSet::new(),
/// };
/// assert_eq!(employee.hierarchy_level(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The employee's name.
    pub name: String,
    /// Gender, tracked for the team composition invariant.
    pub gender: Gender,
    /// The employee's designation, carrying the hierarchy level.
    pub designation: Designation,
    /// Approved leave dates, in chronological order.
    #[serde(default)]
    pub leave_dates: BTreeSet<NaiveDate>,
}

impl Employee {
    /// The employee's hierarchy level, from their designation.
    pub fn hierarchy_level(&self) -> u8 {
        self.designation.hierarchy_level
    }

    /// Counts the employee's leave days falling within the given month.
    pub fn leave_days_in(&self, month: YearMonth) -> usize {
        self.leave_dates
            .iter()
            .filter(|d| month.contains(**d))
            .count()
    }

    /// Returns true if the employee is on leave for every day of the month.
    ///
    /// Such an employee is omitted from the month's schedule entirely and
    /// does not count toward staffing minimums.
    pub fn on_leave_for_entire_month(&self, month: YearMonth) -> bool {
        month.days().all(|d| self.leave_dates.contains(&d))
    }

    /// Validates the leave dates against the designation's monthly allowance.
    ///
    /// A full-month absence is exempt from the allowance: it removes the
    /// employee from scheduling rather than consuming leave days.
    pub fn validate_leave_allowance(&self) -> EngineResult<()> {
        let mut by_month: BTreeSet<YearMonth> = BTreeSet::new();
        for date in &self.leave_dates {
            by_month.insert(YearMonth::of(*date));
        }
        for month in by_month {
            if self.on_leave_for_entire_month(month) {
                continue;
            }
            let taken = self.leave_days_in(month);
            let allowed = self.designation.monthly_leave_allowance as usize;
            if taken > allowed {
                return Err(EngineError::InvalidEmployee {
                    employee_id: self.id.clone(),
                    message: format!(
                        "{taken} leave days in {month} exceeds allowance of {allowed}"
                    ),
                });
            }
        }
        Ok(())
    }
}
