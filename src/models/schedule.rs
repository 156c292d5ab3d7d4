//! Monthly schedules and their rolling history.
//!
//! [`MonthlySchedule`] is the atomic output of the engine: one assignment
//! per active roster employee for one calendar month. [`ScheduleHistory`]
//! keeps a fixed-depth window of past months so the consecutive-month rules
//! can be evaluated in O(window) time.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::{Shift, ShiftTemplate, YearMonth};

/// What an employee does in a given month: a named shift, or floater duty.
///
/// The floater role is a sentinel not tied to any named shift; floaters
/// cover staffing gaps wherever they occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    /// Fixed assignment to a named shift.
    Shift(Shift),
    /// Floater duty for the month.
    Floater,
}

impl Assignment {
    /// The named shift, if this is a fixed assignment.
    pub fn shift(&self) -> Option<Shift> {
        match self {
            Assignment::Shift(s) => Some(*s),
            Assignment::Floater => None,
        }
    }

    /// Returns true for floater duty.
    pub fn is_floater(&self) -> bool {
        matches!(self, Assignment::Floater)
    }
}

/// The shift assignments of one team for one calendar month.
///
/// Every active roster employee appears exactly once. Employees on leave for
/// the entire month are omitted and do not count toward staffing minimums.
/// Assignments are kept in a `BTreeMap` so iteration order — and therefore
/// every downstream computation — is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySchedule {
    /// The team this schedule belongs to.
    pub team_id: String,
    /// The calendar month the schedule covers.
    pub month: YearMonth,
    /// Assignment per employee id.
    pub assignments: BTreeMap<String, Assignment>,
}

impl MonthlySchedule {
    /// Creates an empty schedule for a team and month.
    pub fn new(team_id: impl Into<String>, month: YearMonth) -> Self {
        Self {
            team_id: team_id.into(),
            month,
            assignments: BTreeMap::new(),
        }
    }

    /// Sets an employee's assignment, replacing any previous one.
    pub fn assign(&mut self, employee_id: impl Into<String>, assignment: Assignment) {
        self.assignments.insert(employee_id.into(), assignment);
    }

    /// The assignment for an employee, if scheduled this month.
    pub fn assignment_for(&self, employee_id: &str) -> Option<Assignment> {
        self.assignments.get(employee_id).copied()
    }

    /// Employee ids assigned to the given named shift, in id order.
    pub fn employees_on(&self, shift: Shift) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|(_, a)| a.shift() == Some(shift))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Employee ids on floater duty, in id order.
    pub fn floaters(&self) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|(_, a)| a.is_floater())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Headcount per shift of the given template.
    pub fn shift_counts(&self, template: ShiftTemplate) -> BTreeMap<Shift, usize> {
        let mut counts: BTreeMap<Shift, usize> = template
            .shifts()
            .iter()
            .map(|s| (*s, 0))
            .collect();
        for assignment in self.assignments.values() {
            if let Some(shift) = assignment.shift() {
                *counts.entry(shift).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Number of scheduled employees.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Returns true if no employee is scheduled.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// A fixed-depth chronological window of a team's past monthly schedules.
///
/// The depth is the longest rule window (3 months for level-1 shift
/// stability), so consecutive-month rules can be evaluated without walking
/// an unbounded list. Pushing beyond the depth evicts the oldest month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleHistory {
    depth: usize,
    months: VecDeque<MonthlySchedule>,
}

impl Default for ScheduleHistory {
    fn default() -> Self {
        Self::new(3)
    }
}

impl ScheduleHistory {
    /// Creates an empty history retaining at most `depth` months.
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
            months: VecDeque::new(),
        }
    }

    /// The retention depth in months.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of months currently held.
    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// Returns true if no months are held.
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Appends a month, evicting the oldest when the window is full.
    ///
    /// Months must be pushed in chronological order; the consecutive-month
    /// queries assume adjacent entries are adjacent months.
    pub fn push(&mut self, schedule: MonthlySchedule) {
        self.months.push_back(schedule);
        while self.months.len() > self.depth {
            self.months.pop_front();
        }
    }

    /// The most recent month, if any.
    pub fn latest(&self) -> Option<&MonthlySchedule> {
        self.months.back()
    }

    /// Iterates the held months in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &MonthlySchedule> {
        self.months.iter()
    }

    /// Iterates the held months newest-first.
    fn iter_recent(&self) -> impl Iterator<Item = &MonthlySchedule> {
        self.months.iter().rev()
    }

    /// The employee's named shift in the most recent month, if any.
    ///
    /// Returns `None` when the history is empty, the employee was absent,
    /// or the employee was a floater.
    pub fn current_shift(&self, employee_id: &str) -> Option<Shift> {
        self.latest()?.assignment_for(employee_id)?.shift()
    }

    /// How many trailing consecutive months the employee has held `shift`.
    ///
    /// Counts backwards from the most recent month and stops at the first
    /// month with a different assignment (or absence).
    pub fn run_length(&self, employee_id: &str, shift: Shift) -> usize {
        self.iter_recent()
            .take_while(|m| {
                m.assignment_for(employee_id)
                    .is_some_and(|a| a.shift() == Some(shift))
            })
            .count()
    }

    /// Returns true if the employee was a floater in the most recent month.
    pub fn was_floater_last_month(&self, employee_id: &str) -> bool {
        self.latest()
            .and_then(|m| m.assignment_for(employee_id))
            .is_some_and(|a| a.is_floater())
    }

    /// Months since the employee last served as floater.
    ///
    /// `Some(1)` means the immediately preceding month; `None` means never
    /// within the window.
    pub fn months_since_floater(&self, employee_id: &str) -> Option<usize> {
        self.iter_recent()
            .position(|m| {
                m.assignment_for(employee_id)
                    .is_some_and(|a| a.is_floater())
            })
            .map(|i| i + 1)
    }

    /// Months since the employee last held the given named shift.
    ///
    /// `Some(1)` means the immediately preceding month; `None` means never
    /// within the window.
    pub fn months_since_held(&self, employee_id: &str, shift: Shift) -> Option<usize> {
        self.iter_recent()
            .position(|m| {
                m.assignment_for(employee_id)
                    .is_some_and(|a| a.shift() == Some(shift))
            })
            .map(|i| i + 1)
    }

    /// How many months within the window the employee served as floater.
    pub fn floater_months(&self, employee_id: &str) -> usize {
        self.months
            .iter()
            .filter(|m| {
                m.assignment_for(employee_id)
                    .is_some_and(|a| a.is_floater())
            })
            .count()
    }
}
