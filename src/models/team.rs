//! Team model, shift names and shift templates.
//!
//! A team picks one of three shift templates and staffs every shift in it
//! with a fixed headcount each month. Roster members beyond the fixed slots
//! serve as floaters.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::{Employee, Gender, YearMonth};

/// A named work shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    /// Early morning shift, only present in the 5-shift template.
    EarlyMorning,
    /// Morning shift.
    Morning,
    /// Afternoon shift.
    Afternoon,
    /// Evening shift, present in the 4- and 5-shift templates.
    Evening,
    /// Night shift.
    Night,
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shift::EarlyMorning => "Early Morning",
            Shift::Morning => "Morning",
            Shift::Afternoon => "Afternoon",
            Shift::Evening => "Evening",
            Shift::Night => "Night",
        };
        f.write_str(name)
    }
}

/// The shift template a team runs on.
///
/// Each template is an ordered list of shift names; the order doubles as the
/// deterministic tie-break order for placement decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftTemplate {
    /// Morning / Afternoon / Night.
    #[serde(rename = "3-shift")]
    ThreeShift,
    /// Morning / Afternoon / Evening / Night.
    #[serde(rename = "4-shift")]
    FourShift,
    /// Early Morning / Morning / Afternoon / Evening / Night.
    #[serde(rename = "5-shift")]
    FiveShift,
}

impl ShiftTemplate {
    /// The ordered shifts of this template.
    pub fn shifts(&self) -> &'static [Shift] {
        match self {
            ShiftTemplate::ThreeShift => &[Shift::Morning, Shift::Afternoon, Shift::Night],
            ShiftTemplate::FourShift => &[
                Shift::Morning,
                Shift::Afternoon,
                Shift::Evening,
                Shift::Night,
            ],
            ShiftTemplate::FiveShift => &[
                Shift::EarlyMorning,
                Shift::Morning,
                Shift::Afternoon,
                Shift::Evening,
                Shift::Night,
            ],
        }
    }

    /// Number of shifts in the template.
    pub fn len(&self) -> usize {
        self.shifts().len()
    }

    /// Always false; templates have at least three shifts.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if the shift belongs to this template.
    pub fn contains(&self, shift: Shift) -> bool {
        self.shifts().contains(&shift)
    }
}

/// A team to be scheduled: template, per-shift headcount and roster.
///
/// # Invariants (checked by [`Team::validate`])
///
/// - roster size ≥ template length × people per shift;
/// - the roster contains at least 2 members of each tracked gender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier for the team.
    pub id: String,
    /// The team's name.
    pub name: String,
    /// The shift template the team runs on.
    pub template: ShiftTemplate,
    /// Required headcount for every shift in the template.
    pub people_per_shift: usize,
    /// The employees on this team.
    pub roster: Vec<Employee>,
}

impl Team {
    /// Fixed slots the template requires each month.
    pub fn fixed_slots(&self) -> usize {
        self.template.len() * self.people_per_shift
    }

    /// Roster members not on leave for the entire month, in deterministic
    /// (hierarchy level, id) order.
    pub fn active_roster(&self, month: YearMonth) -> Vec<&Employee> {
        let mut active: Vec<&Employee> = self
            .roster
            .iter()
            .filter(|e| !e.on_leave_for_entire_month(month))
            .collect();
        active.sort_by(|a, b| {
            a.hierarchy_level()
                .cmp(&b.hierarchy_level())
                .then_with(|| a.id.cmp(&b.id))
        });
        active
    }

    /// Floater slots for the month: active roster beyond the fixed slots.
    pub fn floater_count(&self, month: YearMonth) -> usize {
        self.active_roster(month).len().saturating_sub(self.fixed_slots())
    }

    /// The most senior hierarchy level present on the roster.
    ///
    /// Employees at this level are exempt from floater duty.
    pub fn top_hierarchy_level(&self) -> Option<u8> {
        self.roster.iter().map(Employee::hierarchy_level).min()
    }

    /// The distinct hierarchy levels present on the roster.
    pub fn distinct_levels(&self) -> BTreeSet<u8> {
        self.roster.iter().map(Employee::hierarchy_level).collect()
    }

    /// Looks up a roster member by id.
    pub fn member(&self, employee_id: &str) -> Option<&Employee> {
        self.roster.iter().find(|e| e.id == employee_id)
    }

    /// Checks the team invariants.
    pub fn validate(&self) -> EngineResult<()> {
        if self.people_per_shift == 0 {
            return Err(EngineError::InvalidTeam {
                team_id: self.id.clone(),
                message: "people_per_shift must be at least 1".to_string(),
            });
        }
        let required = self.fixed_slots();
        if self.roster.len() < required {
            return Err(EngineError::InvalidTeam {
                team_id: self.id.clone(),
                message: format!(
                    "roster of {} cannot fill {} fixed slots ({} shifts x {} people)",
                    self.roster.len(),
                    required,
                    self.template.len(),
                    self.people_per_shift
                ),
            });
        }
        for gender in [Gender::Male, Gender::Female] {
            let count = self.roster.iter().filter(|e| e.gender == gender).count();
            if count < 2 {
                return Err(EngineError::InvalidTeam {
                    team_id: self.id.clone(),
                    message: format!("roster must include at least 2 {gender:?} members"),
                });
            }
        }
        for employee in &self.roster {
            employee.validate_leave_allowance()?;
        }
        Ok(())
    }
}
