//! Rotation planner.
//!
//! Drafts a month's assignments for a team: every active employee gets a
//! named shift chosen under the stability rule, then floater slots are
//! filled last from the eligible pool. The draft honors the stability,
//! exemption and fairness rules as construction preconditions; exact
//! per-shift headcount is the allocator's job.
//!
//! Leave is handled at month granularity: an employee on leave for part of
//! a month is still assigned a shift for continuity, while a full-month
//! absence removes them from the schedule and the headcount entirely.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::RotationPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Assignment, Employee, MonthlySchedule, ScheduleHistory, Shift, Team, YearMonth,
};

/// Drafts the monthly schedule for a team.
///
/// # Errors
///
/// Returns [`EngineError::StructuralInfeasibility`] when fewer active
/// employees remain than the template's fixed slots; no partial schedule is
/// produced in that case.
pub fn plan_month(
    team: &Team,
    month: YearMonth,
    history: &ScheduleHistory,
    policy: &RotationPolicy,
) -> EngineResult<MonthlySchedule> {
    let active = team.active_roster(month);
    let fixed_slots = team.fixed_slots();
    if active.len() < fixed_slots {
        return Err(EngineError::StructuralInfeasibility {
            team_id: team.id.clone(),
            month,
            required: fixed_slots,
            available: active.len(),
        });
    }
    let floater_slots = active.len() - fixed_slots;

    let mut schedule = MonthlySchedule::new(&team.id, month);
    let mut counts: BTreeMap<Shift, usize> =
        team.template.shifts().iter().map(|s| (*s, 0)).collect();

    // Named shifts first, in deterministic (level, id) order so seniors get
    // their stability preference before the load fills up.
    for employee in &active {
        let shift = choose_shift(employee, team, history, &counts, policy);
        debug!(
            employee_id = %employee.id,
            shift = %shift,
            "drafted named shift"
        );
        schedule.assign(&employee.id, Assignment::Shift(shift));
        if let Some(count) = counts.get_mut(&shift) {
            *count += 1;
        }
    }

    // Floater slots are filled last, drawing only from the eligible pool.
    for employee_id in select_floaters(team, &active, history, floater_slots) {
        schedule.assign(employee_id, Assignment::Floater);
    }

    Ok(schedule)
}

/// Picks the named shift for one employee under the stability rule.
///
/// While the employee's stability window permits, they keep their current
/// shift. Once the window is exhausted they rotate to the least-recently-held
/// other shift (never-held counts as least recent), tie-broken by current
/// draft load and then template order. Employees with no named-shift history
/// go wherever the draft is lightest.
fn choose_shift(
    employee: &Employee,
    team: &Team,
    history: &ScheduleHistory,
    counts: &BTreeMap<Shift, usize>,
    policy: &RotationPolicy,
) -> Shift {
    let shifts = team.template.shifts();

    if let Some(current) = history.current_shift(&employee.id) {
        if team.template.contains(current) {
            let window = policy.stability_window(employee.hierarchy_level());
            let run = history.run_length(&employee.id, current);
            if run < window {
                return current;
            }
            // Window exhausted: forced rotation.
            if let Some(next) = shifts
                .iter()
                .enumerate()
                .filter(|(_, s)| **s != current)
                .min_by_key(|(index, s)| {
                    let since = history
                        .months_since_held(&employee.id, **s)
                        .unwrap_or(usize::MAX);
                    (Reverse(since), counts.get(*s).copied().unwrap_or(0), *index)
                })
                .map(|(_, s)| *s)
            {
                return next;
            }
        }
    }

    // No usable history: balance the draft.
    shifts
        .iter()
        .enumerate()
        .min_by_key(|(index, s)| (counts.get(*s).copied().unwrap_or(0), *index))
        .map(|(_, s)| *s)
        .unwrap_or(shifts[0])
}

/// Selects this month's floaters.
///
/// Candidates exclude the roster's most senior level. Those who floated last
/// month are passed over while alternatives exist; when the eligible pool
/// runs dry the repeat is forced and logged (the detector will surface it as
/// a forced violation). As a last resort even exempt employees are drafted
/// so the fixed slots stay fillable.
fn select_floaters(
    team: &Team,
    active: &[&Employee],
    history: &ScheduleHistory,
    slots: usize,
) -> Vec<String> {
    if slots == 0 {
        return Vec::new();
    }
    let top_level = team.top_hierarchy_level();
    let candidates: Vec<&Employee> = active
        .iter()
        .copied()
        .filter(|e| Some(e.hierarchy_level()) != top_level)
        .collect();

    let mut eligible: Vec<&Employee> = candidates
        .iter()
        .copied()
        .filter(|e| !history.was_floater_last_month(&e.id))
        .collect();
    // Longest since floater duty first; never-floated ranks before everyone.
    eligible.sort_by_key(|e| {
        (
            Reverse(history.months_since_floater(&e.id).unwrap_or(usize::MAX)),
            e.hierarchy_level(),
            e.id.clone(),
        )
    });

    let mut selected: Vec<String> = eligible
        .iter()
        .take(slots)
        .map(|e| e.id.clone())
        .collect();

    if selected.len() < slots {
        // Eligible pool exhausted: forced repeats, fewest window floats first.
        let mut repeats: Vec<&Employee> = candidates
            .iter()
            .copied()
            .filter(|e| history.was_floater_last_month(&e.id))
            .collect();
        repeats.sort_by_key(|e| {
            (
                history.floater_months(&e.id),
                e.hierarchy_level(),
                e.id.clone(),
            )
        });
        for employee in repeats {
            if selected.len() == slots {
                break;
            }
            warn!(
                employee_id = %employee.id,
                team_id = %team.id,
                "forced floater repeat: no eligible alternative on the roster"
            );
            selected.push(employee.id.clone());
        }
    }

    if selected.len() < slots {
        // Even repeats exhausted: drafting the exempt tier is the only way
        // to keep the fixed slots fillable. The detector will flag it.
        let mut exempt: Vec<&Employee> = active
            .iter()
            .copied()
            .filter(|e| !selected.iter().any(|id| *id == e.id))
            .filter(|e| Some(e.hierarchy_level()) == top_level)
            .collect();
        exempt.sort_by_key(|e| {
            (
                Reverse(history.months_since_floater(&e.id).unwrap_or(usize::MAX)),
                e.id.clone(),
            )
        });
        for employee in exempt {
            if selected.len() == slots {
                break;
            }
            warn!(
                employee_id = %employee.id,
                team_id = %team.id,
                "floater pool exhausted: drafting an exempt employee"
            );
            selected.push(employee.id.clone());
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Designation, Gender, ShiftTemplate};
    use std::collections::BTreeSet;

    fn employee(id: &str, level: u8, gender: Gender) -> Employee {
        Employee {
            id: id.to_string(),
            name: format!("Employee {id}"),
            gender,
            designation: Designation {
                id: format!("des_{level}"),
                title: format!("Level {level}"),
                hierarchy_level: level,
                monthly_leave_allowance: 2,
            },
            leave_dates: BTreeSet::new(),
        }
    }

    fn six_person_team() -> Team {
        Team {
            id: "team_ops".to_string(),
            name: "Operations".to_string(),
            template: ShiftTemplate::ThreeShift,
            people_per_shift: 2,
            roster: vec![
                employee("emp_01", 1, Gender::Female),
                employee("emp_02", 1, Gender::Male),
                employee("emp_03", 2, Gender::Female),
                employee("emp_04", 2, Gender::Male),
                employee("emp_05", 3, Gender::Female),
                employee("emp_06", 3, Gender::Male),
            ],
        }
    }

    fn month_with(assignments: &[(&str, Assignment)], month: YearMonth) -> MonthlySchedule {
        let mut schedule = MonthlySchedule::new("team_ops", month);
        for (id, assignment) in assignments {
            schedule.assign(*id, *assignment);
        }
        schedule
    }

    #[test]
    fn test_every_active_employee_is_assigned_once() {
        let team = six_person_team();
        let policy = RotationPolicy::default();
        let schedule = plan_month(
            &team,
            YearMonth::new(2026, 3),
            &ScheduleHistory::default(),
            &policy,
        )
        .unwrap();
        assert_eq!(schedule.len(), 6);
        assert!(schedule.floaters().is_empty());
    }

    #[test]
    fn test_infeasible_roster_is_rejected_without_partial_schedule() {
        let mut team = six_person_team();
        team.roster.truncate(5);
        let policy = RotationPolicy::default();
        let result = plan_month(
            &team,
            YearMonth::new(2026, 3),
            &ScheduleHistory::default(),
            &policy,
        );
        match result {
            Err(EngineError::StructuralInfeasibility {
                required,
                available,
                ..
            }) => {
                assert_eq!(required, 6);
                assert_eq!(available, 5);
            }
            other => panic!("Expected StructuralInfeasibility, got {other:?}"),
        }
    }

    #[test]
    fn test_full_month_leave_triggers_infeasibility() {
        let mut team = six_person_team();
        let month = YearMonth::new(2026, 2);
        team.roster[0].leave_dates = month.days().collect();
        let policy = RotationPolicy::default();
        assert!(plan_month(&team, month, &ScheduleHistory::default(), &policy).is_err());
    }

    #[test]
    fn test_senior_keeps_shift_within_window() {
        let team = six_person_team();
        let policy = RotationPolicy::default();
        let mut history = ScheduleHistory::new(3);
        history.push(month_with(
            &[("emp_01", Assignment::Shift(Shift::Night))],
            YearMonth::new(2026, 2),
        ));
        let schedule = plan_month(&team, YearMonth::new(2026, 3), &history, &policy).unwrap();
        assert_eq!(
            schedule.assignment_for("emp_01"),
            Some(Assignment::Shift(Shift::Night))
        );
    }

    #[test]
    fn test_junior_is_rotated_every_month() {
        let team = six_person_team();
        let policy = RotationPolicy::default();
        let mut history = ScheduleHistory::new(3);
        history.push(month_with(
            &[("emp_05", Assignment::Shift(Shift::Morning))],
            YearMonth::new(2026, 2),
        ));
        let schedule = plan_month(&team, YearMonth::new(2026, 3), &history, &policy).unwrap();
        assert_ne!(
            schedule.assignment_for("emp_05"),
            Some(Assignment::Shift(Shift::Morning))
        );
    }

    #[test]
    fn test_level_1_rotates_after_third_month() {
        let team = six_person_team();
        let policy = RotationPolicy::default();
        let mut history = ScheduleHistory::new(3);
        for m in 1..=3 {
            history.push(month_with(
                &[("emp_01", Assignment::Shift(Shift::Morning))],
                YearMonth::new(2026, m),
            ));
        }
        let schedule = plan_month(&team, YearMonth::new(2026, 4), &history, &policy).unwrap();
        assert_ne!(
            schedule.assignment_for("emp_01"),
            Some(Assignment::Shift(Shift::Morning))
        );
    }

    #[test]
    fn test_forced_rotation_prefers_least_recently_held_shift() {
        let team = six_person_team();
        let policy = RotationPolicy::default();
        let mut history = ScheduleHistory::new(3);
        // emp_05 (junior): Afternoon two months ago, Morning last month.
        history.push(month_with(
            &[("emp_05", Assignment::Shift(Shift::Afternoon))],
            YearMonth::new(2026, 1),
        ));
        history.push(month_with(
            &[("emp_05", Assignment::Shift(Shift::Morning))],
            YearMonth::new(2026, 2),
        ));
        let schedule = plan_month(&team, YearMonth::new(2026, 3), &history, &policy).unwrap();
        // Night was never held, so it is the least recent choice.
        assert_eq!(
            schedule.assignment_for("emp_05"),
            Some(Assignment::Shift(Shift::Night))
        );
    }

    #[test]
    fn test_floater_slots_filled_from_non_exempt_pool() {
        let mut team = six_person_team();
        team.roster.push(employee("emp_07", 3, Gender::Female));
        let policy = RotationPolicy::default();
        let schedule = plan_month(
            &team,
            YearMonth::new(2026, 3),
            &ScheduleHistory::default(),
            &policy,
        )
        .unwrap();
        let floaters = schedule.floaters();
        assert_eq!(floaters.len(), 1);
        let floater = team.member(floaters[0]).unwrap();
        assert_ne!(floater.hierarchy_level(), 1);
    }

    #[test]
    fn test_last_months_floater_is_passed_over() {
        let mut team = six_person_team();
        team.roster.push(employee("emp_07", 3, Gender::Female));
        let policy = RotationPolicy::default();
        let mut history = ScheduleHistory::new(3);
        history.push(month_with(
            &[("emp_07", Assignment::Floater)],
            YearMonth::new(2026, 2),
        ));
        let schedule = plan_month(&team, YearMonth::new(2026, 3), &history, &policy).unwrap();
        let floaters = schedule.floaters();
        assert_eq!(floaters.len(), 1);
        assert_ne!(floaters[0], "emp_07");
    }

    #[test]
    fn test_exhausted_pool_forces_a_repeat() {
        // Four-person roster on a 3-shift/1-person template: one floater
        // slot, and the only non-exempt member floated last month.
        let team = Team {
            id: "team_ops".to_string(),
            name: "Operations".to_string(),
            template: ShiftTemplate::ThreeShift,
            people_per_shift: 1,
            roster: vec![
                employee("emp_01", 1, Gender::Female),
                employee("emp_02", 1, Gender::Male),
                employee("emp_03", 1, Gender::Female),
                employee("emp_04", 3, Gender::Male),
            ],
        };
        let policy = RotationPolicy::default();
        let mut history = ScheduleHistory::new(3);
        history.push(month_with(
            &[("emp_04", Assignment::Floater)],
            YearMonth::new(2026, 2),
        ));
        let schedule = plan_month(&team, YearMonth::new(2026, 3), &history, &policy).unwrap();
        assert_eq!(schedule.floaters(), vec!["emp_04"]);
    }
}
