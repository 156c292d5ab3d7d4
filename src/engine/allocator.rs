//! Staffing allocator.
//!
//! Takes the planner's draft and rebalances named-shift headcounts until
//! every shift holds exactly the declared number of people. Each move takes
//! one employee from the most overstaffed shift to the most understaffed
//! one, so total imbalance strictly decreases and the loop terminates.
//!
//! Move preference: employees whose stability window is not mid-run first,
//! then moves that improve hierarchy diversity on the target shift, then
//! juniors before seniors. A move that would immediately breach the
//! stability rule on the target shift is never taken; if no legal move
//! remains while a shift is still understaffed, that is a terminal
//! condition reported to the caller.

use std::cmp::Reverse;

use tracing::debug;

use crate::config::RotationPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{Assignment, MonthlySchedule, ScheduleHistory, Shift, Team};

/// Rebalances the draft schedule to satisfy fixed staffing exactly.
///
/// # Errors
///
/// Returns [`EngineError::UnstaffableShift`] when a shift remains
/// understaffed after every legal move has been exhausted.
pub fn balance(
    team: &Team,
    schedule: &mut MonthlySchedule,
    history: &ScheduleHistory,
    policy: &RotationPolicy,
) -> EngineResult<()> {
    let required = team.people_per_shift;

    loop {
        let counts = schedule.shift_counts(team.template);
        let understaffed = counts
            .iter()
            .filter(|(_, count)| **count < required)
            .max_by_key(|(shift, count)| (required - **count, Reverse(**shift)))
            .map(|(shift, count)| (*shift, *count));
        let Some((under_shift, under_count)) = understaffed else {
            return Ok(());
        };

        let overstaffed: Vec<Shift> = {
            let mut shifts: Vec<(Shift, usize)> = counts
                .iter()
                .filter(|(_, count)| **count > required)
                .map(|(shift, count)| (*shift, *count))
                .collect();
            shifts.sort_by_key(|(shift, count)| (Reverse(*count), *shift));
            shifts.into_iter().map(|(shift, _)| shift).collect()
        };

        let mover = overstaffed
            .iter()
            .find_map(|over_shift| pick_mover(team, schedule, history, policy, *over_shift, under_shift));

        match mover {
            Some(employee_id) => {
                debug!(
                    employee_id = %employee_id,
                    to = %under_shift,
                    "rebalancing move"
                );
                schedule.assign(employee_id, Assignment::Shift(under_shift));
            }
            None => {
                return Err(EngineError::UnstaffableShift {
                    team_id: team.id.clone(),
                    month: schedule.month,
                    shift: under_shift,
                    assigned: under_count,
                    required,
                });
            }
        }
    }
}

/// Picks the best employee to move from `over_shift` to `under_shift`,
/// or `None` when every occupant is blocked by the stability rule.
fn pick_mover(
    team: &Team,
    schedule: &MonthlySchedule,
    history: &ScheduleHistory,
    policy: &RotationPolicy,
    over_shift: Shift,
    under_shift: Shift,
) -> Option<String> {
    let target_levels: std::collections::BTreeSet<u8> = schedule
        .employees_on(under_shift)
        .iter()
        .filter_map(|id| team.member(id))
        .map(|e| e.hierarchy_level())
        .collect();

    schedule
        .employees_on(over_shift)
        .iter()
        .filter_map(|id| team.member(id))
        .filter(|employee| {
            // Moving onto a shift the employee just rotated off would put
            // them straight back over their window.
            let window = policy.stability_window(employee.hierarchy_level());
            history.run_length(&employee.id, under_shift) + 1 <= window
        })
        .min_by_key(|employee| {
            let window = policy.stability_window(employee.hierarchy_level());
            let run = history.run_length(&employee.id, over_shift);
            let mid_run = run > 0 && run < window;
            let improves_diversity = !target_levels.contains(&employee.hierarchy_level());
            (
                mid_run,
                !improves_diversity,
                Reverse(employee.hierarchy_level()),
                employee.id.clone(),
            )
        })
        .map(|employee| employee.id.clone())
}
