//! Repair engine.
//!
//! Bounded first-improvement local search over a schedule with violations.
//! Each iteration targets the highest-severity unresolved violation,
//! enumerates candidate reassignments (single moves, then two-employee
//! swaps), and applies the first candidate the detector confirms as an
//! improvement. Every accepted move strictly reduces the
//! (hard, soft, staffing imbalance) triple, so the search cannot cycle; an
//! iteration cap bounds it anyway on unsatisfiable inputs.
//!
//! The engine never discards unresolved violations: the report carries the
//! best schedule found together with its residual set and the change-log of
//! every reassignment applied.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{
    Assignment, MonthlySchedule, Reassignment, RepairOutcome, RepairReport, RuleId,
    ScheduleHistory, Subject, Team, Violation,
};

use super::detector::ViolationDetector;

/// A candidate change to one schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Move {
    /// Reassign one employee.
    Single { employee_id: String, to: Assignment },
    /// Exchange the assignments of two employees.
    Swap { first: String, second: String },
}

/// Repairs schedules against the rule catalog.
pub struct RepairEngine<'a> {
    detector: &'a ViolationDetector,
}

impl<'a> RepairEngine<'a> {
    /// Creates a repair engine over the given detector.
    pub fn new(detector: &'a ViolationDetector) -> Self {
        Self { detector }
    }

    /// Runs the bounded local search.
    ///
    /// A clean input comes back unchanged with an empty change-log.
    pub fn repair(
        &self,
        team: &Team,
        schedule: &MonthlySchedule,
        history: &ScheduleHistory,
    ) -> RepairReport {
        let cap = self.detector.policy().repair.max_iterations;
        let mut current = schedule.clone();
        let mut change_log: Vec<Reassignment> = Vec::new();
        let mut iterations: u32 = 0;

        let cause = loop {
            let violations = self.detector.validate(team, &current, history);
            if violations.is_empty() {
                break RepairOutcome::Clean;
            }
            // Forced violations are unavoidable by construction; targeting
            // them would only burn iterations.
            let targets: Vec<&Violation> = violations.iter().filter(|v| !v.forced).collect();
            if targets.is_empty() {
                break RepairOutcome::Plateau;
            }
            if iterations >= cap {
                break RepairOutcome::IterationCap;
            }
            iterations += 1;

            match self.first_improvement(team, &current, history, &violations, &targets) {
                Some((mv, target_message)) => {
                    log_move(&mut change_log, &current, &mv, &target_message);
                    current = apply_move(&current, &mv);
                }
                None => break RepairOutcome::Plateau,
            }
        };

        let residual = self.detector.validate(team, &current, history);
        let outcome = if residual.iter().any(Violation::is_hard) {
            cause
        } else {
            RepairOutcome::Clean
        };

        info!(
            team_id = %team.id,
            month = %schedule.month,
            iterations,
            moves = change_log.len(),
            residual = residual.len(),
            outcome = ?outcome,
            "repair finished"
        );

        RepairReport {
            repair_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            schedule: current,
            residual,
            change_log,
            iterations,
            outcome,
        }
    }

    /// Finds the first move that improves the schedule, scanning targets in
    /// severity order.
    fn first_improvement(
        &self,
        team: &Team,
        schedule: &MonthlySchedule,
        history: &ScheduleHistory,
        violations: &[Violation],
        targets: &[&Violation],
    ) -> Option<(Move, String)> {
        let current_counts = severity_counts(violations);
        let current_imbalance = staffing_imbalance(team, schedule);
        for target in targets {
            for mv in candidate_moves(team, schedule, target) {
                let candidate = apply_move(schedule, &mv);
                let candidate_violations = self.detector.validate(team, &candidate, history);
                if accepts(
                    team,
                    target,
                    violations,
                    &candidate_violations,
                    current_counts,
                    current_imbalance,
                    &candidate,
                ) {
                    debug!(violation = %target.message, mv = ?mv, "accepted repair move");
                    return Some((mv, target.message.clone()));
                }
            }
        }
        None
    }
}

/// (hard, soft) violation counts.
fn severity_counts(violations: &[Violation]) -> (usize, usize) {
    let hard = violations.iter().filter(|v| v.is_hard()).count();
    (hard, violations.len() - hard)
}

/// Whether two violations concern the same rule breach.
///
/// Messages carry month-state detail (run lengths, counts), so identity is
/// the (rule, subject, month) triple.
fn same_breach(a: &Violation, b: &Violation) -> bool {
    a.rule == b.rule && a.subject == b.subject && a.month == b.month
}

/// Total per-shift deviation from the declared headcount.
///
/// A staffing breach two people deep cannot be closed by any single move,
/// so staffing repairs are allowed to make partial progress: the breach may
/// survive a move as long as this metric strictly shrinks.
fn staffing_imbalance(team: &Team, schedule: &MonthlySchedule) -> usize {
    let required = team.people_per_shift;
    schedule
        .shift_counts(team.template)
        .values()
        .map(|count| count.abs_diff(required))
        .sum()
}

/// The acceptance test for a candidate schedule.
///
/// A candidate is accepted when it introduces no hard breach the current
/// schedule did not already have, and either
/// - resolves the target breach while strictly decreasing the
///   (hard, soft) counts, or
/// - for a staffing target, strictly decreases the staffing imbalance
///   without increasing the (hard, soft) counts.
///
/// Both arms strictly decrease the (hard, soft, imbalance) triple, so the
/// search cannot cycle.
fn accepts(
    team: &Team,
    target: &Violation,
    current: &[Violation],
    candidate: &[Violation],
    current_counts: (usize, usize),
    current_imbalance: usize,
    candidate_schedule: &MonthlySchedule,
) -> bool {
    let introduces_hard = candidate
        .iter()
        .filter(|v| v.is_hard())
        .any(|v| !current.iter().any(|c| same_breach(c, v)));
    if introduces_hard {
        return false;
    }
    let candidate_counts = severity_counts(candidate);
    let resolved = !candidate.iter().any(|v| same_breach(v, target));
    if resolved && candidate_counts < current_counts {
        return true;
    }
    target.rule == RuleId::FixedStaffing
        && candidate_counts <= current_counts
        && staffing_imbalance(team, candidate_schedule) < current_imbalance
}

/// Applies a move to a copy of the schedule.
fn apply_move(schedule: &MonthlySchedule, mv: &Move) -> MonthlySchedule {
    let mut next = schedule.clone();
    match mv {
        Move::Single { employee_id, to } => {
            next.assign(employee_id.clone(), *to);
        }
        Move::Swap { first, second } => {
            if let (Some(a), Some(b)) = (
                schedule.assignment_for(first),
                schedule.assignment_for(second),
            ) {
                next.assign(first.clone(), b);
                next.assign(second.clone(), a);
            }
        }
    }
    next
}

/// Records a move in the change-log, one entry per affected employee.
fn log_move(
    change_log: &mut Vec<Reassignment>,
    schedule: &MonthlySchedule,
    mv: &Move,
    reason: &str,
) {
    match mv {
        Move::Single { employee_id, to } => {
            if let Some(from) = schedule.assignment_for(employee_id) {
                change_log.push(Reassignment {
                    employee_id: employee_id.clone(),
                    month: schedule.month,
                    from,
                    to: *to,
                    reason: reason.to_string(),
                });
            }
        }
        Move::Swap { first, second } => {
            if let (Some(a), Some(b)) = (
                schedule.assignment_for(first),
                schedule.assignment_for(second),
            ) {
                change_log.push(Reassignment {
                    employee_id: first.clone(),
                    month: schedule.month,
                    from: a,
                    to: b,
                    reason: reason.to_string(),
                });
                change_log.push(Reassignment {
                    employee_id: second.clone(),
                    month: schedule.month,
                    from: b,
                    to: a,
                    reason: reason.to_string(),
                });
            }
        }
    }
}

/// Enumerates candidate moves for one violation, cheapest first.
///
/// Singles come before swaps; the acceptance test weeds out anything that
/// trades one breach for another.
fn candidate_moves(team: &Team, schedule: &MonthlySchedule, target: &Violation) -> Vec<Move> {
    match (&target.rule, &target.subject) {
        (RuleId::FixedStaffing, Subject::Shift(shift)) => {
            staffing_moves(team, schedule, *shift)
        }
        (RuleId::HierarchyDiversity, Subject::Shift(shift)) => {
            diversity_swaps(team, schedule, *shift)
        }
        (_, Subject::Employee(employee_id)) => employee_moves(team, schedule, employee_id),
        _ => Vec::new(),
    }
}

/// Moves for a violation pinned to one employee (stability, exemption,
/// fairness): reassign them to another shift or to floater duty, or swap
/// them with any differently-assigned colleague.
fn employee_moves(team: &Team, schedule: &MonthlySchedule, employee_id: &str) -> Vec<Move> {
    let Some(current) = schedule.assignment_for(employee_id) else {
        return Vec::new();
    };
    let mut moves = Vec::new();
    for shift in team.template.shifts() {
        if current.shift() != Some(*shift) {
            moves.push(Move::Single {
                employee_id: employee_id.to_string(),
                to: Assignment::Shift(*shift),
            });
        }
    }
    if !current.is_floater() {
        moves.push(Move::Single {
            employee_id: employee_id.to_string(),
            to: Assignment::Floater,
        });
    }
    for (other, assignment) in &schedule.assignments {
        if other != employee_id && *assignment != current {
            moves.push(Move::Swap {
                first: employee_id.to_string(),
                second: other.clone(),
            });
        }
    }
    moves
}

/// Moves for an under- or over-staffed shift.
fn staffing_moves(team: &Team, schedule: &MonthlySchedule, shift: crate::models::Shift) -> Vec<Move> {
    let required = team.people_per_shift;
    let counts = schedule.shift_counts(team.template);
    let count = counts.get(&shift).copied().unwrap_or(0);
    let mut moves = Vec::new();

    if count < required {
        // Pull floaters in first: they are the surplus by construction.
        for floater in schedule.floaters() {
            moves.push(Move::Single {
                employee_id: floater.to_string(),
                to: Assignment::Shift(shift),
            });
        }
        // Then drain overstaffed shifts.
        for (other, other_count) in &counts {
            if *other == shift || *other_count <= required {
                continue;
            }
            for employee_id in schedule.employees_on(*other) {
                moves.push(Move::Single {
                    employee_id: employee_id.to_string(),
                    to: Assignment::Shift(shift),
                });
            }
        }
    } else {
        // Push occupants out: to an understaffed shift, or to floater duty.
        for employee_id in schedule.employees_on(shift) {
            for (other, other_count) in &counts {
                if *other != shift && *other_count < required {
                    moves.push(Move::Single {
                        employee_id: employee_id.to_string(),
                        to: Assignment::Shift(*other),
                    });
                }
            }
            moves.push(Move::Single {
                employee_id: employee_id.to_string(),
                to: Assignment::Floater,
            });
        }
    }
    moves
}

/// Swaps that could mix hierarchy levels on a single-level shift.
fn diversity_swaps(team: &Team, schedule: &MonthlySchedule, shift: crate::models::Shift) -> Vec<Move> {
    let occupants = schedule.employees_on(shift);
    let mut moves = Vec::new();
    for occupant in &occupants {
        let Some(occupant_level) = team.member(occupant).map(|e| e.hierarchy_level()) else {
            continue;
        };
        for (other, assignment) in &schedule.assignments {
            let Some(other_shift) = assignment.shift() else {
                continue;
            };
            if other_shift == shift {
                continue;
            }
            let Some(other_level) = team.member(other).map(|e| e.hierarchy_level()) else {
                continue;
            };
            if other_level != occupant_level {
                moves.push(Move::Swap {
                    first: (*occupant).to_string(),
                    second: other.clone(),
                });
            }
        }
    }
    moves
}
