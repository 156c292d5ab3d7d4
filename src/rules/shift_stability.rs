//! Tiered shift stability rule.
//!
//! Seniority buys stability: level 1 may keep a shift for up to 3
//! consecutive months, level 2 for 2, and levels 3 and below must rotate
//! every month. A breach is the same named shift appearing one month beyond
//! the level's window.

use crate::models::{RuleId, Severity, Subject, Violation};

use super::{Rule, RuleContext};

/// Rule: an employee may keep the same shift for at most their level's
/// stability window of consecutive months.
pub struct ShiftStability;

impl Rule for ShiftStability {
    fn id(&self) -> RuleId {
        RuleId::ShiftStability
    }

    fn severity(&self) -> Severity {
        Severity::Hard
    }

    fn description(&self) -> &'static str {
        "Tiered shift stability: hierarchy level 1 employees may stay on the same named \
         shift for at most 3 consecutive months, level 2 for at most 2, and level 3 or \
         below must work a different shift every month."
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (employee_id, assignment) in &ctx.schedule.assignments {
            let Some(shift) = assignment.shift() else {
                continue;
            };
            let Some(employee) = ctx.team.member(employee_id) else {
                continue;
            };
            let window = ctx.policy.stability_window(employee.hierarchy_level());
            // The run includes the month under evaluation.
            let run = 1 + ctx.history.run_length(employee_id, shift);
            if run > window {
                violations.push(Violation::hard(
                    self.id(),
                    Subject::Employee(employee_id.clone()),
                    ctx.schedule.month,
                    format!(
                        "{} (level {}) has held {} for {} consecutive months; the limit is {}",
                        employee_id,
                        employee.hierarchy_level(),
                        shift,
                        run,
                        window
                    ),
                ));
            }
        }
        violations
    }
}
