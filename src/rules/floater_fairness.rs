//! Floater fairness rule.
//!
//! Floater duty rotates: whoever floats in one month must not float in the
//! next. When the roster offers no eligible alternative the repeat still
//! surfaces as a violation, annotated as forced, so unavoidable repeats
//! remain visible instead of being silently waved through.

use crate::models::{RuleId, Severity, Subject, Violation};

use super::{Rule, RuleContext};

/// Rule: no employee floats in two consecutive months.
pub struct FloaterFairness;

impl FloaterFairness {
    /// Returns true when nobody else could have taken the floater slot:
    /// every non-floater in the current month is either exempt (top level)
    /// or was a floater in the previous month themselves.
    fn repeat_was_forced(ctx: &RuleContext<'_>) -> bool {
        let top_level = ctx.team.top_hierarchy_level();
        !ctx.schedule.assignments.iter().any(|(id, assignment)| {
            if assignment.is_floater() {
                return false;
            }
            let Some(employee) = ctx.team.member(id) else {
                return false;
            };
            Some(employee.hierarchy_level()) != top_level
                && !ctx.history.was_floater_last_month(id)
        })
    }
}

impl Rule for FloaterFairness {
    fn id(&self) -> RuleId {
        RuleId::FloaterFairness
    }

    fn severity(&self) -> Severity {
        Severity::Hard
    }

    fn description(&self) -> &'static str {
        "Floater fairness: an employee who serves as floater in one month must not serve \
         as floater in the following month; floater duty rotates among the eligible \
         employees."
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (employee_id, assignment) in &ctx.schedule.assignments {
            if !assignment.is_floater() {
                continue;
            }
            if !ctx.history.was_floater_last_month(employee_id) {
                continue;
            }
            let forced = Self::repeat_was_forced(ctx);
            let violation = Violation::hard(
                self.id(),
                Subject::Employee(employee_id.clone()),
                ctx.schedule.month,
                if forced {
                    format!(
                        "{} floats for a second consecutive month in {} (forced: no eligible alternative on the roster)",
                        employee_id,
                        ctx.schedule.month.label()
                    )
                } else {
                    format!(
                        "{} floats for a second consecutive month in {}",
                        employee_id,
                        ctx.schedule.month.label()
                    )
                },
            );
            violations.push(if forced { violation.forced() } else { violation });
        }
        violations
    }
}
