//! Fixed staffing rule.
//!
//! Every shift in the team's template must be staffed with exactly the
//! declared headcount. Employees on leave for the entire month are omitted
//! from the schedule upstream, so the counts here are the effective ones.

use crate::models::{RuleId, Severity, Subject, Violation};

use super::{Rule, RuleContext};

/// Rule: per-shift headcount equals the team's declared requirement.
pub struct FixedStaffing;

impl Rule for FixedStaffing {
    fn id(&self) -> RuleId {
        RuleId::FixedStaffing
    }

    fn severity(&self) -> Severity {
        Severity::Hard
    }

    fn description(&self) -> &'static str {
        "Fixed staffing: every shift in the team's template must be staffed with exactly \
         the declared number of people each month; both under- and over-staffing are \
         violations."
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let required = ctx.team.people_per_shift;
        let counts = ctx.schedule.shift_counts(ctx.team.template);
        let mut violations = Vec::new();
        for (shift, count) in counts {
            if count == required {
                continue;
            }
            let direction = if count < required { "under" } else { "over" };
            violations.push(Violation::hard(
                self.id(),
                Subject::Shift(shift),
                ctx.schedule.month,
                format!(
                    "{} is {}staffed in {}: {} assigned, {} required",
                    shift,
                    direction,
                    ctx.schedule.month.label(),
                    count,
                    required
                ),
            ));
        }
        violations
    }
}
