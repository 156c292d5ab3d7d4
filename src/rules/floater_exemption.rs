//! Floater exemption rule.
//!
//! The most senior hierarchy level present on a team never serves as
//! floater. The exemption is roster-relative: if a team has no level-1
//! members, its level-2 members become the exempt tier.

use crate::models::{RuleId, Severity, Subject, Violation};

use super::{Rule, RuleContext};

/// Rule: employees at the team's most senior level are never floaters.
pub struct FloaterExemption;

impl Rule for FloaterExemption {
    fn id(&self) -> RuleId {
        RuleId::FloaterExemption
    }

    fn severity(&self) -> Severity {
        Severity::Hard
    }

    fn description(&self) -> &'static str {
        "Floater exemption: employees at the most senior hierarchy level present on the \
         team are never assigned floater duty; floaters are drawn from the remaining \
         levels only."
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let Some(top_level) = ctx.team.top_hierarchy_level() else {
            return Vec::new();
        };
        let mut violations = Vec::new();
        for (employee_id, assignment) in &ctx.schedule.assignments {
            if !assignment.is_floater() {
                continue;
            }
            let Some(employee) = ctx.team.member(employee_id) else {
                continue;
            };
            if employee.hierarchy_level() == top_level {
                violations.push(Violation::hard(
                    self.id(),
                    Subject::Employee(employee_id.clone()),
                    ctx.schedule.month,
                    format!(
                        "{} holds the team's most senior level ({}) and is exempt from floater duty",
                        employee_id, top_level
                    ),
                ));
            }
        }
        violations
    }
}
