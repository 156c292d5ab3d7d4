//! Hierarchy diversity advisory.
//!
//! Shifts staffed with two or more people should mix hierarchy levels so
//! seniors and juniors work together. This is the one soft rule in the
//! catalog: breaches are reported but never block schedule acceptance.

use crate::models::{RuleId, Severity, Subject, Violation};

use super::{Rule, RuleContext};

/// Advisory: multi-person shifts should span at least two hierarchy levels.
pub struct HierarchyDiversity;

impl Rule for HierarchyDiversity {
    fn id(&self) -> RuleId {
        RuleId::HierarchyDiversity
    }

    fn severity(&self) -> Severity {
        Severity::Soft
    }

    fn description(&self) -> &'static str {
        "Hierarchy diversity (advisory): a shift staffed with two or more employees \
         should include at least two distinct hierarchy levels whenever the roster's \
         level distribution makes that possible."
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        // A single-level roster cannot mix levels anywhere.
        if ctx.team.distinct_levels().len() < 2 {
            return Vec::new();
        }
        let mut violations = Vec::new();
        for shift in ctx.team.template.shifts() {
            let assigned = ctx.schedule.employees_on(*shift);
            if assigned.len() < 2 {
                continue;
            }
            let levels: std::collections::BTreeSet<u8> = assigned
                .iter()
                .filter_map(|id| ctx.team.member(id))
                .map(|e| e.hierarchy_level())
                .collect();
            if levels.len() == 1 {
                let level = levels.iter().next().copied().unwrap_or_default();
                violations.push(Violation::soft(
                    self.id(),
                    Subject::Shift(*shift),
                    ctx.schedule.month,
                    format!(
                        "{} has {} employees, all at hierarchy level {}",
                        shift,
                        assigned.len(),
                        level
                    ),
                ));
            }
        }
        violations
    }
}
