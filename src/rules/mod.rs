//! The scheduling rule catalog.
//!
//! Every rule is a uniform unit behind the [`Rule`] trait: an identifier, a
//! severity and a pure `evaluate` over a [`RuleContext`]. The catalog is an
//! ordered list, so adding or removing a rule never touches the detector's
//! control flow.
//!
//! Hard rules (shift stability, floater exemption, floater fairness, fixed
//! staffing) block schedule acceptance until repaired; the hierarchy
//! diversity rule is a soft advisory that is reported but never blocks.

mod fixed_staffing;
mod floater_exemption;
mod floater_fairness;
mod hierarchy_diversity;
mod shift_stability;

pub use fixed_staffing::FixedStaffing;
pub use floater_exemption::FloaterExemption;
pub use floater_fairness::FloaterFairness;
pub use hierarchy_diversity::HierarchyDiversity;
pub use shift_stability::ShiftStability;

use crate::config::RotationPolicy;
use crate::models::{MonthlySchedule, RuleId, ScheduleHistory, Severity, Team, Violation};

/// Everything a rule may inspect when evaluating one month.
///
/// The history window covers the months *before* `schedule.month`; rules
/// that look across months (stability, floater fairness) combine both.
pub struct RuleContext<'a> {
    /// The team being scheduled.
    pub team: &'a Team,
    /// The month under evaluation.
    pub schedule: &'a MonthlySchedule,
    /// The months preceding `schedule`.
    pub history: &'a ScheduleHistory,
    /// The active rotation policy.
    pub policy: &'a RotationPolicy,
}

/// A pluggable scheduling rule.
pub trait Rule: Send + Sync {
    /// The rule's identifier.
    fn id(&self) -> RuleId;

    /// Whether a breach blocks acceptance.
    fn severity(&self) -> Severity;

    /// Prose description of the rule, suitable for the advisory prompt.
    fn description(&self) -> &'static str;

    /// Evaluates the rule, returning every breach found.
    ///
    /// Must be pure: same context in, same violations out.
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation>;
}

/// The ordered rule catalog.
///
/// Hard rules come first, in their canonical order; the soft diversity
/// advisory comes last. The repair engine relies on this order when picking
/// the highest-severity unresolved violation.
pub fn catalog() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ShiftStability),
        Box::new(FloaterExemption),
        Box::new(FloaterFairness),
        Box::new(FixedStaffing),
        Box::new(HierarchyDiversity),
    ]
}

/// The full rule text, one numbered paragraph per rule.
///
/// This is the material handed to the advisory adapter so its proposals are
/// judged against the same rules the detector enforces.
pub fn rules_text() -> String {
    catalog()
        .iter()
        .enumerate()
        .map(|(i, rule)| format!("{}. {}", i + 1, rule.description()))
        .collect::<Vec<_>>()
        .join("\n")
}
