//! Violation detector.
//!
//! Runs the ordered rule catalog over a completed schedule. The detector is
//! a pure function of its inputs: it mutates nothing and returns the same
//! violation set every time it is invoked on the same schedule — the
//! contract both the repair engine and the advisory adapter rely on to
//! confirm a proposed fix.

use crate::config::RotationPolicy;
use crate::models::{MonthlySchedule, ScheduleHistory, Team, Violation};
use crate::rules::{self, Rule, RuleContext};

/// Evaluates the rule catalog against schedules.
pub struct ViolationDetector {
    policy: RotationPolicy,
    catalog: Vec<Box<dyn Rule>>,
}

impl ViolationDetector {
    /// Creates a detector with the given policy and the standard catalog.
    pub fn new(policy: RotationPolicy) -> Self {
        Self {
            policy,
            catalog: rules::catalog(),
        }
    }

    /// The active rotation policy.
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Validates one month against the history preceding it.
    ///
    /// Violations are returned in catalog order (hard rules first), with
    /// each rule's findings in the deterministic order the rule emits them.
    pub fn validate(
        &self,
        team: &Team,
        schedule: &MonthlySchedule,
        history: &ScheduleHistory,
    ) -> Vec<Violation> {
        let ctx = RuleContext {
            team,
            schedule,
            history,
            policy: &self.policy,
        };
        self.catalog
            .iter()
            .flat_map(|rule| rule.evaluate(&ctx))
            .collect()
    }

    /// Validates a chronological run of months.
    ///
    /// Each month is checked against a rolling history window of the months
    /// before it, so cross-month rules see exactly what they would have seen
    /// at generation time.
    pub fn validate_history(&self, team: &Team, months: &[MonthlySchedule]) -> Vec<Violation> {
        let mut history = ScheduleHistory::new(self.policy.history_depth);
        let mut violations = Vec::new();
        for schedule in months {
            violations.extend(self.validate(team, schedule, &history));
            history.push(schedule.clone());
        }
        violations
    }
}
