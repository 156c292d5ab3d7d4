//! The scheduling engine.
//!
//! [`Engine`] ties the four core components together behind the surface the
//! callers use: `generate` (planner + allocator), `validate` (detector),
//! `repair` (repair engine) and the advisory-assisted repair flow. All of
//! it is synchronous pure computation over value inputs except the advisory
//! call, which is the one operation allowed to block on external I/O and is
//! always bounded by the policy timeout.

mod allocator;
mod detector;
mod planner;
mod repair;

pub use detector::ViolationDetector;
pub use repair::RepairEngine;

use std::time::Duration;

use tracing::{info, warn};

use crate::advisory::AdvisoryProvider;
use crate::config::RotationPolicy;
use crate::error::EngineResult;
use crate::models::{
    MonthlySchedule, Reassignment, RepairReport, ScheduleHistory, Team, Violation, YearMonth,
};
use crate::rules;

/// Where a schedule stands in the validate/repair lifecycle.
///
/// ```text
/// Unvalidated -> Validated(clean) | Validated(violations) -> Repairing
///             -> Repaired(clean)  | Repaired(residual)
/// ```
///
/// The machine is re-entrant: a schedule proposed by the advisory adapter
/// enters at [`ScheduleState::Unvalidated`] and must pass through the
/// detector like any other, regardless of the adapter's own claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleState {
    /// Not yet seen by the detector.
    Unvalidated,
    /// Validated; clean when the violation list is empty.
    Validated {
        /// The violations the detector found.
        violations: Vec<Violation>,
    },
    /// Under repair.
    Repairing,
    /// Repair finished; clean when the residual list has no hard entries.
    Repaired {
        /// Violations still present after repair.
        residual: Vec<Violation>,
    },
}

impl ScheduleState {
    /// True when validation or repair left no hard violations.
    pub fn is_clean(&self) -> bool {
        match self {
            ScheduleState::Unvalidated | ScheduleState::Repairing => false,
            ScheduleState::Validated { violations } => {
                !violations.iter().any(Violation::is_hard)
            }
            ScheduleState::Repaired { residual } => !residual.iter().any(Violation::is_hard),
        }
    }
}

/// The rotation engine facade.
///
/// # Example
///
/// ```no_run
/// use rota_engine::config::RotationPolicy;
/// use rota_engine::engine::Engine;
/// use rota_engine::models::{ScheduleHistory, Team, YearMonth};
///
/// # fn demo(team: &Team) -> rota_engine::error::EngineResult<()> {
/// let engine = Engine::new(RotationPolicy::default());
/// let history = ScheduleHistory::default();
/// let schedule = engine.generate(team, YearMonth::new(2026, 3), &history)?;
/// assert!(engine.validate(team, &schedule, &history).is_empty());
/// # Ok(())
/// # }
/// ```
pub struct Engine {
    detector: ViolationDetector,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(RotationPolicy::default())
    }
}

impl Engine {
    /// Creates an engine with the given rotation policy.
    pub fn new(policy: RotationPolicy) -> Self {
        Self {
            detector: ViolationDetector::new(policy),
        }
    }

    /// The active rotation policy.
    pub fn policy(&self) -> &RotationPolicy {
        self.detector.policy()
    }

    /// The detector backing this engine.
    pub fn detector(&self) -> &ViolationDetector {
        &self.detector
    }

    /// Generates one month's schedule for a team.
    ///
    /// Drafts a rotation honoring stability and floater rules, then
    /// rebalances to exact per-shift headcounts.
    ///
    /// # Errors
    ///
    /// Structural infeasibility (roster too small for the template, or no
    /// legal rebalancing move left) aborts generation with no partial
    /// schedule. An invalid team definition is rejected up front.
    pub fn generate(
        &self,
        team: &Team,
        month: YearMonth,
        history: &ScheduleHistory,
    ) -> EngineResult<MonthlySchedule> {
        team.validate()?;
        let policy = self.policy();
        let mut schedule = planner::plan_month(team, month, history, policy)?;
        allocator::balance(team, &mut schedule, history, policy)?;
        info!(
            team_id = %team.id,
            month = %month,
            employees = schedule.len(),
            floaters = schedule.floaters().len(),
            "generated monthly schedule"
        );
        Ok(schedule)
    }

    /// Generates a consecutive run of months, threading the history.
    ///
    /// Returns every generated month in order; the internal history window
    /// rolls forward at the policy depth, exactly as it would across
    /// separate `generate` calls.
    pub fn generate_run(
        &self,
        team: &Team,
        start: YearMonth,
        months: usize,
    ) -> EngineResult<Vec<MonthlySchedule>> {
        let mut history = ScheduleHistory::new(self.policy().history_depth);
        let mut run = Vec::with_capacity(months);
        let mut month = start;
        for _ in 0..months {
            let schedule = self.generate(team, month, &history)?;
            history.push(schedule.clone());
            run.push(schedule);
            month = month.next();
        }
        Ok(run)
    }

    /// Validates one month against the history preceding it.
    pub fn validate(
        &self,
        team: &Team,
        schedule: &MonthlySchedule,
        history: &ScheduleHistory,
    ) -> Vec<Violation> {
        self.detector.validate(team, schedule, history)
    }

    /// Validates a chronological run of months.
    pub fn validate_run(&self, team: &Team, months: &[MonthlySchedule]) -> Vec<Violation> {
        self.detector.validate_history(team, months)
    }

    /// Repairs a schedule deterministically.
    pub fn repair(
        &self,
        team: &Team,
        schedule: &MonthlySchedule,
        history: &ScheduleHistory,
    ) -> RepairReport {
        RepairEngine::new(&self.detector).repair(team, schedule, history)
    }

    /// Repairs a schedule, consulting the advisory provider for a second
    /// opinion when hard violations survive the deterministic pass.
    ///
    /// The provider's proposal is untrusted input: it re-enters the state
    /// machine at [`ScheduleState::Unvalidated`], is checked for structural
    /// sanity and re-validated by the detector, and is adopted only when it
    /// is strictly better than the deterministic result. Any provider
    /// failure — timeout, transport error, malformed response — degrades to
    /// the deterministic report and is never fatal.
    pub async fn repair_with_advisory(
        &self,
        provider: &dyn AdvisoryProvider,
        team: &Team,
        schedule: &MonthlySchedule,
        history: &ScheduleHistory,
    ) -> RepairReport {
        let mut report = self.repair(team, schedule, history);
        let residual_hard = report
            .residual
            .iter()
            .filter(|v| v.is_hard() && !v.forced)
            .count();
        if residual_hard == 0 {
            return report;
        }

        let timeout = Duration::from_secs(self.policy().advisory.timeout_seconds);
        let rules_text = rules::rules_text();
        let proposal = tokio::time::timeout(
            timeout,
            provider.propose_fix(&report.schedule, &report.residual, &rules_text),
        )
        .await;

        let proposal = match proposal {
            Err(_) => {
                warn!(team_id = %team.id, "advisory call timed out; keeping deterministic result");
                return report;
            }
            Ok(Err(error)) => {
                warn!(
                    team_id = %team.id,
                    error = %error,
                    "advisory call failed; keeping deterministic result"
                );
                return report;
            }
            Ok(Ok(proposal)) => proposal,
        };

        // The proposal enters at Unvalidated: shape check, then detector.
        if !proposal_is_well_formed(team, &report.schedule, &proposal) {
            warn!(team_id = %team.id, "advisory proposal malformed; keeping deterministic result");
            return report;
        }
        let proposal_violations = self.validate(team, &proposal, history);
        let state = ScheduleState::Validated {
            violations: proposal_violations.clone(),
        };

        let proposal_hard = proposal_violations.iter().filter(|v| v.is_hard()).count();
        let report_hard = report.residual.iter().filter(|v| v.is_hard()).count();
        if proposal_hard < report_hard {
            info!(
                team_id = %team.id,
                proposal_hard,
                report_hard,
                "adopting advisory proposal"
            );
            report
                .change_log
                .extend(diff_schedules(&report.schedule, &proposal));
            report.schedule = proposal;
            report.residual = proposal_violations;
        } else {
            info!(
                team_id = %team.id,
                proposal_hard,
                report_hard,
                clean = state.is_clean(),
                "advisory proposal not better; keeping deterministic result"
            );
        }
        report
    }
}

/// Structural sanity for an advisory proposal: same team and month, the
/// same set of scheduled employees, and only shifts from the team's
/// template.
fn proposal_is_well_formed(
    team: &Team,
    baseline: &MonthlySchedule,
    proposal: &MonthlySchedule,
) -> bool {
    if proposal.team_id != baseline.team_id || proposal.month != baseline.month {
        return false;
    }
    if !proposal
        .assignments
        .keys()
        .eq(baseline.assignments.keys())
    {
        return false;
    }
    proposal.assignments.values().all(|a| match a.shift() {
        Some(shift) => team.template.contains(shift),
        None => true,
    })
}

/// Change-log entries for every assignment that differs between two
/// schedules of the same month.
fn diff_schedules(before: &MonthlySchedule, after: &MonthlySchedule) -> Vec<Reassignment> {
    let mut entries = Vec::new();
    for (employee_id, to) in &after.assignments {
        let Some(from) = before.assignment_for(employee_id) else {
            continue;
        };
        if from != *to {
            entries.push(Reassignment {
                employee_id: employee_id.clone(),
                month: after.month,
                from,
                to: *to,
                reason: "advisory proposal".to_string(),
            });
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::AdvisoryError;
    use crate::models::{Assignment, Designation, Employee, Gender, RuleId, Shift, ShiftTemplate};
    use async_trait::async_trait;
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

    fn five_slot_team() -> Team {
        Team {
            id: "team_ops".to_string(),
            name: "Operations".to_string(),
            template: ShiftTemplate::ThreeShift,
            people_per_shift: 1,
            roster: vec![
                employee("emp_01", 1, Gender::Female),
                employee("emp_02", 2, Gender::Male),
                employee("emp_03", 3, Gender::Female),
                employee("emp_04", 3, Gender::Male),
            ],
        }
    }

    /// Five people for three one-person shifts: one floater each month.
    fn team_with_floater() -> Team {
        let mut team = five_slot_team();
        team.roster.push(employee("emp_05", 2, Gender::Female));
        team
    }

    #[test]
    fn test_generate_produces_validated_clean_schedule() {
        let engine = Engine::default();
        let team = team_with_floater();
        let history = ScheduleHistory::default();
        let schedule = engine.generate(&team, YearMonth::new(2026, 3), &history).unwrap();
        let violations = engine.validate(&team, &schedule, &history);
        assert!(
            violations.iter().all(|v| !v.is_hard()),
            "unexpected hard violations: {violations:?}"
        );
    }

    #[test]
    fn test_generate_run_is_clean_across_months() {
        let engine = Engine::default();
        let team = team_with_floater();
        let run = engine.generate_run(&team, YearMonth::new(2026, 1), 6).unwrap();
        assert_eq!(run.len(), 6);
        let violations = engine.validate_run(&team, &run);
        let unforced_hard: Vec<&Violation> = violations
            .iter()
            .filter(|v| v.is_hard() && !v.forced)
            .collect();
        assert!(unforced_hard.is_empty(), "hard violations: {unforced_hard:?}");
    }

    #[test]
    fn test_generate_rejects_invalid_team() {
        let engine = Engine::default();
        let mut team = five_slot_team();
        team.roster.truncate(2);
        assert!(
            engine
                .generate(&team, YearMonth::new(2026, 3), &ScheduleHistory::default())
                .is_err()
        );
    }

    #[test]
    fn test_schedule_state_cleanliness() {
        assert!(!ScheduleState::Unvalidated.is_clean());
        assert!(ScheduleState::Validated { violations: vec![] }.is_clean());
        let hard = Violation::hard(
            RuleId::FixedStaffing,
            crate::models::Subject::Shift(Shift::Night),
            YearMonth::new(2026, 3),
            "understaffed",
        );
        assert!(
            !ScheduleState::Validated {
                violations: vec![hard.clone()]
            }
            .is_clean()
        );
        assert!(!ScheduleState::Repaired { residual: vec![hard] }.is_clean());
    }

    // =========================================================================
    // Advisory flow
    // =========================================================================

    /// A provider that always returns a fixed proposal.
    struct FixedProposal(MonthlySchedule);

    #[async_trait]
    impl AdvisoryProvider for FixedProposal {
        async fn propose_fix(
            &self,
            _schedule: &MonthlySchedule,
            _violations: &[Violation],
            _rules_text: &str,
        ) -> Result<MonthlySchedule, AdvisoryError> {
            Ok(self.0.clone())
        }
    }

    /// A provider that always fails.
    struct AlwaysFails;

    #[async_trait]
    impl AdvisoryProvider for AlwaysFails {
        async fn propose_fix(
            &self,
            _schedule: &MonthlySchedule,
            _violations: &[Violation],
            _rules_text: &str,
        ) -> Result<MonthlySchedule, AdvisoryError> {
            Err(AdvisoryError::Service("model unavailable".to_string()))
        }
    }

    /// An unsatisfiable schedule: four people on a six-slot team.
    fn stuck_case() -> (Team, MonthlySchedule) {
        let team = Team {
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
            ],
        };
        let mut schedule = MonthlySchedule::new("team_ops", YearMonth::new(2026, 3));
        schedule.assign("emp_01", Assignment::Shift(Shift::Morning));
        schedule.assign("emp_02", Assignment::Shift(Shift::Morning));
        schedule.assign("emp_03", Assignment::Shift(Shift::Afternoon));
        schedule.assign("emp_04", Assignment::Shift(Shift::Afternoon));
        schedule.assign("emp_05", Assignment::Shift(Shift::Night));
        (team, schedule)
    }

    #[tokio::test]
    async fn test_advisory_failure_degrades_to_deterministic_result() {
        let engine = Engine::default();
        let (team, schedule) = stuck_case();
        let history = ScheduleHistory::default();

        let baseline = engine.repair(&team, &schedule, &history);
        let report = engine
            .repair_with_advisory(&AlwaysFails, &team, &schedule, &history)
            .await;
        assert_eq!(report.schedule, baseline.schedule);
        assert_eq!(report.residual, baseline.residual);
    }

    #[tokio::test]
    async fn test_advisory_proposal_is_revalidated_not_trusted() {
        let engine = Engine::default();
        let (team, schedule) = stuck_case();
        let history = ScheduleHistory::default();

        // The "fix" shuffles names around but leaves Night just as short.
        let mut bogus = schedule.clone();
        bogus.assign("emp_01", Assignment::Shift(Shift::Night));
        bogus.assign("emp_05", Assignment::Shift(Shift::Morning));
        let report = engine
            .repair_with_advisory(&FixedProposal(bogus), &team, &schedule, &history)
            .await;
        // Still understaffed: the proposal must not have been adopted on
        // the provider's word alone.
        assert!(report.residual.iter().any(Violation::is_hard));
    }

    #[tokio::test]
    async fn test_malformed_proposal_is_discarded() {
        let engine = Engine::default();
        let (team, schedule) = stuck_case();
        let history = ScheduleHistory::default();

        // Wrong employee set: a scheduled employee vanished.
        let mut malformed = schedule.clone();
        malformed.assignments.remove("emp_05");
        let baseline = engine.repair(&team, &schedule, &history);
        let report = engine
            .repair_with_advisory(&FixedProposal(malformed), &team, &schedule, &history)
            .await;
        assert_eq!(report.schedule, baseline.schedule);
    }

    #[tokio::test]
    async fn test_better_proposal_is_adopted_with_change_log() {
        // A zero-iteration repair cap leaves the deterministic pass with
        // its hands tied, so a genuinely better proposal must win.
        let mut policy = RotationPolicy::default();
        policy.repair.max_iterations = 0;
        let engine = Engine::new(policy);

        let (mut team, mut schedule) = stuck_case();
        team.roster.push(employee("emp_06", 3, Gender::Male));
        // Morning 3, Afternoon 2, Night 1: two staffing breaches.
        schedule.assign("emp_06", Assignment::Shift(Shift::Morning));

        let mut fixed = schedule.clone();
        fixed.assign("emp_06", Assignment::Shift(Shift::Night));

        let history = ScheduleHistory::default();
        let report = engine
            .repair_with_advisory(&FixedProposal(fixed.clone()), &team, &schedule, &history)
            .await;

        assert_eq!(report.schedule, fixed);
        assert!(report.residual.iter().all(|v| !v.is_hard()));
        assert_eq!(report.change_log.len(), 1);
        assert_eq!(report.change_log[0].employee_id, "emp_06");
        assert_eq!(report.change_log[0].reason, "advisory proposal");
    }

    #[tokio::test]
    async fn test_advisory_skipped_when_deterministic_repair_succeeds() {
        let engine = Engine::default();
        let (mut team, mut schedule) = stuck_case();
        team.roster.push(employee("emp_06", 3, Gender::Male));
        schedule.assign("emp_06", Assignment::Shift(Shift::Morning));
        // Deterministic repair resolves this fully, so the failing provider
        // must never matter.
        let history = ScheduleHistory::default();
        let report = engine
            .repair_with_advisory(&AlwaysFails, &team, &schedule, &history)
            .await;
        assert!(report.residual.iter().all(|v| !v.is_hard()));
    }

    #[test]
    fn test_diff_schedules_lists_changed_assignments_only() {
        let (_, schedule) = stuck_case();
        let mut after = schedule.clone();
        after.assign("emp_05", Assignment::Shift(Shift::Morning));
        let entries = diff_schedules(&schedule, &after);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].employee_id, "emp_05");
        assert_eq!(entries[0].reason, "advisory proposal");
    }

    #[test]
    fn test_proposal_shape_checks() {
        let (team, schedule) = stuck_case();
        assert!(proposal_is_well_formed(&team, &schedule, &schedule));

        let mut wrong_month = schedule.clone();
        wrong_month.month = YearMonth::new(2026, 4);
        assert!(!proposal_is_well_formed(&team, &schedule, &wrong_month));

        let mut foreign_shift = schedule.clone();
        foreign_shift.assign("emp_01", Assignment::Shift(Shift::EarlyMorning));
        assert!(!proposal_is_well_formed(&team, &schedule, &foreign_shift));
    }
}
