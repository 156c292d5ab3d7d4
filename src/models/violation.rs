//! Violations, repair change-log entries and the repair report envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Assignment, MonthlySchedule, Shift, YearMonth};

/// Identifies one of the five scheduling rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// Tiered shift stability: seniority bounds consecutive months on one shift.
    ShiftStability,
    /// The roster's most senior level is never assigned floater duty.
    FloaterExemption,
    /// No employee floats in two consecutive months.
    FloaterFairness,
    /// Every shift is staffed with exactly the declared headcount.
    FixedStaffing,
    /// Shifts with two or more people should mix hierarchy levels.
    HierarchyDiversity,
}

impl RuleId {
    /// Stable string code for reports and logs.
    pub fn code(&self) -> &'static str {
        match self {
            RuleId::ShiftStability => "shift_stability",
            RuleId::FloaterExemption => "floater_exemption",
            RuleId::FloaterFairness => "floater_fairness",
            RuleId::FixedStaffing => "fixed_staffing",
            RuleId::HierarchyDiversity => "hierarchy_diversity",
        }
    }
}

/// Whether a rule blocks schedule acceptance or merely advises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A breach blocks acceptance until repaired.
    Hard,
    /// A breach is reported but never blocks acceptance.
    Soft,
}

/// What a violation is about: a specific employee, or a whole shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// The violation concerns one employee.
    Employee(String),
    /// The violation concerns a shift's staffing as a whole.
    Shift(Shift),
}

/// A single rule breach found in a schedule.
///
/// Immutable once emitted; consumed by the repair engine and by reporting.
///
/// # Example
///
/// ```
/// use rota_engine::models::{RuleId, Subject, Violation, YearMonth};
///
/// let violation = Violation::hard(
///     RuleId::FloaterExemption,
///     Subject::Employee("emp_01".to_string()),
///     YearMonth::new(2026, 3),
///     "emp_01 holds the team's most senior level and cannot float",
/// );
/// assert!(violation.is_hard());
/// assert!(!violation.forced);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The rule that was breached.
    pub rule: RuleId,
    /// Hard or soft.
    pub severity: Severity,
    /// The employee or shift affected.
    pub subject: Subject,
    /// The month in which the breach occurs.
    pub month: YearMonth,
    /// Human-readable explanation.
    pub message: String,
    /// True when the breach was unavoidable (e.g. a floater repeat with no
    /// eligible alternative) and is surfaced for visibility only.
    #[serde(default)]
    pub forced: bool,
}

impl Violation {
    /// Creates a hard violation.
    pub fn hard(
        rule: RuleId,
        subject: Subject,
        month: YearMonth,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            severity: Severity::Hard,
            subject,
            month,
            message: message.into(),
            forced: false,
        }
    }

    /// Creates a soft (advisory) violation.
    pub fn soft(
        rule: RuleId,
        subject: Subject,
        month: YearMonth,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            severity: Severity::Soft,
            subject,
            month,
            message: message.into(),
            forced: false,
        }
    }

    /// Marks the violation as a forced, unavoidable breach.
    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }

    /// Returns true for hard violations.
    pub fn is_hard(&self) -> bool {
        self.severity == Severity::Hard
    }
}

/// One reassignment applied by the repair engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassignment {
    /// The employee who was moved.
    pub employee_id: String,
    /// The month the move applies to.
    pub month: YearMonth,
    /// The assignment before the move.
    pub from: Assignment,
    /// The assignment after the move.
    pub to: Assignment,
    /// Why the move was made (the violation it addresses).
    pub reason: String,
}

/// How a repair run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairOutcome {
    /// All hard violations resolved.
    Clean,
    /// A pass applied no move; remaining violations are unresolvable by
    /// single moves and swaps.
    Plateau,
    /// The iteration cap was reached before the search converged.
    IterationCap,
}

/// The complete result of a repair run.
///
/// Mirrors the envelope the engine uses for every result it hands to
/// callers: a unique id, a timestamp, the engine version, the payload and
/// its audit data. Never discards unresolved violations — the residual set
/// is part of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    /// Unique identifier for this repair run.
    pub repair_id: Uuid,
    /// When the repair was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the repair.
    pub engine_version: String,
    /// The best schedule found.
    pub schedule: MonthlySchedule,
    /// Violations still present in `schedule`.
    pub residual: Vec<Violation>,
    /// Every reassignment applied, in order.
    pub change_log: Vec<Reassignment>,
    /// Number of repair iterations executed.
    pub iterations: u32,
    /// How the run terminated.
    pub outcome: RepairOutcome,
}

impl RepairReport {
    /// Returns true when no hard violations remain.
    pub fn is_clean(&self) -> bool {
        !self.residual.iter().any(Violation::is_hard)
    }
}
