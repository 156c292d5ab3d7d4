//! Optional AI advisory boundary.
//!
//! **Responsibility:** second opinions on broken schedules, nothing more.
//!
//! This module is intentionally not part of the core engine:
//! - it never mutates schedules; it emits *proposals*;
//! - every proposal is untrusted input and must be re-validated by the
//!   deterministic detector before adoption;
//! - every failure mode is equivalent to "no proposal" — the repair flow
//!   falls back to its own deterministic result and carries on.

mod http;

pub use http::HttpAdvisor;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{MonthlySchedule, Violation};

/// Errors from an advisory provider.
///
/// Callers treat every variant identically — as the absence of a proposal.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    /// The provider did not answer within the allotted time.
    #[error("advisory request timed out")]
    Timeout,

    /// The transport failed.
    #[error("advisory transport error: {0}")]
    Http(String),

    /// The provider answered with something that is not a schedule.
    #[error("advisory response malformed: {0}")]
    MalformedResponse(String),

    /// The provider reported an error of its own.
    #[error("advisory service error: {0}")]
    Service(String),
}

/// A source of schedule correction proposals.
///
/// Implementations receive the broken schedule, the violations the detector
/// found, and the prose rule text, and return a candidate corrected
/// schedule. The caller re-validates the candidate; providers are
/// suggestion generators, never authorities.
#[async_trait]
pub trait AdvisoryProvider: Send + Sync {
    /// Requests a corrected schedule.
    async fn propose_fix(
        &self,
        schedule: &MonthlySchedule,
        violations: &[Violation],
        rules_text: &str,
    ) -> Result<MonthlySchedule, AdvisoryError>;
}
