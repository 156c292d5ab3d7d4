//! Configuration types for the rotation policy.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the policy YAML file. [`RotationPolicy::default`]
//! mirrors the shipped `config/rotation/policy.yaml`, so the engine works
//! without any filesystem access.

use serde::Deserialize;

/// Stability windows per hierarchy level.
///
/// The window is the maximum number of consecutive months an employee may
/// keep the same named shift before mandatory rotation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StabilityWindows {
    /// Window for hierarchy level 1 (most senior).
    pub level_1_months: usize,
    /// Window for hierarchy level 2.
    pub level_2_months: usize,
    /// Window for hierarchy levels 3 and below: juniors rotate every month.
    pub junior_months: usize,
}

/// Settings for the repair engine's bounded local search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepairSettings {
    /// Maximum repair iterations before the search gives up and returns the
    /// best schedule found.
    pub max_iterations: u32,
}

/// Settings for the optional AI advisory adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdvisorySettings {
    /// Timeout for a single advisory round-trip, in seconds.
    pub timeout_seconds: u64,
}

/// The complete rotation policy consumed by the engine.
///
/// # Example
///
/// ```
/// use rota_engine::config::RotationPolicy;
///
/// let policy = RotationPolicy::default();
/// assert_eq!(policy.stability_window(1), 3);
/// assert_eq!(policy.stability_window(2), 2);
/// assert_eq!(policy.stability_window(7), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RotationPolicy {
    /// Per-level stability windows.
    pub stability: StabilityWindows,
    /// Months of history retained; must cover the longest stability window.
    pub history_depth: usize,
    /// Repair engine settings.
    pub repair: RepairSettings,
    /// Advisory adapter settings.
    pub advisory: AdvisorySettings,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            stability: StabilityWindows {
                level_1_months: 3,
                level_2_months: 2,
                junior_months: 1,
            },
            history_depth: 3,
            repair: RepairSettings { max_iterations: 24 },
            advisory: AdvisorySettings { timeout_seconds: 10 },
        }
    }
}

impl RotationPolicy {
    /// The stability window for an absolute hierarchy level.
    pub fn stability_window(&self, level: u8) -> usize {
        match level {
            1 => self.stability.level_1_months,
            2 => self.stability.level_2_months,
            _ => self.stability.junior_months,
        }
    }
}
