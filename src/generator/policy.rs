use serde::{Deserialize, Serialize};

pub const DEFAULT_ACTIVATION_REMAINING_MINUTES: i64 = 15;
pub const DEFAULT_ACTIVATION_MIN_ACTIVITIES: usize = 2;
pub const DEFAULT_TOLERANCE_MINUTES: i64 = 10;
pub const DEFAULT_MAX_SUPPLEMENTARY: usize = 3;

/// Thresholds for supplementary backfill. The defaults are the shipped
/// policy; workspaces may override them through `setup.generator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorPolicy {
    /// Backfill runs when more than this many minutes are unused...
    pub activation_remaining_minutes: i64,
    /// ...or when the lesson has fewer base activities than this.
    pub activation_min_activities: usize,
    /// Slack allowed over the remaining budget while packing.
    pub tolerance_minutes: i64,
    pub max_supplementary: usize,
}

impl Default for GeneratorPolicy {
    fn default() -> Self {
        Self {
            activation_remaining_minutes: DEFAULT_ACTIVATION_REMAINING_MINUTES,
            activation_min_activities: DEFAULT_ACTIVATION_MIN_ACTIVITIES,
            tolerance_minutes: DEFAULT_TOLERANCE_MINUTES,
            max_supplementary: DEFAULT_MAX_SUPPLEMENTARY,
        }
    }
}

impl GeneratorPolicy {
    pub fn should_supplement(&self, remaining_minutes: i64, base_count: usize) -> bool {
        remaining_minutes > self.activation_remaining_minutes
            || base_count < self.activation_min_activities
    }

    pub fn packing_limit(&self, remaining_minutes: i64) -> i64 {
        remaining_minutes + self.tolerance_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_thresholds() {
        let p = GeneratorPolicy::default();
        assert!(p.should_supplement(16, 5));
        assert!(!p.should_supplement(15, 2));
        assert!(p.should_supplement(0, 1));
        assert!(p.should_supplement(-30, 0));
        assert!(!p.should_supplement(-5, 3));
    }
}
