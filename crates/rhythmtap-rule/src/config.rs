use std::path::Path;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use crate::judge::JudgeWindows;
use crate::score::ScoreRule;

/// Versioned timing preset.
///
/// V1 is the legacy tuning (wider window, shorter lead); V2 is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RuleVersion {
    V1,
    #[default]
    V2,
}

/// Rule configuration fixed at session start.
///
/// All times are microseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct RuleConfig {
    pub version: RuleVersion,
    /// Outer judgement window; also the timeout for unjudged taps.
    pub hit_window_us: i64,
    pub perfect_window_us: i64,
    pub great_window_us: i64,
    /// How far ahead of its time a note becomes active.
    pub spawn_lead_us: i64,
    /// Delay between `start` and song time 0.
    pub start_delay_us: i64,
    /// Misses until the session fails.
    pub miss_limit: u32,
    pub revenge_enabled: bool,
    /// Combo required to activate revenge.
    pub revenge_threshold: u32,
    pub revenge_duration_us: i64,
    pub revenge_multiplier: u64,
    /// Health restored per successful judgement.
    pub health_recovery: f64,
    /// Acceleration magnitude (g) that counts as a shake.
    pub shake_threshold: f64,
    pub shake_debounce_us: i64,
    /// Extra time after the last note's end before the session completes.
    pub completion_grace_us: i64,
    pub motion_queue_capacity: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::for_version(RuleVersion::default())
    }
}

impl RuleConfig {
    pub fn for_version(version: RuleVersion) -> Self {
        let (hit_window_us, spawn_lead_us) = match version {
            RuleVersion::V1 => (180_000, 2_500_000),
            RuleVersion::V2 => (160_000, 2_800_000),
        };
        Self {
            version,
            hit_window_us,
            perfect_window_us: 60_000,
            great_window_us: 120_000,
            spawn_lead_us,
            start_delay_us: 350_000,
            miss_limit: 100,
            revenge_enabled: true,
            revenge_threshold: 30,
            revenge_duration_us: 8_000_000,
            revenge_multiplier: 2,
            health_recovery: 0.01,
            shake_threshold: 1.8,
            shake_debounce_us: 500_000,
            completion_grace_us: 1_000_000,
            motion_queue_capacity: 64,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            0 <= self.perfect_window_us
                && self.perfect_window_us <= self.great_window_us
                && self.great_window_us <= self.hit_window_us,
            "judge windows must satisfy 0 <= perfect <= great <= hit (got {}/{}/{})",
            self.perfect_window_us,
            self.great_window_us,
            self.hit_window_us
        );
        ensure!(self.spawn_lead_us > 0, "spawn lead must be positive");
        ensure!(self.start_delay_us >= 0, "start delay must not be negative");
        ensure!(self.miss_limit > 0, "miss limit must be positive");
        ensure!(
            self.revenge_duration_us > 0,
            "revenge duration must be positive"
        );
        ensure!(
            self.revenge_multiplier >= 1,
            "revenge multiplier must be at least 1"
        );
        ensure!(
            (0.0..=1.0).contains(&self.health_recovery),
            "health recovery must be in [0, 1]"
        );
        ensure!(
            self.shake_threshold.is_finite() && self.shake_threshold > 0.0,
            "shake threshold must be positive"
        );
        ensure!(self.shake_debounce_us >= 0, "shake debounce must not be negative");
        ensure!(
            self.completion_grace_us >= 0,
            "completion grace must not be negative"
        );
        ensure!(
            self.motion_queue_capacity > 0,
            "motion queue capacity must be positive"
        );
        Ok(())
    }

    pub fn judge_windows(&self) -> JudgeWindows {
        JudgeWindows {
            perfect_us: self.perfect_window_us,
            great_us: self.great_window_us,
            hit_us: self.hit_window_us,
        }
    }

    pub fn score_rule(&self) -> ScoreRule {
        ScoreRule {
            miss_limit: self.miss_limit,
            health_recovery: self.health_recovery,
            revenge_enabled: self.revenge_enabled,
            revenge_threshold: self.revenge_threshold,
            revenge_duration_us: self.revenge_duration_us,
            revenge_multiplier: self.revenge_multiplier,
        }
    }

    /// Read and validate a rule config from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: RuleConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the rule config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = RuleConfig::default();
        assert_eq!(c.version, RuleVersion::V2);
        assert_eq!(c.hit_window_us, 160_000);
        assert_eq!(c.spawn_lead_us, 2_800_000);
        assert_eq!(c.perfect_window_us, 60_000);
        assert_eq!(c.great_window_us, 120_000);
        assert_eq!(c.start_delay_us, 350_000);
        assert_eq!(c.miss_limit, 100);
        assert_eq!(c.revenge_threshold, 30);
        assert_eq!(c.revenge_duration_us, 8_000_000);
        assert_eq!(c.revenge_multiplier, 2);
        assert!((c.shake_threshold - 1.8).abs() < f64::EPSILON);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_legacy_preset() {
        let c = RuleConfig::for_version(RuleVersion::V1);
        assert_eq!(c.hit_window_us, 180_000);
        assert_eq!(c.spawn_lead_us, 2_500_000);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unordered_windows() {
        let c = RuleConfig {
            great_window_us: 200_000,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let c = RuleConfig {
            miss_limit: 0,
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = RuleConfig {
            motion_queue_capacity: 0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let c: RuleConfig =
            serde_json::from_str(r#"{"revengeEnabled": false, "missLimit": 10}"#).unwrap();
        assert!(!c.revenge_enabled);
        assert_eq!(c.miss_limit, 10);
        assert_eq!(c.hit_window_us, 160_000);
    }

    #[test]
    fn test_read_write_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rule.json");
        let c = RuleConfig {
            revenge_threshold: 20,
            ..RuleConfig::for_version(RuleVersion::V1)
        };
        c.write(&path).unwrap();
        let loaded = RuleConfig::read(&path).unwrap();
        assert_eq!(loaded, c);
    }

    #[test]
    fn test_read_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rule.json");
        std::fs::write(&path, r#"{"perfectWindowUs": 500000}"#).unwrap();
        assert!(RuleConfig::read(&path).is_err());
        assert!(RuleConfig::read(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_derived_rules() {
        let c = RuleConfig::default();
        let w = c.judge_windows();
        assert_eq!((w.perfect_us, w.great_us, w.hit_us), (60_000, 120_000, 160_000));
        let r = c.score_rule();
        assert_eq!(r.miss_limit, 100);
        assert!(r.revenge_enabled);
    }
}
