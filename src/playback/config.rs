//! Playback Configuration
//!
//! Tunables for the seek engine and playback timing. Defaults match the
//! stock viewer; values can be overridden from JSON.

use serde::{Serialize, Deserialize};

/// Configuration for match playback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Stride between full-state snapshots, in rounds
    pub snapshot_every: u32,
    /// Rounds held back from the end while the match is still streaming
    pub streaming_margin: u32,
    /// Simulation steps per round (or per turn) for time-based playback
    pub max_simulation_steps: u32,
    /// Positions kept in each body's trail
    pub trail_length: usize,
    /// Stat recomputation time that triggers a warning
    pub stat_budget_micros: u64,
    /// Rounds a resource site stays pending before it activates
    pub site_lifetime_rounds: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            snapshot_every: 40,
            streaming_margin: 2,
            max_simulation_steps: 50_000,
            trail_length: 8,
            stat_budget_micros: 1_000,
            site_lifetime_rounds: 50,
        }
    }
}

impl PlaybackConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let config: PlaybackConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Clamp the divisors to at least 1.
    pub fn normalized(mut self) -> Self {
        self.snapshot_every = self.snapshot_every.max(1);
        self.max_simulation_steps = self.max_simulation_steps.max(1);
        self
    }

    /// Whether `round` falls on the snapshot stride.
    #[inline]
    pub fn is_snapshot_round(&self, round: u32) -> bool {
        round >= 1 && (round - 1) % self.snapshot_every == 0
    }

    /// Index of the snapshot covering `round`.
    #[inline]
    pub fn snapshot_index(&self, round: u32) -> usize {
        (round.saturating_sub(1) / self.snapshot_every) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlaybackConfig::default();
        assert_eq!(config.snapshot_every, 40);
        assert_eq!(config.streaming_margin, 2);
        assert_eq!(config.trail_length, 8);
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = PlaybackConfig::from_json_str(r#"{ "snapshot_every": 10 }"#).unwrap();
        assert_eq!(config.snapshot_every, 10);
        assert_eq!(config.streaming_margin, 2);

        let zero = PlaybackConfig::from_json_str(r#"{ "snapshot_every": 0 }"#).unwrap();
        assert_eq!(zero.snapshot_every, 1);
    }

    #[test]
    fn test_normalized_clamps_divisors() {
        let raw: PlaybackConfig = serde_json::from_str(r#"{ "snapshot_every": 0, "max_simulation_steps": 0 }"#).unwrap();
        assert_eq!(raw.snapshot_every, 0);

        let config = raw.normalized();
        assert_eq!(config.snapshot_every, 1);
        assert_eq!(config.max_simulation_steps, 1);
        assert_eq!(config.snapshot_index(3), 2);
        assert!(config.is_snapshot_round(3));
    }

    #[test]
    fn test_snapshot_stride() {
        let config = PlaybackConfig::default();
        assert!(config.is_snapshot_round(1));
        assert!(config.is_snapshot_round(41));
        assert!(!config.is_snapshot_round(40));
        assert!(!config.is_snapshot_round(0));
        assert_eq!(config.snapshot_index(1), 0);
        assert_eq!(config.snapshot_index(40), 0);
        assert_eq!(config.snapshot_index(41), 1);
        assert_eq!(config.snapshot_index(0), 0);
    }
}
