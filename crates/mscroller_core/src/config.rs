use serde::{Deserialize, Serialize};

/// Lowest speed setting in every profile.
pub const MIN_SPEED: u32 = 1;

/// The two supported speed/feature profiles. Neither is canonical; a host
/// picks one and keeps it for the lifetime of its stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedProfile {
    /// Speeds 1..=50 on a polynomial curve, with reading history.
    #[default]
    Standard,
    /// Speeds 1..=20 on an exponential curve, no reading history.
    Compact,
}

impl SpeedProfile {
    pub fn max_speed(self) -> u32 {
        match self {
            SpeedProfile::Standard => 50,
            SpeedProfile::Compact => 20,
        }
    }

    pub fn default_speed(self) -> u32 {
        match self {
            SpeedProfile::Standard => 5,
            SpeedProfile::Compact => 3,
        }
    }

    pub fn tracks_history(self) -> bool {
        matches!(self, SpeedProfile::Standard)
    }

    pub fn clamp_speed(self, speed: i64) -> u32 {
        speed.clamp(i64::from(MIN_SPEED), i64::from(self.max_speed())) as u32
    }

    /// Scroll velocity in pixels per second for a speed setting.
    ///
    /// Out-of-range speeds are clamped first, so the curve is strictly
    /// increasing across the valid range and flat outside it.
    pub fn velocity(self, speed: u32) -> f64 {
        let s = f64::from(self.clamp_speed(i64::from(speed)));
        match self {
            // 1 -> 72 px/s, 25 -> 800 px/s, 50 -> ~1757 px/s
            SpeedProfile::Standard => 50.0 + s * 20.0 + s.powf(1.5) * 2.0,
            // 1 -> 40 px/s, 20 -> ~1278 px/s
            SpeedProfile::Compact => 40.0 * 1.2_f64.powf(s - 1.0),
        }
    }
}

/// Tunables for one page agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub profile: SpeedProfile,
    /// Distance from the end of content that counts as "at the bottom".
    pub bottom_tolerance_px: f64,
    pub toast_duration_ms: u64,
    /// Ticks shown before scrolling resumes on a continued chapter.
    pub continue_countdown_secs: u32,
    pub history_cap: usize,
    /// Upper bound on the time credited to a single frame.
    pub max_frame_gap_ms: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            profile: SpeedProfile::default(),
            bottom_tolerance_px: 50.0,
            toast_duration_ms: 3_000,
            continue_countdown_secs: 2,
            history_cap: 100,
            max_frame_gap_ms: 250.0,
        }
    }
}

impl AgentConfig {
    pub fn with_profile(profile: SpeedProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILES: [SpeedProfile; 2] = [SpeedProfile::Standard, SpeedProfile::Compact];

    #[test]
    fn velocity_is_strictly_increasing_over_the_range() {
        for profile in PROFILES {
            let mut previous = profile.velocity(MIN_SPEED);
            assert!(previous > 0.0);
            for speed in MIN_SPEED + 1..=profile.max_speed() {
                let current = profile.velocity(speed);
                assert!(current > previous, "{profile:?} speed {speed}");
                previous = current;
            }
        }
    }

    #[test]
    fn top_speed_cannot_skip_a_tolerance_window_at_60hz() {
        let config = AgentConfig::default();
        for profile in PROFILES {
            let per_frame = profile.velocity(profile.max_speed()) / 60.0;
            assert!(per_frame < config.bottom_tolerance_px, "{profile:?}");
        }
    }

    #[test]
    fn clamp_speed_respects_profile_bounds() {
        assert_eq!(SpeedProfile::Standard.clamp_speed(51), 50);
        assert_eq!(SpeedProfile::Compact.clamp_speed(51), 20);
        assert_eq!(SpeedProfile::Compact.clamp_speed(-4), 1);
        assert_eq!(SpeedProfile::Standard.clamp_speed(0), 1);
    }

    #[test]
    fn standard_baseline_matches_documented_figures() {
        assert_eq!(SpeedProfile::Standard.velocity(1), 72.0);
        assert_eq!(SpeedProfile::Compact.velocity(1), 40.0);
    }
}
