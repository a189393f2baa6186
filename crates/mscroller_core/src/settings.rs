use serde::{Deserialize, Serialize};

use crate::SpeedProfile;

/// User settings shared through the synchronized store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub speed: u32,
    pub auto_next: bool,
    /// Seconds of countdown before moving to the next chapter.
    pub next_delay: u32,
}

impl Settings {
    pub fn defaults_for(profile: SpeedProfile) -> Self {
        Self {
            speed: profile.default_speed(),
            auto_next: true,
            next_delay: 3,
        }
    }

    /// Returns a copy with `speed` pulled into the profile's range.
    pub fn clamped(self, profile: SpeedProfile) -> Self {
        Self {
            speed: profile.clamp_speed(i64::from(self.speed)),
            ..self
        }
    }
}

/// A partial update delivered by the store's change stream. Absent fields
/// were not touched by the write that produced the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsChange {
    pub speed: Option<u32>,
    pub auto_next: Option<bool>,
    pub next_delay: Option<u32>,
}

impl SettingsChange {
    pub fn is_empty(&self) -> bool {
        self.speed.is_none() && self.auto_next.is_none() && self.next_delay.is_none()
    }

    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(speed) = self.speed {
            settings.speed = speed;
        }
        if let Some(auto_next) = self.auto_next {
            settings.auto_next = auto_next;
        }
        if let Some(next_delay) = self.next_delay {
            settings.next_delay = next_delay;
        }
    }
}
