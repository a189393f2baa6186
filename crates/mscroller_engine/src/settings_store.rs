use std::sync::Arc;

use mscroller_core::{Settings, SettingsChange, SpeedProfile};
use serde_json::{json, Map, Value};

use crate::store::{set_one, KeyValueStore, StoreChange, StoreError, SubscriptionId};

pub const SPEED_KEY: &str = "speed";
pub const AUTO_NEXT_KEY: &str = "autoNext";
pub const NEXT_DELAY_KEY: &str = "nextDelay";

/// Typed view over the synchronized settings store.
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
    profile: SpeedProfile,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>, profile: SpeedProfile) -> Self {
        Self { store, profile }
    }

    pub fn profile(&self) -> SpeedProfile {
        self.profile
    }

    /// Reads all settings; missing or mistyped keys take the profile defaults.
    pub fn load(&self) -> Result<Settings, StoreError> {
        let defaults = Settings::defaults_for(self.profile);
        let speed = self
            .store
            .get(SPEED_KEY)?
            .as_ref()
            .and_then(as_u32)
            .unwrap_or(defaults.speed);
        let auto_next = self
            .store
            .get(AUTO_NEXT_KEY)?
            .as_ref()
            .and_then(Value::as_bool)
            .unwrap_or(defaults.auto_next);
        let next_delay = self
            .store
            .get(NEXT_DELAY_KEY)?
            .as_ref()
            .and_then(as_u32)
            .unwrap_or(defaults.next_delay);
        Ok(Settings {
            speed,
            auto_next,
            next_delay,
        }
        .clamped(self.profile))
    }

    /// Writes `speed` after pulling it into range. Returns what was written.
    pub fn save_speed(&self, speed: i64) -> Result<u32, StoreError> {
        let speed = self.profile.clamp_speed(speed);
        set_one(self.store.as_ref(), SPEED_KEY, json!(speed))?;
        Ok(speed)
    }

    pub fn save_auto_next(&self, auto_next: bool) -> Result<(), StoreError> {
        set_one(self.store.as_ref(), AUTO_NEXT_KEY, json!(auto_next))
    }

    pub fn save_next_delay(&self, seconds: u32) -> Result<(), StoreError> {
        set_one(self.store.as_ref(), NEXT_DELAY_KEY, json!(seconds))
    }

    pub fn save(&self, settings: Settings) -> Result<(), StoreError> {
        let settings = settings.clamped(self.profile);
        let mut entries = Map::new();
        entries.insert(SPEED_KEY.into(), json!(settings.speed));
        entries.insert(AUTO_NEXT_KEY.into(), json!(settings.auto_next));
        entries.insert(NEXT_DELAY_KEY.into(), json!(settings.next_delay));
        self.store.set(entries)
    }

    /// Forwards every non-empty settings change to `on_change`.
    pub fn subscribe<F>(&self, on_change: F) -> Result<SubscriptionId, StoreError>
    where
        F: Fn(SettingsChange) + Send + Sync + 'static,
    {
        self.store.subscribe(Box::new(move |changes| {
            let change = settings_change(changes);
            if !change.is_empty() {
                on_change(change);
            }
        }))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.store.unsubscribe(id);
    }
}

/// Extracts the settings keys from a batch of store changes.
pub fn settings_change(changes: &[StoreChange]) -> SettingsChange {
    let mut change = SettingsChange::default();
    for StoreChange { key, new_value, .. } in changes {
        match key.as_str() {
            SPEED_KEY => change.speed = as_u32(new_value),
            AUTO_NEXT_KEY => change.auto_next = new_value.as_bool(),
            NEXT_DELAY_KEY => change.next_delay = as_u32(new_value),
            _ => {}
        }
    }
    change
}

fn as_u32(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
        .map(|n| n.min(u64::from(u32::MAX)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Mutex;

    fn settings_store(profile: SpeedProfile) -> (MemoryStore, SettingsStore) {
        let backing = MemoryStore::new();
        let store = SettingsStore::new(Arc::new(backing.clone()), profile);
        (backing, store)
    }

    #[test]
    fn empty_store_yields_profile_defaults() {
        let (_, store) = settings_store(SpeedProfile::Compact);
        assert_eq!(store.load().unwrap(), Settings::defaults_for(SpeedProfile::Compact));
    }

    #[test]
    fn stored_speed_is_clamped_on_read_and_write() {
        let (backing, store) = settings_store(SpeedProfile::Standard);
        set_one(&backing, SPEED_KEY, json!(80)).unwrap();
        assert_eq!(store.load().unwrap().speed, 50);

        assert_eq!(store.save_speed(0).unwrap(), 1);
        assert_eq!(backing.get(SPEED_KEY).unwrap(), Some(json!(1)));
    }

    #[test]
    fn mistyped_values_fall_back() {
        let (backing, store) = settings_store(SpeedProfile::Standard);
        set_one(&backing, AUTO_NEXT_KEY, json!("yes")).unwrap();
        set_one(&backing, NEXT_DELAY_KEY, json!(4)).unwrap();
        let settings = store.load().unwrap();
        assert!(settings.auto_next);
        assert_eq!(settings.next_delay, 4);
    }

    #[test]
    fn subscription_delivers_typed_changes() {
        let (backing, store) = settings_store(SpeedProfile::Standard);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |change| sink.lock().unwrap().push(change)).unwrap();

        store.save_speed(9).unwrap();
        set_one(&backing, "unrelated", json!(true)).unwrap();
        store.save_auto_next(false).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                SettingsChange {
                    speed: Some(9),
                    ..Default::default()
                },
                SettingsChange {
                    auto_next: Some(false),
                    ..Default::default()
                },
            ]
        );
    }
}
