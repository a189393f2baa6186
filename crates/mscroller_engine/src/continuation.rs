use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use agent_logging::agent_debug;

/// Storage scoped to one tab that survives navigations within it, like a
/// page's session storage.
pub trait PageSessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

#[derive(Clone, Default)]
pub struct MemorySessionStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageSessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Ok(mut items) = self.items.lock() {
            items.insert(key.to_string(), value.to_string());
        }
    }

    fn remove_item(&self, key: &str) {
        if let Ok(mut items) = self.items.lock() {
            items.remove(key);
        }
    }
}

pub const CONTINUE_KEY: &str = "mscroller_continue";
const CONTINUE_VALUE: &str = "1";

/// Single-shot "keep scrolling on the next page" flag.
pub struct ContinuationToken;

impl ContinuationToken {
    pub fn write(storage: &dyn PageSessionStorage) {
        storage.set_item(CONTINUE_KEY, CONTINUE_VALUE);
    }

    /// Reads and clears the flag. True at most once per `write`.
    pub fn consume(storage: &dyn PageSessionStorage) -> bool {
        match storage.get_item(CONTINUE_KEY) {
            Some(value) => {
                storage.remove_item(CONTINUE_KEY);
                agent_debug!("continuation token consumed");
                value == CONTINUE_VALUE
            }
            None => false,
        }
    }
}
