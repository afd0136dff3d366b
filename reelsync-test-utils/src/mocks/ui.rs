//! Mocks for the user-facing seams: toasts, message catalog, key-value storage

use reelsync_core::mutation::{MessageCatalog, Notifier};
use reelsync_core::prefs::KvStorage;
use std::collections::HashMap;
use std::sync::Mutex;

/// Notifier that records every toast for assertion
#[derive(Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<(String, Option<String>)>>,
    errors: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> Vec<(String, Option<String>)> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<(String, Option<String>)> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, title: &str, description: Option<&str>) {
        self.successes
            .lock()
            .unwrap()
            .push((title.to_string(), description.map(String::from)));
    }

    fn error(&self, title: &str, description: Option<&str>) {
        self.errors
            .lock()
            .unwrap()
            .push((title.to_string(), description.map(String::from)));
    }
}

/// Catalog backed by a static map; unknown keys echo back
#[derive(Default)]
pub struct StaticCatalog {
    messages: HashMap<&'static str, &'static str>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, message: &'static str) -> Self {
        self.messages.insert(key, message);
        self
    }
}

impl MessageCatalog for StaticCatalog {
    fn t(&self, key: &str) -> String {
        self.messages
            .get(key)
            .map_or_else(|| key.to_string(), |m| m.to_string())
    }
}

/// In-memory key-value storage for preference tests
#[derive(Default)]
pub struct MemoryKv {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStorage for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.values.lock().unwrap().insert(key.to_string(), value);
    }
}
