use std::sync::Mutex;
use tracing::debug;

/// Path of the destination list view.
pub const DESTINATION_LIST_PATH: &str = "/destination";

/// Router boundary. Fire-and-forget.
pub trait Navigator: Send + Sync {
    fn go_to(&self, path: &str);
}

/// Records visited paths, mainly for testing.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn go_to(&self, path: &str) {
        debug!(path, "navigate");
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(path.to_string());
        }
    }
}
