//! Navigation seam used when the session layer has to move the user
//! (refresh failure, logout)

use std::sync::{Mutex, PoisonError};

/// Moves the client to another location
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Records navigations instead of performing them
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths navigated to, oldest first
    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        tracing::debug!("Navigate to {}", path);
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

/// Full-page navigation through `window.location`
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

#[cfg(feature = "hydrate")]
impl Navigator for BrowserNavigator {
    fn navigate(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(e) = window.location().set_href(path) {
            tracing::warn!("Navigation to {} failed: {:?}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator_keeps_order() {
        let navigator = RecordingNavigator::new();
        navigator.navigate("/login");
        navigator.navigate("/");

        assert_eq!(navigator.visits(), vec!["/login".to_string(), "/".to_string()]);
    }
}
