//! Organizer runtime settings.
//!
//! # Invariants
//! - `search_debounce_ms` is at least 1 after normalization.
//! - `log_level` is one of trace|debug|info|warn|error after normalization.

use crate::logging::default_log_level;
use crate::search::DEFAULT_DEBOUNCE_MS;
use serde::{Deserialize, Serialize};

/// Settings that shape organizer behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerConfig {
    /// Quiet period before a typed search query is dispatched.
    pub search_debounce_ms: u64,
    /// Whether a selected folder also scopes in its descendant folders.
    pub include_subfolders: bool,
    /// Whether archived notes appear in note lists.
    pub show_archived: bool,
    pub log_level: String,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: DEFAULT_DEBOUNCE_MS,
            include_subfolders: false,
            show_archived: false,
            log_level: default_log_level().to_string(),
        }
    }
}

impl OrganizerConfig {
    /// Clamps out-of-range values back to usable ones.
    pub fn normalized(mut self) -> Self {
        if self.search_debounce_ms == 0 {
            self.search_debounce_ms = 1;
        }
        self.log_level = crate::logging::normalize_level(&self.log_level)
            .unwrap_or_else(|_| default_log_level())
            .to_string();
        self
    }
}
