//! Recorder configuration

use dom::{FinderConfig, TEST_ID_ATTRIBUTES};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::listeners::ListenerOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Attributes that name a stable locator, highest priority first
    pub test_id_attributes: Vec<String>,
    pub capture: bool,
    pub passive: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            test_id_attributes: TEST_ID_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
            capture: true,
            passive: true,
        }
    }
}

impl RecorderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn listener_options(&self) -> ListenerOptions {
        ListenerOptions {
            capture: self.capture,
            passive: self.passive,
        }
    }

    /// Selector synthesis prefers the same attributes the shortcut checks
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig {
            preferred_attributes: self.test_id_attributes.clone(),
            ..FinderConfig::default()
        }
    }
}
