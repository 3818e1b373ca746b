//! Generator configuration.
//!
//! Tunables for the generation engine. Every field has a default, so an
//! empty JSON object is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::LoadUnit;
use crate::ranking::{ScheduleSort, ViewMode};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Search nodes visited between cancellation checks.
    ///
    /// The search also checks before every top-level section choice.
    pub cancel_check_interval: u64,
    /// Sort key used for new selection states.
    pub default_sort: ScheduleSort,
    /// View mode used for new selection states.
    pub default_view: ViewMode,
    /// Unit given to newly created class-load filters.
    pub default_load_unit: LoadUnit,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            cancel_check_interval: 1024,
            default_sort: ScheduleSort::Default,
            default_view: ViewMode::Detailed,
            default_load_unit: LoadUnit::Meetings,
        }
    }
}

impl GeneratorConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the cancellation check interval.
    pub fn with_cancel_check_interval(mut self, nodes: u64) -> Self {
        self.cancel_check_interval = nodes;
        self
    }

    /// Sets the default sort key.
    pub fn with_default_sort(mut self, sort: ScheduleSort) -> Self {
        self.default_sort = sort;
        self
    }

    /// Sets the default view mode.
    pub fn with_default_view(mut self, view: ViewMode) -> Self {
        self.default_view = view;
        self
    }

    /// Sets the unit for new class-load filters.
    pub fn with_default_load_unit(mut self, unit: LoadUnit) -> Self {
        self.default_load_unit = unit;
        self
    }

    /// Checks that all tunables are in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cancel_check_interval == 0 {
            return Err(ConfigError::Parse {
                message: "cancel_check_interval must be greater than zero".into(),
            });
        }
        Ok(())
    }
}
