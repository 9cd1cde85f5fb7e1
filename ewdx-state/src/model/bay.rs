//! Charging bay state

use serde::{Deserialize, Serialize};

use super::options::{BayState, BayWarning, ChargingDevice};

/// One charging bay of a network charger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bay {
    /// Firmware update of the docked device running
    pub update_enabled: Option<bool>,
    /// Update progress in percent
    pub update_progress: Option<i64>,
    pub update_error: Option<String>,
    pub warnings: Option<Vec<BayWarning>>,
    pub tx_version: Option<String>,
    pub tx_serial: Option<String>,
    pub charging_device: Option<ChargingDevice>,
    pub sync_error: Option<bool>,
    pub state: Option<BayState>,
    pub identification: Option<bool>,
    /// Minutes until the battery is full
    pub time_to_full: Option<i64>,
    pub battery_health: Option<i64>,
    pub battery_gauge: Option<i64>,
    pub battery_cycles: Option<i64>,
}

impl Bay {
    pub fn has_warning(&self, warning: BayWarning) -> bool {
        self.warnings
            .as_ref()
            .map(|list| list.contains(&warning))
            .unwrap_or(false)
    }
}
