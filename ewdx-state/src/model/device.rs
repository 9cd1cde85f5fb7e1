//! Device-level identity, configuration and network state
//!
//! Every field starts as `None` ("unknown") and is only filled in by a
//! decoded message.

use serde::{Deserialize, Serialize};

use super::options::DantePortMapping;

/// IPv4 settings of one network interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    /// Interface name, e.g. `eth0`
    pub name: Option<String>,
    pub mac: Option<String>,
    /// Active address (DHCP-assigned or manual)
    pub ip: Option<String>,
    pub netmask: Option<String>,
    pub gateway: Option<String>,
    pub manual_ip: Option<String>,
    pub manual_netmask: Option<String>,
    pub manual_gateway: Option<String>,
    pub dhcp: Option<bool>,
}

/// Dante card state; interfaces are decoded positionally from two-slot arrays
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanteInfo {
    pub version: Option<String>,
    pub port_mapping: Option<DantePortMapping>,
    pub primary: NetworkInterface,
    pub secondary: NetworkInterface,
}

impl DanteInfo {
    /// Interface by slot (0 = primary, 1 = secondary)
    pub fn interface(&self, slot: usize) -> Option<&NetworkInterface> {
        match slot {
            0 => Some(&self.primary),
            1 => Some(&self.secondary),
            _ => None,
        }
    }

    pub(crate) fn interface_mut(&mut self, slot: usize) -> Option<&mut NetworkInterface> {
        match slot {
            0 => Some(&mut self.primary),
            1 => Some(&mut self.secondary),
            _ => None,
        }
    }
}

/// Identity and configuration of the device as a whole
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: Option<String>,
    pub location: Option<String>,
    /// Visual identification (display blink) active
    pub identification: Option<bool>,
    pub firmware_version: Option<String>,
    pub serial: Option<String>,

    // Receiver configuration
    pub brightness: Option<i64>,
    pub auto_lock: Option<bool>,
    pub encryption: Option<bool>,
    pub link_density_mode: Option<bool>,
    pub frequency_code: Option<String>,

    // Network
    pub network: NetworkInterface,
    pub mdns: Option<bool>,
    pub dante: DanteInfo,

    // REST-only identity and RF details
    pub hardware_revision: Option<String>,
    pub product: Option<String>,
    pub vendor: Option<String>,
    pub state: Option<String>,
    pub warnings: Option<Vec<String>>,
    /// Raw JSON of the tunable frequency ranges
    pub frequency_ranges: Option<String>,
    pub preset_spacing: Option<String>,

    // Charger
    pub product_label: Option<String>,
    pub storage_mode: Option<bool>,
    pub cascade: Option<Vec<String>>,
    pub has_warnings: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unknown() {
        let info = DeviceInfo::default();
        assert!(info.name.is_none());
        assert!(info.network.dhcp.is_none());
        assert!(info.dante.primary.ip.is_none());
    }

    #[test]
    fn test_dante_interface_slots() {
        let mut dante = DanteInfo::default();
        dante.interface_mut(1).unwrap().ip = Some("10.0.0.2".into());
        assert_eq!(dante.interface(1).unwrap().ip.as_deref(), Some("10.0.0.2"));
        assert!(dante.interface(2).is_none());
        assert!(dante.interface_mut(2).is_none());
    }
}
