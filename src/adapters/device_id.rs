//! Device identity.
//!
//! The configured `device_id` is what the coordination server knows the
//! unit by. Units flashed without one fall back to an ID derived from the
//! factory MAC, `guardian-XXYYZZ` (last 3 bytes, uppercase hex), which is
//! stable across reboots.

use core::fmt::Write;

use crate::config::DeviceIdString;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Derive `guardian-XXYYZZ` from the last 3 MAC bytes.
pub fn derived_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    let _ = write!(id, "guardian-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}

/// The configured ID, or the MAC-derived one when none is configured.
pub fn resolve(configured: &str, mac: &MacAddress) -> DeviceIdString {
    if configured.trim().is_empty() {
        derived_id(mac)
    } else {
        crate::config::bounded(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_id_format() {
        let mac = [0x00, 0x11, 0x22, 0xAA, 0xBB, 0xCC];
        assert_eq!(derived_id(&mac).as_str(), "guardian-AABBCC");
    }

    #[test]
    fn configured_id_wins() {
        let mac = read_mac();
        assert_eq!(resolve("esp32_smart_guardian", &mac).as_str(), "esp32_smart_guardian");
    }

    #[test]
    fn blank_id_falls_back_to_mac() {
        let mac = read_mac();
        assert_eq!(resolve("  ", &mac).as_str(), "guardian-EFCAFE");
    }
}
