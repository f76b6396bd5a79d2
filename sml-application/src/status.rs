//! Device status word
//!
//! Gateways report their state as a bit field. Some bits are inverted: they
//! are set when a capability is missing, so the setters below take the
//! positive meaning and flip the bit as needed.

use serde::{Deserialize, Serialize};
use sml_core::Value;
use std::fmt;

/// Status word bits
pub mod bits {
    /// Set if NOT authorized by the head end
    pub const NOT_AUTHORIZED: u32 = 1 << 1;
    pub const FATAL_ERROR: u32 = 1 << 2;
    pub const OUT_OF_MEMORY: u32 = 1 << 3;
    /// Service (customer) interface available
    pub const SERVICE_IF_AVAILABLE: u32 = 1 << 4;
    /// Extension interface available
    pub const EXT_IF_AVAILABLE: u32 = 1 << 5;
    pub const WIRELESS_MBUS_IF_AVAILABLE: u32 = 1 << 6;
    pub const PLC_AVAILABLE: u32 = 1 << 7;
    pub const WIRED_MBUS_IF_AVAILABLE: u32 = 1 << 8;
    /// Set if no time base is available
    pub const NO_TIMEBASE: u32 = 1 << 9;
    /// Set if there is no ethernet link
    pub const NO_ETHERNET_LINK: u32 = 1 << 11;
    /// Set if no IP address is assigned
    pub const NO_IP_ADDRESS: u32 = 1 << 12;
    pub const DEVICE_ON: u32 = 1 << 16;
    pub const RESET_BY_WATCHDOG: u32 = 1 << 17;
}

/// Device status word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusWord(u32);

impl StatusWord {
    /// Status of a freshly started device
    pub const INITIAL: u32 = bits::DEVICE_ON | bits::RESET_BY_WATCHDOG | bits::EXT_IF_AVAILABLE;

    pub fn new() -> Self {
        Self(Self::INITIAL)
    }

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    fn set(&mut self, bit: u32, on: bool) {
        if on {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    fn is_set(&self, bit: u32) -> bool {
        self.0 & bit == bit
    }

    pub fn set_authorized(&mut self, authorized: bool) {
        self.set(bits::NOT_AUTHORIZED, !authorized);
    }

    pub fn is_authorized(&self) -> bool {
        !self.is_set(bits::NOT_AUTHORIZED)
    }

    pub fn set_fatal_error(&mut self, on: bool) {
        self.set(bits::FATAL_ERROR, on);
    }

    pub fn is_fatal_error(&self) -> bool {
        self.is_set(bits::FATAL_ERROR)
    }

    pub fn set_out_of_memory(&mut self, on: bool) {
        self.set(bits::OUT_OF_MEMORY, on);
    }

    pub fn is_out_of_memory(&self) -> bool {
        self.is_set(bits::OUT_OF_MEMORY)
    }

    pub fn set_service_if_available(&mut self, on: bool) {
        self.set(bits::SERVICE_IF_AVAILABLE, on);
    }

    pub fn is_service_if_available(&self) -> bool {
        self.is_set(bits::SERVICE_IF_AVAILABLE)
    }

    pub fn set_ext_if_available(&mut self, on: bool) {
        self.set(bits::EXT_IF_AVAILABLE, on);
    }

    pub fn is_ext_if_available(&self) -> bool {
        self.is_set(bits::EXT_IF_AVAILABLE)
    }

    pub fn set_wireless_mbus_if_available(&mut self, on: bool) {
        self.set(bits::WIRELESS_MBUS_IF_AVAILABLE, on);
    }

    pub fn is_wireless_mbus_if_available(&self) -> bool {
        self.is_set(bits::WIRELESS_MBUS_IF_AVAILABLE)
    }

    pub fn set_plc_available(&mut self, on: bool) {
        self.set(bits::PLC_AVAILABLE, on);
    }

    pub fn is_plc_available(&self) -> bool {
        self.is_set(bits::PLC_AVAILABLE)
    }

    pub fn set_wired_mbus_if_available(&mut self, on: bool) {
        self.set(bits::WIRED_MBUS_IF_AVAILABLE, on);
    }

    pub fn is_wired_mbus_if_available(&self) -> bool {
        self.is_set(bits::WIRED_MBUS_IF_AVAILABLE)
    }

    pub fn set_timebase_available(&mut self, available: bool) {
        self.set(bits::NO_TIMEBASE, !available);
    }

    pub fn is_timebase_available(&self) -> bool {
        !self.is_set(bits::NO_TIMEBASE)
    }

    pub fn set_ethernet_link(&mut self, up: bool) {
        self.set(bits::NO_ETHERNET_LINK, !up);
    }

    pub fn has_ethernet_link(&self) -> bool {
        !self.is_set(bits::NO_ETHERNET_LINK)
    }

    pub fn set_ip_address_available(&mut self, available: bool) {
        self.set(bits::NO_IP_ADDRESS, !available);
    }

    pub fn is_ip_address_available(&self) -> bool {
        !self.is_set(bits::NO_IP_ADDRESS)
    }

    pub fn set_device_on(&mut self, on: bool) {
        self.set(bits::DEVICE_ON, on);
    }

    pub fn is_device_on(&self) -> bool {
        self.is_set(bits::DEVICE_ON)
    }

    pub fn set_reset_by_watchdog(&mut self, on: bool) {
        self.set(bits::RESET_BY_WATCHDOG, on);
    }

    pub fn is_reset_by_watchdog(&self) -> bool {
        self.is_set(bits::RESET_BY_WATCHDOG)
    }

    /// Status as transmitted in a list entry
    pub fn to_value(&self) -> Value {
        Value::u32(self.0)
    }
}

impl Default for StatusWord {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u32> for StatusWord {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}
