use crate::error::{SmlError, SmlResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extended textual format "A-B:C.D.E*F", the "*F" group being optional
static EXTENDED_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3})-(\d{1,3}):(\d{1,3})\.(\d{1,3})\.(\d{1,3})(?:\*(\d{1,3}))?$")
        .expect("static OBIS pattern")
});

/// OBIS (Object Identification System) code for identifying registers and
/// parameters
///
/// OBIS codes are 6-byte identifiers. Equality and ordering follow the byte
/// sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObisCode {
    bytes: [u8; 6],
}

impl ObisCode {
    pub const LENGTH: usize = 6;

    /// Create a new OBIS code from individual bytes
    ///
    /// # Arguments
    ///
    /// * `a` - First byte (A value, medium)
    /// * `b` - Second byte (B value, channel)
    /// * `c` - Third byte (C value, indicator)
    /// * `d` - Fourth byte (D value, mode)
    /// * `e` - Fifth byte (E value, quantities)
    /// * `f` - Sixth byte (F value, storage)
    pub const fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> Self {
        Self {
            bytes: [a, b, c, d, e, f],
        }
    }

    /// The all-zero code, used as the fallback for malformed input
    pub const fn zero() -> Self {
        Self { bytes: [0u8; 6] }
    }

    /// Build an OBIS code from a byte buffer
    ///
    /// A buffer of any length other than 6 yields the all-zero code instead of
    /// an error. Meter data is frequently sloppy here and a zero code is easier
    /// to handle downstream than a dropped message.
    pub fn from_slice(buffer: &[u8]) -> Self {
        match <[u8; 6]>::try_from(buffer) {
            Ok(bytes) => Self { bytes },
            Err(_) => Self::zero(),
        }
    }

    /// Strict variant of [`ObisCode::from_slice`]
    pub fn try_from_slice(buffer: &[u8]) -> SmlResult<Self> {
        <[u8; 6]>::try_from(buffer)
            .map(|bytes| Self { bytes })
            .map_err(|_| {
                SmlError::ValueCoercion(format!(
                    "OBIS code needs {} bytes, got {}",
                    Self::LENGTH,
                    buffer.len()
                ))
            })
    }

    /// Parse an OBIS code from string format
    ///
    /// Supports formats like:
    /// - "1.0.1.8.0.255"
    /// - "1-0:1.8.0*255"
    /// - "1-0:1.8.0" (F defaults to 255)
    pub fn from_string(s: &str) -> SmlResult<Self> {
        if let Ok(code) = Self::parse_dot_format(s) {
            return Ok(code);
        }

        if let Ok(code) = Self::parse_extended_format(s) {
            return Ok(code);
        }

        Err(SmlError::InvalidData(format!("Invalid OBIS code format: {}", s)))
    }

    fn parse_dot_format(s: &str) -> SmlResult<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 6 {
            return Err(SmlError::InvalidData("Expected 6 dot-separated values".to_string()));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = Self::parse_group(part)?;
        }

        Ok(Self { bytes })
    }

    fn parse_extended_format(s: &str) -> SmlResult<Self> {
        let caps = EXTENDED_FORMAT
            .captures(s)
            .ok_or_else(|| SmlError::InvalidData(format!("Not an A-B:C.D.E*F code: {}", s)))?;

        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().enumerate().take(5) {
            *byte = Self::parse_group(&caps[i + 1])?;
        }
        bytes[5] = match caps.get(6) {
            Some(m) => Self::parse_group(m.as_str())?,
            None => 0xFF,
        };

        Ok(Self { bytes })
    }

    fn parse_group(part: &str) -> SmlResult<u8> {
        part.parse::<u8>()
            .map_err(|_| SmlError::InvalidData(format!("Invalid byte value: {}", part)))
    }

    /// Get the OBIS code as a byte array
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.bytes
    }

    /// Get the OBIS code as a copied byte array
    pub fn to_bytes(&self) -> [u8; 6] {
        self.bytes
    }

    /// Lower-case hex rendering, e.g. "8181c78204ff"
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Check for the all-zero code
    pub fn is_zero(&self) -> bool {
        self.bytes == [0u8; 6]
    }

    /// Check whether this code starts with the given prefix
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.bytes.starts_with(prefix)
    }

    /// Get the A value (first byte)
    pub fn a(&self) -> u8 {
        self.bytes[0]
    }

    /// Get the B value (second byte)
    pub fn b(&self) -> u8 {
        self.bytes[1]
    }

    /// Get the C value (third byte)
    pub fn c(&self) -> u8 {
        self.bytes[2]
    }

    /// Get the D value (fourth byte)
    pub fn d(&self) -> u8 {
        self.bytes[3]
    }

    /// Get the E value (fifth byte)
    pub fn e(&self) -> u8 {
        self.bytes[4]
    }

    /// Get the F value (sixth byte)
    pub fn f(&self) -> u8 {
        self.bytes[5]
    }
}

impl From<[u8; 6]> for ObisCode {
    fn from(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }
}

impl fmt::Display for ObisCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}:{}.{}.{}*{}",
            self.bytes[0], self.bytes[1], self.bytes[2],
            self.bytes[3], self.bytes[4], self.bytes[5]
        )
    }
}

/// Well-known OBIS codes
pub mod codes {
    use super::ObisCode;

    /// Server (device) id
    pub const SERVER_ID: ObisCode = ObisCode::new(0x81, 0x81, 0xC7, 0x82, 0x04, 0xFF);
    /// Device class
    pub const DEVICE_CLASS: ObisCode = ObisCode::new(0x81, 0x81, 0xC7, 0x82, 0x02, 0xFF);
    /// Manufacturer (FLAG id)
    pub const MANUFACTURER: ObisCode = ObisCode::new(0x81, 0x81, 0xC7, 0x82, 0x03, 0xFF);
    /// Public key of the meter
    pub const PUBLIC_KEY: ObisCode = ObisCode::new(0x81, 0x81, 0xC7, 0x82, 0x05, 0xFF);
    /// Firmware version
    pub const FIRMWARE_VERSION: ObisCode = ObisCode::new(0x81, 0x81, 0xC7, 0x82, 0x06, 0xFF);
    /// Serial number
    pub const SERIAL_NR: ObisCode = ObisCode::new(0x00, 0x00, 0x60, 0x01, 0x00, 0xFF);
    /// Second serial number
    pub const SERIAL_NR_SECOND: ObisCode = ObisCode::new(0x00, 0x00, 0x60, 0x01, 0xFF, 0xFF);
    /// Software version
    pub const SOFTWARE_VERSION: ObisCode = ObisCode::new(0x01, 0x00, 0x00, 0x02, 0x00, 0xFF);

    /// Positive active energy, total (1.8.0)
    pub const REG_POS_ACT_E: ObisCode = ObisCode::new(0x01, 0x00, 0x01, 0x08, 0x00, 0xFF);
    /// Positive active energy, tariff 1 (1.8.1)
    pub const REG_POS_ACT_E_T1: ObisCode = ObisCode::new(0x01, 0x00, 0x01, 0x08, 0x01, 0xFF);
    /// Positive active energy, tariff 2 (1.8.2)
    pub const REG_POS_ACT_E_T2: ObisCode = ObisCode::new(0x01, 0x00, 0x01, 0x08, 0x02, 0xFF);
    /// Negative active energy, total (2.8.0)
    pub const REG_NEG_ACT_E: ObisCode = ObisCode::new(0x01, 0x00, 0x02, 0x08, 0x00, 0xFF);
    /// Current active power, sum over all phases (16.7.0)
    pub const REG_CUR_POS_ACT_SUM: ObisCode = ObisCode::new(0x01, 0x00, 0x10, 0x07, 0x00, 0xFF);

    /// Prefix of the reserved attention namespace
    pub const ATTENTION_PREFIX: [u8; 4] = [0x81, 0x81, 0xC7, 0xC7];

    /// Codes whose values are identifiers or text rather than numbers
    pub const STRING_TYPED: [ObisCode; 8] = [
        SERVER_ID,
        DEVICE_CLASS,
        MANUFACTURER,
        PUBLIC_KEY,
        FIRMWARE_VERSION,
        SERIAL_NR,
        SERIAL_NR_SECOND,
        SOFTWARE_VERSION,
    ];

    /// Check whether the value of a register is a string/identifier
    pub fn is_string_typed(code: &ObisCode) -> bool {
        STRING_TYPED.contains(code)
    }
}
