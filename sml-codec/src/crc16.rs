//! CRC16 as used by SML (CRC-16/X.25)
//!
//! The checksum state is threaded explicitly through the calls; there is no
//! hidden accumulator. A typical computation reads
//!
//! ```rust
//! use sml_codec::crc16;
//!
//! let state = crc16::update_slice(crc16::init(), b"123456789");
//! assert_eq!(crc16::finalize(state), 0x6E90);
//! ```

use once_cell::sync::Lazy;

/// Initial CRC state
pub const INITIAL: u16 = 0xFFFF;
const KEY: u16 = 0x8408; // Bit-reversed 0x1021

/// Precomputed CRC table
static CRC_TABLE: Lazy<[u16; 256]> = Lazy::new(|| {
    let mut table = [0u16; 256];
    for (b, entry) in table.iter_mut().enumerate() {
        let mut v = b as u16;
        for _ in 0..8 {
            if (v & 1) == 1 {
                v = (v >> 1) ^ KEY;
            } else {
                v >>= 1;
            }
        }
        *entry = v;
    }
    table
});

/// Start a new computation
pub fn init() -> u16 {
    INITIAL
}

/// Feed one byte
pub fn update(state: u16, data: u8) -> u16 {
    (state >> 8) ^ CRC_TABLE[((state ^ u16::from(data)) & 0xFF) as usize]
}

/// Feed a slice of bytes
pub fn update_slice(state: u16, data: &[u8]) -> u16 {
    data.iter().fold(state, |crc, &b| update(crc, b))
}

/// Finish the computation
///
/// The X.25 checksum is transmitted low byte first, so the returned value is
/// byte-swapped: writing it big-endian produces the wire order.
pub fn finalize(state: u16) -> u16 {
    (state ^ 0xFFFF).swap_bytes()
}

/// One-shot checksum of a buffer
pub fn checksum(data: &[u8]) -> u16 {
    finalize(update_slice(init(), data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(checksum(b"123456789"), 0x6E90);
    }

    #[test]
    fn test_incremental_equals_one_shot() {
        let data = [0x1B, 0x1B, 0x1B, 0x1B, 0x01, 0x01, 0x01, 0x01, 0x76, 0x05];
        let mut state = init();
        for b in data {
            state = update(state, b);
        }
        assert_eq!(finalize(state), checksum(&data));
    }

    #[test]
    fn test_empty() {
        assert_eq!(checksum(&[]), 0x0000);
    }
}
