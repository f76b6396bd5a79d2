//! TLV types for SML

use sml_core::{SmlError, SmlResult, Value};

/// Length continuation flag of a type/length byte
pub const CONTINUATION: u8 = 0x80;
/// Type bits of a type/length byte
pub const TYPE_MASK: u8 = 0x70;
/// Length nibble of a type/length byte
pub const LENGTH_MASK: u8 = 0x0F;

/// The single byte closing a message
pub const END_OF_MESSAGE: u8 = 0x00;
/// The single byte standing for an absent optional element
pub const OPTIONAL: u8 = 0x01;
/// TL byte of a six-element list, which opens every message
pub const MESSAGE_START: u8 = 0x76;

/// Type tag stored in bits 6-4 of a type/length byte
///
/// Tags 1, 2 and 3 are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlvType {
    /// Octet string
    Binary = 0,
    Boolean = 4,
    Integer = 5,
    Unsigned = 6,
    List = 7,
}

impl TlvType {
    /// Get the type from a type/length byte
    pub fn from_tl_byte(byte: u8) -> SmlResult<Self> {
        match (byte & TYPE_MASK) >> 4 {
            0 => Ok(TlvType::Binary),
            4 => Ok(TlvType::Boolean),
            5 => Ok(TlvType::Integer),
            6 => Ok(TlvType::Unsigned),
            7 => Ok(TlvType::List),
            reserved => Err(SmlError::Tlv(format!(
                "Reserved type tag {} in TL byte 0x{:02X}",
                reserved, byte
            ))),
        }
    }

    /// Type bits already shifted into position
    pub fn to_bits(self) -> u8 {
        (self as u8) << 4
    }

    /// Whether the length field counts elements rather than bytes
    pub fn counts_elements(self) -> bool {
        matches!(self, TlvType::List)
    }
}

/// A decoded TLV event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    EndOfMessage,
    Optional,
    Binary(Vec<u8>),
    Boolean(bool),
    Integer { value: i64, width: u8 },
    Unsigned { value: u64, width: u8 },
    /// Start of a list with the given number of elements
    ///
    /// An empty list is complete on its own.
    List(usize),
}

impl Token {
    /// Convert a primitive token into its value
    ///
    /// Returns `None` for list starts, which the tree decoder handles.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Token::EndOfMessage => Some(Value::EndOfMessage),
            Token::Optional => Some(Value::Optional),
            Token::Binary(bytes) => Some(Value::Binary(bytes)),
            Token::Boolean(b) => Some(Value::Boolean(b)),
            Token::Integer { value, width } => Some(Value::Integer { value, width }),
            Token::Unsigned { value, width } => Some(Value::Unsigned { value, width }),
            Token::List(_) => None,
        }
    }
}

/// Number of TL bytes needed for a length field
///
/// For byte-counted types the length includes the TL bytes themselves, for
/// lists it is the element count.
pub fn tl_byte_count(tag: TlvType, payload: usize) -> usize {
    let mut count = 1;
    loop {
        let length = if tag.counts_elements() { payload } else { payload + count };
        let capacity = 4 * count as u32;
        if capacity >= usize::BITS || length >> capacity == 0 {
            return count;
        }
        count += 1;
    }
}
