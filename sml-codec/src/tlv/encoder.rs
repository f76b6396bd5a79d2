//! SML TLV encoder

use crate::tlv::types::{CONTINUATION, END_OF_MESSAGE, OPTIONAL, TlvType, tl_byte_count};
use bytes::{BufMut, Bytes, BytesMut};
use sml_core::{SmlError, SmlResult, Value};

/// Encoder for SML value trees
pub struct TlvEncoder {
    buffer: BytesMut,
}

impl TlvEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    /// Create a new encoder with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Encode a value tree
    pub fn encode_value(&mut self, value: &Value) -> SmlResult<()> {
        match value {
            Value::EndOfMessage => self.buffer.put_u8(END_OF_MESSAGE),
            Value::Optional => self.buffer.put_u8(OPTIONAL),
            Value::Binary(bytes) => self.encode_binary(bytes),
            Value::Boolean(b) => {
                self.encode_tl(TlvType::Boolean, 1);
                self.buffer.put_u8(if *b { 0x01 } else { 0x00 });
            }
            Value::Integer { value, width } => {
                let width = Self::verify_width(*width)?;
                self.encode_tl(TlvType::Integer, width);
                self.buffer.put_slice(&value.to_be_bytes()[8 - width..]);
            }
            Value::Unsigned { value, width } => {
                let width = Self::verify_width(*width)?;
                self.encode_tl(TlvType::Unsigned, width);
                self.buffer.put_slice(&value.to_be_bytes()[8 - width..]);
            }
            Value::List(items) => {
                self.encode_tl(TlvType::List, items.len());
                for item in items {
                    self.encode_value(item)?;
                }
            }
        }
        Ok(())
    }

    /// Encode an octet string
    ///
    /// The wire format has no distinct empty octet string: an empty buffer is
    /// written as 0x01 and reads back as an absent optional.
    pub fn encode_binary(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            self.buffer.put_u8(OPTIONAL);
        } else {
            self.encode_tl(TlvType::Binary, bytes.len());
            self.buffer.put_slice(bytes);
        }
    }

    /// Encode a type/length field
    ///
    /// `payload` is the number of payload bytes, or the element count of a
    /// list. Lengths above 15 are spread over continuation bytes, most
    /// significant nibble first.
    pub fn encode_tl(&mut self, tag: TlvType, payload: usize) {
        let count = tl_byte_count(tag, payload);
        let length = if tag.counts_elements() { payload } else { payload + count };
        for i in (0..count).rev() {
            let nibble = ((length >> (4 * i)) & 0x0F) as u8;
            let mut byte = nibble;
            if i == count - 1 {
                byte |= tag.to_bits();
            }
            if i > 0 {
                byte |= CONTINUATION;
            }
            self.buffer.put_u8(byte);
        }
    }

    fn verify_width(width: u8) -> SmlResult<usize> {
        if (1..=8).contains(&width) {
            Ok(usize::from(width))
        } else {
            Err(SmlError::InvalidData(format!(
                "Integer width must be 1..=8 bytes, got {}",
                width
            )))
        }
    }

    /// Encode raw bytes
    pub fn encode_bytes(&mut self, bytes: &[u8]) {
        self.buffer.put_slice(bytes);
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Mutable access, used to patch placeholders
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Clear the encoder buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for TlvEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a single value tree
pub fn encode(value: &Value) -> SmlResult<Bytes> {
    let mut encoder = TlvEncoder::new();
    encoder.encode_value(value)?;
    Ok(encoder.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tlv::decoder::decode;

    #[test]
    fn test_encode_primitives() {
        assert_eq!(&encode(&Value::Optional).unwrap()[..], &[0x01]);
        assert_eq!(&encode(&Value::Boolean(true)).unwrap()[..], &[0x42, 0x01]);
        assert_eq!(&encode(&Value::i8(-2)).unwrap()[..], &[0x52, 0xFE]);
        assert_eq!(&encode(&Value::u16(0x1234)).unwrap()[..], &[0x63, 0x12, 0x34]);
        assert_eq!(
            &encode(&Value::binary(vec![0xAA, 0xBB])).unwrap()[..],
            &[0x03, 0xAA, 0xBB]
        );
    }

    #[test]
    fn test_encode_long_binary() {
        let value = Value::binary(vec![0x5A; 15]);
        let bytes = encode(&value).unwrap();
        assert_eq!(&bytes[..2], &[0x81, 0x01]);
        assert_eq!(bytes.len(), 17);
        assert_eq!(decode(&bytes).unwrap(), vec![value]);

        let value = Value::binary(vec![0x11; 300]);
        let bytes = encode(&value).unwrap();
        // 300 + 3 = 0x12F
        assert_eq!(&bytes[..3], &[0x81, 0x82, 0x0F]);
        assert_eq!(decode(&bytes).unwrap(), vec![value]);
    }

    #[test]
    fn test_encode_long_list() {
        let value = Value::list((0..20).map(|i| Value::u8(i as u8)).collect());
        let bytes = encode(&value).unwrap();
        assert_eq!(&bytes[..2], &[0xF1, 0x04]);
        assert_eq!(decode(&bytes).unwrap(), vec![value]);
    }

    #[test]
    fn test_encode_widths() {
        let value = Value::new_integer(-70000, 3).unwrap();
        let bytes = encode(&value).unwrap();
        assert_eq!(bytes.len(), 4);
        assert_eq!(decode(&bytes).unwrap(), vec![value]);

        let bad = Value::Unsigned { value: 1, width: 0 };
        assert!(encode(&bad).is_err());
    }

    #[test]
    fn test_empty_binary_reads_back_as_optional() {
        let bytes = encode(&Value::binary(Vec::new())).unwrap();
        assert_eq!(decode(&bytes).unwrap(), vec![Value::Optional]);
    }
}
