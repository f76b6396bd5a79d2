//! SML tokenizer
//!
//! Consumes bytes one at a time and emits a [`Token`] whenever a primitive or
//! a list header is complete. A running CRC16 is threaded over every
//! consumed byte.

use crate::crc16;
use crate::tlv::types::{CONTINUATION, END_OF_MESSAGE, LENGTH_MASK, OPTIONAL, TYPE_MASK, TlvType, Token};
use sml_core::{SmlError, SmlResult};

/// Upper bound for a decoded length, guards against garbage continuation runs
pub const MAX_LENGTH: usize = 0x00FF_FFFF;

#[derive(Debug)]
enum State {
    /// Waiting for a type/length byte
    Header,
    /// Reading continuation bytes of the length field
    Length {
        tag: TlvType,
        length: usize,
        tl_bytes: usize,
    },
    /// Reading payload bytes
    Payload {
        tag: TlvType,
        remaining: usize,
        buffer: Vec<u8>,
    },
}

/// Byte stream to TLV token decoder
#[derive(Debug)]
pub struct Tokenizer {
    state: State,
    crc: u16,
}

impl Tokenizer {
    /// Create a new tokenizer
    pub fn new() -> Self {
        Self {
            state: State::Header,
            crc: crc16::init(),
        }
    }

    /// Consume one byte
    ///
    /// On error the tokenizer is back in its initial state.
    pub fn put(&mut self, byte: u8) -> SmlResult<Option<Token>> {
        self.crc = crc16::update(self.crc, byte);
        let result = self.step(byte);
        if result.is_err() {
            self.state = State::Header;
        }
        result
    }

    /// Consume a sequence of bytes, collecting all tokens
    pub fn read<I: IntoIterator<Item = u8>>(&mut self, bytes: I) -> SmlResult<Vec<Token>> {
        let mut tokens = Vec::new();
        for byte in bytes {
            if let Some(token) = self.put(byte)? {
                tokens.push(token);
            }
        }
        Ok(tokens)
    }

    fn step(&mut self, byte: u8) -> SmlResult<Option<Token>> {
        match std::mem::replace(&mut self.state, State::Header) {
            State::Header => match byte {
                END_OF_MESSAGE => Ok(Some(Token::EndOfMessage)),
                OPTIONAL => Ok(Some(Token::Optional)),
                _ => {
                    let tag = TlvType::from_tl_byte(byte)?;
                    let length = usize::from(byte & LENGTH_MASK);
                    if byte & CONTINUATION != 0 {
                        self.state = State::Length {
                            tag,
                            length,
                            tl_bytes: 1,
                        };
                        Ok(None)
                    } else {
                        self.header_complete(tag, length, 1)
                    }
                }
            },
            State::Length {
                tag,
                length,
                tl_bytes,
            } => {
                if byte & TYPE_MASK != 0 {
                    return Err(SmlError::Tlv(format!(
                        "Length continuation byte 0x{:02X} carries type bits",
                        byte
                    )));
                }
                let length = length * 16 + usize::from(byte & LENGTH_MASK);
                if length > MAX_LENGTH {
                    return Err(SmlError::Tlv(format!("Length {} exceeds limit", length)));
                }
                if byte & CONTINUATION != 0 {
                    self.state = State::Length {
                        tag,
                        length,
                        tl_bytes: tl_bytes + 1,
                    };
                    Ok(None)
                } else {
                    self.header_complete(tag, length, tl_bytes + 1)
                }
            }
            State::Payload {
                tag,
                remaining,
                mut buffer,
            } => {
                buffer.push(byte);
                if remaining > 1 {
                    self.state = State::Payload {
                        tag,
                        remaining: remaining - 1,
                        buffer,
                    };
                    Ok(None)
                } else {
                    Self::primitive(tag, buffer).map(Some)
                }
            }
        }
    }

    fn header_complete(&mut self, tag: TlvType, length: usize, tl_bytes: usize) -> SmlResult<Option<Token>> {
        if tag == TlvType::List {
            return Ok(Some(Token::List(length)));
        }

        let payload = length.checked_sub(tl_bytes).ok_or_else(|| {
            SmlError::Tlv(format!(
                "Length {} is shorter than its {} TL bytes",
                length, tl_bytes
            ))
        })?;

        match tag {
            TlvType::Boolean if payload != 1 => {
                return Err(SmlError::Tlv(format!("Boolean with {} payload bytes", payload)));
            }
            TlvType::Integer | TlvType::Unsigned if payload == 0 || payload > 8 => {
                return Err(SmlError::Tlv(format!(
                    "{:?} with {} payload bytes",
                    tag, payload
                )));
            }
            _ => {}
        }

        if payload == 0 {
            return Ok(Some(Token::Binary(Vec::new())));
        }

        self.state = State::Payload {
            tag,
            remaining: payload,
            buffer: Vec::with_capacity(payload),
        };
        Ok(None)
    }

    fn primitive(tag: TlvType, buffer: Vec<u8>) -> SmlResult<Token> {
        let width = buffer.len() as u8;
        match tag {
            TlvType::Binary => Ok(Token::Binary(buffer)),
            TlvType::Boolean => Ok(Token::Boolean(buffer[0] != 0x00)),
            TlvType::Integer => {
                let seed: i64 = if buffer[0] & 0x80 != 0 { -1 } else { 0 };
                let value = buffer.iter().fold(seed, |acc, &b| (acc << 8) | i64::from(b));
                Ok(Token::Integer { value, width })
            }
            TlvType::Unsigned => {
                let value = buffer.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
                Ok(Token::Unsigned { value, width })
            }
            TlvType::List => unreachable!("list headers never carry a payload"),
        }
    }

    /// Current running CRC state (not finalized)
    pub fn crc(&self) -> u16 {
        self.crc
    }

    /// Restart the running CRC
    pub fn reset_crc(&mut self) {
        self.crc = crc16::init();
    }

    /// Whether the tokenizer waits for a type/length byte
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Header)
    }

    /// Return to the initial state
    pub fn reset(&mut self) {
        self.state = State::Header;
        self.crc = crc16::init();
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(bytes: &[u8]) -> SmlResult<Vec<Token>> {
        Tokenizer::new().read(bytes.iter().copied())
    }

    #[test]
    fn test_single_byte_tokens() {
        assert_eq!(tokens(&[0x00]).unwrap(), vec![Token::EndOfMessage]);
        assert_eq!(tokens(&[0x01]).unwrap(), vec![Token::Optional]);
    }

    #[test]
    fn test_binary() {
        assert_eq!(
            tokens(&[0x04, 0xAA, 0xBB, 0xCC]).unwrap(),
            vec![Token::Binary(vec![0xAA, 0xBB, 0xCC])]
        );
    }

    #[test]
    fn test_binary_with_continuation() {
        // 15 bytes payload + 2 TL bytes = 17 = 0x11
        let mut bytes = vec![0x81, 0x01];
        bytes.extend(std::iter::repeat_n(0x5A, 15));
        assert_eq!(tokens(&bytes).unwrap(), vec![Token::Binary(vec![0x5A; 15])]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tokens(&[0x42, 0x01]).unwrap(), vec![Token::Boolean(true)]);
        assert_eq!(
            tokens(&[0x52, 0xFE]).unwrap(),
            vec![Token::Integer { value: -2, width: 1 }]
        );
        assert_eq!(
            tokens(&[0x53, 0x80, 0x00]).unwrap(),
            vec![Token::Integer { value: -32768, width: 2 }]
        );
        assert_eq!(
            tokens(&[0x63, 0x12, 0x34]).unwrap(),
            vec![Token::Unsigned { value: 0x1234, width: 2 }]
        );
        assert_eq!(
            tokens(&[0x59, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap(),
            vec![Token::Integer { value: -1, width: 8 }]
        );
    }

    #[test]
    fn test_lists() {
        assert_eq!(tokens(&[0x70]).unwrap(), vec![Token::List(0)]);
        assert_eq!(tokens(&[0x76]).unwrap(), vec![Token::List(6)]);
        assert_eq!(tokens(&[0xF1, 0x02]).unwrap(), vec![Token::List(0x12)]);
    }

    #[test]
    fn test_reserved_tag_is_error() {
        assert!(matches!(tokens(&[0x12]), Err(SmlError::Tlv(_))));
        assert!(matches!(tokens(&[0x34, 0x00]), Err(SmlError::Tlv(_))));
    }

    #[test]
    fn test_empty_integer_is_error() {
        assert!(matches!(tokens(&[0x51]), Err(SmlError::Tlv(_))));
        assert!(matches!(tokens(&[0x61]), Err(SmlError::Tlv(_))));
        assert!(matches!(tokens(&[0x5A]), Err(SmlError::Tlv(_))));
    }

    #[test]
    fn test_reset_after_error() {
        let mut tokenizer = Tokenizer::new();
        assert!(tokenizer.put(0x20).is_err());
        assert!(tokenizer.is_idle());
        assert_eq!(tokenizer.put(0x62).unwrap(), None);
        assert_eq!(tokenizer.put(0x05).unwrap(), Some(Token::Unsigned { value: 5, width: 1 }));
    }

    #[test]
    fn test_running_crc() {
        let bytes = [0x62, 0x05, 0x01];
        let mut tokenizer = Tokenizer::new();
        tokenizer.read(bytes.iter().copied()).unwrap();
        assert_eq!(crc16::finalize(tokenizer.crc()), crc16::checksum(&bytes));
        tokenizer.reset_crc();
        assert_eq!(tokenizer.crc(), crc16::init());
    }
}
