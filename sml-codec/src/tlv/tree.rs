//! Assembly of value trees from TLV tokens
//!
//! Tokens arrive one at a time, possibly across several calls, so the open
//! lists are kept on an explicit stack instead of being built by recursion.

use crate::tlv::types::Token;
use sml_core::{SmlError, SmlResult, Value};

/// Default maximum list nesting
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Index of the message body in a top-level message list. The CRC of a
/// message covers everything up to and including this element.
const BODY_INDEX: usize = 3;

#[derive(Debug)]
struct Frame {
    remaining: usize,
    children: Vec<Value>,
}

/// Builds [`Value`] trees from a token stream
#[derive(Debug)]
pub struct TreeDecoder {
    stack: Vec<Frame>,
    max_depth: usize,
    crc_mark: Option<u16>,
}

impl TreeDecoder {
    /// Create a new tree decoder
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Create a tree decoder with a custom nesting limit
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            stack: Vec::new(),
            max_depth,
            crc_mark: None,
        }
    }

    /// Feed one token
    ///
    /// `crc` is the running CRC state after the last byte of the token. It is
    /// remembered when the body of a top-level list completes.
    ///
    /// Returns a completed top-level value, if any. An end-of-message token
    /// outside of any list (trailing padding) is ignored.
    pub fn put(&mut self, token: Token, crc: u16) -> SmlResult<Option<Value>> {
        let value = match token {
            Token::List(0) => Value::List(Vec::new()),
            Token::List(count) => {
                if self.stack.len() >= self.max_depth {
                    self.reset();
                    return Err(SmlError::TreeShape(format!(
                        "List nesting exceeds {} levels",
                        self.max_depth
                    )));
                }
                if self.stack.is_empty() {
                    self.crc_mark = None;
                }
                self.stack.push(Frame {
                    remaining: count,
                    children: Vec::with_capacity(count.min(64)),
                });
                return Ok(None);
            }
            Token::EndOfMessage if self.stack.is_empty() => return Ok(None),
            primitive => match primitive.into_value() {
                Some(value) => value,
                None => unreachable!("list tokens are handled above"),
            },
        };
        Ok(self.append(value, crc))
    }

    fn append(&mut self, mut value: Value, crc: u16) -> Option<Value> {
        loop {
            let depth = self.stack.len();
            let Some(frame) = self.stack.last_mut() else {
                return Some(value);
            };
            frame.children.push(value);
            frame.remaining -= 1;
            let body_complete = depth == 1 && frame.children.len() == BODY_INDEX + 1;
            let remaining = frame.remaining;
            if body_complete {
                self.crc_mark = Some(crc);
            }
            if remaining > 0 {
                return None;
            }
            let Some(frame) = self.stack.pop() else {
                unreachable!("frame was just inspected");
            };
            value = Value::List(frame.children);
        }
    }

    /// Signal end of input
    ///
    /// Lists that are still open at this point are an error.
    pub fn finish(&mut self) -> SmlResult<()> {
        if let Some(frame) = self.stack.last() {
            let err = SmlError::TreeShape(format!(
                "Input ended inside a list at depth {}, {} elements missing",
                self.stack.len(),
                frame.remaining
            ));
            self.reset();
            return Err(err);
        }
        Ok(())
    }

    /// CRC state recorded after the body of the current top-level list
    pub fn crc_mark(&self) -> Option<u16> {
        self.crc_mark
    }

    /// Number of open lists
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether no list is open
    pub fn is_idle(&self) -> bool {
        self.stack.is_empty()
    }

    /// Drop all open lists
    pub fn reset(&mut self) {
        self.stack.clear();
        self.crc_mark = None;
    }
}

impl Default for TreeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(decoder: &mut TreeDecoder, tokens: Vec<Token>) -> Vec<Value> {
        tokens
            .into_iter()
            .filter_map(|t| decoder.put(t, 0).unwrap())
            .collect()
    }

    #[test]
    fn test_nested_lists() {
        let mut decoder = TreeDecoder::new();
        let values = feed(
            &mut decoder,
            vec![
                Token::List(2),
                Token::Unsigned { value: 1, width: 1 },
                Token::List(2),
                Token::Optional,
                Token::List(0),
            ],
        );
        assert_eq!(
            values,
            vec![Value::list(vec![
                Value::u8(1),
                Value::list(vec![Value::Optional, Value::empty_list()]),
            ])]
        );
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_incomplete_list_is_shape_error() {
        let mut decoder = TreeDecoder::new();
        let values = feed(&mut decoder, vec![Token::List(3), Token::Boolean(true)]);
        assert!(values.is_empty());
        assert_eq!(decoder.depth(), 1);
        assert!(matches!(decoder.finish(), Err(SmlError::TreeShape(_))));
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_trailing_end_of_message_is_ignored() {
        let mut decoder = TreeDecoder::new();
        assert_eq!(decoder.put(Token::EndOfMessage, 0).unwrap(), None);
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_max_depth() {
        let mut decoder = TreeDecoder::with_max_depth(2);
        assert!(decoder.put(Token::List(1), 0).unwrap().is_none());
        assert!(decoder.put(Token::List(1), 0).unwrap().is_none());
        assert!(matches!(decoder.put(Token::List(1), 0), Err(SmlError::TreeShape(_))));
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_crc_mark_after_body() {
        let mut decoder = TreeDecoder::new();
        decoder.put(Token::List(6), 1).unwrap();
        for crc in 2..5 {
            decoder.put(Token::Unsigned { value: 0, width: 1 }, crc).unwrap();
            assert_eq!(decoder.crc_mark(), None);
        }
        decoder.put(Token::List(0), 5).unwrap();
        assert_eq!(decoder.crc_mark(), Some(5));
        decoder.put(Token::Unsigned { value: 0, width: 2 }, 6).unwrap();
        let done = decoder.put(Token::EndOfMessage, 7).unwrap();
        assert!(done.is_some());
        assert_eq!(decoder.crc_mark(), Some(5));
    }
}
