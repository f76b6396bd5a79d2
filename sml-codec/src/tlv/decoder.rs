//! Tokenizer and tree decoder driven together

use crate::crc16;
use crate::tlv::tokenizer::Tokenizer;
use crate::tlv::tree::TreeDecoder;
use crate::tlv::types::{END_OF_MESSAGE, MESSAGE_START};
use sml_core::{SmlResult, Value};

/// A completed top-level value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub value: Value,
    /// Finalized CRC over the bytes of the value up to its body element, if
    /// the value had one
    pub body_crc: Option<u16>,
}

/// Byte stream to value tree decoder
///
/// The running CRC restarts at the first byte of every top-level value.
///
/// After an error the rest of the broken message is skipped. Decoding
/// resumes at the first message header (`0x76`) that directly follows an
/// end-of-message byte. A header lookalike inside the skipped bytes restarts
/// decoding early; the false start then fails on its own and skipping
/// begins again.
#[derive(Debug, Default)]
pub struct TlvDecoder {
    tokenizer: Tokenizer,
    tree: TreeDecoder,
    /// Previous byte while skipping to the next message
    skipping: Option<u8>,
}

impl TlvDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with a custom list nesting limit
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            tree: TreeDecoder::with_max_depth(max_depth),
            skipping: None,
        }
    }

    /// Consume one byte
    ///
    /// Any error leaves the decoder skipping to the next message.
    pub fn put(&mut self, byte: u8) -> SmlResult<Option<Decoded>> {
        if let Some(previous) = self.skipping {
            if previous != END_OF_MESSAGE || byte != MESSAGE_START {
                self.skipping = Some(byte);
                return Ok(None);
            }
            log::debug!("resynchronized on message header");
            self.skipping = None;
        }

        if self.is_idle() {
            self.tokenizer.reset_crc();
        }

        let token = match self.tokenizer.put(byte) {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.abort(byte);
                return Err(e);
            }
        };

        log::trace!("token {:?} at depth {}", token, self.tree.depth());
        match self.tree.put(token, self.tokenizer.crc()) {
            Ok(Some(value)) => Ok(Some(Decoded {
                value,
                body_crc: self.tree.crc_mark().map(crc16::finalize),
            })),
            Ok(None) => Ok(None),
            Err(e) => {
                self.abort(byte);
                Err(e)
            }
        }
    }

    /// Decode a complete buffer
    ///
    /// The input must end on a value boundary.
    pub fn read<I: IntoIterator<Item = u8>>(&mut self, bytes: I) -> SmlResult<Vec<Decoded>> {
        let mut values = Vec::new();
        for byte in bytes {
            if let Some(decoded) = self.put(byte)? {
                values.push(decoded);
            }
        }
        self.finish()?;
        Ok(values)
    }

    /// Signal end of input
    pub fn finish(&mut self) -> SmlResult<()> {
        let result = self.tree.finish();
        if !self.tokenizer.is_idle() {
            self.reset();
            return Err(sml_core::SmlError::TreeShape(
                "Input ended inside a primitive".to_string(),
            ));
        }
        result
    }

    fn abort(&mut self, byte: u8) {
        self.tokenizer.reset();
        self.tree.reset();
        self.skipping = Some(byte);
    }

    /// Whether the decoder sits between two top-level values
    pub fn is_idle(&self) -> bool {
        self.tokenizer.is_idle() && self.tree.is_idle()
    }

    /// Whether the decoder is skipping the rest of a broken message
    pub fn is_skipping(&self) -> bool {
        self.skipping.is_some()
    }

    /// Return to the initial state without releasing buffers
    pub fn reset(&mut self) {
        self.tokenizer.reset();
        self.tree.reset();
        self.skipping = None;
    }
}

/// Decode all top-level values of a buffer
pub fn decode(bytes: &[u8]) -> SmlResult<Vec<Value>> {
    Ok(TlvDecoder::new()
        .read(bytes.iter().copied())?
        .into_iter()
        .map(|d| d.value)
        .collect())
}
