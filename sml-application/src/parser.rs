//! Streaming SML parser
//!
//! The parser chains the transport decoder, the TLV decoder and message
//! extraction. Bytes go in one at a time; completed messages, errors and
//! warnings come out through a [`MessageHandler`].
//!
//! # Data Flow
//!
//! ```text
//! bytes -> FrameDecoder -> payload -> TlvDecoder -> Value -> Message
//!                 |                                             |
//!                 +-- trailer ----------------------+           |
//!                                                   v           v
//!                                           pending messages of the frame
//!                                                   |
//!                                                   v
//!                                            MessageHandler
//! ```
//!
//! Messages are held back until the frame trailer arrives, so the trailer
//! CRC can be applied to them.
//!
//! # CRC handling
//!
//! Both the trailer CRC and the CRC element of every message are checked.
//! In lenient mode (the default) a mismatch is reported through
//! [`MessageHandler::on_warning`] and the messages are delivered anyway.
//! In strict mode a mismatch is reported through
//! [`MessageHandler::on_error`] and the affected messages are dropped.
//!
//! # Error recovery
//!
//! A malformed message is reported once through
//! [`MessageHandler::on_error`]. The rest of it is skipped up to the next
//! message header, and the messages after it in the same frame are still
//! delivered. A framing error drops the whole frame.

use crate::config::ParserConfig;
use crate::message::Message;
use sml_codec::tlv::{Decoded, TlvDecoder};
use sml_core::{SmlError, SmlResult};
use sml_session::{FrameDecoder, FrameSink, FrameStatistics, FrameTrailer};

/// Receiver of parser output
pub trait MessageHandler {
    /// A message has been decoded and passed all checks
    fn on_message(&mut self, message: Message);

    /// Data has been dropped
    fn on_error(&mut self, error: &SmlError) {
        let _ = error;
    }

    /// Data has been delivered despite an inconsistency
    fn on_warning(&mut self, warning: &SmlError) {
        let _ = warning;
    }
}

/// Handler wrapping a closure that receives messages only
pub struct FnHandler<F>(pub F);

impl<F: FnMut(Message)> MessageHandler for FnHandler<F> {
    fn on_message(&mut self, message: Message) {
        (self.0)(message)
    }
}

/// Handler collecting everything it receives
#[derive(Debug, Default)]
pub struct Collector {
    pub messages: Vec<Message>,
    pub errors: Vec<SmlError>,
    pub warnings: Vec<SmlError>,
}

impl MessageHandler for Collector {
    fn on_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    fn on_error(&mut self, error: &SmlError) {
        self.errors.push(error.clone());
    }

    fn on_warning(&mut self, warning: &SmlError) {
        self.warnings.push(warning.clone());
    }
}

/// What happened while the transport decoder consumed one byte
#[derive(Debug)]
enum Event {
    FrameStart,
    Decoded(Decoded),
    Error(SmlError),
    FrameEnd(FrameTrailer),
}

/// Feeds frame payload into the TLV decoder
struct PayloadSink<'a> {
    tlv: &'a mut TlvDecoder,
    events: &'a mut Vec<Event>,
}

impl FrameSink for PayloadSink<'_> {
    fn on_frame_start(&mut self) {
        self.tlv.reset();
        self.events.push(Event::FrameStart);
    }

    fn on_payload(&mut self, byte: u8) {
        match self.tlv.put(byte) {
            Ok(Some(decoded)) => self.events.push(Event::Decoded(decoded)),
            Ok(None) => {}
            Err(e) => self.events.push(Event::Error(e)),
        }
    }

    fn on_frame_end(&mut self, trailer: FrameTrailer) {
        self.events.push(Event::FrameEnd(trailer));
    }
}

/// Byte-at-a-time SML parser
#[derive(Debug)]
pub struct Parser {
    config: ParserConfig,
    frames: FrameDecoder,
    tlv: TlvDecoder,
    pending: Vec<Message>,
    events: Vec<Event>,
}

impl Parser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            frames: FrameDecoder::new(),
            tlv: TlvDecoder::with_max_depth(config.max_depth),
            config,
            pending: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Consume one byte
    pub fn put<H: MessageHandler>(&mut self, byte: u8, handler: &mut H) {
        let mut events = std::mem::take(&mut self.events);
        let result = {
            let mut sink = PayloadSink {
                tlv: &mut self.tlv,
                events: &mut events,
            };
            self.frames.put(byte, &mut sink)
        };

        for event in events.drain(..) {
            self.dispatch(event, handler);
        }
        self.events = events;

        if let Err(e) = result {
            log::debug!("frame dropped: {}", e);
            self.tlv.reset();
            self.pending.clear();
            handler.on_error(&e);
        }
    }

    /// Consume a sequence of bytes
    pub fn read<I, H>(&mut self, bytes: I, handler: &mut H)
    where
        I: IntoIterator<Item = u8>,
        H: MessageHandler,
    {
        for byte in bytes {
            self.put(byte, handler);
        }
    }

    /// Signal end of input
    ///
    /// Fails if the input ended inside a frame; messages of that frame are
    /// discarded.
    pub fn finish(&mut self) -> SmlResult<()> {
        let open = self.frames.is_open();
        self.reset();
        if open {
            Err(SmlError::Framing("Input ended inside a frame".to_string()))
        } else {
            Ok(())
        }
    }

    fn dispatch<H: MessageHandler>(&mut self, event: Event, handler: &mut H) {
        match event {
            Event::FrameStart => self.pending.clear(),
            Event::Decoded(decoded) => self.on_decoded(decoded, handler),
            Event::Error(e) => {
                log::debug!("payload error: {}", e);
                handler.on_error(&e);
            }
            Event::FrameEnd(trailer) => self.on_frame_end(trailer, handler),
        }
    }

    fn on_decoded<H: MessageHandler>(&mut self, decoded: Decoded, handler: &mut H) {
        let message = match Message::from_value(decoded.value) {
            Ok(message) => message,
            Err(e) => {
                handler.on_error(&e);
                return;
            }
        };

        if self.config.verify_message_crc {
            if let Some(computed) = decoded.body_crc {
                if computed != message.crc16 {
                    let e = SmlError::CrcMismatch {
                        expected: message.crc16,
                        computed,
                    };
                    if self.config.strict_crc {
                        log::debug!("message {} dropped: {}", message.trx, e);
                        handler.on_error(&e);
                        return;
                    }
                    log::warn!("message {}: {}", message.trx, e);
                    handler.on_warning(&e);
                }
            }
        }

        self.pending.push(message);
    }

    fn on_frame_end<H: MessageHandler>(&mut self, trailer: FrameTrailer, handler: &mut H) {
        if let Err(e) = self.tlv.finish() {
            handler.on_error(&e);
        }

        if let Some(e) = trailer.to_error() {
            if self.config.strict_crc {
                log::debug!("{} messages dropped: {}", self.pending.len(), e);
                self.pending.clear();
                handler.on_error(&e);
                return;
            }
            log::warn!("frame trailer: {}", e);
            handler.on_warning(&e);
        }

        for message in self.pending.drain(..) {
            handler.on_message(message);
        }
    }

    /// Transport statistics
    pub fn statistics(&self) -> &FrameStatistics {
        self.frames.statistics()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Drop all partial state
    pub fn reset(&mut self) {
        self.frames.reset();
        self.tlv.reset();
        self.pending.clear();
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of [`unpack`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Unpacked {
    pub messages: Vec<Message>,
    pub warnings: Vec<SmlError>,
}

/// Parse a complete buffer of framed messages
///
/// The first error aborts; warnings are returned alongside the messages.
pub fn unpack(bytes: &[u8], config: &ParserConfig) -> SmlResult<Unpacked> {
    let mut parser = Parser::with_config(config.clone());
    let mut collector = Collector::default();
    parser.read(bytes.iter().copied(), &mut collector);
    if let Some(e) = collector.errors.into_iter().next() {
        return Err(e);
    }
    parser.finish()?;
    Ok(Unpacked {
        messages: collector.messages,
        warnings: collector.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageKind, make_message, pack, to_bytes};
    use bytes::Bytes;
    use sml_core::Value;
    use sml_session::box_messages;

    fn sample() -> Vec<Message> {
        vec![
            make_message("1-1", 0, 0, MessageKind::OpenResponse, Value::list(vec![Value::Optional; 6])),
            make_message("1-2", 0, 0, MessageKind::CloseResponse, Value::list(vec![Value::Optional])),
        ]
    }

    #[test]
    fn test_round_trip() {
        let messages = sample();
        let frame = pack(&messages).unwrap();
        let unpacked = unpack(&frame, &ParserConfig::default()).unwrap();
        assert_eq!(unpacked.messages, messages);
        assert!(unpacked.warnings.is_empty());
    }

    #[test]
    fn test_fn_handler() {
        let frame = pack(&sample()).unwrap();
        let mut kinds = Vec::new();
        let mut handler = FnHandler(|m: Message| kinds.push(m.kind));
        Parser::new().read(frame.iter().copied(), &mut handler);
        assert_eq!(kinds, vec![MessageKind::OpenResponse, MessageKind::CloseResponse]);
    }

    #[test]
    fn test_corrupted_trailer() {
        let mut frame = pack(&sample()).unwrap().to_vec();
        let last = frame.len() - 1;
        frame[last] ^= 0x55;

        let lenient = unpack(&frame, &ParserConfig::default()).unwrap();
        assert_eq!(lenient.messages.len(), 2);
        assert!(lenient.warnings[0].is_crc_mismatch());

        let strict = unpack(&frame, &ParserConfig::strict());
        assert!(matches!(strict, Err(SmlError::CrcMismatch { .. })));
    }

    #[test]
    fn test_corrupted_message_crc() {
        let mut bytes = to_bytes(&sample()).unwrap();
        // CRC element of the second message sits 3 bytes before the end
        let at = bytes.len() - 3;
        bytes[at] ^= 0x01;
        let frame = box_messages(&[bytes]);

        let lenient = unpack(&frame, &ParserConfig::default()).unwrap();
        assert_eq!(lenient.messages.len(), 2);
        assert_eq!(lenient.warnings.len(), 1);

        let mut collector = Collector::default();
        Parser::with_config(ParserConfig::strict()).read(frame.iter().copied(), &mut collector);
        assert_eq!(collector.messages.len(), 1);
        assert_eq!(collector.errors.len(), 1);

        let unchecked = unpack(&frame, &ParserConfig::default().with_message_crc(false)).unwrap();
        assert!(unchecked.warnings.is_empty());
    }

    #[test]
    fn test_shape_error_keeps_other_messages() {
        let good = sample();
        let mut bytes = to_bytes(&good[..1]).unwrap();
        // a list of two booleans is not a message
        bytes.extend_from_slice(&[0x72, 0x42, 0x01, 0x42, 0x00]);
        bytes.extend_from_slice(&to_bytes(&good[1..]).unwrap());
        let frame = box_messages(&[bytes]);

        let mut collector = Collector::default();
        Parser::new().read(frame.iter().copied(), &mut collector);
        assert_eq!(collector.messages, good);
        assert!(matches!(collector.errors[..], [SmlError::TreeShape(_)]));
    }

    /// Three messages in one frame, with one TL byte of the first replaced
    /// by a reserved type tag
    fn corrupt_first(body: Value, pattern: &[u8]) -> (Vec<Message>, Bytes) {
        let messages = vec![
            make_message("1-1", 0, 0, MessageKind::CloseResponse, body),
            make_message("1-2", 1, 0, MessageKind::CloseResponse, Value::list(vec![Value::Optional])),
            make_message("1-3", 2, 0, MessageKind::CloseResponse, Value::list(vec![Value::u8(7)])),
        ];
        let mut bytes = to_bytes(&messages).unwrap();
        let at = bytes
            .windows(pattern.len())
            .position(|w| w == pattern)
            .unwrap()
            + 1;
        bytes[at] = 0x32;
        (messages, box_messages(&[bytes]))
    }

    #[test]
    fn test_bad_tl_byte_keeps_following_messages() {
        let (messages, frame) = corrupt_first(Value::list(vec![Value::u8(0x75)]), &[0x71, 0x62, 0x75]);

        let mut collector = Collector::default();
        Parser::new().read(frame.iter().copied(), &mut collector);
        assert_eq!(collector.messages, messages[1..]);
        assert!(matches!(collector.errors[..], [SmlError::Tlv(_)]));
        assert!(collector.warnings.is_empty());
    }

    #[test]
    fn test_bad_tl_byte_in_nested_body() {
        let body = Value::list(vec![
            Value::list(vec![Value::u8(1), Value::u8(2)]),
            Value::list(vec![Value::u8(3), Value::u8(4)]),
            Value::u16(10080),
        ]);
        let (messages, frame) = corrupt_first(body, &[0x72, 0x62, 0x01]);

        let mut parser = Parser::new();
        let mut collector = Collector::default();
        parser.read(frame.iter().copied(), &mut collector);
        parser.finish().unwrap();
        assert_eq!(collector.messages, messages[1..]);
        assert_eq!(collector.errors.len(), 1);
    }

    #[test]
    fn test_truncated_input() {
        let frame = pack(&sample()).unwrap();
        let result = unpack(&frame[..frame.len() - 6], &ParserConfig::default());
        assert!(matches!(result, Err(SmlError::Framing(_))));
    }

    #[test]
    fn test_two_frames() {
        let messages = sample();
        let mut bytes = pack(&messages[..1]).unwrap().to_vec();
        bytes.extend_from_slice(&pack(&messages[1..]).unwrap());
        let mut parser = Parser::new();
        let mut collector = Collector::default();
        parser.read(bytes.iter().copied(), &mut collector);
        parser.finish().unwrap();
        assert_eq!(collector.messages, messages);
        assert_eq!(parser.statistics().frames_completed, 2);
    }
}
