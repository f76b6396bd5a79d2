//! SML transport frame decoder
//!
//! A transmission looks like
//!
//! ```text
//! 1B 1B 1B 1B  01 01 01 01  <payload>  00..  1B 1B 1B 1B  1A pp cc cc
//! ```
//!
//! where `pp` is the number of zero bytes padding the payload to a multiple
//! of four and `cc cc` is the CRC16 over everything from the start sequence
//! through `pp`. Four sentinel bytes inside the payload are escaped by
//! doubling them. Up to three sentinel bytes may end the payload right
//! before the end sequence; they are told apart by the `1A` that follows.

use crate::statistics::FrameStatistics;
use crate::transport::{END_MARKER, ESCAPE, START_SEQUENCE, VERSION_1};
use sml_codec::crc16;
use sml_core::{SmlError, SmlResult};

/// Maximum number of padding bytes
const MAX_PADDING: u8 = 3;

/// End-of-transmission data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTrailer {
    /// Number of padding bytes preceding the end sequence
    ///
    /// The decoder has checked that the payload ends with at least this many
    /// zero bytes.
    pub pad_count: u8,
    /// CRC transmitted in the trailer
    pub crc: u16,
    /// CRC computed over the received frame
    pub computed: u16,
}

impl FrameTrailer {
    /// Whether the transmitted CRC matches the received data
    pub fn is_valid(&self) -> bool {
        self.crc == self.computed
    }

    /// The mismatch as an error value
    pub fn to_error(&self) -> Option<SmlError> {
        if self.is_valid() {
            None
        } else {
            Some(SmlError::CrcMismatch {
                expected: self.crc,
                computed: self.computed,
            })
        }
    }
}

/// Receiver of decoded frame contents
pub trait FrameSink {
    /// A start sequence has been recognized
    fn on_frame_start(&mut self) {}

    /// One payload byte, escape sequences already removed
    fn on_payload(&mut self, byte: u8);

    /// An end sequence including trailer has been received
    fn on_frame_end(&mut self, trailer: FrameTrailer);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Outside of a frame, counting sentinel bytes of a start sequence
    AwaitStart { run: u8 },
    /// Reading the four property (version) bytes
    Property { count: u8 },
    /// Passing payload through
    Payload,
    /// Counting sentinel bytes inside a frame
    Escape { count: u8 },
    /// Four sentinel bytes seen, the next byte selects the sequence
    Marker,
    /// Reading an escaped sentinel sequence
    EscapedEscape { count: u8 },
    /// Reading the padding count
    PadCount,
    /// Reading the trailer CRC
    Crc { pad_count: u8, high: Option<u8> },
}

/// Byte-at-a-time SML transport decoder
#[derive(Debug)]
pub struct FrameDecoder {
    state: State,
    crc: u16,
    /// Zero bytes at the end of the payload so far
    trailing_zeros: u8,
    statistics: FrameStatistics,
}

impl FrameDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self {
            state: State::AwaitStart { run: 0 },
            crc: crc16::init(),
            trailing_zeros: 0,
            statistics: FrameStatistics::new(),
        }
    }

    /// Consume one byte
    ///
    /// A framing error drops the current frame; the decoder then waits for
    /// the next start sequence.
    pub fn put<S: FrameSink>(&mut self, byte: u8, sink: &mut S) -> SmlResult<()> {
        if self.in_frame() {
            self.crc = crc16::update(self.crc, byte);
        }

        match self.state {
            State::AwaitStart { run } => {
                self.state = match (run, byte) {
                    (4, VERSION_1) => State::Property { count: 1 },
                    (4, ESCAPE) => State::AwaitStart { run: 4 },
                    (4, other) => {
                        return self.framing_error(format!(
                            "Unexpected escape sequence 0x{:02X} outside of a frame",
                            other
                        ));
                    }
                    (_, ESCAPE) => State::AwaitStart { run: run + 1 },
                    _ => State::AwaitStart { run: 0 },
                };
            }
            State::Property { count } => {
                if byte != VERSION_1 {
                    return self.framing_error(format!(
                        "Unsupported transport version 0x{:02X}",
                        byte
                    ));
                }
                if count + 1 == 4 {
                    self.start_frame(sink);
                } else {
                    self.state = State::Property { count: count + 1 };
                }
            }
            State::Payload => {
                if byte == ESCAPE {
                    self.state = State::Escape { count: 1 };
                } else {
                    self.payload(sink, byte);
                }
            }
            State::Escape { count } => {
                if byte == ESCAPE {
                    self.state = if count + 1 == 4 {
                        State::Marker
                    } else {
                        State::Escape { count: count + 1 }
                    };
                } else {
                    // not a marker after all, the sentinels were data
                    for _ in 0..count {
                        self.payload(sink, ESCAPE);
                    }
                    self.payload(sink, byte);
                    self.state = State::Payload;
                }
            }
            State::Marker => match byte {
                ESCAPE => self.state = State::EscapedEscape { count: 1 },
                END_MARKER => self.state = State::PadCount,
                VERSION_1 => {
                    self.statistics.increment_framing_errors();
                    // the broken frame is dropped, the new one is read normally
                    self.state = State::Property { count: 1 };
                    return Err(SmlError::Framing(
                        "Start sequence inside an open frame".to_string(),
                    ));
                }
                other => {
                    return self.framing_error(format!(
                        "Unknown escape sequence 0x{:02X}",
                        other
                    ));
                }
            },
            State::EscapedEscape { count } => {
                if byte == END_MARKER {
                    // payload ended in sentinels, then came the end sequence
                    for _ in 0..count {
                        self.payload(sink, ESCAPE);
                    }
                    self.state = State::PadCount;
                    return Ok(());
                }
                if byte != ESCAPE {
                    return self.framing_error(format!(
                        "Broken escaped sentinel sequence at byte 0x{:02X}",
                        byte
                    ));
                }
                if count + 1 == 4 {
                    for _ in 0..4 {
                        self.payload(sink, ESCAPE);
                    }
                    self.state = State::Payload;
                } else {
                    self.state = State::EscapedEscape { count: count + 1 };
                }
            }
            State::PadCount => {
                if byte > MAX_PADDING {
                    return self.framing_error(format!("Invalid padding count {}", byte));
                }
                if byte > self.trailing_zeros {
                    return self.framing_error(format!(
                        "Padding count {} but payload ends with {} zero bytes",
                        byte, self.trailing_zeros
                    ));
                }
                self.state = State::Crc {
                    pad_count: byte,
                    high: None,
                };
            }
            State::Crc { pad_count, high } => match high {
                None => {
                    self.state = State::Crc {
                        pad_count,
                        high: Some(byte),
                    };
                }
                Some(high) => {
                    let trailer = FrameTrailer {
                        pad_count,
                        crc: u16::from_be_bytes([high, byte]),
                        computed: crc16::finalize(self.crc),
                    };
                    self.statistics.increment_frames_completed();
                    if !trailer.is_valid() {
                        self.statistics.increment_crc_errors();
                        log::debug!(
                            "trailer CRC 0x{:04X} does not match computed 0x{:04X}",
                            trailer.crc,
                            trailer.computed
                        );
                    }
                    self.state = State::AwaitStart { run: 0 };
                    sink.on_frame_end(trailer);
                }
            },
        }
        Ok(())
    }

    /// Consume a sequence of bytes
    ///
    /// Stops at the first framing error.
    pub fn read<I, S>(&mut self, bytes: I, sink: &mut S) -> SmlResult<()>
    where
        I: IntoIterator<Item = u8>,
        S: FrameSink,
    {
        for byte in bytes {
            self.put(byte, sink)?;
        }
        Ok(())
    }

    fn in_frame(&self) -> bool {
        !matches!(self.state, State::AwaitStart { .. } | State::Property { .. } | State::Crc { .. })
    }

    fn start_frame<S: FrameSink>(&mut self, sink: &mut S) {
        self.statistics.increment_frames_started();
        self.crc = crc16::update_slice(crc16::init(), &START_SEQUENCE);
        self.trailing_zeros = 0;
        self.state = State::Payload;
        sink.on_frame_start();
    }

    fn payload<S: FrameSink>(&mut self, sink: &mut S, byte: u8) {
        self.statistics.add_payload_bytes(1);
        self.trailing_zeros = if byte == 0x00 {
            self.trailing_zeros.saturating_add(1)
        } else {
            0
        };
        sink.on_payload(byte);
    }

    fn framing_error(&mut self, reason: String) -> SmlResult<()> {
        self.statistics.increment_framing_errors();
        self.state = State::AwaitStart { run: 0 };
        Err(SmlError::Framing(reason))
    }

    /// Whether a frame is currently open
    pub fn is_open(&self) -> bool {
        !matches!(self.state, State::AwaitStart { .. })
    }

    /// Statistics collected so far
    pub fn statistics(&self) -> &FrameStatistics {
        &self.statistics
    }

    /// Return to the initial state, keeping the statistics
    pub fn reset(&mut self) {
        self.state = State::AwaitStart { run: 0 };
        self.crc = crc16::init();
        self.trailing_zeros = 0;
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::box_messages;

    #[derive(Default)]
    struct Collector {
        starts: usize,
        payload: Vec<u8>,
        trailers: Vec<FrameTrailer>,
    }

    impl FrameSink for Collector {
        fn on_frame_start(&mut self) {
            self.starts += 1;
        }

        fn on_payload(&mut self, byte: u8) {
            self.payload.push(byte);
        }

        fn on_frame_end(&mut self, trailer: FrameTrailer) {
            self.trailers.push(trailer);
        }
    }

    fn run(bytes: &[u8]) -> (Collector, SmlResult<()>) {
        let mut decoder = FrameDecoder::new();
        let mut sink = Collector::default();
        let result = decoder.read(bytes.iter().copied(), &mut sink);
        (sink, result)
    }

    #[test]
    fn test_simple_frame() {
        let frame = box_messages(&[[0x76, 0x01, 0x02, 0x00]]);
        let (sink, result) = run(&frame);
        result.unwrap();
        assert_eq!(sink.starts, 1);
        assert_eq!(sink.payload, vec![0x76, 0x01, 0x02, 0x00]);
        assert_eq!(sink.trailers.len(), 1);
        assert_eq!(sink.trailers[0].pad_count, 0);
        assert!(sink.trailers[0].is_valid());
    }

    #[test]
    fn test_padding_is_passed_through() {
        let frame = box_messages(&[[0x62, 0x05, 0x00]]);
        assert_eq!(frame.len() % 4, 0);
        let (sink, result) = run(&frame);
        result.unwrap();
        assert_eq!(sink.payload, vec![0x62, 0x05, 0x00, 0x00]);
        assert_eq!(sink.trailers[0].pad_count, 1);
        assert!(sink.trailers[0].is_valid());
    }

    #[test]
    fn test_known_frame() {
        let frame = hex::decode("1b1b1b1b01010101620500001b1b1b1b1a01").unwrap();
        let crc = crc16::checksum(&frame);
        let mut bytes = frame.clone();
        bytes.extend_from_slice(&crc.to_be_bytes());
        assert_eq!(&box_messages(&[[0x62, 0x05, 0x00]])[..], &bytes[..]);
    }

    #[test]
    fn test_broken_sentinel_run_is_payload() {
        let mut bytes = START_SEQUENCE.to_vec();
        bytes.extend_from_slice(&[0x1B, 0x1B, 0x42, 0x00]);
        let (sink, result) = run(&bytes);
        result.unwrap();
        assert_eq!(sink.payload, vec![0x1B, 0x1B, 0x42, 0x00]);
        assert!(sink.trailers.is_empty());
    }

    #[test]
    fn test_escaped_sentinels_round_trip() {
        let payload = [0x09, 0x1B, 0x1B, 0x1B, 0x1B, 0x1B, 0x1B, 0x1B, 0x1B, 0x00];
        let frame = box_messages(&[payload]);
        let (sink, result) = run(&frame);
        result.unwrap();
        assert_eq!(&sink.payload[..payload.len()], &payload[..]);
        assert!(sink.trailers[0].is_valid());
    }

    #[test]
    fn test_payload_ending_in_sentinels() {
        for count in 1..=3 {
            let mut payload = vec![0x00; 4 - count];
            payload.extend(std::iter::repeat(0x1B).take(count));
            let frame = box_messages(&[&payload]);
            assert_eq!(frame[frame.len() - 3], 0, "no padding for {} sentinels", count);

            let (sink, result) = run(&frame);
            result.unwrap();
            assert_eq!(sink.payload, payload);
            assert!(sink.trailers[0].is_valid());
        }
    }

    #[test]
    fn test_padding_count_must_match_zeros() {
        // payload ends in 0x05, yet the trailer claims one padding byte
        let mut bytes = hex::decode("1b1b1b1b0101010162050005").unwrap();
        bytes.extend_from_slice(&[0x1B, 0x1B, 0x1B, 0x1B, 0x1A, 0x01]);
        let crc = crc16::checksum(&bytes);
        bytes.extend_from_slice(&crc.to_be_bytes());

        let mut decoder = FrameDecoder::new();
        let mut sink = Collector::default();
        let result = decoder.read(bytes.iter().copied(), &mut sink);
        assert!(matches!(result, Err(SmlError::Framing(_))));
        assert!(sink.trailers.is_empty());
        assert_eq!(decoder.statistics().framing_errors, 1);
    }

    #[test]
    fn test_unsupported_version() {
        let bytes = [0x1B, 0x1B, 0x1B, 0x1B, 0x01, 0x02];
        let (sink, result) = run(&bytes);
        assert!(matches!(result, Err(SmlError::Framing(_))));
        assert_eq!(sink.starts, 0);
    }

    #[test]
    fn test_unknown_escape_in_frame() {
        let mut bytes = START_SEQUENCE.to_vec();
        bytes.extend_from_slice(&[0x1B, 0x1B, 0x1B, 0x1B, 0x7F]);
        let mut decoder = FrameDecoder::new();
        let mut sink = Collector::default();
        let result = decoder.read(bytes.iter().copied(), &mut sink);
        assert!(matches!(result, Err(SmlError::Framing(_))));
        assert!(!decoder.is_open());
        assert_eq!(decoder.statistics().framing_errors, 1);
    }

    #[test]
    fn test_corrupted_crc() {
        let mut frame = box_messages(&[[0x62, 0x05, 0x00]]).to_vec();
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        let mut decoder = FrameDecoder::new();
        let mut sink = Collector::default();
        decoder.read(frame.iter().copied(), &mut sink).unwrap();
        assert!(!sink.trailers[0].is_valid());
        assert!(sink.trailers[0].to_error().unwrap().is_crc_mismatch());
        assert_eq!(decoder.statistics().crc_errors, 1);
    }

    #[test]
    fn test_garbage_before_frame_is_skipped() {
        let mut bytes = vec![0xAA, 0x1B, 0x1B, 0x00, 0x55];
        bytes.extend_from_slice(&box_messages(&[[0x62, 0x05, 0x00]]));
        let (sink, result) = run(&bytes);
        result.unwrap();
        assert_eq!(sink.starts, 1);
        assert_eq!(sink.trailers.len(), 1);
    }
}
