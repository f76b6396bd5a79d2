//! Session layer module for the SML protocol
//!
//! This crate implements the SML transport framing (version 1): escape
//! sequences, start and end markers, padding and the trailer CRC.
//!
//! - [`FrameDecoder`] splits a byte stream into frame payloads
//! - [`box_messages`] wraps serialized messages into a frame
//! - [`FrameStatistics`] counts what the decoder has seen

pub mod statistics;
pub mod transport;

pub use sml_core::{SmlError, SmlResult};
pub use statistics::FrameStatistics;
pub use transport::{
    ESCAPE, ESCAPE_SEQUENCE, END_MARKER, FrameDecoder, FrameSink, FrameTrailer, START_SEQUENCE, VERSION_1,
    box_messages,
};
