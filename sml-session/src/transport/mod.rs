//! SML transport (version 1) framing

pub mod decoder;
pub mod boxing;

pub use boxing::box_messages;
pub use decoder::{FrameDecoder, FrameSink, FrameTrailer};

/// Sentinel byte of escape sequences
pub const ESCAPE: u8 = 0x1B;
/// Property byte announcing transport version 1
pub const VERSION_1: u8 = 0x01;
/// First byte after an escape sequence closing a transmission
pub const END_MARKER: u8 = 0x1A;

/// Escape sequence: four sentinel bytes
pub const ESCAPE_SEQUENCE: [u8; 4] = [ESCAPE; 4];
/// Escape sequence followed by the version 1 property bytes
pub const START_SEQUENCE: [u8; 8] = [
    ESCAPE, ESCAPE, ESCAPE, ESCAPE, VERSION_1, VERSION_1, VERSION_1, VERSION_1,
];
