//! Frame statistics collection

/// Transport framing statistics
///
/// Updated by the frame decoder while it runs, queried by whoever owns the
/// connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStatistics {
    /// Number of start markers seen
    pub frames_started: u64,
    /// Number of frames closed by an end marker
    pub frames_completed: u64,
    /// Number of trailers whose CRC did not match
    pub crc_errors: u64,
    /// Number of unknown or malformed escape sequences
    pub framing_errors: u64,
    /// Number of payload bytes passed on
    pub payload_bytes: u64,
}

impl FrameStatistics {
    /// Create new statistics with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all statistics counters
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn increment_frames_started(&mut self) {
        self.frames_started += 1;
    }

    pub fn increment_frames_completed(&mut self) {
        self.frames_completed += 1;
    }

    pub fn increment_crc_errors(&mut self) {
        self.crc_errors += 1;
    }

    pub fn increment_framing_errors(&mut self) {
        self.framing_errors += 1;
    }

    pub fn add_payload_bytes(&mut self, count: u64) {
        self.payload_bytes += count;
    }

    /// Share of completed frames with a bad CRC, in percent
    ///
    /// Returns 0.0 if no frame has been completed.
    pub fn crc_error_rate(&self) -> f64 {
        if self.frames_completed == 0 {
            0.0
        } else {
            (self.crc_errors as f64 / self.frames_completed as f64) * 100.0
        }
    }
}
