use thiserror::Error;

/// Main error type for SML operations
///
/// `Framing`, `Tlv` and `TreeShape` abort the message being decoded; the
/// decoder resets and continues with the next one. `CrcMismatch` is reported
/// as a warning unless strict CRC checking is enabled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmlError {
    #[error("Framing error: {0}")]
    Framing(String),

    #[error("TLV error: {0}")]
    Tlv(String),

    #[error("Tree shape error: {0}")]
    TreeShape(String),

    #[error("CRC mismatch: expected 0x{expected:04X}, computed 0x{computed:04X}")]
    CrcMismatch { expected: u16, computed: u16 },

    #[error("Value coercion error: {0}")]
    ValueCoercion(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl SmlError {
    /// Check whether the error is a CRC mismatch
    pub fn is_crc_mismatch(&self) -> bool {
        matches!(self, SmlError::CrcMismatch { .. })
    }
}

/// Result type alias for SML operations
pub type SmlResult<T> = Result<T, SmlError>;
