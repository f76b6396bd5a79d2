//! Attention codes
//!
//! Attention responses carry their result as an OBIS code in the
//! `81 81 C7 C7 xx xx` range. `FD xx` codes signal success, `FE xx` codes
//! errors.

use serde::{Deserialize, Serialize};
use sml_core::ObisCode;
use sml_core::obis_code::codes::ATTENTION_PREFIX;
use std::fmt;

/// Result of a request, as reported in an attention response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttentionCode {
    Ok,
    JobIsRunning,
    UnknownError,
    UnknownSmlId,
    NotAuthorized,
    NoServerId,
    NoReqField,
    CannotWrite,
    CannotRead,
    CommunicationError,
    ParserError,
    OutOfRange,
    NotExecuted,
    InvalidCrc,
    NoBroadcast,
    UnexpectedMessage,
    UnknownObisCode,
    UnsupportedDataType,
    ElementNotOptional,
    NoEntries,
    EndLimitBeforeStart,
    NoEntriesInRange,
    MissingCloseMessage,
    /// Local state without a code of its own; reported as `UnknownError`
    Undefined,
}

/// Codes with their (group E, group F) bytes
const TABLE: [(AttentionCode, u8, u8); 23] = [
    (AttentionCode::Ok, 0xFD, 0x00),
    (AttentionCode::JobIsRunning, 0xFD, 0x01),
    (AttentionCode::UnknownError, 0xFE, 0x00),
    (AttentionCode::UnknownSmlId, 0xFE, 0x01),
    (AttentionCode::NotAuthorized, 0xFE, 0x02),
    (AttentionCode::NoServerId, 0xFE, 0x03),
    (AttentionCode::NoReqField, 0xFE, 0x04),
    (AttentionCode::CannotWrite, 0xFE, 0x05),
    (AttentionCode::CannotRead, 0xFE, 0x06),
    (AttentionCode::CommunicationError, 0xFE, 0x07),
    (AttentionCode::ParserError, 0xFE, 0x08),
    (AttentionCode::OutOfRange, 0xFE, 0x09),
    (AttentionCode::NotExecuted, 0xFE, 0x0A),
    (AttentionCode::InvalidCrc, 0xFE, 0x0B),
    (AttentionCode::NoBroadcast, 0xFE, 0x0C),
    (AttentionCode::UnexpectedMessage, 0xFE, 0x0D),
    (AttentionCode::UnknownObisCode, 0xFE, 0x0E),
    (AttentionCode::UnsupportedDataType, 0xFE, 0x0F),
    (AttentionCode::ElementNotOptional, 0xFE, 0x10),
    (AttentionCode::NoEntries, 0xFE, 0x11),
    (AttentionCode::EndLimitBeforeStart, 0xFE, 0x12),
    (AttentionCode::NoEntriesInRange, 0xFE, 0x13),
    (AttentionCode::MissingCloseMessage, 0xFE, 0x14),
];

impl AttentionCode {
    /// The OBIS code transmitted for this result
    pub fn to_obis(self) -> ObisCode {
        let (e, f) = TABLE
            .iter()
            .find(|(code, _, _)| *code == self)
            .map(|&(_, e, f)| (e, f))
            .unwrap_or((0xFE, 0x00));
        ObisCode::new(ATTENTION_PREFIX[0], ATTENTION_PREFIX[1], ATTENTION_PREFIX[2], ATTENTION_PREFIX[3], e, f)
    }

    /// Look up a received code
    ///
    /// Codes outside the table yield `UnknownError`.
    pub fn from_obis(code: &ObisCode) -> Self {
        if !code.starts_with(&ATTENTION_PREFIX) {
            return AttentionCode::UnknownError;
        }
        TABLE
            .iter()
            .find(|&&(_, e, f)| e == code.e() && f == code.f())
            .map(|&(code, _, _)| code)
            .unwrap_or(AttentionCode::UnknownError)
    }

    /// Whether the code reports success
    pub fn is_ok(self) -> bool {
        matches!(self, AttentionCode::Ok | AttentionCode::JobIsRunning)
    }
}

impl fmt::Display for AttentionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.to_obis().to_hex())
    }
}
