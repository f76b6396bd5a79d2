//! SML message envelope
//!
//! Every SML message is a list of six elements:
//!
//! ```text
//! [ transaction id, group no, abort on error, [ body tag, body ], crc16, end of message ]
//! ```
//!
//! The CRC16 covers all bytes of the message from its list header up to and
//! including the body. A file (transmission) is a sequence of messages, the
//! first one opening and the last one closing the exchange.
//!
//! # Encoding
//!
//! [`to_bytes`] serializes messages with correct CRCs; [`pack`] additionally
//! wraps them into a transport frame. The inverse operations are
//! [`decode_messages`] and [`unpack`](crate::parser::unpack).

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use sml_codec::crc16;
use sml_codec::tlv::TlvDecoder;
use sml_codec::tlv::TlvEncoder;
use sml_core::{SmlError, SmlResult, Value};
use sml_session::box_messages;
use std::fmt;

/// Number of elements of a message list
pub const MESSAGE_ARITY: usize = 6;

/// Size of the encoded CRC element plus end-of-message byte
const CRC_TAIL: usize = 4;

/// Type/length byte of a two byte unsigned integer
const CRC_TL: u8 = 0x63;

/// Message body types
///
/// The numeric tags are those of the body choice on the wire. Tags this
/// implementation does not know are kept as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    OpenRequest,
    OpenResponse,
    CloseRequest,
    CloseResponse,
    GetProfilePackRequest,
    GetProfilePackResponse,
    GetProfileListRequest,
    GetProfileListResponse,
    GetProcParameterRequest,
    GetProcParameterResponse,
    SetProcParameterRequest,
    SetProcParameterResponse,
    GetListRequest,
    GetListResponse,
    GetCosemRequest,
    GetCosemResponse,
    SetCosemRequest,
    SetCosemResponse,
    ActionCosemRequest,
    ActionCosemResponse,
    AttentionResponse,
    Unknown(u32),
}

impl MessageKind {
    /// Get the kind from a body tag
    pub fn from_tag(tag: u32) -> Self {
        match tag {
            0x0100 => MessageKind::OpenRequest,
            0x0101 => MessageKind::OpenResponse,
            0x0200 => MessageKind::CloseRequest,
            0x0201 => MessageKind::CloseResponse,
            0x0300 => MessageKind::GetProfilePackRequest,
            0x0301 => MessageKind::GetProfilePackResponse,
            0x0400 => MessageKind::GetProfileListRequest,
            0x0401 => MessageKind::GetProfileListResponse,
            0x0500 => MessageKind::GetProcParameterRequest,
            0x0501 => MessageKind::GetProcParameterResponse,
            0x0600 => MessageKind::SetProcParameterRequest,
            0x0601 => MessageKind::SetProcParameterResponse,
            0x0700 => MessageKind::GetListRequest,
            0x0701 => MessageKind::GetListResponse,
            0x0800 => MessageKind::GetCosemRequest,
            0x0801 => MessageKind::GetCosemResponse,
            0x0900 => MessageKind::SetCosemRequest,
            0x0901 => MessageKind::SetCosemResponse,
            0x0A00 => MessageKind::ActionCosemRequest,
            0x0A01 => MessageKind::ActionCosemResponse,
            0xFF01 => MessageKind::AttentionResponse,
            other => MessageKind::Unknown(other),
        }
    }

    /// Get the body tag of this kind
    pub fn tag(self) -> u32 {
        match self {
            MessageKind::OpenRequest => 0x0100,
            MessageKind::OpenResponse => 0x0101,
            MessageKind::CloseRequest => 0x0200,
            MessageKind::CloseResponse => 0x0201,
            MessageKind::GetProfilePackRequest => 0x0300,
            MessageKind::GetProfilePackResponse => 0x0301,
            MessageKind::GetProfileListRequest => 0x0400,
            MessageKind::GetProfileListResponse => 0x0401,
            MessageKind::GetProcParameterRequest => 0x0500,
            MessageKind::GetProcParameterResponse => 0x0501,
            MessageKind::SetProcParameterRequest => 0x0600,
            MessageKind::SetProcParameterResponse => 0x0601,
            MessageKind::GetListRequest => 0x0700,
            MessageKind::GetListResponse => 0x0701,
            MessageKind::GetCosemRequest => 0x0800,
            MessageKind::GetCosemResponse => 0x0801,
            MessageKind::SetCosemRequest => 0x0900,
            MessageKind::SetCosemResponse => 0x0901,
            MessageKind::ActionCosemRequest => 0x0A00,
            MessageKind::ActionCosemResponse => 0x0A01,
            MessageKind::AttentionResponse => 0xFF01,
            MessageKind::Unknown(tag) => tag,
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::OpenRequest => "PublicOpen.Req",
            MessageKind::OpenResponse => "PublicOpen.Res",
            MessageKind::CloseRequest => "PublicClose.Req",
            MessageKind::CloseResponse => "PublicClose.Res",
            MessageKind::GetProfilePackRequest => "GetProfilePack.Req",
            MessageKind::GetProfilePackResponse => "GetProfilePack.Res",
            MessageKind::GetProfileListRequest => "GetProfileList.Req",
            MessageKind::GetProfileListResponse => "GetProfileList.Res",
            MessageKind::GetProcParameterRequest => "GetProcParameter.Req",
            MessageKind::GetProcParameterResponse => "GetProcParameter.Res",
            MessageKind::SetProcParameterRequest => "SetProcParameter.Req",
            MessageKind::SetProcParameterResponse => "SetProcParameter.Res",
            MessageKind::GetListRequest => "GetList.Req",
            MessageKind::GetListResponse => "GetList.Res",
            MessageKind::GetCosemRequest => "GetCosem.Req",
            MessageKind::GetCosemResponse => "GetCosem.Res",
            MessageKind::SetCosemRequest => "SetCosem.Req",
            MessageKind::SetCosemResponse => "SetCosem.Res",
            MessageKind::ActionCosemRequest => "ActionCosem.Req",
            MessageKind::ActionCosemResponse => "ActionCosem.Res",
            MessageKind::AttentionResponse => "Attention.Res",
            MessageKind::Unknown(_) => "Unknown",
        }
    }

    /// Requests have an even low byte in their tag
    pub fn is_request(self) -> bool {
        !matches!(self, MessageKind::Unknown(_)) && self.tag() & 0xFF == 0x00
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Unknown(tag) => write!(f, "Unknown(0x{:04X})", tag),
            other => f.write_str(other.name()),
        }
    }
}

/// A single SML message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Transaction id
    pub trx: String,
    pub group_no: u8,
    pub abort_code: u8,
    pub kind: MessageKind,
    /// Message body, a list for every known kind
    pub body: Value,
    /// CRC16 as transmitted, or as computed by [`make_message`] and
    /// [`Message::seal`]
    pub crc16: u16,
}

/// Wrap a body into a message
///
/// The CRC is computed from the serialized message. A body that cannot be
/// serialized keeps a zero CRC and fails later in [`Message::encode`].
/// Call [`Message::seal`] again after changing any field.
pub fn make_message(
    trx: impl Into<String>,
    group_no: u8,
    abort_code: u8,
    kind: MessageKind,
    body: Value,
) -> Message {
    let mut message = Message {
        trx: trx.into(),
        group_no,
        abort_code,
        kind,
        body,
        crc16: 0,
    };
    if let Err(e) = message.seal() {
        log::debug!("message {} not sealed: {}", message.trx, e);
    }
    message
}

impl Message {
    /// Build the six element message list
    pub fn to_value(&self) -> Value {
        Value::list(vec![
            Value::binary(self.trx.as_bytes().to_vec()),
            Value::u8(self.group_no),
            Value::u8(self.abort_code),
            Value::list(vec![Value::u32(self.kind.tag()), self.body.clone()]),
            Value::u16(self.crc16),
            Value::EndOfMessage,
        ])
    }

    /// Interpret a decoded top-level value as a message
    pub fn from_value(value: Value) -> SmlResult<Self> {
        let items = match value {
            Value::List(items) if items.len() == MESSAGE_ARITY => items,
            other => {
                return Err(SmlError::TreeShape(format!(
                    "Message must be a list of {} elements, got {}",
                    MESSAGE_ARITY, other
                )));
            }
        };
        let [trx, group_no, abort_code, body, crc, eom]: [Value; MESSAGE_ARITY] = items
            .try_into()
            .map_err(|_| SmlError::TreeShape("Message arity".to_string()))?;

        let trx = match trx {
            Value::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Value::Optional => String::new(),
            other => {
                return Err(SmlError::TreeShape(format!(
                    "Transaction id must be an octet string, got {}",
                    other.type_name()
                )));
            }
        };

        let small = |value: &Value, name: &str| -> SmlResult<u8> {
            value
                .as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| SmlError::TreeShape(format!("{} is not an 8 bit number: {}", name, value)))
        };
        let group_no = small(&group_no, "Group number")?;
        let abort_code = small(&abort_code, "Abort code")?;

        let Some([tag, body]) = body
            .into_list()
            .and_then(|pair| <[Value; 2]>::try_from(pair).ok())
        else {
            return Err(SmlError::TreeShape(
                "Message body must be a [tag, body] pair".to_string(),
            ));
        };
        let kind = tag
            .as_u64()
            .and_then(|t| u32::try_from(t).ok())
            .map(MessageKind::from_tag)
            .ok_or_else(|| SmlError::TreeShape(format!("Invalid body tag {}", tag)))?;

        let crc16 = crc
            .as_u64()
            .and_then(|c| u16::try_from(c).ok())
            .ok_or_else(|| SmlError::TreeShape(format!("Invalid CRC element {}", crc)))?;

        if !eom.is_end_of_message() {
            return Err(SmlError::TreeShape(format!(
                "Message must end with end-of-message, got {}",
                eom.type_name()
            )));
        }

        Ok(Self {
            trx,
            group_no,
            abort_code,
            kind,
            body,
            crc16,
        })
    }

    /// Serialize this message, computing the CRC
    pub fn encode(&self) -> SmlResult<BytesMut> {
        let mut encoder = TlvEncoder::new();
        encoder.encode_value(&self.to_value())?;
        finalize_crc(encoder.as_bytes_mut())?;
        Ok(BytesMut::from(encoder.as_bytes()))
    }

    /// Compute the CRC and store it in the message
    pub fn seal(&mut self) -> SmlResult<u16> {
        let bytes = self.encode()?;
        let tail = bytes.len() - CRC_TAIL;
        self.crc16 = u16::from_be_bytes([bytes[tail + 1], bytes[tail + 2]]);
        Ok(self.crc16)
    }
}

/// Compute and write the CRC of one serialized message
///
/// The buffer must end with the CRC element (a two byte unsigned integer
/// acting as placeholder) and the end-of-message byte. The CRC covers all
/// bytes before that element.
pub fn finalize_crc(buffer: &mut [u8]) -> SmlResult<u16> {
    let len = buffer.len();
    if len < CRC_TAIL + 1 || buffer[len - CRC_TAIL] != CRC_TL || buffer[len - 1] != 0x00 {
        return Err(SmlError::InvalidData(
            "Buffer does not end with a CRC placeholder".to_string(),
        ));
    }
    let crc = crc16::checksum(&buffer[..len - CRC_TAIL]);
    buffer[len - 3..len - 1].copy_from_slice(&crc.to_be_bytes());
    Ok(crc)
}

/// Serialize a sequence of messages
pub fn to_bytes(messages: &[Message]) -> SmlResult<BytesMut> {
    let mut out = BytesMut::new();
    for message in messages {
        out.extend_from_slice(&message.encode()?);
    }
    Ok(out)
}

/// Serialize messages and wrap them into one transport frame
pub fn pack(messages: &[Message]) -> SmlResult<Bytes> {
    let payload = to_bytes(messages)?;
    Ok(box_messages(&[payload]))
}

/// Decode unframed message bytes
///
/// Message CRCs are not checked here; use the parser for that.
pub fn decode_messages(bytes: &[u8]) -> SmlResult<Vec<Message>> {
    TlvDecoder::new()
        .read(bytes.iter().copied())?
        .into_iter()
        .map(|decoded| Message::from_value(decoded.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_request() -> Message {
        make_message("1234567-1", 0, 0, MessageKind::CloseRequest, Value::list(vec![Value::Optional]))
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(MessageKind::from_tag(0x0101), MessageKind::OpenResponse);
        assert_eq!(MessageKind::GetListResponse.tag(), 0x0701);
        assert_eq!(MessageKind::from_tag(0x4711), MessageKind::Unknown(0x4711));
        assert_eq!(MessageKind::Unknown(0x4711).tag(), 0x4711);
        assert!(MessageKind::OpenRequest.is_request());
        assert!(!MessageKind::AttentionResponse.is_request());
        assert_eq!(MessageKind::Unknown(0x12).to_string(), "Unknown(0x0012)");
    }

    #[test]
    fn test_encode_layout() {
        let bytes = close_request().encode().unwrap();
        assert_eq!(&bytes[..2], &[0x76, 0x0A]);
        assert_eq!(bytes[bytes.len() - 4], 0x63);
        assert_eq!(bytes[bytes.len() - 1], 0x00);
        let crc = crc16::checksum(&bytes[..bytes.len() - 4]);
        assert_eq!(&bytes[bytes.len() - 3..bytes.len() - 1], &crc.to_be_bytes());
    }

    #[test]
    fn test_known_bytes() {
        let message = make_message("1", 0, 0, MessageKind::CloseRequest, Value::list(vec![Value::Optional]));
        let expected = hex::decode("76023162006200726500000200710163de2a00").unwrap();
        assert_eq!(&message.encode().unwrap()[..], &expected[..]);
        assert_eq!(message.crc16, 0xDE2A);
    }

    #[test]
    fn test_round_trip() {
        let message = make_message("1-1", 0, 0, MessageKind::CloseResponse, Value::list(vec![Value::Optional]));
        let bytes = to_bytes(std::slice::from_ref(&message)).unwrap();
        assert_eq!(decode_messages(&bytes).unwrap(), vec![message]);
    }

    #[test]
    fn test_seal_after_change() {
        let mut message = close_request();
        let before = message.crc16;
        message.group_no = 3;
        assert_eq!(message.seal().unwrap(), message.crc16);
        assert_ne!(message.crc16, before);
        let bytes = message.encode().unwrap();
        assert_eq!(decode_messages(&bytes).unwrap(), vec![message]);
    }

    #[test]
    fn test_from_value_shape_errors() {
        assert!(matches!(Message::from_value(Value::u8(1)), Err(SmlError::TreeShape(_))));

        let mut items = close_request().to_value().into_list().unwrap();
        items[3] = Value::u8(1);
        assert!(matches!(Message::from_value(Value::list(items)), Err(SmlError::TreeShape(_))));

        let mut items = close_request().to_value().into_list().unwrap();
        items[5] = Value::Optional;
        assert!(matches!(Message::from_value(Value::list(items)), Err(SmlError::TreeShape(_))));
    }

    #[test]
    fn test_finalize_crc_requires_placeholder() {
        let mut buffer = [0x72, 0x62, 0x01, 0x62, 0x02];
        assert!(finalize_crc(&mut buffer).is_err());
    }
}
