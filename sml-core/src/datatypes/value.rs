//! Recursive value model of SML trees

use crate::error::{SmlError, SmlResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of a decoded (or to be encoded) SML tree
///
/// Trees are always tree-shaped, so children are owned by value.
/// `Integer` and `Unsigned` remember the number of payload bytes they occupy
/// on the wire (1 to 8), which keeps `decode(encode(v)) == v` exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// The 0x00 byte terminating a message
    EndOfMessage,
    /// An absent optional element (0x01)
    Optional,
    /// Octet string
    Binary(#[serde(with = "serde_bytes")] Vec<u8>),
    Boolean(bool),
    Integer { value: i64, width: u8 },
    Unsigned { value: u64, width: u8 },
    List(Vec<Value>),
}

impl Value {
    /// Create a signed integer occupying `width` bytes
    pub fn new_integer(value: i64, width: u8) -> SmlResult<Self> {
        Self::verify_width(width)?;
        if width < 8 {
            let bits = u32::from(width) * 8;
            let min = -(1i64 << (bits - 1));
            let max = (1i64 << (bits - 1)) - 1;
            if value < min || value > max {
                return Err(SmlError::InvalidData(format!(
                    "Integer {} does not fit into {} bytes",
                    value, width
                )));
            }
        }
        Ok(Value::Integer { value, width })
    }

    /// Create an unsigned integer occupying `width` bytes
    pub fn new_unsigned(value: u64, width: u8) -> SmlResult<Self> {
        Self::verify_width(width)?;
        if width < 8 && value >> (u32::from(width) * 8) != 0 {
            return Err(SmlError::InvalidData(format!(
                "Unsigned {} does not fit into {} bytes",
                value, width
            )));
        }
        Ok(Value::Unsigned { value, width })
    }

    fn verify_width(width: u8) -> SmlResult<()> {
        if (1..=8).contains(&width) {
            Ok(())
        } else {
            Err(SmlError::InvalidData(format!(
                "Integer width must be 1..=8 bytes, got {}",
                width
            )))
        }
    }

    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Binary(bytes.into())
    }

    pub fn boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    pub fn i8(value: i8) -> Self {
        Value::Integer { value: value.into(), width: 1 }
    }

    pub fn i16(value: i16) -> Self {
        Value::Integer { value: value.into(), width: 2 }
    }

    pub fn i32(value: i32) -> Self {
        Value::Integer { value: value.into(), width: 4 }
    }

    pub fn i64(value: i64) -> Self {
        Value::Integer { value, width: 8 }
    }

    pub fn u8(value: u8) -> Self {
        Value::Unsigned { value: value.into(), width: 1 }
    }

    pub fn u16(value: u16) -> Self {
        Value::Unsigned { value: value.into(), width: 2 }
    }

    pub fn u32(value: u32) -> Self {
        Value::Unsigned { value: value.into(), width: 4 }
    }

    pub fn u64(value: u64) -> Self {
        Value::Unsigned { value, width: 8 }
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items)
    }

    /// Empty list
    pub fn empty_list() -> Self {
        Value::List(Vec::new())
    }

    /// Get the octet string, if this is a binary value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get a signed view of a numeric value
    ///
    /// Unsigned values are accepted when they fit.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer { value, .. } => Some(*value),
            Value::Unsigned { value, .. } => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    /// Get an unsigned view of a numeric value
    ///
    /// Non-negative signed values are accepted.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Unsigned { value, .. } => Some(*value),
            Value::Integer { value, .. } => u64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Value::Optional)
    }

    pub fn is_end_of_message(&self) -> bool {
        matches!(self, Value::EndOfMessage)
    }

    /// Name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::EndOfMessage => "EndOfMessage",
            Value::Optional => "Optional",
            Value::Binary(_) => "Binary",
            Value::Boolean(_) => "Boolean",
            Value::Integer { .. } => "Integer",
            Value::Unsigned { .. } => "Unsigned",
            Value::List(_) => "List",
        }
    }

    /// Check a list for an exact element count
    pub fn expect_list(&self, arity: usize, context: &str) -> SmlResult<&[Value]> {
        match self {
            Value::List(items) if items.len() == arity => Ok(items),
            Value::List(items) => Err(SmlError::TreeShape(format!(
                "{}: expected {} elements, got {}",
                context,
                arity,
                items.len()
            ))),
            other => Err(SmlError::TreeShape(format!(
                "{}: expected a list, got {}",
                context,
                other.type_name()
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::EndOfMessage => write!(f, "EOM"),
            Value::Optional => write!(f, "null"),
            Value::Binary(bytes) => {
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer { value, .. } => write!(f, "{}", value),
            Value::Unsigned { value, .. } => write!(f, "{}", value),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_width() {
        assert_eq!(Value::new_integer(-128, 1).unwrap(), Value::i8(-128));
        assert!(Value::new_integer(128, 1).is_err());
        assert!(Value::new_integer(0, 0).is_err());
        assert!(Value::new_integer(0, 9).is_err());
        assert!(Value::new_integer(i64::MIN, 8).is_ok());
    }

    #[test]
    fn test_unsigned_width() {
        assert_eq!(Value::new_unsigned(0xFFFF, 2).unwrap(), Value::u16(0xFFFF));
        assert!(Value::new_unsigned(0x1_0000, 2).is_err());
        assert!(Value::new_unsigned(u64::MAX, 8).is_ok());
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(Value::u32(7).as_i64(), Some(7));
        assert_eq!(Value::i8(-1).as_u64(), None);
        assert_eq!(Value::u64(u64::MAX).as_i64(), None);
        assert_eq!(Value::binary(vec![1]).as_i64(), None);
    }

    #[test]
    fn test_expect_list() {
        let v = Value::list(vec![Value::u8(1), Value::Optional]);
        assert_eq!(v.expect_list(2, "pair").unwrap().len(), 2);
        assert!(matches!(v.expect_list(3, "triple"), Err(SmlError::TreeShape(_))));
        assert!(Value::u8(1).expect_list(1, "x").is_err());
    }

    #[test]
    fn test_display() {
        let v = Value::list(vec![Value::binary(vec![0xAB, 0x01]), Value::i16(-3), Value::Optional]);
        assert_eq!(v.to_string(), "[ab01, -3, null]");
    }
}
