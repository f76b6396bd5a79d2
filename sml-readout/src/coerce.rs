//! Lenient value coercions
//!
//! Meters in the field produce slightly malformed trees often enough that a
//! single odd slot must not spoil a whole readout. These functions never
//! fail: wrong-shaped input yields a fixed default and a `debug` log line.
//!
//! | Target      | Default                      |
//! |-------------|------------------------------|
//! | `ObisCode`  | all-zero code                |
//! | `SmlTime`   | epoch timestamp              |
//! | `String`    | empty string                 |
//! | integers    | 0                            |

use chrono::{DateTime, Utc};
use sml_core::{ObisCode, SmlTime, Value};

/// OBIS code from a 6 byte octet string
pub fn to_obis(value: &Value) -> ObisCode {
    match value {
        Value::Binary(bytes) => match ObisCode::try_from_slice(bytes) {
            Ok(code) => code,
            Err(e) => {
                log::debug!("{}, using zero OBIS code", e);
                ObisCode::zero()
            }
        },
        Value::Optional => ObisCode::zero(),
        other => {
            log::debug!("{} is not an OBIS code", other.type_name());
            ObisCode::zero()
        }
    }
}

/// Optional OBIS code: absent slots stay absent
pub fn to_obis_opt(value: &Value) -> Option<ObisCode> {
    if value.is_optional() {
        None
    } else {
        Some(to_obis(value))
    }
}

/// List of OBIS codes, as used by parameter tree paths
pub fn to_obis_path(value: &Value) -> Vec<ObisCode> {
    match value {
        Value::List(items) => items.iter().map(to_obis).collect(),
        Value::Optional => Vec::new(),
        other => {
            log::debug!("{} is not an OBIS path", other.type_name());
            Vec::new()
        }
    }
}

pub fn to_sml_time(value: &Value) -> SmlTime {
    SmlTime::from_value(value).unwrap_or_else(|e| {
        log::debug!("{}, using zero time", e);
        SmlTime::zero()
    })
}

pub fn to_sml_time_opt(value: &Value) -> Option<SmlTime> {
    if value.is_optional() {
        None
    } else {
        Some(to_sml_time(value))
    }
}

/// UTC time of an SML time value; second indices have no calendar time
pub fn to_datetime(time: &SmlTime) -> Option<DateTime<Utc>> {
    match time {
        SmlTime::SecIndex(_) => None,
        SmlTime::Timestamp(timestamp) => Some(*timestamp),
        SmlTime::LocalTimestamp { timestamp, .. } => Some(*timestamp),
    }
}

/// Text from an octet string (lossy UTF-8) or a number
pub fn to_string(value: &Value) -> String {
    match value {
        Value::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::Optional => String::new(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer { value, .. } => value.to_string(),
        Value::Unsigned { value, .. } => value.to_string(),
        other => {
            log::debug!("{} has no text representation", other.type_name());
            String::new()
        }
    }
}

/// Raw bytes of an octet string
pub fn to_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::Binary(bytes) => bytes.clone(),
        Value::Optional => Vec::new(),
        other => {
            log::debug!("{} is not an octet string", other.type_name());
            Vec::new()
        }
    }
}

fn to_number<T: TryFrom<i64> + TryFrom<u64> + Default>(value: &Value, name: &str) -> T {
    let converted = match value {
        Value::Integer { value, .. } => <T as TryFrom<i64>>::try_from(*value).ok(),
        Value::Unsigned { value, .. } => <T as TryFrom<u64>>::try_from(*value).ok(),
        Value::Optional => return T::default(),
        _ => None,
    };
    converted.unwrap_or_else(|| {
        log::debug!("{} is not a valid {}", value, name);
        T::default()
    })
}

pub fn to_u8(value: &Value) -> u8 {
    to_number(value, "u8")
}

pub fn to_u16(value: &Value) -> u16 {
    to_number(value, "u16")
}

pub fn to_u32(value: &Value) -> u32 {
    to_number(value, "u32")
}

pub fn to_u64(value: &Value) -> u64 {
    to_number(value, "u64")
}

pub fn to_i8(value: &Value) -> i8 {
    to_number(value, "i8")
}

pub fn to_i64(value: &Value) -> i64 {
    to_number(value, "i64")
}

/// Optional boolean
pub fn to_bool_opt(value: &Value) -> Option<bool> {
    value.as_bool()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obis_leniency() {
        let code = to_obis(&Value::binary(vec![1, 0, 1, 8, 0, 255]));
        assert_eq!(code, ObisCode::new(1, 0, 1, 8, 0, 255));
        assert!(to_obis(&Value::binary(vec![1, 0, 1, 8, 0])).is_zero());
        assert!(to_obis(&Value::u8(1)).is_zero());
        assert_eq!(to_obis_opt(&Value::Optional), None);
    }

    #[test]
    fn test_time_leniency() {
        let time = Value::list(vec![Value::u8(1), Value::u32(4711)]);
        assert_eq!(to_sml_time(&time), SmlTime::SecIndex(4711));
        assert_eq!(to_sml_time(&Value::u8(3)), SmlTime::zero());
        assert_eq!(to_datetime(&SmlTime::SecIndex(1)), None);
        assert_eq!(to_datetime(&SmlTime::from_unix(60)).map(|t| t.timestamp()), Some(60));
    }

    #[test]
    fn test_string_and_numbers() {
        assert_eq!(to_string(&Value::binary(b"EMH".to_vec())), "EMH");
        assert_eq!(to_string(&Value::u16(300)), "300");
        assert_eq!(to_string(&Value::empty_list()), "");
        assert_eq!(to_u8(&Value::u16(300)), 0);
        assert_eq!(to_u8(&Value::u16(30)), 30);
        assert_eq!(to_i8(&Value::i8(-1)), -1);
        assert_eq!(to_i8(&Value::u8(200)), 0);
        assert_eq!(to_u64(&Value::i8(-1)), 0);
        assert_eq!(to_i64(&Value::binary(vec![1])), 0);
    }
}
