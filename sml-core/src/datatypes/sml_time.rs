//! SML time values

use crate::datatypes::value::Value;
use crate::error::{SmlError, SmlResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const CHOICE_SEC_INDEX: u8 = 1;
const CHOICE_TIMESTAMP: u8 = 2;
const CHOICE_LOCAL_TIMESTAMP: u8 = 3;

/// Time as carried in SML messages
///
/// On the wire this is a pair `[choice, value]` where the leading
/// discriminator selects the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmlTime {
    /// Seconds since an arbitrary device-specific epoch (usually power-up)
    SecIndex(u32),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
    /// UTC timestamp with local and daylight-saving offsets in minutes
    LocalTimestamp {
        timestamp: DateTime<Utc>,
        local_offset: i16,
        season_offset: i16,
    },
}

impl SmlTime {
    /// Fallback for malformed input: the epoch timestamp
    pub fn zero() -> Self {
        SmlTime::Timestamp(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Build a timestamp from seconds since 1970
    pub fn from_unix(seconds: u32) -> Self {
        SmlTime::Timestamp(Self::datetime(seconds))
    }

    fn datetime(seconds: u32) -> DateTime<Utc> {
        DateTime::from_timestamp(i64::from(seconds), 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    fn seconds(timestamp: &DateTime<Utc>) -> u32 {
        timestamp.timestamp().clamp(0, i64::from(u32::MAX)) as u32
    }

    /// Encode as the `[choice, value]` pair
    pub fn to_value(&self) -> Value {
        match self {
            SmlTime::SecIndex(index) => {
                Value::list(vec![Value::u8(CHOICE_SEC_INDEX), Value::u32(*index)])
            }
            SmlTime::Timestamp(timestamp) => Value::list(vec![
                Value::u8(CHOICE_TIMESTAMP),
                Value::u32(Self::seconds(timestamp)),
            ]),
            SmlTime::LocalTimestamp {
                timestamp,
                local_offset,
                season_offset,
            } => Value::list(vec![
                Value::u8(CHOICE_LOCAL_TIMESTAMP),
                Value::list(vec![
                    Value::u32(Self::seconds(timestamp)),
                    Value::i16(*local_offset),
                    Value::i16(*season_offset),
                ]),
            ]),
        }
    }

    /// Decode from the `[choice, value]` pair
    pub fn from_value(value: &Value) -> SmlResult<Self> {
        let pair = value.expect_list(2, "SML time")?;
        let choice = pair[0]
            .as_u64()
            .and_then(|c| u8::try_from(c).ok())
            .ok_or_else(|| SmlError::ValueCoercion("SML time choice is not numeric".to_string()))?;

        let number = |v: &Value| {
            v.as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| SmlError::ValueCoercion(format!("Not a 32 bit time value: {}", v)))
        };

        match choice {
            CHOICE_SEC_INDEX => Ok(SmlTime::SecIndex(number(&pair[1])?)),
            CHOICE_TIMESTAMP => Ok(SmlTime::Timestamp(Self::datetime(number(&pair[1])?))),
            CHOICE_LOCAL_TIMESTAMP => {
                let local = pair[1].expect_list(3, "local timestamp")?;
                let offset = |v: &Value| {
                    v.as_i64()
                        .and_then(|n| i16::try_from(n).ok())
                        .ok_or_else(|| SmlError::ValueCoercion(format!("Not a time offset: {}", v)))
                };
                Ok(SmlTime::LocalTimestamp {
                    timestamp: Self::datetime(number(&local[0])?),
                    local_offset: offset(&local[1])?,
                    season_offset: offset(&local[2])?,
                })
            }
            other => Err(SmlError::ValueCoercion(format!(
                "Unknown SML time choice: {}",
                other
            ))),
        }
    }
}

impl Default for SmlTime {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for SmlTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmlTime::SecIndex(index) => write!(f, "#{}", index),
            SmlTime::Timestamp(timestamp) => write!(f, "{}", timestamp.format("%Y-%m-%dT%H:%M:%SZ")),
            SmlTime::LocalTimestamp {
                timestamp,
                local_offset,
                season_offset,
            } => write!(
                f,
                "{} ({:+}min, {:+}min)",
                timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
                local_offset,
                season_offset
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sec_index() {
        let time = SmlTime::SecIndex(4711);
        let value = time.to_value();
        assert_eq!(value, Value::list(vec![Value::u8(1), Value::u32(4711)]));
        assert_eq!(SmlTime::from_value(&value).unwrap(), time);
    }

    #[test]
    fn test_timestamp() {
        let time = SmlTime::from_unix(1_600_000_000);
        assert_eq!(time.to_string(), "2020-09-13T12:26:40Z");
        assert_eq!(SmlTime::from_value(&time.to_value()).unwrap(), time);
    }

    #[test]
    fn test_local_timestamp() {
        let time = SmlTime::LocalTimestamp {
            timestamp: DateTime::from_timestamp(1_600_000_000, 0).unwrap(),
            local_offset: 60,
            season_offset: 60,
        };
        assert_eq!(SmlTime::from_value(&time.to_value()).unwrap(), time);
    }

    #[test]
    fn test_invalid_choice() {
        let value = Value::list(vec![Value::u8(9), Value::u32(1)]);
        assert!(SmlTime::from_value(&value).is_err());
        assert!(SmlTime::from_value(&Value::u8(1)).is_err());
    }
}
