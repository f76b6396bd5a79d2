//! Value normalization
//!
//! Turns the raw value of a register into the string a back-end stores.
//! Numbers are scaled by inserting a decimal point (no float round trip);
//! identifier-like registers are coerced to text.

use sml_core::obis_code::codes::is_string_typed;
use sml_core::{ObisCode, ScaledValue, Value, units};

/// Render the raw value of register `code`
///
/// ```
/// use sml_core::{ObisCode, Value, units};
/// use sml_readout::normalize_value;
///
/// let code = ObisCode::new(1, 0, 1, 8, 0, 255);
/// assert_eq!(normalize_value(&code, -1, units::WATT_HOUR, &Value::u32(123456)), "12345.6");
/// ```
pub fn normalize_value(code: &ObisCode, scaler: i8, unit: u8, raw: &Value) -> String {
    log::trace!("normalize {} (scaler {}, unit {:?})", code, scaler, units::symbol(unit));

    if is_string_typed(code) {
        return identifier(raw);
    }

    match raw {
        Value::Integer { value, .. } => ScaledValue::new(*value, scaler, unit).render(),
        Value::Unsigned { value, .. } => match i64::try_from(*value) {
            Ok(value) => ScaledValue::new(value, scaler, unit).render(),
            Err(_) => {
                log::debug!("{} exceeds the scalable range, scaler ignored", value);
                value.to_string()
            }
        },
        Value::Boolean(b) => b.to_string(),
        Value::Binary(_) => identifier(raw),
        Value::Optional => String::new(),
        other => {
            log::debug!("cannot normalize {} of {}", other.type_name(), code);
            String::new()
        }
    }
}

/// Printable ASCII stays text, anything else becomes hex
fn identifier(raw: &Value) -> String {
    match raw {
        Value::Binary(bytes) if bytes.iter().all(|b| (0x20..0x7F).contains(b)) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
        Value::Binary(bytes) => bytes.iter().map(|b| format!("{:02x}", b)).collect(),
        other => crate::coerce::to_string(other),
    }
}
