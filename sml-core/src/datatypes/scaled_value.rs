//! Scaled register values
//!
//! A register reading is transmitted as a raw integer together with a scaler
//! (a power of ten) and a unit code.
//!
//! # Usage
//!
//! ```rust
//! use sml_core::{ScaledValue, units};
//!
//! let energy = ScaledValue::new(1234, -2, units::WATT_HOUR);
//! assert_eq!(energy.render(), "12.34");
//! assert_eq!(energy.to_string(), "12.34 Wh");
//! ```

use crate::units;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw value, scaler and unit of a register reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScaledValue {
    /// Raw integer as transmitted
    pub raw: i64,
    /// Scaling factor, the value is `raw * 10^scaler`
    pub scaler: i8,
    /// Unit code (0x1B = W, 0x1E = Wh, ...)
    pub unit: u8,
}

impl ScaledValue {
    pub fn new(raw: i64, scaler: i8, unit: u8) -> Self {
        Self { raw, scaler, unit }
    }

    /// Apply scaling
    pub fn to_f64(&self) -> f64 {
        self.raw as f64 * 10_f64.powi(i32::from(self.scaler))
    }

    /// Render the value as a decimal string without going through floats
    ///
    /// The decimal point is inserted at `digit_count + scaler`. If that
    /// position lies left of the first digit the fraction is zero-padded, a
    /// positive scaler appends zeros. The sign is preserved.
    pub fn render(&self) -> String {
        let digits = self.raw.unsigned_abs().to_string();
        let mut out = String::with_capacity(digits.len() + 4);
        if self.raw < 0 {
            out.push('-');
        }

        let scaler = i32::from(self.scaler);
        if scaler >= 0 {
            out.push_str(&digits);
            if self.raw != 0 {
                out.extend(std::iter::repeat_n('0', scaler as usize));
            }
            return out;
        }

        let point = digits.len() as i32 + scaler;
        if point > 0 {
            let (int_part, frac_part) = digits.split_at(point as usize);
            out.push_str(int_part);
            out.push('.');
            out.push_str(frac_part);
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat_n('0', (-point) as usize));
            out.push_str(&digits);
        }
        out
    }

    /// Unit symbol, empty for unknown codes
    pub fn unit_symbol(&self) -> &'static str {
        units::symbol(self.unit)
    }
}

impl fmt::Display for ScaledValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.unit_symbol();
        if symbol.is_empty() {
            write!(f, "{}", self.render())
        } else {
            write!(f, "{} {}", self.render(), symbol)
        }
    }
}
