//! Unit codes carried next to register values
//!
//! SML reuses the DLMS/COSEM unit table (IEC 62056-62). Only the codes seen
//! in practice get a constant; [`symbol`] knows the full table.

/// No unit
pub const NO_UNIT: u8 = 0x00;
/// Year
pub const YEAR: u8 = 1;
/// Month
pub const MONTH: u8 = 2;
/// Week
pub const WEEK: u8 = 3;
/// Day
pub const DAY: u8 = 4;
/// Hour
pub const HOUR: u8 = 5;
/// Minute
pub const MINUTE: u8 = 6;
/// Second
pub const SECOND: u8 = 7;
/// Degree Celsius (°C)
pub const CELSIUS: u8 = 9;
/// Cubic meter (m³)
pub const CUBIC_METER: u8 = 13;
/// Cubic meter per hour (m³/h)
pub const CUBIC_METER_PER_HOUR: u8 = 15;
/// Liter (l)
pub const LITER: u8 = 19;
/// Watt (W)
pub const WATT: u8 = 0x1B;
/// Volt-ampere (VA)
pub const VOLT_AMPERE: u8 = 0x1C;
/// Var
pub const VAR: u8 = 0x1D;
/// Watt-hour (Wh)
pub const WATT_HOUR: u8 = 0x1E;
/// Volt-ampere-hour (VAh)
pub const VOLT_AMPERE_HOUR: u8 = 0x1F;
/// Var-hour (varh)
pub const VAR_HOUR: u8 = 0x20;
/// Ampere (A)
pub const AMPERE: u8 = 0x21;
/// Volt (V)
pub const VOLT: u8 = 0x23;
/// Hertz (Hz)
pub const HERTZ: u8 = 0x2C;
/// Kelvin (K)
pub const KELVIN: u8 = 0x34;
/// Percent (%)
pub const PERCENT: u8 = 0x38;
/// Other unit
pub const OTHER_UNIT: u8 = 0xFE;
/// No unit, unitless count
pub const COUNT: u8 = 0xFF;

/// Get the symbol of a unit code
///
/// Unknown codes render as an empty string.
pub fn symbol(unit: u8) -> &'static str {
    match unit {
        1 => "a",
        2 => "mo",
        3 => "wk",
        4 => "d",
        5 => "h",
        6 => "min",
        7 => "s",
        8 => "°",
        9 => "°C",
        10 => "currency",
        11 => "m",
        12 => "m/s",
        13 => "m³",
        14 => "m³",
        15 => "m³/h",
        16 => "m³/h",
        17 => "m³/d",
        18 => "m³/d",
        19 => "l",
        20 => "kg",
        21 => "N",
        22 => "Nm",
        23 => "Pa",
        24 => "bar",
        25 => "J",
        26 => "J/h",
        27 => "W",
        28 => "VA",
        29 => "var",
        30 => "Wh",
        31 => "VAh",
        32 => "varh",
        33 => "A",
        34 => "C",
        35 => "V",
        36 => "V/m",
        37 => "F",
        38 => "Ω",
        39 => "Ωm²/m",
        40 => "Wb",
        41 => "T",
        42 => "A/m",
        43 => "H",
        44 => "Hz",
        45 => "1/(Wh)",
        46 => "1/(varh)",
        47 => "1/(VAh)",
        48 => "V²h",
        49 => "A²h",
        50 => "kg/s",
        51 => "S",
        52 => "K",
        53 => "1/(V²h)",
        54 => "1/(A²h)",
        55 => "1/m³",
        56 => "%",
        57 => "Ah",
        60 => "Wh/m³",
        61 => "J/m³",
        62 => "Mol%",
        63 => "g/m³",
        64 => "Pa s",
        254 => "other",
        255 => "count",
        _ => "",
    }
}
