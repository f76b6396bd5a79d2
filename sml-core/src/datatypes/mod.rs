//! Data types used in the SML protocol

pub mod value;
pub mod sml_time;
pub mod scaled_value;

// Re-export types
pub use value::Value;
pub use sml_time::SmlTime;
pub use scaled_value::ScaledValue;
