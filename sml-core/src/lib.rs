//! Core types and utilities for the SML metering protocol
//!
//! This crate provides the shared vocabulary of every layer: the error
//! taxonomy, OBIS codes, the recursive value model, time values and scaled
//! register values.

pub mod error;
pub mod obis_code;
pub mod datatypes;
pub mod units;

pub use error::{SmlError, SmlResult};
pub use obis_code::ObisCode;
pub use datatypes::*;
