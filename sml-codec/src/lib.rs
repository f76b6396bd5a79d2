//! TLV processing for the SML protocol
//!
//! This crate turns raw SML bytes into [`Value`](sml_core::Value) trees and
//! back:
//!
//! - [`crc16`]: CRC-16/X.25 as pure `state -> state` functions
//! - [`tlv::Tokenizer`]: bytes to typed tokens, with a running CRC
//! - [`tlv::TreeDecoder`]: tokens to completed value trees
//! - [`tlv::TlvDecoder`]: tokenizer and tree decoder driven together
//! - [`tlv::TlvEncoder`]: value trees to bytes

pub mod crc16;
pub mod tlv;

pub use sml_core::{SmlError, SmlResult};
pub use tlv::{Decoded, TlvDecoder, TlvEncoder, TlvType, Token, Tokenizer, TreeDecoder};
