//! Application layer for the SML protocol
//!
//! This crate works on whole messages:
//!
//! - [`message`]: the message envelope, serialization with CRCs and framing
//! - [`generator`]: builders for message bodies and complete request/response files
//! - [`parser`]: streaming parser from raw bytes to messages
//! - [`trx`]: transaction id generator
//! - [`status`]: device status word
//! - [`attention`]: attention codes
//! - [`config`]: parser and generator configuration
//!
//! # Example
//!
//! ```
//! use sml_application::{MessageKind, ParserConfig, make_message, pack, unpack};
//! use sml_core::Value;
//!
//! let close = make_message("4711-1", 0, 0, MessageKind::CloseResponse, Value::list(vec![Value::Optional]));
//! let frame = pack(&[close.clone()]).unwrap();
//! let unpacked = unpack(&frame, &ParserConfig::default()).unwrap();
//! assert_eq!(unpacked.messages, vec![close]);
//! ```

pub mod attention;
pub mod config;
pub mod generator;
pub mod message;
pub mod parser;
pub mod status;
pub mod trx;

pub use attention::AttentionCode;
pub use config::{ParserConfig, TrxConfig};
pub use generator::{RequestGenerator, ResponseGenerator};
pub use message::{Message, MessageKind, decode_messages, finalize_crc, make_message, pack, to_bytes};
pub use parser::{Collector, FnHandler, MessageHandler, Parser, Unpacked, unpack};
pub use status::StatusWord;
pub use trx::TrxGenerator;
