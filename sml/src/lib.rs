//! sml_rs - Rust implementation of the SML metering protocol
//!
//! This library decodes and encodes SML (Smart Message Language), the
//! protocol spoken between electricity meters, gateways and head-end
//! systems.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `sml-core`: Errors, OBIS codes, the value model, time and scaled values
//! - `sml-codec`: CRC16 and the TLV tokenizer, tree decoder and encoder
//! - `sml-session`: Transport framing (escape sequences, padding, trailer CRC)
//! - `sml-application`: Messages, generators, streaming parser, helpers
//! - `sml-readout`: Typed records read from message bodies
//!
//! # Implementation Status
//!
//! ## ✅ 已完成
//! - 传输层帧（版本 1，转义、填充、CRC 校验）
//! - TLV 编码/解码，消息 CRC
//! - 消息生成器（Open/Close/GetList/GetProcParameter/SetProcParameter/Attention）
//! - 读出层（OBIS、时间、缩放值、参数树）
//!
//! ## 📋 待实现
//! - 传输层版本 2（超时、块大小属性）
//!
//! # Usage
//!
//! ```
//! use sml::application::{ParserConfig, RequestGenerator, unpack};
//! use sml::readout::{Body, read_message};
//!
//! let mut generator = RequestGenerator::new(b"client".to_vec());
//! generator.public_open(b"meter", "operator", "secret");
//! generator.public_close();
//! let frame = generator.boxing().unwrap();
//!
//! let unpacked = unpack(&frame, &ParserConfig::default()).unwrap();
//! assert_eq!(unpacked.messages.len(), 2);
//! assert!(matches!(read_message(&unpacked.messages[0]), Ok(Body::OpenRequest(_))));
//! ```

// Re-export core types
pub use sml_core::datatypes::*;
pub use sml_core::{ObisCode, SmlError, SmlResult, units};

// Re-export the codec
pub mod codec {
    pub use sml_codec::*;
}

// Re-export transport framing
pub mod transport {
    pub use sml_session::*;
}

// Re-export the application layer
pub mod application {
    pub use sml_application::*;
}

// Re-export readout records
pub mod readout {
    pub use sml_readout::*;
}
