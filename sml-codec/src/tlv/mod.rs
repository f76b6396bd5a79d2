//! SML TLV encoding/decoding module

pub mod types;
pub mod tokenizer;
pub mod tree;
pub mod decoder;
pub mod encoder;

pub use types::{TlvType, Token};
pub use tokenizer::Tokenizer;
pub use tree::TreeDecoder;
pub use decoder::{Decoded, TlvDecoder};
pub use encoder::TlvEncoder;
