//! Simple Binary Encoding (SBE) runtime in Rust
//!
//! Two tightly coupled cores: the flyweight runtime contract observed by
//! generated codecs (zero-copy positional access to packed messages), and an
//! on-the-fly decoder that walks any message against the token stream loaded
//! from a compiled schema IR, emitting events to a
//! [`TokenListener`](listener::TokenListener).

/// Primitive codec: byte-order-aware reads and writes
pub mod bytes;
/// On-the-fly decoder state machine and header decoder
pub mod decode;
/// Type, presence, and value descriptors
pub mod encoding;
/// Runtime support for generated flyweight codecs
pub mod flyweight;
/// IR loader
pub mod ir;
/// JSON listener and printer
pub mod json;
/// Token listener interface
pub mod listener;
/// Text trace listener
pub mod text;
/// IR token definitions
pub mod token;

pub use self::bytes::ByteOrder;
pub use self::decode::{HeaderDecoder, decode};
pub use self::encoding::{Encoding, Presence, PrimitiveType, PrimitiveValue};
pub use self::ir::IrDecoder;
pub use self::json::{JsonPrinter, JsonTokenListener};
pub use self::listener::TokenListener;
pub use self::text::TextTokenListener;
pub use self::token::{Signal, Token};
