//! QXP protocol core implementation
//!
//! This module provides the wire format, the packet model, and the codec for
//! QXP. A packet on the wire is the concatenation of four parts:
//!
//! ```text
//! packet := head neck body tail
//! head   := '{"hk":0,' <fields> '}' CR LF CR LF
//! neck   := <neck_length bytes>      (empty under the nada strategy)
//! body   := <body_length bytes>      (json text when body kind is json)
//! tail   := <tail_length bytes>      (empty under the nada strategy)
//! ```
//!
//! Head fields use two-character tags and are elided when equal to their
//! defaults. The head length field is a two-hex-digit string patched in
//! place once the serialized length is known. A packed single-byte flags
//! field is reserved for a future head revision and is not emitted.

mod error;
mod fields;
mod kinds;
mod pack;
mod packet;
mod parse;
mod strategy;

pub use error::{Fault, FrameError, Stage};
pub use fields::{Elide, FieldSpec, HEAD_FIELDS, fill_missing};
pub use kinds::{BodyKind, HeadKind, NeckKind, PacketKind, ServiceKind, TailKind};
pub use pack::pack;
pub use packet::{Body, Head, Meta, Neck, Packet, Payload, Tail};
pub use parse::{Hooks, VerifyBody, VouchHead, parse, parse_with};
pub use strategy::{
    BodyStrategy, Codec, NeckStrategy, TailStrategy, body_strategy, neck_strategy, tail_strategy,
};

/// Maximum serialized head length in bytes, terminator included.
pub const MAX_HEAD_LEN: usize = 255;

/// Head terminator: CR LF CR LF.
pub const HEAD_END: &[u8] = b"\r\n\r\n";

/// Leading marker of a json head. The head kind tag is always emitted first
/// with the json wire code, so the prefix is a fixed byte sequence.
pub const HEAD_SIGNATURE: &[u8] = b"{\"hk\":0,";

/// Byte offset of the two-hex-digit head length placeholder. The length tag
/// is emitted second, directly after the fixed signature, which pins its
/// value digits to this offset.
pub(crate) const HEAD_LEN_OFFSET: usize = HEAD_SIGNATURE.len() + 6;

/// Default port for both endpoints of a link.
pub const DEFAULT_PORT: u16 = 7530;

/// Default destination host address.
pub const DEFAULT_DEST_HOST: &str = "127.0.0.1";

/// Wire protocol revision carried in the version field.
pub const WIRE_VERSION: u64 = 0;

/// Human-readable name of [`WIRE_VERSION`].
pub const WIRE_VERSION_NAME: &str = "0.1";
