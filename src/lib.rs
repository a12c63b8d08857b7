//! QXP (Quad eXchange Protocol) - compact self-describing packet framing for point-to-point endpoints
//!
//! This library provides the wire-format codec for the QXP protocol. A
//! logical packet is four ordered parts (head, neck, body, tail) plus
//! transient meta bookkeeping; the codec serializes that structure into one
//! contiguous byte stream and parses an arbitrary received stream back,
//! reporting malformed or unrecognized input as recorded faults instead of
//! failing hard.
//!
//! # Quick Start
//!
//! ```rust
//! use qxp::{pack, parse, BodyKind, Packet, Payload, ServiceKind};
//!
//! // Build and pack an outbound packet
//! let mut outbound = Packet::default();
//! outbound.meta.body_kind = BodyKind::Json;
//! outbound.head.service_kind = ServiceKind::Ackretry;
//! outbound.body.value = Payload::Data(
//!     [("a".to_string(), serde_json::json!(1))].into_iter().collect(),
//! );
//! let wire = pack(&mut outbound).expect("head fits in one frame");
//!
//! // Parse it back on the receive side
//! let mut inbound = Packet::inbound(wire);
//! let remainder = parse(&mut inbound).expect("accepted by both checkpoints");
//! assert!(remainder.is_empty());
//! assert!(inbound.meta.is_clean());
//! assert_eq!(inbound.head.service_kind, ServiceKind::Ackretry);
//! ```
//!
//! # Design
//!
//! - **Self-describing head** - json with two-character field tags; fields
//!   equal to their defaults are elided, and the head's own length is patched
//!   into a fixed-width placeholder after serialization.
//! - **Kind-dispatched parts** - neck, body, and tail codecs are selected
//!   through static strategy tables keyed by kind code; unregistered kinds
//!   degrade to a recorded fault, never a panic.
//! - **Best-effort pipeline** - stage faults accumulate on [`Meta`]; only an
//!   unframeable head or a rejected checkpoint stops a call early.
//!
//! Transport I/O, session management, and concrete signature/checksum
//! algorithms live outside this crate; the codec only defines their
//! dispatch points.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod protocol;

pub use protocol::{
    Body, BodyKind, Elide, Fault, FieldSpec, FrameError, Head, HeadKind, Hooks, Meta, Neck,
    NeckKind, Packet, PacketKind, Payload, ServiceKind, Stage, Tail, TailKind, DEFAULT_DEST_HOST,
    DEFAULT_PORT, MAX_HEAD_LEN, WIRE_VERSION, pack, parse, parse_with,
};
