//! Parser: deserializes a raw wire buffer back into a packet
//!
//! The buffer is consumed part by part: head, neck, vouch checkpoint,
//! body, tail, verify checkpoint. Stages run best-effort and record faults
//! as they go; only an unframeable head or a rejected checkpoint stops a
//! call early. Whatever is left of the buffer afterwards belongs to the
//! caller, normally a following packet's bytes or nothing.

use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::trace;

use super::error::{FrameError, Stage};
use super::fields::fill_missing;
use super::kinds::{BodyKind, HeadKind, NeckKind, TailKind};
use super::packet::{Body, Head, Meta, Neck, Packet, Tail};
use super::strategy::{Codec, body_strategy, neck_strategy, tail_strategy};
use super::{HEAD_END, HEAD_SIGNATURE};

/// Authentication predicate: vouches for the parsed head using the neck
/// contents. May record a fault on rejection; the parser trusts the
/// returned bool as final.
pub type VouchHead = fn(meta: &mut Meta, head: &Head, neck: &Neck) -> bool;

/// Integrity predicate: verifies the parsed body using the tail contents.
/// May record a fault on rejection; the parser trusts the returned bool as
/// final.
pub type VerifyBody = fn(meta: &mut Meta, body: &Body, tail: &Tail) -> bool;

/// Injectable validation checkpoints for the parse pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Hooks {
    /// Authenticates the head after the neck is parsed.
    pub vouch_head: VouchHead,
    /// Integrity-checks the body after the tail is parsed.
    pub verify_body: VerifyBody,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            vouch_head: accept_head,
            verify_body: accept_body,
        }
    }
}

fn accept_head(_meta: &mut Meta, _head: &Head, _neck: &Neck) -> bool {
    true
}

fn accept_body(_meta: &mut Meta, _body: &Body, _tail: &Tail) -> bool {
    true
}

/// Parses `packet.pack` with accept-all checkpoints.
///
/// Returns the unconsumed remainder of the buffer, or `None` when a
/// checkpoint rejected the packet and nothing in it may be trusted.
pub fn parse(packet: &mut Packet) -> Option<Bytes> {
    parse_with(packet, &Hooks::default())
}

/// Parses `packet.pack` with injected checkpoints, populating the packet
/// in place and recording stage faults on `packet.meta`.
pub fn parse_with(packet: &mut Packet, hooks: &Hooks) -> Option<Bytes> {
    packet.meta.clear_faults();
    let mut rest = packet.pack.clone();

    if !parse_head(&mut rest, &mut packet.meta, &mut packet.head) {
        // a packet with no recognizable head cannot be framed at all
        return Some(rest);
    }
    parse_neck(&mut rest, &mut packet.meta, &mut packet.neck);
    if !(hooks.vouch_head)(&mut packet.meta, &packet.head, &packet.neck) {
        trace!("vouch checkpoint rejected packet");
        return None;
    }
    parse_body(&mut rest, &mut packet.meta, &mut packet.body);
    parse_tail(&mut rest, &mut packet.meta, &mut packet.tail);
    if !(hooks.verify_body)(&mut packet.meta, &packet.body, &packet.tail) {
        trace!("verify checkpoint rejected packet");
        return None;
    }
    Some(rest)
}

/// Splits the framed head off the buffer. Returns false when the framing
/// markers are absent, which ends the parse attempt.
fn parse_head(rest: &mut Bytes, meta: &mut Meta, head: &mut Head) -> bool {
    let end = match find_head_end(rest) {
        Some(end) if rest.starts_with(HEAD_SIGNATURE) => end,
        _ => {
            meta.head_length = 0;
            meta.head_kind = HeadKind::Unknown;
            meta.record(Stage::Head, FrameError::UnrecognizableHead);
            return false;
        }
    };

    meta.head_kind = HeadKind::Json;
    let framed = rest.split_to(end + HEAD_END.len());
    meta.head_length = framed.len();

    match serde_json::from_slice::<Map<String, Value>>(&framed[..end]) {
        Ok(mut kit) => {
            fill_missing(&mut kit, &Head::default());
            head.apply_kit(&kit);
        }
        Err(err) => {
            meta.record(
                Stage::Head,
                FrameError::MalformedHead {
                    reason: err.to_string(),
                },
            );
        }
    }
    head.pack = framed;

    if head.length != meta.head_length {
        meta.record(
            Stage::Head,
            FrameError::HeadLengthMismatch {
                declared: head.length,
                actual: meta.head_length,
            },
        );
    }
    if head.kind != meta.head_kind {
        meta.record(
            Stage::Head,
            FrameError::HeadKindMismatch {
                declared: head.kind.code(),
                detected: meta.head_kind.code(),
            },
        );
    }

    // the working copies follow the parsed head from here on
    meta.neck_kind = head.neck_kind;
    meta.body_kind = head.body_kind;
    meta.tail_kind = head.tail_kind;
    meta.neck_length = head.neck_length;
    meta.body_length = head.body_length;
    meta.tail_length = head.tail_length;

    trace!(length = meta.head_length, "parsed head");
    true
}

fn parse_neck(rest: &mut Bytes, meta: &mut Meta, neck: &mut Neck) {
    let take = meta.neck_length.min(rest.len());
    neck.pack = rest.split_to(take);
    meta.neck_length = neck.pack.len();

    match neck_strategy(meta.neck_kind).map(|strategy| &strategy.decode) {
        Some(Codec::Implemented(decode)) => {
            if let Err(error) = decode(&neck.pack) {
                meta.record(Stage::Neck, error);
            }
        }
        _ => {
            meta.record(
                Stage::Neck,
                FrameError::UnrecognizedKind {
                    code: meta.neck_kind.code(),
                },
            );
            meta.neck_length = 0;
            meta.neck_kind = NeckKind::Unknown;
        }
    }
    trace!(length = neck.pack.len(), "parsed neck");
}

fn parse_body(rest: &mut Bytes, meta: &mut Meta, body: &mut Body) {
    let take = meta.body_length.min(rest.len());
    body.pack = rest.split_to(take);
    meta.body_length = body.pack.len();

    match body_strategy(meta.body_kind).map(|strategy| &strategy.decode) {
        Some(Codec::Implemented(decode)) => {
            if !body.pack.is_empty() {
                match decode(&body.pack) {
                    Ok(value) => body.value = value,
                    Err(error) => meta.record(Stage::Body, error),
                }
            }
        }
        _ => {
            meta.record(
                Stage::Body,
                FrameError::UnrecognizedKind {
                    code: meta.body_kind.code(),
                },
            );
            meta.body_length = 0;
            meta.body_kind = BodyKind::Unknown;
        }
    }
    trace!(length = body.pack.len(), "parsed body");
}

fn parse_tail(rest: &mut Bytes, meta: &mut Meta, tail: &mut Tail) {
    let take = meta.tail_length.min(rest.len());
    tail.pack = rest.split_to(take);
    meta.tail_length = tail.pack.len();

    match tail_strategy(meta.tail_kind).map(|strategy| &strategy.decode) {
        Some(Codec::Implemented(decode)) => {
            if let Err(error) = decode(&tail.pack) {
                meta.record(Stage::Tail, error);
            }
        }
        _ => {
            meta.record(
                Stage::Tail,
                FrameError::UnrecognizedKind {
                    code: meta.tail_kind.code(),
                },
            );
            meta.tail_length = 0;
            meta.tail_kind = TailKind::Unknown;
        }
    }
    trace!(length = tail.pack.len(), "parsed tail");
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_END.len()).position(|window| window == HEAD_END)
}
