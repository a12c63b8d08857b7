//! Packer: serializes a packet into its wire form
//!
//! Parts pack in dependency order. Body and tail go first because the head
//! carries their lengths; the head must be finalized, length patch
//! included, before the neck signs it. Signing an unfinalized head would
//! authenticate the wrong length field.

use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::trace;

use super::error::{FrameError, Stage};
use super::fields::{Elide, HEAD_FIELDS};
use super::kinds::{BodyKind, HeadKind, NeckKind, TailKind};
use super::packet::{Body, Head, Meta, Neck, Packet, Tail};
use super::strategy::{Codec, body_strategy, neck_strategy, tail_strategy};
use super::{HEAD_END, HEAD_LEN_OFFSET, MAX_HEAD_LEN};

const HEAD_LEN_PLACEHOLDER: &str = "00";

/// Serializes `packet` into its wire form, stores it in `packet.pack`, and
/// returns it.
///
/// Returns `None` when the head cannot be finalized; no partial packet is
/// produced and nothing must be sent. Unrecognized body or tail kinds are
/// non-terminal: the fault is recorded and a degraded packet with that part
/// empty is still emitted.
pub fn pack(packet: &mut Packet) -> Option<Bytes> {
    packet.meta.clear_faults();

    pack_body(&mut packet.meta, &mut packet.body);
    pack_tail(&mut packet.meta, &packet.body, &mut packet.tail);
    if !pack_head(&mut packet.meta, &mut packet.head) {
        packet.pack = Bytes::new();
        return None;
    }
    pack_neck(&mut packet.meta, &packet.head, &mut packet.neck);

    let mut wire = Vec::with_capacity(
        packet.head.pack.len()
            + packet.neck.pack.len()
            + packet.body.pack.len()
            + packet.tail.pack.len(),
    );
    wire.extend_from_slice(&packet.head.pack);
    wire.extend_from_slice(&packet.neck.pack);
    wire.extend_from_slice(&packet.body.pack);
    wire.extend_from_slice(&packet.tail.pack);
    packet.pack = Bytes::from(wire);
    trace!(length = packet.pack.len(), "packed packet");
    Some(packet.pack.clone())
}

fn pack_body(meta: &mut Meta, body: &mut Body) {
    body.pack = Bytes::new();
    match body_strategy(meta.body_kind).map(|strategy| &strategy.encode) {
        Some(Codec::Implemented(encode)) => match encode(&body.value) {
            Ok(packed) => body.pack = Bytes::from(packed),
            Err(error) => meta.record(Stage::Body, error),
        },
        _ => {
            meta.record(
                Stage::Body,
                FrameError::UnrecognizedKind {
                    code: meta.body_kind.code(),
                },
            );
            meta.body_kind = BodyKind::Unknown;
        }
    }
    meta.body_length = body.pack.len();
    trace!(length = meta.body_length, "packed body");
}

fn pack_tail(meta: &mut Meta, body: &Body, tail: &mut Tail) {
    tail.pack = Bytes::new();
    match tail_strategy(meta.tail_kind).map(|strategy| &strategy.encode) {
        Some(Codec::Implemented(encode)) => match encode(&body.pack) {
            Ok(packed) => tail.pack = Bytes::from(packed),
            Err(error) => meta.record(Stage::Tail, error),
        },
        _ => {
            meta.record(
                Stage::Tail,
                FrameError::UnrecognizedKind {
                    code: meta.tail_kind.code(),
                },
            );
            meta.tail_kind = TailKind::Unknown;
        }
    }
    meta.tail_length = tail.pack.len();
    trace!(length = meta.tail_length, "packed tail");
}

/// Serializes the head. Returns false when the head could not be finalized,
/// which is terminal for the whole pack attempt.
fn pack_head(meta: &mut Meta, head: &mut Head) -> bool {
    head.pack = Bytes::new();

    // the head's part copies are derived from meta, written once here
    head.neck_kind = meta.neck_kind;
    head.body_kind = meta.body_kind;
    head.tail_kind = meta.tail_kind;
    head.neck_length = meta.neck_length;
    head.body_length = meta.body_length;
    head.tail_length = meta.tail_length;

    if head.kind != HeadKind::Json {
        meta.record(
            Stage::Head,
            FrameError::UnrecognizedKind {
                code: head.kind.code(),
            },
        );
        meta.head_length = 0;
        return false;
    }

    let kit = emitted_kit(head);
    let mut packed = serde_json::to_string(&kit)
        .expect("head kit serializes to json")
        .into_bytes();
    packed.extend_from_slice(HEAD_END);

    let length = packed.len();
    if length > MAX_HEAD_LEN {
        meta.record(
            Stage::Head,
            FrameError::HeadTooLong {
                length,
                max: MAX_HEAD_LEN,
            },
        );
        meta.head_length = 0;
        return false;
    }

    head.length = length;
    meta.head_length = length;

    // patch the true length over the fixed-width placeholder
    debug_assert_eq!(
        &packed[HEAD_LEN_OFFSET..HEAD_LEN_OFFSET + 2],
        HEAD_LEN_PLACEHOLDER.as_bytes()
    );
    packed[HEAD_LEN_OFFSET..HEAD_LEN_OFFSET + 2].copy_from_slice(&hex_digits(length));

    head.pack = Bytes::from(packed);
    trace!(length, "packed head");
    true
}

fn pack_neck(meta: &mut Meta, head: &Head, neck: &mut Neck) {
    neck.pack = Bytes::new();
    match neck_strategy(meta.neck_kind).map(|strategy| &strategy.encode) {
        Some(Codec::Implemented(encode)) => match encode(&head.pack) {
            Ok(packed) => neck.pack = Bytes::from(packed),
            Err(error) => meta.record(Stage::Neck, error),
        },
        _ => {
            meta.record(
                Stage::Neck,
                FrameError::UnrecognizedKind {
                    code: meta.neck_kind.code(),
                },
            );
            meta.neck_kind = NeckKind::Unknown;
        }
    }
    meta.neck_length = neck.pack.len();
    trace!(length = meta.neck_length, "packed neck");
}

/// Builds the emitted field set: mandatory fields always, elidable fields
/// only when they differ from their defaults, and the length placeholder in
/// the length field's slot.
fn emitted_kit(head: &Head) -> Map<String, Value> {
    let defaults = Head::default();
    let mut kit = Map::new();
    for spec in &HEAD_FIELDS {
        if spec.tag == "hl" {
            kit.insert(
                spec.tag.to_string(),
                Value::String(HEAD_LEN_PLACEHOLDER.to_string()),
            );
            continue;
        }
        let value = head.wire_value(spec.tag);
        if spec.elide == Elide::Never || value != defaults.wire_value(spec.tag) {
            kit.insert(spec.tag.to_string(), value);
        }
    }
    kit
}

/// Two lowercase hex digits of the low byte of `length`.
fn hex_digits(length: usize) -> [u8; 2] {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    [DIGITS[(length >> 4) & 0xf], DIGITS[length & 0xf]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Payload;
    use serde_json::json;

    fn json_packet() -> Packet {
        let mut packet = Packet::default();
        packet.meta.body_kind = BodyKind::Json;
        let mut data = Map::new();
        data.insert("a".to_string(), json!(1));
        packet.body.value = Payload::Data(data);
        packet
    }

    #[test]
    fn test_lengths_are_self_consistent() {
        let mut packet = json_packet();
        let wire = pack(&mut packet).unwrap();

        assert_eq!(packet.meta.head_length, packet.head.pack.len());
        assert_eq!(packet.meta.neck_length, packet.neck.pack.len());
        assert_eq!(packet.meta.body_length, packet.body.pack.len());
        assert_eq!(packet.meta.tail_length, packet.tail.pack.len());
        assert_eq!(
            wire.len(),
            packet.head.pack.len() + packet.body.pack.len()
        );
        assert!(packet.meta.is_clean());
    }

    #[test]
    fn test_length_patch_matches_packed_head() {
        let mut packet = json_packet();
        packet.head.session_id = 12345;
        pack(&mut packet).unwrap();

        let digits = &packet.head.pack[HEAD_LEN_OFFSET..HEAD_LEN_OFFSET + 2];
        let declared =
            usize::from_str_radix(std::str::from_utf8(digits).unwrap(), 16).unwrap();
        assert_eq!(declared, packet.head.pack.len());
        assert_eq!(packet.head.length, packet.head.pack.len());
    }

    #[test]
    fn test_default_fields_are_elided() {
        let mut packet = json_packet();
        pack(&mut packet).unwrap();

        let head = packet.head.pack.clone();
        // defaulted elidable fields stay off the wire
        assert!(!contains(&head, b"\"si\""));
        assert!(!contains(&head, b"\"sc\""));
        assert!(!contains(&head, b"\"vn\""));
        assert!(!contains(&head, b"\"nk\""));
        // mandatory fields are emitted even at their defaults
        assert!(contains(&head, b"\"sd\":0"));
        assert!(contains(&head, b"\"dd\":0"));
        assert!(contains(&head, b"\"pk\":0"));
    }

    #[test]
    fn test_non_default_fields_are_emitted() {
        let mut packet = json_packet();
        packet.head.session_id = 9;
        packet.head.segment_count = 4;
        packet.head.pending = true;
        pack(&mut packet).unwrap();

        let head = packet.head.pack.clone();
        assert!(contains(&head, b"\"si\":9"));
        assert!(contains(&head, b"\"sc\":4"));
        assert!(contains(&head, b"\"pf\":1"));
    }

    #[test]
    fn test_head_starts_with_signature_and_ends_with_marker() {
        let mut packet = json_packet();
        pack(&mut packet).unwrap();
        assert!(packet.head.pack.starts_with(crate::protocol::HEAD_SIGNATURE));
        assert!(packet.head.pack.ends_with(HEAD_END));
    }

    #[test]
    fn test_nada_body_packs_empty_without_fault() {
        let mut packet = Packet::default();
        let wire = pack(&mut packet).unwrap();

        assert_eq!(packet.meta.body_length, 0);
        assert!(packet.body.pack.is_empty());
        assert_eq!(wire.len(), packet.head.pack.len());
        assert!(packet.meta.is_clean());
    }

    #[test]
    fn test_unregistered_body_kind_degrades() {
        let mut packet = Packet::default();
        packet.meta.body_kind = BodyKind::Binary;
        let wire = pack(&mut packet);

        assert!(wire.is_some());
        assert_eq!(packet.meta.body_kind, BodyKind::Unknown);
        assert_eq!(packet.meta.body_length, 0);
        let fault = packet.meta.last_fault().unwrap();
        assert_eq!(fault.stage, Stage::Body);
        assert_eq!(fault.error, FrameError::UnrecognizedKind { code: 2 });
    }

    #[test]
    fn test_binary_head_kind_is_terminal() {
        let mut packet = json_packet();
        packet.head.kind = HeadKind::Binary;
        let wire = pack(&mut packet);

        assert!(wire.is_none());
        assert!(packet.pack.is_empty());
        assert!(packet.head.pack.is_empty());
        assert_eq!(packet.meta.head_length, 0);
        assert_eq!(
            packet.meta.last_fault().map(|fault| fault.stage),
            Some(Stage::Head)
        );
    }

    #[test]
    fn test_head_length_boundary() {
        // inflate every numeric field so one adjustable field can reach the
        // limit within u64 range
        let big = 10_000_000_000_000_000_000_u64; // 20 digits
        let boundary_packet = |order_index: u64| {
            let mut packet = Packet::default();
            packet.head.version = big;
            packet.head.session_id = big;
            packet.head.transaction_id = big;
            packet.head.timestamp = big;
            packet.head.segment_number = big;
            packet.head.segment_count = big;
            packet.head.corresponder = true;
            packet.head.multicast = true;
            packet.head.burst = true;
            packet.head.pending = true;
            packet.head.resend_all = true;
            packet.head.order_index = order_index;
            packet
        };

        let mut probe = boundary_packet(1);
        pack(&mut probe).unwrap();
        let base = probe.meta.head_length;
        let digits = MAX_HEAD_LEN - base + 1;
        assert!((2..=19).contains(&digits), "probe head unexpectedly sized");

        let at_limit = 10_u64.pow(u32::try_from(digits).unwrap() - 1);
        let mut packet = boundary_packet(at_limit);
        assert!(pack(&mut packet).is_some());
        assert_eq!(packet.meta.head_length, MAX_HEAD_LEN);
        assert!(packet.meta.is_clean());

        let mut packet = boundary_packet(at_limit * 10);
        assert!(pack(&mut packet).is_none());
        assert_eq!(packet.meta.head_length, 0);
        assert!(packet.head.pack.is_empty());
        assert!(packet.pack.is_empty());
        assert_eq!(
            packet.meta.last_fault().map(|fault| &fault.error),
            Some(&FrameError::HeadTooLong {
                length: MAX_HEAD_LEN + 1,
                max: MAX_HEAD_LEN
            })
        );
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|window| window == needle)
    }
}
