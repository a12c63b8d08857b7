//! Head field table and default filling
//!
//! The table lists every wire-visible head field in emission order together
//! with its elision rule. It drives both sides of the codec: the packer
//! walks it to decide which fields to emit, and the parser walks it to fill
//! fields the sender elided. Default values themselves live on
//! [`Head::default`](super::Head).

use serde_json::{Map, Value};

use super::packet::Head;

/// Elision rule for a head field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elide {
    /// Always emitted, whatever the value. The receiver cannot safely
    /// assume these.
    Never,
    /// Omitted from the wire when the value equals its default.
    IfDefault,
}

/// One row of the head wire table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Two-character wire tag.
    pub tag: &'static str,
    /// Whether the field may be elided.
    pub elide: Elide,
}

const fn field(tag: &'static str, elide: Elide) -> FieldSpec {
    FieldSpec { tag, elide }
}

/// Head fields in wire emission order. The head kind and length lead so the
/// framing prefix and the length placeholder offset stay fixed.
pub static HEAD_FIELDS: [FieldSpec; 24] = [
    field("hk", Elide::Never),     // head kind
    field("hl", Elide::Never),     // head length, patched after serialization
    field("vn", Elide::IfDefault), // version
    field("sd", Elide::Never),     // source device id
    field("dd", Elide::Never),     // destination device id
    field("cf", Elide::IfDefault), // corresponder flag
    field("mf", Elide::IfDefault), // multicast flag
    field("si", Elide::IfDefault), // session id
    field("ti", Elide::IfDefault), // transaction id
    field("sk", Elide::Never),     // service kind
    field("pk", Elide::Never),     // packet kind
    field("bf", Elide::IfDefault), // burst flag
    field("oi", Elide::IfDefault), // order index
    field("dt", Elide::IfDefault), // datetime stamp
    field("sn", Elide::IfDefault), // segment number
    field("sc", Elide::IfDefault), // segment count
    field("pf", Elide::IfDefault), // pending segment flag
    field("af", Elide::IfDefault), // resend-all flag
    field("nk", Elide::IfDefault), // neck kind
    field("nl", Elide::IfDefault), // neck length
    field("bk", Elide::IfDefault), // body kind
    field("bl", Elide::IfDefault), // body length
    field("tk", Elide::IfDefault), // tail kind
    field("tl", Elide::IfDefault), // tail length
];

/// Sets absent elidable keys in a decoded head kit to their defaults.
/// Present keys are never overwritten, so the call is idempotent and
/// order-independent.
pub fn fill_missing(kit: &mut Map<String, Value>, defaults: &Head) {
    for spec in &HEAD_FIELDS {
        if spec.elide == Elide::IfDefault && !kit.contains_key(spec.tag) {
            kit.insert(spec.tag.to_string(), defaults.wire_value(spec.tag));
        }
    }
}
