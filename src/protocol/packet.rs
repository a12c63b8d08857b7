//! QXP packet model
//!
//! A packet is transient meta bookkeeping plus four framing parts, each
//! carrying its decoded view and its packed wire form. Meta is the only
//! working state a pack or parse call mutates freely; the head's copies of
//! the neck/body/tail kind and length fields are derived, written once at
//! the sync point and read back only for wire serialization.

use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::warn;

use super::error::{Fault, FrameError, Stage};
use super::kinds::{BodyKind, HeadKind, NeckKind, PacketKind, ServiceKind, TailKind};
use super::{DEFAULT_DEST_HOST, DEFAULT_PORT, WIRE_VERSION};

/// Transient per-packet working state.
///
/// Never transmitted as a unit. The neck/body/tail kind and length fields
/// mirror the corresponding head fields after a successful head parse; meta
/// is the fast-access working copy, the head is the authoritative
/// wire-visible copy.
#[derive(Debug, Clone)]
pub struct Meta {
    /// Source host address, empty until the transport fills it.
    pub src_host: String,
    /// Source port.
    pub src_port: u16,
    /// Destination host address.
    pub dst_host: String,
    /// Destination port.
    pub dst_port: u16,
    /// Wire protocol revision.
    pub version: u64,
    /// Detected head kind.
    pub head_kind: HeadKind,
    /// Actual packed head length.
    pub head_length: usize,
    /// Working neck kind.
    pub neck_kind: NeckKind,
    /// Working neck length.
    pub neck_length: usize,
    /// Working body kind.
    pub body_kind: BodyKind,
    /// Working body length.
    pub body_length: usize,
    /// Working tail kind.
    pub tail_kind: TailKind,
    /// Working tail length.
    pub tail_length: usize,
    faults: Vec<Fault>,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            src_host: String::new(),
            src_port: DEFAULT_PORT,
            dst_host: DEFAULT_DEST_HOST.to_string(),
            dst_port: DEFAULT_PORT,
            version: WIRE_VERSION,
            head_kind: HeadKind::Json,
            head_length: 0,
            neck_kind: NeckKind::Nada,
            neck_length: 0,
            body_kind: BodyKind::Nada,
            body_length: 0,
            tail_kind: TailKind::Nada,
            tail_length: 0,
            faults: Vec::new(),
        }
    }
}

impl Meta {
    /// Records a stage fault. Stages keep running after a non-terminal
    /// fault; callers decide how much of the result to trust.
    pub fn record(&mut self, stage: Stage, error: FrameError) {
        warn!(stage = %stage, error = %error, "codec fault");
        self.faults.push(Fault { stage, error });
    }

    /// All faults recorded by the current pack or parse call, oldest first.
    #[must_use]
    pub fn faults(&self) -> &[Fault] {
        &self.faults
    }

    /// Most recent fault, if any.
    #[must_use]
    pub fn last_fault(&self) -> Option<&Fault> {
        self.faults.last()
    }

    /// True when the current call recorded no fault.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    pub(crate) fn clear_faults(&mut self) {
        self.faults.clear();
    }
}

/// The wire head.
///
/// Every field has a declared default; on the wire a field equal to its
/// default is elided unless its tag is marked mandatory in the field table.
#[derive(Debug, Clone)]
pub struct Head {
    /// Head encoding kind.
    pub kind: HeadKind,
    /// Declared head length. On the wire this is a two-hex-digit string
    /// patched in place after serialization.
    pub length: usize,
    /// Wire protocol revision.
    pub version: u64,
    /// Source device id.
    pub source: u64,
    /// Destination device id.
    pub destination: u64,
    /// Set on packets sent by the correspondent side of a transaction.
    pub corresponder: bool,
    /// Set on multicast packets.
    pub multicast: bool,
    /// Session id.
    pub session_id: u64,
    /// Transaction id.
    pub transaction_id: u64,
    /// Requested delivery contract.
    pub service_kind: ServiceKind,
    /// Role of this packet inside its transaction.
    pub packet_kind: PacketKind,
    /// Send segments without waiting for interleaved acks.
    pub burst: bool,
    /// Order index.
    pub order_index: u64,
    /// Datetime stamp.
    pub timestamp: u64,
    /// Segment number.
    pub segment_number: u64,
    /// Segment count.
    pub segment_count: u64,
    /// More segments pending after this one.
    pub pending: bool,
    /// Resend all segments, not just one.
    pub resend_all: bool,
    /// Neck kind, derived from meta at the sync point.
    pub neck_kind: NeckKind,
    /// Neck length, derived from meta at the sync point.
    pub neck_length: usize,
    /// Body kind, derived from meta at the sync point.
    pub body_kind: BodyKind,
    /// Body length, derived from meta at the sync point.
    pub body_length: usize,
    /// Tail kind, derived from meta at the sync point.
    pub tail_kind: TailKind,
    /// Tail length, derived from meta at the sync point.
    pub tail_length: usize,
    /// Packed wire form.
    pub pack: Bytes,
}

impl Default for Head {
    fn default() -> Self {
        Self {
            kind: HeadKind::Json,
            length: 0,
            version: WIRE_VERSION,
            source: 0,
            destination: 0,
            corresponder: false,
            multicast: false,
            session_id: 0,
            transaction_id: 0,
            service_kind: ServiceKind::Fireforget,
            packet_kind: PacketKind::Data,
            burst: false,
            order_index: 0,
            timestamp: 0,
            segment_number: 0,
            segment_count: 1,
            pending: false,
            resend_all: false,
            neck_kind: NeckKind::Nada,
            neck_length: 0,
            body_kind: BodyKind::Nada,
            body_length: 0,
            tail_kind: TailKind::Nada,
            tail_length: 0,
            pack: Bytes::new(),
        }
    }
}

impl Head {
    /// Current wire value for a two-character field tag. Unknown tags yield
    /// `Null`.
    #[must_use]
    pub fn wire_value(&self, tag: &str) -> Value {
        match tag {
            "hk" => Value::from(self.kind.code()),
            "hl" => Value::String(format!("{:02x}", self.length & 0xff)),
            "vn" => Value::from(self.version),
            "sd" => Value::from(self.source),
            "dd" => Value::from(self.destination),
            "cf" => Value::from(u8::from(self.corresponder)),
            "mf" => Value::from(u8::from(self.multicast)),
            "si" => Value::from(self.session_id),
            "ti" => Value::from(self.transaction_id),
            "sk" => Value::from(self.service_kind.code()),
            "pk" => Value::from(self.packet_kind.code()),
            "bf" => Value::from(u8::from(self.burst)),
            "oi" => Value::from(self.order_index),
            "dt" => Value::from(self.timestamp),
            "sn" => Value::from(self.segment_number),
            "sc" => Value::from(self.segment_count),
            "pf" => Value::from(u8::from(self.pending)),
            "af" => Value::from(u8::from(self.resend_all)),
            "nk" => Value::from(self.neck_kind.code()),
            "nl" => Value::from(self.neck_length),
            "bk" => Value::from(self.body_kind.code()),
            "bl" => Value::from(self.body_length),
            "tk" => Value::from(self.tail_kind.code()),
            "tl" => Value::from(self.tail_length),
            _ => Value::Null,
        }
    }

    /// Applies one decoded wire value. Tags outside the field table and
    /// values of the wrong shape are ignored; a malformed sender cannot
    /// corrupt fields it did not address.
    pub fn apply_wire_value(&mut self, tag: &str, value: &Value) {
        match tag {
            "hk" => self.kind = HeadKind::from_code(kind_code(value)),
            "hl" => {
                if let Some(hex) = value.as_str() {
                    if let Ok(length) = u8::from_str_radix(hex, 16) {
                        self.length = usize::from(length);
                    }
                } else if let Some(length) = as_len(value) {
                    self.length = length;
                }
            }
            "vn" => apply_u64(&mut self.version, value),
            "sd" => apply_u64(&mut self.source, value),
            "dd" => apply_u64(&mut self.destination, value),
            "cf" => apply_flag(&mut self.corresponder, value),
            "mf" => apply_flag(&mut self.multicast, value),
            "si" => apply_u64(&mut self.session_id, value),
            "ti" => apply_u64(&mut self.transaction_id, value),
            "sk" => self.service_kind = ServiceKind::from_code(kind_code(value)),
            "pk" => self.packet_kind = PacketKind::from_code(kind_code(value)),
            "bf" => apply_flag(&mut self.burst, value),
            "oi" => apply_u64(&mut self.order_index, value),
            "dt" => apply_u64(&mut self.timestamp, value),
            "sn" => apply_u64(&mut self.segment_number, value),
            "sc" => apply_u64(&mut self.segment_count, value),
            "pf" => apply_flag(&mut self.pending, value),
            "af" => apply_flag(&mut self.resend_all, value),
            "nk" => self.neck_kind = NeckKind::from_code(kind_code(value)),
            "nl" => apply_len(&mut self.neck_length, value),
            "bk" => self.body_kind = BodyKind::from_code(kind_code(value)),
            "bl" => apply_len(&mut self.body_length, value),
            "tk" => self.tail_kind = TailKind::from_code(kind_code(value)),
            "tl" => apply_len(&mut self.tail_length, value),
            _ => {}
        }
    }

    /// Applies a whole decoded head kit.
    pub fn apply_kit(&mut self, kit: &Map<String, Value>) {
        for (tag, value) in kit {
            self.apply_wire_value(tag, value);
        }
    }
}

/// Kind code of a decoded wire value; anything that is not a `u8` maps to
/// the unknown sentinel.
fn kind_code(value: &Value) -> u8 {
    value
        .as_u64()
        .and_then(|code| u8::try_from(code).ok())
        .unwrap_or(u8::MAX)
}

fn as_len(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|len| usize::try_from(len).ok())
}

fn apply_u64(field: &mut u64, value: &Value) {
    if let Some(parsed) = value.as_u64() {
        *field = parsed;
    }
}

fn apply_len(field: &mut usize, value: &Value) {
    if let Some(parsed) = as_len(value) {
        *field = parsed;
    }
}

fn apply_flag(field: &mut bool, value: &Value) {
    if let Some(bit) = value.as_u64() {
        *field = bit != 0;
    } else if let Some(flag) = value.as_bool() {
        *field = flag;
    }
}

/// Authentication segment. Empty under the nada strategy; a registered
/// signature codec fills it with a signature over the finalized head bytes.
#[derive(Debug, Clone, Default)]
pub struct Neck {
    /// Packed wire form.
    pub pack: Bytes,
}

/// Integrity trailer. Empty under the nada strategy; a registered checksum
/// codec fills it with a digest over the packed body.
#[derive(Debug, Clone, Default)]
pub struct Tail {
    /// Packed wire form.
    pub pack: Bytes,
}

/// Decoded body value.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured mapping payload.
    Data(Map<String, Value>),
    /// Raw scalar payload.
    Raw(Value),
}

impl Default for Payload {
    fn default() -> Self {
        Self::Data(Map::new())
    }
}

impl Payload {
    /// Structured mapping, when this payload holds one.
    #[must_use]
    pub fn data(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Data(data) => Some(data),
            Self::Raw(_) => None,
        }
    }

    /// Raw scalar, when this payload holds one.
    #[must_use]
    pub fn raw(&self) -> Option<&Value> {
        match self {
            Self::Data(_) => None,
            Self::Raw(raw) => Some(raw),
        }
    }
}

/// Packet body.
#[derive(Debug, Clone, Default)]
pub struct Body {
    /// Decoded payload value.
    pub value: Payload,
    /// Packed wire form.
    pub pack: Bytes,
}

/// A whole packet: meta plus the four framing parts.
///
/// Constructed fresh per send or per receive, never reused across logical
/// packets. On send the caller populates meta and the parts before calling
/// [`pack`](super::pack()); on receive only `pack` holds data and
/// [`parse`](super::parse()) populates the rest.
#[derive(Debug, Clone, Default)]
pub struct Packet {
    /// Transient working state.
    pub meta: Meta,
    /// Wire head.
    pub head: Head,
    /// Authentication segment.
    pub neck: Neck,
    /// Payload.
    pub body: Body,
    /// Integrity trailer.
    pub tail: Tail,
    /// Full wire form outbound; the as-received raw buffer inbound.
    pub pack: Bytes,
}

impl Packet {
    /// Fresh receive-side packet wrapping a raw buffer.
    #[must_use]
    pub fn inbound(raw: impl Into<Bytes>) -> Self {
        Self {
            pack: raw.into(),
            ..Self::default()
        }
    }
}
