//! Kind-dispatched part codecs
//!
//! Each of neck, body, and tail has a static table mapping kind code to an
//! encode/decode pair. A slot is either `Implemented` or `Planned`; kinds
//! declared in a registry without a working codec register as `Planned`,
//! and codes absent from a table behave the same way. Pack and parse
//! dispatch through these tables only, so adding a real signature or
//! checksum algorithm is a pure registration change.

use serde_json::Value;

use super::error::FrameError;
use super::kinds::{BodyKind, NeckKind, TailKind};
use super::packet::Payload;

/// One direction of a part codec.
#[derive(Debug, Clone, Copy)]
pub enum Codec<F> {
    /// Registered and usable in this build.
    Implemented(F),
    /// Declared in the kind registry with no codec registered yet.
    Planned,
}

/// Neck encode: produces the packed neck that signs the finalized head
/// bytes.
pub type NeckEncodeFn = fn(head: &[u8]) -> Result<Vec<u8>, FrameError>;

/// Neck decode: validates a received packed neck.
pub type NeckDecodeFn = fn(neck: &[u8]) -> Result<(), FrameError>;

/// Body encode: serializes the decoded payload value.
pub type BodyEncodeFn = fn(value: &Payload) -> Result<Vec<u8>, FrameError>;

/// Body decode: deserializes received body bytes into a payload value.
pub type BodyDecodeFn = fn(body: &[u8]) -> Result<Payload, FrameError>;

/// Tail encode: produces the packed tail that checksums the packed body.
pub type TailEncodeFn = fn(body: &[u8]) -> Result<Vec<u8>, FrameError>;

/// Tail decode: validates a received packed tail.
pub type TailDecodeFn = fn(tail: &[u8]) -> Result<(), FrameError>;

/// Encode/decode pair for a neck kind.
#[derive(Debug, Clone, Copy)]
pub struct NeckStrategy {
    /// Signing direction.
    pub encode: Codec<NeckEncodeFn>,
    /// Checking direction.
    pub decode: Codec<NeckDecodeFn>,
}

/// Encode/decode pair for a body kind.
#[derive(Debug, Clone, Copy)]
pub struct BodyStrategy {
    /// Serializing direction.
    pub encode: Codec<BodyEncodeFn>,
    /// Deserializing direction.
    pub decode: Codec<BodyDecodeFn>,
}

/// Encode/decode pair for a tail kind.
#[derive(Debug, Clone, Copy)]
pub struct TailStrategy {
    /// Checksumming direction.
    pub encode: Codec<TailEncodeFn>,
    /// Checking direction.
    pub decode: Codec<TailDecodeFn>,
}

const PLANNED_NECK: NeckStrategy = NeckStrategy {
    encode: Codec::Planned,
    decode: Codec::Planned,
};

const PLANNED_BODY: BodyStrategy = BodyStrategy {
    encode: Codec::Planned,
    decode: Codec::Planned,
};

const PLANNED_TAIL: TailStrategy = TailStrategy {
    encode: Codec::Planned,
    decode: Codec::Planned,
};

static NECK_STRATEGIES: &[(NeckKind, NeckStrategy)] = &[
    (
        NeckKind::Nada,
        NeckStrategy {
            encode: Codec::Implemented(neck_nada_encode),
            decode: Codec::Implemented(neck_nada_decode),
        },
    ),
    (NeckKind::Sodium, PLANNED_NECK),
    (NeckKind::Sha2, PLANNED_NECK),
    (NeckKind::Crc64, PLANNED_NECK),
];

static BODY_STRATEGIES: &[(BodyKind, BodyStrategy)] = &[
    (
        // nada packs an empty body; parsing an empty body is meaningless,
        // so the decode slot stays planned
        BodyKind::Nada,
        BodyStrategy {
            encode: Codec::Implemented(body_nada_encode),
            decode: Codec::Planned,
        },
    ),
    (
        BodyKind::Json,
        BodyStrategy {
            encode: Codec::Implemented(body_json_encode),
            decode: Codec::Implemented(body_json_decode),
        },
    ),
    (BodyKind::Binary, PLANNED_BODY),
];

static TAIL_STRATEGIES: &[(TailKind, TailStrategy)] = &[
    (
        TailKind::Nada,
        TailStrategy {
            encode: Codec::Implemented(tail_nada_encode),
            decode: Codec::Implemented(tail_nada_decode),
        },
    ),
    (TailKind::Crc16, PLANNED_TAIL),
    (TailKind::Crc64, PLANNED_TAIL),
];

/// Strategy registered for a neck kind, if any.
#[must_use]
pub fn neck_strategy(kind: NeckKind) -> Option<&'static NeckStrategy> {
    NECK_STRATEGIES
        .iter()
        .find(|(registered, _)| *registered == kind)
        .map(|(_, strategy)| strategy)
}

/// Strategy registered for a body kind, if any.
#[must_use]
pub fn body_strategy(kind: BodyKind) -> Option<&'static BodyStrategy> {
    BODY_STRATEGIES
        .iter()
        .find(|(registered, _)| *registered == kind)
        .map(|(_, strategy)| strategy)
}

/// Strategy registered for a tail kind, if any.
#[must_use]
pub fn tail_strategy(kind: TailKind) -> Option<&'static TailStrategy> {
    TAIL_STRATEGIES
        .iter()
        .find(|(registered, _)| *registered == kind)
        .map(|(_, strategy)| strategy)
}

fn neck_nada_encode(_head: &[u8]) -> Result<Vec<u8>, FrameError> {
    Ok(Vec::new())
}

fn neck_nada_decode(_neck: &[u8]) -> Result<(), FrameError> {
    Ok(())
}

fn body_nada_encode(_value: &Payload) -> Result<Vec<u8>, FrameError> {
    Ok(Vec::new())
}

fn body_json_encode(value: &Payload) -> Result<Vec<u8>, FrameError> {
    let packed = match value {
        Payload::Data(data) => serde_json::to_vec(data),
        Payload::Raw(raw) => serde_json::to_vec(raw),
    };
    packed.map_err(|err| FrameError::MalformedBody {
        reason: err.to_string(),
    })
}

fn body_json_decode(body: &[u8]) -> Result<Payload, FrameError> {
    let value: Value = serde_json::from_slice(body).map_err(|err| FrameError::MalformedBody {
        reason: err.to_string(),
    })?;
    Ok(match value {
        Value::Object(data) => Payload::Data(data),
        raw => Payload::Raw(raw),
    })
}

fn tail_nada_encode(_body: &[u8]) -> Result<Vec<u8>, FrameError> {
    Ok(Vec::new())
}

fn tail_nada_decode(_tail: &[u8]) -> Result<(), FrameError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body_roundtrip() {
        let mut data = serde_json::Map::new();
        data.insert("route".to_string(), json!("estia"));
        data.insert("count".to_string(), json!(3));
        let payload = Payload::Data(data);

        let strategy = body_strategy(BodyKind::Json).unwrap();
        let Codec::Implemented(encode) = strategy.encode else {
            panic!("json encode must be registered");
        };
        let Codec::Implemented(decode) = strategy.decode else {
            panic!("json decode must be registered");
        };

        let packed = encode(&payload).unwrap();
        assert_eq!(decode(&packed).unwrap(), payload);
    }

    #[test]
    fn test_json_scalar_decodes_as_raw() {
        let strategy = body_strategy(BodyKind::Json).unwrap();
        let Codec::Implemented(decode) = strategy.decode else {
            panic!("json decode must be registered");
        };
        let decoded = decode(b"[1,2,3]").unwrap();
        assert_eq!(decoded, Payload::Raw(json!([1, 2, 3])));
    }

    #[test]
    fn test_json_decode_rejects_malformed_bytes() {
        let strategy = body_strategy(BodyKind::Json).unwrap();
        let Codec::Implemented(decode) = strategy.decode else {
            panic!("json decode must be registered");
        };
        assert!(matches!(
            decode(b"{broken"),
            Err(FrameError::MalformedBody { .. })
        ));
    }

    #[test]
    fn test_nada_strategies_pack_empty() {
        let neck = neck_strategy(NeckKind::Nada).unwrap();
        let Codec::Implemented(encode) = neck.encode else {
            panic!("nada neck encode must be registered");
        };
        assert!(encode(b"finalized head").unwrap().is_empty());

        let tail = tail_strategy(TailKind::Nada).unwrap();
        let Codec::Implemented(encode) = tail.encode else {
            panic!("nada tail encode must be registered");
        };
        assert!(encode(b"packed body").unwrap().is_empty());
    }

    #[test]
    fn test_declared_kinds_without_codecs_are_planned() {
        let sodium = neck_strategy(NeckKind::Sodium).unwrap();
        assert!(matches!(sodium.encode, Codec::Planned));
        assert!(matches!(sodium.decode, Codec::Planned));

        let nada_body = body_strategy(BodyKind::Nada).unwrap();
        assert!(matches!(nada_body.encode, Codec::Implemented(_)));
        assert!(matches!(nada_body.decode, Codec::Planned));

        let crc16 = tail_strategy(TailKind::Crc16).unwrap();
        assert!(matches!(crc16.decode, Codec::Planned));
    }

    #[test]
    fn test_unregistered_codes_resolve_to_nothing() {
        assert!(neck_strategy(NeckKind::Unknown).is_none());
        assert!(body_strategy(BodyKind::Unknown).is_none());
        assert!(tail_strategy(TailKind::Unknown).is_none());
    }
}
