//! QXP codec fault types
//!
//! Nothing in the codec raises an error across the pack/parse boundary.
//! Failures are recorded on [`Meta`](super::Meta) as [`Fault`]s, one per
//! failing stage, and callers inspect them after the call.

use std::fmt;

use thiserror::Error;

/// Pipeline stage that recorded a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Head encode or parse.
    Head,
    /// Neck encode or parse.
    Neck,
    /// Authentication checkpoint after the neck is parsed.
    Vouch,
    /// Body encode or parse.
    Body,
    /// Tail encode or parse.
    Tail,
    /// Integrity checkpoint after the tail is parsed.
    Verify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Head => "head",
            Self::Neck => "neck",
            Self::Vouch => "vouch",
            Self::Body => "body",
            Self::Tail => "tail",
            Self::Verify => "verify",
        };
        write!(f, "{name}")
    }
}

/// QXP codec failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// No valid leading marker or no head terminator in the buffer.
    #[error("unrecognizable packet head")]
    UnrecognizableHead,

    /// The framed head was found but its json did not decode.
    #[error("packet head is not valid json: {reason}")]
    MalformedHead {
        /// Decoder message
        reason: String,
    },

    /// The serialized head exceeds the wire limit.
    #[error("head length of {length} exceeds max of {max}")]
    HeadTooLong {
        /// Serialized length
        length: usize,
        /// Maximum allowed
        max: usize,
    },

    /// The patched length field disagrees with the consumed byte count.
    #[error("actual head length {actual} does not match head field value {declared}")]
    HeadLengthMismatch {
        /// Length declared in the head
        declared: usize,
        /// Bytes actually consumed
        actual: usize,
    },

    /// The declared head kind disagrees with the detected framing.
    #[error("actual head kind {detected} does not match head field value {declared}")]
    HeadKindMismatch {
        /// Kind code declared in the head
        declared: u8,
        /// Kind code detected from the framing
        detected: u8,
    },

    /// The kind code has no codec registered in this build.
    #[error("no codec registered for kind code {code}")]
    UnrecognizedKind {
        /// Offending kind code
        code: u8,
    },

    /// The body bytes did not decode as json.
    #[error("packet body is not valid json: {reason}")]
    MalformedBody {
        /// Decoder message
        reason: String,
    },

    /// The vouch checkpoint rejected the head.
    #[error("head failed authentication")]
    AuthRejected,

    /// The verify checkpoint rejected the body.
    #[error("body failed verification")]
    IntegrityRejected,
}

/// A [`FrameError`] tagged with the stage that recorded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Stage that failed.
    pub stage: Stage,
    /// What went wrong.
    pub error: FrameError,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_display() {
        let fault = Fault {
            stage: Stage::Body,
            error: FrameError::UnrecognizedKind { code: 7 },
        };
        assert_eq!(fault.to_string(), "body: no codec registered for kind code 7");
    }

    #[test]
    fn test_stage_names() {
        let stages = [
            (Stage::Head, "head"),
            (Stage::Neck, "neck"),
            (Stage::Vouch, "vouch"),
            (Stage::Body, "body"),
            (Stage::Tail, "tail"),
            (Stage::Verify, "verify"),
        ];
        for (stage, name) in stages {
            assert_eq!(stage.to_string(), name);
        }
    }
}
