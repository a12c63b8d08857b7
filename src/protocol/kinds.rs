//! QXP kind registries
//!
//! Each registry is a closed set of wire codes with lowercase names and an
//! `Unknown = 255` sentinel. Code and name lookups are total: input outside
//! the set maps to `Unknown`, never to an error. The registries are fixed at
//! compile time; new algorithms register codecs in the strategy tables, they
//! do not grow the registries at run time.

use std::fmt;

/// Head encoding kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HeadKind {
    /// Compact json head with two-character field tags.
    #[default]
    Json = 0,
    /// Packed binary head (reserved).
    Binary = 1,
    /// Sentinel for codes outside the registry.
    Unknown = 255,
}

impl HeadKind {
    /// Total lookup by wire code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Json,
            1 => Self::Binary,
            _ => Self::Unknown,
        }
    }

    /// Total lookup by registry name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => Self::Json,
            "binary" => Self::Binary,
            _ => Self::Unknown,
        }
    }

    /// Wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Binary => "binary",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HeadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Neck (authentication) kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NeckKind {
    /// No authentication; the neck is empty.
    #[default]
    Nada = 0,
    /// Curve25519 signature (registration point).
    Sodium = 1,
    /// SHA-2 keyed digest (registration point).
    Sha2 = 2,
    /// 64-bit cyclic redundancy check (registration point).
    Crc64 = 3,
    /// Sentinel for codes outside the registry.
    Unknown = 255,
}

impl NeckKind {
    /// Total lookup by wire code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Nada,
            1 => Self::Sodium,
            2 => Self::Sha2,
            3 => Self::Crc64,
            _ => Self::Unknown,
        }
    }

    /// Total lookup by registry name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "nada" => Self::Nada,
            "sodium" => Self::Sodium,
            "sha2" => Self::Sha2,
            "crc64" => Self::Crc64,
            _ => Self::Unknown,
        }
    }

    /// Wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nada => "nada",
            Self::Sodium => "sodium",
            Self::Sha2 => "sha2",
            Self::Crc64 => "crc64",
            Self::Unknown => "unknown",
        }
    }

    /// Expected packed neck length in bytes once this kind's codec is
    /// registered.
    #[must_use]
    pub const fn wire_size(self) -> usize {
        match self {
            Self::Nada | Self::Sodium | Self::Sha2 | Self::Unknown => 0,
            Self::Crc64 => 8,
        }
    }
}

impl fmt::Display for NeckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Body (payload) kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BodyKind {
    /// No payload.
    #[default]
    Nada = 0,
    /// json-encoded payload value.
    Json = 1,
    /// Packed binary payload (registration point).
    Binary = 2,
    /// Sentinel for codes outside the registry.
    Unknown = 255,
}

impl BodyKind {
    /// Total lookup by wire code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Nada,
            1 => Self::Json,
            2 => Self::Binary,
            _ => Self::Unknown,
        }
    }

    /// Total lookup by registry name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "nada" => Self::Nada,
            "json" => Self::Json,
            "binary" => Self::Binary,
            _ => Self::Unknown,
        }
    }

    /// Wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nada => "nada",
            Self::Json => "json",
            Self::Binary => "binary",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Tail (integrity) kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TailKind {
    /// No integrity trailer; the tail is empty.
    #[default]
    Nada = 0,
    /// 16-bit cyclic redundancy check (registration point).
    Crc16 = 1,
    /// 64-bit cyclic redundancy check (registration point).
    Crc64 = 2,
    /// Sentinel for codes outside the registry.
    Unknown = 255,
}

impl TailKind {
    /// Total lookup by wire code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Nada,
            1 => Self::Crc16,
            2 => Self::Crc64,
            _ => Self::Unknown,
        }
    }

    /// Total lookup by registry name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "nada" => Self::Nada,
            "crc16" => Self::Crc16,
            "crc64" => Self::Crc64,
            _ => Self::Unknown,
        }
    }

    /// Wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nada => "nada",
            Self::Crc16 => "crc16",
            Self::Crc64 => "crc64",
            Self::Unknown => "unknown",
        }
    }

    /// Expected packed tail length in bytes once this kind's codec is
    /// registered.
    #[must_use]
    pub const fn wire_size(self) -> usize {
        match self {
            Self::Nada | Self::Unknown => 0,
            Self::Crc16 => 2,
            Self::Crc64 => 8,
        }
    }
}

impl fmt::Display for TailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Service kinds: the delivery contract requested for a packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ServiceKind {
    /// Send once, no acknowledgment expected.
    #[default]
    Fireforget = 0,
    /// Acknowledged delivery with retries.
    Ackretry = 1,
    /// Sentinel for codes outside the registry.
    Unknown = 255,
}

impl ServiceKind {
    /// Total lookup by wire code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Fireforget,
            1 => Self::Ackretry,
            _ => Self::Unknown,
        }
    }

    /// Total lookup by registry name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "fireforget" => Self::Fireforget,
            "ackretry" => Self::Ackretry,
            _ => Self::Unknown,
        }
    }

    /// Wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fireforget => "fireforget",
            Self::Ackretry => "ackretry",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Packet kinds: the role a packet plays inside a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketKind {
    /// Application data.
    #[default]
    Data = 0,
    /// Request.
    Req = 1,
    /// Positive acknowledgment.
    Ack = 8,
    /// Negative acknowledgment.
    Nack = 9,
    /// Sentinel for codes outside the registry.
    Unknown = 255,
}

impl PacketKind {
    /// Total lookup by wire code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Data,
            1 => Self::Req,
            8 => Self::Ack,
            9 => Self::Nack,
            _ => Self::Unknown,
        }
    }

    /// Total lookup by registry name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "data" => Self::Data,
            "req" => Self::Req,
            "ack" => Self::Ack,
            "nack" => Self::Nack,
            _ => Self::Unknown,
        }
    }

    /// Wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Req => "req",
            Self::Ack => "ack",
            Self::Nack => "nack",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
