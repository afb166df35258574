//! Fixed header for avatar snapshots
//!
//! Fixed header is 8 bytes:
//! - Byte 0: Version (4 bits) + Avatar variant (4 bits)
//! - Byte 1: Flags
//! - Byte 2: Field count
//! - Byte 3: Reserved (zero)
//! - Bytes 4-7: Sequence (LE)

use xpvr_core::{AvatarVariant, HandEncoding, XpvrError, XpvrResult};

use crate::SnapshotFlags;

/// Fixed header size in bytes
pub const HEADER_SIZE: usize = 8;

/// Current wire protocol version
pub const WIRE_VERSION: u8 = 1;

/// Fixed header structure
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotHeader {
    /// Wire protocol version (4 bits, 0-15)
    pub version: u8,
    /// Avatar variant of the sender
    pub variant: AvatarVariant,
    /// Snapshot flags
    pub flags: SnapshotFlags,
    /// Number of fields in the payload
    pub field_count: u8,
    /// Sender's tick counter, informational only
    pub sequence: u32,
}

impl SnapshotHeader {
    /// Header for a full snapshot of the given variant
    pub fn new(variant: AvatarVariant, encoding: HandEncoding) -> Self {
        SnapshotHeader {
            version: WIRE_VERSION,
            variant,
            flags: SnapshotFlags::for_encoding(encoding),
            field_count: variant.field_count(encoding) as u8,
            sequence: 0,
        }
    }

    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    /// Hand encoding used by the payload
    pub fn hand_encoding(&self) -> HandEncoding {
        self.flags.hand_encoding()
    }

    /// Parse header from bytes
    pub fn parse(buf: &[u8]) -> XpvrResult<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(XpvrError::BufferTooShort {
                expected: HEADER_SIZE,
                actual: buf.len(),
            });
        }

        // Byte 0: Version + Variant
        let version = buf[0] >> 4;
        if version != WIRE_VERSION {
            return Err(XpvrError::UnsupportedVersion(version));
        }
        let variant = AvatarVariant::from_tag(buf[0] & 0x0F)
            .ok_or(XpvrError::UnknownVariant(buf[0] & 0x0F))?;

        // Byte 1: Flags
        let flags = SnapshotFlags::new(buf[1]);
        if flags.reserved_bits() != 0 {
            return Err(XpvrError::ReservedBits(flags.reserved_bits()));
        }

        // Byte 2: Field count
        let field_count = buf[2];

        // Byte 3: Reserved
        if buf[3] != 0 {
            return Err(XpvrError::ReservedBits(buf[3]));
        }

        // Bytes 4-7: Sequence
        let sequence = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);

        Ok(SnapshotHeader {
            version,
            variant,
            flags,
            field_count,
            sequence,
        })
    }

    /// Serialize header to bytes
    pub fn serialize(&self, buf: &mut [u8]) -> XpvrResult<()> {
        if buf.len() < HEADER_SIZE {
            return Err(XpvrError::BufferTooShort {
                expected: HEADER_SIZE,
                actual: buf.len(),
            });
        }

        buf[0] = (self.version << 4) | self.variant.to_tag();
        buf[1] = self.flags.0;
        buf[2] = self.field_count;
        buf[3] = 0;
        buf[4..8].copy_from_slice(&self.sequence.to_le_bytes());

        Ok(())
    }

    /// Serialize header to a fixed array
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0] = (self.version << 4) | self.variant.to_tag();
        buf[1] = self.flags.0;
        buf[2] = self.field_count;
        buf[4..8].copy_from_slice(&self.sequence.to_le_bytes());
        buf
    }
}
