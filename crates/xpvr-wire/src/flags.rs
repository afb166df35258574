//! Snapshot flags for the XPVR wire protocol

use xpvr_core::HandEncoding;

/// Snapshot flags (1 byte)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SnapshotFlags(pub u8);

impl SnapshotFlags {
    pub const NONE: SnapshotFlags = SnapshotFlags(0);

    // Flag bits
    pub const COMPACT_HANDS: u8 = 0b0000_0001;
    pub const RESERVED: u8 = 0b1111_1110;

    #[inline]
    pub fn new(bits: u8) -> Self {
        SnapshotFlags(bits)
    }

    /// Flags describing a hand encoding
    pub fn for_encoding(encoding: HandEncoding) -> Self {
        let mut flags = SnapshotFlags::NONE;
        flags.set_compact_hands(encoding == HandEncoding::Compact);
        flags
    }

    #[inline]
    pub fn is_compact_hands(self) -> bool {
        self.0 & Self::COMPACT_HANDS != 0
    }

    #[inline]
    pub fn reserved_bits(self) -> u8 {
        self.0 & Self::RESERVED
    }

    #[inline]
    pub fn set_compact_hands(&mut self, value: bool) {
        if value {
            self.0 |= Self::COMPACT_HANDS;
        } else {
            self.0 &= !Self::COMPACT_HANDS;
        }
    }

    /// Hand encoding announced by these flags
    pub fn hand_encoding(self) -> HandEncoding {
        if self.is_compact_hands() {
            HandEncoding::Compact
        } else {
            HandEncoding::Flags
        }
    }
}

impl From<u8> for SnapshotFlags {
    fn from(bits: u8) -> Self {
        SnapshotFlags(bits)
    }
}

impl From<SnapshotFlags> for u8 {
    fn from(flags: SnapshotFlags) -> Self {
        flags.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_operations() {
        let mut flags = SnapshotFlags::NONE;

        assert!(!flags.is_compact_hands());
        flags.set_compact_hands(true);
        assert!(flags.is_compact_hands());
        assert_eq!(flags.hand_encoding(), HandEncoding::Compact);

        flags.set_compact_hands(false);
        assert_eq!(flags.hand_encoding(), HandEncoding::Flags);
    }

    #[test]
    fn test_reserved_bits() {
        assert_eq!(SnapshotFlags::new(0b1000_0001).reserved_bits(), 0b1000_0000);
        assert_eq!(SnapshotFlags::for_encoding(HandEncoding::Compact).reserved_bits(), 0);
    }
}
