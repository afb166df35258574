//! Avatar variants and their field schemas
//!
//! Each variant replicates a fixed, ordered list of fields. Reduced
//! variants carry a strict prefix of the full VR list:
//!
//! | Variant    | Fields                                                   |
//! |------------|----------------------------------------------------------|
//! | PC         | head pos, head rot                                       |
//! | Hololens   | head pos, head rot                                       |
//! | Generic VR | head pos, head rot                                       |
//! | Full VR    | head, left ctrl, right ctrl (pos + rot), hand poses      |

use serde::Deserialize;

/// Avatar hardware variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AvatarVariant {
    /// Desktop player, head only
    Pc = 0x0,
    /// Mixed-reality headset, head only
    Hololens = 0x1,
    /// Headset without tracked hands
    GenericVr = 0x2,
    /// Headset with two hand controllers and hand poses
    #[default]
    FullVr = 0x3,
}

impl AvatarVariant {
    /// Parse from the 4-bit wire tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x0 => Some(AvatarVariant::Pc),
            0x1 => Some(AvatarVariant::Hololens),
            0x2 => Some(AvatarVariant::GenericVr),
            0x3 => Some(AvatarVariant::FullVr),
            _ => None,
        }
    }

    #[inline]
    pub fn to_tag(self) -> u8 {
        self as u8
    }

    /// Does this variant replicate controllers and hand poses?
    pub fn tracks_hands(self) -> bool {
        matches!(self, AvatarVariant::FullVr)
    }

    /// Ordered field kinds for this variant
    pub fn schema(self, encoding: HandEncoding) -> &'static [FieldKind] {
        use FieldKind::*;

        const HEAD: &[FieldKind] = &[Position, Rotation];
        const FULL_FLAGS: &[FieldKind] = &[
            Position, Rotation, // head
            Position, Rotation, // left controller
            Position, Rotation, // right controller
            Flag, Flag, Flag, // left normal, thumbs up, finger point
            Flag, Flag, Flag, // right normal, thumbs up, finger point
        ];
        const FULL_COMPACT: &[FieldKind] = &[
            Position, Rotation, Position, Rotation, Position, Rotation, HandCode, HandCode,
        ];

        match (self, encoding) {
            (AvatarVariant::FullVr, HandEncoding::Flags) => FULL_FLAGS,
            (AvatarVariant::FullVr, HandEncoding::Compact) => FULL_COMPACT,
            _ => HEAD,
        }
    }

    pub fn field_count(self, encoding: HandEncoding) -> usize {
        self.schema(encoding).len()
    }

    pub fn name(self) -> &'static str {
        match self {
            AvatarVariant::Pc => "pc",
            AvatarVariant::Hololens => "hololens",
            AvatarVariant::GenericVr => "generic_vr",
            AvatarVariant::FullVr => "full_vr",
        }
    }
}

impl std::fmt::Display for AvatarVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How hand poses are carried on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandEncoding {
    /// Three booleans per hand
    #[default]
    Flags,
    /// One 2-bit code per hand
    Compact,
}

/// Kind of a single replicated field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldKind {
    /// 3 x f32
    Position = 0x01,
    /// 4 x f32, unit quaternion
    Rotation = 0x02,
    /// single boolean
    Flag = 0x03,
    /// 2-bit hand pose code
    HandCode = 0x04,
}

impl FieldKind {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(FieldKind::Position),
            0x02 => Some(FieldKind::Rotation),
            0x03 => Some(FieldKind::Flag),
            0x04 => Some(FieldKind::HandCode),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Encoded value size in bytes, excluding the kind tag
    pub fn value_size(self) -> usize {
        match self {
            FieldKind::Position => 12,
            FieldKind::Rotation => 16,
            FieldKind::Flag | FieldKind::HandCode => 1,
        }
    }
}
