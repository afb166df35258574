//! Complete snapshot frame
//!
//! Frame = Fixed Header + Field Payload

use bytes::{BufMut, Bytes, BytesMut};
use xpvr_core::{AvatarVariant, XpvrError, XpvrResult};

use crate::{SnapshotFlags, SnapshotHeader, SyncReader, SyncWriter, HEADER_SIZE, WIRE_VERSION};

/// Maximum frame size (MTU-friendly)
pub const MAX_FRAME_SIZE: usize = 1200;

/// One synchronization tick's worth of avatar state
#[derive(Clone, Debug)]
pub struct SnapshotFrame {
    /// Fixed header
    pub header: SnapshotHeader,
    /// Tagged fields
    pub payload: Bytes,
}

impl SnapshotFrame {
    /// Seal the fields of a writer into a frame.
    ///
    /// The header's field count always reflects what was actually written,
    /// so a sender whose schema drifted is caught by the receiver.
    pub fn from_writer(
        variant: AvatarVariant,
        flags: SnapshotFlags,
        sequence: u32,
        writer: SyncWriter,
    ) -> XpvrResult<Self> {
        let field_count = writer.field_count();
        if field_count > u8::MAX as usize {
            return Err(XpvrError::FieldCountMismatch {
                expected: u8::MAX as usize,
                actual: field_count,
            });
        }

        Ok(SnapshotFrame {
            header: SnapshotHeader {
                version: WIRE_VERSION,
                variant,
                flags,
                field_count: field_count as u8,
                sequence,
            },
            payload: writer.into_payload(),
        })
    }

    /// Parse frame from bytes
    pub fn parse(buf: Bytes) -> XpvrResult<Self> {
        if buf.len() > MAX_FRAME_SIZE {
            return Err(XpvrError::FrameTooLarge {
                size: buf.len(),
                max: MAX_FRAME_SIZE,
            });
        }
        let header = SnapshotHeader::parse(&buf)?;
        let payload = buf.slice(HEADER_SIZE..);
        Ok(SnapshotFrame { header, payload })
    }

    /// Serialize frame to bytes
    pub fn serialize(&self) -> XpvrResult<Bytes> {
        let total_size = self.size();
        if total_size > MAX_FRAME_SIZE {
            return Err(XpvrError::FrameTooLarge {
                size: total_size,
                max: MAX_FRAME_SIZE,
            });
        }

        let mut buf = BytesMut::with_capacity(total_size);
        buf.put_slice(&self.header.to_bytes());
        buf.put_slice(&self.payload);
        Ok(buf.freeze())
    }

    /// Open the payload for a receiver expecting `variant`.
    ///
    /// Checks variant, announced field count and payload length against
    /// the schema before any field is read.
    pub fn reader_for(&self, variant: AvatarVariant) -> XpvrResult<SyncReader> {
        if self.header.variant != variant {
            return Err(XpvrError::VariantMismatch {
                expected: variant,
                actual: self.header.variant,
            });
        }

        let schema = variant.schema(self.header.hand_encoding());
        let announced = self.header.field_count as usize;
        if announced != schema.len() {
            return Err(XpvrError::FieldCountMismatch {
                expected: schema.len(),
                actual: announced,
            });
        }

        let expected_len: usize = schema.iter().map(|k| 1 + k.value_size()).sum();
        if self.payload.len() < expected_len {
            return Err(XpvrError::BufferTooShort {
                expected: expected_len,
                actual: self.payload.len(),
            });
        }
        if self.payload.len() > expected_len {
            return Err(XpvrError::TrailingData(self.payload.len() - expected_len));
        }

        Ok(SyncReader::new(self.payload.clone(), schema.len()))
    }

    /// Calculate total frame size
    pub fn size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpvr_core::{HandEncoding, Position3D, Rotation3D};

    fn head_only(variant: AvatarVariant) -> SnapshotFrame {
        let mut w = SyncWriter::new();
        w.send_position(Position3D::new(0.5, 1.7, -2.0));
        w.send_rotation(Rotation3D::identity());
        SnapshotFrame::from_writer(variant, SnapshotFlags::NONE, 9, w).unwrap()
    }

    #[test]
    fn test_frame_roundtrip() {
        let frame = head_only(AvatarVariant::Hololens);
        let bytes = frame.serialize().unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE + 13 + 17);

        let parsed = SnapshotFrame::parse(bytes).unwrap();
        assert_eq!(parsed.header, frame.header);

        let mut r = parsed.reader_for(AvatarVariant::Hololens).unwrap();
        assert_eq!(r.receive_position().unwrap(), Position3D::new(0.5, 1.7, -2.0));
        assert_eq!(r.receive_rotation().unwrap(), Rotation3D::identity());
        r.finish().unwrap();
    }

    #[test]
    fn test_head_only_against_full_vr_receiver() {
        // Sender wrote 2 fields, receiver expects 12
        let mut frame = head_only(AvatarVariant::GenericVr);
        frame.header.variant = AvatarVariant::FullVr;

        let err = frame.reader_for(AvatarVariant::FullVr).unwrap_err();
        assert_eq!(
            err,
            XpvrError::FieldCountMismatch {
                expected: AvatarVariant::FullVr.field_count(HandEncoding::Flags),
                actual: 2,
            }
        );
        assert!(err.is_protocol());
    }

    #[test]
    fn test_variant_mismatch() {
        let frame = head_only(AvatarVariant::Pc);
        assert_eq!(
            frame.reader_for(AvatarVariant::FullVr).unwrap_err(),
            XpvrError::VariantMismatch {
                expected: AvatarVariant::FullVr,
                actual: AvatarVariant::Pc,
            }
        );
    }

    #[test]
    fn test_truncated_payload() {
        let frame = head_only(AvatarVariant::Pc);
        let bytes = frame.serialize().unwrap();
        let parsed = SnapshotFrame::parse(bytes.slice(..bytes.len() - 4)).unwrap();

        assert!(matches!(
            parsed.reader_for(AvatarVariant::Pc),
            Err(XpvrError::BufferTooShort { .. })
        ));
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut w = SyncWriter::new();
        for _ in 0..100 {
            w.send_position(Position3D::ZERO);
        }
        let frame = SnapshotFrame::from_writer(AvatarVariant::Pc, SnapshotFlags::NONE, 0, w).unwrap();
        assert!(matches!(
            frame.serialize(),
            Err(XpvrError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn test_oversized_inbound_rejected() {
        let mut buf = BytesMut::with_capacity(MAX_FRAME_SIZE + 1);
        buf.put_slice(&head_only(AvatarVariant::Pc).header.to_bytes());
        buf.put_bytes(0, MAX_FRAME_SIZE + 1 - HEADER_SIZE);

        assert_eq!(
            SnapshotFrame::parse(buf.freeze()).map(|f| f.size()),
            Err(XpvrError::FrameTooLarge {
                size: MAX_FRAME_SIZE + 1,
                max: MAX_FRAME_SIZE,
            })
        );
    }
}
