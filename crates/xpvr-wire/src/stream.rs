//! Positional field stream
//!
//! A snapshot payload is a sequence of fields written and read in the same
//! fixed order. Each field carries a one-byte kind tag so that a reader
//! walking the wrong schema fails at the first misaligned field instead of
//! reinterpreting bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use xpvr_core::{FieldKind, HandPose, Position3D, Rotation3D, XpvrError, XpvrResult};

/// Outbound side of a synchronization tick
#[derive(Debug, Default)]
pub struct SyncWriter {
    buf: BytesMut,
    kinds: Vec<FieldKind>,
}

impl SyncWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(fields: usize) -> Self {
        SyncWriter {
            buf: BytesMut::with_capacity(fields * 17),
            kinds: Vec::with_capacity(fields),
        }
    }

    pub fn send_position(&mut self, p: Position3D) {
        self.begin(FieldKind::Position);
        for v in p.to_array() {
            self.buf.put_f32_le(v);
        }
    }

    pub fn send_rotation(&mut self, q: Rotation3D) {
        self.begin(FieldKind::Rotation);
        for v in q.to_array() {
            self.buf.put_f32_le(v);
        }
    }

    pub fn send_flag(&mut self, flag: bool) {
        self.begin(FieldKind::Flag);
        self.buf.put_u8(flag as u8);
    }

    pub fn send_hand_code(&mut self, pose: HandPose) {
        self.begin(FieldKind::HandCode);
        self.buf.put_u8(pose.to_code());
    }

    /// Number of fields written so far
    pub fn field_count(&self) -> usize {
        self.kinds.len()
    }

    /// Kinds of the fields written so far, in order
    pub fn kinds(&self) -> &[FieldKind] {
        &self.kinds
    }

    pub fn into_payload(self) -> Bytes {
        self.buf.freeze()
    }

    fn begin(&mut self, kind: FieldKind) {
        self.buf.put_u8(kind.to_byte());
        self.kinds.push(kind);
    }
}

/// Inbound side of a synchronization tick
#[derive(Debug)]
pub struct SyncReader {
    buf: Bytes,
    index: usize,
    expected: usize,
}

impl SyncReader {
    /// Reader over `payload` that will yield exactly `expected` fields
    pub fn new(payload: Bytes, expected: usize) -> Self {
        SyncReader {
            buf: payload,
            index: 0,
            expected,
        }
    }

    pub fn receive_position(&mut self) -> XpvrResult<Position3D> {
        let index = self.begin(FieldKind::Position)?;
        let p = Position3D::from_array([
            self.buf.get_f32_le(),
            self.buf.get_f32_le(),
            self.buf.get_f32_le(),
        ]);
        if !p.is_finite() {
            return Err(XpvrError::NonFinite(index));
        }
        Ok(p)
    }

    pub fn receive_rotation(&mut self) -> XpvrResult<Rotation3D> {
        let index = self.begin(FieldKind::Rotation)?;
        let q = Rotation3D::from_array([
            self.buf.get_f32_le(),
            self.buf.get_f32_le(),
            self.buf.get_f32_le(),
            self.buf.get_f32_le(),
        ]);
        if !q.is_finite() {
            return Err(XpvrError::NonFinite(index));
        }
        Ok(q)
    }

    pub fn receive_flag(&mut self) -> XpvrResult<bool> {
        self.begin(FieldKind::Flag)?;
        match self.buf.get_u8() {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(XpvrError::InvalidBool(other)),
        }
    }

    pub fn receive_hand_code(&mut self) -> XpvrResult<HandPose> {
        self.begin(FieldKind::HandCode)?;
        HandPose::from_code(self.buf.get_u8())
    }

    /// Fields consumed so far
    pub fn position(&self) -> usize {
        self.index
    }

    /// Confirm every expected field was read and nothing trails
    pub fn finish(self) -> XpvrResult<()> {
        if self.index != self.expected {
            return Err(XpvrError::FieldCountMismatch {
                expected: self.expected,
                actual: self.index,
            });
        }
        if self.buf.has_remaining() {
            return Err(XpvrError::TrailingData(self.buf.remaining()));
        }
        Ok(())
    }

    /// Check the next field's tag and that its value is fully present.
    /// Returns the field index.
    fn begin(&mut self, kind: FieldKind) -> XpvrResult<usize> {
        let index = self.index;
        if index >= self.expected || !self.buf.has_remaining() {
            return Err(XpvrError::StreamExhausted(index));
        }

        let tag = self.buf.get_u8();
        let actual = FieldKind::from_byte(tag).ok_or(XpvrError::UnknownFieldKind(tag))?;
        if actual != kind {
            return Err(XpvrError::FieldKindMismatch {
                index,
                expected: kind,
                actual,
            });
        }

        if self.buf.remaining() < kind.value_size() {
            return Err(XpvrError::BufferTooShort {
                expected: kind.value_size(),
                actual: self.buf.remaining(),
            });
        }

        self.index += 1;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_read_back_in_order() {
        let mut w = SyncWriter::new();
        w.send_position(Position3D::new(1.0, 2.0, 3.0));
        w.send_rotation(Rotation3D::identity());
        w.send_flag(true);
        w.send_hand_code(HandPose::FingerPoint);
        assert_eq!(w.field_count(), 4);

        let mut r = SyncReader::new(w.into_payload(), 4);
        assert_eq!(r.receive_position().unwrap(), Position3D::new(1.0, 2.0, 3.0));
        assert_eq!(r.receive_rotation().unwrap(), Rotation3D::identity());
        assert!(r.receive_flag().unwrap());
        assert_eq!(r.receive_hand_code().unwrap(), HandPose::FingerPoint);
        r.finish().unwrap();
    }

    #[test]
    fn test_kind_mismatch_detected() {
        let mut w = SyncWriter::new();
        w.send_flag(false);

        let mut r = SyncReader::new(w.into_payload(), 1);
        assert_eq!(
            r.receive_position(),
            Err(XpvrError::FieldKindMismatch {
                index: 0,
                expected: FieldKind::Position,
                actual: FieldKind::Flag,
            })
        );
    }

    #[test]
    fn test_reading_past_expected_fields() {
        let mut w = SyncWriter::new();
        w.send_flag(true);
        w.send_flag(true);

        let mut r = SyncReader::new(w.into_payload(), 1);
        r.receive_flag().unwrap();
        assert_eq!(r.receive_flag(), Err(XpvrError::StreamExhausted(1)));
    }

    #[test]
    fn test_finish_reports_unread_fields() {
        let mut w = SyncWriter::new();
        w.send_flag(true);
        w.send_flag(false);

        let mut r = SyncReader::new(w.into_payload(), 2);
        r.receive_flag().unwrap();
        assert_eq!(
            r.finish(),
            Err(XpvrError::FieldCountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_truncated_value() {
        let payload = Bytes::from_static(&[0x01, 0x00, 0x00]);
        let mut r = SyncReader::new(payload, 1);
        assert!(matches!(
            r.receive_position(),
            Err(XpvrError::BufferTooShort { .. })
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut w = SyncWriter::new();
        w.send_position(Position3D::new(f32::NAN, 0.0, 0.0));

        let mut r = SyncReader::new(w.into_payload(), 1);
        assert_eq!(r.receive_position(), Err(XpvrError::NonFinite(0)));
    }

    #[test]
    fn test_invalid_bool_byte() {
        let payload = Bytes::from_static(&[0x03, 0x02]);
        let mut r = SyncReader::new(payload, 1);
        assert_eq!(r.receive_flag(), Err(XpvrError::InvalidBool(2)));
    }
}
