//! FLAP frame codec (Section 3: "FLAP frame", Section 6: "Wire protocol").

use crate::{Result, WireError};

/// The fixed byte that opens every FLAP frame.
pub const START_MARKER: u8 = 0x2A;

/// FLAP frame type, the first byte after the start marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameType {
    Signon,
    Data,
    Error,
    Signoff,
    KeepAlive,
}

impl FrameType {
    fn from_u8(v: u8) -> Result<Self> {
        match v {
            0x01 => Ok(Self::Signon),
            0x02 => Ok(Self::Data),
            0x03 => Ok(Self::Error),
            0x04 => Ok(Self::Signoff),
            0x05 => Ok(Self::KeepAlive),
            other => Err(WireError::Malformed(format!(
                "unknown FLAP frame type {other:#04x}"
            ))),
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Signon => 0x01,
            Self::Data => 0x02,
            Self::Error => 0x03,
            Self::Signoff => 0x04,
            Self::KeepAlive => 0x05,
        }
    }
}

/// A fully decoded FLAP frame: `{StartMarker, FrameType, Sequence,
/// PayloadLength}` followed by `PayloadLength` bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlapFrame {
    pub frame_type: FrameType,
    pub sequence: u16,
    pub payload: Vec<u8>,
}

impl FlapFrame {
    #[must_use]
    pub fn new(frame_type: FrameType, sequence: u16, payload: Vec<u8>) -> Self {
        Self {
            frame_type,
            sequence,
            payload,
        }
    }

    /// Parse the 6-byte fixed header. Returns `(frame_type, sequence,
    /// payload_length)`; the caller is responsible for then reading exactly
    /// `payload_length` more bytes off the socket.
    pub fn decode_header(header: &[u8; 6]) -> Result<(FrameType, u16, u16)> {
        if header[0] != START_MARKER {
            return Err(WireError::Malformed(format!(
                "bad FLAP start marker {:#04x}, expected {START_MARKER:#04x}",
                header[0]
            )));
        }
        let frame_type = FrameType::from_u8(header[1])?;
        let sequence = u16::from_be_bytes([header[2], header[3]]);
        let payload_len = u16::from_be_bytes([header[4], header[5]]);
        Ok((frame_type, sequence, payload_len))
    }

    /// Encode the full frame (header + payload) for writing to a socket.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6 + self.payload.len());
        out.push(START_MARKER);
        out.push(self.frame_type.as_u8());
        out.extend_from_slice(&self.sequence.to_be_bytes());
        out.extend_from_slice(&(self.payload.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Owns a connection's outbound FLAP sequence counter. The emit helper is
/// the only writer (Section 9: "Sequence numbering").
#[derive(Debug, Default)]
pub struct SequenceCounter(u16);

impl SequenceCounter {
    #[must_use]
    pub fn starting_at(seq: u16) -> Self {
        Self(seq)
    }

    /// Returns the next sequence number and advances the counter, wrapping
    /// at 2^16 (Section 3 invariant, Section 9 open question (i)).
    pub fn next(&mut self) -> u16 {
        let v = self.0;
        self.0 = self.0.wrapping_add(1);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_a_data_frame() {
        let frame = FlapFrame::new(FrameType::Data, 101, vec![1, 2, 3, 4]);
        let bytes = frame.encode();
        assert_eq!(bytes[0], START_MARKER);
        let header: [u8; 6] = bytes[0..6].try_into().unwrap();
        let (ft, seq, len) = FlapFrame::decode_header(&header).unwrap();
        assert_eq!(ft, FrameType::Data);
        assert_eq!(seq, 101);
        assert_eq!(len as usize, bytes.len() - 6);
        assert_eq!(&bytes[6..], &frame.payload[..]);
    }

    #[test]
    fn rejects_bad_start_marker() {
        let header = [0x00, 0x02, 0x00, 0x01, 0x00, 0x00];
        assert!(matches!(
            FlapFrame::decode_header(&header),
            Err(WireError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_unknown_frame_type() {
        let header = [START_MARKER, 0xFF, 0x00, 0x01, 0x00, 0x00];
        assert!(matches!(
            FlapFrame::decode_header(&header),
            Err(WireError::Malformed(_))
        ));
    }

    #[test]
    fn sequence_counter_increments_and_wraps() {
        let mut seq = SequenceCounter::starting_at(u16::MAX - 1);
        assert_eq!(seq.next(), u16::MAX - 1);
        assert_eq!(seq.next(), u16::MAX);
        assert_eq!(seq.next(), 0);
        assert_eq!(seq.next(), 1);
    }
}
