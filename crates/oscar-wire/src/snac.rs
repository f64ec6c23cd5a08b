//! SNAC header codec (Section 3: "SNAC message").

use crate::codec::{Reader, Writer};
use crate::Result;

/// Well-known SNAC error codes (Section 7). Carried as the `u16` value of a
/// TLV-free error body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnacErrorCode {
    InvalidSnac,
    NotLoggedOn,
    InLocalPermitDeny,
    NotSupportedByHost,
}

impl SnacErrorCode {
    #[must_use]
    pub fn as_u16(self) -> u16 {
        match self {
            Self::InvalidSnac => 0x0001,
            Self::NotLoggedOn => 0x0004,
            Self::InLocalPermitDeny => 0x0010,
            Self::NotSupportedByHost => 0x0006,
        }
    }
}

/// The subgroup every food group reserves for error replies
/// (Section 4.4: "`(FoodGroup=<same>, SubGroup=0x01, Code=InvalidSNAC)`").
pub const ERROR_SUBGROUP: u16 = 0x0001;

/// `{FoodGroup, SubGroup, Flags, RequestID}`, preceding every SNAC body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnacHeader {
    pub food_group: u16,
    pub sub_group: u16,
    pub flags: u16,
    pub request_id: u32,
}

impl SnacHeader {
    #[must_use]
    pub fn new(food_group: u16, sub_group: u16, request_id: u32) -> Self {
        Self {
            food_group,
            sub_group,
            flags: 0,
            request_id,
        }
    }

    /// A reply header preserving the request's id (Section 3 invariant).
    #[must_use]
    pub fn reply_to(&self, sub_group: u16) -> Self {
        Self {
            food_group: self.food_group,
            sub_group,
            flags: 0,
            request_id: self.request_id,
        }
    }

    /// The generic `InvalidSNAC` error reply header for this food group.
    #[must_use]
    pub fn error_reply(&self) -> Self {
        self.reply_to(ERROR_SUBGROUP)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            food_group: r.u16()?,
            sub_group: r.u16()?,
            flags: r.u16()?,
            request_id: r.u32()?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(self.food_group);
        w.u16(self.sub_group);
        w.u16(self.flags);
        w.u32(self.request_id);
    }
}

/// A SNAC message with an undecoded, opaque body — what the root router
/// reads off the FLAP payload before dispatching by `(FoodGroup, SubGroup)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawSnac {
    pub header: SnacHeader,
    pub body: Vec<u8>,
}

impl RawSnac {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut r = Reader::new(buf);
        let header = SnacHeader::decode(&mut r)?;
        let body = r.rest();
        Ok(Self { header, body })
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.header.encode(&mut w);
        w.fixed(&self.body);
        w.into_bytes()
    }

    /// Build the generic error reply for this request (Section 4.4).
    #[must_use]
    pub fn error_reply(&self, code: SnacErrorCode) -> RawSnac {
        let mut w = Writer::new();
        w.u16(code.as_u16());
        RawSnac {
            header: self.header.error_reply(),
            body: w.into_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_header_and_body() {
        let snac = RawSnac {
            header: SnacHeader::new(0x0004, 0x0006, 42),
            body: vec![1, 2, 3, 4, 5],
        };
        let bytes = snac.encode();
        let decoded = RawSnac::decode(&bytes).unwrap();
        assert_eq!(decoded, snac);
    }

    #[test]
    fn reply_preserves_request_id() {
        let header = SnacHeader::new(0x0004, 0x0006, 1234);
        let reply = header.reply_to(0x0005);
        assert_eq!(reply.request_id, 1234);
        assert_eq!(reply.food_group, 0x0004);
        assert_eq!(reply.sub_group, 0x0005);
    }

    #[test]
    fn error_reply_uses_reserved_subgroup_and_preserves_id() {
        let snac = RawSnac {
            header: SnacHeader::new(0x0004, 0x0006, 99),
            body: vec![],
        };
        let err = snac.error_reply(SnacErrorCode::NotLoggedOn);
        assert_eq!(err.header.sub_group, ERROR_SUBGROUP);
        assert_eq!(err.header.request_id, 99);
        assert_eq!(err.header.food_group, 0x0004);
    }
}
