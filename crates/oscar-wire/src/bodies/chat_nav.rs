//! ChatNav food group bodies (Section 4.5: "ChatNav").

use crate::codec::{PrefixWidth, Reader, Writer};
use crate::tlv::TlvBlock;
use crate::Result;

pub const REQUEST_CHAT_RIGHTS: u16 = 0x0002;
pub const REQUEST_ROOM_INFO: u16 = 0x0003;
pub const CREATE_ROOM: u16 = 0x0004;
pub const NAV_INFO: u16 = 0x0005;

/// TLV tag carrying a nested `NavInfo` inside a `NAV_INFO` reply's
/// outer TLV block (the nav reply can describe more than one exchange).
const TAG_EXCHANGE_INFO: u16 = 0x0001;

/// Room or exchange description returned by ChatNav queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavInfo {
    pub exchange: u16,
    pub cookie: [u8; 16],
    pub instance: u16,
    pub detail_level: u8,
    pub name: String,
}

impl NavInfo {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            exchange: r.u16()?,
            cookie: r.fixed::<16>()?,
            instance: r.u16()?,
            detail_level: r.u8()?,
            name: r.len_prefixed_string(PrefixWidth::U16)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(self.exchange);
        w.fixed(&self.cookie);
        w.u16(self.instance);
        w.u8(self.detail_level);
        w.len_prefixed_string(PrefixWidth::U16, &self.name);
    }
}

/// `RequestRoomInfo`: looks up a single room by cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestRoomInfo {
    pub exchange: u16,
    pub cookie: [u8; 16],
    pub instance: u16,
}

impl RequestRoomInfo {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            exchange: r.u16()?,
            cookie: r.fixed::<16>()?,
            instance: r.u16()?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(self.exchange);
        w.fixed(&self.cookie);
        w.u16(self.instance);
    }
}

/// `CreateRoom`: resolve-or-create. `cookie` is the literal `"create"`
/// (encoded as bytes, not the 16-byte binary form) when the client wants
/// a brand new room; any other value asks for the existing room with
/// that name under `exchange`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateRoom {
    pub exchange: u16,
    pub cookie: String,
    pub instance: u16,
    pub detail_level: u8,
    pub name: String,
}

impl CreateRoom {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let exchange = r.u16()?;
        let cookie = r.len_prefixed_string(PrefixWidth::U8)?;
        let instance = r.u16()?;
        let detail_level = r.u8()?;
        let block = TlvBlock::decode_count_prefixed(r, PrefixWidth::U16)?;
        let name = block
            .get(TAG_EXCHANGE_INFO)
            .and_then(crate::tlv::Tlv::as_string)
            .unwrap_or_default();
        Ok(Self {
            exchange,
            cookie,
            instance,
            detail_level,
            name,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(self.exchange);
        w.len_prefixed_string(PrefixWidth::U8, &self.cookie);
        w.u16(self.instance);
        w.u8(self.detail_level);
        let mut block = TlvBlock::new();
        block.push(crate::tlv::Tlv::string(TAG_EXCHANGE_INFO, &self.name));
        block.encode_count_prefixed(w, PrefixWidth::U16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_nav_info() {
        let info = NavInfo {
            exchange: 4,
            cookie: [7u8; 16],
            instance: 0,
            detail_level: 2,
            name: "The Lobby".to_string(),
        };
        let mut w = Writer::new();
        info.encode(&mut w);
        let decoded = NavInfo::decode(&mut Reader::new(&w.into_bytes())).unwrap();
        assert_eq!(decoded, info);
    }

    #[test]
    fn roundtrips_create_room_with_literal_create_cookie() {
        let body = CreateRoom {
            exchange: 4,
            cookie: "create".to_string(),
            instance: 0,
            detail_level: 2,
            name: "New Room".to_string(),
        };
        let mut w = Writer::new();
        body.encode(&mut w);
        let decoded = CreateRoom::decode(&mut Reader::new(&w.into_bytes())).unwrap();
        assert_eq!(decoded, body);
        assert_eq!(decoded.cookie, "create");
    }

    #[test]
    fn roundtrips_request_room_info() {
        let body = RequestRoomInfo {
            exchange: 4,
            cookie: [1u8; 16],
            instance: 0,
        };
        let mut w = Writer::new();
        body.encode(&mut w);
        let decoded = RequestRoomInfo::decode(&mut Reader::new(&w.into_bytes())).unwrap();
        assert_eq!(decoded, body);
    }
}
