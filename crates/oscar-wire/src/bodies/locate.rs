//! Locate food group bodies (Section 4.5: "Locate").

use super::user_info::UserInfo;
use crate::codec::{PrefixWidth, Reader, Writer};
use crate::tlv::{Tlv, TlvBlock};
use crate::Result;

pub const SET_INFO: u16 = 0x0002;
pub const USER_INFO_QUERY: u16 = 0x0003;
pub const USER_INFO_REPLY: u16 = 0x0004;
pub const SET_DIR_INFO: u16 = 0x0005;
pub const SET_KEYWORD_INFO: u16 = 0x0006;

const TAG_PROFILE: u16 = 0x0001;
const TAG_AWAY_MESSAGE: u16 = 0x0003;
const TAG_CAPABILITIES: u16 = 0x0005;

/// Request type bit requesting the target's profile text.
pub const REQUEST_PROFILE: u16 = 0x0001;
/// Request type bit requesting the target's away message.
pub const REQUEST_AWAY_MESSAGE: u16 = 0x0002;

/// `SetInfo`: updates profile, away message (empty clears it) and
/// capabilities in one shot. Any field the caller omits from the TLV block
/// is left unchanged server-side.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SetInfo {
    pub profile: Option<String>,
    pub away_message: Option<String>,
    pub capabilities: Option<Vec<[u8; 16]>>,
}

impl SetInfo {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let block = TlvBlock::decode_unprefixed(r)?;
        let profile = block.get(TAG_PROFILE).and_then(Tlv::as_string);
        let away_message = block.get(TAG_AWAY_MESSAGE).and_then(Tlv::as_string);
        let capabilities = block.get(TAG_CAPABILITIES).map(|t| {
            t.value
                .chunks_exact(16)
                .map(|c| c.try_into().unwrap_or([0u8; 16]))
                .collect()
        });
        Ok(Self {
            profile,
            away_message,
            capabilities,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        let mut block = TlvBlock::new();
        if let Some(profile) = &self.profile {
            block.push(Tlv::string(TAG_PROFILE, profile));
        }
        if let Some(away) = &self.away_message {
            block.push(Tlv::string(TAG_AWAY_MESSAGE, away));
        }
        if let Some(caps) = &self.capabilities {
            let mut bytes = Vec::with_capacity(caps.len() * 16);
            for c in caps {
                bytes.extend_from_slice(c);
            }
            block.push(Tlv::new(TAG_CAPABILITIES, bytes));
        }
        block.encode(w);
    }
}

/// `UserInfoQuery`: ask for a target's public state and optionally its
/// profile/away text (`request_type` is a bitmask of `REQUEST_*`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserInfoQuery {
    pub target: String,
    pub request_type: u16,
}

impl UserInfoQuery {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            target: r.len_prefixed_string(PrefixWidth::U8)?,
            request_type: r.u16()?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.len_prefixed_string(PrefixWidth::U8, &self.target);
        w.u16(self.request_type);
    }
}

/// `UserInfoReply`: the target's public state, plus profile/away text when
/// requested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserInfoReply {
    pub info: UserInfo,
    pub profile: Option<String>,
    pub away_message: Option<String>,
}

impl UserInfoReply {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let info = UserInfo::decode(r)?;
        let block = TlvBlock::decode_unprefixed(r)?;
        Ok(Self {
            info,
            profile: block.get(TAG_PROFILE).and_then(Tlv::as_string),
            away_message: block.get(TAG_AWAY_MESSAGE).and_then(Tlv::as_string),
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        self.info.encode(w);
        let mut block = TlvBlock::new();
        if let Some(profile) = &self.profile {
            block.push(Tlv::string(TAG_PROFILE, profile));
        }
        if let Some(away) = &self.away_message {
            block.push(Tlv::string(TAG_AWAY_MESSAGE, away));
        }
        block.encode(w);
    }
}

/// `SetDirInfo` / `SetKeywordInfo`: forwarded verbatim to the persistence
/// collaborator (Section 4.5), the core never inspects the payload.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct OpaquePayload {
    pub raw: Vec<u8>,
}

impl OpaquePayload {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self { raw: r.rest() })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.fixed(&self.raw);
    }
}
