//! Chat food group bodies (Section 4.5: "Chat"), exchanged on a chat-room
//! connection established after a ChatNav `CreateRoom`/join.

use super::user_info::UserInfo;
use crate::codec::{PrefixWidth, Reader, Writer};
use crate::tlv::{Tlv, TlvBlock};
use crate::Result;

pub const USERS_JOINED: u16 = 0x0002;
pub const USERS_LEFT: u16 = 0x0003;
pub const CHANNEL_MSG_TO_HOST: u16 = 0x0004;
pub const CHANNEL_MSG_TO_CLIENT: u16 = 0x0005;

/// Carries the message text.
const TAG_MSG_BLOCK: u16 = 0x0001;
/// Nested TLV-encoded [`UserInfo`] of the message's sender, appended by the
/// server before broadcasting.
const TAG_SENDER_INFORMATION: u16 = 0x0002;
/// Marker TLV: sender wants its own message echoed back.
pub const TAG_ENABLE_REFLECTION: u16 = 0x0003;

/// `UsersJoined` / `UsersLeft`: roster deltas for a room.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RosterChange {
    pub users: Vec<UserInfo>,
}

impl RosterChange {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let mut users = Vec::new();
        while !r.is_empty() {
            users.push(UserInfo::decode(r)?);
        }
        Ok(Self { users })
    }

    pub fn encode(&self, w: &mut Writer) {
        for user in &self.users {
            user.encode(w);
        }
    }
}

/// `ChannelMsgToHost`: a participant's message, broadcast to the rest of
/// the room by the handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelMsgToHost {
    pub channel: u16,
    pub tlvs: TlvBlock,
}

impl ChannelMsgToHost {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            channel: r.u16()?,
            tlvs: TlvBlock::decode_unprefixed(r)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(self.channel);
        self.tlvs.encode(w);
    }

    pub fn message_text(&self) -> Option<String> {
        self.tlvs.get(TAG_MSG_BLOCK).and_then(Tlv::as_string)
    }

    pub fn wants_reflection(&self) -> bool {
        self.tlvs.has(TAG_ENABLE_REFLECTION)
    }
}

/// `ChannelMsgToClient`: the room broadcast, carrying the original TLVs
/// plus the sender's user info.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelMsgToClient {
    pub channel: u16,
    pub tlvs: TlvBlock,
}

impl ChannelMsgToClient {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            channel: r.u16()?,
            tlvs: TlvBlock::decode_unprefixed(r)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(self.channel);
        self.tlvs.encode(w);
    }

    /// Builds the broadcast body from an incoming `ChannelMsgToHost`,
    /// appending the sender's TLV-encoded user info.
    pub fn from_host_message(msg: &ChannelMsgToHost, sender: &UserInfo) -> Self {
        let mut tlvs = msg.tlvs.clone();
        let mut w = Writer::new();
        sender.encode(&mut w);
        tlvs.push(Tlv::new(TAG_SENDER_INFORMATION, w.into_bytes()));
        Self {
            channel: msg.channel,
            tlvs,
        }
    }

    pub fn sender_info(&self) -> Result<Option<UserInfo>> {
        match self.tlvs.get(TAG_SENDER_INFORMATION) {
            Some(tlv) => Ok(Some(UserInfo::decode(&mut Reader::new(&tlv.value))?)),
            None => Ok(None),
        }
    }
}

/// Builds the text TLV for a `ChannelMsgToHost`.
#[must_use]
pub fn msg_block(text: &str) -> Tlv {
    Tlv::string(TAG_MSG_BLOCK, text)
}

/// Builds the reflection-request marker TLV.
#[must_use]
pub fn enable_reflection() -> Tlv {
    Tlv::flag(TAG_ENABLE_REFLECTION)
}
