//! ICBM food group bodies (Section 4.5: "ICBM (Instant messages)").

use super::user_info::UserInfo;
use crate::codec::{PrefixWidth, Reader, Writer};
use crate::tlv::{Tlv, TlvBlock};
use crate::Result;

pub const PARAMETER_QUERY: u16 = 0x0002;
pub const PARAMETER_REPLY: u16 = 0x0003;
pub const CHANNEL_MSG_TO_HOST: u16 = 0x0004;
pub const CHANNEL_MSG_TO_CLIENT: u16 = 0x0005;
pub const EVIL_REQUEST: u16 = 0x0006;
pub const EVIL_REPLY: u16 = 0x0007;
pub const CLIENT_EVENT: u16 = 0x0008;
pub const CLIENT_ERR: u16 = 0x0009;
pub const HOST_ACK: u16 = 0x000A;

/// TLV carrying the raw message text/fragment (channel-1 IM, or a channel-2
/// rendezvous fragment carried verbatim).
pub const TAG_MSG_BLOCK: u16 = 0x0002;
/// Marker TLV: sender wants a [`HostAck`] back.
pub const TAG_REQUEST_HOST_ACK: u16 = 0x0003;

/// `ParameterReply`: fixed maxima the client should respect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParameterReply {
    pub max_msg_size: u16,
    pub max_sender_warning: u16,
    pub max_recv_warning: u16,
}

impl ParameterReply {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            max_msg_size: r.u16()?,
            max_sender_warning: r.u16()?,
            max_recv_warning: r.u16()?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(self.max_msg_size);
        w.u16(self.max_sender_warning);
        w.u16(self.max_recv_warning);
    }
}

/// `ChannelMsgToHost`: a client sending a message (IM or rendezvous
/// fragment) to a target screen name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelMsgToHost {
    pub cookie: u64,
    pub channel: u16,
    pub target: String,
    pub tlvs: TlvBlock,
}

impl ChannelMsgToHost {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            cookie: u64::from_be_bytes(r.fixed::<8>()?),
            channel: r.u16()?,
            target: r.len_prefixed_string(PrefixWidth::U8)?,
            tlvs: TlvBlock::decode_unprefixed(r)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.fixed(&self.cookie.to_be_bytes());
        w.u16(self.channel);
        w.len_prefixed_string(PrefixWidth::U8, &self.target);
        self.tlvs.encode(w);
    }
}

/// `ChannelMsgToClient`: the server's relay of a message to its recipient,
/// with the sender's current public state attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelMsgToClient {
    pub cookie: u64,
    pub channel: u16,
    pub sender: UserInfo,
    pub tlvs: TlvBlock,
}

impl ChannelMsgToClient {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            cookie: u64::from_be_bytes(r.fixed::<8>()?),
            channel: r.u16()?,
            sender: UserInfo::decode(r)?,
            tlvs: TlvBlock::decode_unprefixed(r)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.fixed(&self.cookie.to_be_bytes());
        w.u16(self.channel);
        self.sender.encode(w);
        self.tlvs.encode(w);
    }
}

/// `EvilRequest`: warn a target. `send_as_anon` selects the anonymous
/// (30-point) or named (100-point) warning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvilRequest {
    pub target: String,
    pub send_as_anon: bool,
}

impl EvilRequest {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let send_as = r.u16()?;
        Ok(Self {
            send_as_anon: send_as != 0,
            target: r.len_prefixed_string(PrefixWidth::U8)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(u16::from(self.send_as_anon));
        w.len_prefixed_string(PrefixWidth::U8, &self.target);
    }
}

/// `EvilReply`: the warning points applied and the target's resulting total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvilReply {
    pub applied: u16,
    pub updated: u16,
}

impl EvilReply {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            applied: r.u16()?,
            updated: r.u16()?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(self.applied);
        w.u16(self.updated);
    }
}

/// `ClientEvent`: a typing indicator or similar transient event, forwarded
/// verbatim to the target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientEvent {
    pub cookie: u64,
    pub channel: u16,
    pub target: String,
    pub event_type: u16,
}

impl ClientEvent {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            cookie: u64::from_be_bytes(r.fixed::<8>()?),
            channel: r.u16()?,
            target: r.len_prefixed_string(PrefixWidth::U8)?,
            event_type: r.u16()?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.fixed(&self.cookie.to_be_bytes());
        w.u16(self.channel);
        w.len_prefixed_string(PrefixWidth::U8, &self.target);
        w.u16(self.event_type);
    }
}

/// `HostAck`: acknowledges a `ChannelMsgToHost` that requested one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostAck {
    pub cookie: u64,
    pub channel: u16,
    pub target: String,
}

impl HostAck {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            cookie: u64::from_be_bytes(r.fixed::<8>()?),
            channel: r.u16()?,
            target: r.len_prefixed_string(PrefixWidth::U8)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.fixed(&self.cookie.to_be_bytes());
        w.u16(self.channel);
        w.len_prefixed_string(PrefixWidth::U8, &self.target);
    }
}

/// Build a `RequestHostAck` marker TLV for a `ChannelMsgToHost`.
#[must_use]
pub fn request_host_ack() -> Tlv {
    Tlv::flag(TAG_REQUEST_HOST_ACK)
}

/// Build a message-text TLV for a `ChannelMsgToHost`/`ChannelMsgToClient`.
#[must_use]
pub fn msg_block(text: &str) -> Tlv {
    Tlv::string(TAG_MSG_BLOCK, text)
}
