//! OService food group bodies (Section 4.5: "OService").

use super::user_info::UserInfo;
use crate::codec::{PrefixWidth, Reader, Writer};
use crate::tlv::TlvBlock;
use crate::Result;

pub const CLIENT_VERSIONS: u16 = 0x0002;
pub const HOST_VERSIONS: u16 = 0x0003;
pub const RATE_PARAMS_QUERY: u16 = 0x0004;
pub const RATE_PARAMS_REPLY: u16 = 0x0005;
pub const RATE_PARAMS_SUB_ADD: u16 = 0x0006;
pub const USER_INFO_QUERY: u16 = 0x0007;
pub const USER_INFO_UPDATE: u16 = 0x0008;
pub const IDLE_NOTIFICATION: u16 = 0x0009;
pub const SET_USER_INFO_FIELDS: u16 = 0x000A;
pub const CLIENT_ONLINE: u16 = 0x000B;
pub const SERVICE_REQUEST: u16 = 0x000C;
pub const SERVICE_RESPONSE: u16 = 0x000D;
pub const EVIL_NOTIFICATION: u16 = 0x000E;
pub const EVIL_NOTIFICATION_ANON: u16 = 0x000F;

fn decode_family_list(r: &mut Reader<'_>) -> Result<Vec<(u16, u16)>> {
    let mut out = Vec::new();
    while r.remaining() >= 4 {
        out.push((r.u16()?, r.u16()?));
    }
    Ok(out)
}

fn encode_family_list(w: &mut Writer, families: &[(u16, u16)]) {
    for (family, version) in families {
        w.u16(*family);
        w.u16(*version);
    }
}

/// Client's accepted `(family, version)` pairs, echoed back by the server.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ClientVersions {
    pub families: Vec<(u16, u16)>,
}

impl ClientVersions {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            families: decode_family_list(r)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        encode_family_list(w, &self.families);
    }
}

/// Server's accepted `(family, version)` pairs — same shape as the request.
pub type HostVersions = ClientVersions;

/// One rate-limiting class, advertised but never enforced (Section 4.5:
/// "`RateParamsSubAdd`: silently accepted").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateClass {
    pub id: u16,
    pub window_size: u32,
    pub clear_level: u32,
    pub alert_level: u32,
    pub limit_level: u32,
    pub disconnect_level: u32,
    pub current_level: u32,
    pub max_level: u32,
}

impl RateClass {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            id: r.u16()?,
            window_size: r.u32()?,
            clear_level: r.u32()?,
            alert_level: r.u32()?,
            limit_level: r.u32()?,
            disconnect_level: r.u32()?,
            current_level: r.u32()?,
            max_level: r.u32()?,
        })
    }

    fn encode(&self, w: &mut Writer) {
        w.u16(self.id);
        w.u32(self.window_size);
        w.u32(self.clear_level);
        w.u32(self.alert_level);
        w.u32(self.limit_level);
        w.u32(self.disconnect_level);
        w.u32(self.current_level);
        w.u32(self.max_level);
    }
}

/// `RateParamsReply`: a fixed rate-class plus every `(FoodGroup, SubGroup)`
/// pair the server recognises, mapped to the class that governs it.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RateParamsReply {
    pub classes: Vec<RateClass>,
    /// `(food_group, sub_group, rate_class_id)`.
    pub group_rates: Vec<(u16, u16, u16)>,
}

impl RateParamsReply {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let classes = r.count_prefixed(PrefixWidth::U16, RateClass::decode)?;
        let group_rates = r.count_prefixed(PrefixWidth::U16, |r| {
            Ok((r.u16()?, r.u16()?, r.u16()?))
        })?;
        Ok(Self {
            classes,
            group_rates,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.count_prefixed(PrefixWidth::U16, &self.classes, |w, c| c.encode(w));
        w.count_prefixed(PrefixWidth::U16, &self.group_rates, |w, (fg, sg, id)| {
            w.u16(*fg);
            w.u16(*sg);
            w.u16(*id);
        });
    }
}

/// Client acknowledging it will honor a rate class; logically ignored.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RateParamsSubAdd {
    pub class_ids: Vec<u16>,
}

impl RateParamsSubAdd {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let mut class_ids = Vec::new();
        while r.remaining() >= 2 {
            class_ids.push(r.u16()?);
        }
        Ok(Self { class_ids })
    }

    pub fn encode(&self, w: &mut Writer) {
        for id in &self.class_ids {
            w.u16(*id);
        }
    }
}

/// `UserInfoUpdate`: the caller's own current state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserInfoUpdate {
    pub info: UserInfo,
}

impl UserInfoUpdate {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            info: UserInfo::decode(r)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        self.info.encode(w);
    }
}

/// `IdleNotification`: `0` clears idle, otherwise sets idle-since.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdleNotification {
    pub idle_seconds: u32,
}

impl IdleNotification {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            idle_seconds: r.u32()?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u32(self.idle_seconds);
    }
}

/// `SetUserInfoFields`: a free-form TLV block; the server only interprets
/// the status TLV (Section 4.5).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SetUserInfoFields {
    pub tlvs: TlvBlock,
}

impl SetUserInfoFields {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            tlvs: TlvBlock::decode_unprefixed(r)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        self.tlvs.encode(w);
    }
}

/// `ClientOnline`: marks the session interactive; carries the same
/// `(family, version)` shape as `ClientVersions`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ClientOnline {
    pub families: Vec<(u16, u16)>,
}

impl ClientOnline {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            families: decode_family_list(r)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        encode_family_list(w, &self.families);
    }
}

/// `ServiceRequest`: ask to be connected to a service for `food_group`,
/// e.g. Chat with the target room's cookie.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceRequest {
    pub food_group: u16,
    pub room_exchange: u16,
    pub room_cookie: [u8; 16],
    pub room_instance: u16,
}

const TAG_ROOM_INFO: u16 = 0x0001;

impl ServiceRequest {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let food_group = r.u16()?;
        let block = TlvBlock::decode_unprefixed(r)?;
        let room = block
            .get(TAG_ROOM_INFO)
            .ok_or_else(|| crate::WireError::Malformed("missing room info TLV".into()))?;
        let mut rr = Reader::new(&room.value);
        let room_exchange = rr.u16()?;
        let room_cookie = rr.fixed::<16>()?;
        let room_instance = rr.u16()?;
        Ok(Self {
            food_group,
            room_exchange,
            room_cookie,
            room_instance,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(self.food_group);
        let mut inner = Writer::new();
        inner.u16(self.room_exchange);
        inner.fixed(&self.room_cookie);
        inner.u16(self.room_instance);
        let mut block = TlvBlock::new();
        block.push(crate::tlv::Tlv::new(TAG_ROOM_INFO, inner.into_bytes()));
        block.encode(w);
    }
}

/// `ServiceResponse`: the connection details for the requested service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceResponse {
    pub service_food_group: u16,
    pub host: String,
    pub port: u16,
    pub cookie: [u8; 16],
}

const TAG_HOST: u16 = 0x0001;
const TAG_PORT: u16 = 0x0002;
const TAG_COOKIE: u16 = 0x0003;

impl ServiceResponse {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let service_food_group = r.u16()?;
        let block = TlvBlock::decode_unprefixed(r)?;
        let host = block
            .get(TAG_HOST)
            .and_then(crate::tlv::Tlv::as_string)
            .unwrap_or_default();
        let port = block.get(TAG_PORT).and_then(crate::tlv::Tlv::as_u16).unwrap_or(0);
        let cookie = block
            .get(TAG_COOKIE)
            .and_then(|t| t.value.as_slice().try_into().ok())
            .unwrap_or([0u8; 16]);
        Ok(Self {
            service_food_group,
            host,
            port,
            cookie,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(self.service_food_group);
        let mut block = TlvBlock::new();
        block
            .push(crate::tlv::Tlv::string(TAG_HOST, &self.host))
            .push(crate::tlv::Tlv::u16(TAG_PORT, self.port))
            .push(crate::tlv::Tlv::new(TAG_COOKIE, self.cookie.to_vec()));
        block.encode(w);
    }
}

/// `OServiceEvilNotification`: a named warning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvilNotification {
    pub new_evil: u16,
    pub snitcher: UserInfo,
}

impl EvilNotification {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            new_evil: r.u16()?,
            snitcher: UserInfo::decode(r)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(self.new_evil);
        self.snitcher.encode(w);
    }
}

/// `OServiceEvilNotificationAnon`: an anonymous warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvilNotificationAnon {
    pub new_evil: u16,
}

impl EvilNotificationAnon {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            new_evil: r.u16()?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(self.new_evil);
    }
}
