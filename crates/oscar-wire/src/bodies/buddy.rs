//! Buddy food group bodies (Section 4.5: "Buddy").

use super::user_info::UserInfo;
use crate::codec::{PrefixWidth, Reader, Writer};
use crate::Result;

pub const RIGHTS_QUERY: u16 = 0x0002;
pub const RIGHTS_REPLY: u16 = 0x0003;
pub const ADD_BUDDIES: u16 = 0x0004;
pub const DEL_BUDDIES: u16 = 0x0005;
pub const BUDDY_ARRIVED: u16 = 0x0006;
pub const BUDDY_DEPARTED: u16 = 0x0007;

/// `RightsReply`: fixed maxima the client should respect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RightsReply {
    pub max_buddies: u16,
    pub max_watchers: u16,
}

impl RightsReply {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            max_buddies: r.u16()?,
            max_watchers: r.u16()?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u16(self.max_buddies);
        w.u16(self.max_watchers);
    }
}

fn decode_screen_names(r: &mut Reader<'_>) -> Result<Vec<String>> {
    let mut out = Vec::new();
    while !r.is_empty() {
        out.push(r.len_prefixed_string(PrefixWidth::U8)?);
    }
    Ok(out)
}

fn encode_screen_names(w: &mut Writer, names: &[String]) {
    for name in names {
        w.len_prefixed_string(PrefixWidth::U8, name);
    }
}

/// `AddBuddies` / `DelBuddies`: a flat list of screen names forwarded to the
/// Feedbag collaborator (Section 4.5).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BuddyNameList {
    pub screen_names: Vec<String>,
}

impl BuddyNameList {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            screen_names: decode_screen_names(r)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        encode_screen_names(w, &self.screen_names);
    }
}

/// `BuddyArrived`: a buddy's current public state, sent when they come
/// online or their visible state changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuddyArrived {
    pub info: UserInfo,
}

impl BuddyArrived {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            info: UserInfo::decode(r)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        self.info.encode(w);
    }
}

/// `BuddyDeparted`: identifies who went offline (or invisible).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuddyDeparted {
    pub screen_name: String,
}

impl BuddyDeparted {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            screen_name: r.len_prefixed_string(PrefixWidth::U8)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.len_prefixed_string(PrefixWidth::U8, &self.screen_name);
    }
}
