//! Feedbag food group bodies (Section 4.5: "Feedbag"), the server-side
//! buddy-list storage format.

use crate::codec::{PrefixWidth, Reader, Writer};
use crate::tlv::TlvBlock;
use crate::Result;

pub const RIGHTS_QUERY: u16 = 0x0002;
pub const RIGHTS_REPLY: u16 = 0x0003;
pub const QUERY: u16 = 0x0004;
pub const REPLY: u16 = 0x0005;
pub const QUERY_IF_MODIFIED: u16 = 0x0006;
pub const INSERT_ITEM: u16 = 0x0007;
pub const UPDATE_ITEM: u16 = 0x0008;
pub const DELETE_ITEM: u16 = 0x0009;
pub const STATUS: u16 = 0x000A;
pub const START_CLUSTER: u16 = 0x000B;
pub const END_CLUSTER: u16 = 0x000C;

/// One stored buddy-list entry: a buddy, a group, a permit/deny mask, or
/// similar, disambiguated by `class_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbagItem {
    pub name: String,
    pub group_id: u16,
    pub item_id: u16,
    pub class_id: u16,
    pub tlvs: TlvBlock,
}

impl FeedbagItem {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            name: r.len_prefixed_string(PrefixWidth::U16)?,
            group_id: r.u16()?,
            item_id: r.u16()?,
            class_id: r.u16()?,
            tlvs: TlvBlock::decode_count_prefixed(r, PrefixWidth::U16)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.len_prefixed_string(PrefixWidth::U16, &self.name);
        w.u16(self.group_id);
        w.u16(self.item_id);
        w.u16(self.class_id);
        self.tlvs.encode_count_prefixed(w, PrefixWidth::U16);
    }
}

fn decode_items(r: &mut Reader<'_>) -> Result<Vec<FeedbagItem>> {
    let mut items = Vec::new();
    while !r.is_empty() {
        items.push(FeedbagItem::decode(r)?);
    }
    Ok(items)
}

fn encode_items(w: &mut Writer, items: &[FeedbagItem]) {
    for item in items {
        item.encode(w);
    }
}

/// `Reply`: the full persisted list, plus the server's last-update time so
/// the client can cache it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbagReply {
    pub last_update: u32,
    pub items: Vec<FeedbagItem>,
}

impl FeedbagReply {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let last_update = r.u32()?;
        Ok(Self {
            last_update,
            items: decode_items(r)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u32(self.last_update);
        encode_items(w, &self.items);
    }
}

/// `QueryIfModified`: the client's cached last-update time; the server
/// replies with a fresh [`FeedbagReply`] only if storage changed since.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryIfModified {
    pub last_update: u32,
}

impl QueryIfModified {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            last_update: r.u32()?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u32(self.last_update);
    }
}

/// `InsertItem` / `UpdateItem` / `DeleteItem`: a batch of items to apply.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ItemBatch {
    pub items: Vec<FeedbagItem>,
}

impl ItemBatch {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            items: decode_items(r)?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        encode_items(w, &self.items);
    }
}

/// `Status`: one result code per item of the batch that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Status {
    pub codes: Vec<u16>,
}

impl Status {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let mut codes = Vec::new();
        while !r.is_empty() {
            codes.push(r.u16()?);
        }
        Ok(Self { codes })
    }

    pub fn encode(&self, w: &mut Writer) {
        for code in &self.codes {
            w.u16(*code);
        }
    }
}
