//! Typed SNAC bodies, one module per food group (Section 4.5).
//!
//! Every subgroup reserves `0x0001` for the generic error reply
//! (`snac::ERROR_SUBGROUP`); the constants below start at `0x0002`.

pub mod alert;
pub mod bucp;
pub mod buddy;
pub mod chat;
pub mod chat_nav;
pub mod feedbag;
pub mod icbm;
pub mod locate;
pub mod oservice;

/// User info shared by every place the protocol describes a screen name's
/// public state: `BuddyArrived`/`BuddyDeparted` notifications,
/// `UserInfoUpdate`/`UserInfoReply`, and the sender-info TLV attached to
/// relayed messages.
pub mod user_info {
    use crate::codec::{PrefixWidth, Reader, Writer};
    use crate::tlv::{Tlv, TlvBlock};
    use crate::Result;

    pub const TAG_WARNING_LEVEL: u16 = 0x0001;
    pub const TAG_CAPABILITIES: u16 = 0x0002;
    pub const TAG_SIGNON_TIME: u16 = 0x0003;
    pub const TAG_IDLE_MINUTES: u16 = 0x0004;
    pub const TAG_USER_STATUS: u16 = 0x0006;

    /// Bit set in [`TAG_USER_STATUS`] when the user has invisibility on.
    pub const STATUS_INVISIBLE: u16 = 0x0100;

    /// A screen name plus its public TLV-encoded state.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct UserInfo {
        pub screen_name: String,
        pub warning_level: u16,
        pub capabilities: Vec<[u8; 16]>,
        pub signon_time: u32,
        /// Idle minutes; `0` means not idle.
        pub idle_minutes: u16,
        pub invisible: bool,
    }

    impl UserInfo {
        pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
            let screen_name = r.len_prefixed_string(PrefixWidth::U8)?;
            let block = TlvBlock::decode_count_prefixed(r, PrefixWidth::U16)?;
            let warning_level = block.get(TAG_WARNING_LEVEL).and_then(Tlv::as_u16).unwrap_or(0);
            let capabilities = block
                .get(TAG_CAPABILITIES)
                .map(|t| {
                    t.value
                        .chunks_exact(16)
                        .map(|c| c.try_into().unwrap_or([0u8; 16]))
                        .collect()
                })
                .unwrap_or_default();
            let signon_time = block.get(TAG_SIGNON_TIME).and_then(Tlv::as_u32).unwrap_or(0);
            let idle_minutes = block.get(TAG_IDLE_MINUTES).and_then(Tlv::as_u16).unwrap_or(0);
            let invisible = block
                .get(TAG_USER_STATUS)
                .and_then(Tlv::as_u16)
                .map(|v| v & STATUS_INVISIBLE != 0)
                .unwrap_or(false);
            Ok(Self {
                screen_name,
                warning_level,
                capabilities,
                signon_time,
                idle_minutes,
                invisible,
            })
        }

        pub fn encode(&self, w: &mut Writer) {
            w.len_prefixed_string(PrefixWidth::U8, &self.screen_name);
            let mut block = TlvBlock::new();
            block.push(Tlv::u16(TAG_WARNING_LEVEL, self.warning_level));
            if !self.capabilities.is_empty() {
                let mut caps = Vec::with_capacity(self.capabilities.len() * 16);
                for c in &self.capabilities {
                    caps.extend_from_slice(c);
                }
                block.push(Tlv::new(TAG_CAPABILITIES, caps));
            }
            block.push(Tlv::u32(TAG_SIGNON_TIME, self.signon_time));
            block.push(Tlv::u16(TAG_IDLE_MINUTES, self.idle_minutes));
            let status = if self.invisible { STATUS_INVISIBLE } else { 0 };
            block.push(Tlv::u16(TAG_USER_STATUS, status));
            block.encode_count_prefixed(w, PrefixWidth::U16);
        }
    }

}
