//! TLV and TLV block codec (Section 4.1: "TLV encode/decode").

use crate::codec::{PrefixWidth, Reader, Writer};
use crate::Result;

/// A single `{Tag: u16, Length: u16, Value: bytes}` triple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tlv {
    pub tag: u16,
    pub value: Vec<u8>,
}

impl Tlv {
    #[must_use]
    pub fn new(tag: u16, value: Vec<u8>) -> Self {
        Self { tag, value }
    }

    /// Build a TLV carrying a `u8` value.
    #[must_use]
    pub fn u8(tag: u16, v: u8) -> Self {
        Self::new(tag, vec![v])
    }

    /// Build a TLV carrying a big-endian `u16` value.
    #[must_use]
    pub fn u16(tag: u16, v: u16) -> Self {
        Self::new(tag, v.to_be_bytes().to_vec())
    }

    /// Build a TLV carrying a big-endian `u32` value.
    #[must_use]
    pub fn u32(tag: u16, v: u32) -> Self {
        Self::new(tag, v.to_be_bytes().to_vec())
    }

    /// Build a TLV carrying a raw (unprefixed) UTF-8 string.
    #[must_use]
    pub fn string(tag: u16, v: &str) -> Self {
        Self::new(tag, v.as_bytes().to_vec())
    }

    /// Build an empty, marker-only TLV (e.g. `RequestHostAck`).
    #[must_use]
    pub fn flag(tag: u16) -> Self {
        Self::new(tag, Vec::new())
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let tag = r.u16()?;
        let value = r.len_prefixed_bytes(PrefixWidth::U16)?;
        Ok(Self { tag, value })
    }

    fn encode(&self, w: &mut Writer) {
        w.u16(self.tag);
        w.len_prefixed_bytes(PrefixWidth::U16, &self.value);
    }

    #[must_use]
    pub fn as_u8(&self) -> Option<u8> {
        self.value.first().copied()
    }

    #[must_use]
    pub fn as_u16(&self) -> Option<u16> {
        let b: [u8; 2] = self.value.as_slice().try_into().ok()?;
        Some(u16::from_be_bytes(b))
    }

    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        let b: [u8; 4] = self.value.as_slice().try_into().ok()?;
        Some(u32::from_be_bytes(b))
    }

    #[must_use]
    pub fn as_string(&self) -> Option<String> {
        String::from_utf8(self.value.clone()).ok()
    }
}

/// An ordered sequence of [`Tlv`]s. Lookup by tag returns the first
/// occurrence; unknown tags round-trip verbatim since the block simply
/// stores every `Tlv` it decoded, known or not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TlvBlock(pub Vec<Tlv>);

impl TlvBlock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tlv: Tlv) -> &mut Self {
        self.0.push(tlv);
        self
    }

    #[must_use]
    pub fn get(&self, tag: u16) -> Option<&Tlv> {
        self.0.iter().find(|t| t.tag == tag)
    }

    #[must_use]
    pub fn get_all(&self, tag: u16) -> Vec<&Tlv> {
        self.0.iter().filter(|t| t.tag == tag).collect()
    }

    #[must_use]
    pub fn has(&self, tag: u16) -> bool {
        self.get(tag).is_some()
    }

    /// Decode a TLV block with no outer length prefix — the caller already
    /// knows how many bytes belong to the block (e.g. "rest of the SNAC").
    pub fn decode_unprefixed(r: &mut Reader<'_>) -> Result<Self> {
        let mut tlvs = Vec::new();
        while !r.is_empty() {
            tlvs.push(Tlv::decode(r)?);
        }
        Ok(Self(tlvs))
    }

    /// Decode a TLV block prefixed by a count of entries.
    pub fn decode_count_prefixed(r: &mut Reader<'_>, width: PrefixWidth) -> Result<Self> {
        let tlvs = r.count_prefixed(width, Tlv::decode)?;
        Ok(Self(tlvs))
    }

    pub fn encode(&self, w: &mut Writer) {
        for tlv in &self.0 {
            tlv.encode(w);
        }
    }

    pub fn encode_count_prefixed(&self, w: &mut Writer, width: PrefixWidth) {
        w.count_prefixed(width, &self.0, |w, tlv| tlv.encode(w));
    }
}

impl FromIterator<Tlv> for TlvBlock {
    fn from_iter<I: IntoIterator<Item = Tlv>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_unprefixed_block_preserving_order_and_unknown_tags() {
        let mut block = TlvBlock::new();
        block
            .push(Tlv::u16(0x0001, 42))
            .push(Tlv::string(0x0002, "hi"))
            .push(Tlv::new(0xBEEF, vec![1, 2, 3])); // unknown tag

        let mut w = Writer::new();
        block.encode(&mut w);
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        let decoded = TlvBlock::decode_unprefixed(&mut r).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decoded.get(0x0001).unwrap().as_u16(), Some(42));
        assert_eq!(decoded.get(0x0002).unwrap().as_string().unwrap(), "hi");
        assert_eq!(decoded.get(0xBEEF).unwrap().value, vec![1, 2, 3]);
    }

    #[test]
    fn get_returns_first_occurrence() {
        let mut block = TlvBlock::new();
        block.push(Tlv::u8(0x01, 1)).push(Tlv::u8(0x01, 2));
        assert_eq!(block.get(0x01).unwrap().as_u8(), Some(1));
        assert_eq!(block.get_all(0x01).len(), 2);
    }

    #[test]
    fn roundtrips_count_prefixed_block() {
        let mut block = TlvBlock::new();
        block.push(Tlv::u8(0x01, 7));
        let mut w = Writer::new();
        block.encode_count_prefixed(&mut w, PrefixWidth::U16);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let decoded = TlvBlock::decode_count_prefixed(&mut r, PrefixWidth::U16).unwrap();
        assert_eq!(decoded, block);
    }
}
