//! Capability tags (Section GLOSSARY: "Capability").

/// A 16-byte identifier advertising an optional client feature (chat, file
/// transfer, ...). Carried verbatim on the wire; the server never interprets
/// the bytes beyond comparing them for membership in a session's set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Capability(pub [u8; 16]);

impl Capability {
    /// Well-known capability: basic chat (used by `ServiceRequest` replies).
    pub const CHAT: Capability = Capability([
        0x74, 0x8f, 0x24, 0x20, 0x62, 0x87, 0x11, 0xd1, 0x82, 0x22, 0x44, 0x45, 0x53, 0x54, 0x00,
        0x00,
    ]);
}

impl From<[u8; 16]> for Capability {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}
