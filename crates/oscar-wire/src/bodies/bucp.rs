//! BUCP food group bodies (Section 4.5: "BUCP"), the pre-BOS
//! authentication handshake handled only on the dedicated auth listener.

use crate::codec::{PrefixWidth, Reader, Writer};
use crate::tlv::{Tlv, TlvBlock};
use crate::Result;

pub const CHALLENGE_REQUEST: u16 = 0x0002;
pub const CHALLENGE_RESPONSE: u16 = 0x0003;
pub const LOGIN_REQUEST: u16 = 0x0004;
pub const LOGIN_RESPONSE: u16 = 0x0005;

const TAG_SCREEN_NAME: u16 = 0x0001;
const TAG_PASSWORD_HASH: u16 = 0x0002;
const TAG_AUTH_KEY: u16 = 0x0003;
const TAG_BOS_HOST: u16 = 0x0004;
const TAG_LOGIN_COOKIE: u16 = 0x0005;
const TAG_ERROR_SUBCODE: u16 = 0x0006;

/// Subcodes used in a failing [`LoginResponse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorSubcode {
    InvalidUsername = 0x0001,
    BadPassword = 0x0002,
}

/// `ChallengeRequest`: the first BUCP message, naming the screen name the
/// client wants to authenticate as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChallengeRequest {
    pub screen_name: String,
}

impl ChallengeRequest {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let block = TlvBlock::decode_count_prefixed(r, PrefixWidth::U16)?;
        Ok(Self {
            screen_name: block
                .get(TAG_SCREEN_NAME)
                .and_then(Tlv::as_string)
                .unwrap_or_default(),
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        let mut block = TlvBlock::new();
        block.push(Tlv::string(TAG_SCREEN_NAME, &self.screen_name));
        block.encode_count_prefixed(w, PrefixWidth::U16);
    }
}

/// `ChallengeResponse`: a fresh per-attempt key the client folds into its
/// password hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChallengeResponse {
    pub auth_key: String,
}

impl ChallengeResponse {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let block = TlvBlock::decode_count_prefixed(r, PrefixWidth::U16)?;
        Ok(Self {
            auth_key: block
                .get(TAG_AUTH_KEY)
                .and_then(Tlv::as_string)
                .unwrap_or_default(),
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        let mut block = TlvBlock::new();
        block.push(Tlv::string(TAG_AUTH_KEY, &self.auth_key));
        block.encode_count_prefixed(w, PrefixWidth::U16);
    }
}

/// `LoginRequest`: the screen name plus the client's computed password
/// hash (MD5 of `auth_key || md5(password) || "AOL Instant Messenger (SM)"`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginRequest {
    pub screen_name: String,
    pub password_hash: [u8; 16],
}

impl LoginRequest {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let block = TlvBlock::decode_count_prefixed(r, PrefixWidth::U16)?;
        let screen_name = block
            .get(TAG_SCREEN_NAME)
            .and_then(Tlv::as_string)
            .unwrap_or_default();
        let password_hash = block
            .get(TAG_PASSWORD_HASH)
            .map(|t| {
                let mut buf = [0u8; 16];
                let n = t.value.len().min(16);
                buf[..n].copy_from_slice(&t.value[..n]);
                buf
            })
            .unwrap_or([0u8; 16]);
        Ok(Self {
            screen_name,
            password_hash,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        let mut block = TlvBlock::new();
        block.push(Tlv::string(TAG_SCREEN_NAME, &self.screen_name));
        block.push(Tlv::new(TAG_PASSWORD_HASH, self.password_hash.to_vec()));
        block.encode_count_prefixed(w, PrefixWidth::U16);
    }
}

/// `LoginResponse`: either a BOS redirect plus login cookie, or an error
/// subcode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginResponse {
    pub screen_name: String,
    pub bos_host: Option<String>,
    pub login_cookie: Option<Vec<u8>>,
    pub error_subcode: Option<u16>,
}

impl LoginResponse {
    pub fn success(screen_name: impl Into<String>, bos_host: impl Into<String>, cookie: Vec<u8>) -> Self {
        Self {
            screen_name: screen_name.into(),
            bos_host: Some(bos_host.into()),
            login_cookie: Some(cookie),
            error_subcode: None,
        }
    }

    pub fn failure(screen_name: impl Into<String>, subcode: ErrorSubcode) -> Self {
        Self {
            screen_name: screen_name.into(),
            bos_host: None,
            login_cookie: None,
            error_subcode: Some(subcode as u16),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_subcode.is_none()
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let block = TlvBlock::decode_count_prefixed(r, PrefixWidth::U16)?;
        Ok(Self {
            screen_name: block
                .get(TAG_SCREEN_NAME)
                .and_then(Tlv::as_string)
                .unwrap_or_default(),
            bos_host: block.get(TAG_BOS_HOST).and_then(Tlv::as_string),
            login_cookie: block.get(TAG_LOGIN_COOKIE).map(|t| t.value.clone()),
            error_subcode: block.get(TAG_ERROR_SUBCODE).and_then(Tlv::as_u16),
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        let mut block = TlvBlock::new();
        block.push(Tlv::string(TAG_SCREEN_NAME, &self.screen_name));
        if let Some(host) = &self.bos_host {
            block.push(Tlv::string(TAG_BOS_HOST, host));
        }
        if let Some(cookie) = &self.login_cookie {
            block.push(Tlv::new(TAG_LOGIN_COOKIE, cookie.clone()));
        }
        if let Some(subcode) = self.error_subcode {
            block.push(Tlv::u16(TAG_ERROR_SUBCODE, subcode));
        }
        block.encode_count_prefixed(w, PrefixWidth::U16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_challenge_exchange() {
        let req = ChallengeRequest {
            screen_name: "BobSmith".to_string(),
        };
        let mut w = Writer::new();
        req.encode(&mut w);
        assert_eq!(
            ChallengeRequest::decode(&mut Reader::new(&w.into_bytes())).unwrap(),
            req
        );

        let resp = ChallengeResponse {
            auth_key: "abc123".to_string(),
        };
        let mut w = Writer::new();
        resp.encode(&mut w);
        assert_eq!(
            ChallengeResponse::decode(&mut Reader::new(&w.into_bytes())).unwrap(),
            resp
        );
    }

    #[test]
    fn roundtrips_login_request_with_hash() {
        let req = LoginRequest {
            screen_name: "BobSmith".to_string(),
            password_hash: [9u8; 16],
        };
        let mut w = Writer::new();
        req.encode(&mut w);
        let decoded = LoginRequest::decode(&mut Reader::new(&w.into_bytes())).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn roundtrips_successful_and_failing_login_response() {
        let ok = LoginResponse::success("BobSmith", "bos.example.com:5190", vec![1, 2, 3]);
        let mut w = Writer::new();
        ok.encode(&mut w);
        let decoded = LoginResponse::decode(&mut Reader::new(&w.into_bytes())).unwrap();
        assert_eq!(decoded, ok);
        assert!(decoded.is_success());

        let err = LoginResponse::failure("BobSmith", ErrorSubcode::BadPassword);
        let mut w = Writer::new();
        err.encode(&mut w);
        let decoded = LoginResponse::decode(&mut Reader::new(&w.into_bytes())).unwrap();
        assert_eq!(decoded, err);
        assert!(!decoded.is_success());
    }
}
