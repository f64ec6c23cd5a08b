//! Shared harness: boots a complete in-process OSCAR server on ephemeral
//! ports and drives it with a bare FLAP/SNAC client, the same way a real
//! AIM client would — no mocking of the dispatch loop or the listeners.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use md5::{Digest, Md5};
use oscar_server::collab::{MemoryAuth, MemoryPersistence, UserRecord};
use oscar_server::{dispatcher, AppState, ServerConfig};
use oscar_wire::bodies::bucp;
use oscar_wire::codec::{Reader, Writer};
use oscar_wire::flap::{FlapFrame, FrameType, SequenceCounter};
use oscar_wire::snac::{RawSnac, SnacHeader};
use oscar_wire::tlv::{Tlv, TlvBlock};
use oscar_types::FoodGroup;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const TAG_COOKIE: u16 = 0x0006;
const TAG_ROOM_COOKIE: u16 = 0x0007;
const FLAP_VERSION: u32 = 1;

const AIM_PASSWORD_SUFFIX: &[u8] = b"AOL Instant Messenger (SM)";

/// How long to wait for a notification before concluding none is coming.
pub const SILENCE_WINDOW: Duration = Duration::from_millis(200);

/// A complete server bound to ephemeral localhost ports, backed by the
/// in-memory collaborators.
pub struct TestServer {
    pub persistence: Arc<MemoryPersistence>,
    pub auth_addr: SocketAddr,
    pub bos_addr: SocketAddr,
    pub chat_addr: SocketAddr,
}

impl TestServer {
    pub async fn start() -> Self {
        let auth_listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind auth listener");
        let bos_listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind BOS listener");
        let chat_listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind chat listener");

        let auth_addr = auth_listener.local_addr().expect("auth listener address");
        let bos_addr = bos_listener.local_addr().expect("BOS listener address");
        let chat_addr = chat_listener.local_addr().expect("chat listener address");

        let mut config = ServerConfig::default();
        config.network.oscar_host = "127.0.0.1".to_string();
        config.network.auth_port = auth_addr.port();
        config.network.bos_port = bos_addr.port();
        config.network.chat_port = chat_addr.port();

        let persistence = Arc::new(MemoryPersistence::new());
        let auth = Arc::new(MemoryAuth::new(persistence.clone(), false));
        let state = AppState::new(config, persistence.clone(), auth);

        spawn_accept_loop(auth_listener, state.clone(), dispatcher::run_auth_connection);
        spawn_accept_loop(bos_listener, state.clone(), dispatcher::run_bos_connection);
        spawn_accept_loop(chat_listener, state.clone(), dispatcher::run_chat_connection);

        Self {
            persistence,
            auth_addr,
            bos_addr,
            chat_addr,
        }
    }

    /// Registers an account directly against the persistence collaborator
    /// (account creation itself is out of scope here).
    pub async fn register_user(&self, screen_name: &str, password: &str) {
        self.persistence
            .insert_user(UserRecord {
                screen_name: screen_name.to_string(),
                password: password.to_string(),
            })
            .await;
    }

    pub async fn set_buddies(&self, name: &str, buddies: Vec<&str>) {
        self.persistence
            .set_buddies(name, buddies.into_iter().map(str::to_string).collect())
            .await;
    }

    pub async fn set_blocked(&self, blocker: &str, blocked: &str) {
        self.persistence.set_blocked(blocker, blocked).await;
    }
}

fn spawn_accept_loop<F, Fut>(listener: TcpListener, state: Arc<AppState>, handle: F)
where
    F: Fn(Arc<AppState>, TcpStream, SocketAddr) -> Fut + Copy + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        while let Ok((stream, peer)) = listener.accept().await {
            let state = state.clone();
            tokio::spawn(async move { handle(state, stream, peer).await });
        }
    });
}

/// `MD5(auth_key || MD5(password) || "AOL Instant Messenger (SM)")`, the
/// hash a real client computes over the wire.
pub fn password_hash(auth_key: &str, password: &str) -> [u8; 16] {
    let inner = Md5::digest(password.as_bytes());
    let mut hasher = Md5::new();
    hasher.update(auth_key.as_bytes());
    hasher.update(inner);
    hasher.update(AIM_PASSWORD_SUFFIX);
    hasher.finalize().into()
}

async fn read_frame(stream: &mut TcpStream) -> std::io::Result<FlapFrame> {
    let mut header = [0u8; 6];
    stream.read_exact(&mut header).await?;
    let (frame_type, sequence, payload_len) = FlapFrame::decode_header(&header)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string()))?;
    let mut payload = vec![0u8; payload_len as usize];
    if payload_len > 0 {
        stream.read_exact(&mut payload).await?;
    }
    Ok(FlapFrame::new(frame_type, sequence, payload))
}

/// A bare FLAP/SNAC client over a real socket — everything a production
/// AIM client would implement, reduced to what the scenarios need.
pub struct TestClient {
    stream: TcpStream,
    seq: SequenceCounter,
}

impl TestClient {
    /// Connects and consumes the server's initial Signon frame.
    pub async fn connect(addr: SocketAddr) -> Self {
        let mut stream = TcpStream::connect(addr).await.expect("connect to server");
        read_frame(&mut stream).await.expect("server signon frame");
        Self {
            stream,
            seq: SequenceCounter::starting_at(1),
        }
    }

    async fn write_frame(&mut self, frame_type: FrameType, payload: Vec<u8>) {
        let frame = FlapFrame::new(frame_type, self.seq.next(), payload);
        self.stream.write_all(&frame.encode()).await.expect("write FLAP frame");
    }

    /// Completes the handshake with an empty Signon payload — sufficient
    /// for the auth listener, which doesn't inspect it.
    pub async fn signon_bare(&mut self) {
        let mut w = Writer::new();
        w.u32(FLAP_VERSION);
        self.write_frame(FrameType::Signon, w.into_bytes()).await;
    }

    /// Completes the BOS handshake, carrying the minted login cookie.
    pub async fn signon_bos(&mut self, login_cookie: &[u8]) {
        let mut w = Writer::new();
        w.u32(FLAP_VERSION);
        let mut block = TlvBlock::new();
        block.push(Tlv::new(TAG_COOKIE, login_cookie.to_vec()));
        block.encode(&mut w);
        self.write_frame(FrameType::Signon, w.into_bytes()).await;
    }

    /// Completes the chat handshake, carrying both the login cookie and
    /// the chat cookie minted for this session by `ServiceRequest`.
    pub async fn signon_chat(&mut self, login_cookie: &[u8], chat_cookie: &[u8]) {
        let mut w = Writer::new();
        w.u32(FLAP_VERSION);
        let mut block = TlvBlock::new();
        block
            .push(Tlv::new(TAG_COOKIE, login_cookie.to_vec()))
            .push(Tlv::new(TAG_ROOM_COOKIE, chat_cookie.to_vec()));
        block.encode(&mut w);
        self.write_frame(FrameType::Signon, w.into_bytes()).await;
    }

    pub async fn send_snac(&mut self, header: SnacHeader, body: Vec<u8>) {
        let snac = RawSnac { header, body };
        self.write_frame(FrameType::Data, snac.encode()).await;
    }

    pub async fn recv_snac(&mut self) -> RawSnac {
        let frame = read_frame(&mut self.stream).await.expect("read SNAC frame");
        assert_eq!(frame.frame_type, FrameType::Data, "expected a Data frame");
        RawSnac::decode(&frame.payload).expect("decode SNAC body")
    }

    pub async fn recv_snac_timeout(&mut self, dur: Duration) -> Option<RawSnac> {
        tokio::time::timeout(dur, self.recv_snac()).await.ok()
    }

    /// Asserts that no SNAC arrives within `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) {
        assert!(
            self.recv_snac_timeout(dur).await.is_none(),
            "expected no further SNAC on this connection, but one arrived"
        );
    }

    /// Cleanly signs off by closing the socket, the same as a client
    /// quitting or losing its connection.
    pub async fn disconnect(mut self) {
        let _ = self.stream.shutdown().await;
    }
}

/// Drives the full BUCP handshake for `screen_name`/`password` and
/// returns the minted login cookie.
pub async fn login(server: &TestServer, screen_name: &str, password: &str) -> Vec<u8> {
    let mut client = TestClient::connect(server.auth_addr).await;
    client.signon_bare().await;

    let mut w = Writer::new();
    bucp::ChallengeRequest {
        screen_name: screen_name.to_string(),
    }
    .encode(&mut w);
    client
        .send_snac(SnacHeader::new(FoodGroup::Bucp.as_u16(), bucp::CHALLENGE_REQUEST, 1), w.into_bytes())
        .await;

    let reply = client.recv_snac().await;
    assert_eq!(reply.header.sub_group, bucp::CHALLENGE_RESPONSE, "expected a ChallengeResponse");
    let challenge = bucp::ChallengeResponse::decode(&mut Reader::new(&reply.body)).expect("decode ChallengeResponse");

    let hash = password_hash(&challenge.auth_key, password);
    let mut w = Writer::new();
    bucp::LoginRequest {
        screen_name: screen_name.to_string(),
        password_hash: hash,
    }
    .encode(&mut w);
    client
        .send_snac(SnacHeader::new(FoodGroup::Bucp.as_u16(), bucp::LOGIN_REQUEST, 2), w.into_bytes())
        .await;

    let reply = client.recv_snac().await;
    assert_eq!(reply.header.sub_group, bucp::LOGIN_RESPONSE, "expected a LoginResponse");
    let login = bucp::LoginResponse::decode(&mut Reader::new(&reply.body)).expect("decode LoginResponse");
    assert!(login.is_success(), "login should succeed for {screen_name}");
    login.login_cookie.expect("successful login carries a cookie")
}

/// Logs in and completes the BOS handshake, leaving the client idle on
/// the BOS connection (no `ClientOnline` sent yet).
///
/// Follows the handshake with a `ClientVersions`/`HostVersions` round
/// trip purely to synchronize with the server: the reply can only have
/// been sent after the dispatch loop registered the session, so once
/// it's back the session is guaranteed visible to every other
/// connection's handlers.
pub async fn connect_bos(server: &TestServer, screen_name: &str, password: &str) -> TestClient {
    let cookie = login(server, screen_name, password).await;
    let mut client = TestClient::connect(server.bos_addr).await;
    client.signon_bos(&cookie).await;

    client
        .send_snac(
            SnacHeader::new(FoodGroup::OService.as_u16(), oscar_wire::bodies::oservice::CLIENT_VERSIONS, 1),
            Vec::new(),
        )
        .await;
    let reply = client.recv_snac().await;
    assert_eq!(
        reply.header.sub_group,
        oscar_wire::bodies::oservice::HOST_VERSIONS,
        "expected a HostVersions reply while synchronizing the BOS handshake"
    );

    client
}

/// `connect_bos`, followed by `ClientOnline` — the point at which a real
/// client is considered interactive and the initial buddy-arrival burst
/// fires.
pub async fn connect_bos_online(server: &TestServer, screen_name: &str, password: &str) -> TestClient {
    let mut client = connect_bos(server, screen_name, password).await;
    client
        .send_snac(
            SnacHeader::new(FoodGroup::OService.as_u16(), oscar_wire::bodies::oservice::CLIENT_ONLINE, 1),
            Vec::new(),
        )
        .await;
    client
}

/// Resolves a chat cookie for `room` over an already-established BOS
/// connection via `ServiceRequest`/`ServiceResponse` — the step every
/// room participant, not just its creator, performs before connecting to
/// the chat port.
pub async fn request_chat_cookie(bos: &mut TestClient, room: &oscar_wire::bodies::chat_nav::NavInfo, request_id: u32) -> [u8; 16] {
    use oscar_wire::bodies::oservice::{self, ServiceRequest, ServiceResponse};

    let service_request = ServiceRequest {
        food_group: FoodGroup::Chat.as_u16(),
        room_exchange: room.exchange,
        room_cookie: room.cookie,
        room_instance: room.instance,
    };
    let mut w = Writer::new();
    service_request.encode(&mut w);
    bos.send_snac(
        SnacHeader::new(FoodGroup::OService.as_u16(), oservice::SERVICE_REQUEST, request_id),
        w.into_bytes(),
    )
    .await;
    let reply = bos.recv_snac().await;
    assert_eq!(reply.header.sub_group, oservice::SERVICE_RESPONSE, "expected a ServiceResponse");
    ServiceResponse::decode(&mut Reader::new(&reply.body))
        .expect("decode ServiceResponse")
        .cookie
}

/// Completes the chat handshake for an already-logged-in screen name,
/// presenting a `chat_cookie` minted by a prior `ServiceRequest`,
/// synchronizing the same way `connect_bos` does.
pub async fn connect_chat(server: &TestServer, login_cookie: &[u8], chat_cookie: &[u8]) -> TestClient {
    let mut client = TestClient::connect(server.chat_addr).await;
    client.signon_chat(login_cookie, chat_cookie).await;

    client
        .send_snac(
            SnacHeader::new(FoodGroup::OService.as_u16(), oscar_wire::bodies::oservice::CLIENT_VERSIONS, 1),
            Vec::new(),
        )
        .await;
    let reply = client.recv_snac().await;
    assert_eq!(
        reply.header.sub_group,
        oscar_wire::bodies::oservice::HOST_VERSIONS,
        "expected a HostVersions reply while synchronizing the chat handshake"
    );

    client
}
