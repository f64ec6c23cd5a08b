//! Per-connection dispatch loop (Section 4.6): drives the FLAP/SNAC state
//! machine for one socket, from handshake through close. The background
//! frame-reader task and this loop's `tokio::select!` communicate over a
//! bounded channel so a slow socket read never blocks outbound delivery —
//! the same producer/consumer split the teacher daemon uses to keep its
//! own connection loop from stalling on I/O.

use std::net::SocketAddr;
use std::sync::Arc;

use oscar_types::{ChatCookie, FoodGroup, ScreenName};
use oscar_wire::bodies::bucp;
use oscar_wire::bodies::chat::{self, RosterChange};
use oscar_wire::codec::{Reader, Writer};
use oscar_wire::flap::{FlapFrame, FrameType, SequenceCounter};
use oscar_wire::snac::{RawSnac, SnacHeader};
use oscar_wire::tlv::TlvBlock;
use oscar_wire::WireError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::chatroom::ChatRoom;
use crate::error::ServerError;
use crate::handlers::{buddy, user_info_of};
use crate::routers;
use crate::session::Session;
use crate::state::AppState;

/// FLAP sequence numbers start at 100 on a fresh connection.
const HANDSHAKE_SEQUENCE_START: u16 = 100;
const FLAP_VERSION: u32 = 1;
/// Carries a login (BOS) or chat-room cookie in a connection's Signon TLV.
const TAG_COOKIE: u16 = 0x0006;
/// Chat connections additionally carry the chat cookie minted for this
/// session by `OService::ServiceRequest`.
const TAG_ROOM_COOKIE: u16 = 0x0007;
const INBOUND_QUEUE_CAPACITY: usize = 64;

async fn read_frame(socket: &mut OwnedReadHalf) -> Result<Option<FlapFrame>, WireError> {
    let mut header = [0u8; 6];
    match socket.read_exact(&mut header).await {
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(WireError::Io(err)),
    }
    let (frame_type, sequence, payload_len) = FlapFrame::decode_header(&header)?;
    let mut payload = vec![0u8; payload_len as usize];
    if payload_len > 0 {
        socket.read_exact(&mut payload).await?;
    }
    Ok(Some(FlapFrame::new(frame_type, sequence, payload)))
}

/// Reads the first frame directly off a still-unsplit stream, used only
/// during the handshake before the read half is handed to the background
/// reader task.
async fn read_handshake_frame(stream: &mut TcpStream) -> Result<FlapFrame, ServerError> {
    let mut header = [0u8; 6];
    stream.read_exact(&mut header).await.map_err(WireError::Io)?;
    let (frame_type, sequence, payload_len) = FlapFrame::decode_header(&header)?;
    let mut payload = vec![0u8; payload_len as usize];
    if payload_len > 0 {
        stream.read_exact(&mut payload).await.map_err(WireError::Io)?;
    }
    Ok(FlapFrame::new(frame_type, sequence, payload))
}

async fn write_frame(
    stream: &mut (impl tokio::io::AsyncWrite + Unpin),
    seq: &mut SequenceCounter,
    frame_type: FrameType,
    payload: Vec<u8>,
) -> std::io::Result<()> {
    let frame = FlapFrame::new(frame_type, seq.next(), payload);
    stream.write_all(&frame.encode()).await
}

async fn send_signon(stream: &mut TcpStream, seq: &mut SequenceCounter) -> std::io::Result<()> {
    let mut w = Writer::new();
    w.u32(FLAP_VERSION);
    write_frame(stream, seq, FrameType::Signon, w.into_bytes()).await
}

fn decode_signon_payload(frame: &FlapFrame) -> Result<TlvBlock, ServerError> {
    if frame.frame_type != FrameType::Signon {
        return Err(ServerError::Wire(WireError::Malformed(
            "expected a Signon frame to open the connection".to_string(),
        )));
    }
    let mut r = Reader::new(&frame.payload);
    let _flap_version = r.u32()?;
    Ok(TlvBlock::decode_unprefixed(&mut r)?)
}

fn cookie_tlv(block: &TlvBlock, tag: u16, what: &str) -> Result<Vec<u8>, ServerError> {
    block
        .get(tag)
        .map(|tlv| tlv.value.clone())
        .ok_or_else(|| ServerError::Wire(WireError::Malformed(format!("missing {what} in Signon frame"))))
}

/// Spawns the background frame-reader task and returns the channel its
/// consumer drains. The channel closes (a `None` from `recv`) on read
/// error or EOF, which the dispatch loop treats the same as a Signoff.
fn spawn_frame_reader(mut read_half: OwnedReadHalf) -> mpsc::Receiver<FlapFrame> {
    let (tx, rx) = mpsc::channel(INBOUND_QUEUE_CAPACITY);
    tokio::spawn(async move {
        loop {
            match read_frame(&mut read_half).await {
                Ok(Some(frame)) => {
                    if tx.send(frame).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    debug!(%err, "frame reader closing connection");
                    break;
                }
            }
        }
    });
    rx
}

/// Drives the BUCP handshake on the dedicated auth listener and exits
/// the connection right after the `LoginResponse` (Section 4.7).
pub async fn run_auth_connection(state: Arc<AppState>, mut stream: TcpStream, peer: SocketAddr) {
    let mut seq = SequenceCounter::starting_at(HANDSHAKE_SEQUENCE_START);
    if let Err(err) = send_signon(&mut stream, &mut seq).await {
        warn!(%peer, %err, "auth handshake write failed");
        return;
    }
    // The auth listener doesn't validate a cookie at this stage; the
    // client has none yet. It just needs a completed FLAP handshake
    // before BUCP Data frames start.
    if let Err(err) = read_handshake_frame(&mut stream).await {
        warn!(%peer, %err, "auth handshake read failed");
        return;
    }

    let (read_half, mut write_half) = stream.into_split();
    let mut inbound = spawn_frame_reader(read_half);

    while let Some(frame) = inbound.recv().await {
        match frame.frame_type {
            FrameType::Data => {
                let snac = match RawSnac::decode(&frame.payload) {
                    Ok(snac) => snac,
                    Err(err) => {
                        warn!(%peer, %err, "malformed SNAC on auth listener");
                        break;
                    }
                };
                let reply = match routers::bucp::route(&state, &snac.header, &snac.body).await {
                    Ok(reply) => reply,
                    Err(err) => {
                        warn!(%peer, %err, "BUCP request failed");
                        break;
                    }
                };
                let Some(reply) = reply else { continue };
                let is_login_response = reply.header.sub_group == bucp::LOGIN_RESPONSE;
                if write_frame(&mut write_half, &mut seq, FrameType::Data, reply.encode()).await.is_err() {
                    break;
                }
                if is_login_response {
                    break;
                }
            }
            FrameType::Signoff | FrameType::Error | FrameType::Signon => break,
            FrameType::KeepAlive => continue,
        }
    }

    info!(%peer, "auth connection closed");
}

/// Drives a BOS connection: authenticates the login cookie, registers a
/// `Session`, then dispatches SNACs and outbound notifications until
/// close (Section 4.6).
pub async fn run_bos_connection(state: Arc<AppState>, mut stream: TcpStream, peer: SocketAddr) {
    let mut seq = SequenceCounter::starting_at(HANDSHAKE_SEQUENCE_START);
    if let Err(err) = send_signon(&mut stream, &mut seq).await {
        warn!(%peer, %err, "BOS handshake write failed");
        return;
    }
    let cookie = match read_handshake_frame(&mut stream)
        .await
        .and_then(|frame| decode_signon_payload(&frame))
        .and_then(|block| cookie_tlv(&block, TAG_COOKIE, "login cookie"))
    {
        Ok(cookie) => cookie,
        Err(err) => {
            warn!(%peer, %err, "BOS handshake read failed");
            return;
        }
    };
    let Some(screen_name) = state.auth.retrieve_bos_session(&cookie).await else {
        warn!(%peer, "BOS login cookie rejected");
        return;
    };

    let session_id = rand::random();
    let (session, mut outbound) = Session::new(session_id, ScreenName::new(&screen_name));
    state.sessions.add(session.clone()).await;
    info!(%peer, %screen_name, "BOS session established");

    let (read_half, mut write_half) = stream.into_split();
    let mut inbound = spawn_frame_reader(read_half);

    loop {
        tokio::select! {
            frame = inbound.recv() => {
                let Some(frame) = frame else { break };
                match frame.frame_type {
                    FrameType::Data => {
                        let snac = match RawSnac::decode(&frame.payload) {
                            Ok(snac) => snac,
                            Err(err) => {
                                warn!(%peer, %screen_name, %err, "malformed SNAC on BOS connection");
                                break;
                            }
                        };
                        match routers::root::route(&state, &session, None, &snac.header, &snac.body).await {
                            Ok(Some(reply)) => {
                                if write_frame(&mut write_half, &mut seq, FrameType::Data, reply.encode()).await.is_err() {
                                    break;
                                }
                            }
                            Ok(None) => {}
                            Err(err) => {
                                warn!(%peer, %screen_name, %err, "closing BOS connection after protocol error");
                                break;
                            }
                        }
                    }
                    FrameType::Signoff | FrameType::Error | FrameType::Signon => break,
                    FrameType::KeepAlive => debug!(%screen_name, "keepalive"),
                }
            }
            notification = outbound.recv() => {
                let Some(notification) = notification else { break };
                if write_frame(&mut write_half, &mut seq, FrameType::Data, notification.encode()).await.is_err() {
                    break;
                }
            }
            () = session.wait_closed() => {
                let _ = write_frame(&mut write_half, &mut seq, FrameType::Signoff, Vec::new()).await;
                break;
            }
        }
    }

    let canonical_name = session.screen_name().canonical().to_string();
    session.close();
    state.sessions.remove(&session).await;
    // Skip the departure broadcast and signout if a newer login has
    // already replaced this session under the same name.
    if state.sessions.lookup_by_name(&canonical_name).await.is_none() {
        buddy::broadcast_departed(&state, &session).await;
        state.auth.signout(&canonical_name).await;
    }
    info!(%peer, screen_name = %canonical_name, "BOS connection closed");
}

/// Drives a chat-room connection: authenticates the login cookie,
/// resolves the accompanying chat cookie back to its room through the
/// `Auth` collaborator, joins that room, then dispatches Chat SNACs and
/// room broadcasts until close (Section 4.6).
pub async fn run_chat_connection(state: Arc<AppState>, mut stream: TcpStream, peer: SocketAddr) {
    let mut seq = SequenceCounter::starting_at(HANDSHAKE_SEQUENCE_START);
    if let Err(err) = send_signon(&mut stream, &mut seq).await {
        warn!(%peer, %err, "chat handshake write failed");
        return;
    }
    let (login_cookie, chat_cookie) = match read_handshake_frame(&mut stream)
        .await
        .and_then(|frame| decode_signon_payload(&frame))
        .and_then(|block| {
            let login_cookie = cookie_tlv(&block, TAG_COOKIE, "login cookie")?;
            let chat_cookie = cookie_tlv(&block, TAG_ROOM_COOKIE, "chat cookie")?;
            Ok((login_cookie, chat_cookie))
        }) {
        Ok(cookies) => cookies,
        Err(err) => {
            warn!(%peer, %err, "chat handshake read failed");
            return;
        }
    };
    let chat_cookie: ChatCookie = match chat_cookie.as_slice().try_into() {
        Ok(cookie) => cookie,
        Err(_) => {
            warn!(%peer, "malformed chat cookie");
            return;
        }
    };

    let Some(screen_name) = state.auth.retrieve_bos_session(&login_cookie).await else {
        warn!(%peer, "chat login cookie rejected");
        return;
    };
    let Some(room_cookie) = state.auth.retrieve_chat_session(&chat_cookie).await else {
        warn!(%peer, %screen_name, "unknown chat cookie");
        return;
    };
    let Some(room) = state.chat_rooms.lookup(&room_cookie).await else {
        warn!(%peer, %screen_name, "unknown chat room cookie");
        return;
    };

    let session_id = rand::random();
    let (session, mut outbound) = Session::new(session_id, ScreenName::new(&screen_name));
    room.participants.add(session.clone()).await;
    info!(%peer, %screen_name, room = %room.name, "chat session established");

    announce_roster_change(&room, &session, chat::USERS_JOINED).await;

    let (read_half, mut write_half) = stream.into_split();
    let mut inbound = spawn_frame_reader(read_half);

    loop {
        tokio::select! {
            frame = inbound.recv() => {
                let Some(frame) = frame else { break };
                match frame.frame_type {
                    FrameType::Data => {
                        let snac = match RawSnac::decode(&frame.payload) {
                            Ok(snac) => snac,
                            Err(err) => {
                                warn!(%peer, %screen_name, %err, "malformed SNAC on chat connection");
                                break;
                            }
                        };
                        match routers::root::route(&state, &session, Some(&room), &snac.header, &snac.body).await {
                            Ok(Some(reply)) => {
                                if write_frame(&mut write_half, &mut seq, FrameType::Data, reply.encode()).await.is_err() {
                                    break;
                                }
                            }
                            Ok(None) => {}
                            Err(err) => {
                                warn!(%peer, %screen_name, %err, "closing chat connection after protocol error");
                                break;
                            }
                        }
                    }
                    FrameType::Signoff | FrameType::Error | FrameType::Signon => break,
                    FrameType::KeepAlive => debug!(%screen_name, "keepalive"),
                }
            }
            notification = outbound.recv() => {
                let Some(notification) = notification else { break };
                if write_frame(&mut write_half, &mut seq, FrameType::Data, notification.encode()).await.is_err() {
                    break;
                }
            }
            () = session.wait_closed() => {
                let _ = write_frame(&mut write_half, &mut seq, FrameType::Signoff, Vec::new()).await;
                break;
            }
        }
    }

    session.close();
    room.participants.remove(&session).await;
    announce_roster_change(&room, &session, chat::USERS_LEFT).await;
    state.chat_rooms.remove_if_empty(&room.cookie).await;
    state.auth.signout_chat(&chat_cookie).await;
    info!(%peer, %screen_name, room = %room.name, "chat connection closed");
}

async fn announce_roster_change(room: &ChatRoom, session: &Session, sub_group: u16) {
    let change = RosterChange {
        users: vec![user_info_of(session).await],
    };
    let mut w = Writer::new();
    change.encode(&mut w);
    let message = RawSnac {
        header: SnacHeader::new(FoodGroup::Chat.as_u16(), sub_group, 0),
        body: w.into_bytes(),
    };
    room.participants.broadcast_except(session, message).await;
}
