//! # oscar-server
//!
//! The OSCAR protocol engine (Section 1): accepts authenticated client
//! connections, frames and unframes FLAP/SNAC, dispatches requests to
//! food-group handlers, and fans out notifications from a shared session
//! registry back to subscribed connections.

pub mod chatroom;
pub mod collab;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod listener;
pub mod registry;
pub mod routers;
pub mod session;
pub mod state;

pub use config::ServerConfig;
pub use error::ServerError;
pub use state::AppState;
