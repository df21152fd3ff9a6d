//! Adapter module - UI control via TCP socket with JSON protocol
//!
//! This module lets an external UI process (the touch frontend) drive the
//! sorting round through a TCP socket connection. The UI owns gestures,
//! rendering, and navigation; the adapter only sees the resolved outcome of
//! a drag as a `(item, bin)` pair.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Player Assignment**: First client to hello becomes the player
//! 4. **Observation Streaming**: Server sends round state observations
//! 5. **Commanding**: Player sends classify/restart/save operations
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **command**: `classify` a dragged card, `restart` the round, or `save`
//!   the final record
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello
//! - **observation**: Full round snapshot (hand cards, score, counts, phase)
//! - **ack**: Command acknowledgment
//! - **error**: Error response with code and message
//! - **record_saved**: Leaderboard record stored successfully
//!
//! # Environment Variables
//!
//! - `PANDA_UI_HOST`: Bind address (default: "127.0.0.1")
//! - `PANDA_UI_PORT`: Port number (default: 7878)
//! - `PANDA_UI_MAX_PENDING`: Bounded command queue size (default: 10)
//! - `PANDA_UI_DISABLED`: Set to "1" or "true" to disable the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1,"client":{"name":"touch-ui","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1,"protocol_version":"1.0.0","game_id":"litter-panda"}
//! Server -> Client: {"type":"observation","seq":2,"ts":2,"playable":true,...,"hand":[{"id":8,"title":"Banana Peel",...}]}
//! Client -> Server: {"type":"command","seq":2,"ts":3,"op":"classify","item":8,"bin":"green"}
//! Server -> Client: {"type":"ack","seq":2,"ts":3,"status":"ok"}
//! ```
//!
//! # Implementation
//!
//! - Uses **tokio** for async networking
//! - Multiple clients can connect (only one player at a time; the rest
//!   observe the score)
//! - See [`protocol`] for message structure definitions
//! - See [`server`] for TCP server implementation

pub mod assets;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use litter_panda_core as core;
pub use litter_panda_types as types;

// Re-export protocol types for convenience
pub use assets::{AssetResolver, BasePathAssets, PassthroughAssets};
pub use protocol::*;
pub use runtime::{
    Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage, ServerMessage,
};
pub use server::*;
