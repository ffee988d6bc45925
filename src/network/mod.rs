//! Network Interface
//!
//! WebSocket transport and the JSON wire protocol. The server hosts the
//! game loop; the protocol module defines what crosses the wire.

pub mod protocol;
pub mod server;

pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
pub use server::{Server, ServerError};
