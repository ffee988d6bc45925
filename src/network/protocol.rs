//! Wire Protocol
//!
//! Tagged JSON over WebSocket text frames. Client messages are the
//! verbs; server messages wrap the simulation's events plus a welcome
//! snapshot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::vec2::Vec2;
use crate::game::config::GameConfig;
use crate::game::events::GameEvent;
use crate::game::items::Item;
use crate::game::state::{Combatant, EntityId};
use crate::world::geometry::Wall;

/// Protocol codec failures.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// JSON decode/encode failure
    #[error("json codec: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a client can ask of the server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enter the arena
    Join {
        /// Display name (server truncates)
        name: String,
        /// Cosmetic color index
        color: u8,
    },
    /// Report a movement step
    Move {
        /// New position
        position: Vec2,
        /// Current velocity
        velocity: Vec2,
        /// Facing direction (radians)
        facing: f32,
    },
    /// Report an aim change
    Aim {
        /// Aim angle (radians)
        angle: f32,
    },
    /// Cast a spell toward a point
    Cast {
        /// Target point
        target: Vec2,
    },
    /// Report a spell striking a combatant
    Hit {
        /// Spell id
        spell_id: u64,
        /// Struck combatant
        victim: EntityId,
        /// Impact point
        position: Vec2,
    },
    /// Report a spell striking a wall
    WallHit {
        /// Spell id
        spell_id: u64,
        /// Impact point
        position: Vec2,
    },
    /// Detonate a held area burst
    Burst,
    /// Liveness probe
    Ping {
        /// Echoed back in the pong
        nonce: u64,
    },
    /// Leave the arena
    Leave,
}

/// Everything the server sends back.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First message after a successful join: identity plus a full
    /// world snapshot.
    Welcome {
        /// The client's assigned id
        id: EntityId,
        /// Arena width
        width: f32,
        /// Arena height
        height: f32,
        /// Static wall set
        walls: Vec<Wall>,
        /// All current combatants (including the new one)
        combatants: Vec<Combatant>,
        /// All current pickups
        items: Vec<Item>,
        /// The active tunables, so clients predict with server numbers
        config: GameConfig,
    },
    /// A simulation event
    Event {
        /// The event payload
        event: GameEvent,
    },
    /// Movement rejection: snap back to the authoritative position
    PositionCorrection {
        /// Authoritative position
        position: Vec2,
    },
    /// Liveness reply
    Pong {
        /// Nonce from the ping
        nonce: u64,
    },
    /// A request was refused
    Error {
        /// Human-readable reason
        message: String,
    },
}

/// Encode a server message as a JSON text frame.
pub fn encode_json(message: &ServerMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}

/// Decode a client message from a JSON text frame.
pub fn decode_json(frame: &str) -> Result<ClientMessage, ProtocolError> {
    Ok(serde_json::from_str(frame)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_json_shape() {
        let decoded = decode_json(r#"{"type":"cast","target":{"x":400.0,"y":250.0}}"#).unwrap();
        assert!(matches!(decoded, ClientMessage::Cast { target } if target.x == 400.0));

        let decoded = decode_json(r#"{"type":"burst"}"#).unwrap();
        assert!(matches!(decoded, ClientMessage::Burst));
    }

    #[test]
    fn test_malformed_frame_is_error_not_panic() {
        assert!(decode_json("not json").is_err());
        assert!(decode_json(r#"{"type":"warp","x":1}"#).is_err());
    }

    #[test]
    fn test_server_event_envelope() {
        let message = ServerMessage::Event {
            event: GameEvent::SpawnProtectionEnded {
                id: EntityId::new([4; 16]),
            },
        };
        let json = encode_json(&message).unwrap();
        assert!(json.contains("\"type\":\"event\""));
        assert!(json.contains("\"type\":\"spawn_protection_ended\""));
    }

    #[test]
    fn test_hit_report_decodes() {
        let frame = format!(
            r#"{{"type":"hit","spell_id":42,"victim":{},"position":{{"x":12.5,"y":99.0}}}}"#,
            serde_json::to_string(&EntityId::new([7; 16])).unwrap()
        );
        let back = decode_json(&frame).unwrap();
        assert!(matches!(back, ClientMessage::Hit { spell_id: 42, .. }));
    }
}
