//! # Ember Clash Server
//!
//! Authoritative server for Ember Clash, a real-time arena combat game.
//! Clients predict their own movement and animate projectiles; the
//! server owns every number that matters.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    EMBER CLASH SERVER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Shared primitives                        │
//! │  ├── vec2.rs     - 2D vector math                           │
//! │  └── rng.rs      - Seeded LCG for deterministic layout      │
//! │                                                             │
//! │  world/          - Static arena                             │
//! │  ├── geometry.rs - Walls, segments, collision queries       │
//! │  └── generator.rs- Seeded wall placement and safe spawns    │
//! │                                                             │
//! │  game/           - Simulation (synchronous, no I/O)         │
//! │  ├── config.rs   - All gameplay tunables                    │
//! │  ├── state.rs    - World, combatants, spells, items, burns  │
//! │  ├── events.rs   - Outbound events with routing             │
//! │  ├── scheduler.rs- Cancellable per-entity timers            │
//! │  ├── combat.rs   - Casting, hits, burns, bursts, respawns   │
//! │  ├── movement.rs - Move validation and mana regen           │
//! │  └── items.rs    - Pickup spawning and collection           │
//! │                                                             │
//! │  bot/            - Server-driven combatants                 │
//! │  ├── perception.rs- Sight and loot scanning                 │
//! │  ├── decision.rs - Priority goal selection                  │
//! │  ├── pathfind.rs - A* over an occupancy grid                │
//! │  ├── movement.rs - Steering with slide and push-out         │
//! │  └── combat.rs   - Fire control and projectile simulation   │
//! │                                                             │
//! │  network/        - Transport                                │
//! │  ├── protocol.rs - Tagged JSON message types                │
//! │  └── server.rs   - WebSocket server and game loop           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Authority Model
//!
//! World generation is deterministic: the same seed string always
//! produces the same wall layout, so clients can verify the arena they
//! received. Everything else is server-authoritative with client
//! reporting: movement reports are validated against walls, and hit
//! reports are re-validated against line of sight before any damage is
//! applied. All registries iterate in BTreeMap order so a tick's event
//! stream is reproducible.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod bot;
pub mod core;
pub mod game;
pub mod network;
pub mod world;

// Re-export commonly used types
pub use crate::core::rng::Lcg;
pub use crate::core::vec2::Vec2;
pub use game::config::GameConfig;
pub use game::events::GameEvent;
pub use game::state::{Combatant, EntityId, World};
pub use network::server::Server;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
