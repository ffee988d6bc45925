//! Arena Geometry
//!
//! Static obstacle representation, blocking tests, and the deterministic
//! procedural generator that builds an arena from a seed.

pub mod generator;
pub mod geometry;

pub use generator::{generate_walls, safe_spawn_position};
pub use geometry::{point_blocked, segment_blocked, Rect, Wall, WallKind};
