//! Core Primitives
//!
//! Building blocks with no game knowledge:
//! - `vec2`: 2D vector math
//! - `rng`: seeded LCG for deterministic world generation

pub mod rng;
pub mod vec2;

pub use rng::Lcg;
pub use vec2::Vec2;
