//! Core deterministic primitives.
//!
//! Grid geometry, state hashing and the seeded PRNG shared by every
//! playback module.

pub mod vec2;
pub mod hash;
pub mod rng;

// Re-export core types
pub use vec2::{Direction, Vector};
pub use hash::{compute_state_hash, StateHash, StateHasher};
pub use rng::DeterministicRng;
