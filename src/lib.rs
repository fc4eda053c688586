//! # Rat Arena Playback
//!
//! Deterministic replay engine for recorded Rat Arena matches: two teams of
//! rats and rat kings competing for cheese around neutral cats.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RAT ARENA PLAYBACK                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── vec2.rs      - Grid cells and compass directions        │
//! │  ├── rng.rs       - Deterministic Xorshift128+ PRNG          │
//! │  └── hash.rs      - Round state fingerprints                 │
//! │                                                              │
//! │  schema/          - Decoded log records                      │
//! │  ├── header.rs    - Game/match headers, map, spawns          │
//! │  ├── round.rs     - Round deltas and turns                   │
//! │  ├── action.rs    - Action union                             │
//! │  └── footer.rs    - Match/game footers                       │
//! │                                                              │
//! │  playback/        - Replay engine                            │
//! │  ├── map.rs       - Static and per-round map state           │
//! │  ├── bodies.rs    - Robot registry                           │
//! │  ├── actions.rs   - In-flight actions                        │
//! │  ├── round.rs     - Turn stepping within a round             │
//! │  ├── round_stat.rs- Per-round team statistics                │
//! │  ├── game_match.rs- Snapshots, seek, timed playback          │
//! │  ├── game.rs      - Event ingestion                          │
//! │  └── render.rs    - Draw command contract                    │
//! │                                                              │
//! │  testkit.rs       - Seeded synthetic match logs              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Replayed state depends only on the log:
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time in replayed state
//! - Drawing writes only to visual overrides, never to bodies or map
//!
//! Seeking to a round by any path (forward stepping, backward jumps,
//! snapshot restore) yields the same state fingerprint.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod schema;
pub mod playback;
pub mod testkit;

// Re-export commonly used types
pub use crate::core::vec2::{Direction, Vector};
pub use crate::core::rng::DeterministicRng;
pub use crate::core::hash::StateHash;
pub use schema::Event;
pub use playback::{Game, Match, PlaybackConfig, PlaybackMode, ReplayError, ReplayResult, Round};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log format version read by this crate.
pub const SPEC_VERSION: &str = playback::game::SPEC_VERSION;
