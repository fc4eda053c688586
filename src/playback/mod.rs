//! Match Playback
//!
//! Reconstructs the visible state of a recorded match at any round and
//! turn. Rounds are replayed forward from the nearest snapshot; per-round
//! statistics are computed once and cached in the match's ledger.
//!
//! ## Module Structure
//!
//! - `map`: static map and per-round mutable map
//! - `bodies`: robot registry and per-turn updates
//! - `actions`: in-flight actions and their lifetimes
//! - `round_stat`: per-round team statistics
//! - `round`: a single round's state and turn stepping
//! - `game_match`: snapshots, seek and time-based playback
//! - `game`: event ingestion across matches
//! - `render`: draw commands handed to a surface

pub mod error;
pub mod config;
pub mod map;
pub mod bodies;
pub mod actions;
pub mod round_stat;
pub mod round;
pub mod game_match;
pub mod game;
pub mod render;

pub use error::{ReplayError, ReplayResult};
pub use config::PlaybackConfig;
pub use map::{CurrentMap, StaticMap, Symmetry, TrapKind};
pub use bodies::{Bodies, Body, BodyKind, KindTable};
pub use actions::{Action, Actions};
pub use round_stat::{RoundStat, StatLedger, TeamRoundStat};
pub use round::Round;
pub use game_match::{Match, PlaybackMode, ProfilerFile, TimelineMarker};
pub use game::{Game, Team};
pub use render::{DrawCommand, RenderContext, Surface, VisualOverrides};
