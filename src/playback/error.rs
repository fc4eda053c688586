//! Replay Errors
//!
//! Every variant here is a protocol violation: the log (or the decoder that
//! produced it) is inconsistent. Playback does not recover from these; a
//! `Match` that returned one of them should be dropped and the replay
//! reported as corrupt.

use crate::core::vec2::Vector;
use crate::schema::{BodyId, RobotKind, TeamId};

/// Result alias used throughout playback.
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Replay errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    /// A turn or action referenced a body that does not exist.
    #[error("Body {0} not found")]
    UnknownBody(BodyId),

    /// A spawn reused a live id.
    #[error("Body {0} already exists")]
    DuplicateBody(BodyId),

    /// Stepped a round that has no turns left.
    #[error("Cannot step round {round} past turn {turn} of {turns}")]
    StepPastEnd {
        /// Round being stepped
        round: u32,
        /// Current turn
        turn: u32,
        /// Turns in the round
        turns: u32,
    },

    /// Started the next round before finishing this one.
    #[error("Round {round} not finished: at turn {turn} of {turns}")]
    RoundNotFinished {
        /// Round being finished
        round: u32,
        /// Current turn
        turn: u32,
        /// Turns in the round
        turns: u32,
    },

    /// Backward seek in a round that was never stepped.
    #[error("Cannot reset round {round} without first stepping it")]
    NoCheckpoint {
        /// Round being reset
        round: u32,
    },

    /// Round id does not follow the previous one.
    #[error("Wrong round id: expected {expected}, got {got}")]
    RoundMismatch {
        /// Expected round id
        expected: u32,
        /// Round id in the record
        got: u32,
    },

    /// Seek requested before any round data arrived.
    #[error("No snapshot available (round 1 snapshot missing)")]
    NoSnapshot,

    /// The game header did not describe a kind the log uses.
    #[error("No metadata for robot kind {0:?}")]
    MissingKindMetadata(RobotKind),

    /// Team id outside the header's team table.
    #[error("Unknown team {0}")]
    UnknownTeam(TeamId),

    /// Static map payload failed validation.
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    /// Cell outside the map.
    #[error("Cell {0} out of bounds")]
    OutOfBounds(Vector),

    /// Promotion requested for a kind that cannot be promoted.
    #[error("Body {0} cannot be promoted")]
    NotPromotable(BodyId),

    /// Round, footer or header arrived with no match to attach to.
    #[error("No active match")]
    NoActiveMatch,

    /// Game header missing when a match header arrived.
    #[error("Game header not received")]
    MissingGameHeader,

    /// Log written for a different format version.
    #[error("Unsupported spec version {got} (expected {expected})")]
    SpecVersion {
        /// Version this crate reads
        expected: String,
        /// Version in the log
        got: String,
    },

    /// A header or footer that may appear once arrived twice.
    #[error("Duplicate {0} event")]
    DuplicateEvent(&'static str),

    /// Profiler entry whose name does not carry a body id.
    #[error("Malformed profile name {0:?}")]
    BadProfileName(String),

    /// State could not be encoded for fingerprinting.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<bincode::Error> for ReplayError {
    fn from(err: bincode::Error) -> Self {
        ReplayError::Encoding(err.to_string())
    }
}
