//! Match and Game Footers
//!
//! Terminal records: winners, win reasons and post-match artifacts.

use serde::{Serialize, Deserialize};

use super::header::TeamId;

/// How a match was decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinType {
    /// Opponent lost every rat king
    RatKingsDestroyed,
    /// Cats were fed or killed in cooperation mode
    CatsDefeated,
    /// Most cheese at the round limit
    MostCheese,
    /// Tie-breaker on kings
    MoreRatKings,
    /// Coin flip
    Coinflip,
    /// Opponent resigned
    Resign,
}

/// Raw profiler event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilerEventRecord {
    /// Open (true) or close (false)
    pub is_open: bool,
    /// Bytecode counter at the event
    pub at: i64,
    /// Index into the file's frame table
    pub frame: u32,
}

/// Raw profile of one body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Profile name, `#<robot id>`
    pub name: String,
    /// Events in recorded order
    pub events: Vec<ProfilerEventRecord>,
}

/// Raw profiler file of one team.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilerFileRecord {
    /// Frame (method) names
    pub frames: Vec<String>,
    /// Profiles
    pub profiles: Vec<ProfileRecord>,
}

/// Annotation placed on the timeline by a bot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineMarkerRecord {
    /// Round the marker was emitted in (0-based)
    pub round: u32,
    /// Emitting team
    pub team: TeamId,
    /// Display color
    pub color_hex: u32,
    /// Optional label
    #[serde(default)]
    pub label: Option<String>,
}

/// End of one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFooter {
    /// Winning team id (1 or 2)
    pub winner: TeamId,
    /// Win reason
    pub win_type: WinType,
    /// Total rounds played
    pub total_rounds: u32,
    /// Profiler dumps, if profiling was enabled
    #[serde(default)]
    pub profiler_files: Vec<ProfilerFileRecord>,
    /// Timeline annotations
    #[serde(default)]
    pub timeline_markers: Vec<TimelineMarkerRecord>,
}

/// End of the game (series).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFooter {
    /// Overall winning team id
    pub winner: TeamId,
}
