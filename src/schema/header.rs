//! Game and Match Headers
//!
//! Records emitted once per game and once per match: team metadata,
//! robot kind stats, the static map payload and the initial body table.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::vec2::{Direction, Vector};

/// Unique body identifier. Never reused within a match.
pub type BodyId = u32;

/// Team identifier. 0 is the neutral team, 1 and 2 are the players.
pub type TeamId = u8;

/// The synthetic neutral team (cats and other map hazards).
pub const NEUTRAL_TEAM: TeamId = 0;

/// The two playing teams.
pub const PLAYER_TEAMS: [TeamId; 2] = [1, 2];

// =============================================================================
// ROBOT KIND
// =============================================================================

/// Robot kind tag as carried by the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RobotKind {
    /// Small mobile unit
    Rat = 1,
    /// Large 3x3 unit, promoted from a rat
    RatKing = 2,
    /// Neutral 2x2 hazard
    Cat = 3,
}

impl RobotKind {
    /// All kinds in wire order.
    pub const ALL: [RobotKind; 3] = [RobotKind::Rat, RobotKind::RatKing, RobotKind::Cat];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            RobotKind::Rat => "Rat",
            RobotKind::RatKing => "Rat King",
            RobotKind::Cat => "Cat",
        }
    }

    /// Side length of the kind's square footprint in cells.
    pub fn size(self) -> u32 {
        match self {
            RobotKind::Rat => 1,
            RobotKind::RatKing => 3,
            RobotKind::Cat => 2,
        }
    }
}

/// Static per-kind stats from the game header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotKindMetadata {
    /// Kind these stats belong to
    pub kind: RobotKind,
    /// Health at spawn (also max health)
    pub base_health: u32,
    /// Cooldown after an action
    pub action_cooldown: u32,
    /// Cooldown after a move
    pub movement_cooldown: u32,
    /// Cooldown after turning
    pub turning_cooldown: u32,
    /// Per-turn bytecode budget
    pub bytecode_limit: u32,
}

impl RobotKindMetadata {
    /// Stock stats shipped with the game engine.
    pub fn stock(kind: RobotKind) -> Self {
        let base_health = match kind {
            RobotKind::Rat => 10,
            RobotKind::RatKing => 50,
            RobotKind::Cat => 500,
        };
        Self {
            kind,
            base_health,
            action_cooldown: 10,
            movement_cooldown: 10,
            turning_cooldown: 10,
            bytecode_limit: 17_500,
        }
    }
}

// =============================================================================
// HEADERS
// =============================================================================

/// One playing team.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamData {
    /// Team id (1 or 2)
    pub team_id: TeamId,
    /// Display name
    pub name: String,
    /// Bot package name
    pub package_name: String,
}

/// First record of every game log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameHeader {
    /// Log format version
    pub spec_version: String,
    /// The two playing teams
    pub teams: Vec<TeamData>,
    /// Per-kind stats
    pub robot_kinds: Vec<RobotKindMetadata>,
}

impl Default for GameHeader {
    fn default() -> Self {
        Self {
            spec_version: "1".to_string(),
            teams: vec![
                TeamData { team_id: 1, name: "Team A".into(), package_name: "team_a".into() },
                TeamData { team_id: 2, name: "Team B".into(), package_name: "team_b".into() },
            ],
            robot_kinds: RobotKind::ALL.iter().map(|k| RobotKindMetadata::stock(*k)).collect(),
        }
    }
}

/// A body placed on the map before round 1, or spawned mid-match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRecord {
    /// New body id
    pub id: BodyId,
    /// Owning team
    pub team: TeamId,
    /// Robot kind
    pub kind: RobotKind,
    /// Anchor cell
    pub pos: Vector,
    /// Initial facing
    pub dir: Direction,
    /// Turning handedness (cats only)
    #[serde(default)]
    pub chirality: u8,
}

/// Static map payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRecord {
    /// Map name
    pub name: String,
    /// Seed the map was generated with
    pub random_seed: u32,
    /// Symmetry code (0 rotational, 1 horizontal, 2 vertical)
    pub symmetry: u8,
    /// Width in cells
    pub width: u32,
    /// Height in cells
    pub height: u32,
    /// Wall bitmap, `y * width + x` indexed
    pub walls: Vec<u8>,
    /// Initial dirt bitmap, same indexing
    pub dirt: Vec<u8>,
    /// Fixed cheese mine locations
    pub cheese_mines: Vec<Vector>,
    /// Patrol waypoints keyed by cat id
    #[serde(default)]
    pub cat_waypoints: BTreeMap<BodyId, Vec<Vector>>,
}

/// Start of one match within a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchHeader {
    /// Static map
    pub map: MapRecord,
    /// Bodies present before round 1
    pub initial_bodies: Vec<SpawnRecord>,
    /// Round cap configured by the engine
    pub max_rounds: u32,
}
