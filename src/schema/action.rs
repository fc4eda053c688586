//! Action Records
//!
//! Discriminated union of everything a body can do during its turn.
//! Locations are already decoded from cell indices into grid vectors.

use serde::{Serialize, Deserialize};

use crate::core::vec2::{Direction, Vector};
use super::header::{BodyId, RobotKind, TeamId};

/// Why a body died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DieCause {
    /// Killed in game
    Destroyed,
    /// Bot code threw
    Exception,
    /// Removed by the engine
    Removed,
}

/// One action attached to a turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionRecord {
    /// A cat is fed by the acting rat
    CatFeed { target: BodyId },
    /// Rat bites another body
    RatAttack { target: BodyId },
    /// Pick up or drop another rat
    RatNap { target: BodyId },
    /// Two rats bumped into each other
    RatCollision { loc: Vector },
    /// Dirt placed on an empty cell
    PlaceDirt { loc: Vector },
    /// Dirt dug out of a cell
    BreakDirt { loc: Vector },
    /// Actor scoops all cheese from a cell
    CheesePickup { loc: Vector },
    /// Cheese appears on a cell
    CheeseSpawn { loc: Vector, amount: u32 },
    /// Actor hands cheese to another body
    CheeseTransfer { target: BodyId, amount: u32 },
    /// Cat swipes at a cell
    CatScratch { loc: Vector },
    /// Cat leaps between two cells
    CatPounce { start: Vector, end: Vector },
    /// Actor places a trap on a cell
    PlaceTrap { loc: Vector, rat_trap: bool },
    /// Trap removed from a cell
    RemoveTrap { loc: Vector },
    /// Trap on a cell fires and disappears
    TriggerTrap { loc: Vector },
    /// Carried rat is thrown toward a cell
    ThrowRat { target: BodyId, loc: Vector },
    /// Actor becomes a rat king
    UpgradeToRatKing,
    /// Actor squeaks
    RatSqueak,
    /// Damage dealt to a body
    Damage { target: BodyId, damage: u32 },
    /// Body stunned for a number of turns
    Stun { target: BodyId, cooldown: u32 },
    /// New body appears
    Spawn {
        id: BodyId,
        team: TeamId,
        kind: RobotKind,
        pos: Vector,
        dir: Direction,
        #[serde(default)]
        chirality: u8,
    },
    /// Body dies
    Die { target: BodyId, cause: DieCause },
    /// Debug string on the actor
    IndicatorString { value: String },
    /// Debug dot
    IndicatorDot { loc: Vector, color: u32 },
    /// Debug line
    IndicatorLine { start: Vector, end: Vector, color: u32 },
}

impl ActionRecord {
    /// Short tag used in logs and errors.
    pub fn tag(&self) -> &'static str {
        match self {
            ActionRecord::CatFeed { .. } => "CatFeed",
            ActionRecord::RatAttack { .. } => "RatAttack",
            ActionRecord::RatNap { .. } => "RatNap",
            ActionRecord::RatCollision { .. } => "RatCollision",
            ActionRecord::PlaceDirt { .. } => "PlaceDirt",
            ActionRecord::BreakDirt { .. } => "BreakDirt",
            ActionRecord::CheesePickup { .. } => "CheesePickup",
            ActionRecord::CheeseSpawn { .. } => "CheeseSpawn",
            ActionRecord::CheeseTransfer { .. } => "CheeseTransfer",
            ActionRecord::CatScratch { .. } => "CatScratch",
            ActionRecord::CatPounce { .. } => "CatPounce",
            ActionRecord::PlaceTrap { .. } => "PlaceTrap",
            ActionRecord::RemoveTrap { .. } => "RemoveTrap",
            ActionRecord::TriggerTrap { .. } => "TriggerTrap",
            ActionRecord::ThrowRat { .. } => "ThrowRat",
            ActionRecord::UpgradeToRatKing => "UpgradeToRatKing",
            ActionRecord::RatSqueak => "RatSqueak",
            ActionRecord::Damage { .. } => "Damage",
            ActionRecord::Stun { .. } => "Stun",
            ActionRecord::Spawn { .. } => "Spawn",
            ActionRecord::Die { .. } => "Die",
            ActionRecord::IndicatorString { .. } => "IndicatorString",
            ActionRecord::IndicatorDot { .. } => "IndicatorDot",
            ActionRecord::IndicatorLine { .. } => "IndicatorLine",
        }
    }
}
