//! Per-Round Deltas
//!
//! The authoritative record of one round: the ordered turns, the
//! unattributed deaths and the per-team totals reported by the engine.

use serde::{Serialize, Deserialize};

use crate::core::vec2::{Direction, Vector};
use super::action::ActionRecord;
use super::header::{BodyId, TeamId};

/// Aggregate counters for one team at the end of a round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRoundTotals {
    /// Team these totals belong to
    pub team_id: TeamId,
    /// Cheese transferred to kings so far
    pub cheese_transferred: u32,
    /// Damage dealt to cats so far
    pub cat_damage: u32,
    /// Rat kings alive
    pub alive_rat_kings: u32,
    /// Baby rats alive
    pub alive_baby_rats: u32,
    /// Rat traps on the map
    pub rat_trap_count: u32,
    /// Cat traps on the map
    pub cat_trap_count: u32,
    /// Dirt held by the team
    pub dirt_amount: u32,
    /// Cheese in the team bank
    #[serde(default)]
    pub global_cheese: u32,
}

/// One body's atomic update within a round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Acting body
    pub robot_id: BodyId,
    /// Position after the turn
    pub pos: Vector,
    /// Facing after the turn
    pub dir: Direction,
    /// Health after the turn (may be negative in raw logs)
    pub health: i32,
    /// Movement cooldown
    pub move_cooldown: u32,
    /// Action cooldown
    pub action_cooldown: u32,
    /// Turning cooldown
    pub turning_cooldown: u32,
    /// Bytecodes spent this turn
    pub bytecodes_used: u32,
    /// Cheese carried after the turn, when the engine reports it
    #[serde(default)]
    pub cheese: Option<u32>,
    /// Cooperation game mode was active during this turn
    #[serde(default)]
    pub is_cooperation: bool,
    /// Actions in log order
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
}

impl TurnRecord {
    /// Turn that only restates the body's position.
    pub fn idle(robot_id: BodyId, pos: Vector, health: i32) -> Self {
        Self {
            robot_id,
            pos,
            dir: Direction::Center,
            health,
            move_cooldown: 0,
            action_cooldown: 0,
            turning_cooldown: 0,
            bytecodes_used: 0,
            cheese: None,
            is_cooperation: false,
            actions: Vec::new(),
        }
    }

    /// Builder-style helper to attach an action.
    pub fn with_action(mut self, action: ActionRecord) -> Self {
        self.actions.push(action);
        self
    }
}

/// Everything that happened in one round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundDelta {
    /// 1-based round number; always previous + 1
    pub round_id: u32,
    /// Turns in execution order
    pub turns: Vec<TurnRecord>,
    /// Bodies that died without an attributed action
    #[serde(default)]
    pub died_ids: Vec<BodyId>,
    /// Per-team totals
    pub team_totals: Vec<TeamRoundTotals>,
}

impl RoundDelta {
    /// Number of turns in this round.
    pub fn turns_len(&self) -> u32 {
        self.turns.len() as u32
    }

    /// Whether any turn ran in cooperation mode.
    pub fn is_cooperation(&self) -> bool {
        self.turns.iter().any(|t| t.is_cooperation)
    }
}
