//! Round State Machine
//!
//! A `Round` is one consistent view of (map, bodies, actions) at a
//! `(round_number, turn_number)` position. It replays turns forward from the
//! round's delta and resets to a lazily captured checkpoint when asked to go
//! backward within the round.
//!
//! ## Lifecycle
//!
//! ```text
//! round 0 (pre-state, no delta)
//!    │ start_apply_new_round(delta 1)
//!    ▼
//! round 1, turn 0 ──step_turn──▶ turn 1 ──▶ ... ──▶ turn N
//!                                                     │ start_apply_new_round(delta 2)
//!                                                     ▼
//!                                              round 2, turn 0 ...
//! ```
//!
//! Stats live in the match's `StatLedger` and are passed in where needed.

use std::sync::Arc;

#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::vec2::Vector;
use crate::schema::{BodyId, RoundDelta};
use super::actions::Actions;
use super::bodies::Bodies;
use super::error::{ReplayError, ReplayResult};
use super::map::CurrentMap;
use super::render::{RenderContext, Surface, VisualOverrides};
use super::round_stat::{RoundStat, StatLedger};

/// Untouched state of a round at turn 0, used to reset backward seeks.
#[derive(Clone, Debug)]
pub struct RoundCheckpoint {
    map: CurrentMap,
    bodies: Bodies,
    actions: Actions,
    overrides: VisualOverrides,
}

/// One round of a match at a specific turn.
#[derive(Debug)]
pub struct Round {
    round_number: u32,
    turn_number: u32,
    map: CurrentMap,
    bodies: Bodies,
    actions: Actions,
    overrides: VisualOverrides,
    current_delta: Option<Arc<RoundDelta>>,
    initial_state: Option<Box<RoundCheckpoint>>,
    transient: bool,
    last_stepped_robot_id: Option<BodyId>,
    stat_budget_micros: u64,
}

impl Round {
    /// Synthetic round 0: initial bodies on a fresh map, no delta.
    ///
    /// Round 0's stat is computed immediately from the initial bodies.
    pub fn new_initial(
        map: CurrentMap,
        bodies: Bodies,
        ledger: &mut StatLedger,
        stat_budget_micros: u64,
    ) -> ReplayResult<Self> {
        let round = Self {
            round_number: 0,
            turn_number: 0,
            map,
            bodies,
            actions: Actions::new(),
            overrides: VisualOverrides::default(),
            current_delta: None,
            initial_state: None,
            transient: false,
            last_stepped_robot_id: None,
            stat_budget_micros,
        };
        ledger
            .get_or_create(0)
            .apply_round_delta(0, &round.bodies, None, stat_budget_micros)?;
        Ok(round)
    }

    /// Independent copy sharing the same delta.
    ///
    /// The checkpoint is not carried over; a copy starts with a clean
    /// reset history.
    pub fn copy(&self) -> Self {
        Self {
            round_number: self.round_number,
            turn_number: self.turn_number,
            map: self.map.clone(),
            bodies: self.bodies.clone(),
            actions: self.actions.clone(),
            overrides: self.overrides.clone(),
            current_delta: self.current_delta.clone(),
            initial_state: None,
            transient: false,
            last_stepped_robot_id: self.last_stepped_robot_id,
            stat_budget_micros: self.stat_budget_micros,
        }
    }

    fn checkpoint(&self) -> RoundCheckpoint {
        RoundCheckpoint {
            map: self.map.clone(),
            bodies: self.bodies.clone(),
            actions: self.actions.clone(),
            overrides: self.overrides.clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// 1-based round number; 0 is the pre-state.
    #[inline]
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    /// Turns applied so far in this round.
    #[inline]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Turns in this round's delta (0 without a delta).
    #[inline]
    pub fn turns_len(&self) -> u32 {
        self.current_delta.as_ref().map_or(0, |d| d.turns_len())
    }

    /// Delta being stepped through.
    pub fn current_delta(&self) -> Option<&RoundDelta> {
        self.current_delta.as_deref()
    }

    /// Map layers.
    pub fn map(&self) -> &CurrentMap {
        &self.map
    }

    /// Body registry.
    pub fn bodies(&self) -> &Bodies {
        &self.bodies
    }

    /// Live actions.
    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    /// Visual overrides installed by live actions.
    pub fn overrides(&self) -> &VisualOverrides {
        &self.overrides
    }

    /// Body whose turn was applied last.
    pub fn last_stepped_robot_id(&self) -> Option<BodyId> {
        self.last_stepped_robot_id
    }

    /// Whether the round is a pass-through of a multi-round jump.
    pub fn is_transient(&self) -> bool {
        self.transient
    }

    /// Mark the round as a pass-through; no checkpoint is captured while set.
    pub fn set_transient(&mut self, transient: bool) {
        self.transient = transient;
    }

    /// Whether a reset checkpoint has been captured.
    pub fn has_checkpoint(&self) -> bool {
        self.initial_state.is_some()
    }

    /// Whether this is the synthetic pre-state.
    pub fn is_start(&self) -> bool {
        self.round_number == 0
    }

    /// Whether this is the last round received so far.
    pub fn is_end(&self, max_round: u32) -> bool {
        self.round_number == max_round
    }

    /// This round's stat.
    pub fn stat<'a>(&self, ledger: &'a StatLedger) -> Option<&'a RoundStat> {
        ledger.get(self.round_number)
    }

    // -------------------------------------------------------------------------
    // Stepping
    // -------------------------------------------------------------------------

    /// Apply the next turn.
    pub fn step_turn(&mut self) -> ReplayResult<()> {
        let turns = self.turns_len();
        let delta = match &self.current_delta {
            Some(delta) if self.turn_number < turns => Arc::clone(delta),
            _ => {
                return Err(ReplayError::StepPastEnd {
                    round: self.round_number,
                    turn: self.turn_number,
                    turns,
                })
            }
        };
        let turn = &delta.turns[self.turn_number as usize];

        if self.initial_state.is_none() && !self.transient {
            debug_assert_eq!(self.turn_number, 0);
            self.initial_state = Some(Box::new(self.checkpoint()));
        }

        // Actions of the previous round and its dead stay visible until the
        // first turn of this one.
        if self.turn_number == 0 {
            self.actions.tick_lifetimes(&mut self.overrides);
            self.bodies.clear_died_bodies();
        }

        #[cfg(feature = "debug-tracing")]
        trace!(
            "Round {} turn {}: body {} at {} with {} actions",
            self.round_number,
            self.turn_number,
            turn.robot_id,
            turn.pos,
            turn.actions.len()
        );

        self.bodies.clear_indicators(turn.robot_id);
        self.actions.apply_turn_delta(turn, &mut self.map, &mut self.bodies)?;
        self.bodies.apply_turn_delta(turn)?;

        self.turn_number += 1;
        self.last_stepped_robot_id = Some(turn.robot_id);
        Ok(())
    }

    /// Seek to `target` turns applied within this round.
    ///
    /// Going backward resets to the checkpoint and replays from turn 0.
    /// Rounds without a delta have nothing to seek.
    pub fn jump_to_turn(&mut self, target: u32) -> ReplayResult<()> {
        if self.current_delta.is_none() {
            return Ok(());
        }

        if target < self.turn_number {
            let checkpoint = self
                .initial_state
                .as_ref()
                .ok_or(ReplayError::NoCheckpoint { round: self.round_number })?;
            self.map = checkpoint.map.clone();
            self.bodies = checkpoint.bodies.clone();
            self.actions = checkpoint.actions.clone();
            self.overrides = checkpoint.overrides.clone();
            self.turn_number = 0;
        }

        while self.turn_number < target {
            self.step_turn()?;
        }
        Ok(())
    }

    /// Seek to just after `robot_id`'s turn in this round.
    ///
    /// Does nothing if the robot has no turn here.
    pub fn jump_to_robot_turn(&mut self, robot_id: BodyId) -> ReplayResult<()> {
        let position = self
            .current_delta
            .as_ref()
            .and_then(|d| d.turns.iter().position(|t| t.robot_id == robot_id));
        match position {
            Some(index) => self.jump_to_turn(index as u32 + 1),
            None => Ok(()),
        }
    }

    /// Close this round and start the next one.
    ///
    /// The ending delta drives map and stat updates for the new round
    /// number; `next` becomes the delta stepped through afterwards. `None`
    /// marks the post-game round.
    pub fn start_apply_new_round(
        &mut self,
        next: Option<Arc<RoundDelta>>,
        ledger: &mut StatLedger,
    ) -> ReplayResult<()> {
        let turns = self.turns_len();
        if self.turn_number != turns {
            return Err(ReplayError::RoundNotFinished {
                round: self.round_number,
                turn: self.turn_number,
                turns,
            });
        }

        let ending = self.current_delta.take();
        self.bodies.process_round_end(ending.as_deref())?;

        self.round_number += 1;

        self.map.apply_round_delta();
        ledger.get_or_create(self.round_number).apply_round_delta(
            self.round_number,
            &self.bodies,
            ending.as_deref(),
            self.stat_budget_micros,
        )?;

        self.initial_state = None;
        self.turn_number = 0;
        self.current_delta = next;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Hash of (round, turn, map, bodies, actions, stat).
    ///
    /// Equal fingerprints mean equal authoritative state regardless of the
    /// navigation path that produced it.
    pub fn fingerprint(&self, ledger: &StatLedger) -> ReplayResult<StateHash> {
        let map = bincode::serialize(&self.map)?;
        let bodies = self.bodies.encode()?;
        let actions = bincode::serialize(&self.actions)?;
        let stat = bincode::serialize(&self.stat(ledger))?;

        Ok(compute_state_hash(self.round_number, self.turn_number, |hasher| {
            hasher.update_section(&map);
            hasher.update_section(&bodies);
            hasher.update_section(&actions);
            hasher.update_section(&stat);
        }))
    }

    /// Tooltip lines for a cell: map contents, then the body on it.
    pub fn describe_cell(&self, cell: Vector, site_lifetime: u32) -> Vec<String> {
        let mut lines = self.map.tooltip(cell, self.round_number, site_lifetime);
        if let Some(body) = self.bodies.get_at_location(cell, None) {
            lines.extend(body.hover_info());
        }
        lines
    }

    /// Submit the frame: actions first (they may install overrides), then
    /// bodies.
    ///
    /// Only visual overrides change here.
    pub fn draw(&mut self, ctx: &RenderContext, surface: &mut dyn Surface) {
        self.actions.draw(ctx, &self.bodies, &mut self.overrides, surface);
        self.bodies.draw(ctx, &self.overrides, surface);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Direction;
    use crate::playback::bodies::KindTable;
    use crate::playback::map::StaticMap;
    use crate::playback::render::DrawCommand;
    use crate::schema::{
        ActionRecord, MapRecord, RobotKind, SpawnRecord, TeamRoundTotals, TurnRecord,
    };

    fn initial(ledger: &mut StatLedger) -> Round {
        let record = MapRecord {
            name: "round".into(),
            random_seed: 3,
            symmetry: 0,
            width: 10,
            height: 10,
            walls: vec![0; 100],
            dirt: vec![0; 100],
            cheese_mines: vec![Vector::new(1, 0)],
            cat_waypoints: Default::default(),
        };
        let static_map = Arc::new(StaticMap::from_record(&record).unwrap());
        let mut map = CurrentMap::new(Arc::clone(&static_map));
        map.set_cheese(Vector::new(1, 0), 5).unwrap();

        let mut bodies = Bodies::new(Arc::new(KindTable::default()), static_map, 8);
        for (id, team, x) in [(1, 1, 0), (2, 2, 9)] {
            bodies
                .spawn(&SpawnRecord {
                    id,
                    team,
                    kind: RobotKind::Rat,
                    pos: Vector::new(x, 0),
                    dir: Direction::East,
                    chirality: 0,
                })
                .unwrap();
        }
        Round::new_initial(map, bodies, ledger, u64::MAX).unwrap()
    }

    fn delta(round_id: u32, turns: Vec<TurnRecord>) -> Arc<RoundDelta> {
        Arc::new(RoundDelta {
            round_id,
            turns,
            died_ids: vec![],
            team_totals: vec![
                TeamRoundTotals { team_id: 1, cheese_transferred: 5, ..Default::default() },
                TeamRoundTotals { team_id: 2, ..Default::default() },
            ],
        })
    }

    fn pickup_round() -> Arc<RoundDelta> {
        delta(
            1,
            vec![
                TurnRecord::idle(1, Vector::new(1, 0), 10)
                    .with_action(ActionRecord::CheesePickup { loc: Vector::new(1, 0) }),
                TurnRecord::idle(2, Vector::new(8, 0), 10),
            ],
        )
    }

    #[test]
    fn test_pickup_scenario() {
        let mut ledger = StatLedger::new();
        let mut round = initial(&mut ledger);
        assert!(round.is_start());
        assert!(ledger.get(0).unwrap().is_completed());

        round.start_apply_new_round(Some(pickup_round()), &mut ledger).unwrap();
        assert_eq!(round.round_number(), 1);
        assert_eq!(round.turns_len(), 2);

        round.jump_to_turn(1).unwrap();
        let body = round.bodies().get(1).unwrap();
        assert_eq!(body.pos, Vector::new(1, 0));
        assert_eq!(body.cheese, 5);
        assert_eq!(round.map().cheese_at(Vector::new(1, 0)).unwrap(), 0);
        assert_eq!(round.last_stepped_robot_id(), Some(1));

        round.jump_to_turn(2).unwrap();
        round.start_apply_new_round(None, &mut ledger).unwrap();
        assert_eq!(round.round_number(), 2);
        assert_eq!(ledger.get(2).unwrap().team(1).unwrap().cheese_amount, 5);
        assert!(round.is_end(2));
    }

    #[test]
    fn test_backward_jump_replays_from_checkpoint() {
        let mut ledger = StatLedger::new();
        let mut round = initial(&mut ledger);
        round.start_apply_new_round(Some(pickup_round()), &mut ledger).unwrap();

        round.jump_to_turn(2).unwrap();
        let forward = round.fingerprint(&ledger).unwrap();

        round.jump_to_turn(0).unwrap();
        assert_eq!(round.turn_number(), 0);
        assert_eq!(round.bodies().get(1).unwrap().cheese, 0);
        assert_eq!(round.map().cheese_at(Vector::new(1, 0)).unwrap(), 5);

        round.jump_to_turn(2).unwrap();
        assert_eq!(round.fingerprint(&ledger).unwrap(), forward);
    }

    #[test]
    fn test_transient_round_skips_checkpoint() {
        let mut ledger = StatLedger::new();
        let mut round = initial(&mut ledger);
        round.start_apply_new_round(Some(pickup_round()), &mut ledger).unwrap();

        round.set_transient(true);
        round.jump_to_turn(2).unwrap();
        assert!(!round.has_checkpoint());
        assert_eq!(round.jump_to_turn(0), Err(ReplayError::NoCheckpoint { round: 1 }));
    }

    #[test]
    fn test_preconditions() {
        let mut ledger = StatLedger::new();
        let mut round = initial(&mut ledger);
        assert_eq!(
            round.step_turn(),
            Err(ReplayError::StepPastEnd { round: 0, turn: 0, turns: 0 })
        );

        round.start_apply_new_round(Some(pickup_round()), &mut ledger).unwrap();
        round.jump_to_turn(1).unwrap();
        assert_eq!(
            round.start_apply_new_round(None, &mut ledger),
            Err(ReplayError::RoundNotFinished { round: 1, turn: 1, turns: 2 })
        );
    }

    #[test]
    fn test_robot_turn_and_copy() {
        let mut ledger = StatLedger::new();
        let mut round = initial(&mut ledger);
        round.start_apply_new_round(Some(pickup_round()), &mut ledger).unwrap();

        round.jump_to_robot_turn(2).unwrap();
        assert_eq!(round.turn_number(), 2);
        round.jump_to_robot_turn(77).unwrap();
        assert_eq!(round.turn_number(), 2);

        let copy = round.copy();
        assert!(!copy.has_checkpoint());
        assert_eq!(copy.fingerprint(&ledger).unwrap(), round.fingerprint(&ledger).unwrap());
    }

    #[test]
    fn test_dead_bodies_cleared_on_first_turn() {
        let mut ledger = StatLedger::new();
        let mut round = initial(&mut ledger);
        let kill = delta(
            1,
            vec![TurnRecord::idle(1, Vector::new(0, 0), 10)
                .with_action(ActionRecord::Die { target: 2, cause: crate::schema::DieCause::Destroyed })],
        );
        round.start_apply_new_round(Some(kill), &mut ledger).unwrap();
        round.jump_to_turn(1).unwrap();

        let next = delta(2, vec![TurnRecord::idle(1, Vector::new(0, 1), 10)]);
        round.start_apply_new_round(Some(next), &mut ledger).unwrap();
        // Still visible at turn 0 of the following round.
        assert!(round.bodies().get(2).unwrap().dead);
        assert_eq!(ledger.get(2).unwrap().team(2).unwrap().baby_rat_count, 0);
        assert!(!round.actions().is_empty());

        round.step_turn().unwrap();
        assert!(!round.bodies().contains(2));
        assert!(round.actions().is_empty());
    }

    #[test]
    fn test_draw_leaves_state_untouched() {
        let mut ledger = StatLedger::new();
        let mut round = initial(&mut ledger);
        round.start_apply_new_round(Some(pickup_round()), &mut ledger).unwrap();
        round.jump_to_turn(2).unwrap();

        let before = round.fingerprint(&ledger).unwrap();
        let mut out: Vec<DrawCommand> = Vec::new();
        round.draw(&RenderContext::default(), &mut out);
        assert!(!out.is_empty());
        assert_eq!(round.fingerprint(&ledger).unwrap(), before);
    }

    #[test]
    fn test_describe_cell() {
        let mut ledger = StatLedger::new();
        let round = initial(&mut ledger);
        let lines = round.describe_cell(Vector::new(1, 0), 50);
        assert!(lines.contains(&"Cheese Mine".to_string()));
        let lines = round.describe_cell(Vector::new(0, 0), 50);
        assert!(lines.iter().any(|l| l.starts_with("Rat (id 1)")));
    }
}
