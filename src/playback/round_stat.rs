//! Round Statistics
//!
//! Per-team counters shown while a round is displayed. The counters attached
//! to round N describe the state after round N-1 finished: most fields are
//! copied from that round's delta, the rest are recounted from live bodies.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use tracing::warn;

use crate::schema::{RobotKind, RoundDelta, TeamId, NEUTRAL_TEAM, PLAYER_TEAMS};
use super::bodies::Bodies;
use super::error::{ReplayError, ReplayResult};

/// Counters for one team.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamRoundStat {
    /// Cooperation game mode was active
    pub cooperation: bool,
    /// Cheese transferred so far
    pub cheese_amount: u32,
    /// Share of all transferred cheese
    pub cheese_percent: f64,
    /// Damage dealt to cats so far
    pub cat_damage_amount: u32,
    /// Share of all cat damage
    pub cat_damage_percent: f64,
    /// Rat kings alive
    pub rat_king_count: u32,
    /// Share of all rat kings
    pub rat_king_percent: f64,
    /// Dirt held
    pub dirt_amount: u32,
    /// Cheese in the team bank
    pub global_cheese_amount: u32,
    /// Live baby rats, recounted from bodies
    pub baby_rat_count: u32,
    /// Rat traps placed
    pub rat_trap_count: u32,
    /// Cat traps placed
    pub cat_trap_count: u32,
}

impl Default for TeamRoundStat {
    fn default() -> Self {
        Self {
            cooperation: true,
            cheese_amount: 0,
            cheese_percent: 0.0,
            cat_damage_amount: 0,
            cat_damage_percent: 0.0,
            rat_king_count: 0,
            rat_king_percent: 0.0,
            dirt_amount: 0,
            global_cheese_amount: 0,
            baby_rat_count: 0,
            rat_trap_count: 0,
            cat_trap_count: 0,
        }
    }
}

/// Counters for both player teams at one round.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundStat {
    teams: BTreeMap<TeamId, TeamRoundStat>,
    completed: bool,
}

impl Default for RoundStat {
    fn default() -> Self {
        Self {
            teams: PLAYER_TEAMS.iter().map(|t| (*t, TeamRoundStat::default())).collect(),
            completed: false,
        }
    }
}

fn share(part: u32, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

impl RoundStat {
    /// Whether `apply_round_delta` already ran.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Counters of one team.
    pub fn team(&self, team: TeamId) -> ReplayResult<&TeamRoundStat> {
        self.teams.get(&team).ok_or(ReplayError::UnknownTeam(team))
    }

    /// Teams in id order.
    pub fn teams(&self) -> impl Iterator<Item = (TeamId, &TeamRoundStat)> {
        self.teams.iter().map(|(id, stat)| (*id, stat))
    }

    /// Fill this stat for round `round_number` from the delta that just ended.
    ///
    /// No-op once completed. `delta` is `None` for the synthetic pre-state.
    pub fn apply_round_delta(
        &mut self,
        round_number: u32,
        bodies: &Bodies,
        delta: Option<&RoundDelta>,
        budget_micros: u64,
    ) -> ReplayResult<()> {
        if let Some(delta) = delta {
            if round_number != delta.round_id + 1 {
                return Err(ReplayError::RoundMismatch {
                    expected: round_number.saturating_sub(1),
                    got: delta.round_id,
                });
            }
        }
        if self.completed {
            return Ok(());
        }

        let started = Instant::now();

        if let Some(delta) = delta {
            let mut total_cheese = 0u64;
            let mut total_damage = 0u64;
            let mut total_kings = 0u64;
            for totals in &delta.team_totals {
                total_cheese += totals.cheese_transferred as u64;
                total_damage += totals.cat_damage as u64;
                total_kings += totals.alive_rat_kings as u64;
            }

            let cooperation = delta.is_cooperation();
            for totals in &delta.team_totals {
                let stat = self
                    .teams
                    .get_mut(&totals.team_id)
                    .ok_or(ReplayError::UnknownTeam(totals.team_id))?;

                stat.cheese_amount = totals.cheese_transferred;
                stat.cheese_percent = share(totals.cheese_transferred, total_cheese);
                stat.cat_damage_amount = totals.cat_damage;
                stat.cat_damage_percent = share(totals.cat_damage, total_damage);
                stat.rat_king_count = totals.alive_rat_kings;
                stat.rat_king_percent = share(totals.alive_rat_kings, total_kings);
                stat.dirt_amount = totals.dirt_amount;
                stat.global_cheese_amount = totals.global_cheese;
                stat.rat_trap_count = totals.rat_trap_count;
                stat.cat_trap_count = totals.cat_trap_count;
                stat.cooperation = cooperation;
            }
        }

        // Baby rats are always recounted; the delta's figure is ignored.
        for stat in self.teams.values_mut() {
            stat.baby_rat_count = 0;
        }
        for body in bodies.iter() {
            if body.team == NEUTRAL_TEAM || body.dead || body.robot_kind() != RobotKind::Rat {
                continue;
            }
            let stat = self.teams.get_mut(&body.team).ok_or(ReplayError::UnknownTeam(body.team))?;
            stat.baby_rat_count += 1;
        }

        let elapsed = started.elapsed().as_micros() as u64;
        if elapsed > budget_micros {
            warn!("Stat for round {} took {}us", round_number, elapsed);
        }

        self.completed = true;
        Ok(())
    }
}

// =============================================================================
// LEDGER
// =============================================================================

/// Stats of every round of a match, indexed by round number.
///
/// Shared by every `Round` of the match, snapshots included, so a stat is
/// computed once no matter how often its round is replayed.
#[derive(Clone, Debug, Default)]
pub struct StatLedger {
    stats: Vec<RoundStat>,
}

impl StatLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stat for `round`, created on first access.
    pub fn get_or_create(&mut self, round: u32) -> &mut RoundStat {
        let idx = round as usize;
        if self.stats.len() <= idx {
            self.stats.resize_with(idx + 1, RoundStat::default);
        }
        &mut self.stats[idx]
    }

    /// Stat for `round`, if it has been touched.
    pub fn get(&self, round: u32) -> Option<&RoundStat> {
        self.stats.get(round as usize)
    }

    /// Highest round with a slot, plus one.
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Whether no round has a stat yet.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::core::vec2::{Direction, Vector};
    use crate::playback::bodies::KindTable;
    use crate::playback::map::StaticMap;
    use crate::schema::{MapRecord, SpawnRecord, TeamRoundTotals, TurnRecord};

    fn bodies() -> Bodies {
        let record = MapRecord {
            name: "stat".into(),
            random_seed: 0,
            symmetry: 0,
            width: 8,
            height: 8,
            walls: vec![0; 64],
            dirt: vec![0; 64],
            cheese_mines: vec![],
            cat_waypoints: Default::default(),
        };
        let map = Arc::new(StaticMap::from_record(&record).unwrap());
        let mut bodies = Bodies::new(Arc::new(KindTable::default()), map, 4);
        let spawns = [
            (1, 1, RobotKind::Rat),
            (2, 1, RobotKind::Rat),
            (3, 2, RobotKind::Rat),
            (4, 2, RobotKind::RatKing),
            (5, 0, RobotKind::Cat),
        ];
        for (i, (id, team, kind)) in spawns.into_iter().enumerate() {
            bodies
                .spawn(&SpawnRecord {
                    id,
                    team,
                    kind,
                    pos: Vector::new(i as i32 + 1, 3),
                    dir: Direction::North,
                    chirality: 0,
                })
                .unwrap();
        }
        bodies
    }

    fn totals(team_id: TeamId, cheese: u32, damage: u32, kings: u32) -> TeamRoundTotals {
        TeamRoundTotals {
            team_id,
            cheese_transferred: cheese,
            cat_damage: damage,
            alive_rat_kings: kings,
            alive_baby_rats: 99,
            rat_trap_count: 2,
            cat_trap_count: 1,
            dirt_amount: 7,
            global_cheese: 30,
        }
    }

    #[test]
    fn test_null_delta_counts_bodies_only() {
        let bodies = bodies();
        let mut stat = RoundStat::default();
        stat.apply_round_delta(0, &bodies, None, u64::MAX).unwrap();

        assert!(stat.is_completed());
        let one = stat.team(1).unwrap();
        assert_eq!(one.baby_rat_count, 2);
        assert_eq!(one.cheese_amount, 0);
        assert!(one.cooperation);
        assert_eq!(stat.team(2).unwrap().baby_rat_count, 1);
    }

    #[test]
    fn test_delta_fields_and_percentages() {
        let mut bodies = bodies();
        bodies.mark_dead(2).unwrap();

        let delta = RoundDelta {
            round_id: 1,
            turns: vec![TurnRecord::idle(1, Vector::new(1, 3), 10)],
            died_ids: vec![],
            team_totals: vec![totals(1, 30, 0, 1), totals(2, 10, 0, 3)],
        };
        let mut stat = RoundStat::default();
        stat.apply_round_delta(2, &bodies, Some(&delta), u64::MAX).unwrap();

        let one = stat.team(1).unwrap();
        assert_eq!(one.cheese_amount, 30);
        assert!((one.cheese_percent - 0.75).abs() < 1e-9);
        assert_eq!(one.cat_damage_percent, 0.0);
        assert!((one.rat_king_percent - 0.25).abs() < 1e-9);
        assert_eq!(one.global_cheese_amount, 30);
        assert_eq!(one.rat_trap_count, 2);
        assert!(!one.cooperation);
        // Recounted from bodies, not copied from the delta.
        assert_eq!(one.baby_rat_count, 1);
    }

    #[test]
    fn test_second_apply_is_noop() {
        let bodies = bodies();
        let first = RoundDelta {
            round_id: 1,
            team_totals: vec![totals(1, 5, 0, 0)],
            ..Default::default()
        };
        let mut stat = RoundStat::default();
        stat.apply_round_delta(2, &bodies, Some(&first), u64::MAX).unwrap();
        let before = stat.clone();

        let second = RoundDelta {
            round_id: 1,
            team_totals: vec![totals(1, 500, 0, 0)],
            ..Default::default()
        };
        stat.apply_round_delta(2, &bodies, Some(&second), u64::MAX).unwrap();
        assert_eq!(stat, before);
    }

    #[test]
    fn test_wrong_round_rejected() {
        let bodies = bodies();
        let delta = RoundDelta { round_id: 4, ..Default::default() };
        let mut stat = RoundStat::default();
        assert_eq!(
            stat.apply_round_delta(2, &bodies, Some(&delta), u64::MAX),
            Err(ReplayError::RoundMismatch { expected: 1, got: 4 })
        );
        assert!(!stat.is_completed());
    }

    #[test]
    fn test_unknown_team_rejected() {
        let bodies = bodies();
        let delta = RoundDelta {
            round_id: 1,
            team_totals: vec![totals(7, 1, 1, 1)],
            ..Default::default()
        };
        let mut stat = RoundStat::default();
        assert_eq!(
            stat.apply_round_delta(2, &bodies, Some(&delta), u64::MAX),
            Err(ReplayError::UnknownTeam(7))
        );
    }

    #[test]
    fn test_ledger_grows_on_demand() {
        let mut ledger = StatLedger::new();
        assert!(ledger.get(3).is_none());
        ledger.get_or_create(3);
        assert_eq!(ledger.len(), 4);
        assert!(!ledger.get(3).unwrap().is_completed());
    }
}
