//! Synthetic Matches
//!
//! Deterministic generator for well-formed match logs: a small arena, two
//! teams of rats, neutral cats and a stream of rounds exercising most action
//! kinds. Shared by unit tests, integration tests, benches and the demo
//! binary.
//!
//! The generator keeps its own model of who is alive so that every turn and
//! action it emits references a body that exists at that point of the log.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vector;
use crate::playback::{KindTable, Match, PlaybackConfig, ReplayResult};
use crate::schema::{
    ActionRecord, BodyId, DieCause, Event, GameFooter, GameHeader, MapRecord, MatchFooter,
    MatchHeader, RobotKind, RobotKindMetadata, RoundDelta, SpawnRecord, TeamId, TeamRoundTotals,
    TimelineMarkerRecord, TurnRecord, WinType, NEUTRAL_TEAM, PLAYER_TEAMS,
};

/// Shape of a generated match.
#[derive(Clone, Debug)]
pub struct SyntheticOptions {
    /// Generator seed
    pub seed: u64,
    /// Round deltas to emit
    pub rounds: u32,
    /// Arena width
    pub width: u32,
    /// Arena height
    pub height: u32,
    /// Rats per team at round 0
    pub rats_per_team: u32,
    /// Neutral cats at round 0
    pub cats: u32,
    /// Playback configuration for the built match
    pub config: PlaybackConfig,
}

impl Default for SyntheticOptions {
    fn default() -> Self {
        Self {
            seed: 7,
            rounds: 60,
            width: 16,
            height: 16,
            rats_per_team: 3,
            cats: 1,
            config: PlaybackConfig::default(),
        }
    }
}

/// Match header for the options' arena and initial bodies.
pub fn synthetic_header(options: &SyntheticOptions) -> MatchHeader {
    let mut rng = DeterministicRng::new(options.seed);
    let (w, h) = (options.width.max(4), options.height.max(4));
    let cells = (w * h) as usize;

    let mut walls = vec![0u8; cells];
    let mut dirt = vec![0u8; cells];
    for idx in 0..cells {
        if rng.chance(4) {
            walls[idx] = 1;
        } else if rng.chance(10) {
            dirt[idx] = 1;
        }
    }

    let mut initial_bodies = Vec::new();
    let mut next_id: BodyId = 1;
    for team in PLAYER_TEAMS {
        for i in 0..options.rats_per_team {
            let x = if team == 1 { i as i32 } else { (w - 1 - i) as i32 };
            let y = if team == 1 { 0 } else { h as i32 - 1 };
            initial_bodies.push(SpawnRecord {
                id: next_id,
                team,
                kind: RobotKind::Rat,
                pos: Vector::new(x, y),
                dir: rng.direction(),
                chirality: 0,
            });
            next_id += 1;
        }
    }

    let mut cat_waypoints = BTreeMap::new();
    for c in 0..options.cats {
        let pos = Vector::new((w / 2 - 1) as i32, (h / 2 - 1 + c % 2) as i32);
        cat_waypoints.insert(next_id, vec![pos, Vector::new(1, 1), Vector::new(w as i32 - 3, h as i32 - 3)]);
        initial_bodies.push(SpawnRecord {
            id: next_id,
            team: NEUTRAL_TEAM,
            kind: RobotKind::Cat,
            pos,
            dir: rng.direction(),
            chirality: (c % 2) as u8,
        });
        next_id += 1;
    }

    MatchHeader {
        map: MapRecord {
            name: format!("synthetic-{}", options.seed),
            random_seed: options.seed as u32,
            symmetry: 0,
            width: w,
            height: h,
            walls,
            dirt,
            cheese_mines: vec![Vector::new(2, 2), Vector::new(w as i32 - 3, h as i32 - 3)],
            cat_waypoints,
        },
        initial_bodies,
        max_rounds: options.rounds,
    }
}

/// Round deltas for `synthetic_header(options)`.
pub fn synthetic_rounds(options: &SyntheticOptions) -> Vec<RoundDelta> {
    let header = synthetic_header(options);
    let mut generator = Generator::new(options, &header);
    (1..=options.rounds).map(|round| generator.round(round)).collect()
}

/// A streamed (incomplete) match with every synthetic round added.
pub fn synthetic_match(options: &SyntheticOptions) -> ReplayResult<Match> {
    let header = synthetic_header(options);
    let mut game_match = Match::new(&header, Arc::new(KindTable::default()), options.config.clone())?;
    for delta in synthetic_rounds(options) {
        game_match.add_new_round(delta)?;
    }
    Ok(game_match)
}

/// Full event stream of a one-match game.
pub fn synthetic_events(options: &SyntheticOptions) -> Vec<Event> {
    let mut events = vec![
        Event::GameHeader(GameHeader::default()),
        Event::MatchHeader(synthetic_header(options)),
    ];
    events.extend(synthetic_rounds(options).into_iter().map(Event::Round));
    events.push(Event::MatchFooter(MatchFooter {
        winner: 1,
        win_type: WinType::MostCheese,
        total_rounds: options.rounds,
        profiler_files: Vec::new(),
        timeline_markers: vec![TimelineMarkerRecord {
            round: options.rounds / 2,
            team: 1,
            color_hex: 0x00ff00,
            label: Some("halftime".into()),
        }],
    }));
    events.push(Event::GameFooter(GameFooter { winner: 1 }));
    events
}

// =============================================================================
// GENERATOR
// =============================================================================

#[derive(Clone, Debug)]
struct SimBody {
    team: TeamId,
    kind: RobotKind,
    pos: Vector,
    hp: i32,
    alive: bool,
}

struct Generator {
    rng: DeterministicRng,
    width: i32,
    height: i32,
    bodies: BTreeMap<BodyId, SimBody>,
    next_id: BodyId,
    totals: BTreeMap<TeamId, TeamRoundTotals>,
}

impl Generator {
    fn new(options: &SyntheticOptions, header: &MatchHeader) -> Self {
        let bodies = header
            .initial_bodies
            .iter()
            .map(|s| {
                let hp = stock_hp(s.kind);
                (s.id, SimBody { team: s.team, kind: s.kind, pos: s.pos, hp, alive: true })
            })
            .collect::<BTreeMap<_, _>>();
        let next_id = bodies.keys().next_back().map_or(1, |m| m + 1);
        let totals = PLAYER_TEAMS
            .iter()
            .map(|t| (*t, TeamRoundTotals { team_id: *t, ..Default::default() }))
            .collect();

        Self {
            rng: DeterministicRng::new(options.seed ^ 0x5eed),
            width: header.map.width as i32,
            height: header.map.height as i32,
            bodies,
            next_id,
            totals,
        }
    }

    fn clamp(&self, cell: Vector, kind: RobotKind) -> Vector {
        let (lo, hi) = match kind {
            RobotKind::Rat => (0, 0),
            RobotKind::RatKing => (1, 1),
            RobotKind::Cat => (0, 1),
        };
        Vector::new(
            cell.x.clamp(lo, self.width - 1 - hi),
            cell.y.clamp(lo, self.height - 1 - hi),
        )
    }

    fn random_cell(&mut self) -> Vector {
        Vector::new(
            self.rng.next_int(self.width as u32) as i32,
            self.rng.next_int(self.height as u32) as i32,
        )
    }

    fn adjacent(&mut self, pos: Vector) -> Vector {
        let dir = self.rng.direction();
        self.clamp(pos.step(dir), RobotKind::Rat)
    }

    fn alive_ids(&self, filter: impl Fn(&SimBody) -> bool) -> Vec<BodyId> {
        self.bodies
            .iter()
            .filter(|(_, b)| b.alive && filter(b))
            .map(|(id, _)| *id)
            .collect()
    }

    fn other(&mut self, actor: BodyId, filter: impl Fn(&SimBody) -> bool) -> Option<BodyId> {
        let candidates: Vec<BodyId> = self.alive_ids(filter).into_iter().filter(|id| *id != actor).collect();
        self.rng.choose(&candidates).copied()
    }

    fn round(&mut self, round_id: u32) -> RoundDelta {
        let mut order = self.alive_ids(|_| true);
        self.rng.shuffle(&mut order);

        let cooperation = round_id % 50 < 25;
        let mut turns = Vec::with_capacity(order.len());
        for id in order {
            if !self.bodies.get(&id).is_some_and(|b| b.alive) {
                continue;
            }
            let mut turn = self.turn(id);
            turn.is_cooperation = cooperation;
            turns.push(turn);
        }

        let mut died_ids = Vec::new();
        if self.rng.chance(3) {
            let rats = self.alive_ids(|b| b.kind == RobotKind::Rat && b.team != NEUTRAL_TEAM);
            if rats.len() > 2 {
                if let Some(id) = self.rng.choose(&rats).copied() {
                    if let Some(body) = self.bodies.get_mut(&id) {
                        body.alive = false;
                    }
                    died_ids.push(id);
                }
            }
        }

        for team in PLAYER_TEAMS {
            let kings = self.alive_ids(|b| b.team == team && b.kind == RobotKind::RatKing).len() as u32;
            let rats = self.alive_ids(|b| b.team == team && b.kind == RobotKind::Rat).len() as u32;
            if let Some(totals) = self.totals.get_mut(&team) {
                totals.alive_rat_kings = kings;
                totals.alive_baby_rats = rats;
            }
        }

        RoundDelta {
            round_id,
            turns,
            died_ids,
            team_totals: self.totals.values().cloned().collect(),
        }
    }

    fn turn(&mut self, id: BodyId) -> TurnRecord {
        let Some(body) = self.bodies.get(&id).cloned() else {
            return TurnRecord::idle(id, Vector::ZERO, 0);
        };

        let dir = self.rng.direction();
        let start = body.pos;
        let pos = self.clamp(start.step(dir), body.kind);
        let mut actions = Vec::new();

        for _ in 0..self.rng.next_int(3) {
            if let Some(action) = self.action(id, &body, start, pos) {
                actions.push(action);
            }
        }

        let mut hp = body.hp;
        let dies = body.kind == RobotKind::Rat && self.rng.chance(2) && self.alive_ids(|b| b.kind == RobotKind::Rat).len() > 4;
        if dies {
            let cause = if self.rng.chance(20) { DieCause::Exception } else { DieCause::Destroyed };
            actions.push(ActionRecord::Die { target: id, cause });
            hp = 0;
        }

        if let Some(sim) = self.bodies.get_mut(&id) {
            sim.pos = pos;
            sim.hp = hp;
            sim.alive = !dies;
        }

        TurnRecord {
            robot_id: id,
            pos,
            dir,
            health: hp,
            move_cooldown: self.rng.next_int(20),
            action_cooldown: self.rng.next_int(20),
            turning_cooldown: self.rng.next_int(10),
            bytecodes_used: self.rng.next_int(17_500),
            cheese: None,
            is_cooperation: false,
            actions,
        }
    }

    fn action(&mut self, id: BodyId, body: &SimBody, start: Vector, pos: Vector) -> Option<ActionRecord> {
        let team = body.team;
        let roll = self.rng.next_int(100);
        match body.kind {
            RobotKind::Cat => match roll {
                0..=24 => Some(ActionRecord::CatScratch { loc: self.adjacent(pos) }),
                25..=44 => Some(ActionRecord::CatPounce { start, end: pos }),
                45..=59 => {
                    let target = self.other(id, |b| b.kind == RobotKind::Rat)?;
                    Some(ActionRecord::CatFeed { target })
                }
                60..=74 => {
                    let target = self.other(id, |b| b.team != NEUTRAL_TEAM)?;
                    let damage = self.rng.next_int(4) + 1;
                    if let Some(sim) = self.bodies.get_mut(&target) {
                        sim.hp = (sim.hp - damage as i32).max(1);
                    }
                    Some(ActionRecord::Damage { target, damage })
                }
                75..=84 => Some(ActionRecord::TriggerTrap { loc: pos }),
                _ => {
                    let loc = self.random_cell();
                    Some(ActionRecord::CheeseSpawn { loc, amount: self.rng.next_int(5) + 1 })
                }
            },
            RobotKind::RatKing => match roll {
                0..=19 => {
                    let spawn_id = self.next_id;
                    self.next_id += 1;
                    let loc = self.adjacent(pos);
                    self.bodies.insert(spawn_id, SimBody {
                        team,
                        kind: RobotKind::Rat,
                        pos: loc,
                        hp: stock_hp(RobotKind::Rat),
                        alive: true,
                    });
                    Some(ActionRecord::Spawn {
                        id: spawn_id,
                        team,
                        kind: RobotKind::Rat,
                        pos: loc,
                        dir: self.rng.direction(),
                        chirality: 0,
                    })
                }
                20..=49 => {
                    let amount = self.rng.next_int(10);
                    if let Some(totals) = self.totals.get_mut(&team) {
                        totals.global_cheese += amount;
                    }
                    Some(ActionRecord::RatSqueak)
                }
                _ => Some(ActionRecord::IndicatorLine { start: pos, end: self.random_cell(), color: 0x00ffff }),
            },
            RobotKind::Rat => match roll {
                0..=11 => {
                    let loc = self.adjacent(pos);
                    if let Some(totals) = self.totals.get_mut(&team) {
                        totals.dirt_amount = totals.dirt_amount.saturating_sub(1);
                    }
                    Some(ActionRecord::PlaceDirt { loc })
                }
                12..=23 => {
                    let loc = self.adjacent(pos);
                    if let Some(totals) = self.totals.get_mut(&team) {
                        totals.dirt_amount += 1;
                    }
                    Some(ActionRecord::BreakDirt { loc })
                }
                24..=35 => Some(ActionRecord::CheesePickup { loc: pos }),
                36..=45 => {
                    let target = self.other(id, |b| b.team == team)?;
                    let amount = self.rng.next_int(6);
                    if let Some(totals) = self.totals.get_mut(&team) {
                        totals.cheese_transferred += amount;
                    }
                    Some(ActionRecord::CheeseTransfer { target, amount })
                }
                46..=55 => {
                    let target = self.other(id, |b| b.team != team)?;
                    if let Some(totals) = self.totals.get_mut(&team) {
                        if self.bodies.get(&target).is_some_and(|b| b.kind == RobotKind::Cat) {
                            totals.cat_damage += 1;
                        }
                    }
                    Some(ActionRecord::RatAttack { target })
                }
                56..=62 => {
                    let rat_trap = self.rng.chance(50);
                    if let Some(totals) = self.totals.get_mut(&team) {
                        if rat_trap {
                            totals.rat_trap_count += 1;
                        } else {
                            totals.cat_trap_count += 1;
                        }
                    }
                    Some(ActionRecord::PlaceTrap { loc: pos, rat_trap })
                }
                63..=68 => {
                    let target = self.other(id, |b| b.team == team && b.kind == RobotKind::Rat)?;
                    Some(ActionRecord::RatNap { target })
                }
                69..=72 => {
                    let target = self.other(id, |b| b.team == team && b.kind == RobotKind::Rat)?;
                    Some(ActionRecord::ThrowRat { target, loc: self.adjacent(pos) })
                }
                73..=74 => {
                    let sim = self.bodies.get_mut(&id).filter(|b| b.kind == RobotKind::Rat)?;
                    sim.kind = RobotKind::RatKing;
                    sim.hp = stock_hp(RobotKind::RatKing);
                    Some(ActionRecord::UpgradeToRatKing)
                }
                75..=80 => Some(ActionRecord::RatCollision { loc: pos }),
                81..=88 => Some(ActionRecord::IndicatorString { value: format!("rat {} says hi", id) }),
                89..=94 => Some(ActionRecord::IndicatorDot { loc: self.random_cell(), color: 0xff0000 }),
                _ => Some(ActionRecord::RatSqueak),
            },
        }
    }
}

fn stock_hp(kind: RobotKind) -> i32 {
    RobotKindMetadata::stock(kind).base_health as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let options = SyntheticOptions { rounds: 30, ..Default::default() };
        assert_eq!(synthetic_rounds(&options), synthetic_rounds(&options));

        let other = SyntheticOptions { seed: 8, ..options.clone() };
        assert_ne!(synthetic_rounds(&options), synthetic_rounds(&other));
    }

    #[test]
    fn test_rounds_are_numbered_and_busy() {
        let rounds = synthetic_rounds(&SyntheticOptions { rounds: 20, ..Default::default() });
        for (i, delta) in rounds.iter().enumerate() {
            assert_eq!(delta.round_id, i as u32 + 1);
            assert!(delta.turns_len() >= 2);
        }
    }

    #[test]
    fn test_match_loads() {
        let game_match = synthetic_match(&SyntheticOptions { rounds: 12, ..Default::default() }).unwrap();
        assert_eq!(game_match.max_round(), 13);
        assert_eq!(game_match.rounds_received(), 12);
    }

    #[test]
    fn test_event_stream_shape() {
        let events = synthetic_events(&SyntheticOptions { rounds: 4, ..Default::default() });
        assert_eq!(events.len(), 2 + 4 + 2);
        assert!(matches!(events[0], Event::GameHeader(_)));
        assert!(matches!(events.last(), Some(Event::GameFooter(_))));
    }
}
