//! Match Seek Engine
//!
//! Owns the received round deltas, a sparse list of turn-0 snapshots and the
//! single round on display. Every seek funnels through `jump_to_round`, which
//! replays forward from the nearest snapshot at or before the target.
//!
//! ## Snapshot Stride
//!
//! ```text
//! rounds:     1 ........ 41 ........ 81 ........ 121
//! snapshots:  [0]        [1]         [2]         [3]
//! ```
//!
//! Seeking costs at most one stride of replay no matter how long the match.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::hash::{short_hex, StateHash};
use crate::schema::{
    BodyId, MatchFooter, MatchHeader, ProfilerFileRecord, RoundDelta, TeamId, WinType,
    PLAYER_TEAMS,
};
use super::bodies::{Bodies, KindTable};
use super::config::PlaybackConfig;
use super::error::{ReplayError, ReplayResult};
use super::map::{CurrentMap, StaticMap};
use super::render::{RenderContext, Surface};
use super::round::Round;
use super::round_stat::{RoundStat, StatLedger};

/// How real-time playback advances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Interpolate bodies across a whole round
    #[default]
    PerRound,
    /// Step one turn at a time
    PerTurn,
}

// =============================================================================
// POST-MATCH ARTIFACTS
// =============================================================================

/// Timeline annotation, shifted to the round that shows its effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelineMarker {
    /// Round the marker points at
    pub round: u32,
    /// Team that placed it
    pub team: TeamId,
    /// RGB colour, 0xRRGGBB
    pub color_hex: u32,
    /// Text shown on hover; empty when none was given
    pub label: String,
}

/// Open or close of a profiler frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfilerEventKind {
    /// Frame entered
    OpenFrame,
    /// Frame left
    CloseFrame,
}

/// One profiler event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProfilerEvent {
    /// Open or close
    pub kind: ProfilerEventKind,
    /// Bytecode counter at the event
    pub at: i64,
    /// Index into the file's frame names
    pub frame: u32,
}

/// Evented profile of one body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    /// Body id parsed from the name
    pub id: BodyId,
    /// Raw profile name, `#<id>`
    pub name: String,
    /// Events in log order
    pub events: Vec<ProfilerEvent>,
    /// Earliest event minus one
    pub start_value: i64,
    /// Latest event plus one
    pub end_value: i64,
}

/// Profiler output for one team, profiles sorted by body id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfilerFile {
    /// Frame names
    pub frames: Vec<String>,
    /// Profiles sorted by body id
    pub profiles: Vec<Profile>,
}

impl ProfilerFile {
    /// Parse a raw profiler file.
    pub fn from_record(record: &ProfilerFileRecord) -> ReplayResult<Self> {
        let mut profiles = Vec::with_capacity(record.profiles.len());
        for raw in &record.profiles {
            let id = raw
                .name
                .get(1..)
                .and_then(|digits| digits.parse::<BodyId>().ok())
                .ok_or_else(|| ReplayError::BadProfileName(raw.name.clone()))?;

            let events: Vec<ProfilerEvent> = raw
                .events
                .iter()
                .map(|e| ProfilerEvent {
                    kind: if e.is_open { ProfilerEventKind::OpenFrame } else { ProfilerEventKind::CloseFrame },
                    at: e.at,
                    frame: e.frame,
                })
                .collect();
            let start = events.iter().map(|e| e.at).min().unwrap_or(0);
            let end = events.iter().map(|e| e.at).max().unwrap_or(0);

            profiles.push(Profile {
                id,
                name: raw.name.clone(),
                events,
                start_value: start - 1,
                end_value: end + 1,
            });
        }
        profiles.sort_by_key(|p| p.id);

        Ok(Self { frames: record.frames.clone(), profiles })
    }
}

// =============================================================================
// MATCH
// =============================================================================

/// One match of a game.
#[derive(Debug)]
pub struct Match {
    config: PlaybackConfig,
    static_map: Arc<StaticMap>,
    max_round: u32,
    current_round: Round,
    deltas: Vec<Arc<RoundDelta>>,
    snapshots: Vec<Round>,
    stats: StatLedger,
    winner: Option<TeamId>,
    win_type: Option<WinType>,
    footer_received: bool,
    stream_complete: bool,
    timeline_markers: Vec<TimelineMarker>,
    profiler_files: Vec<ProfilerFile>,
    simulation_step: f64,
    mode: PlaybackMode,
}

impl Match {
    /// Build the pre-state (round 0) from a match header.
    pub fn new(header: &MatchHeader, kinds: Arc<KindTable>, config: PlaybackConfig) -> ReplayResult<Self> {
        let config = config.normalized();
        let static_map = Arc::new(StaticMap::from_record(&header.map)?);
        let mut bodies = Bodies::new(kinds, Arc::clone(&static_map), config.trail_length);
        bodies.insert_initial(&header.initial_bodies)?;

        let mut stats = StatLedger::new();
        let current_round = Round::new_initial(
            CurrentMap::new(Arc::clone(&static_map)),
            bodies,
            &mut stats,
            config.stat_budget_micros,
        )?;

        debug!(
            "Match on {} ({}x{}) with {} initial bodies",
            static_map.name,
            static_map.width,
            static_map.height,
            header.initial_bodies.len()
        );

        Ok(Self {
            config,
            static_map,
            max_round: 1,
            current_round,
            deltas: Vec::new(),
            snapshots: Vec::new(),
            stats,
            winner: None,
            win_type: None,
            footer_received: false,
            stream_complete: false,
            timeline_markers: Vec::new(),
            profiler_files: Vec::new(),
            simulation_step: 0.0,
            mode: PlaybackMode::PerRound,
        })
    }

    // -------------------------------------------------------------------------
    // Ingestion
    // -------------------------------------------------------------------------

    /// Append the next round delta.
    ///
    /// The first delta also starts round 1 and captures its snapshot.
    pub fn add_new_round(&mut self, delta: RoundDelta) -> ReplayResult<()> {
        let expected = self.deltas.len() as u32 + 1;
        if delta.round_id != expected {
            return Err(ReplayError::RoundMismatch { expected, got: delta.round_id });
        }
        let delta = Arc::new(delta);

        if self.current_round.round_number() == 0 {
            self.current_round.start_apply_new_round(Some(Arc::clone(&delta)), &mut self.stats)?;
            self.snapshots.push(self.current_round.copy());
            debug!("Captured snapshot for round 1");
        }

        self.deltas.push(delta);
        self.max_round += 1;
        Ok(())
    }

    /// Attach the match footer: winner, win type and post-match artifacts.
    pub fn add_match_footer(&mut self, footer: &MatchFooter) -> ReplayResult<()> {
        if self.footer_received {
            return Err(ReplayError::DuplicateEvent("MatchFooter"));
        }
        if !PLAYER_TEAMS.contains(&footer.winner) {
            return Err(ReplayError::UnknownTeam(footer.winner));
        }

        let mut files = Vec::with_capacity(footer.profiler_files.len());
        for record in &footer.profiler_files {
            files.push(ProfilerFile::from_record(record)?);
        }

        self.winner = Some(footer.winner);
        self.win_type = Some(footer.win_type);
        self.timeline_markers.extend(footer.timeline_markers.iter().map(|m| TimelineMarker {
            round: m.round + 1,
            team: m.team,
            color_hex: m.color_hex,
            label: m.label.clone().unwrap_or_else(|| "Unknown".to_string()),
        }));
        self.profiler_files.extend(files);
        self.footer_received = true;
        Ok(())
    }

    /// Declare that no more rounds will arrive, lifting the streaming margin.
    pub fn mark_stream_complete(&mut self) {
        self.stream_complete = true;
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Whether every round has been received.
    pub fn is_complete(&self) -> bool {
        self.footer_received || self.stream_complete
    }

    /// Round on display.
    pub fn current_round(&self) -> &Round {
        &self.current_round
    }

    /// Highest round number reachable with the data received so far.
    pub fn max_round(&self) -> u32 {
        self.max_round
    }

    /// Shared static map.
    pub fn static_map(&self) -> &Arc<StaticMap> {
        &self.static_map
    }

    /// Active configuration.
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Number of deltas received.
    pub fn rounds_received(&self) -> usize {
        self.deltas.len()
    }

    /// Round numbers of the stored snapshots.
    pub fn snapshot_rounds(&self) -> Vec<u32> {
        self.snapshots.iter().map(Round::round_number).collect()
    }

    /// Stat of the round on display.
    pub fn current_stat(&self) -> Option<&RoundStat> {
        self.current_round.stat(&self.stats)
    }

    /// Stat of any computed round.
    pub fn stat(&self, round: u32) -> Option<&RoundStat> {
        self.stats.get(round)
    }

    /// Winning team, once the footer arrived.
    pub fn winner(&self) -> Option<TeamId> {
        self.winner
    }

    /// How the match was won, once the footer arrived.
    pub fn win_type(&self) -> Option<WinType> {
        self.win_type
    }

    /// Timeline annotations from the footer.
    pub fn timeline_markers(&self) -> &[TimelineMarker] {
        &self.timeline_markers
    }

    /// Parsed profiler files from the footer.
    pub fn profiler_files(&self) -> &[ProfilerFile] {
        &self.profiler_files
    }

    /// Fingerprint of the round on display.
    pub fn fingerprint(&self) -> ReplayResult<StateHash> {
        self.current_round.fingerprint(&self.stats)
    }

    // -------------------------------------------------------------------------
    // Round seeking
    // -------------------------------------------------------------------------

    /// Show round `target`, clamped to the rounds that may be displayed.
    pub fn jump_to_round(&mut self, target: u32) -> ReplayResult<()> {
        if self.snapshots.is_empty() {
            return Err(ReplayError::NoSnapshot);
        }

        self.round_simulation()?;

        let margin = if self.is_complete() { 0 } else { self.config.streaming_margin };
        let allowed = self.max_round.saturating_sub(margin);
        let clamped = target.min(allowed).max(1);
        if clamped < target {
            warn!("Seek to round {} clamped to {} (max {})", target, clamped, self.max_round);
        }
        let from = self.current_round.round_number();
        if clamped == from {
            return Ok(());
        }

        let index = self.config.snapshot_index(clamped).min(self.snapshots.len() - 1);
        let snapshot = &self.snapshots[index];
        let snapshot_round = snapshot.round_number();
        debug!("Seek {} -> {} from snapshot at round {}", from, clamped, snapshot_round);

        if !(snapshot_round <= from && from <= clamped) {
            self.current_round = snapshot.copy();
        }

        let round = &mut self.current_round;
        round.set_transient(true);
        while round.round_number() < clamped {
            round.jump_to_turn(round.turns_len())?;
            let next = self.deltas.get(round.round_number() as usize).cloned();
            round.start_apply_new_round(next, &mut self.stats)?;

            let number = round.round_number();
            let last = self.snapshots.last().map_or(0, Round::round_number);
            if self.config.is_snapshot_round(number) && number > last {
                self.snapshots.push(round.copy());
                debug!("Captured snapshot for round {}", number);
            }
        }
        round.set_transient(false);
        Ok(())
    }

    /// Move `delta` rounds forward (or back when negative).
    pub fn step_round(&mut self, delta: i64) -> ReplayResult<()> {
        let target = (self.current_round.round_number() as i64 + delta).max(0);
        self.jump_to_round(target.min(u32::MAX as i64) as u32)
    }

    /// Show the first round.
    pub fn jump_to_start(&mut self) -> ReplayResult<()> {
        self.jump_to_round(1)
    }

    /// Show the last displayable round.
    pub fn jump_to_end(&mut self) -> ReplayResult<()> {
        self.jump_to_round(self.max_round)
    }

    // -------------------------------------------------------------------------
    // Turn seeking
    // -------------------------------------------------------------------------

    /// Move `turns` turns, wrapping into the neighbouring round at either end.
    pub fn step_turn(&mut self, turns: i64) -> ReplayResult<()> {
        let round = self.current_round.round_number();
        let mut target = self.current_round.turn_number() as i64 + turns;

        if round == self.max_round && turns > 0 {
            target = target.min(self.current_round.turns_len() as i64);
        } else if round == 1 && turns < 0 {
            target = target.max(0);
        } else if target < 0 {
            self.step_round(-1)?;
            target = self.current_round.turns_len() as i64 - 1;
        } else if target >= self.current_round.turns_len() as i64 {
            self.step_round(1)?;
            target = 0;
        }

        self.jump_to_turn(target.max(0) as u32)
    }

    /// Show the round on display after `turn` turns.
    pub fn jump_to_turn(&mut self, turn: u32) -> ReplayResult<()> {
        self.round_simulation()?;
        self.current_round.jump_to_turn(turn)
    }

    /// Show the round on display just after `robot_id`'s turn, if it has one.
    pub fn jump_to_robot_turn(&mut self, robot_id: BodyId) -> ReplayResult<()> {
        self.round_simulation()?;
        self.current_round.jump_to_robot_turn(robot_id)
    }

    /// Round number at normalized progress `p` through the match.
    pub fn progress_to_round_number(&self, progress: f64) -> u32 {
        (progress * self.max_round.saturating_sub(1) as f64).floor() as u32 + 1
    }

    /// Turn number at normalized progress `p` through the current round.
    pub fn progress_to_turn_number(&self, progress: f64) -> u32 {
        (progress * self.current_round.turns_len() as f64).floor() as u32
    }

    // -------------------------------------------------------------------------
    // Real-time playback
    // -------------------------------------------------------------------------

    /// Current playback mode.
    pub fn playback_mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Switch playback mode. Progress resets to the start of the round.
    pub fn set_playback_mode(&mut self, mode: PlaybackMode) -> ReplayResult<()> {
        self.mode = mode;
        self.simulation_step = 0.0;
        self.current_round.jump_to_turn(0)
    }

    /// Progress through the displayed round in `[0, 1]`; always 1 per turn.
    pub fn interpolation_factor(&self) -> f32 {
        if self.mode == PlaybackMode::PerTurn {
            return 1.0;
        }
        let max = self.config.max_simulation_steps as f64;
        (self.simulation_step.clamp(0.0, max) / max) as f32
    }

    /// Advance playback by `delta` rounds (or turns, per turn), negative to
    /// rewind. Callers scale `delta` by their playback rate.
    ///
    /// Returns `(round_stepped, turn_stepped)`.
    pub fn step_simulation_by_time(&mut self, delta: f64) -> ReplayResult<(bool, bool)> {
        let round_before = self.current_round.round_number();
        let turn_before = self.current_round.turn_number();
        let max = self.config.max_simulation_steps as f64;

        self.simulation_step += delta * max;

        match self.mode {
            PlaybackMode::PerTurn => {
                let steps = (self.simulation_step / max).floor() as i64;
                if self.simulation_step >= max {
                    self.step_turn(steps)?;
                    self.simulation_step = 0.0;
                } else if self.simulation_step < 0.0 {
                    self.step_turn(steps)?;
                    self.simulation_step = max - 1.0;
                }
            }
            PlaybackMode::PerRound => {
                // Apply every turn so bodies interpolate toward the round's end.
                let turns = self.current_round.turns_len();
                self.current_round.jump_to_turn(turns)?;
                self.update_simulation_rounds(delta)?;
            }
        }

        let round_stepped = round_before != self.current_round.round_number();
        let turn_stepped = round_stepped || turn_before != self.current_round.turn_number();
        Ok((round_stepped, turn_stepped))
    }

    fn update_simulation_rounds(&mut self, delta: f64) -> ReplayResult<()> {
        let max = self.config.max_simulation_steps as f64;
        let rounds = (self.simulation_step / max).floor() as i64;
        let round = self.current_round.round_number();

        if round == self.max_round && delta > 0.0 {
            self.simulation_step = self.simulation_step.min(max);
        } else if round == 1 && delta < 0.0 {
            self.simulation_step = self.simulation_step.max(0.0);
        } else if self.simulation_step < 0.0 {
            self.step_round(rounds)?;
            let turns = self.current_round.turns_len();
            self.current_round.jump_to_turn(turns)?;
            self.simulation_step = max - 1.0;
        } else if self.simulation_step >= max {
            self.step_round(rounds)?;
        }
        Ok(())
    }

    /// Drop partial simulation progress. Per round, turns applied only for
    /// interpolation are rolled back.
    fn round_simulation(&mut self) -> ReplayResult<()> {
        if self.mode == PlaybackMode::PerRound {
            self.current_round.jump_to_turn(0)?;
        }
        self.simulation_step = 0.0;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Frame parameters for the round on display.
    pub fn render_context(&self) -> RenderContext {
        RenderContext {
            interpolation: self.interpolation_factor(),
            round: self.current_round.round_number(),
            ..RenderContext::default()
        }
    }

    /// Draw the round on display.
    pub fn draw(&mut self, ctx: &RenderContext, surface: &mut dyn Surface) {
        self.current_round.draw(ctx, surface);
    }

    /// Log the current position and fingerprint.
    pub fn log_position(&self) -> ReplayResult<()> {
        let hash = self.fingerprint()?;
        let map = self.current_round.map();
        debug!(
            "Round {} turn {}/{} fingerprint {} ({} dirt, {} cheese on the floor)",
            self.current_round.round_number(),
            self.current_round.turn_number(),
            self.current_round.turns_len(),
            short_hex(&hash),
            map.dirt_count(),
            map.total_cheese()
        );
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ProfileRecord, ProfilerEventRecord, TimelineMarkerRecord};
    use crate::testkit::{synthetic_match, SyntheticOptions};

    fn streamed(rounds: u32) -> Match {
        synthetic_match(&SyntheticOptions { rounds, ..Default::default() }).unwrap()
    }

    fn complete(rounds: u32) -> Match {
        let mut game_match = streamed(rounds);
        game_match.mark_stream_complete();
        game_match
    }

    #[test]
    fn test_empty_match_has_no_snapshot() {
        let mut game_match = synthetic_match(&SyntheticOptions { rounds: 0, ..Default::default() }).unwrap();
        assert_eq!(game_match.max_round(), 1);
        assert_eq!(game_match.jump_to_round(1), Err(ReplayError::NoSnapshot));
    }

    #[test]
    fn test_first_round_starts_immediately() {
        let game_match = streamed(1);
        assert_eq!(game_match.current_round().round_number(), 1);
        assert_eq!(game_match.snapshot_rounds(), vec![1]);
        assert_eq!(game_match.max_round(), 2);
    }

    #[test]
    fn test_rejects_out_of_order_delta() {
        let mut game_match = streamed(3);
        let result = game_match.add_new_round(RoundDelta { round_id: 7, ..Default::default() });
        assert_eq!(result, Err(ReplayError::RoundMismatch { expected: 4, got: 7 }));
    }

    #[test]
    fn test_streaming_margin_clamps() {
        let mut game_match = streamed(10);
        game_match.jump_to_round(100).unwrap();
        assert_eq!(game_match.current_round().round_number(), 9);

        game_match.mark_stream_complete();
        game_match.jump_to_end().unwrap();
        assert_eq!(game_match.current_round().round_number(), 11);
        assert!(game_match.current_round().is_end(game_match.max_round()));
        assert_eq!(game_match.current_round().turns_len(), 0);

        game_match.jump_to_round(0).unwrap();
        assert_eq!(game_match.current_round().round_number(), 1);
    }

    #[test]
    fn test_snapshots_follow_stride() {
        let mut game_match = complete(130);
        game_match.jump_to_end().unwrap();
        assert_eq!(game_match.snapshot_rounds(), vec![1, 41, 81, 121]);

        // Revisiting does not duplicate snapshots.
        game_match.jump_to_start().unwrap();
        game_match.jump_to_round(125).unwrap();
        assert_eq!(game_match.snapshot_rounds(), vec![1, 41, 81, 121]);
    }

    #[test]
    fn test_zero_divisors_are_clamped() {
        let config = PlaybackConfig { snapshot_every: 0, max_simulation_steps: 0, ..Default::default() };
        let options = SyntheticOptions { rounds: 6, config, ..Default::default() };
        let mut game_match = synthetic_match(&options).unwrap();
        game_match.mark_stream_complete();
        assert_eq!(game_match.config().snapshot_every, 1);

        game_match.jump_to_round(3).unwrap();
        let stepped = game_match.fingerprint().unwrap();
        game_match.jump_to_end().unwrap();
        game_match.jump_to_round(3).unwrap();
        assert_eq!(game_match.fingerprint().unwrap(), stepped);
        assert_eq!(game_match.snapshot_rounds(), vec![1, 2, 3, 4, 5, 6, 7]);

        game_match.step_simulation_by_time(0.5).unwrap();
        assert!(game_match.interpolation_factor().is_finite());
    }

    #[test]
    fn test_seek_is_path_independent() {
        let mut direct = complete(90);
        direct.jump_to_round(77).unwrap();
        let expected = direct.fingerprint().unwrap();

        let mut wandering = complete(90);
        for target in [50, 3, 88, 41, 77, 12, 77] {
            wandering.jump_to_round(target).unwrap();
        }
        assert_eq!(wandering.fingerprint().unwrap(), expected);
    }

    #[test]
    fn test_step_turn_wraps_rounds() {
        let mut game_match = complete(5);
        game_match.set_playback_mode(PlaybackMode::PerTurn).unwrap();
        game_match.jump_to_round(2).unwrap();
        let turns = game_match.current_round().turns_len();
        assert!(turns > 0);

        game_match.step_turn(turns as i64).unwrap();
        assert_eq!(game_match.current_round().round_number(), 3);
        assert_eq!(game_match.current_round().turn_number(), 0);

        game_match.step_turn(-1).unwrap();
        assert_eq!(game_match.current_round().round_number(), 2);
        assert_eq!(game_match.current_round().turn_number(), turns - 1);
    }

    #[test]
    fn test_step_turn_stops_at_match_edges() {
        let mut game_match = complete(3);
        game_match.set_playback_mode(PlaybackMode::PerTurn).unwrap();
        game_match.jump_to_start().unwrap();
        game_match.step_turn(-5).unwrap();
        assert_eq!(game_match.current_round().round_number(), 1);
        assert_eq!(game_match.current_round().turn_number(), 0);

        game_match.jump_to_end().unwrap();
        game_match.step_turn(3).unwrap();
        assert_eq!(game_match.current_round().round_number(), 4);
    }

    #[test]
    fn test_per_round_playback_advances_rounds() {
        let mut game_match = complete(6);
        game_match.jump_to_start().unwrap();

        let (round_stepped, _) = game_match.step_simulation_by_time(0.5).unwrap();
        assert!(!round_stepped);
        assert!((game_match.interpolation_factor() - 0.5).abs() < 1e-6);
        let round = game_match.current_round();
        assert_eq!(round.turn_number(), round.turns_len());

        let (round_stepped, turn_stepped) = game_match.step_simulation_by_time(0.6).unwrap();
        assert!(round_stepped && turn_stepped);
        assert_eq!(game_match.current_round().round_number(), 2);

        game_match.step_simulation_by_time(-0.1).unwrap();
        assert_eq!(game_match.current_round().round_number(), 1);
        let round = game_match.current_round();
        assert_eq!(round.turn_number(), round.turns_len());
    }

    #[test]
    fn test_per_turn_playback_steps_turns() {
        let mut game_match = complete(4);
        game_match.jump_to_round(2).unwrap();
        game_match.set_playback_mode(PlaybackMode::PerTurn).unwrap();
        assert_eq!(game_match.interpolation_factor(), 1.0);

        let (_, turn_stepped) = game_match.step_simulation_by_time(1.0).unwrap();
        assert!(turn_stepped);
        assert_eq!(game_match.current_round().turn_number(), 1);
    }

    #[test]
    fn test_progress_helpers() {
        let mut game_match = complete(10);
        assert_eq!(game_match.progress_to_round_number(0.0), 1);
        assert_eq!(game_match.progress_to_round_number(1.0), 11);
        assert_eq!(game_match.progress_to_round_number(0.5), 6);

        game_match.jump_to_round(3).unwrap();
        let turns = game_match.current_round().turns_len();
        assert_eq!(game_match.progress_to_turn_number(1.0), turns);
    }

    #[test]
    fn test_footer_parsing() {
        let mut game_match = streamed(2);
        let footer = MatchFooter {
            winner: 2,
            win_type: WinType::MostCheese,
            total_rounds: 2,
            profiler_files: vec![ProfilerFileRecord {
                frames: vec!["main".into(), "move".into()],
                profiles: vec![
                    ProfileRecord {
                        name: "#12".into(),
                        events: vec![
                            ProfilerEventRecord { is_open: true, at: 5, frame: 0 },
                            ProfilerEventRecord { is_open: false, at: 9, frame: 0 },
                        ],
                    },
                    ProfileRecord { name: "#3".into(), events: vec![] },
                ],
            }],
            timeline_markers: vec![TimelineMarkerRecord { round: 4, team: 1, color_hex: 0xff00ff, label: None }],
        };
        game_match.add_match_footer(&footer).unwrap();

        assert!(game_match.is_complete());
        assert_eq!(game_match.winner(), Some(2));
        assert_eq!(game_match.win_type(), Some(WinType::MostCheese));

        let marker = &game_match.timeline_markers()[0];
        assert_eq!(marker.round, 5);
        assert_eq!(marker.label, "Unknown");

        let file = &game_match.profiler_files()[0];
        assert_eq!(file.profiles[0].id, 3);
        assert_eq!(file.profiles[1].id, 12);
        assert_eq!(file.profiles[1].start_value, 4);
        assert_eq!(file.profiles[1].end_value, 10);
        assert_eq!(file.profiles[1].events[0].kind, ProfilerEventKind::OpenFrame);

        assert_eq!(game_match.add_match_footer(&footer), Err(ReplayError::DuplicateEvent("MatchFooter")));
    }

    #[test]
    fn test_bad_profile_name() {
        let record = ProfilerFileRecord {
            frames: vec![],
            profiles: vec![ProfileRecord { name: "x".into(), events: vec![] }],
        };
        assert_eq!(ProfilerFile::from_record(&record), Err(ReplayError::BadProfileName("x".into())));
    }
}
