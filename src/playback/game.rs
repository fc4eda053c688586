//! Game Container
//!
//! A game is a series of matches between the same two teams. Events arrive
//! in log order; `ingest` routes each to the right match.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::schema::{Event, GameHeader, TeamData, TeamId, NEUTRAL_TEAM};
use super::bodies::KindTable;
use super::config::PlaybackConfig;
use super::error::{ReplayError, ReplayResult};
use super::game_match::Match;

/// Log format version this crate reads.
pub const SPEC_VERSION: &str = "1";

/// A participating team.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Team {
    /// 0 = neutral, 1 and 2 = players
    pub id: TeamId,
    /// Display name
    pub name: String,
    /// Bot package name
    pub package_name: String,
    /// Colour name used by viewers
    pub color_name: &'static str,
}

impl Team {
    fn from_data(data: &TeamData) -> Self {
        Self {
            id: data.team_id,
            name: data.name.clone(),
            package_name: data.package_name.clone(),
            color_name: color_name(data.team_id),
        }
    }

    /// The synthetic neutral team.
    pub fn neutral() -> Self {
        Self {
            id: NEUTRAL_TEAM,
            name: "Neutral".to_string(),
            package_name: "neutral".to_string(),
            color_name: color_name(NEUTRAL_TEAM),
        }
    }
}

fn color_name(team: TeamId) -> &'static str {
    match team {
        1 => "Silver",
        2 => "Gold",
        _ => "Neutral",
    }
}

/// A game: teams, metadata and every match received so far.
#[derive(Debug)]
pub struct Game {
    config: PlaybackConfig,
    teams: BTreeMap<TeamId, Team>,
    kinds: Option<Arc<KindTable>>,
    matches: Vec<Match>,
    current_match: Option<usize>,
    winner: Option<TeamId>,
}

impl Game {
    /// Empty game waiting for its header.
    pub fn new(config: PlaybackConfig) -> Self {
        let mut teams = BTreeMap::new();
        teams.insert(NEUTRAL_TEAM, Team::neutral());
        Self {
            config,
            teams,
            kinds: None,
            matches: Vec::new(),
            current_match: None,
            winner: None,
        }
    }

    /// Build a game from a complete or partial event stream.
    pub fn from_events<I>(events: I, config: PlaybackConfig) -> ReplayResult<Self>
    where
        I: IntoIterator<Item = Event>,
    {
        let mut game = Self::new(config);
        for event in events {
            game.ingest(event)?;
        }
        Ok(game)
    }

    /// Route one event.
    pub fn ingest(&mut self, event: Event) -> ReplayResult<()> {
        match event {
            Event::GameHeader(header) => self.apply_header(&header),
            Event::MatchHeader(header) => {
                let kinds = self.kinds.clone().ok_or(ReplayError::MissingGameHeader)?;
                let game_match = Match::new(&header, kinds, self.config.clone())?;
                self.matches.push(game_match);
                self.current_match = Some(self.matches.len() - 1);
                debug!("Match {} started on {}", self.matches.len(), header.map.name);
                Ok(())
            }
            Event::Round(delta) => self.last_match_mut()?.add_new_round(delta),
            Event::MatchFooter(footer) => {
                self.team(footer.winner)?;
                let game_match = self.last_match_mut()?;
                game_match.add_match_footer(&footer)?;
                info!("Match won by team {} ({:?})", footer.winner, footer.win_type);
                Ok(())
            }
            Event::GameFooter(footer) => {
                if self.winner.is_some() {
                    return Err(ReplayError::DuplicateEvent("GameFooter"));
                }
                self.team(footer.winner)?;
                self.winner = Some(footer.winner);
                for game_match in &mut self.matches {
                    game_match.mark_stream_complete();
                }
                info!("Game won by team {}", footer.winner);
                Ok(())
            }
        }
    }

    fn apply_header(&mut self, header: &GameHeader) -> ReplayResult<()> {
        if self.kinds.is_some() {
            return Err(ReplayError::DuplicateEvent("GameHeader"));
        }
        if header.spec_version != SPEC_VERSION {
            return Err(ReplayError::SpecVersion {
                expected: SPEC_VERSION.to_string(),
                got: header.spec_version.clone(),
            });
        }
        for data in &header.teams {
            self.teams.insert(data.team_id, Team::from_data(data));
        }
        for required in [1, 2] {
            if !self.teams.contains_key(&required) {
                return Err(ReplayError::UnknownTeam(required));
            }
        }
        self.kinds = Some(Arc::new(KindTable::from_header(header)));
        Ok(())
    }

    fn last_match_mut(&mut self) -> ReplayResult<&mut Match> {
        self.matches.last_mut().ok_or(ReplayError::NoActiveMatch)
    }

    /// Team by id; the neutral team always exists.
    pub fn team(&self, id: TeamId) -> ReplayResult<&Team> {
        self.teams.get(&id).ok_or(ReplayError::UnknownTeam(id))
    }

    /// Teams in id order, neutral first.
    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    /// Matches in log order.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Match selected for display.
    pub fn current_match(&self) -> Option<&Match> {
        self.current_match.and_then(|i| self.matches.get(i))
    }

    /// Mutable match selected for display.
    pub fn current_match_mut(&mut self) -> Option<&mut Match> {
        self.current_match.and_then(|i| self.matches.get_mut(i))
    }

    /// Select the match at `index` for display.
    pub fn select_match(&mut self, index: usize) -> ReplayResult<()> {
        if index >= self.matches.len() {
            return Err(ReplayError::NoActiveMatch);
        }
        self.current_match = Some(index);
        Ok(())
    }

    /// Overall winner, once the game footer arrived.
    pub fn winner(&self) -> Option<&Team> {
        self.winner.and_then(|id| self.teams.get(&id))
    }

    /// Whether the game footer arrived.
    pub fn is_complete(&self) -> bool {
        self.winner.is_some()
    }
}
