//! Entity Registry
//!
//! Owns every body alive (or dying) in one round, keyed by id.
//! Uses BTreeMap so iteration, drawing and hashing are deterministic.
//!
//! Bodies share their common fields in `Body`; kind-specific state lives in
//! the closed `BodyKind` sum type. Promotion swaps the variant in place and
//! keeps id, team and position.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use serde::Serialize;

use crate::core::vec2::{Direction, Vector};
use crate::schema::{
    BodyId, GameHeader, RobotKind, RobotKindMetadata, RoundDelta, SpawnRecord, TeamId, TurnRecord,
};
use super::error::{ReplayError, ReplayResult};
use super::map::StaticMap;
use super::render::{DrawCommand, RenderContext, Surface, VisualOverrides};

/// Render scale of a body while another body carries it.
pub const CARRIED_RENDER_SIZE: f32 = 0.6;

// =============================================================================
// KIND METADATA
// =============================================================================

/// Per-kind stats looked up at spawn and promotion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KindTable {
    kinds: BTreeMap<RobotKind, RobotKindMetadata>,
}

impl KindTable {
    /// Build from the game header.
    pub fn from_header(header: &GameHeader) -> Self {
        Self {
            kinds: header.robot_kinds.iter().map(|m| (m.kind, m.clone())).collect(),
        }
    }

    /// Stats for a kind.
    pub fn get(&self, kind: RobotKind) -> ReplayResult<&RobotKindMetadata> {
        self.kinds.get(&kind).ok_or(ReplayError::MissingKindMetadata(kind))
    }
}

impl Default for KindTable {
    fn default() -> Self {
        Self::from_header(&GameHeader::default())
    }
}

// =============================================================================
// BODY
// =============================================================================

/// Cat-only state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CatState {
    /// Turning handedness
    pub chirality: u8,
    /// Patrol route from the map
    pub waypoints: Vec<Vector>,
}

/// Kind tag plus kind-specific payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BodyKind {
    /// Baby rat
    Rat,
    /// Rat king
    RatKing,
    /// Neutral cat
    Cat(CatState),
}

impl BodyKind {
    /// Log-level kind tag.
    pub fn robot_kind(&self) -> RobotKind {
        match self {
            BodyKind::Rat => RobotKind::Rat,
            BodyKind::RatKing => RobotKind::RatKing,
            BodyKind::Cat(_) => RobotKind::Cat,
        }
    }
}

/// Labeled point drawn for debugging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndicatorDot {
    /// Cell
    pub loc: Vector,
    /// RGB color
    pub color: u32,
}

/// Labeled segment drawn for debugging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndicatorLine {
    /// Start cell
    pub start: Vector,
    /// End cell
    pub end: Vector,
    /// RGB color
    pub color: u32,
}

/// Debug annotations set by bot code; cleared when the body next acts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Indicators {
    /// Dots
    pub dots: Vec<IndicatorDot>,
    /// Lines
    pub lines: Vec<IndicatorLine>,
    /// Free text
    pub string: String,
}

impl Indicators {
    /// Whether nothing is set.
    pub fn is_empty(&self) -> bool {
        self.dots.is_empty() && self.lines.is_empty() && self.string.is_empty()
    }
}

/// One entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Body {
    /// Unique id
    pub id: BodyId,
    /// Owning team (0 = neutral)
    pub team: TeamId,
    /// Kind and kind-specific state
    pub kind: BodyKind,
    /// Anchor cell
    pub pos: Vector,
    /// Anchor cell at the end of the previous round
    pub last_pos: Vector,
    /// Facing
    pub direction: Direction,
    /// Health, floored at 0
    pub hp: u32,
    /// Health at spawn
    pub max_hp: u32,
    /// Movement cooldown
    pub move_cooldown: u32,
    /// Action cooldown
    pub action_cooldown: u32,
    /// Turning cooldown
    pub turning_cooldown: u32,
    /// Bytecodes spent on the last turn
    pub bytecodes_used: u32,
    /// Cheese carried
    pub cheese: u32,
    /// Died this round, removed at the next round start
    pub dead: bool,
    /// Body carrying this one
    pub carried_by: Option<BodyId>,
    /// Body this one carries
    pub carrying: Option<BodyId>,
    /// Recent positions, oldest first
    pub trail: VecDeque<Vector>,
    /// Debug annotations
    pub indicators: Indicators,
}

impl Body {
    fn new(record: &SpawnRecord, kind: BodyKind, meta: &RobotKindMetadata) -> Self {
        let mut body = Self {
            id: record.id,
            team: record.team,
            kind,
            pos: record.pos,
            last_pos: record.pos,
            direction: record.dir,
            hp: 0,
            max_hp: 0,
            move_cooldown: 0,
            action_cooldown: 0,
            turning_cooldown: 0,
            bytecodes_used: 0,
            cheese: 0,
            dead: false,
            carried_by: None,
            carrying: None,
            trail: VecDeque::new(),
            indicators: Indicators::default(),
        };
        body.populate_defaults(meta);
        body
    }

    fn populate_defaults(&mut self, meta: &RobotKindMetadata) {
        self.max_hp = meta.base_health;
        self.hp = self.max_hp;
        self.move_cooldown = meta.movement_cooldown;
        self.action_cooldown = meta.action_cooldown;
        self.turning_cooldown = meta.turning_cooldown;
    }

    /// Log-level kind tag.
    #[inline]
    pub fn robot_kind(&self) -> RobotKind {
        self.kind.robot_kind()
    }

    /// Whether another body is carrying this one.
    #[inline]
    pub fn is_carried(&self) -> bool {
        self.carried_by.is_some()
    }

    /// Whether the body's footprint covers `cell`.
    ///
    /// Carried bodies occupy no cells.
    pub fn occupies(&self, cell: Vector) -> bool {
        if self.is_carried() {
            return false;
        }
        let d = cell - self.pos;
        match self.kind {
            BodyKind::Rat => d == Vector::ZERO,
            BodyKind::RatKing => d.x.abs() <= 1 && d.y.abs() <= 1,
            BodyKind::Cat(_) => (0..=1).contains(&d.x) && (0..=1).contains(&d.y),
        }
    }

    /// Every cell in the footprint.
    pub fn footprint(&self) -> Vec<Vector> {
        if self.is_carried() {
            return Vec::new();
        }
        let (lo, hi) = match self.kind {
            BodyKind::Rat => (0, 0),
            BodyKind::RatKing => (-1, 1),
            BodyKind::Cat(_) => (0, 1),
        };
        let mut cells = Vec::with_capacity(9);
        for dy in lo..=hi {
            for dx in lo..=hi {
                cells.push(self.pos + Vector::new(dx, dy));
            }
        }
        cells
    }

    /// Render scale in cells.
    pub fn render_size(&self) -> f32 {
        if self.is_carried() {
            CARRIED_RENDER_SIZE
        } else {
            self.robot_kind().size() as f32
        }
    }

    /// Position between last round's cell and the current one.
    pub fn interpolated_position(&self, t: f32) -> (f32, f32) {
        super::render::lerp_cells(self.last_pos, self.pos, t)
    }

    fn push_trail(&mut self, pos: Vector, cap: usize) {
        self.trail.push_back(pos);
        while self.trail.len() > cap {
            self.trail.pop_front();
        }
    }

    /// Lines shown when hovering the body.
    pub fn hover_info(&self) -> Vec<String> {
        let mut info = vec![
            format!("{} (id {})", self.robot_kind().name(), self.id),
            format!("Team {}", self.team),
            format!("HP: {}/{}", self.hp, self.max_hp),
            format!("Location: {}", self.pos),
            format!("Direction: {}", self.direction.name()),
            format!("Move Cooldown: {}", self.move_cooldown),
            format!("Action Cooldown: {}", self.action_cooldown),
            format!("Turning Cooldown: {}", self.turning_cooldown),
            format!("Bytecodes Used: {}", self.bytecodes_used),
        ];
        if self.cheese > 0 {
            info.push(format!("Cheese: {}", self.cheese));
        }
        if let Some(carrier) = self.carried_by {
            info.push(format!("Carried by: {}", carrier));
        }
        if let Some(carried) = self.carrying {
            info.push(format!("Carrying: {}", carried));
        }
        if self.dead {
            info.push("Dead".to_string());
        }
        if !self.indicators.string.is_empty() {
            info.push(self.indicators.string.clone());
        }
        info
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// All bodies of one round.
///
/// `Clone` deep-copies every body, trails included.
#[derive(Clone, Debug)]
pub struct Bodies {
    bodies: BTreeMap<BodyId, Body>,
    kinds: Arc<KindTable>,
    static_map: Arc<StaticMap>,
    trail_length: usize,
}

impl Bodies {
    /// Empty registry.
    pub fn new(kinds: Arc<KindTable>, static_map: Arc<StaticMap>, trail_length: usize) -> Self {
        Self {
            bodies: BTreeMap::new(),
            kinds,
            static_map,
            trail_length,
        }
    }

    /// Spawn the bodies listed in the match header.
    pub fn insert_initial(&mut self, records: &[SpawnRecord]) -> ReplayResult<()> {
        for record in records {
            self.spawn(record)?;
        }
        Ok(())
    }

    /// Spawn a body. Fails if the id is already taken.
    pub fn spawn(&mut self, record: &SpawnRecord) -> ReplayResult<&Body> {
        if self.bodies.contains_key(&record.id) {
            return Err(ReplayError::DuplicateBody(record.id));
        }
        let meta = self.kinds.get(record.kind)?;
        let kind = match record.kind {
            RobotKind::Rat => BodyKind::Rat,
            RobotKind::RatKing => BodyKind::RatKing,
            RobotKind::Cat => BodyKind::Cat(CatState {
                chirality: record.chirality,
                waypoints: self.static_map.cat_waypoints(record.id).map(<[_]>::to_vec).unwrap_or_default(),
            }),
        };
        let body = Body::new(record, kind, meta);
        let inserted = self.bodies.entry(record.id).or_insert(body);
        Ok(&*inserted)
    }

    /// Delete a body outright, without the death grace period.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        self.bodies.remove(&id)
    }

    /// Mark a body dead. It stays queryable until `clear_died_bodies`.
    pub fn mark_dead(&mut self, id: BodyId) -> ReplayResult<()> {
        let body = self.get_mut(id)?;
        body.dead = true;
        body.hp = 0;
        Ok(())
    }

    /// Delete every dead body. Returns how many were removed.
    ///
    /// Carry links pointing at a removed body are dropped with it.
    pub fn clear_died_bodies(&mut self) -> usize {
        let before = self.bodies.len();
        self.bodies.retain(|_, body| !body.dead);
        let removed = before - self.bodies.len();

        if removed > 0 {
            let live: Vec<BodyId> = self.bodies.keys().copied().collect();
            for body in self.bodies.values_mut() {
                if body.carried_by.is_some_and(|c| live.binary_search(&c).is_err()) {
                    body.carried_by = None;
                }
                if body.carrying.is_some_and(|c| live.binary_search(&c).is_err()) {
                    body.carrying = None;
                }
            }
        }
        removed
    }

    /// Overwrite the acting body's state from its turn record.
    pub fn apply_turn_delta(&mut self, turn: &TurnRecord) -> ReplayResult<()> {
        let cap = self.trail_length;
        let body = self.get_mut(turn.robot_id)?;

        let previous = body.pos;
        body.push_trail(previous, cap);

        body.pos = turn.pos;
        body.direction = turn.dir;
        body.hp = turn.health.max(0) as u32;
        body.move_cooldown = turn.move_cooldown;
        body.action_cooldown = turn.action_cooldown;
        body.turning_cooldown = turn.turning_cooldown;
        body.bytecodes_used = turn.bytecodes_used;
        if let Some(cheese) = turn.cheese {
            body.cheese = cheese;
        }
        Ok(())
    }

    /// Round-end bookkeeping: unattributed deaths and interpolation anchors.
    pub fn process_round_end(&mut self, delta: Option<&RoundDelta>) -> ReplayResult<()> {
        if let Some(delta) = delta {
            for id in &delta.died_ids {
                self.mark_dead(*id)?;
            }
        }
        for body in self.bodies.values_mut() {
            body.last_pos = body.pos;
        }
        Ok(())
    }

    /// Drop a body's indicators. Unknown ids are ignored (not yet spawned).
    pub fn clear_indicators(&mut self, id: BodyId) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.indicators = Indicators::default();
        }
    }

    /// Promote a rat in place.
    ///
    /// Only baby rats can become kings; the new kind's default stats apply.
    pub fn promote(&mut self, id: BodyId, kind: RobotKind) -> ReplayResult<()> {
        let kinds = Arc::clone(&self.kinds);
        let body = self.get_mut(id)?;
        if kind != RobotKind::RatKing || body.robot_kind() != RobotKind::Rat {
            return Err(ReplayError::NotPromotable(id));
        }
        body.kind = BodyKind::RatKing;
        body.populate_defaults(kinds.get(kind)?);
        Ok(())
    }

    /// Link `target` onto `carrier`, or drop it if it is already carried.
    ///
    /// Returns `true` when the target was picked up.
    pub fn toggle_carry(&mut self, carrier: BodyId, target: BodyId) -> ReplayResult<bool> {
        let current = self.get(target)?.carried_by;
        self.get(carrier)?;

        if current.is_some() {
            self.release(target)?;
            return Ok(false);
        }

        let carrier_body = self.get_mut(carrier)?;
        carrier_body.carrying = Some(target);
        let target_body = self.get_mut(target)?;
        target_body.carried_by = Some(carrier);
        target_body.carrying = None;
        target_body.last_pos = target_body.pos;
        Ok(true)
    }

    /// Break `target`'s carry link, if any.
    pub fn release(&mut self, target: BodyId) -> ReplayResult<()> {
        let body = self.get_mut(target)?;
        if let Some(carrier) = body.carried_by.take() {
            if let Some(carrier_body) = self.bodies.get_mut(&carrier) {
                carrier_body.carrying = None;
            }
        }
        Ok(())
    }

    /// Body by id.
    pub fn get(&self, id: BodyId) -> ReplayResult<&Body> {
        self.bodies.get(&id).ok_or(ReplayError::UnknownBody(id))
    }

    /// Mutable body by id.
    pub fn get_mut(&mut self, id: BodyId) -> ReplayResult<&mut Body> {
        self.bodies.get_mut(&id).ok_or(ReplayError::UnknownBody(id))
    }

    /// Whether a body exists (alive or awaiting cleanup).
    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    /// Bodies in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    /// Number of bodies, dead ones included.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Next free id (`max + 1`), for hand-built matches.
    pub fn next_id(&self) -> BodyId {
        self.bodies.keys().next_back().map_or(1, |max| max + 1)
    }

    /// The body occupying `cell`, optionally restricted to one team.
    ///
    /// Live bodies win over dead ones; a dead body is returned only when
    /// nothing alive covers the cell.
    pub fn get_at_location(&self, cell: Vector, team: Option<TeamId>) -> Option<&Body> {
        let mut dead_match = None;
        for body in self.bodies.values() {
            if team.is_some_and(|t| t != body.team) || !body.occupies(cell) {
                continue;
            }
            if !body.dead {
                return Some(body);
            }
            dead_match.get_or_insert(body);
        }
        dead_match
    }

    /// Encoded body state for fingerprinting.
    pub(crate) fn encode(&self) -> ReplayResult<Vec<u8>> {
        Ok(bincode::serialize(&self.bodies)?)
    }

    /// Submit body sprites, trails and indicators.
    pub fn draw(&self, ctx: &RenderContext, overrides: &VisualOverrides, surface: &mut dyn Surface) {
        for body in self.bodies.values() {
            let visual = overrides.get(body.id);
            let at = visual
                .and_then(|v| v.position)
                .unwrap_or_else(|| body.interpolated_position(ctx.interpolation));

            if ctx.show_trails || ctx.selected == Some(body.id) {
                let mut points: Vec<Vector> = body.trail.iter().copied().collect();
                points.push(body.pos);
                for pair in points.windows(2) {
                    surface.submit(DrawCommand::Line {
                        from: super::render::cell_pos(pair[0]),
                        to: super::render::cell_pos(pair[1]),
                        color: 0xffffff,
                        width: 0.05,
                    });
                }
            }

            surface.submit(DrawCommand::Body {
                id: body.id,
                kind: body.robot_kind(),
                team: body.team,
                at,
                size: body.render_size(),
                texture: visual.map(|v| v.texture),
                dead: body.dead,
            });

            if ctx.show_indicators {
                for dot in &body.indicators.dots {
                    surface.submit(DrawCommand::Dot {
                        at: super::render::cell_pos(dot.loc),
                        color: dot.color,
                        radius: 0.2,
                    });
                }
                for line in &body.indicators.lines {
                    surface.submit(DrawCommand::Line {
                        from: super::render::cell_pos(line.start),
                        to: super::render::cell_pos(line.end),
                        color: line.color,
                        width: 0.1,
                    });
                }
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
