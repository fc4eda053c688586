//! Action Log
//!
//! Transient per-turn events. Each action mutates authoritative state once
//! (`apply`), may draw every frame while alive (`draw`) and runs `finish`
//! exactly once when its lifetime runs out.
//!
//! `draw` and `finish` only ever see `VisualOverrides` mutably; bodies and
//! map are borrowed shared, so rendering cannot alter replayed state.

use serde::Serialize;
use tracing::{trace, warn};

use crate::schema::{ActionRecord, BodyId, DieCause, RobotKind, SpawnRecord, TurnRecord};
use super::bodies::Bodies;
use super::error::ReplayResult;
use super::map::{CurrentMap, TrapKind};
use super::render::{
    cell_pos, pulse, DrawCommand, PounceFacing, RenderContext, RenderPos, Surface,
    TextureOverride, VisualOverride, VisualOverrides,
};

/// Rounds an action stays alive unless its kind says otherwise.
pub const DEFAULT_ACTION_LIFETIME: u32 = 1;

/// Height of the pounce arc, in cells.
const POUNCE_GRAVITY: f32 = -10.0;

/// One live action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Action {
    /// Body whose turn produced the action
    pub actor: BodyId,
    /// Kind and payload
    pub record: ActionRecord,
    /// Round boundaries left before `finish`
    pub remaining: u32,
}

impl Action {
    /// Wrap a decoded record.
    pub fn new(actor: BodyId, record: ActionRecord) -> Self {
        Self { actor, record, remaining: DEFAULT_ACTION_LIFETIME }
    }

    /// Apply the action's one-time effect to the round.
    pub fn apply(&self, map: &mut CurrentMap, bodies: &mut Bodies) -> ReplayResult<()> {
        trace!("Body {} applies {}", self.actor, self.record.tag());
        match &self.record {
            ActionRecord::CatFeed { .. }
            | ActionRecord::RatAttack { .. }
            | ActionRecord::RatCollision { .. }
            | ActionRecord::CatScratch { .. }
            | ActionRecord::RatSqueak
            | ActionRecord::Stun { .. } => {}

            ActionRecord::RatNap { target } => {
                bodies.toggle_carry(self.actor, *target)?;
            }
            ActionRecord::PlaceDirt { loc } => map.set_dirt(*loc, true)?,
            ActionRecord::BreakDirt { loc } => map.set_dirt(*loc, false)?,
            ActionRecord::CheesePickup { loc } => {
                bodies.get(self.actor)?;
                let amount = map.take_cheese(*loc)?;
                let body = bodies.get_mut(self.actor)?;
                body.cheese = body.cheese.saturating_add(amount);
            }
            ActionRecord::CheeseSpawn { loc, amount } => map.set_cheese(*loc, *amount)?,
            ActionRecord::CheeseTransfer { target, amount } => {
                bodies.get(*target)?;
                let source = bodies.get_mut(self.actor)?;
                // Gate on the source's balance before it is debited.
                let moved = source.cheese.min(*amount);
                source.cheese -= moved;
                let receiver = bodies.get_mut(*target)?;
                receiver.cheese = receiver.cheese.saturating_add(moved);
            }
            ActionRecord::CatPounce { start, end } => {
                trace!("Cat {} pounces {} -> {}", self.actor, start, end);
            }
            ActionRecord::PlaceTrap { loc, rat_trap } => {
                let team = bodies.get(self.actor)?.team;
                let kind = if *rat_trap { TrapKind::Rat } else { TrapKind::Cat };
                map.set_trap(*loc, kind, team)?;
            }
            ActionRecord::RemoveTrap { loc } | ActionRecord::TriggerTrap { loc } => {
                map.clear_traps(*loc)?;
            }
            ActionRecord::ThrowRat { target, .. } => bodies.release(*target)?,
            ActionRecord::UpgradeToRatKing => bodies.promote(self.actor, RobotKind::RatKing)?,
            ActionRecord::Damage { target, damage } => {
                let body = bodies.get_mut(*target)?;
                body.hp = body.hp.saturating_sub(*damage);
            }
            ActionRecord::Spawn { id, team, kind, pos, dir, chirality } => {
                bodies.spawn(&SpawnRecord {
                    id: *id,
                    team: *team,
                    kind: *kind,
                    pos: *pos,
                    dir: *dir,
                    chirality: *chirality,
                })?;
            }
            ActionRecord::Die { target, cause } => {
                if *cause == DieCause::Exception {
                    warn!("Body {} died due to an exception", target);
                }
                bodies.mark_dead(*target)?;
            }
            ActionRecord::IndicatorString { value } => {
                bodies.get_mut(self.actor)?.indicators.string = value.clone();
            }
            ActionRecord::IndicatorDot { loc, color } => {
                bodies.get_mut(self.actor)?.indicators.dots.push(super::bodies::IndicatorDot {
                    loc: *loc,
                    color: *color,
                });
            }
            ActionRecord::IndicatorLine { start, end, color } => {
                bodies.get_mut(self.actor)?.indicators.lines.push(super::bodies::IndicatorLine {
                    start: *start,
                    end: *end,
                    color: *color,
                });
            }
        }
        Ok(())
    }

    /// Per-frame rendering. Missing bodies are skipped.
    pub fn draw(
        &self,
        ctx: &RenderContext,
        bodies: &Bodies,
        overrides: &mut VisualOverrides,
        surface: &mut dyn Surface,
    ) {
        let t = ctx.interpolation;
        let at_actor = || bodies.get(self.actor).ok().map(|b| b.interpolated_position(t));

        match &self.record {
            ActionRecord::CatFeed { .. } => {
                overrides.set(self.actor, VisualOverride { texture: TextureOverride::CatFeed, position: None });
            }
            ActionRecord::CatScratch { loc } => {
                overrides.set(self.actor, VisualOverride { texture: TextureOverride::CatScratch, position: None });
                surface.submit(DrawCommand::Effect { name: "scratch", at: cell_pos(*loc), scale: 1.0, alpha: 1.0 - t });
            }
            ActionRecord::CatPounce { start, end } => {
                let x = start.x as f32 + t * (end.x - start.x) as f32;
                let y = POUNCE_GRAVITY * t * t + t * ((end.y - start.y) as f32 - POUNCE_GRAVITY) + start.y as f32;
                overrides.set(self.actor, VisualOverride {
                    texture: TextureOverride::CatPounce(PounceFacing::of(*start, *end)),
                    position: Some((x, y)),
                });
            }
            ActionRecord::RatAttack { target } => {
                let (Some(from), Ok(to)) = (at_actor(), bodies.get(*target)) else { return };
                let to = to.interpolated_position(t);
                let color = team_color(bodies, self.actor);
                surface.submit(DrawCommand::Line { from, to, color, width: 0.06 });
                surface.submit(DrawCommand::Line {
                    from: along(from, to, t),
                    to: along(from, to, (t + 0.2).min(1.0)),
                    color,
                    width: 0.06,
                });
            }
            ActionRecord::CheeseTransfer { target, .. } => {
                let (Some(from), Ok(to)) = (at_actor(), bodies.get(*target)) else { return };
                let to = to.interpolated_position(t);
                surface.submit(DrawCommand::Line { from, to, color: 0xf7df47, width: 0.06 });
                surface.submit(DrawCommand::Effect { name: "cheese", at: along(from, to, t), scale: 0.8, alpha: 1.0 });
            }
            ActionRecord::ThrowRat { target, loc } => {
                let Ok(body) = bodies.get(*target) else { return };
                let from = body.interpolated_position(t);
                surface.submit(DrawCommand::Line { from, to: cell_pos(*loc), color: 0xffffff, width: 0.04 });
            }
            ActionRecord::CheesePickup { .. } => {
                if let Some(at) = at_actor() {
                    let (scale, alpha) = pulse(t);
                    surface.submit(DrawCommand::Effect { name: "cheese", at, scale, alpha });
                }
            }
            ActionRecord::PlaceTrap { loc, rat_trap } => {
                let (scale, alpha) = pulse(t);
                let name = if *rat_trap { "rat_trap" } else { "cat_trap" };
                surface.submit(DrawCommand::Effect { name, at: cell_pos(*loc), scale, alpha });
            }
            ActionRecord::PlaceDirt { loc } | ActionRecord::BreakDirt { loc } => {
                let (scale, alpha) = pulse(t);
                surface.submit(DrawCommand::Effect { name: "dirt", at: cell_pos(*loc), scale, alpha });
            }
            ActionRecord::RatCollision { loc } => {
                surface.submit(DrawCommand::Effect { name: "collision", at: cell_pos(*loc), scale: 1.0, alpha: 1.0 - t });
            }
            ActionRecord::TriggerTrap { .. } => {
                if let Some(at) = at_actor() {
                    surface.submit(DrawCommand::Effect { name: "trap_triggered", at, scale: 1.0, alpha: 1.0 - t });
                }
            }
            ActionRecord::RatNap { .. } => {
                if let Some(at) = at_actor() {
                    surface.submit(DrawCommand::Effect { name: "carry", at, scale: 1.0, alpha: 1.0 });
                }
            }
            ActionRecord::UpgradeToRatKing => {
                if let Some(at) = at_actor() {
                    surface.submit(DrawCommand::Effect { name: "crown", at, scale: 1.0, alpha: 0.5 * (1.0 - t) });
                }
            }
            ActionRecord::RatSqueak => {
                if let Some(at) = at_actor() {
                    surface.submit(DrawCommand::Effect { name: "squeak", at, scale: 1.0, alpha: 1.0 - t });
                }
            }
            ActionRecord::CheeseSpawn { .. }
            | ActionRecord::RemoveTrap { .. }
            | ActionRecord::Damage { .. }
            | ActionRecord::Stun { .. }
            | ActionRecord::Spawn { .. }
            | ActionRecord::Die { .. }
            | ActionRecord::IndicatorString { .. }
            | ActionRecord::IndicatorDot { .. }
            | ActionRecord::IndicatorLine { .. } => {}
        }
    }

    /// Undo any visual override `draw` installed.
    pub fn finish(&self, overrides: &mut VisualOverrides) {
        match self.record {
            ActionRecord::CatFeed { .. }
            | ActionRecord::CatScratch { .. }
            | ActionRecord::CatPounce { .. } => overrides.clear(self.actor),
            _ => {}
        }
    }
}

fn along(from: RenderPos, to: RenderPos, t: f32) -> RenderPos {
    (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
}

fn team_color(bodies: &Bodies, id: BodyId) -> u32 {
    match bodies.get(id).map(|b| b.team) {
        Ok(1) => 0xcdcdcc,
        Ok(2) => 0xfeb340,
        _ => 0xffffff,
    }
}

// =============================================================================
// ACTION LIST
// =============================================================================

/// Live actions of one round. Order is not meaningful.
///
/// `Clone` copies every action; payloads are immutable after construction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Actions {
    actions: Vec<Action>,
}

impl Actions {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct, record and apply every action attached to a turn.
    pub fn apply_turn_delta(
        &mut self,
        turn: &TurnRecord,
        map: &mut CurrentMap,
        bodies: &mut Bodies,
    ) -> ReplayResult<()> {
        for record in &turn.actions {
            let action = Action::new(turn.robot_id, record.clone());
            action.apply(map, bodies)?;
            self.actions.push(action);
        }
        Ok(())
    }

    /// Age every action by one round boundary.
    ///
    /// Expired actions are finished, then swap-removed. Returns how many
    /// expired.
    pub fn tick_lifetimes(&mut self, overrides: &mut VisualOverrides) -> usize {
        let mut expired = 0;
        let mut i = 0;
        while i < self.actions.len() {
            let action = &mut self.actions[i];
            action.remaining = action.remaining.saturating_sub(1);
            if action.remaining == 0 {
                let last = self.actions.len() - 1;
                self.actions.swap(i, last);
                self.actions[last].finish(overrides);
                self.actions.pop();
                expired += 1;
            } else {
                i += 1;
            }
        }
        expired
    }

    /// Draw every live action.
    pub fn draw(
        &self,
        ctx: &RenderContext,
        bodies: &Bodies,
        overrides: &mut VisualOverrides,
        surface: &mut dyn Surface,
    ) {
        for action in &self.actions {
            action.draw(ctx, bodies, overrides, surface);
        }
    }

    /// Live actions.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Number of live actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no action is alive.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
