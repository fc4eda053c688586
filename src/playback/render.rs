//! Render Contract
//!
//! Playback never touches a canvas. Bodies and actions describe what to
//! draw as `DrawCommand`s submitted to a `Surface`; the viewer decides how
//! to paint them.
//!
//! Temporary visual state (texture swaps, mid-air positions) lives in
//! `VisualOverrides`, kept apart from the authoritative bodies and map so
//! that drawing can never change replayed state.

use std::collections::BTreeMap;

use crate::core::vec2::Vector;
use crate::schema::{BodyId, RobotKind, TeamId};

/// Floating point render coordinate in cell units.
pub type RenderPos = (f32, f32);

/// Read-only parameters for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderContext {
    /// Progress through the displayed round, 0..=1
    pub interpolation: f32,
    /// Round being displayed
    pub round: u32,
    /// Draw indicator dots, lines and strings
    pub show_indicators: bool,
    /// Draw movement trails
    pub show_trails: bool,
    /// Body highlighted by the user
    pub selected: Option<BodyId>,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            interpolation: 1.0,
            round: 0,
            show_indicators: true,
            show_trails: false,
            selected: None,
        }
    }
}

/// Texture swapped in while an action animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureOverride {
    /// Cat eating
    CatFeed,
    /// Cat swiping
    CatScratch,
    /// Cat mid-leap, facing east, north, west or south
    CatPounce(PounceFacing),
}

/// Facing bucket for the pounce sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PounceFacing {
    /// Toward +x
    East,
    /// Toward +y
    North,
    /// Toward -x
    West,
    /// Toward -y
    South,
}

impl PounceFacing {
    /// Bucket a leap from `start` to `end`.
    pub fn of(start: Vector, end: Vector) -> Self {
        let dx = (end.x - start.x) as f32;
        let dy = (end.y - start.y) as f32;
        let angle = dy.atan2(dx).rem_euclid(std::f32::consts::TAU);
        let quarter = std::f32::consts::FRAC_PI_4;
        if angle >= 7.0 * quarter || angle <= quarter {
            PounceFacing::East
        } else if angle < 3.0 * quarter {
            PounceFacing::North
        } else if angle <= 5.0 * quarter {
            PounceFacing::West
        } else {
            PounceFacing::South
        }
    }
}

/// Temporary visual state of one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualOverride {
    /// Replacement texture
    pub texture: TextureOverride,
    /// Replacement render position, if the animation moves the body
    pub position: Option<RenderPos>,
}

/// Visual overrides keyed by body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisualOverrides {
    by_body: BTreeMap<BodyId, VisualOverride>,
}

impl VisualOverrides {
    /// Override a body's visuals.
    pub fn set(&mut self, id: BodyId, value: VisualOverride) {
        self.by_body.insert(id, value);
    }

    /// Drop a body's override.
    pub fn clear(&mut self, id: BodyId) {
        self.by_body.remove(&id);
    }

    /// Current override of a body.
    pub fn get(&self, id: BodyId) -> Option<&VisualOverride> {
        self.by_body.get(&id)
    }

    /// Whether no body is overridden.
    pub fn is_empty(&self) -> bool {
        self.by_body.is_empty()
    }

    /// Number of overridden bodies.
    pub fn len(&self) -> usize {
        self.by_body.len()
    }
}

/// One primitive for the viewer to paint.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// A body sprite
    #[allow(missing_docs)]
    Body {
        id: BodyId,
        kind: RobotKind,
        team: TeamId,
        at: RenderPos,
        size: f32,
        texture: Option<TextureOverride>,
        dead: bool,
    },
    /// A straight line
    #[allow(missing_docs)]
    Line { from: RenderPos, to: RenderPos, color: u32, width: f32 },
    /// A filled dot
    #[allow(missing_docs)]
    Dot { at: RenderPos, color: u32, radius: f32 },
    /// A named sprite effect (pickup sparkle, trap icon)
    #[allow(missing_docs)]
    Effect { name: &'static str, at: RenderPos, scale: f32, alpha: f32 },
    /// A text label
    #[allow(missing_docs)]
    Label { at: RenderPos, text: String },
}

/// Sink for draw commands.
pub trait Surface {
    /// Accept one command.
    fn submit(&mut self, command: DrawCommand);
}

impl Surface for Vec<DrawCommand> {
    fn submit(&mut self, command: DrawCommand) {
        self.push(command);
    }
}

/// Linear interpolation between two cells.
#[inline]
pub fn lerp_cells(from: Vector, to: Vector, t: f32) -> RenderPos {
    (
        from.x as f32 + (to.x - from.x) as f32 * t,
        from.y as f32 + (to.y - from.y) as f32 * t,
    )
}

/// Center of a cell.
#[inline]
pub fn cell_pos(cell: Vector) -> RenderPos {
    (cell.x as f32, cell.y as f32)
}

/// Pop-in size and alpha used by short effects.
///
/// At either endpoint of the round the effect is drawn at rest.
pub fn pulse(t: f32) -> (f32, f32) {
    if t <= 0.0 || t >= 1.0 {
        return (1.0, 1.0);
    }
    let size = (t * 1.5).max(0.3);
    let alpha = if t < 0.5 { t } else { 1.0 - t } * 2.0;
    (size, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pounce_facing_buckets() {
        let o = Vector::ZERO;
        assert_eq!(PounceFacing::of(o, Vector::new(3, 0)), PounceFacing::East);
        assert_eq!(PounceFacing::of(o, Vector::new(0, 3)), PounceFacing::North);
        assert_eq!(PounceFacing::of(o, Vector::new(-3, 0)), PounceFacing::West);
        assert_eq!(PounceFacing::of(o, Vector::new(0, -3)), PounceFacing::South);
    }

    #[test]
    fn test_overrides_set_and_clear() {
        let mut overrides = VisualOverrides::default();
        overrides.set(4, VisualOverride { texture: TextureOverride::CatFeed, position: None });
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides.get(4).map(|o| o.texture), Some(TextureOverride::CatFeed));
        overrides.clear(4);
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_lerp_and_pulse() {
        assert_eq!(lerp_cells(Vector::new(0, 0), Vector::new(2, 4), 0.5), (1.0, 2.0));
        assert_eq!(pulse(0.0), (1.0, 1.0));
        let (size, alpha) = pulse(0.25);
        assert!((size - 0.375).abs() < 1e-6);
        assert!((alpha - 0.5).abs() < 1e-6);
    }
}
