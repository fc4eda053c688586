//! Map State
//!
//! `StaticMap` is the immutable layout parsed from the match header and
//! shared by every round of the match. `CurrentMap` layers the mutable
//! per-cell state on top of it: dirt, markers, traps, cheese and the
//! active resource sites.

use std::collections::BTreeMap;
use std::sync::Arc;
use serde::Serialize;

use crate::core::vec2::Vector;
use crate::schema::{BodyId, MapRecord, TeamId};
use super::error::{ReplayError, ReplayResult};

/// Bit pattern a resource site must keep in its 5x5 neighbourhood.
///
/// Bit `i` is the expected dirt value of the `i`th cell, scanning rows
/// top to bottom and columns left to right.
pub const RESOURCE_PATTERN_MASK: u32 = 28_873_275;

/// Half-width of the resource pattern square.
const PATTERN_RADIUS: i32 = 2;

// =============================================================================
// SYMMETRY
// =============================================================================

/// Map symmetry rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Symmetry {
    /// 180 degree rotation about the center
    Rotational,
    /// Mirror across the horizontal axis
    Horizontal,
    /// Mirror across the vertical axis
    Vertical,
}

impl Symmetry {
    /// Decode from the wire code.
    pub fn from_code(code: u8) -> ReplayResult<Self> {
        match code {
            0 => Ok(Symmetry::Rotational),
            1 => Ok(Symmetry::Horizontal),
            2 => Ok(Symmetry::Vertical),
            other => Err(ReplayError::InvalidMap(format!("unknown symmetry code {}", other))),
        }
    }

    /// Cell that mirrors `cell` on a `width` x `height` map.
    pub fn mirror(self, cell: Vector, width: u32, height: u32) -> Vector {
        let (w, h) = (width as i32, height as i32);
        match self {
            Symmetry::Vertical => Vector::new(w - cell.x - 1, cell.y),
            Symmetry::Horizontal => Vector::new(cell.x, h - cell.y - 1),
            Symmetry::Rotational => Vector::new(w - cell.x - 1, h - cell.y - 1),
        }
    }
}

// =============================================================================
// STATIC MAP
// =============================================================================

/// Immutable map layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticMap {
    /// Map name
    pub name: String,
    /// Seed the map was generated with
    pub random_seed: u32,
    /// Symmetry rule
    pub symmetry: Symmetry,
    /// Width in cells
    pub width: u32,
    /// Height in cells
    pub height: u32,
    walls: Vec<u8>,
    initial_dirt: Vec<u8>,
    cheese_mines: Vec<Vector>,
    cat_waypoints: BTreeMap<BodyId, Vec<Vector>>,
}

impl StaticMap {
    /// Build and validate from the header record.
    pub fn from_record(record: &MapRecord) -> ReplayResult<Self> {
        let cells = record.width as usize * record.height as usize;
        if record.width == 0 || record.height == 0 {
            return Err(ReplayError::InvalidMap("empty dimension".into()));
        }
        check_bitmap("walls", &record.walls, cells)?;
        check_bitmap("dirt", &record.dirt, cells)?;

        let map = Self {
            name: record.name.clone(),
            random_seed: record.random_seed,
            symmetry: Symmetry::from_code(record.symmetry)?,
            width: record.width,
            height: record.height,
            walls: record.walls.clone(),
            initial_dirt: record.dirt.clone(),
            cheese_mines: record.cheese_mines.clone(),
            cat_waypoints: record.cat_waypoints.clone(),
        };

        for mine in &map.cheese_mines {
            map.index(*mine)?;
        }

        Ok(map)
    }

    /// Total cell count.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the cell lies on the map.
    #[inline]
    pub fn in_bounds(&self, cell: Vector) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    /// Flat index of a cell (`y * width + x`).
    #[inline]
    pub fn index(&self, cell: Vector) -> ReplayResult<usize> {
        if !self.in_bounds(cell) {
            return Err(ReplayError::OutOfBounds(cell));
        }
        Ok(cell.y as usize * self.width as usize + cell.x as usize)
    }

    /// Cell at a flat index.
    #[inline]
    pub fn location(&self, index: usize) -> Vector {
        let w = self.width as usize;
        Vector::new((index % w) as i32, (index / w) as i32)
    }

    /// Whether the cell is a wall. Off-map cells count as walls.
    pub fn is_wall(&self, cell: Vector) -> bool {
        self.index(cell).map(|i| self.walls[i] != 0).unwrap_or(true)
    }

    /// Fixed cheese mine locations.
    pub fn cheese_mines(&self) -> &[Vector] {
        &self.cheese_mines
    }

    /// Patrol route of a cat, if the map defines one.
    pub fn cat_waypoints(&self, id: BodyId) -> Option<&[Vector]> {
        self.cat_waypoints.get(&id).map(Vec::as_slice)
    }

    /// Mirror image of a cell under the map's symmetry.
    pub fn mirror(&self, cell: Vector) -> Vector {
        self.symmetry.mirror(cell, self.width, self.height)
    }
}

fn check_bitmap(name: &str, bits: &[u8], cells: usize) -> ReplayResult<()> {
    if bits.len() != cells {
        return Err(ReplayError::InvalidMap(format!(
            "{} has {} cells, expected {}", name, bits.len(), cells
        )));
    }
    if let Some(bad) = bits.iter().find(|b| **b > 1) {
        return Err(ReplayError::InvalidMap(format!("{} contains value {}", name, bad)));
    }
    Ok(())
}

// =============================================================================
// CURRENT MAP
// =============================================================================

/// Which trap layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapKind {
    /// Catches rats
    Rat,
    /// Catches cats
    Cat,
}

/// A pending regional bonus anchored on a 5x5 dirt pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ResourceSite {
    /// Team that built the pattern
    pub team: TeamId,
    /// Center cell
    pub center: Vector,
    /// Round the site was recorded
    pub created_round: u32,
}

impl ResourceSite {
    /// Rounds until activation, or `None` once active.
    pub fn rounds_remaining(&self, round: u32, lifetime: u32) -> Option<u32> {
        (self.created_round + lifetime).checked_sub(round)
    }
}

/// Mutable per-cell state for one round.
///
/// `Clone` is the deep copy used for checkpoints; the static layout is
/// shared through the `Arc`.
#[derive(Clone, Debug, Serialize)]
pub struct CurrentMap {
    #[serde(skip)]
    static_map: Arc<StaticMap>,
    dirt: Vec<u8>,
    markers: [Vec<u8>; 2],
    rat_traps: Vec<u8>,
    cat_traps: Vec<u8>,
    cheese: Vec<u32>,
    resource_sites: Vec<ResourceSite>,
}

impl CurrentMap {
    /// Fresh mutable layers over a static layout.
    pub fn new(static_map: Arc<StaticMap>) -> Self {
        let cells = static_map.cell_count();
        Self {
            dirt: static_map.initial_dirt.clone(),
            markers: [vec![0; cells], vec![0; cells]],
            rat_traps: vec![0; cells],
            cat_traps: vec![0; cells],
            cheese: vec![0; cells],
            resource_sites: Vec::new(),
            static_map,
        }
    }

    /// Shared static layout.
    pub fn static_map(&self) -> &Arc<StaticMap> {
        &self.static_map
    }

    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.static_map.width
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.static_map.height
    }

    /// Re-validate every resource site against the current dirt layer.
    ///
    /// Broken sites are swap-removed, so site order is not preserved.
    /// Returns the number of sites removed.
    pub fn apply_round_delta(&mut self) -> usize {
        let mut removed = 0;
        let mut i = 0;
        while i < self.resource_sites.len() {
            if self.site_intact(&self.resource_sites[i]) {
                i += 1;
            } else {
                self.resource_sites.swap_remove(i);
                removed += 1;
            }
        }
        removed
    }

    fn site_intact(&self, site: &ResourceSite) -> bool {
        let mut bit = 0;
        for y in (site.center.y - PATTERN_RADIUS..=site.center.y + PATTERN_RADIUS).rev() {
            for x in site.center.x - PATTERN_RADIUS..=site.center.x + PATTERN_RADIUS {
                let expected = expected_pattern_bit(site.team, bit);
                match self.static_map.index(Vector::new(x, y)) {
                    Ok(idx) if self.dirt[idx] == expected => {}
                    _ => return false,
                }
                bit += 1;
            }
        }
        true
    }

    // -------------------------------------------------------------------------
    // Dirt
    // -------------------------------------------------------------------------

    /// Whether the cell holds dirt.
    pub fn dirt_at(&self, cell: Vector) -> ReplayResult<bool> {
        Ok(self.dirt[self.static_map.index(cell)?] != 0)
    }

    /// Set or clear dirt on a cell.
    pub fn set_dirt(&mut self, cell: Vector, present: bool) -> ReplayResult<()> {
        let idx = self.static_map.index(cell)?;
        self.dirt[idx] = present as u8;
        Ok(())
    }

    /// Number of dirt cells on the map.
    pub fn dirt_count(&self) -> u32 {
        self.dirt.iter().filter(|d| **d != 0).count() as u32
    }

    // -------------------------------------------------------------------------
    // Cheese
    // -------------------------------------------------------------------------

    /// Cheese lying on a cell.
    pub fn cheese_at(&self, cell: Vector) -> ReplayResult<u32> {
        Ok(self.cheese[self.static_map.index(cell)?])
    }

    /// Overwrite the cheese on a cell.
    pub fn set_cheese(&mut self, cell: Vector, amount: u32) -> ReplayResult<()> {
        let idx = self.static_map.index(cell)?;
        self.cheese[idx] = amount;
        Ok(())
    }

    /// Remove and return all cheese on a cell.
    pub fn take_cheese(&mut self, cell: Vector) -> ReplayResult<u32> {
        let idx = self.static_map.index(cell)?;
        Ok(std::mem::take(&mut self.cheese[idx]))
    }

    /// Cheese lying anywhere on the map.
    pub fn total_cheese(&self) -> u64 {
        self.cheese.iter().map(|c| *c as u64).sum()
    }

    // -------------------------------------------------------------------------
    // Traps
    // -------------------------------------------------------------------------

    /// Team owning the trap of `kind` on a cell, if any.
    pub fn trap_at(&self, cell: Vector, kind: TrapKind) -> ReplayResult<Option<TeamId>> {
        let idx = self.static_map.index(cell)?;
        let owner = match kind {
            TrapKind::Rat => self.rat_traps[idx],
            TrapKind::Cat => self.cat_traps[idx],
        };
        Ok((owner != 0).then_some(owner))
    }

    /// Place a trap of `kind` owned by `team`.
    pub fn set_trap(&mut self, cell: Vector, kind: TrapKind, team: TeamId) -> ReplayResult<()> {
        let idx = self.static_map.index(cell)?;
        match kind {
            TrapKind::Rat => self.rat_traps[idx] = team,
            TrapKind::Cat => self.cat_traps[idx] = team,
        }
        Ok(())
    }

    /// Clear both trap layers on a cell.
    pub fn clear_traps(&mut self, cell: Vector) -> ReplayResult<()> {
        let idx = self.static_map.index(cell)?;
        self.rat_traps[idx] = 0;
        self.cat_traps[idx] = 0;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Markers
    // -------------------------------------------------------------------------

    /// Marker value a player team left on a cell (0 = none).
    pub fn marker_at(&self, team: TeamId, cell: Vector) -> ReplayResult<u8> {
        let layer = marker_layer(team)?;
        Ok(self.markers[layer][self.static_map.index(cell)?])
    }

    /// Set a team's marker on a cell.
    pub fn set_marker(&mut self, team: TeamId, cell: Vector, value: u8) -> ReplayResult<()> {
        let layer = marker_layer(team)?;
        let idx = self.static_map.index(cell)?;
        self.markers[layer][idx] = value;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Resource sites
    // -------------------------------------------------------------------------

    /// Record a new resource site.
    pub fn add_resource_site(&mut self, site: ResourceSite) -> ReplayResult<()> {
        self.static_map.index(site.center)?;
        self.resource_sites.push(site);
        Ok(())
    }

    /// Active resource sites, unordered.
    pub fn resource_sites(&self) -> &[ResourceSite] {
        &self.resource_sites
    }

    /// Stamp the dirt pattern a team's site expects around `center`.
    ///
    /// Cells outside the map are skipped.
    pub fn stamp_resource_pattern(&mut self, team: TeamId, center: Vector) {
        let mut bit = 0;
        for y in (center.y - PATTERN_RADIUS..=center.y + PATTERN_RADIUS).rev() {
            for x in center.x - PATTERN_RADIUS..=center.x + PATTERN_RADIUS {
                if let Ok(idx) = self.static_map.index(Vector::new(x, y)) {
                    self.dirt[idx] = expected_pattern_bit(team, bit);
                }
                bit += 1;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Tooltip
    // -------------------------------------------------------------------------

    /// Human-readable description of a cell for hover tooltips.
    ///
    /// Empty for off-map cells.
    pub fn tooltip(&self, cell: Vector, round: u32, site_lifetime: u32) -> Vec<String> {
        let Ok(idx) = self.static_map.index(cell) else {
            return Vec::new();
        };

        let mut info = Vec::new();
        if self.static_map.walls[idx] != 0 {
            info.push("Wall".to_string());
        }
        if self.dirt[idx] != 0 {
            info.push("Dirt".to_string());
        }
        if self.static_map.cheese_mines.contains(&cell) {
            info.push("Cheese Mine".to_string());
        }
        if self.cheese[idx] > 0 {
            info.push(format!("Cheese: {}", self.cheese[idx]));
        }
        if self.rat_traps[idx] != 0 {
            info.push(format!("Rat Trap (Team {})", self.rat_traps[idx]));
        }
        if self.cat_traps[idx] != 0 {
            info.push(format!("Cat Trap (Team {})", self.cat_traps[idx]));
        }
        for (layer, name) in ["Team 1", "Team 2"].iter().enumerate() {
            match self.markers[layer][idx] {
                0 => {}
                1 => info.push(format!("{} Marker (Primary)", name)),
                _ => info.push(format!("{} Marker (Secondary)", name)),
            }
        }
        if let Some(site) = self.resource_sites.iter().find(|s| s.center == cell) {
            match site.rounds_remaining(round, site_lifetime) {
                Some(left) => info.push(format!("Resource Site (Team {}, {} rounds left)", site.team, left)),
                None => info.push(format!("Resource Site (Team {}, active)", site.team)),
            }
        }
        info
    }
}

/// Expected dirt bit for `team` at pattern position `bit`.
///
/// Team 2's pattern is the inverse of team 1's.
fn expected_pattern_bit(team: TeamId, bit: u32) -> u8 {
    let base = ((RESOURCE_PATTERN_MASK >> bit) & 1) as u8;
    if team == 2 { base ^ 1 } else { base }
}

fn marker_layer(team: TeamId) -> ReplayResult<usize> {
    match team {
        1 => Ok(0),
        2 => Ok(1),
        other => Err(ReplayError::UnknownTeam(other)),
    }
}

// =============================================================================
// TESTS
// =============================================================================
