/// Movement rules: exit-based, truth-table driven.
///
/// Pure functions over a read-only grid view. These decide "where would
/// this step land" without mutating anything.
///
/// ## Step Truth Table
///
/// ┌─────────────────────────────────────┬──────────┬──────────────────────┐
/// │ Condition (checked in order)         │ Result   │ Notes                │
/// ├─────────────────────────────────────┼──────────┼──────────────────────┤
/// │ origin exits lack the direction      │ DENY     │ can't leave that way │
/// │ both axes clamped at the edge        │ DENY     │ null step, no check  │
/// │ moved north, dest lacks S exit       │ DENY     │ reciprocal exit      │
/// │ moved south, dest lacks N exit       │ DENY     │                      │
/// │ moved east,  dest lacks W exit       │ DENY     │                      │
/// │ moved west,  dest lacks E exit       │ DENY     │                      │
/// │ Otherwise                            │ ALLOW    │                      │
/// └─────────────────────────────────────┴──────────┴──────────────────────┘
///
/// Each axis is stepped separately and clamped to the grid: south then north
/// for rows, east then west for columns. A diagonal direction applies both
/// axes. Reciprocal checks follow the axes that actually moved.

use super::direction::Directions;
use super::tile::Tile;

/// Immutable view of the tile grid for rule and sight queries.
/// `tiles` is row-major, `width * height` long.
pub struct GridView<'a> {
    pub tiles: &'a [Tile],
    pub width: usize,
    pub height: usize,
}

impl<'a> GridView<'a> {
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Option<&'a Tile> {
        if self.contains(x, y) {
            self.tiles.get(y * self.width + x)
        } else {
            None
        }
    }

    /// Out-of-bounds cells never block.
    #[inline]
    pub fn blocks(&self, x: usize, y: usize) -> bool {
        self.tile_at(x, y).is_some_and(Tile::blocks)
    }
}

/// Why a step was refused. Refusal is a normal outcome, not an error;
/// the reason only feeds debug logging.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StepRejection {
    OutOfBounds,
    NoExit,
    AtEdge,
    NoReciprocalExit,
}

/// Resolve one step from `(x, y)` toward `direction`.
/// Returns the destination cell, or the first rule that refused it.
pub fn resolve_step(
    grid: &GridView,
    x: usize,
    y: usize,
    direction: Directions,
) -> Result<(usize, usize), StepRejection> {
    let here = grid.tile_at(x, y).ok_or(StepRejection::OutOfBounds)?;
    if !here.exits().contains(direction) {
        return Err(StepRejection::NoExit);
    }

    let mut ny = y;
    if direction.intersects(Directions::SOUTHWARD) && ny + 1 < grid.height {
        ny += 1;
    }
    if direction.intersects(Directions::NORTHWARD) && ny > 0 {
        ny -= 1;
    }

    let mut nx = x;
    if direction.intersects(Directions::EASTWARD) && nx + 1 < grid.width {
        nx += 1;
    }
    if direction.intersects(Directions::WESTWARD) && nx > 0 {
        nx -= 1;
    }

    if (nx, ny) == (x, y) {
        return Err(StepRejection::AtEdge);
    }

    let dest = grid.tile_at(nx, ny).ok_or(StepRejection::OutOfBounds)?;
    let mut needed = Directions::empty();
    if ny < y {
        needed |= Directions::SOUTH;
    } else if ny > y {
        needed |= Directions::NORTH;
    }
    if nx > x {
        needed |= Directions::WEST;
    } else if nx < x {
        needed |= Directions::EAST;
    }
    if !dest.exits().contains(needed) {
        return Err(StepRejection::NoReciprocalExit);
    }

    Ok((nx, ny))
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
