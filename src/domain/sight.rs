/// Sight geometry: radius enumeration and line-of-sight occlusion.
///
/// The occlusion test is a coarse rasterized line, not a Bresenham walk or
/// a ray cast. On shallow slopes it can skip cells the line clips; callers
/// treat it as an approximation.

use super::rules::GridView;

/// A cell counts as "on the line" when its row is this close to the
/// line's y at that column.
pub const LINE_TOLERANCE: f64 = 0.001;

#[inline]
pub fn distance(a: (usize, usize), b: (usize, usize)) -> f64 {
    let dx = a.0 as f64 - b.0 as f64;
    let dy = a.1 as f64 - b.1 as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Every in-bounds cell within Euclidean distance `radius` of the center,
/// center included. Row-major order.
pub fn cells_in_radius(grid: &GridView, cx: usize, cy: usize, radius: usize) -> Vec<(usize, usize)> {
    let mut cells = vec![];
    if grid.width == 0 || grid.height == 0 {
        return cells;
    }
    let x0 = cx.saturating_sub(radius);
    let y0 = cy.saturating_sub(radius);
    let x1 = cx.saturating_add(radius).min(grid.width - 1);
    let y1 = cy.saturating_add(radius).min(grid.height - 1);
    let r2 = (radius as u64).saturating_mul(radius as u64);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x.abs_diff(cx) as u64;
            let dy = y.abs_diff(cy) as u64;
            if dx * dx + dy * dy <= r2 {
                cells.push((x, y));
            }
        }
    }
    cells
}

/// Nearest blocking cell on the straight line from `from` to `to`,
/// closer to `from` than both `max_distance` and `to` itself.
///
/// `from` never obscures its own view, and `to` never obscures itself
/// (its distance is not strictly less than the A–B distance).
pub fn obscuring_cell(
    grid: &GridView,
    from: (usize, usize),
    to: (usize, usize),
    max_distance: f64,
) -> Option<(usize, usize)> {
    if !grid.contains(from.0, from.1) || !grid.contains(to.0, to.1) {
        return None;
    }
    let limit = max_distance.min(distance(from, to));
    let (ax, ay) = from;
    let (bx, by) = to;

    let mut best: Option<((usize, usize), f64)> = None;
    let mut consider = |x: usize, y: usize, d: f64| {
        if d > 0.0 && d < limit && grid.blocks(x, y) && best.map_or(true, |(_, bd)| d < bd) {
            best = Some(((x, y), d));
        }
    };

    if ax == bx {
        // Vertical: distance along the column.
        for y in ay.min(by)..=ay.max(by) {
            consider(ax, y, y.abs_diff(ay) as f64);
        }
    } else if ay == by {
        // Horizontal: distance along the row.
        for x in ax.min(bx)..=ax.max(bx) {
            consider(x, ay, x.abs_diff(ax) as f64);
        }
    } else {
        let slope = (by as f64 - ay as f64) / (bx as f64 - ax as f64);
        for y in ay.min(by)..=ay.max(by) {
            for x in ax.min(bx)..=ax.max(bx) {
                let line_y = ay as f64 + slope * (x as f64 - ax as f64);
                if (y as f64 - line_y).abs() < LINE_TOLERANCE {
                    consider(x, y, distance(from, (x, y)));
                }
            }
        }
    }

    best.map(|(cell, _)| cell)
}
