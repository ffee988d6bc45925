//! Grid Pathfinding
//!
//! A coarse occupancy grid over the arena plus A* on 8-connected cells.
//! Walls never move after generation, so the grid is built once and
//! shared by every bot.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::core::vec2::Vec2;
use crate::world::geometry::{self, Wall};

/// Cell edge length. Chosen to fit one combatant diameter so any
/// cell-to-cell step a path takes is walkable at full radius.
pub const CELL_SIZE: f32 = 40.0;

/// Orthogonal step cost.
const COST_AXIS: u32 = 10;
/// Diagonal step cost (10 * sqrt(2), rounded).
const COST_DIAGONAL: u32 = 14;

/// Occupancy grid over the arena. `true` means blocked.
#[derive(Debug)]
pub struct NavGrid {
    cols: usize,
    rows: usize,
    blocked: Vec<bool>,
}

impl NavGrid {
    /// Rasterize the wall set into a grid covering `width` x `height`.
    ///
    /// A cell is blocked when a combatant of `radius` centered on the
    /// cell cannot stand there.
    pub fn build(walls: &[Wall], width: f32, height: f32, radius: f32) -> Self {
        let cols = (width / CELL_SIZE).ceil() as usize;
        let rows = (height / CELL_SIZE).ceil() as usize;
        let mut blocked = vec![false; cols * rows];
        for row in 0..rows {
            for col in 0..cols {
                let (x, y) = cell_center(col, row);
                if geometry::point_blocked(walls, x, y, radius).is_some() {
                    blocked[row * cols + col] = true;
                }
            }
        }
        Self { cols, rows, blocked }
    }

    fn cell_of(&self, point: Vec2) -> Option<(usize, usize)> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let col = (point.x / CELL_SIZE) as usize;
        let row = (point.y / CELL_SIZE) as usize;
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some((col, row))
    }

    fn is_blocked(&self, col: usize, row: usize) -> bool {
        self.blocked[row * self.cols + col]
    }

    /// True when the cell containing `point` is walkable.
    pub fn is_walkable(&self, point: Vec2) -> bool {
        match self.cell_of(point) {
            Some((col, row)) => !self.is_blocked(col, row),
            None => false,
        }
    }

    /// Nearest walkable cell to `point`, searching outward ring by ring.
    /// Repairs endpoints that sit inside a wall footprint.
    pub fn nearest_walkable_cell(&self, point: Vec2) -> Option<(usize, usize)> {
        let (col, row) = self.cell_of(point)?;
        if !self.is_blocked(col, row) {
            return Some((col, row));
        }
        for ring in 1..=4isize {
            for dr in -ring..=ring {
                for dc in -ring..=ring {
                    if dr.abs() != ring && dc.abs() != ring {
                        continue;
                    }
                    let c = col as isize + dc;
                    let r = row as isize + dr;
                    if c < 0 || r < 0 || c as usize >= self.cols || r as usize >= self.rows {
                        continue;
                    }
                    if !self.is_blocked(c as usize, r as usize) {
                        return Some((c as usize, r as usize));
                    }
                }
            }
        }
        None
    }
}

fn cell_center(col: usize, row: usize) -> (f32, f32) {
    (
        col as f32 * CELL_SIZE + CELL_SIZE / 2.0,
        row as f32 * CELL_SIZE + CELL_SIZE / 2.0,
    )
}

fn heuristic(a: (usize, usize), b: (usize, usize)) -> u32 {
    let dx = a.0.abs_diff(b.0) as u32;
    let dy = a.1.abs_diff(b.1) as u32;
    (dx + dy) * COST_AXIS
}

/// Find a waypoint path from `from` to `to`.
///
/// Both endpoints are snapped to their nearest walkable cell; returns
/// `None` when no repair is possible or the goal is unreachable.
/// Diagonal steps never cut a blocked corner.
pub fn find_path(grid: &NavGrid, from: Vec2, to: Vec2) -> Option<Vec<Vec2>> {
    let start = grid.nearest_walkable_cell(from)?;
    let goal = grid.nearest_walkable_cell(to)?;
    if start == goal {
        return Some(vec![to]);
    }

    let idx = |(c, r): (usize, usize)| r * grid.cols + c;
    let mut g_score = vec![u32::MAX; grid.cols * grid.rows];
    let mut came_from: Vec<Option<(usize, usize)>> = vec![None; grid.cols * grid.rows];
    let mut open: BinaryHeap<Reverse<(u32, (usize, usize))>> = BinaryHeap::new();

    g_score[idx(start)] = 0;
    open.push(Reverse((heuristic(start, goal), start)));

    const STEPS: [(isize, isize, u32); 8] = [
        (1, 0, COST_AXIS),
        (-1, 0, COST_AXIS),
        (0, 1, COST_AXIS),
        (0, -1, COST_AXIS),
        (1, 1, COST_DIAGONAL),
        (1, -1, COST_DIAGONAL),
        (-1, 1, COST_DIAGONAL),
        (-1, -1, COST_DIAGONAL),
    ];

    while let Some(Reverse((_, current))) = open.pop() {
        if current == goal {
            let mut cells = vec![current];
            let mut cursor = current;
            while let Some(prev) = came_from[idx(cursor)] {
                cells.push(prev);
                cursor = prev;
            }
            cells.reverse();
            let mut path: Vec<Vec2> = cells
                .into_iter()
                .skip(1)
                .map(|(c, r)| {
                    let (x, y) = cell_center(c, r);
                    Vec2::new(x, y)
                })
                .collect();
            // Land exactly on the requested point when it is walkable
            if grid.is_walkable(to) {
                path.pop();
                path.push(to);
            }
            return Some(path);
        }

        let current_g = g_score[idx(current)];
        for &(dc, dr, cost) in &STEPS {
            let c = current.0 as isize + dc;
            let r = current.1 as isize + dr;
            if c < 0 || r < 0 || c as usize >= grid.cols || r as usize >= grid.rows {
                continue;
            }
            let next = (c as usize, r as usize);
            if grid.is_blocked(next.0, next.1) {
                continue;
            }
            // No squeezing through a blocked corner on diagonals
            if dc != 0 && dr != 0 {
                let side_a = (current.0 as isize + dc, current.1 as isize);
                let side_b = (current.0 as isize, current.1 as isize + dr);
                if grid.is_blocked(side_a.0 as usize, side_a.1 as usize)
                    || grid.is_blocked(side_b.0 as usize, side_b.1 as usize)
                {
                    continue;
                }
            }
            let tentative = current_g.saturating_add(cost);
            if tentative < g_score[idx(next)] {
                g_score[idx(next)] = tentative;
                came_from[idx(next)] = Some(current);
                open.push(Reverse((tentative + heuristic(next, goal), next)));
            }
        }
    }
    None
}
