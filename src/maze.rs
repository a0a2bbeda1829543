//! Wide-corridor maze generation.
//!
//! Topology comes from a randomized depth-first carve over a coarse grid;
//! every carved coarse cell is then blown up into a `corridor × corridor`
//! block of path cells in the target rectangle.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::geometry::Pos;

/// Generated maze, coordinates relative to the rectangle's own origin.
#[derive(Debug, Clone, Default)]
pub struct Maze {
    pub walls: HashSet<Pos>,
    pub paths: HashSet<Pos>,
    pub entrance: Option<Pos>,
    pub exit: Option<Pos>,
}

impl Maze {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn translate(self, dx: i32, dy: i32) -> Maze {
        let shift = |p: Pos| p.offset(dx, dy);
        Maze {
            walls: self.walls.into_iter().map(shift).collect(),
            paths: self.paths.into_iter().map(shift).collect(),
            entrance: self.entrance.map(shift),
            exit: self.exit.map(shift),
        }
    }
}

/// Coarse-grid cell, `(col, row)`.
type Coarse = (i32, i32);

pub fn generate_maze(
    target_h: i32,
    target_w: i32,
    corridor: i32,
    rng: &mut impl Rng,
) -> Maze {
    let corridor = (corridor.max(1) / 2) * 2 + 1;
    let grid_h = odd_cells(target_h, corridor);
    let grid_w = odd_cells(target_w, corridor);

    if target_h < 3 || target_w < 3 || grid_h * corridor > target_h || grid_w * corridor > target_w
    {
        log::warn!(
            "maze target {}x{} too small for a {}x{} grid at corridor width {}",
            target_h,
            target_w,
            grid_h,
            grid_w,
            corridor
        );
        return Maze::default();
    }

    let coarse = carve_coarse(grid_w, grid_h, rng);
    if coarse.is_empty() {
        return Maze::default();
    }

    let half = corridor / 2;
    let mut paths = HashSet::new();
    for &(cx, cy) in &coarse {
        let center = block_center((cx, cy), corridor);
        for dy in -half..=half {
            for dx in -half..=half {
                let p = center.offset(dx, dy);
                if p.x >= 0 && p.x < target_w && p.y >= 0 && p.y < target_h {
                    paths.insert(p);
                }
            }
        }
    }

    let mut walls: HashSet<Pos> = (0..target_h)
        .flat_map(|y| (0..target_w).map(move |x| Pos::new(x, y)))
        .filter(|p| !paths.contains(p))
        .collect();

    let mut boundary: Vec<Coarse> = coarse
        .iter()
        .copied()
        .filter(|&(cx, cy)| cx == 1 || cx == grid_w - 2 || cy == 1 || cy == grid_h - 2)
        .collect();
    boundary.sort();

    if boundary.len() < 2 {
        log::warn!("maze has fewer than two boundary cells, no entrance/exit");
        return Maze {
            walls,
            paths,
            entrance: None,
            exit: None,
        };
    }

    let entrance_cell = *boundary.choose(rng).unwrap_or(&boundary[0]);
    let mut exit_cell = None;
    let mut best = -1;
    for &cell in boundary.iter().filter(|&&c| c != entrance_cell) {
        let d = (cell.0 - entrance_cell.0).pow(2) + (cell.1 - entrance_cell.1).pow(2);
        if d > best {
            best = d;
            exit_cell = Some(cell);
        }
    }
    let exit_cell = exit_cell.unwrap_or(entrance_cell);

    let frame = Frame {
        target_w,
        target_h,
        grid_w,
        grid_h,
        corridor,
    };
    let entrance = carve_opening(&frame, entrance_cell, &mut walls, &mut paths);
    let exit = carve_opening(&frame, exit_cell, &mut walls, &mut paths);

    Maze {
        walls,
        paths,
        entrance,
        exit,
    }
}

/// Recursive backtracker over the coarse grid. Returns every carved cell,
/// including the wall cells knocked out between visited cells.
fn carve_coarse(grid_w: i32, grid_h: i32, rng: &mut impl Rng) -> HashSet<Coarse> {
    let mut wall = vec![vec![true; grid_w as usize]; grid_h as usize];
    let mut carved = HashSet::new();

    let start = (
        rng.gen_range(0..grid_w / 2) * 2 + 1,
        rng.gen_range(0..grid_h / 2) * 2 + 1,
    );
    carve_cell(&mut wall, &mut carved, start);
    let mut stack = vec![start];

    while let Some(&(cx, cy)) = stack.last() {
        let mut neighbors = Vec::new();
        for (dx, dy) in [(2, 0), (-2, 0), (0, 2), (0, -2)] {
            let (nx, ny) = (cx + dx, cy + dy);
            if nx > 0 && nx < grid_w && ny > 0 && ny < grid_h && wall[ny as usize][nx as usize] {
                neighbors.push((nx, ny));
            }
        }
        match neighbors.choose(rng) {
            Some(&next) => {
                carve_between(&mut wall, &mut carved, (cx, cy), next);
                carve_cell(&mut wall, &mut carved, next);
                stack.push(next);
            }
            None => {
                stack.pop();
            }
        }
    }
    carved
}

/// Largest odd number of coarse cells that fits, never below three.
fn odd_cells(extent: i32, corridor: i32) -> i32 {
    let n = extent / corridor;
    let odd = if n % 2 == 0 { n - 1 } else { n };
    odd.max(3)
}

fn carve_cell(wall: &mut [Vec<bool>], carved: &mut HashSet<Coarse>, cell: Coarse) {
    wall[cell.1 as usize][cell.0 as usize] = false;
    carved.insert(cell);
}

fn carve_between(wall: &mut [Vec<bool>], carved: &mut HashSet<Coarse>, a: Coarse, b: Coarse) {
    carve_cell(wall, carved, ((a.0 + b.0) / 2, (a.1 + b.1) / 2));
}

fn block_center(cell: Coarse, corridor: i32) -> Pos {
    Pos::new(cell.0 * corridor + corridor / 2, cell.1 * corridor + corridor / 2)
}

struct Frame {
    target_w: i32,
    target_h: i32,
    grid_w: i32,
    grid_h: i32,
    corridor: i32,
}

/// Opens a corridor-wide gap between a boundary block and the rectangle's
/// rim. The gap reaches index 1 (or dimension-2) and never the outer edge.
/// Returns the opening cell on the rim line.
fn carve_opening(
    frame: &Frame,
    cell: Coarse,
    walls: &mut HashSet<Pos>,
    paths: &mut HashSet<Pos>,
) -> Option<Pos> {
    let center = block_center(cell, frame.corridor);
    let half = frame.corridor / 2;
    let block_lo = |c: i32| c * frame.corridor;
    let block_hi = |c: i32| c * frame.corridor + frame.corridor - 1;

    // (fixed axis range, span along the rim, vertical?)
    let (range, rim, vertical) = if cell.1 == 1 {
        ((1..block_lo(cell.1)).collect::<Vec<_>>(), 1, true)
    } else if cell.1 == frame.grid_h - 2 {
        let rim = frame.target_h - 2;
        ((block_hi(cell.1) + 1..=rim).collect(), rim, true)
    } else if cell.0 == 1 {
        ((1..block_lo(cell.0)).collect(), 1, false)
    } else if cell.0 == frame.grid_w - 2 {
        let rim = frame.target_w - 2;
        ((block_hi(cell.0) + 1..=rim).collect(), rim, false)
    } else {
        return None;
    };

    for line in range {
        for d in -half..=half {
            let p = if vertical {
                Pos::new(center.x + d, line)
            } else {
                Pos::new(line, center.y + d)
            };
            if p.x >= 0 && p.x < frame.target_w && p.y >= 0 && p.y < frame.target_h {
                walls.remove(&p);
                paths.insert(p);
            }
        }
    }

    Some(if vertical {
        Pos::new(center.x, rim)
    } else {
        Pos::new(rim, center.y)
    })
}
