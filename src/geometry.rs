//! Board coordinates and free-cell placement.

use std::collections::HashSet;

use rand::Rng;

/// Cell coordinate, origin top-left. Values may lie off the board
/// (enemies enter from outside, meteors fall past the bottom edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Pos {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

pub fn step(pos: Pos, dir: Dir) -> Pos {
    let (dx, dy) = dir.delta();
    pos.offset(dx, dy)
}

/// Fixed playing rectangle. Row/column 0 and the last row/column form the
/// fatal boundary ring; everything strictly inside is the interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    pub width: i32,
    pub height: i32,
}

impl Board {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_interior(&self, pos: Pos) -> bool {
        pos.x >= 1 && pos.y >= 1 && pos.x <= self.width - 2 && pos.y <= self.height - 2
    }

    pub fn interior_area(&self) -> usize {
        ((self.width - 2).max(0) * (self.height - 2).max(0)) as usize
    }
}

/// Anything that covers board cells and must be avoided when placing items.
pub trait Footprint {
    fn mark(&self, occupied: &mut HashSet<Pos>);
}

impl Footprint for Pos {
    fn mark(&self, occupied: &mut HashSet<Pos>) {
        occupied.insert(*self);
    }
}

impl Footprint for HashSet<Pos> {
    fn mark(&self, occupied: &mut HashSet<Pos>) {
        occupied.extend(self.iter().copied());
    }
}

impl Footprint for [Pos] {
    fn mark(&self, occupied: &mut HashSet<Pos>) {
        occupied.extend(self.iter().copied());
    }
}

impl Footprint for Vec<Pos> {
    fn mark(&self, occupied: &mut HashSet<Pos>) {
        self.as_slice().mark(occupied);
    }
}

/// Union of the snake and every existing item, built up before a spawn.
#[derive(Debug, Clone, Default)]
pub struct Occupied {
    cells: HashSet<Pos>,
}

impl Occupied {
    pub fn new(snake: &[Pos]) -> Self {
        Self {
            cells: snake.iter().copied().collect(),
        }
    }

    pub fn with(mut self, item: &(impl Footprint + ?Sized)) -> Self {
        item.mark(&mut self.cells);
        self
    }

    pub fn insert(&mut self, pos: Pos) {
        self.cells.insert(pos);
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

/// Random free interior cell, or `None` once the probe budget runs out.
///
/// The budget shrinks with the estimated number of free cells so that a
/// crowded board gives up quickly; it never drops below ten probes.
pub fn place_item(
    board: &Board,
    occupied: &Occupied,
    max_attempts: usize,
    rng: &mut impl Rng,
) -> Option<Pos> {
    if board.width < 3 || board.height < 3 {
        return None;
    }
    let free = board.interior_area().saturating_sub(occupied.len());
    let realistic = if free > 20 { (free / 2).max(10) } else { 10 };
    let attempts = max_attempts.min(realistic);

    for _ in 0..attempts {
        let pos = Pos::new(
            rng.gen_range(1..=board.width - 2),
            rng.gen_range(1..=board.height - 2),
        );
        if !occupied.contains(pos) {
            return Some(pos);
        }
    }
    None
}

/// Extra cell covered by a thick-snake segment, derived from the direction
/// the segment moved relative to the one behind it.
pub fn thick_offset(segment: Pos, behind: Pos) -> Option<Pos> {
    let dx = segment.x - behind.x;
    let dy = segment.y - behind.y;
    if dx != 0 {
        Some(segment.offset(0, 1))
    } else if dy != 0 {
        Some(segment.offset(1, 0))
    } else {
        None
    }
}
