//! Frame drawing onto a character [`Surface`], plus the crossterm-backed
//! surface that only repaints cells that changed since the last frame.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::FLASH_INTERVAL_S;
use crate::effects::{EffectData, PowerUpKind};
use crate::geometry::{thick_offset, Pos};
use crate::scoreboard::Scoreboard;
use crate::session::Session;

pub const FOOD_SYMBOL: char = '#';
pub const SNAKE_SYMBOL: char = '*';
pub const WALL_SYMBOL: char = '%';
pub const OBSTACLE_SYMBOL: char = '@';
pub const ENEMY_SYMBOL: char = 'X';
pub const METEOR_SYMBOL: char = '*';
pub const BALL_SYMBOL: char = 'o';
pub const THICK_SYMBOL: char = '+';
pub const PICKUP_SYMBOL: char = '?';

/// What a drawn character represents; the surface maps it to a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Text,
    Snake,
    SnakeFlash,
    SnakeInMaze,
    Food,
    Pickup(PowerUpKind),
    Obstacle,
    Meteor,
    Ball,
    Enemy,
    MazeWall,
    MazeFood,
    Notice,
    Alert,
}

impl Role {
    pub fn color(self) -> Color {
        match self {
            Role::Text | Role::Snake => Color::Green,
            Role::SnakeFlash | Role::MazeWall | Role::Notice => Color::White,
            Role::SnakeInMaze | Role::Food | Role::Meteor => Color::Yellow,
            Role::Obstacle | Role::Ball | Role::Alert => Color::Red,
            Role::Enemy => Color::Magenta,
            Role::MazeFood => Color::Cyan,
            Role::Pickup(kind) => match kind {
                PowerUpKind::MultiFood | PowerUpKind::Maze => Color::Cyan,
                PowerUpKind::Balls | PowerUpKind::Obstacles => Color::Red,
                PowerUpKind::ThickSnake => Color::White,
                PowerUpKind::MaxSpeed => Color::Blue,
                PowerUpKind::Enemy => Color::Magenta,
                PowerUpKind::Meteors => Color::Yellow,
            },
        }
    }

    fn bold(self) -> bool {
        matches!(self, Role::Notice | Role::Alert)
    }
}

/// Character-cell display of a fixed size. Draws outside the surface are
/// dropped.
pub trait Surface {
    /// `(width, height)` in cells.
    fn size(&self) -> (i32, i32);
    fn put(&mut self, pos: Pos, ch: char, role: Role);
    fn clear(&mut self);
    fn present(&mut self) -> io::Result<()>;

    fn put_str(&mut self, pos: Pos, text: &str, role: Role) {
        let (width, _) = self.size();
        let mut x = pos.x;
        for ch in text.chars() {
            if x >= width - 1 {
                break;
            }
            self.put(Pos::new(x, pos.y), ch, role);
            x += UnicodeWidthChar::width(ch).unwrap_or(0).max(1) as i32;
        }
    }

    fn put_centered(&mut self, y: i32, text: &str, role: Role) {
        let (width, _) = self.size();
        let x = ((width - UnicodeWidthStr::width(text) as i32) / 2).max(0);
        self.put_str(Pos::new(x, y), text, role);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    role: Role,
}

const BLANK: Cell = Cell {
    ch: ' ',
    role: Role::Text,
};

pub struct TermSurface<W: Write> {
    out: W,
    width: i32,
    height: i32,
    next: Vec<Cell>,
    last: Vec<Cell>,
    needs_full: bool,
    colors: bool,
}

impl<W: Write> TermSurface<W> {
    pub fn new(out: W, width: u16, height: u16) -> Self {
        let cells = width as usize * height as usize;
        Self {
            out,
            width: width as i32,
            height: height as i32,
            next: vec![BLANK; cells],
            last: vec![BLANK; cells],
            needs_full: true,
            colors: crossterm::style::available_color_count() >= 8,
        }
    }

    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    fn draw_cell(&mut self, x: i32, y: i32, cell: Cell) -> io::Result<()> {
        self.out.queue(MoveTo(x as u16, y as u16))?;
        if self.colors {
            self.out.queue(SetForegroundColor(cell.role.color()))?;
        }
        if cell.role.bold() {
            self.out.queue(SetAttribute(Attribute::Bold))?;
        }
        self.out.queue(Print(cell.ch))?;
        if UnicodeWidthChar::width(cell.ch).unwrap_or(0) < 1 {
            self.out.queue(Print(' '))?;
        }
        if cell.role.bold() {
            self.out.queue(SetAttribute(Attribute::Reset))?;
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }
}

impl<W: Write> Surface for TermSurface<W> {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn put(&mut self, pos: Pos, ch: char, role: Role) {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return;
        }
        let idx = (pos.y * self.width + pos.x) as usize;
        self.next[idx] = Cell { ch, role };
    }

    fn clear(&mut self) {
        self.next.fill(BLANK);
    }

    fn present(&mut self) -> io::Result<()> {
        if self.needs_full {
            self.out.queue(Clear(ClearType::All))?;
        }
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = (y * self.width + x) as usize;
                let cell = self.next[idx];
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(x, y, cell)?;
                }
            }
        }
        self.needs_full = false;
        self.out.flush()
    }
}

/// Snake flash phase; toggles every `FLASH_INTERVAL_S` while any effect runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flasher {
    on: bool,
    last_toggle: f64,
}

impl Flasher {
    pub fn phase(&mut self, active: bool, now: f64) -> bool {
        if !active {
            self.on = false;
            return false;
        }
        if now - self.last_toggle >= FLASH_INTERVAL_S {
            self.on = !self.on;
            self.last_toggle = now;
        }
        self.on
    }
}

pub fn status_line(session: &Session) -> String {
    format!(
        "Score: {} | Speed: {}ms | Len: {}",
        session.field.score,
        session.timeout,
        session.field.snake.len()
    )
}

/// `Name: 12.3s` for each timed effect, sorted.
pub fn countdown_lines(session: &Session, now: f64) -> Vec<String> {
    let mut lines: Vec<String> = session
        .effects
        .active
        .iter()
        .filter(|e| e.kind().shows_countdown() && e.remaining(now) > 0.0)
        .map(|e| format!("{}: {:.1}s", e.kind().name(), e.remaining(now)))
        .collect();
    lines.sort();
    lines
}

pub fn draw_session(surface: &mut impl Surface, session: &Session, flash: &mut Flasher, now: f64) {
    surface.clear();
    let (_, height) = surface.size();
    let field = &session.field;
    let maze_walls = session.effects.maze_walls();
    let maze_active = !maze_walls.is_empty();

    surface.put_str(Pos::new(1, 0), &status_line(session), Role::Text);
    for (row, line) in countdown_lines(session, now).iter().enumerate() {
        let y = row as i32 + 1;
        if y >= height - 1 {
            break;
        }
        surface.put_str(Pos::new(1, y), line, Role::Text);
    }

    for effect in &session.effects.active {
        match &effect.data {
            EffectData::Maze { maze, .. } => {
                for &wall in &maze.walls {
                    surface.put(wall, WALL_SYMBOL, Role::MazeWall);
                }
            }
            EffectData::Balls { balls } => {
                for ball in balls {
                    surface.put(ball.pos, BALL_SYMBOL, Role::Ball);
                }
            }
            EffectData::Enemy(enemy) => {
                for &seg in &enemy.segments {
                    surface.put(seg, ENEMY_SYMBOL, Role::Enemy);
                }
            }
            EffectData::Obstacles { blocks } => {
                for &block in blocks {
                    surface.put(block, OBSTACLE_SYMBOL, Role::Obstacle);
                }
            }
            EffectData::Meteors { meteors } => {
                for meteor in meteors {
                    surface.put(meteor.pos, METEOR_SYMBOL, Role::Meteor);
                }
            }
            EffectData::MultiFood { .. }
            | EffectData::ThickSnake
            | EffectData::MaxSpeed { .. } => {}
        }
    }

    if maze_active {
        for &food in &field.maze_food {
            surface.put(food, FOOD_SYMBOL, Role::MazeFood);
        }
    } else {
        for &food in &field.foods {
            surface.put(food, FOOD_SYMBOL, Role::Food);
        }
    }
    for pickup in &field.pickups {
        if !maze_walls.contains(&pickup.pos) {
            surface.put(pickup.pos, PICKUP_SYMBOL, Role::Pickup(pickup.kind));
        }
    }

    // the maze colour wins over flashing
    let flashing = flash.phase(!session.effects.active.is_empty() && !maze_active, now);
    let snake_role = if flashing {
        Role::SnakeFlash
    } else if maze_active {
        Role::SnakeInMaze
    } else {
        Role::Snake
    };
    let thick = session.effects.thick_active();
    for (i, &seg) in field.snake.iter().enumerate() {
        surface.put(seg, SNAKE_SYMBOL, snake_role);
        if !thick {
            continue;
        }
        let behind = field.snake.get(i + 1).copied();
        if let Some(extra) = behind.and_then(|b| thick_offset(seg, b)) {
            if field.board.is_interior(extra) && !field.snake.contains(&extra) {
                surface.put(extra, THICK_SYMBOL, Role::Snake);
            }
        }
    }

    if let Some(notice) = session.notice(now) {
        let role = if notice.failure { Role::Alert } else { Role::Notice };
        surface.put_centered(height / 2, &notice.text, role);
    }
}

pub fn draw_paused(surface: &mut impl Surface) {
    let (_, height) = surface.size();
    surface.put_centered(height / 2, "PAUSED - Press 'p' to resume", Role::Notice);
}

/// Final score, the table and a trailing prompt line.
pub fn draw_game_over(surface: &mut impl Surface, score: u32, scores: &Scoreboard, prompt: &str) {
    surface.clear();
    let (_, height) = surface.size();
    let top = (height / 2 - 5).max(0);
    surface.put_centered(top, "GAME OVER", Role::Alert);
    surface.put_centered(top + 1, &format!("Final Score: {}", score), Role::Text);
    surface.put_centered(top + 3, "--- High Scores ---", Role::Notice);
    if scores.is_empty() {
        surface.put_centered(top + 4, "No high scores yet!", Role::Text);
    }
    for (i, entry) in scores.entries.iter().enumerate() {
        let line = format!("{}. {:<10} {:>6}", i + 1, entry.name, entry.score);
        surface.put_centered(top + 4 + i as i32, &line, Role::Text);
    }
    surface.put_centered(top + 11, prompt, Role::Notice);
}
