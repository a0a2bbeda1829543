//! Power-up activation: builds the effect payload for each kind and
//! registers it, or reports why it could not.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::config::*;
use crate::effects::{Effect, EffectData, Effects, EnemySnake, Mover, PowerUpKind};
use crate::geometry::{place_item, Occupied, Pos};
use crate::maze::{generate_maze, Maze};
use crate::session::Field;

/// Why an activation was refused. The display text is shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    #[error("No room for balls")]
    NoRoomForBalls,
    #[error("Obstacle Fail! Penalty!")]
    ObstaclesFailed { placed: usize, wanted: usize },
    #[error("Maze Failed (Screen Size?)")]
    MazeTooSmall,
    #[error("Maze Failed (Generation Error)")]
    MazeGeneration,
    #[error("Nothing to power up")]
    NoSnake,
}

#[derive(Debug, Clone, Copy)]
pub struct ActivationContext {
    pub timeout: u64,
    pub difficulty: Difficulty,
    pub now: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activated {
    pub kind: PowerUpKind,
    pub timeout: u64,
    /// Caller must freeze the loop before the next tick.
    pub maze_started: bool,
}

const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const METEOR_DRIFT: [i32; 4] = [-1, 0, 0, 1];

impl Effects {
    /// Activates `kind`. On error no effect is registered and the timeout in
    /// `ctx` is left for the caller to keep; only a failed obstacle placement
    /// touches the field (score penalty and tail loss).
    pub fn activate(
        &mut self,
        kind: PowerUpKind,
        field: &mut Field,
        ctx: ActivationContext,
        rng: &mut impl Rng,
    ) -> Result<Activated, ActivationError> {
        if field.snake.is_empty() {
            return Err(ActivationError::NoSnake);
        }
        let now = ctx.now;
        let mut timeout = ctx.timeout;
        let mut maze_started = false;

        let (duration, data) = match kind {
            PowerUpKind::MultiFood => {
                let original_timeout = self.timeout_origin(kind, now).unwrap_or(timeout);
                let slowdown = (timeout as f64 * ctx.difficulty.slowdown()) as u64;
                timeout = clamp_timeout(timeout + slowdown);
                self.multi_food_count += 1;
                self.spawn_multi_food(field, rng);
                (
                    rng.gen_range(20.0..=40.0),
                    EffectData::MultiFood { original_timeout },
                )
            }
            PowerUpKind::Balls => {
                self.ball_count += 1;
                match self.spawn_balls(field, rng) {
                    Some(balls) => (8.0, EffectData::Balls { balls }),
                    None => {
                        self.ball_count -= 1;
                        return Err(ActivationError::NoRoomForBalls);
                    }
                }
            }
            PowerUpKind::ThickSnake => (10.0, EffectData::ThickSnake),
            PowerUpKind::MaxSpeed => {
                let original_timeout = self.timeout_origin(kind, now).unwrap_or(timeout);
                timeout = MIN_TIMEOUT_MS;
                (5.0, EffectData::MaxSpeed { original_timeout })
            }
            PowerUpKind::Enemy => (ENEMY_DURATION_S, EffectData::Enemy(spawn_enemy(field, rng))),
            PowerUpKind::Obstacles => (60.0, self.place_obstacles(field, rng)?),
            PowerUpKind::Meteors => {
                let meteors = spawn_meteors(field, rng);
                (7.0, EffectData::Meteors { meteors })
            }
            PowerUpKind::Maze => {
                let original_timeout = self.timeout_origin(kind, now).unwrap_or(timeout);
                let maze = build_maze(field, rng)?;
                timeout = clamp_timeout((timeout as f64 * MAZE_SLOWDOWN_FACTOR) as u64);
                maze_started = true;
                (
                    ctx.difficulty.maze_duration(),
                    EffectData::Maze {
                        maze,
                        original_timeout,
                    },
                )
            }
        };

        self.active.push(Effect {
            start_time: now,
            end_time: now + duration,
            data,
        });
        log::info!("activated {} for {:.1}s, timeout {}ms", kind.name(), duration, timeout);

        Ok(Activated {
            kind,
            timeout,
            maze_started,
        })
    }

    fn spawn_multi_food(&self, field: &mut Field, rng: &mut impl Rng) {
        field.foods.clear();
        let mut occupied = Occupied::new(&field.snake)
            .with(field.pickups.as_slice())
            .with(self);
        for _ in 0..self.multi_food_count {
            if let Some(pos) = place_item(&field.board, &occupied, PLACEMENT_ATTEMPTS, rng) {
                field.foods.push(pos);
                occupied.insert(pos);
            }
        }
    }

    fn spawn_balls(&self, field: &Field, rng: &mut impl Rng) -> Option<Vec<Mover>> {
        let mut occupied = Occupied::new(&field.snake)
            .with(&field.foods)
            .with(field.pickups.as_slice())
            .with(self);
        let mut balls = Vec::new();
        for _ in 0..self.ball_count {
            if let Some(pos) = place_item(&field.board, &occupied, PLACEMENT_ATTEMPTS, rng) {
                occupied.insert(pos);
                let vel = *DIAGONALS.choose(rng).unwrap_or(&(1, 1));
                balls.push(Mover { pos, vel });
            }
        }
        (!balls.is_empty()).then_some(balls)
    }

    fn place_obstacles(
        &self,
        field: &mut Field,
        rng: &mut impl Rng,
    ) -> Result<EffectData, ActivationError> {
        let wanted = (field.snake.len() / 2).max(1);
        let mut occupied = Occupied::new(&field.snake)
            .with(&field.foods)
            .with(field.pickups.as_slice())
            .with(self);
        let mut blocks = HashSet::new();
        for _ in 0..wanted {
            let spot = place_item(&field.board, &occupied, OBSTACLE_PLACEMENT_ATTEMPTS, rng);
            if let Some(pos) = spot {
                blocks.insert(pos);
                occupied.insert(pos);
            }
        }

        if blocks.len() < (wanted / 2).max(1) {
            let len = field.snake.len();
            let cut = len.div_ceil(4).max(1).min(len - 1);
            field.snake.truncate(len - cut);
            field.score = field.score.saturating_sub(PENALTY_OBSTACLE_FAIL);
            log::info!(
                "placed {} of {} obstacles, snake cut by {}",
                blocks.len(),
                wanted,
                cut
            );
            return Err(ActivationError::ObstaclesFailed {
                placed: blocks.len(),
                wanted,
            });
        }
        Ok(EffectData::Obstacles { blocks })
    }
}

/// Enters from a random edge aimed at the player's head, tail trailing off
/// the board.
fn spawn_enemy(field: &Field, rng: &mut impl Rng) -> EnemySnake {
    let board = field.board;
    let target = field.snake[0];
    let length = if rng.gen_bool(0.5) {
        ENEMY_LONG_LENGTH
    } else {
        (field.snake.len() * 2).max(3)
    };

    let (head, trail) = match rng.gen_range(0..4) {
        0 => (Pos::new(rng.gen_range(1..=board.width - 2), 0), (0, -1)),
        1 => (
            Pos::new(rng.gen_range(1..=board.width - 2), board.height - 1),
            (0, 1),
        ),
        2 => (Pos::new(0, rng.gen_range(1..=board.height - 2)), (-1, 0)),
        _ => (
            Pos::new(board.width - 1, rng.gen_range(1..=board.height - 2)),
            (1, 0),
        ),
    };
    let segments = (0..length as i32)
        .map(|i| head.offset(trail.0 * i, trail.1 * i))
        .collect();
    log::debug!("enemy of length {} enters at {:?}", length, head);

    EnemySnake {
        segments,
        target,
        move_every: 1,
        ticks: 0,
        fresh: false,
    }
}

fn spawn_meteors(field: &Field, rng: &mut impl Rng) -> Vec<Mover> {
    let width = field.board.width;
    let low = (width / 15).max(1);
    let high = (width / 10).max(3).max(low);
    let count = rng.gen_range(low..=high);
    (0..count)
        .map(|_| Mover {
            pos: Pos::new(rng.gen_range(1..=width - 2), 0),
            vel: (*METEOR_DRIFT.choose(rng).unwrap_or(&0), 1),
        })
        .collect()
}

fn build_maze(field: &mut Field, rng: &mut impl Rng) -> Result<Maze, ActivationError> {
    let board = field.board;
    let inner_h = board.height - 2;
    let inner_w = board.width - 2;
    if inner_h <= 0 || inner_w <= 0 {
        return Err(ActivationError::MazeTooSmall);
    }
    let max_cells = (inner_h * inner_w) as f64 * MAZE_AREA_FRACTION;
    if max_cells < (MAZE_CORRIDOR_WIDTH * MAZE_CORRIDOR_WIDTH * 9) as f64 {
        return Err(ActivationError::MazeTooSmall);
    }

    let aspect = inner_w as f64 / inner_h as f64;
    let approx_h = (max_cells / aspect).sqrt();
    let approx_w = aspect * approx_h;
    let target_h = inner_h.min((approx_h as i32).max(9));
    let target_w = inner_w.min((approx_w as i32).max(9));
    let offset_y = ((board.height - target_h) / 2).max(1);
    let offset_x = ((board.width - target_w) / 2).max(1);

    let maze = generate_maze(target_h, target_w, MAZE_CORRIDOR_WIDTH, rng);
    if maze.is_empty() {
        return Err(ActivationError::MazeGeneration);
    }
    let mut maze = maze.translate(offset_x, offset_y);
    maze.walls.remove(&field.snake[0]);

    field.pickups.clear();
    field.foods.clear();

    let taken: HashSet<Pos> = field.snake.iter().copied().collect();
    let mut free: Vec<Pos> = maze
        .paths
        .iter()
        .copied()
        .filter(|p| !taken.contains(p))
        .collect();
    free.sort();
    let count = (free.len() / MAZE_FOOD_DENSITY).max(1).min(free.len());
    field.maze_food = free.choose_multiple(rng, count).copied().collect();

    log::info!(
        "maze {}x{} at ({}, {}), {} path cells, {} food",
        target_w,
        target_h,
        offset_x,
        offset_y,
        maze.paths.len(),
        field.maze_food.len()
    );
    Ok(maze)
}
