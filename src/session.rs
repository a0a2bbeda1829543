//! One play session: the field, the effect registry and the tick.

use rand::Rng;

use crate::activation::{Activated, ActivationContext, ActivationError};
use crate::config::*;
use crate::effects::{Effects, PowerUpKind};
use crate::geometry::{place_item, step, thick_offset, Board, Dir, Footprint, Occupied, Pos};

const SECRET_PRESSES: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pickup {
    pub pos: Pos,
    pub kind: PowerUpKind,
}

impl Footprint for [Pickup] {
    fn mark(&self, occupied: &mut std::collections::HashSet<Pos>) {
        occupied.extend(self.iter().map(|p| p.pos));
    }
}

/// Everything on the board that effects read and mutate.
#[derive(Debug, Clone)]
pub struct Field {
    pub board: Board,
    /// Head first.
    pub snake: Vec<Pos>,
    pub foods: Vec<Pos>,
    pub maze_food: Vec<Pos>,
    pub pickups: Vec<Pickup>,
    pub score: u32,
}

impl Field {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            snake: Vec::new(),
            foods: Vec::new(),
            maze_food: Vec::new(),
            pickups: Vec::new(),
            score: 0,
        }
    }

    /// Hazard hit: lose the tail cell and some score. A one-cell snake is
    /// left alone.
    pub fn shrink_with_penalty(&mut self, penalty: u32) {
        if self.snake.len() > 1 {
            self.snake.pop();
            self.score = self.score.saturating_sub(penalty);
        }
    }
}

/// Transient message shown in the middle of the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub until: f64,
    pub failure: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub game_over: bool,
    pub tail_popped: bool,
    pub ate_food: bool,
    pub pickup: Option<PowerUpKind>,
    pub split_growth: bool,
    pub maze_started: bool,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub field: Field,
    pub effects: Effects,
    pub direction: Dir,
    pub timeout: u64,
    pub difficulty: Difficulty,
    pub notice: Option<Notice>,
    pub next_pickup_at: f64,
    secret_presses: u8,
}

impl Session {
    /// Three-cell snake heading right from the left quarter of the board,
    /// one food.
    pub fn new(board: Board, difficulty: Difficulty, now: f64, rng: &mut impl Rng) -> Self {
        let head = Pos::new(board.width / 4, board.height / 2);
        let snake = vec![head, head.offset(-1, 0), head.offset(-2, 0)];
        let mut session = Self::with_snake(board, difficulty, snake, Dir::Right, now);
        session.next_pickup_at = now + rng.gen_range(PICKUP_SPAWN_MIN_S..=PICKUP_SPAWN_MAX_S);
        session.spawn_food(rng);
        session
    }

    /// Session with a given snake and nothing else on the board.
    pub fn with_snake(
        board: Board,
        difficulty: Difficulty,
        snake: Vec<Pos>,
        direction: Dir,
        now: f64,
    ) -> Self {
        let mut field = Field::new(board);
        field.snake = snake;
        Self {
            field,
            effects: Effects::new(now),
            direction,
            timeout: difficulty.base_timeout(),
            difficulty,
            notice: None,
            next_pickup_at: now + PICKUP_SPAWN_MAX_S,
            secret_presses: 0,
        }
    }

    pub fn score(&self) -> u32 {
        self.field.score
    }

    pub fn maze_active(&self) -> bool {
        self.effects.maze_active()
    }

    pub fn notice(&self, now: f64) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| now < n.until)
    }

    fn set_notice(&mut self, text: impl Into<String>, duration: f64, failure: bool, now: f64) {
        self.notice = Some(Notice {
            text: text.into(),
            until: now + duration,
            failure,
        });
    }

    /// Activates `kind` and announces the outcome. On failure the timeout
    /// stays what it was before the attempt.
    pub fn activate(
        &mut self,
        kind: PowerUpKind,
        now: f64,
        rng: &mut impl Rng,
    ) -> Result<Activated, ActivationError> {
        let ctx = ActivationContext {
            timeout: self.timeout,
            difficulty: self.difficulty,
            now,
        };
        match self.effects.activate(kind, &mut self.field, ctx, rng) {
            Ok(done) => {
                self.timeout = done.timeout;
                let duration = if kind == PowerUpKind::Enemy {
                    ENEMY_NOTICE_DURATION_S
                } else {
                    NOTICE_DURATION_S
                };
                self.set_notice(format!("{}!", kind.name()), duration, false, now);
                Ok(done)
            }
            Err(err) => {
                log::warn!("{} failed: {}", kind.name(), err);
                self.set_notice(err.to_string(), NOTICE_DURATION_S, true, now);
                Err(err)
            }
        }
    }

    /// Counts a press of the secret key. The third press in a row starts the
    /// maze, unless one is already running. Returns true if a maze started.
    pub fn press_secret(&mut self, now: f64, rng: &mut impl Rng) -> bool {
        self.secret_presses += 1;
        if self.secret_presses < SECRET_PRESSES {
            return false;
        }
        self.secret_presses = 0;
        if self.maze_active() {
            return false;
        }
        log::info!("secret maze requested");
        matches!(
            self.activate(PowerUpKind::Maze, now, rng),
            Ok(Activated {
                maze_started: true,
                ..
            })
        )
    }

    pub fn reset_secret(&mut self) {
        self.secret_presses = 0;
    }

    /// Activates every kind once, in id order. Returns true if the maze
    /// started and the caller owes a freeze.
    pub fn self_test(&mut self, now: f64, rng: &mut impl Rng) -> bool {
        let mut maze_started = false;
        for kind in PowerUpKind::ALL {
            log::info!("self-test: activating {} ({})", kind.name(), kind.id());
            if let Ok(done) = self.activate(kind, now, rng) {
                maze_started |= done.maze_started;
            }
        }
        maze_started
    }

    pub fn tick(&mut self, turn: Option<Dir>, now: f64, rng: &mut impl Rng) -> TickReport {
        let mut report = TickReport::default();

        if let Some(dir) = turn {
            let neck = self.field.snake.get(1).copied();
            let head = self.field.snake.first().copied();
            let reverses = matches!((head, neck), (Some(h), Some(n)) if step(h, dir) == n);
            if !reverses {
                self.direction = dir;
            }
        }

        let summary = self
            .effects
            .update(&mut self.field, self.timeout, now, rng);
        self.timeout = summary.timeout;
        self.field.score += summary.enemies_destroyed * SCORE_ENEMY_HEAD;
        report.split_growth = summary.grew_from_split;

        let Some(&head) = self.field.snake.first() else {
            report.game_over = true;
            return report;
        };

        let next = step(head, self.direction);
        let board = self.field.board;
        if !board.is_interior(next)
            || self.field.snake[1..].contains(&next)
            || summary.obstacles.contains(&next)
            || summary.maze_walls.contains(&next)
        {
            log::info!("game over at {:?}, score {}", next, self.field.score);
            report.game_over = true;
            return report;
        }
        self.field.snake.insert(0, next);

        let mut mouth = vec![next];
        if summary.thick {
            if let Some(extra) = thick_offset(next, head) {
                mouth.push(extra);
            }
        }

        if summary.maze_active {
            if let Some(i) = self.field.maze_food.iter().position(|f| mouth.contains(f)) {
                self.field.maze_food.remove(i);
                self.field.score += SCORE_MAZE_FOOD;
                report.ate_food = true;
            }
        } else if let Some(i) = self.field.foods.iter().position(|f| mouth.contains(f)) {
            self.field.foods.remove(i);
            self.field.score += SCORE_FOOD;
            let cut = (self.timeout as f64 * self.difficulty.speed_increase()) as u64;
            self.timeout = clamp_timeout(self.timeout.saturating_sub(cut));
            self.spawn_food(rng);
            report.ate_food = true;
        }

        if !report.ate_food && !summary.maze_active {
            if let Some(i) = self.field.pickups.iter().position(|p| p.pos == next) {
                let pickup = self.field.pickups.remove(i);
                self.field.score += SCORE_POWERUP;
                report.pickup = Some(pickup.kind);
                if let Ok(done) = self.activate(pickup.kind, now, rng) {
                    report.maze_started = done.maze_started;
                }
            }
        }

        if !report.ate_food && report.pickup.is_none() && !report.split_growth {
            self.field.snake.pop();
            report.tail_popped = true;
        }
        if self.field.snake.is_empty() {
            report.game_over = true;
            return report;
        }

        if !self.maze_active() && now >= self.next_pickup_at {
            self.maybe_spawn_pickup(rng);
            self.next_pickup_at = now + rng.gen_range(PICKUP_SPAWN_MIN_S..=PICKUP_SPAWN_MAX_S);
        }

        report
    }

    fn spawn_food(&mut self, rng: &mut impl Rng) {
        let occupied = Occupied::new(&self.field.snake)
            .with(&self.field.foods)
            .with(&self.field.maze_food)
            .with(self.field.pickups.as_slice())
            .with(&self.effects);
        match place_item(&self.field.board, &occupied, PLACEMENT_ATTEMPTS, rng) {
            Some(pos) => self.field.foods.push(pos),
            None => log::debug!("no room for food this tick"),
        }
    }

    fn maybe_spawn_pickup(&mut self, rng: &mut impl Rng) {
        if self.field.pickups.len() >= MAX_PICKUPS || !rng.gen_bool(PICKUP_SPAWN_CHANCE) {
            return;
        }
        let occupied = Occupied::new(&self.field.snake)
            .with(&self.field.foods)
            .with(self.field.pickups.as_slice())
            .with(&self.effects);
        if let Some(pos) = place_item(&self.field.board, &occupied, PLACEMENT_ATTEMPTS, rng) {
            let kind = PowerUpKind::random(rng);
            log::debug!("pickup {} spawned at {:?}", kind.name(), pos);
            self.field.pickups.push(Pickup { pos, kind });
        }
    }
}
