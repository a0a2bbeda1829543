//! Timed power-up effects and the per-tick update pass.
//!
//! Every active effect is an [`Effect`] with an absolute end time and a
//! kind-specific payload. [`Effects::update`] runs once per tick: it expires
//! effects (restoring the shared timeout where needed), moves balls, meteors
//! and enemy snakes, resolves their collisions with the player, and returns
//! the aggregate hazard state the movement core reads afterwards.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::*;
use crate::geometry::{place_item, Footprint, Occupied, Pos};
use crate::maze::Maze;
use crate::session::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    MultiFood,
    Balls,
    ThickSnake,
    MaxSpeed,
    Enemy,
    Obstacles,
    Meteors,
    Maze,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 8] = [
        PowerUpKind::MultiFood,
        PowerUpKind::Balls,
        PowerUpKind::ThickSnake,
        PowerUpKind::MaxSpeed,
        PowerUpKind::Enemy,
        PowerUpKind::Obstacles,
        PowerUpKind::Meteors,
        PowerUpKind::Maze,
    ];

    pub fn id(self) -> u8 {
        match self {
            PowerUpKind::MultiFood => 1,
            PowerUpKind::Balls => 2,
            PowerUpKind::ThickSnake => 3,
            PowerUpKind::MaxSpeed => 4,
            PowerUpKind::Enemy => 5,
            PowerUpKind::Obstacles => 6,
            PowerUpKind::Meteors => 7,
            PowerUpKind::Maze => 8,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        PowerUpKind::ALL.iter().copied().find(|k| k.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            PowerUpKind::MultiFood => "Multi-Food & Slowdown",
            PowerUpKind::Balls => "Bouncing Balls",
            PowerUpKind::ThickSnake => "Thick Snake",
            PowerUpKind::MaxSpeed => "MAX SPEED",
            PowerUpKind::Enemy => "Enemy Snake",
            PowerUpKind::Obstacles => "Obstacle Blocks",
            PowerUpKind::Meteors => "Meteor Rain",
            PowerUpKind::Maze => "Wide Maze",
        }
    }

    /// Obstacles last long enough that a countdown is just noise.
    pub fn shows_countdown(self) -> bool {
        self != PowerUpKind::Obstacles
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        *PowerUpKind::ALL.choose(rng).unwrap_or(&PowerUpKind::MultiFood)
    }
}

/// A ball or meteor: a cell plus a per-tick velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mover {
    pub pos: Pos,
    pub vel: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnemySnake {
    /// Head first.
    pub segments: Vec<Pos>,
    pub target: Pos,
    /// Moves on every `move_every`-th tick.
    pub move_every: u32,
    pub ticks: u32,
    /// Split offspring that has not stepped yet; it cannot bite the player.
    pub fresh: bool,
}

#[derive(Debug, Clone)]
pub enum EffectData {
    MultiFood { original_timeout: u64 },
    Balls { balls: Vec<Mover> },
    ThickSnake,
    MaxSpeed { original_timeout: u64 },
    Enemy(EnemySnake),
    Obstacles { blocks: HashSet<Pos> },
    Meteors { meteors: Vec<Mover> },
    Maze { maze: Maze, original_timeout: u64 },
}

#[derive(Debug, Clone)]
pub struct Effect {
    pub start_time: f64,
    pub end_time: f64,
    pub data: EffectData,
}

impl Effect {
    pub fn kind(&self) -> PowerUpKind {
        match self.data {
            EffectData::MultiFood { .. } => PowerUpKind::MultiFood,
            EffectData::Balls { .. } => PowerUpKind::Balls,
            EffectData::ThickSnake => PowerUpKind::ThickSnake,
            EffectData::MaxSpeed { .. } => PowerUpKind::MaxSpeed,
            EffectData::Enemy(_) => PowerUpKind::Enemy,
            EffectData::Obstacles { .. } => PowerUpKind::Obstacles,
            EffectData::Meteors { .. } => PowerUpKind::Meteors,
            EffectData::Maze { .. } => PowerUpKind::Maze,
        }
    }

    /// Timeout recorded before the first activation of this timeout class.
    pub fn original_timeout(&self) -> Option<u64> {
        match self.data {
            EffectData::MultiFood { original_timeout }
            | EffectData::MaxSpeed { original_timeout }
            | EffectData::Maze {
                original_timeout, ..
            } => Some(original_timeout),
            _ => None,
        }
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.end_time
    }

    pub fn remaining(&self, now: f64) -> f64 {
        self.end_time - now
    }
}

impl Footprint for Effect {
    fn mark(&self, occupied: &mut HashSet<Pos>) {
        match &self.data {
            EffectData::Balls { balls: movers } | EffectData::Meteors { meteors: movers } => {
                occupied.extend(movers.iter().map(|m| m.pos));
            }
            EffectData::Enemy(enemy) => enemy.segments.mark(occupied),
            EffectData::Obstacles { blocks } => blocks.mark(occupied),
            EffectData::Maze { maze, .. } => maze.walls.mark(occupied),
            _ => {}
        }
    }
}

/// Aggregate state handed back to the movement core after an update pass.
#[derive(Debug, Clone, Default)]
pub struct EffectSummary {
    pub timeout: u64,
    pub any_active: bool,
    pub thick: bool,
    pub obstacles: HashSet<Pos>,
    pub maze_walls: HashSet<Pos>,
    pub maze_active: bool,
    /// Player hit an enemy body this tick and keeps its tail.
    pub grew_from_split: bool,
    /// Enemies destroyed head-on this tick.
    pub enemies_destroyed: u32,
}

enum EnemyOutcome {
    Moved,
    Fractured,
    Exploded,
    Split(usize),
    Vanished,
}

#[derive(Debug, Clone)]
pub struct Effects {
    pub active: Vec<Effect>,
    /// Balls spawned per activation; grows with every ball pickup.
    pub ball_count: u32,
    pub multi_food_count: u32,
    pub last_multi_food_decay: f64,
}

impl Footprint for Effects {
    fn mark(&self, occupied: &mut HashSet<Pos>) {
        for effect in &self.active {
            effect.mark(occupied);
        }
    }
}

impl Effects {
    pub fn new(now: f64) -> Self {
        Self {
            active: Vec::new(),
            ball_count: 0,
            multi_food_count: MULTI_FOOD_START_COUNT,
            last_multi_food_decay: now,
        }
    }

    pub fn has_kind(&self, kind: PowerUpKind) -> bool {
        self.active.iter().any(|e| e.kind() == kind)
    }

    pub fn thick_active(&self) -> bool {
        self.has_kind(PowerUpKind::ThickSnake)
    }

    pub fn maze_active(&self) -> bool {
        self.active
            .iter()
            .any(|e| matches!(&e.data, EffectData::Maze { maze, .. } if !maze.walls.is_empty()))
    }

    pub fn obstacles(&self) -> HashSet<Pos> {
        let mut cells = HashSet::new();
        for effect in &self.active {
            if let EffectData::Obstacles { blocks } = &effect.data {
                cells.extend(blocks.iter().copied());
            }
        }
        cells
    }

    pub fn maze_walls(&self) -> HashSet<Pos> {
        let mut cells = HashSet::new();
        for effect in &self.active {
            if let EffectData::Maze { maze, .. } = &effect.data {
                cells.extend(maze.walls.iter().copied());
            }
        }
        cells
    }

    /// Pre-activation timeout already held by a live effect of `kind`, if any.
    pub fn timeout_origin(&self, kind: PowerUpKind, now: f64) -> Option<u64> {
        self.active
            .iter()
            .filter(|e| e.kind() == kind && !e.is_expired(now))
            .find_map(Effect::original_timeout)
    }

    pub fn summary(&self, timeout: u64) -> EffectSummary {
        let maze_walls = self.maze_walls();
        EffectSummary {
            timeout: clamp_timeout(timeout),
            any_active: !self.active.is_empty(),
            thick: self.thick_active(),
            obstacles: self.obstacles(),
            maze_active: !maze_walls.is_empty(),
            maze_walls,
            grew_from_split: false,
            enemies_destroyed: 0,
        }
    }

    pub fn update(
        &mut self,
        field: &mut Field,
        timeout: u64,
        now: f64,
        rng: &mut impl Rng,
    ) -> EffectSummary {
        let mut timeout = timeout;
        let mut removed: Vec<usize> = Vec::new();
        let mut offspring: Vec<Effect> = Vec::new();
        let mut grew_from_split = false;
        let mut enemies_destroyed = 0;

        if now - self.last_multi_food_decay > MULTI_FOOD_DECAY_S {
            if self.multi_food_count > 1 {
                self.multi_food_count -= 1;
            }
            self.last_multi_food_decay = now;
        }

        let maze_walls = self.maze_walls();

        for i in 0..self.active.len() {
            if self.active[i].is_expired(now) {
                removed.push(i);
                if let Some(original) = self.active[i].original_timeout() {
                    if !self.sibling_holds_timeout(i, now) {
                        timeout = clamp_timeout(original);
                        log::debug!(
                            "{} expired, timeout restored to {}ms",
                            self.active[i].kind().name(),
                            timeout
                        );
                    }
                }
                if let EffectData::Maze { .. } = self.active[i].data {
                    field.maze_food.clear();
                    if !field.snake.is_empty() {
                        let occupied = Occupied::new(&field.snake)
                            .with(&field.foods)
                            .with(field.pickups.as_slice());
                        let board = field.board;
                        if let Some(pos) = place_item(&board, &occupied, PLACEMENT_ATTEMPTS, rng) {
                            field.foods.push(pos);
                        }
                    }
                }
                continue;
            }

            let end_time = self.active[i].end_time;
            let start_time = self.active[i].start_time;
            let keep = match &mut self.active[i].data {
                EffectData::Balls { balls } => {
                    update_balls(balls, field, &maze_walls);
                    !balls.is_empty()
                }
                EffectData::Meteors { meteors } => {
                    update_meteors(meteors, field, &maze_walls);
                    !meteors.is_empty()
                }
                EffectData::Enemy(enemy) => match update_enemy(enemy, field, &maze_walls, rng) {
                    EnemyOutcome::Moved | EnemyOutcome::Fractured => true,
                    EnemyOutcome::Vanished => false,
                    EnemyOutcome::Exploded => {
                        for &seg in enemy.segments.iter().skip(1) {
                            if field.board.is_interior(seg) && !field.foods.contains(&seg) {
                                field.foods.push(seg);
                            }
                        }
                        enemies_destroyed += 1;
                        log::info!("enemy destroyed head-on");
                        false
                    }
                    EnemyOutcome::Split(at) => {
                        let move_every =
                            (enemy.move_every.max(1) * ENEMY_SPLIT_CADENCE).min(ENEMY_MAX_CADENCE);
                        let (front, back) = enemy.segments.split_at(at);
                        for part in [front, back] {
                            offspring.push(Effect {
                                start_time,
                                end_time,
                                data: EffectData::Enemy(EnemySnake {
                                    segments: part.to_vec(),
                                    target: enemy.target,
                                    move_every,
                                    ticks: 0,
                                    fresh: true,
                                }),
                            });
                        }
                        field.score += SCORE_ENEMY_SPLIT;
                        grew_from_split = true;
                        log::info!("enemy split at segment {}", at);
                        false
                    }
                },
                EffectData::MultiFood { .. }
                | EffectData::ThickSnake
                | EffectData::MaxSpeed { .. }
                | EffectData::Obstacles { .. }
                | EffectData::Maze { .. } => true,
            };
            if !keep {
                removed.push(i);
            }
        }

        for i in removed.into_iter().rev() {
            self.active.remove(i);
        }
        self.active.extend(offspring);

        EffectSummary {
            grew_from_split,
            enemies_destroyed,
            ..self.summary(timeout)
        }
    }

    fn sibling_holds_timeout(&self, index: usize, now: f64) -> bool {
        let kind = self.active[index].kind();
        self.active.iter().enumerate().any(|(j, other)| {
            j != index
                && other.kind() == kind
                && !other.is_expired(now)
                && other.original_timeout().is_some()
        })
    }
}

fn update_balls(balls: &mut Vec<Mover>, field: &mut Field, maze_walls: &HashSet<Pos>) {
    let board = field.board;
    balls.retain_mut(|ball| {
        let (mut vx, mut vy) = ball.vel;
        let mut next = ball.pos.offset(vx, vy);
        if next.x <= 0 || next.x >= board.width - 1 {
            vx = -vx;
            next.x = ball.pos.x;
        }
        if next.y <= 0 || next.y >= board.height - 1 {
            vy = -vy;
            next.y = ball.pos.y;
        }
        ball.vel = (vx, vy);

        // stop on maze walls, no bounce
        if maze_walls.contains(&next) {
            return true;
        }
        if field.snake.contains(&next) {
            field.shrink_with_penalty(PENALTY_BALL);
            return false;
        }
        ball.pos = next;
        true
    });
}

fn update_meteors(meteors: &mut Vec<Mover>, field: &mut Field, maze_walls: &HashSet<Pos>) {
    let board = field.board;
    meteors.retain_mut(|meteor| {
        let next = meteor.pos.offset(meteor.vel.0, meteor.vel.1);
        if next.x < 0 || next.x >= board.width || maze_walls.contains(&next) {
            return false;
        }
        meteor.pos = next;
        if field.snake.contains(&next) {
            field.shrink_with_penalty(PENALTY_METEOR);
            return false;
        }
        next.y < board.height
    });
}

fn update_enemy(
    enemy: &mut EnemySnake,
    field: &mut Field,
    maze_walls: &HashSet<Pos>,
    rng: &mut impl Rng,
) -> EnemyOutcome {
    if enemy.segments.is_empty() {
        return EnemyOutcome::Vanished;
    }
    let Some(&player_head) = field.snake.first() else {
        return EnemyOutcome::Moved;
    };

    enemy.ticks = enemy.ticks.wrapping_add(1);
    if enemy.ticks % enemy.move_every.max(1) == 0 {
        enemy.target = player_head;
        enemy.advance(maze_walls, rng);
    }

    let head = enemy.segments[0];
    if !enemy.fresh {
        if let Some(hit) = field.snake.iter().skip(1).position(|&p| p == head) {
            field.snake.truncate(hit + 1);
            log::info!("enemy bit the player, {} segments left", field.snake.len());
            return EnemyOutcome::Fractured;
        }
    }
    if head == player_head {
        return EnemyOutcome::Exploded;
    }
    if let Some(hit) = enemy.segments.iter().skip(1).position(|&p| p == player_head) {
        return EnemyOutcome::Split(hit + 1);
    }
    EnemyOutcome::Moved
}

impl EnemySnake {
    /// One step toward `target`: larger-distance axis first, an occasional
    /// perpendicular wobble, never straight back over the neck.
    fn advance(&mut self, maze_walls: &HashSet<Pos>, rng: &mut impl Rng) {
        let head = self.segments[0];
        let neck = self.segments.get(1).copied();
        let (dx, dy) = (self.target.x - head.x, self.target.y - head.y);

        let mut ideal = (dx.signum(), dy.signum());
        if ideal.0 != 0 && ideal.1 != 0 {
            if dx.abs() > dy.abs() {
                ideal.1 = 0;
            } else {
                ideal.0 = 0;
            }
        }

        let mut chosen = ideal;
        if rng.gen_bool(ENEMY_WOBBLE_CHANCE) {
            let mut options: Vec<(i32, i32)> = if ideal.0 != 0 {
                vec![(0, 1), (0, -1)]
            } else if ideal.1 != 0 {
                vec![(1, 0), (-1, 0)]
            } else {
                vec![(0, 1), (0, -1), (1, 0), (-1, 0)]
            };
            if let Some(neck) = neck {
                let back = (neck.x - head.x, neck.y - head.y);
                options.retain(|&o| o != back);
                if options.is_empty() {
                    options.push(back);
                }
            }
            if let Some(&wobble) = options.choose(rng) {
                chosen = wobble;
            }
        }
        if chosen == (0, 0) {
            return;
        }

        let mut next = head.offset(chosen.0, chosen.1);
        if maze_walls.contains(&next) && chosen != ideal && ideal != (0, 0) {
            next = head.offset(ideal.0, ideal.1);
        }
        if maze_walls.contains(&next) || Some(next) == neck {
            return;
        }

        self.segments.insert(0, next);
        self.fresh = false;
        if next != self.target {
            self.segments.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Board;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field(snake: &[(i32, i32)]) -> Field {
        let mut field = Field::new(Board::new(20, 20));
        field.snake = snake.iter().map(|&(x, y)| Pos::new(x, y)).collect();
        field
    }

    fn effect(end_time: f64, data: EffectData) -> Effect {
        Effect {
            start_time: 0.0,
            end_time,
            data,
        }
    }

    fn enemy(segments: &[(i32, i32)], move_every: u32) -> EffectData {
        EffectData::Enemy(EnemySnake {
            segments: segments.iter().map(|&(x, y)| Pos::new(x, y)).collect(),
            target: Pos::new(0, 0),
            move_every,
            ticks: 0,
            fresh: false,
        })
    }

    #[test]
    fn kind_ids_round_trip() {
        for kind in PowerUpKind::ALL {
            assert_eq!(PowerUpKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(PowerUpKind::from_id(0), None);
        assert_eq!(PowerUpKind::from_id(9), None);
    }

    #[test]
    fn last_expiring_sibling_restores_timeout() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(5, 5), (4, 5)]);
        let mut effects = Effects::new(0.0);
        effects
            .active
            .push(effect(5.0, EffectData::MaxSpeed { original_timeout: 100 }));
        effects
            .active
            .push(effect(7.0, EffectData::MaxSpeed { original_timeout: 100 }));

        let summary = effects.update(&mut field, MIN_TIMEOUT_MS, 5.5, &mut rng);
        assert_eq!(summary.timeout, MIN_TIMEOUT_MS);
        assert_eq!(effects.active.len(), 1);

        let summary = effects.update(&mut field, summary.timeout, 7.5, &mut rng);
        assert_eq!(summary.timeout, 100);
        assert!(!summary.any_active);
    }

    #[test]
    fn restore_is_clamped() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(5, 5)]);
        let mut effects = Effects::new(0.0);
        effects
            .active
            .push(effect(1.0, EffectData::MultiFood { original_timeout: 5_000 }));
        let summary = effects.update(&mut field, 120, 2.0, &mut rng);
        assert_eq!(summary.timeout, MAX_TIMEOUT_MS);
    }

    #[test]
    fn pausing_burns_effect_time() {
        // End times are wall-clock absolute: a long pause expires effects.
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(5, 5)]);
        let mut effects = Effects::new(0.0);
        effects.active.push(effect(10.0, EffectData::ThickSnake));
        assert!(effects.update(&mut field, 100, 1.0, &mut rng).thick);
        assert!(!effects.update(&mut field, 100, 100.0, &mut rng).thick);
    }

    #[test]
    fn ball_reflects_off_the_boundary() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(10, 10)]);
        let mut effects = Effects::new(0.0);
        let ball = Mover {
            pos: Pos::new(18, 5),
            vel: (1, 1),
        };
        effects
            .active
            .push(effect(8.0, EffectData::Balls { balls: vec![ball] }));
        effects.update(&mut field, 100, 0.1, &mut rng);
        let EffectData::Balls { balls } = &effects.active[0].data else {
            panic!("expected balls");
        };
        assert_eq!(balls[0].pos, Pos::new(18, 6));
        assert_eq!(balls[0].vel, (-1, 1));
    }

    #[test]
    fn ball_hitting_snake_shrinks_it_and_vanishes() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(6, 6), (5, 6), (4, 6)]);
        field.score = 3;
        let mut effects = Effects::new(0.0);
        let ball = Mover {
            pos: Pos::new(4, 5),
            vel: (1, 1),
        };
        effects
            .active
            .push(effect(8.0, EffectData::Balls { balls: vec![ball] }));
        effects.update(&mut field, 100, 0.1, &mut rng);
        assert_eq!(field.snake.len(), 2);
        assert_eq!(field.score, 0);
        assert!(effects.active.is_empty());
    }

    #[test]
    fn meteors_leave_through_the_bottom() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(2, 2)]);
        let mut effects = Effects::new(0.0);
        let meteor = Mover {
            pos: Pos::new(10, 19),
            vel: (0, 1),
        };
        effects.active.push(effect(
            7.0,
            EffectData::Meteors {
                meteors: vec![meteor],
            },
        ));
        effects.update(&mut field, 100, 0.1, &mut rng);
        assert!(effects.active.is_empty());
    }

    fn maze_with_wall(wall: Pos) -> Effect {
        let maze = Maze {
            walls: [wall].into_iter().collect(),
            ..Default::default()
        };
        effect(
            45.0,
            EffectData::Maze {
                maze,
                original_timeout: 100,
            },
        )
    }

    #[test]
    fn ball_holds_still_against_a_maze_wall() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(15, 15), (14, 15)]);
        let mut effects = Effects::new(0.0);
        effects.active.push(maze_with_wall(Pos::new(6, 6)));
        let ball = Mover {
            pos: Pos::new(5, 5),
            vel: (1, 1),
        };
        effects
            .active
            .push(effect(8.0, EffectData::Balls { balls: vec![ball] }));
        effects.update(&mut field, 100, 0.1, &mut rng);
        let EffectData::Balls { balls } = &effects.active[1].data else {
            panic!("expected balls");
        };
        assert_eq!(balls[0], ball);
    }

    #[test]
    fn meteor_is_discarded_by_a_maze_wall() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(15, 15), (14, 15)]);
        let mut effects = Effects::new(0.0);
        effects.active.push(maze_with_wall(Pos::new(6, 6)));
        let meteor = Mover {
            pos: Pos::new(6, 5),
            vel: (0, 1),
        };
        effects.active.push(effect(
            7.0,
            EffectData::Meteors {
                meteors: vec![meteor],
            },
        ));
        effects.update(&mut field, 100, 0.1, &mut rng);
        assert_eq!(effects.active.len(), 1);
        assert!(!effects.has_kind(PowerUpKind::Meteors));
    }

    #[test]
    fn meteor_hitting_snake_costs_a_tail_cell() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(10, 6), (11, 6), (12, 6)]);
        field.score = 5;
        let mut effects = Effects::new(0.0);
        let meteor = Mover {
            pos: Pos::new(10, 5),
            vel: (0, 1),
        };
        effects.active.push(effect(
            7.0,
            EffectData::Meteors {
                meteors: vec![meteor],
            },
        ));
        effects.update(&mut field, 100, 0.1, &mut rng);
        assert_eq!(field.snake, vec![Pos::new(10, 6), Pos::new(11, 6)]);
        assert_eq!(field.score, 5 - PENALTY_METEOR);
        assert!(effects.active.is_empty());
    }

    #[test]
    fn multi_food_count_decays_to_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(5, 5)]);
        let mut effects = Effects::new(0.0);
        assert_eq!(effects.multi_food_count, MULTI_FOOD_START_COUNT);

        let mut counts = Vec::new();
        for step in 1..=3 {
            let now = step as f64 * (MULTI_FOOD_DECAY_S + 1.0);
            effects.update(&mut field, 100, now, &mut rng);
            counts.push(effects.multi_food_count);
        }
        assert_eq!(counts, vec![2, 1, 1]);
    }

    #[test]
    fn enemy_head_on_player_body_fractures_player() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(5, 5), (4, 5), (3, 5), (2, 5)]);
        let mut effects = Effects::new(0.0);
        // held still this tick by its cadence, head already on the body
        effects.active.push(effect(30.0, enemy(&[(3, 5), (3, 6)], 2)));
        effects.update(&mut field, 100, 0.1, &mut rng);
        assert_eq!(field.snake, vec![Pos::new(5, 5), Pos::new(4, 5)]);
        assert_eq!(effects.active.len(), 1);
    }

    #[test]
    fn head_on_collision_explodes_enemy_into_food() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(5, 5), (4, 5)]);
        let mut effects = Effects::new(0.0);
        effects
            .active
            .push(effect(30.0, enemy(&[(5, 5), (5, 6), (5, 7), (5, 0)], 2)));
        let summary = effects.update(&mut field, 100, 0.1, &mut rng);
        assert_eq!(summary.enemies_destroyed, 1);
        assert!(effects.active.is_empty());
        // (5,0) sits on the boundary ring and does not become food
        assert_eq!(field.foods, vec![Pos::new(5, 6), Pos::new(5, 7)]);
    }

    #[test]
    fn player_head_on_enemy_body_splits_it() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(2, 3), (3, 3)]);
        let mut effects = Effects::new(0.0);
        effects
            .active
            .push(effect(30.0, enemy(&[(2, 2), (2, 3), (2, 4)], 2)));
        let summary = effects.update(&mut field, 100, 0.1, &mut rng);
        assert!(summary.grew_from_split);
        assert_eq!(field.score, SCORE_ENEMY_SPLIT);

        let parts: Vec<Vec<Pos>> = effects
            .active
            .iter()
            .filter_map(|e| match &e.data {
                EffectData::Enemy(enemy) => Some(enemy.segments.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            parts,
            vec![
                vec![Pos::new(2, 2)],
                vec![Pos::new(2, 3), Pos::new(2, 4)]
            ]
        );
        for e in &effects.active {
            assert_eq!(e.end_time, 30.0);
            if let EffectData::Enemy(enemy) = &e.data {
                assert_eq!(enemy.move_every, 2 * ENEMY_SPLIT_CADENCE);
            }
        }
    }

    #[test]
    fn enemy_steps_along_the_longer_axis() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut snake = EnemySnake {
            segments: vec![Pos::new(2, 2), Pos::new(1, 2)],
            target: Pos::new(12, 4),
            move_every: 1,
            ticks: 0,
            fresh: false,
        };
        let walls = HashSet::new();
        for _ in 0..6 {
            let before = snake.segments[0];
            let neck = snake.segments[1];
            snake.advance(&walls, &mut rng);
            let after = snake.segments[0];
            // single orthogonal step, never back onto the neck
            assert_eq!((after.x - before.x).abs() + (after.y - before.y).abs(), 1);
            assert_ne!(after, neck);
            assert_eq!(snake.segments.len(), 2);
        }
    }

    #[test]
    fn enemy_stops_at_maze_walls() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut snake = EnemySnake {
            segments: vec![Pos::new(5, 5)],
            target: Pos::new(9, 5),
            move_every: 1,
            ticks: 0,
            fresh: false,
        };
        let walls: HashSet<Pos> = [Pos::new(6, 5), Pos::new(5, 4), Pos::new(5, 6)]
            .into_iter()
            .collect();
        for _ in 0..20 {
            snake.advance(&walls, &mut rng);
            assert_eq!(snake.segments, vec![Pos::new(5, 5)]);
        }
    }

    #[test]
    fn fresh_split_half_cannot_bite() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = field(&[(5, 5), (4, 5), (3, 5), (2, 5)]);
        let mut effects = Effects::new(0.0);
        effects.active.push(effect(
            30.0,
            EffectData::Enemy(EnemySnake {
                segments: vec![Pos::new(3, 5), Pos::new(3, 6)],
                target: Pos::new(5, 5),
                move_every: 4,
                ticks: 0,
                fresh: true,
            }),
        ));
        effects.update(&mut field, 100, 0.1, &mut rng);
        assert_eq!(field.snake.len(), 4);
    }

    #[test]
    fn enemy_falls_back_to_the_ideal_step_when_wobbling_into_a_wall() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut snake = EnemySnake {
            segments: vec![Pos::new(5, 5), Pos::new(4, 5)],
            target: Pos::new(30, 5),
            move_every: 1,
            ticks: 0,
            fresh: false,
        };
        let walls: HashSet<Pos> = (0..40)
            .flat_map(|x| [Pos::new(x, 4), Pos::new(x, 6)])
            .collect();
        for _ in 0..20 {
            let before = snake.segments[0];
            snake.advance(&walls, &mut rng);
            assert_eq!(snake.segments[0], before.offset(1, 0));
            assert_eq!(snake.segments[1], before);
        }
    }
}
