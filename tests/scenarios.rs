use power_snake::config::{Difficulty, MIN_TIMEOUT_MS, SCORE_ENEMY_SPLIT, SCORE_FOOD};
use power_snake::effects::{Effect, EffectData, EnemySnake, PowerUpKind};
use power_snake::geometry::{Board, Dir, Pos};
use power_snake::session::Session;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn cells(list: &[(i32, i32)]) -> Vec<Pos> {
    list.iter().map(|&(x, y)| Pos::new(x, y)).collect()
}

#[test]
fn eating_food_grows_and_respawns() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut s = Session::with_snake(
        Board::new(20, 20),
        Difficulty::Medium,
        cells(&[(5, 5), (4, 5), (3, 5)]),
        Dir::Right,
        0.0,
    );
    s.field.foods = vec![Pos::new(6, 5)];

    let report = s.tick(None, 0.1, &mut rng);

    assert!(report.ate_food && !report.tail_popped);
    assert_eq!(s.field.snake, cells(&[(6, 5), (5, 5), (4, 5), (3, 5)]));
    assert_eq!(s.score(), SCORE_FOOD);
    assert_eq!(s.field.foods.len(), 1);
    assert_ne!(s.field.foods[0], Pos::new(6, 5));
    assert!(!s.field.snake.contains(&s.field.foods[0]));
}

#[test]
fn running_into_enemy_body_splits_it() {
    let mut rng = StdRng::seed_from_u64(22);
    let mut s = Session::with_snake(
        Board::new(20, 20),
        Difficulty::Medium,
        cells(&[(2, 3), (3, 3), (4, 3)]),
        Dir::Left,
        0.0,
    );
    s.effects.active.push(Effect {
        start_time: 0.0,
        end_time: 30.0,
        data: EffectData::Enemy(EnemySnake {
            segments: cells(&[(2, 2), (2, 3), (2, 4)]),
            target: Pos::new(2, 3),
            move_every: 2,
            ticks: 0,
            fresh: false,
        }),
    });

    let report = s.tick(None, 0.1, &mut rng);

    assert!(report.split_growth && !report.tail_popped);
    assert_eq!(s.score(), SCORE_ENEMY_SPLIT);
    assert_eq!(s.field.snake.len(), 4);
    let enemies: Vec<Vec<Pos>> = s
        .effects
        .active
        .iter()
        .filter_map(|e| match &e.data {
            EffectData::Enemy(enemy) => Some(enemy.segments.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(enemies, vec![cells(&[(2, 2)]), cells(&[(2, 3), (2, 4)])]);
}

#[test]
fn split_halves_do_not_bite_before_their_first_step() {
    let mut rng = StdRng::seed_from_u64(25);
    let mut s = Session::with_snake(
        Board::new(20, 20),
        Difficulty::Medium,
        cells(&[(2, 3), (3, 3), (4, 3), (5, 3), (6, 3)]),
        Dir::Left,
        0.0,
    );
    s.effects.active.push(Effect {
        start_time: 0.0,
        end_time: 30.0,
        data: EffectData::Enemy(EnemySnake {
            segments: cells(&[(2, 2), (2, 3), (2, 4)]),
            target: Pos::new(2, 3),
            move_every: 2,
            ticks: 0,
            fresh: false,
        }),
    });

    let report = s.tick(None, 0.1, &mut rng);
    assert!(report.split_growth);
    assert_eq!(s.field.snake.len(), 6);

    // the back half still sits on the player's neck
    let report = s.tick(Some(Dir::Down), 0.2, &mut rng);
    assert!(!report.game_over);
    assert_eq!(s.field.snake.len(), 6);
    assert_eq!(s.field.snake[0], Pos::new(1, 4));
}

#[test]
fn failed_obstacles_cost_a_quarter_of_the_snake() {
    let mut rng = StdRng::seed_from_u64(23);
    let snake: Vec<Pos> = (1..=4)
        .flat_map(|y| (1..=4).map(move |x| Pos::new(x, y)))
        .take(15)
        .collect();
    let mut s = Session::with_snake(Board::new(6, 6), Difficulty::Medium, snake, Dir::Right, 0.0);
    s.field.score = 4;

    assert!(s.activate(PowerUpKind::Obstacles, 0.0, &mut rng).is_err());
    assert_eq!(s.field.snake.len(), 11);
    assert_eq!(s.score(), 0);
    assert!(!s.effects.has_kind(PowerUpKind::Obstacles));
}

#[test]
fn speed_restores_after_last_overlapping_boost() {
    let mut rng = StdRng::seed_from_u64(24);
    let mut s = Session::with_snake(
        Board::new(40, 20),
        Difficulty::Hard,
        cells(&[(10, 10), (9, 10), (8, 10)]),
        Dir::Right,
        0.0,
    );
    let base = s.timeout;
    s.activate(PowerUpKind::MaxSpeed, 0.0, &mut rng).unwrap();
    s.activate(PowerUpKind::MaxSpeed, 3.0, &mut rng).unwrap();
    assert_eq!(s.timeout, MIN_TIMEOUT_MS);

    // first boost ends at 5s, second at 8s; snake turns to stay on the board
    s.tick(Some(Dir::Down), 5.5, &mut rng);
    assert_eq!(s.timeout, MIN_TIMEOUT_MS);
    s.tick(None, 8.5, &mut rng);
    assert_eq!(s.timeout, base);
}

proptest! {
    #[test]
    fn tail_pops_unless_something_was_eaten(
        seed in any::<u64>(),
        turns in proptest::collection::vec(0usize..5, 1..40),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut s = Session::new(Board::new(30, 20), Difficulty::Easy, 0.0, &mut rng);
        for (i, t) in turns.iter().enumerate() {
            let turn = Dir::ALL.get(*t).copied();
            let before = s.field.snake.len();
            let report = s.tick(turn, i as f64 * 0.1, &mut rng);
            if report.game_over {
                break;
            }
            let grew = report.ate_food || report.pickup.is_some() || report.split_growth;
            prop_assert_eq!(report.tail_popped, !grew);
            if grew {
                prop_assert_eq!(s.field.snake.len(), before + 1);
            } else {
                prop_assert_eq!(s.field.snake.len(), before);
            }
        }
    }
}
