//! Terminal lifecycle and the outer game loop.

use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use rand::Rng;
use thiserror::Error;

use crate::config::*;
use crate::geometry::Board;
use crate::input::{self, Key};
use crate::render::{self, Flasher, Surface, TermSurface};
use crate::scoreboard::Scoreboard;
use crate::session::Session;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("terminal too small: need at least {min_w}x{min_h}, have {width}x{height}")]
    TerminalTooSmall {
        width: u16,
        height: u16,
        min_w: u16,
        min_h: u16,
    },
}

enum RoundEnd {
    Quit,
    GameOver(u32),
}

/// Monotonic seconds since the program started.
struct Clock(Instant);

impl Clock {
    fn now(&self) -> f64 {
        self.0.elapsed().as_secs_f64()
    }
}

pub fn run(settings: &Settings, self_test: bool) -> anyhow::Result<()> {
    let (width, height) = terminal::size()?;
    if width < MIN_TERM_W || height < MIN_TERM_H {
        return Err(StartupError::TerminalTooSmall {
            width,
            height,
            min_w: MIN_TERM_W,
            min_h: MIN_TERM_H,
        }
        .into());
    }

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = play(settings, self_test, width, height);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result.map_err(Into::into)
}

fn play(settings: &Settings, self_test: bool, width: u16, height: u16) -> io::Result<()> {
    let mut rng = rand::thread_rng();
    let clock = Clock(Instant::now());
    let mut surface = TermSurface::new(io::stdout(), width, height);
    log::info!(
        "starting on {}x{} at {} difficulty",
        width,
        height,
        settings.difficulty.name()
    );

    loop {
        let score = match play_round(&mut surface, settings, self_test, &clock, &mut rng)? {
            RoundEnd::Quit => return Ok(()),
            RoundEnd::GameOver(score) => score,
        };
        if !game_over(&mut surface, settings, score)? {
            return Ok(());
        }
        surface.invalidate();
    }
}

fn play_round(
    surface: &mut TermSurface<Stdout>,
    settings: &Settings,
    self_test: bool,
    clock: &Clock,
    rng: &mut impl Rng,
) -> io::Result<RoundEnd> {
    let (width, height) = surface.size();
    let board = Board::new(width, height);
    let mut session = Session::new(board, settings.difficulty, clock.now(), rng);
    let mut flash = Flasher::default();

    if self_test && session.self_test(clock.now(), rng) {
        freeze(surface, &session, &mut flash, clock)?;
    }

    loop {
        let mut turn = None;
        let mut maze_started = false;
        match input::poll_key(Duration::from_millis(session.timeout))? {
            Some(Key::Quit) => return Ok(RoundEnd::Quit),
            Some(Key::Pause) => {
                render::draw_paused(surface);
                surface.present()?;
                loop {
                    match input::wait_key()? {
                        Key::Pause => break,
                        Key::Quit => return Ok(RoundEnd::Quit),
                        _ => {}
                    }
                }
            }
            Some(Key::Secret) => maze_started = session.press_secret(clock.now(), rng),
            Some(key) => {
                session.reset_secret();
                turn = key.dir();
            }
            None => {}
        }

        let report = session.tick(turn, clock.now(), rng);
        if report.game_over {
            return Ok(RoundEnd::GameOver(session.score()));
        }

        if maze_started || report.maze_started {
            freeze(surface, &session, &mut flash, clock)?;
        } else {
            render::draw_session(surface, &session, &mut flash, clock.now());
            surface.present()?;
        }
    }
}

/// Shows the fresh maze, holds still, then throws away buffered keys.
fn freeze(
    surface: &mut TermSurface<Stdout>,
    session: &Session,
    flash: &mut Flasher,
    clock: &Clock,
) -> io::Result<()> {
    render::draw_session(surface, session, flash, clock.now());
    surface.present()?;
    thread::sleep(Duration::from_secs(MAZE_FREEZE_S));
    input::drain()
}

/// Returns whether to play again.
fn game_over(
    surface: &mut TermSurface<Stdout>,
    settings: &Settings,
    score: u32,
) -> io::Result<bool> {
    input::drain()?;
    let path = settings.highscore_path.as_path();
    let mut scores = Scoreboard::load(path);

    if scores.qualifies(score) {
        render::draw_game_over(surface, score, &scores, "New high score!");
        let (_, height) = surface.size();
        let name = input::read_name(surface, height / 2 + 7, "Enter name: ")?;
        if let Some(rank) = scores.add(score, &name) {
            log::info!("{} placed #{} with {}", name, rank, score);
        }
        if let Err(e) = scores.save(path) {
            log::warn!("could not save high scores to {}: {}", path.display(), e);
        }
    }

    render::draw_game_over(surface, score, &scores, "Play Again? (y/n)");
    surface.present()?;
    input::ask_yes_no()
}
