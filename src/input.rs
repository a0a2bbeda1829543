//! Keyboard input: the per-tick key poll, blocking waits and name entry.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::geometry::{Dir, Pos};
use crate::render::{Role, Surface};
use crate::scoreboard::{sanitize_name, MAX_NAME_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Quit,
    Pause,
    Secret,
    Other,
}

impl Key {
    pub fn dir(self) -> Option<Dir> {
        match self {
            Key::Left => Some(Dir::Left),
            Key::Right => Some(Dir::Right),
            Key::Up => Some(Dir::Up),
            Key::Down => Some(Dir::Down),
            _ => None,
        }
    }
}

pub fn map_key(key: &KeyEvent) -> Key {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Key::Quit;
    }
    match key.code {
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Char('q') => Key::Quit,
        KeyCode::Char('p') => Key::Pause,
        KeyCode::Char('x') => Key::Secret,
        _ => Key::Other,
    }
}

fn pressed(event: Event) -> Option<KeyEvent> {
    match event {
        Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
            Some(key)
        }
        _ => None,
    }
}

/// Waits up to `timeout` for one key press. This wait is the tick cadence.
pub fn poll_key(timeout: Duration) -> io::Result<Option<Key>> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if !event::poll(remaining)? {
            return Ok(None);
        }
        if let Some(key) = pressed(event::read()?) {
            return Ok(Some(map_key(&key)));
        }
    }
}

pub fn wait_key() -> io::Result<Key> {
    loop {
        if let Some(key) = pressed(event::read()?) {
            return Ok(map_key(&key));
        }
    }
}

/// Discards keys typed while the game was not listening.
pub fn drain() -> io::Result<()> {
    while event::poll(Duration::ZERO)? {
        event::read()?;
    }
    Ok(())
}

/// Blocks until `y` (true) or `n`/`q` (false).
pub fn ask_yes_no() -> io::Result<bool> {
    loop {
        if let Some(key) = pressed(event::read()?) {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('q') => return Ok(false),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(false)
                }
                _ => {}
            }
        }
    }
}

/// Line editor for the high-score name, echoed on row `y`.
pub fn read_name(surface: &mut impl Surface, y: i32, prompt: &str) -> io::Result<String> {
    let mut name = String::new();
    loop {
        let line = format!("{}{}_", prompt, name);
        let (width, _) = surface.size();
        for x in 0..width {
            surface.put(Pos::new(x, y), ' ', Role::Text);
        }
        surface.put_centered(y, &line, Role::Notice);
        surface.present()?;

        let Some(key) = pressed(event::read()?) else {
            continue;
        };
        match key.code {
            KeyCode::Enter | KeyCode::Esc => break,
            KeyCode::Backspace => {
                name.pop();
            }
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && c != ','
                    && name.chars().count() < MAX_NAME_LEN =>
            {
                name.push(c);
            }
            _ => {}
        }
    }
    Ok(sanitize_name(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_game_actions() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(map_key(&key(KeyCode::Left)), Key::Left);
        assert_eq!(map_key(&key(KeyCode::Char('x'))), Key::Secret);
        assert_eq!(map_key(&key(KeyCode::Char('p'))), Key::Pause);
        assert_eq!(map_key(&key(KeyCode::Char('z'))), Key::Other);
        assert_eq!(
            map_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Key::Quit
        );
        assert_eq!(Key::Up.dir(), Some(Dir::Up));
        assert_eq!(Key::Pause.dir(), None);
    }
}
