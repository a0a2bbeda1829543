//! Top-five high score table, persisted as `score,name` lines.

use std::fs;
use std::io;
use std::path::Path;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;
pub const MAX_NAME_LEN: usize = 10;
pub const DEFAULT_NAME: &str = "Anon";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub score: u32,
    pub name: String,
}

/// Sorted descending by score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub entries: Vec<ScoreEntry>,
}

/// Commas would break the line format; names are capped at ten characters.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .filter(|&c| c != ',' && !c.is_control())
        .take(MAX_NAME_LEN)
        .collect();
    if cleaned.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        cleaned
    }
}

impl Scoreboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Lines that are not `digits,name` are skipped.
    pub fn parse(text: &str) -> Self {
        let mut entries: Vec<ScoreEntry> = text
            .lines()
            .filter_map(|line| {
                let (score, name) = line.trim().split_once(',')?;
                let score = score.trim();
                if score.is_empty() || !score.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                Some(ScoreEntry {
                    score: score.parse().ok()?,
                    name: name.trim().chars().take(MAX_NAME_LEN).collect(),
                })
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .take(MAX_HIGH_SCORES)
            .map(|e| format!("{},{}\n", e.score, sanitize_name(&e.name)))
            .collect()
    }

    /// Missing or unreadable files give an empty table.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => {
                let board = Self::parse(&text);
                log::info!("loaded {} high scores from {}", board.entries.len(), path.display());
                board
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::new(),
            Err(e) => {
                log::warn!("could not read high scores from {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_text())?;
        log::info!("high scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Check if a score qualifies for the table
    pub fn qualifies(&self, score: u32) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Inserts the score if it qualifies and returns its 1-based rank.
    pub fn add(&mut self, score: u32, name: &str) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let entry = ScoreEntry {
            score,
            name: sanitize_name(name),
        };
        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
