//! Terminal snake with timed power-ups.
//!
//! The [`session::Session`] owns all game state and advances it one tick at
//! a time; [`effects`] holds the active power-up effects and their per-tick
//! simulation, [`activation`] creates them. Everything terminal-facing lives
//! in [`render`], [`input`] and [`app`].

pub mod activation;
pub mod app;
pub mod config;
pub mod effects;
pub mod geometry;
pub mod input;
pub mod maze;
pub mod render;
pub mod scoreboard;
pub mod session;
