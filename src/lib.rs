//! Neon Snake: a resumable arcade snake game.
//!
//! The engine (`game`, `session`, `app`) is independent of the terminal;
//! `renderer`, `ui` and `terminal_runtime` are the front end that draws it.

pub mod app;
pub mod config;
pub mod confirm;
pub mod food;
pub mod game;
pub mod input;
pub mod persistence;
pub mod renderer;
pub mod session;
pub mod snake;
pub mod terminal_runtime;
pub mod timer;
pub mod ui;
