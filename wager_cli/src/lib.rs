//! Terminal driver for the wager engine: command parsing, process
//! configuration, logging setup and the settle-timed game loop.

pub mod commands;
pub mod config;
pub mod driver;
pub mod logging;
