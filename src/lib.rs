//! `findash` library crate.
//!
//! The binary (`findash`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the request pipeline is shared by the one-shot CLI and the TUI
//! - code stays easy to navigate as the project grows

pub mod aggregate;
pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
