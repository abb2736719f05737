//! Core type aliases, identifiers, and constants shared across the Mexican
//! Train workspace.
//!
//! ## Identity
//!
//! - [`ID`] — phantom-typed `uuid::Uuid` wrapper, one marker type per entity
//! - [`Unique`] — trait for domain values that carry an [`ID`]
//!
//! ## Configuration knobs
//!
//! Default values for match setup, countdowns, and AI scheduling. These are
//! the hard-coded fallbacks; [`mex-ai`](../mex_ai/index.html)'s `AiConfig` and
//! a future `MatchDefaults` loader may override them per deployment.
#![allow(dead_code)]

mod id;

pub use id::*;

/// Seat index around the table (0-based, stable for the lifetime of a match).
pub type Position = usize;
/// Pip count on one half of a tile.
pub type Pip = u8;
/// Per-player or per-round cumulative score.
pub type Score = i32;

/// Maximum pip value on a tile, i.e. the domino set is double-`P`.
pub const DEFAULT_MAX_PIP: Pip = 12;
/// Hard cap on seated players regardless of configuration.
pub const MAX_PLAYERS_HARD_CAP: usize = 8;
/// Minimum seated players to allow a match to start.
pub const DEFAULT_MIN_PLAYERS: usize = 2;
/// Default number of games in a match.
pub const DEFAULT_GAMES_PER_MATCH: usize = 13;
/// Default pre-start countdown, in minutes.
pub const DEFAULT_COUNTDOWN_MINUTES: u64 = 10;

/// Countdown scheduler tick interval.
pub const COUNTDOWN_TICK_SECS: u64 = 30;
/// Delay before an AI move is scheduled, for human perceptibility.
pub const AI_MOVE_DELAY_MS: u64 = 1_500;
/// Per-move timeout bound on a scheduled AI decision.
pub const AI_MOVE_TIMEOUT_SECS: u64 = 5;
/// Safety bound on consecutive AI turns triggered from one event.
pub const AI_LOOP_SAFETY_BOUND: usize = 10;
/// Absolute turn cap for a single game, guarding against rules-engine bugs.
pub const GAME_STALL_TURN_CAP: usize = 1_000;

/// Initializes structured logging for the server binary: INFO to the
/// terminal, DEBUG to a timestamped file under `logs/`.
#[cfg(feature = "server")]
pub fn init_logging() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Registers a Ctrl+C handler that exits immediately without waiting for
/// in-flight matches to complete — this core persists nothing, so there is
/// no graceful-drain state to preserve.
#[cfg(feature = "server")]
pub fn register_interrupt_handler() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("install ctrl-c handler");
        log::warn!("interrupt received, exiting");
        std::process::exit(0);
    });
}
