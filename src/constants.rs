//! Constants for board dimensions, search parameters, and action sampling.
//!
//! This module contains the default configuration for the engine. Every value
//! here can be overridden at runtime through [`crate::mcts::SearchConfig`] or
//! [`crate::game::GameState::new`]; these are only the starting points.
//!
//! # Board Size Configuration
//!
//! The default board size is controlled by Cargo features:
//! - `board9x9` (default): 9x9 board
//! - `board13x13`: 13x13 board
//!
//! ```sh
//! cargo build                                              # 9x9 (default)
//! cargo build --no-default-features --features board13x13  # 13x13
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board size (NxN) used by the binary and `GameState::default()`.
#[cfg(feature = "board9x9")]
pub const DEFAULT_BOARD_SIZE: usize = 9;

#[cfg(feature = "board13x13")]
pub const DEFAULT_BOARD_SIZE: usize = 13;

// Compile-time check: exactly one board size feature must be enabled
#[cfg(all(feature = "board9x9", feature = "board13x13"))]
compile_error!("Cannot enable both 'board9x9' and 'board13x13' features at the same time");

#[cfg(not(any(feature = "board9x9", feature = "board13x13")))]
compile_error!("Must enable exactly one board size feature: 'board9x9' or 'board13x13'");

/// Consecutive passes that end the game.
pub const PASSES_TO_END: u32 = 2;

// =============================================================================
// MCTS (Monte Carlo Tree Search) Parameters
// =============================================================================

/// Default number of simulations per move.
pub const N_SIMS: usize = 800;

/// Default PUCT exploration constant.
pub const C_PUCT: f64 = 1.0;

/// Dirichlet concentration for root noise.
pub const DIRICHLET_ALPHA: f64 = 0.03;

/// Fraction of the root prior replaced by Dirichlet noise.
pub const DIRICHLET_EPSILON: f64 = 0.25;

/// Rollouts stop after `ROLLOUT_DEPTH_FACTOR * n * n` plies.
pub const ROLLOUT_DEPTH_FACTOR: usize = 2;

/// Tolerance used when checking that a probability vector sums to one.
pub const PROB_TOLERANCE: f64 = 1e-4;

// =============================================================================
// Move Selection (Temperature Schedule)
// =============================================================================

/// Default temperature applied to root visit counts by `search`.
pub const TEMPERATURE: f64 = 1.0;

/// Moves played with full temperature before switching to `LATE_TEMPERATURE`.
pub const TEMPERATURE_THRESHOLD: usize = 30;

/// Temperature used once the opening phase is over.
pub const LATE_TEMPERATURE: f64 = 0.1;
