//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays uniformly random legal moves until the game ends or a ply
//! cap is reached, then scores the final board by stone majority. This is the
//! fallback value estimate used when no trained evaluator is available.

use std::cell::RefCell;

use crate::constants::ROLLOUT_DEPTH_FACTOR;
use crate::evaluator::{Evaluation, Evaluator, uniform_policy};
use crate::game::GameState;

/// Perform a random playout from `state` without modifying it.
///
/// Returns the outcome from the perspective of the player to move in `state`:
/// positive if that player ends with more stones, negative if fewer.
pub fn random_playout(state: &GameState, rng: &mut fastrand::Rng) -> f64 {
    let mut pos = state.clone();
    let original_player = pos.current_player();
    let max_plies = ROLLOUT_DEPTH_FACTOR * pos.size() * pos.size();

    for _ in 0..max_plies {
        if pos.is_terminal() {
            break;
        }
        let moves = pos.legal_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.usize(..moves.len())];
        if !pos.try_apply(mv) {
            break;
        }
    }

    // Score for whoever is to move now, then flip if that is not the original mover
    let final_player = pos.current_player();
    let score = pos.terminal_outcome(final_player);
    if final_player == original_player {
        score
    } else {
        -score
    }
}

/// Evaluator with a uniform policy and a random-playout value.
///
/// The RNG sits behind a `RefCell` so that evaluation only needs `&self`.
#[derive(Debug, Clone)]
pub struct RolloutEvaluator {
    rng: RefCell<fastrand::Rng>,
}

impl Default for RolloutEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl RolloutEvaluator {
    /// Create an evaluator seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: RefCell::new(fastrand::Rng::new()),
        }
    }

    /// Create an evaluator with a fixed seed for reproducible playouts.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: RefCell::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl Evaluator for RolloutEvaluator {
    fn evaluate(&self, state: &GameState) -> Evaluation {
        Evaluation {
            policy: uniform_policy(state.action_size()),
            value: random_playout(state, &mut self.rng.borrow_mut()),
        }
    }
}
