//! Player adapter over the search engine.
//!
//! Callers (a self-play loop, an interactive loop, a UI) ask a player for a
//! move or for a move distribution; the player hides the engine setup.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::constants::{LATE_TEMPERATURE, TEMPERATURE_THRESHOLD};
use crate::distribution::sample_action;
use crate::evaluator::Evaluator;
use crate::game::{GameState, Move};
use crate::mcts::{SearchConfig, SearchEngine, SearchError};

/// A player that picks moves with MCTS.
pub struct MctsPlayer<E: Evaluator> {
    engine: SearchEngine<E>,
    temperature_threshold: usize,
    late_temperature: f64,
    rng: ChaCha20Rng,
}

impl<E: Evaluator> MctsPlayer<E> {
    pub fn new(evaluator: E, num_simulations: usize, c_puct: f64) -> Self {
        let config = SearchConfig::default()
            .with_simulations(num_simulations)
            .with_c_puct(c_puct);
        Self::with_config(evaluator, config)
    }

    pub fn with_config(evaluator: E, config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed.wrapping_add(1)),
            None => ChaCha20Rng::from_entropy(),
        };
        Self {
            engine: SearchEngine::with_config(evaluator, config),
            temperature_threshold: TEMPERATURE_THRESHOLD,
            late_temperature: LATE_TEMPERATURE,
            rng,
        }
    }

    /// Override the opening temperature schedule.
    pub fn with_temperature_schedule(mut self, threshold: usize, late_temperature: f64) -> Self {
        self.temperature_threshold = threshold;
        self.late_temperature = late_temperature;
        self
    }

    /// Best move for the player to move in `state`.
    pub fn get_move(&mut self, state: &GameState) -> Result<Move, SearchError> {
        self.engine.get_best_move(state)
    }

    /// Move distribution for `state` at `temperature` (0 = one-hot).
    pub fn get_action_probs(
        &mut self,
        state: &GameState,
        temperature: f64,
    ) -> Result<Vec<f64>, SearchError> {
        self.engine.get_action_probs(state, temperature)
    }

    /// Temperature for the move with 0-based index `move_number`.
    pub fn temperature_for(&self, move_number: usize) -> f64 {
        if move_number < self.temperature_threshold {
            1.0
        } else {
            self.late_temperature
        }
    }

    /// Sample a move for self-play from the schedule-tempered distribution.
    ///
    /// Returns the chosen move together with the distribution it was drawn from.
    pub fn select_move(&mut self, state: &GameState) -> Result<(Move, Vec<f64>), SearchError> {
        let temperature = self.temperature_for(state.move_history().len());
        let probs = self.engine.get_action_probs(state, temperature)?;
        let index = sample_action(&probs, &mut self.rng)?;
        let mv = state.index_to_move(index).ok_or(SearchError::NoVisits)?;
        debug!(%mv, temperature, "selected move");
        Ok((mv, probs))
    }
}
