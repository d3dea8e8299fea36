//! Monte Carlo Tree Search (MCTS) guided by a policy/value evaluator.
//!
//! Each simulation runs four phases from a fresh root:
//! 1. Select: descend with PUCT while the node is expanded and not terminal
//! 2. Expand: evaluate the leaf and add one child per legal move, using the
//!    policy as priors (root only: optionally mixed with Dirichlet noise)
//! 3. Evaluate: terminal leaves are scored by stone majority; an expanded
//!    leaf with nothing left to expand is re-evaluated for its value only
//! 4. Backup: add the value along the path to the root, negating at each level
//!
//! The root is expanded once before the first simulation. The tree is rebuilt
//! for every call; nothing is reused between moves.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::constants::{C_PUCT, DIRICHLET_ALPHA, DIRICHLET_EPSILON, N_SIMS, TEMPERATURE};
use crate::distribution::{
    InvalidDistributionError, argmax, dirichlet_noise, mix_noise, visits_to_probs,
};
use crate::evaluator::{Evaluator, EvaluatorContractError, checked_evaluate};
use crate::game::{GameState, Move};
use crate::node::NodeId;
use crate::tree::{SearchTree, TreeStats};

/// Errors that can occur during a search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("evaluator contract violated: {0}")]
    EvaluatorContract(#[from] EvaluatorContractError),

    #[error("invalid distribution: {0}")]
    InvalidDistribution(#[from] InvalidDistributionError),

    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),

    #[error("search produced no root visits")]
    NoVisits,
}

/// Configuration for the search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Simulations per search.
    pub num_simulations: usize,

    /// Exploration constant in the PUCT formula.
    pub c_puct: f64,

    /// Mix Dirichlet noise into the root priors.
    pub add_root_noise: bool,

    /// Dirichlet concentration. Only used when `add_root_noise` is set.
    pub dirichlet_alpha: f64,

    /// Weight of the noise in the mixed root prior.
    pub dirichlet_epsilon: f64,

    /// Temperature used by `search` to turn visit counts into probabilities.
    pub temperature: f64,

    /// Seed for the noise RNG. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_simulations: N_SIMS,
            c_puct: C_PUCT,
            add_root_noise: false,
            dirichlet_alpha: DIRICHLET_ALPHA,
            dirichlet_epsilon: DIRICHLET_EPSILON,
            temperature: TEMPERATURE,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Self-play configuration: root noise on.
    pub fn for_training() -> Self {
        Self {
            add_root_noise: true,
            ..Self::default()
        }
    }

    /// Match-play configuration: no noise, greedy distribution.
    pub fn for_evaluation() -> Self {
        Self {
            add_root_noise: false,
            temperature: 0.0,
            ..Self::default()
        }
    }

    /// Small, seeded configuration for tests.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 50,
            seed: Some(42),
            ..Self::default()
        }
    }

    pub fn with_simulations(mut self, n: usize) -> Self {
        self.num_simulations = n;
        self
    }

    pub fn with_c_puct(mut self, c: f64) -> Self {
        self.c_puct = c;
        self
    }

    pub fn with_root_noise(mut self, alpha: f64, epsilon: f64) -> Self {
        self.add_root_noise = true;
        self.dirichlet_alpha = alpha;
        self.dirichlet_epsilon = epsilon;
        self
    }

    pub fn with_temperature(mut self, t: f64) -> Self {
        self.temperature = t;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.c_puct.is_finite() || self.c_puct < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "c_puct must be finite and non-negative, got {}",
                self.c_puct
            )));
        }
        check_temperature(self.temperature)?;
        if self.add_root_noise {
            if !(self.dirichlet_alpha > 0.0 && self.dirichlet_alpha.is_finite()) {
                return Err(SearchError::InvalidConfig(format!(
                    "dirichlet_alpha must be positive, got {}",
                    self.dirichlet_alpha
                )));
            }
            if !(0.0..=1.0).contains(&self.dirichlet_epsilon) {
                return Err(SearchError::InvalidConfig(format!(
                    "dirichlet_epsilon must be in [0, 1], got {}",
                    self.dirichlet_epsilon
                )));
            }
        }
        Ok(())
    }
}

/// Temperatures must be finite and non-negative; `0` means greedy.
fn check_temperature(temperature: f64) -> Result<(), SearchError> {
    if !temperature.is_finite() || temperature < 0.0 {
        return Err(SearchError::InvalidConfig(format!(
            "temperature must be finite and non-negative, got {temperature}"
        )));
    }
    Ok(())
}

/// What a single simulation did at its leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafAction {
    /// The leaf was expanded using a fresh evaluation.
    Expanded,
    /// The leaf was terminal and scored directly.
    Terminal,
    /// The leaf was already expanded; only its value was re-evaluated.
    Revisited,
}

/// MCTS engine. Owns its evaluator and the noise RNG; builds a new tree per search.
pub struct SearchEngine<E: Evaluator> {
    evaluator: E,
    config: SearchConfig,
    rng: ChaCha20Rng,
    last_tree: Option<SearchTree>,
}

impl<E: Evaluator> SearchEngine<E> {
    /// Create an engine from the individual search parameters.
    pub fn new(
        evaluator: E,
        num_simulations: usize,
        c_puct: f64,
        add_root_noise: bool,
        dirichlet_alpha: f64,
        dirichlet_epsilon: f64,
    ) -> Self {
        let config = SearchConfig {
            num_simulations,
            c_puct,
            add_root_noise,
            dirichlet_alpha,
            dirichlet_epsilon,
            ..SearchConfig::default()
        };
        Self::with_config(evaluator, config)
    }

    pub fn with_config(evaluator: E, config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        Self {
            evaluator,
            config,
            rng,
            last_tree: None,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Tree built by the most recent search, kept for inspection.
    pub fn last_tree(&self) -> Option<&SearchTree> {
        self.last_tree.as_ref()
    }

    pub fn last_tree_stats(&self) -> Option<TreeStats> {
        self.last_tree.as_ref().map(SearchTree::stats)
    }

    /// Search from `state` and return action probabilities at the configured temperature.
    ///
    /// The result has length `n * n + 1`; index `n * n` is `Pass`.
    pub fn search(&mut self, state: &GameState) -> Result<Vec<f64>, SearchError> {
        let temperature = self.config.temperature;
        self.get_action_probs(state, temperature)
    }

    /// Search from `state` and convert root visits with an explicit temperature.
    pub fn get_action_probs(
        &mut self,
        state: &GameState,
        temperature: f64,
    ) -> Result<Vec<f64>, SearchError> {
        check_temperature(temperature)?;
        let tree = self.run(state)?;
        let counts = tree.root_visit_counts(state.action_size());
        self.last_tree = Some(tree);
        Ok(visits_to_probs(&counts, temperature))
    }

    /// Search from `state` and return the most likely move.
    pub fn get_best_move(&mut self, state: &GameState) -> Result<Move, SearchError> {
        let probs = self.search(state)?;
        if probs.iter().all(|&p| p == 0.0) {
            return Err(SearchError::NoVisits);
        }
        argmax(&probs)
            .and_then(|i| state.index_to_move(i))
            .ok_or(SearchError::NoVisits)
    }

    /// Build a tree from a copy of `state` and run all simulations on it.
    ///
    /// A non-terminal root is expanded up front (its value is not backed up),
    /// so each simulation lands on a child and root child visits sum to
    /// `num_simulations`.
    pub fn run(&mut self, state: &GameState) -> Result<SearchTree, SearchError> {
        self.config.validate()?;

        let mut tree = SearchTree::new(state.clone());
        let root = tree.root();
        if !tree.get(root).is_terminal() {
            self.expand_leaf(&mut tree, root)?;
        }

        for _ in 0..self.config.num_simulations {
            self.simulate(&mut tree)?;
        }

        let root = tree.get(tree.root());
        debug!(
            simulations = self.config.num_simulations,
            root_visits = root.visit_count,
            root_value = root.mean_value(),
            nodes = tree.len(),
            "search complete"
        );
        Ok(tree)
    }

    /// Run one select, expand/evaluate, backup cycle on `tree`.
    pub fn simulate(&mut self, tree: &mut SearchTree) -> Result<LeafAction, SearchError> {
        let leaf_id = self.select(tree);
        let leaf = tree.get(leaf_id);

        let (action, value) = if leaf.is_terminal() {
            let value = leaf.state.terminal_outcome(leaf.state.current_player());
            (LeafAction::Terminal, value)
        } else if !leaf.expanded {
            (LeafAction::Expanded, self.expand_leaf(tree, leaf_id)?)
        } else {
            let eval = checked_evaluate(&self.evaluator, &leaf.state)?;
            (LeafAction::Revisited, eval.value)
        };

        tree.backup(leaf_id, value);

        trace!(
            leaf = leaf_id.0,
            depth = tree.depth(leaf_id),
            ?action,
            value,
            "simulation complete"
        );
        Ok(action)
    }

    /// Descend from the root while the current node is expanded and not terminal.
    fn select(&self, tree: &SearchTree) -> NodeId {
        let mut current = tree.root();
        loop {
            let node = tree.get(current);
            if !node.expanded || node.is_terminal() {
                return current;
            }
            match tree.select_child(current, self.config.c_puct) {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Evaluate and expand a leaf. Returns the evaluator's value for backup.
    fn expand_leaf(&mut self, tree: &mut SearchTree, leaf_id: NodeId) -> Result<f64, SearchError> {
        let state = &tree.get(leaf_id).state;
        let eval = checked_evaluate(&self.evaluator, state)?;
        let legal_moves = state.legal_moves();

        let policy = if self.config.add_root_noise && leaf_id == tree.root() {
            self.noisy_policy(&eval.policy)?
        } else {
            eval.policy
        };

        tree.expand(leaf_id, &legal_moves, &policy);
        Ok(eval.value)
    }

    fn noisy_policy(&mut self, policy: &[f64]) -> Result<Vec<f64>, SearchError> {
        let noise = dirichlet_noise(policy.len(), self.config.dirichlet_alpha, &mut self.rng)
            .map_err(|e| SearchError::InvalidConfig(e.to_string()))?;
        debug!(
            alpha = self.config.dirichlet_alpha,
            epsilon = self.config.dirichlet_epsilon,
            "mixing Dirichlet noise into root priors"
        );
        Ok(mix_noise(policy, &noise, self.config.dirichlet_epsilon))
    }
}
