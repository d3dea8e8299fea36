//! Evaluator trait for position evaluation.
//!
//! An evaluator maps a game state to a policy over the action space and a
//! value estimate for the player to move. A trained network is one such
//! evaluator and lives outside this crate; the built-in strategies are
//! [`UniformEvaluator`] and [`crate::playout::RolloutEvaluator`].

use thiserror::Error;
use tracing::warn;

use crate::constants::PROB_TOLERANCE;
use crate::game::GameState;
use crate::playout::RolloutEvaluator;

/// Output of a single evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Probability for each action index, length `n * n + 1`.
    pub policy: Vec<f64>,
    /// Expected outcome for the player to move, in `[-1, 1]`.
    pub value: f64,
}

/// An evaluator returned output that breaks the evaluation contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluatorContractError {
    #[error("policy has {actual} entries, expected {expected}")]
    PolicyLength { expected: usize, actual: usize },
    #[error("policy entry {index} is {prob}, not a probability")]
    InvalidProbability { index: usize, prob: f64 },
    #[error("policy sums to {sum}, expected 1")]
    NotNormalized { sum: f64 },
    #[error("value {0} is outside [-1, 1]")]
    InvalidValue(f64),
}

/// Trait for position evaluators.
///
/// Implementations must be pure with respect to the search: `evaluate` takes
/// `&self` and the engine never mutates an evaluator.
pub trait Evaluator {
    fn evaluate(&self, state: &GameState) -> Evaluation;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, state: &GameState) -> Evaluation {
        (**self).evaluate(state)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&self, state: &GameState) -> Evaluation {
        (**self).evaluate(state)
    }
}

impl Evaluation {
    /// Check this output against the contract for a board with `action_size` actions.
    pub fn validate(&self, action_size: usize) -> Result<(), EvaluatorContractError> {
        if self.policy.len() != action_size {
            return Err(EvaluatorContractError::PolicyLength {
                expected: action_size,
                actual: self.policy.len(),
            });
        }
        if let Some((index, &prob)) = self
            .policy
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(EvaluatorContractError::InvalidProbability { index, prob });
        }
        let sum: f64 = self.policy.iter().sum();
        if (sum - 1.0).abs() > PROB_TOLERANCE {
            return Err(EvaluatorContractError::NotNormalized { sum });
        }
        if !self.value.is_finite() || !(-1.0..=1.0).contains(&self.value) {
            return Err(EvaluatorContractError::InvalidValue(self.value));
        }
        Ok(())
    }
}

/// Evaluate `state` and reject output that breaks the contract.
pub fn checked_evaluate<E: Evaluator + ?Sized>(
    evaluator: &E,
    state: &GameState,
) -> Result<Evaluation, EvaluatorContractError> {
    let eval = evaluator.evaluate(state);
    if let Err(e) = eval.validate(state.action_size()) {
        warn!(error = %e, "evaluator broke its contract");
        return Err(e);
    }
    Ok(eval)
}

/// Uniform policy over the whole action space with a neutral value.
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, state: &GameState) -> Evaluation {
        Evaluation {
            policy: uniform_policy(state.action_size()),
            value: 0.0,
        }
    }
}

/// Equal probability for each of `action_size` actions.
pub fn uniform_policy(action_size: usize) -> Vec<f64> {
    vec![1.0 / action_size as f64; action_size]
}

/// Built-in evaluator strategies, chosen when the engine is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluatorKind {
    /// Uniform policy, value from a random playout.
    #[default]
    Rollout,
    /// Uniform policy, value 0.
    Uniform,
}

impl EvaluatorKind {
    /// Build the evaluator. `seed` only affects the rollout strategy.
    pub fn build(self, seed: Option<u64>) -> Box<dyn Evaluator> {
        match self {
            EvaluatorKind::Rollout => Box::new(match seed {
                Some(seed) => RolloutEvaluator::with_seed(seed),
                None => RolloutEvaluator::new(),
            }),
            EvaluatorKind::Uniform => Box::new(UniformEvaluator::new()),
        }
    }
}
