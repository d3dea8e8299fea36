//! Probability vectors over the action space.
//!
//! Converting root visit counts into a distribution, mixing Dirichlet noise
//! into a prior, and sampling an action from a distribution.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand_distr::Gamma;
use thiserror::Error;

/// A probability vector that cannot be sampled from.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidDistributionError {
    #[error("distribution is empty")]
    Empty,
    #[error("entry {index} is {prob}, not a probability")]
    InvalidEntry { index: usize, prob: f64 },
    #[error("distribution has no probability mass")]
    ZeroMass,
}

/// Index of the largest entry. The first one wins on ties.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Turn visit counts into action probabilities.
///
/// - `temperature == 0`: one-hot at the most visited action (first on ties)
/// - `temperature > 0`: `counts^(1/temperature)`, normalised
///
/// Unvisited actions always get probability 0. An all-zero count vector
/// yields an all-zero result for any temperature.
pub fn visits_to_probs(counts: &[u32], temperature: f64) -> Vec<f64> {
    let mut probs = vec![0.0; counts.len()];
    let max = counts.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return probs;
    }

    if temperature <= 0.0 {
        if let Some(best) = counts.iter().position(|&c| c == max) {
            probs[best] = 1.0;
        }
        return probs;
    }

    // Scale by the max first so small temperatures cannot overflow
    let inv_t = 1.0 / temperature;
    for (p, &c) in probs.iter_mut().zip(counts) {
        if c > 0 {
            *p = (c as f64 / max as f64).powf(inv_t);
        }
    }
    let total: f64 = probs.iter().sum();
    if total > 0.0 {
        for p in &mut probs {
            *p /= total;
        }
    }
    probs
}

/// Draw a Dirichlet(alpha, ..., alpha) sample of length `len`.
pub fn dirichlet_noise<R: Rng + ?Sized>(
    len: usize,
    alpha: f64,
    rng: &mut R,
) -> Result<Vec<f64>, rand_distr::GammaError> {
    let gamma = Gamma::new(alpha, 1.0)?;
    let mut samples: Vec<f64> = (0..len).map(|_| gamma.sample(rng)).collect();

    let sum: f64 = samples.iter().sum();
    if sum > 0.0 {
        for s in &mut samples {
            *s /= sum;
        }
    } else if len > 0 {
        // Every draw underflowed; fall back to the mean of the distribution
        samples.fill(1.0 / len as f64);
    }
    Ok(samples)
}

/// `(1 - epsilon) * policy + epsilon * noise`, element-wise.
pub fn mix_noise(policy: &[f64], noise: &[f64], epsilon: f64) -> Vec<f64> {
    policy
        .iter()
        .zip(noise)
        .map(|(&p, &n)| (1.0 - epsilon) * p + epsilon * n)
        .collect()
}

/// Check that `probs` can be sampled from: non-empty, finite, non-negative, some mass.
pub fn validate_distribution(probs: &[f64]) -> Result<(), InvalidDistributionError> {
    if probs.is_empty() {
        return Err(InvalidDistributionError::Empty);
    }
    if let Some((index, &prob)) = probs
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(InvalidDistributionError::InvalidEntry { index, prob });
    }
    if probs.iter().sum::<f64>() <= 0.0 {
        return Err(InvalidDistributionError::ZeroMass);
    }
    Ok(())
}

/// Sample an action index proportionally to `probs`.
pub fn sample_action<R: Rng + ?Sized>(
    probs: &[f64],
    rng: &mut R,
) -> Result<usize, InvalidDistributionError> {
    validate_distribution(probs)?;
    let dist = WeightedIndex::new(probs).map_err(|_| InvalidDistributionError::ZeroMass)?;
    Ok(dist.sample(rng))
}
