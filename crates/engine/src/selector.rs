//! Thompson Sampling over Beta-Bernoulli arms.
//!
//! Two queries share the sampling primitive: pick one arm now (traffic
//! routing) and estimate each arm's probability of being best (reporting).
//! Every call owns its generator; nothing global is seeded or mutated.

use std::collections::BTreeMap;

use evoloop_core::config::EngineConfig;
use evoloop_core::types::ArmParams;
use evoloop_core::{EngineError, EngineResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::sampling::{argmax_draw, posteriors, Posterior};
use crate::seed::visitor_rng;

pub const DEFAULT_SIMULATIONS: usize = 10_000;

pub struct ThompsonSelector {
    config: EngineConfig,
}

impl ThompsonSelector {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Draw once per arm and return the arm with the largest draw.
    ///
    /// With a visitor id the draws replay exactly for that visitor and the
    /// same arm set. Without one (or with an empty one) they come from the
    /// thread-local entropy-seeded stream.
    pub fn select_variant(
        &self,
        arms: &[ArmParams],
        visitor_id: Option<&str>,
    ) -> EngineResult<String> {
        if arms.is_empty() {
            return Err(EngineError::EmptyInput);
        }
        let posteriors = posteriors(arms)?;

        let visitor_id = visitor_id.filter(|v| !v.is_empty());
        let idx = match visitor_id {
            Some(visitor) => argmax_draw(&posteriors, &mut visitor_rng(visitor)),
            None => argmax_draw(&posteriors, &mut rand::thread_rng()),
        }
        .ok_or(EngineError::EmptyInput)?;

        let chosen = &arms[idx].variant_id;
        debug!(
            arms = arms.len(),
            seeded = visitor_id.is_some(),
            variant_id = %chosen,
            "variant selected"
        );
        Ok(chosen.clone())
    }

    /// Prob-best with the configured number of simulations.
    pub fn estimate_prob_best(&self, arms: &[ArmParams]) -> EngineResult<BTreeMap<String, f64>> {
        self.estimate_prob_best_with(arms, self.config.num_simulations)
    }

    /// Monte-Carlo estimate of P(arm is best). Empty input yields an empty map;
    /// zero simulations yield every arm at 0.0.
    pub fn estimate_prob_best_with(
        &self,
        arms: &[ArmParams],
        num_simulations: usize,
    ) -> EngineResult<BTreeMap<String, f64>> {
        let mut probs = BTreeMap::new();
        if arms.is_empty() {
            return Ok(probs);
        }
        let posteriors = posteriors(arms)?;
        let wins = self.win_counts(&posteriors, num_simulations);

        for (arm, count) in arms.iter().zip(wins) {
            let share = if num_simulations == 0 {
                0.0
            } else {
                count as f64 / num_simulations as f64
            };
            *probs.entry(arm.variant_id.clone()).or_insert(0.0) += share;
        }
        debug!(arms = arms.len(), num_simulations, "prob-best estimated");
        Ok(probs)
    }

    fn win_counts(&self, posteriors: &[Posterior], num_simulations: usize) -> Vec<u64> {
        if !self.config.parallel || num_simulations < self.config.min_parallel_simulations {
            return run_trials(posteriors, num_simulations, &mut rand::thread_rng());
        }

        let workers = match self.config.workers {
            0 => rayon::current_num_threads(),
            n => n,
        }
        .clamp(1, num_simulations.max(1));
        let base = num_simulations / workers;
        let extra = num_simulations % workers;

        (0..workers)
            .into_par_iter()
            .map(|worker| {
                let trials = base + usize::from(worker < extra);
                let mut rng = StdRng::from_entropy();
                run_trials(posteriors, trials, &mut rng)
            })
            .reduce(
                || vec![0u64; posteriors.len()],
                |mut acc, counts| {
                    for (total, c) in acc.iter_mut().zip(counts) {
                        *total += c;
                    }
                    acc
                },
            )
    }
}

impl Default for ThompsonSelector {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn run_trials<R: Rng + ?Sized>(posteriors: &[Posterior], trials: usize, rng: &mut R) -> Vec<u64> {
    let mut wins = vec![0u64; posteriors.len()];
    for _ in 0..trials {
        if let Some(idx) = argmax_draw(posteriors, rng) {
            wins[idx] += 1;
        }
    }
    wins
}

/// [`ThompsonSelector::select_variant`] with default settings.
pub fn select_variant(arms: &[ArmParams], visitor_id: Option<&str>) -> EngineResult<String> {
    ThompsonSelector::default().select_variant(arms, visitor_id)
}

/// [`ThompsonSelector::estimate_prob_best_with`] with default settings.
pub fn estimate_prob_best(
    arms: &[ArmParams],
    num_simulations: usize,
) -> EngineResult<BTreeMap<String, f64>> {
    ThompsonSelector::default().estimate_prob_best_with(arms, num_simulations)
}
