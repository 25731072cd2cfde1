//! Beta posterior sampling primitive shared by selection and prob-best.

use evoloop_core::types::ArmParams;
use evoloop_core::{EngineError, EngineResult};
use rand::Rng;
use rand_distr::{Beta, Distribution};

/// A validated Beta(alpha, beta) posterior ready to be sampled.
#[derive(Debug, Clone)]
pub struct Posterior {
    dist: Beta<f64>,
}

impl Posterior {
    pub fn new(alpha: f64, beta: f64) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidParameter {
            variant_id: None,
            alpha,
            beta,
        };
        if !(alpha.is_finite() && beta.is_finite()) || alpha <= 0.0 || beta <= 0.0 {
            return Err(invalid());
        }
        let dist = Beta::new(alpha, beta).map_err(|_| invalid())?;
        Ok(Self { dist })
    }

    pub fn for_arm(arm: &ArmParams) -> EngineResult<Self> {
        Self::new(arm.alpha, arm.beta).map_err(|_| EngineError::InvalidParameter {
            variant_id: Some(arm.variant_id.clone()),
            alpha: arm.alpha,
            beta: arm.beta,
        })
    }

    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.dist.sample(rng)
    }
}

/// Validate every arm up front so a bad one fails the whole call.
pub fn posteriors(arms: &[ArmParams]) -> EngineResult<Vec<Posterior>> {
    arms.iter().map(Posterior::for_arm).collect()
}

/// Draw once from Beta(alpha, beta). Always in `[0, 1]`.
pub fn sample_beta<R: Rng + ?Sized>(rng: &mut R, alpha: f64, beta: f64) -> EngineResult<f64> {
    Ok(Posterior::new(alpha, beta)?.sample(rng))
}

/// Index of the largest draw, first one wins on ties.
pub(crate) fn argmax_draw<R: Rng + ?Sized>(posteriors: &[Posterior], rng: &mut R) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, posterior) in posteriors.iter().enumerate() {
        let sample = posterior.sample(rng);
        match best {
            Some((_, best_sample)) if sample <= best_sample => {}
            _ => best = Some((idx, sample)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_in_unit_interval() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let x = sample_beta(&mut rng, 1.0, 1.0).unwrap();
            assert!((0.0..=1.0).contains(&x));
        }
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        let mut rng = rand::thread_rng();
        for (a, b) in [(0.0, 1.0), (1.0, 0.0), (-2.0, 3.0), (f64::NAN, 1.0), (1.0, f64::INFINITY)] {
            assert!(matches!(
                sample_beta(&mut rng, a, b),
                Err(EngineError::InvalidParameter { variant_id: None, .. })
            ));
        }
    }

    #[test]
    fn test_for_arm_names_the_offending_variant() {
        let arms = vec![ArmParams::new("ok", 2.0, 3.0), ArmParams::new("bad", 1.0, -1.0)];
        match posteriors(&arms) {
            Err(EngineError::InvalidParameter { variant_id, beta, .. }) => {
                assert_eq!(variant_id.as_deref(), Some("bad"));
                assert_eq!(beta, -1.0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_argmax_prefers_dominant_arm() {
        let posteriors = posteriors(&[
            ArmParams::new("low", 1.0, 500.0),
            ArmParams::new("high", 500.0, 1.0),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(argmax_draw(&posteriors, &mut rng), Some(1));
        }
        assert_eq!(argmax_draw(&[], &mut rng), None);
    }

    proptest! {
        #[test]
        fn prop_sample_beta_in_unit_interval(
            alpha in 0.01f64..1000.0,
            beta in 0.01f64..1000.0,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let posterior = Posterior::new(alpha, beta).unwrap();
            for _ in 0..1000 {
                let x = posterior.sample(&mut rng);
                prop_assert!((0.0..=1.0).contains(&x), "sample {} out of range", x);
            }
        }
    }
}
