//! Property tests for the prob-best estimator.

use evoloop_core::config::EngineConfig;
use evoloop_core::types::ArmParams;
use evoloop_engine::{estimate_prob_best, select_variant, ThompsonSelector};
use proptest::prelude::*;

fn arm_set() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((1.0f64..200.0, 1.0f64..200.0), 1..6)
}

fn to_arms(params: &[(f64, f64)]) -> Vec<ArmParams> {
    params
        .iter()
        .enumerate()
        .map(|(i, &(a, b))| ArmParams::new(format!("arm{i}"), a, b))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prob_best_sums_to_one(params in arm_set()) {
        let arms = to_arms(&params);
        let probs = estimate_prob_best(&arms, 10_000).unwrap();
        prop_assert_eq!(probs.len(), arms.len());
        let total: f64 = probs.values().sum();
        prop_assert!((total - 1.0).abs() < 0.01, "sum was {}", total);
        prop_assert!(probs.values().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn parallel_prob_best_sums_to_one(params in arm_set()) {
        let selector = ThompsonSelector::new(EngineConfig {
            min_parallel_simulations: 0,
            workers: 3,
            ..EngineConfig::default()
        });
        let arms = to_arms(&params);
        let probs = selector.estimate_prob_best_with(&arms, 5_000).unwrap();
        let total: f64 = probs.values().sum();
        prop_assert!((total - 1.0).abs() < 0.01, "sum was {}", total);
    }

    #[test]
    fn seeded_selection_replays(params in arm_set(), visitor in "[a-z0-9-]{1,24}") {
        let arms = to_arms(&params);
        let first = select_variant(&arms, Some(&visitor)).unwrap();
        let second = select_variant(&arms, Some(&visitor)).unwrap();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn duplicate_ids_share_one_entry() {
    let arms = vec![
        ArmParams::new("x", 5.0, 5.0),
        ArmParams::new("x", 5.0, 5.0),
        ArmParams::new("y", 5.0, 5.0),
    ];
    let probs = estimate_prob_best(&arms, 10_000).unwrap();
    assert_eq!(probs.len(), 2);
    assert!(probs["x"] > probs["y"]);
}
