//! Variant allocation engine: Thompson Sampling over Beta-Bernoulli arms,
//! Monte-Carlo prob-best estimation, and posterior aggregation from visitor
//! events.

pub mod aggregator;
pub mod assignment;
pub mod engine;
pub mod recompute;
pub mod report;
pub mod sampling;
pub mod seed;
pub mod selector;

pub use aggregator::{posterior_from_counts, EventCounts};
pub use engine::AllocationEngine;
pub use recompute::{RecomputeOutcome, SiteRecomputeResult};
pub use sampling::{sample_beta, Posterior};
pub use selector::{estimate_prob_best, select_variant, ThompsonSelector, DEFAULT_SIMULATIONS};
