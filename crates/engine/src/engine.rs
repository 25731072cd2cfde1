//! Site-level allocation engine: routes visitors, rebuilds stats and builds
//! reports on top of the Thompson selector. Callers own all persistence.

use std::collections::HashMap;

use evoloop_core::config::EngineConfig;
use evoloop_core::types::{ArmParams, PosteriorStats, Variant};
use uuid::Uuid;

use crate::selector::ThompsonSelector;

pub struct AllocationEngine {
    selector: ThompsonSelector,
}

impl AllocationEngine {
    pub fn new(config: EngineConfig) -> Self {
        tracing::info!(
            num_simulations = config.num_simulations,
            parallel = config.parallel,
            workers = config.workers,
            "allocation engine initialised"
        );
        Self {
            selector: ThompsonSelector::new(config),
        }
    }

    pub fn selector(&self) -> &ThompsonSelector {
        &self.selector
    }
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

pub(crate) fn stats_index(stats: &[PosteriorStats]) -> HashMap<&str, &PosteriorStats> {
    stats.iter().map(|s| (s.variant_id.as_str(), s)).collect()
}

/// Arms for the site's active variants, in input order. Variants without
/// stats enter at Beta(1,1).
pub(crate) fn active_arms(
    site_id: &Uuid,
    variants: &[Variant],
    stats: &HashMap<&str, &PosteriorStats>,
) -> Vec<ArmParams> {
    variants
        .iter()
        .filter(|v| v.site_id == *site_id && v.is_active())
        .map(|v| match stats.get(v.id.as_str()) {
            Some(s) => s.arm(),
            None => ArmParams::uninformative(v.id.clone()),
        })
        .collect()
}
