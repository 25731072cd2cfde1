//! Batch recomputation of a site's posterior stats from its event log.

use std::collections::{BTreeMap, HashSet};

use evoloop_core::types::{Event, PosteriorStats, Site, SiteStatus, Variant};
use evoloop_core::EngineResult;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregator::{count_events, posterior_from_counts};
use crate::engine::AllocationEngine;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeOutcome {
    pub site_id: Uuid,
    pub updated: Vec<String>,
    pub prob_best: BTreeMap<String, f64>,
    pub stats: Vec<PosteriorStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SiteRecomputeResult {
    Success(RecomputeOutcome),
    Error { site_id: Uuid, error: String },
}

impl SiteRecomputeResult {
    pub fn site_id(&self) -> Uuid {
        match self {
            SiteRecomputeResult::Success(outcome) => outcome.site_id,
            SiteRecomputeResult::Error { site_id, .. } => *site_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SiteRecomputeResult::Success(_))
    }
}

impl AllocationEngine {
    /// Rebuild stats for every active variant of `site_id` and stamp fresh
    /// prob-best values. Events for other variants are ignored.
    pub fn recompute_site(
        &self,
        site_id: Uuid,
        variants: &[Variant],
        events: &[Event],
    ) -> EngineResult<RecomputeOutcome> {
        let active: Vec<&Variant> = variants
            .iter()
            .filter(|v| v.site_id == site_id && v.is_active())
            .collect();
        let ids: HashSet<&str> = active.iter().map(|v| v.id.as_str()).collect();
        let counts = count_events(events.iter().filter(|e| ids.contains(e.variant_id.as_str())));

        let mut stats: Vec<PosteriorStats> = active
            .iter()
            .map(|v| posterior_from_counts(&v.id, counts.get(&v.id).copied().unwrap_or_default()))
            .collect();

        let arms: Vec<_> = stats.iter().map(PosteriorStats::arm).collect();
        let prob_best = self.selector().estimate_prob_best(&arms)?;
        for s in &mut stats {
            s.prob_best = prob_best.get(&s.variant_id).copied().unwrap_or(0.0);
        }

        let updated: Vec<String> = stats.iter().map(|s| s.variant_id.clone()).collect();
        info!(site_id = %site_id, updated = updated.len(), "site stats recomputed");

        Ok(RecomputeOutcome {
            site_id,
            updated,
            prob_best,
            stats,
        })
    }

    /// Recompute every running site. A failing site is reported and the batch
    /// carries on.
    pub fn recompute_all(
        &self,
        sites: &[Site],
        variants: &[Variant],
        events: &[Event],
    ) -> Vec<SiteRecomputeResult> {
        sites
            .iter()
            .filter(|s| s.status == SiteStatus::Running)
            .map(|site| match self.recompute_site(site.id, variants, events) {
                Ok(outcome) => SiteRecomputeResult::Success(outcome),
                Err(e) => {
                    warn!(site_id = %site.id, error = %e, "site recompute failed");
                    SiteRecomputeResult::Error {
                        site_id: site.id,
                        error: e.to_string(),
                    }
                }
            })
            .collect()
    }
}
