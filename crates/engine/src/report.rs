//! Per-site stats report and prob-best over a site's active variants.

use std::collections::BTreeMap;

use evoloop_core::types::{PosteriorStats, Variant, VariantReport, VariantStatus};
use evoloop_core::{EngineResult, EvoloopError, EvoloopResult};
use uuid::Uuid;

use crate::aggregator::conversion_rate;
use crate::engine::{active_arms, stats_index, AllocationEngine};

impl AllocationEngine {
    /// Prob-best over the site's active variants.
    pub fn prob_best(
        &self,
        site_id: Uuid,
        variants: &[Variant],
        stats: &[PosteriorStats],
    ) -> EngineResult<BTreeMap<String, f64>> {
        let arms = active_arms(&site_id, variants, &stats_index(stats));
        self.selector().estimate_prob_best(&arms)
    }

    /// Per-variant stats for a site's live and pending variants. Prob-best is
    /// estimated over active variants only; pending ones report 0.
    pub fn site_report(
        &self,
        site_id: Uuid,
        variants: &[Variant],
        stats: &[PosteriorStats],
    ) -> EvoloopResult<Vec<VariantReport>> {
        let listed: Vec<&Variant> = variants
            .iter()
            .filter(|v| {
                v.site_id == site_id
                    && matches!(v.status, VariantStatus::Active | VariantStatus::PendingReview)
            })
            .collect();
        if listed.is_empty() {
            return Err(EvoloopError::NoVariants(site_id));
        }

        let index = stats_index(stats);
        let prob_best = self.prob_best(site_id, variants, stats)?;

        let rows = listed
            .into_iter()
            .map(|v| {
                let (visitors, conversions) = index
                    .get(v.id.as_str())
                    .map(|s| (s.visitors, s.conversions))
                    .unwrap_or((0, 0));
                VariantReport {
                    variant_id: v.id.clone(),
                    status: v.status,
                    visitors,
                    conversions,
                    conversion_rate: conversion_rate(visitors, conversions),
                    prob_best: prob_best.get(&v.id).copied().unwrap_or(0.0),
                    patch: v.patch.clone(),
                }
            })
            .collect();
        Ok(rows)
    }
}
