//! Live traffic assignment for a running site.

use evoloop_core::types::{Assignment, PosteriorStats, Site, SiteStatus, Variant};
use evoloop_core::{EvoloopError, EvoloopResult};
use tracing::warn;

use crate::engine::{active_arms, stats_index, AllocationEngine};

impl AllocationEngine {
    /// Route `visitor_id` to one of the site's active variants. The same
    /// visitor lands on the same variant while the stats are unchanged.
    pub fn assign(
        &self,
        site: &Site,
        variants: &[Variant],
        stats: &[PosteriorStats],
        visitor_id: &str,
    ) -> EvoloopResult<Assignment> {
        if site.status != SiteStatus::Running {
            return Err(EvoloopError::SiteNotRunning(site.id));
        }

        let index = stats_index(stats);
        let arms = active_arms(&site.id, variants, &index);
        let skipped = variants
            .iter()
            .filter(|v| v.site_id == site.id && !v.is_active())
            .count();
        if skipped > 0 {
            warn!(site_id = %site.id, skipped, "ignoring inactive variants for assignment");
        }

        let variant_id = self.selector().select_variant(&arms, Some(visitor_id))?;
        let variant = variants
            .iter()
            .find(|v| v.site_id == site.id && v.id == variant_id)
            .ok_or_else(|| EvoloopError::VariantNotFound(variant_id.clone()))?;

        Ok(Assignment {
            variant_id,
            patch: variant.patch.clone(),
        })
    }
}
