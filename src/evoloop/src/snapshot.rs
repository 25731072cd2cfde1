//! JSON snapshot of the records the engine works over. The surrounding
//! platform exports these; the CLI never writes them back.

use std::path::Path;

use evoloop_core::types::{Event, PosteriorStats, Site, Variant};
use evoloop_core::{EvoloopError, EvoloopResult};
use evoloop_engine::aggregator::{count_events, posterior_from_counts};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub stats: Vec<PosteriorStats>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Snapshot {
    pub fn load(path: &Path) -> EvoloopResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn site(&self, id: Uuid) -> EvoloopResult<&Site> {
        self.sites
            .iter()
            .find(|s| s.id == id)
            .ok_or(EvoloopError::SiteNotFound(id))
    }

    /// Stored stats when the export carries them, otherwise rebuilt from the
    /// event log (without prob-best).
    pub fn current_stats(&self) -> Vec<PosteriorStats> {
        if !self.stats.is_empty() {
            return self.stats.clone();
        }
        count_events(&self.events)
            .into_iter()
            .map(|(variant_id, counts)| posterior_from_counts(&variant_id, counts))
            .collect()
    }
}
