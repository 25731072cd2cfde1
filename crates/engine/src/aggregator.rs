//! Posterior aggregation: event counts -> Beta(1 + conversions, 1 + misses).
//!
//! Stats are a materialized view of the event log. They are always rebuilt
//! from counts, never nudged in place.

use std::collections::BTreeMap;

use chrono::Utc;
use evoloop_core::types::{Event, EventType, PosteriorStats};

/// Impression and conversion tallies for one variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub impressions: u64,
    pub conversions: u64,
}

impl EventCounts {
    pub fn new(impressions: u64, conversions: u64) -> Self {
        Self {
            impressions,
            conversions,
        }
    }

    pub fn record(&mut self, event_type: EventType) {
        match event_type {
            EventType::Impression => self.impressions += 1,
            EventType::Conversion => self.conversions += 1,
        }
    }
}

/// Percentage of visitors that converted; 0 when nobody has visited.
pub fn conversion_rate(visitors: u64, conversions: u64) -> f64 {
    if visitors == 0 {
        0.0
    } else {
        conversions as f64 / visitors as f64 * 100.0
    }
}

/// Rebuild a variant's posterior from its counts under a flat Beta(1,1) prior.
///
/// Conversions logged without a matching impression still count towards
/// alpha; `visitors` is raised to cover them so `visitors >= conversions`.
pub fn posterior_from_counts(variant_id: &str, counts: EventCounts) -> PosteriorStats {
    let EventCounts {
        impressions,
        conversions,
    } = counts;
    let visitors = impressions.max(conversions);
    let misses = impressions.saturating_sub(conversions);

    PosteriorStats {
        variant_id: variant_id.to_string(),
        visitors,
        conversions,
        alpha: 1.0 + conversions as f64,
        beta: 1.0 + misses as f64,
        conversion_rate: conversion_rate(visitors, conversions),
        prob_best: 0.0,
        updated_at: Utc::now(),
    }
}

/// Tally events per variant id.
pub fn count_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> BTreeMap<String, EventCounts> {
    let mut counts: BTreeMap<String, EventCounts> = BTreeMap::new();
    for event in events {
        counts
            .entry(event.variant_id.clone())
            .or_default()
            .record(event.event_type);
    }
    counts
}
