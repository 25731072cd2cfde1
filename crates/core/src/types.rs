use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Sites ─────────────────────────────────────────────────────────────

/// A website under experimentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: Uuid,
    pub url: String,
    pub status: SiteStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    #[default]
    Analyzing,
    Running,
    Paused,
    Completed,
}

// ─── Variants ──────────────────────────────────────────────────────────

/// One candidate treatment of a site. `patch` is the opaque content payload
/// the client applies when this variant is served.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub site_id: Uuid,
    #[serde(default)]
    pub patch: serde_json::Value,
    pub status: VariantStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub killed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VariantStatus {
    PendingReview,
    Active,
    Killed,
}

impl VariantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantStatus::PendingReview => "pending_review",
            VariantStatus::Active => "active",
            VariantStatus::Killed => "killed",
        }
    }
}

impl std::fmt::Display for VariantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Events ────────────────────────────────────────────────────────────

/// An immutable visitor fact. Events are only ever counted, never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub variant_id: String,
    pub visitor_id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Impression,
    Conversion,
}

// ─── Posterior statistics ──────────────────────────────────────────────

/// Beta posterior parameters for one arm, as consumed by the selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmParams {
    pub variant_id: String,
    pub alpha: f64,
    pub beta: f64,
}

impl ArmParams {
    pub fn new(variant_id: impl Into<String>, alpha: f64, beta: f64) -> Self {
        Self {
            variant_id: variant_id.into(),
            alpha,
            beta,
        }
    }

    /// Beta(1,1): the arm nothing has been observed for yet.
    pub fn uninformative(variant_id: impl Into<String>) -> Self {
        Self::new(variant_id, 1.0, 1.0)
    }
}

impl<S: Into<String>> From<(S, f64, f64)> for ArmParams {
    fn from((variant_id, alpha, beta): (S, f64, f64)) -> Self {
        Self::new(variant_id, alpha, beta)
    }
}

/// Materialized view of a variant's events. Rebuilt wholesale from counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorStats {
    pub variant_id: String,
    pub visitors: u64,
    pub conversions: u64,
    pub alpha: f64,
    pub beta: f64,
    pub conversion_rate: f64,
    #[serde(default)]
    pub prob_best: f64,
    pub updated_at: DateTime<Utc>,
}

impl PosteriorStats {
    pub fn arm(&self) -> ArmParams {
        ArmParams::new(self.variant_id.clone(), self.alpha, self.beta)
    }
}

// ─── Engine outputs ────────────────────────────────────────────────────

/// Result of routing one visitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub variant_id: String,
    pub patch: serde_json::Value,
}

/// One row of a site's statistics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantReport {
    pub variant_id: String,
    pub status: VariantStatus,
    pub visitors: u64,
    pub conversions: u64,
    pub conversion_rate: f64,
    pub prob_best: f64,
    pub patch: serde_json::Value,
}
