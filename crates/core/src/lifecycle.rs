//! Variant lifecycle: `pending_review -> active -> killed`.
//!
//! Only `active` variants contend for traffic. `killed` is terminal and
//! stamps `killed_at`.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::{EvoloopError, EvoloopResult};
use crate::types::{Variant, VariantStatus};

impl VariantStatus {
    pub fn can_transition_to(&self, next: VariantStatus) -> bool {
        matches!(
            (self, next),
            (VariantStatus::PendingReview, VariantStatus::Active)
                | (VariantStatus::PendingReview, VariantStatus::Killed)
                | (VariantStatus::Active, VariantStatus::Killed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        *self == VariantStatus::Killed
    }
}

/// Status for a newly created variant: the first one on a site goes live
/// immediately, later ones wait for review.
pub fn initial_status(site_id: &Uuid, existing: &[Variant]) -> VariantStatus {
    let has_active = existing
        .iter()
        .any(|v| v.site_id == *site_id && v.status == VariantStatus::Active);
    if has_active {
        VariantStatus::PendingReview
    } else {
        VariantStatus::Active
    }
}

impl Variant {
    pub fn new(
        id: impl Into<String>,
        site_id: Uuid,
        patch: serde_json::Value,
        existing: &[Variant],
    ) -> Self {
        Self {
            id: id.into(),
            site_id,
            patch,
            status: initial_status(&site_id, existing),
            created_at: Utc::now(),
            killed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == VariantStatus::Active
    }

    pub fn transition(&mut self, next: VariantStatus) -> EvoloopResult<()> {
        self.transition_at(next, Utc::now())
    }

    pub fn transition_at(&mut self, next: VariantStatus, at: DateTime<Utc>) -> EvoloopResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(EvoloopError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        let from = self.status;
        self.status = next;
        if next.is_terminal() {
            self.killed_at = Some(at);
        }
        info!(variant_id = %self.id, %from, to = %next, "variant transitioned");
        Ok(())
    }

    pub fn kill(&mut self) -> EvoloopResult<()> {
        self.transition(VariantStatus::Killed)
    }
}
