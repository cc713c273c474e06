//! Sync outcomes and reports.
//!
//! Reports are transient: built by one orchestration call and returned
//! straight to the caller. Nothing here is persisted.

use serde::{Deserialize, Serialize};

use super::direction::SyncDirection;
use super::resource::ResourceKind;

/// What happened to one item during a sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Item was missing in the target and has been created.
    Created,
    /// Item differed and the target was updated.
    Updated,
    /// Item already matched.
    Unchanged,
    /// Create or update failed; the rest of the batch continued.
    Failed(String),
    /// Item could not be keyed and was skipped.
    Invalid(String),
    /// Item needs attention the adapter cannot automate.
    ManualActionRequired(String),
}

impl OutcomeStatus {
    /// Whether the target store was written for this item.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        matches!(self, Self::Created | Self::Updated)
    }

    /// Whether the item counts as a failure in the report totals.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Unchanged => write!(f, "unchanged"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            Self::Invalid(reason) => write!(f, "invalid: {reason}"),
            Self::ManualActionRequired(reason) => write!(f, "manual action required: {reason}"),
        }
    }
}

/// Outcome for one source item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Identity key, when the item had one.
    pub identity_key: Option<String>,
    /// Display title.
    pub title: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
    /// Fields that differed, for updated or report-only differing items.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed_fields: Vec<String>,
}

impl SyncOutcome {
    #[must_use]
    pub fn new(identity_key: Option<String>, title: impl Into<String>, status: OutcomeStatus) -> Self {
        Self {
            identity_key,
            title: title.into(),
            status,
            changed_fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_changed_fields(mut self, changed_fields: Vec<String>) -> Self {
        self.changed_fields = changed_fields;
        self
    }
}

/// Aggregated result of one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// False only when the run aborted before applying anything.
    pub success: bool,
    pub kind: Option<ResourceKind>,
    pub direction: SyncDirection,
    pub total_synced: usize,
    pub total_failed: usize,
    pub outcomes: Vec<SyncOutcome>,
    pub message: String,
}

impl SyncReport {
    /// Build a report from per-item outcomes.
    #[must_use]
    pub fn from_outcomes(
        kind: ResourceKind,
        direction: SyncDirection,
        outcomes: Vec<SyncOutcome>,
    ) -> Self {
        let total_synced = outcomes.iter().filter(|o| o.status.is_synced()).count();
        let total_failed = outcomes.iter().filter(|o| o.status.is_failure()).count();
        let manual = outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::ManualActionRequired(_)))
            .count();

        let mut message = if total_synced == 0 && total_failed == 0 {
            format!("No {kind} changes to sync ({})", direction.label())
        } else {
            format!(
                "{total_synced} {kind} item(s) synced, {total_failed} failed ({})",
                direction.label()
            )
        };
        if manual > 0 {
            message.push_str(&format!("; {manual} need manual action"));
        }

        Self {
            success: true,
            kind: Some(kind),
            direction,
            total_synced,
            total_failed,
            outcomes,
            message,
        }
    }

    /// Build the top-level report for a run that aborted.
    #[must_use]
    pub fn failure(
        kind: Option<ResourceKind>,
        direction: SyncDirection,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            kind,
            direction,
            total_synced: 0,
            total_failed: 0,
            outcomes: Vec::new(),
            message: message.into(),
        }
    }

    /// Whether the run completed and no item failed.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.success && self.total_failed == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_report_totals() {
        let outcomes = vec![
            SyncOutcome::new(Some("a".into()), "A", OutcomeStatus::Created),
            SyncOutcome::new(Some("b".into()), "B", OutcomeStatus::Failed("boom".into())),
            SyncOutcome::new(Some("c".into()), "C", OutcomeStatus::Updated),
            SyncOutcome::new(Some("d".into()), "D", OutcomeStatus::Unchanged),
        ];

        let report =
            SyncReport::from_outcomes(ResourceKind::Products, SyncDirection::StageToProd, outcomes);

        assert!(report.success);
        assert_eq!(report.total_synced, 2);
        assert_eq!(report.total_failed, 1);
        assert!(!report.is_clean());
        assert!(report.message.contains("2 products item(s) synced"));
    }

    #[test]
    fn test_report_nothing_to_do() {
        let report =
            SyncReport::from_outcomes(ResourceKind::Menus, SyncDirection::ProdToStage, vec![]);
        assert!(report.is_clean());
        assert_eq!(report.message, "No menus changes to sync (Production → Staging)");
    }

    #[test]
    fn test_report_mentions_manual_action() {
        let outcomes = vec![SyncOutcome::new(
            Some("eu".into()),
            "EU",
            OutcomeStatus::ManualActionRequired("create manually".into()),
        )];
        let report = SyncReport::from_outcomes(
            ResourceKind::ShippingZones,
            SyncDirection::StageToProd,
            outcomes,
        );
        assert!(report.message.contains("1 need manual action"));
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = SyncOutcome::new(Some("a".into()), "A", OutcomeStatus::Failed("HTTP 422".into()));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "HTTP 422");
        assert_eq!(json["title"], "A");
    }

    #[test]
    fn test_failure_report_json_shape() {
        let report = SyncReport::failure(None, SyncDirection::StageToProd, "Missing STAGE_SHOP");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["direction"], "stage-to-prod");
        assert_eq!(json["message"], "Missing STAGE_SHOP");
        assert!(json["outcomes"].as_array().unwrap().is_empty());
    }
}
