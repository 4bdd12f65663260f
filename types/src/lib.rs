//! Core domain types for Civil.
//!
//! This crate contains pure domain types with no IO and no async: the
//! classifier verdict model, the advisory severity tiers derived from it,
//! and the wire schemas of the analysis contract. Everything here can be
//! used from any layer of the application.

use serde::{Deserialize, Serialize};

// ============================================================================
// Verdict Actions
// ============================================================================

/// What the classifier asked us to do with the composed text.
///
/// This enum is the only part of a verdict that drives control flow; the
/// numeric analysis metadata is display-only. Unknown action strings fail
/// deserialization, so an ambiguous verdict can never be interpreted as
/// "safe" (or as "block") by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Text is fine; make sure nothing of ours is on screen.
    Allow,
    /// Text stays, but an advisory is shown.
    Alert,
    /// Text is cleared from the field and a blocking advisory is shown.
    BlockAndAlert,
    /// Like `BlockAndAlert`, with a suggested rewrite on offer.
    BlockAndRewrite,
}

impl Action {
    /// True for the actions that force-clear the target field.
    #[must_use]
    pub const fn blocks(self) -> bool {
        matches!(self, Self::BlockAndAlert | Self::BlockAndRewrite)
    }

    /// The visual category of the advisory this action produces, or `None`
    /// for `Allow` (which never renders one).
    ///
    /// Tier selection is a pure function of the action. The severity score
    /// in [`Analysis`] never participates.
    #[must_use]
    pub const fn tier(self) -> Option<Tier> {
        match self {
            Self::Allow => None,
            Self::Alert => Some(Tier::Advisory),
            Self::BlockAndAlert => Some(Tier::Blocked),
            Self::BlockAndRewrite => Some(Tier::BlockedWithSuggestion),
        }
    }

    /// Wire name of the action, as the classifier spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Alert => "alert",
            Self::BlockAndAlert => "block_and_alert",
            Self::BlockAndRewrite => "block_and_rewrite",
        }
    }
}

/// Visual category of an advisory panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Advisory only; the text was left alone.
    Advisory,
    /// The text was cleared and blocked.
    Blocked,
    /// The text was cleared and blocked, and a rewrite is on offer.
    BlockedWithSuggestion,
}

// ============================================================================
// Classifier Wire Schemas
// ============================================================================

/// Outbound analysis request body.
///
/// The caller identity is a constant; there is no per-user session
/// management anywhere in the core.
#[derive(Debug, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub message: &'a str,
    pub user_id: &'a str,
}

/// Scoring metadata attached to a verdict.
///
/// Display-only. Every field is defaulted so a sparse payload still decodes;
/// fields this struct does not name (e.g. a service timestamp) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub severity: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// A complete classifier verdict.
///
/// Only `action` is required on the wire: a response without one (or with an
/// action this core does not know) is malformed and fails closed upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct Decision {
    pub action: Action,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub rewrite: Option<String>,
    #[serde(default)]
    pub analysis: Analysis,
}

impl Decision {
    /// The rewrite string, if the verdict carried a non-empty one.
    #[must_use]
    pub fn offered_rewrite(&self) -> Option<&str> {
        self.rewrite.as_deref().filter(|r| !r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, Decision, Tier};

    #[test]
    fn action_tier_is_pure_function_of_action() {
        assert_eq!(Action::Allow.tier(), None);
        assert_eq!(Action::Alert.tier(), Some(Tier::Advisory));
        assert_eq!(Action::BlockAndAlert.tier(), Some(Tier::Blocked));
        assert_eq!(
            Action::BlockAndRewrite.tier(),
            Some(Tier::BlockedWithSuggestion)
        );
    }

    #[test]
    fn blocking_actions() {
        assert!(!Action::Allow.blocks());
        assert!(!Action::Alert.blocks());
        assert!(Action::BlockAndAlert.blocks());
        assert!(Action::BlockAndRewrite.blocks());
    }

    #[test]
    fn decodes_full_verdict() {
        let json = r#"{
            "action": "block_and_rewrite",
            "reason": "Contains insult",
            "rewrite": "You are not being helpful",
            "analysis": {"severity": 55, "label": "insult", "score": 0.91},
            "timestamp": "2024-11-02T10:00:00Z"
        }"#;
        let decision: Decision = serde_json::from_str(json).unwrap();
        assert_eq!(decision.action, Action::BlockAndRewrite);
        assert_eq!(decision.reason, "Contains insult");
        assert_eq!(decision.offered_rewrite(), Some("You are not being helpful"));
        assert!((decision.analysis.severity - 55.0).abs() < f64::EPSILON);
        assert_eq!(decision.analysis.label.as_deref(), Some("insult"));
    }

    #[test]
    fn decodes_sparse_allow_verdict() {
        let decision: Decision = serde_json::from_str(r#"{"action": "allow"}"#).unwrap();
        assert_eq!(decision.action, Action::Allow);
        assert!(decision.reason.is_empty());
        assert_eq!(decision.offered_rewrite(), None);
    }

    #[test]
    fn null_rewrite_is_absent() {
        let decision: Decision =
            serde_json::from_str(r#"{"action": "alert", "rewrite": null}"#).unwrap();
        assert_eq!(decision.offered_rewrite(), None);
    }

    #[test]
    fn empty_rewrite_is_not_offered() {
        let decision: Decision =
            serde_json::from_str(r#"{"action": "block_and_rewrite", "rewrite": ""}"#).unwrap();
        assert_eq!(decision.offered_rewrite(), None);
    }

    #[test]
    fn missing_action_is_malformed() {
        let result = serde_json::from_str::<Decision>(r#"{"reason": "no verdict"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_action_is_malformed() {
        let result = serde_json::from_str::<Decision>(r#"{"action": "warn"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn request_body_shape() {
        let body = super::AnalyzeRequest {
            message: "hello",
            user_id: "browser_user",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message": "hello", "user_id": "browser_user"})
        );
    }
}
