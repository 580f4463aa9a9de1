//! Deal extraction and plausibility gate. Free-text coach output is not
//! structured; this module decides whether a proposed micro-habit is a
//! real, comparable commitment before the UI offers an accept control.

use crate::config::GateConfig;
use crate::types::Domain;
use crate::vocab;
use serde::Serialize;
use std::fmt;

/// Literal marker some coach responses embed instead of structured
/// deal fields.
pub const DEAL_MARKER: &str = "[DEAL_MADE]";

/// Label used when no better one can be derived from the response.
pub const DEFAULT_DEAL_LABEL: &str = "today's micro-habit";

// ---------------------------------------------------------------------------
// DealCandidate
// ---------------------------------------------------------------------------

/// Ephemeral per-turn candidate; discarded once the accept/dismiss
/// decision is made. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealCandidate {
    pub label: String,
    pub source_text: String,
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum DealDecision {
    Accept { label: String },
    Reject { reason: RejectReason },
}

impl DealDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, DealDecision::Accept { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyLabel,
    BelowEngagementFloor,
    DomainMismatch,
    UnquantifiedDeal,
    UnitMismatch,
    QuantityTooLow,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::EmptyLabel => "empty deal label",
            RejectReason::BelowEngagementFloor => "too few user messages since restart",
            RejectReason::DomainMismatch => "deal domain does not match goal domain",
            RejectReason::UnquantifiedDeal => "quantified goal but unquantified deal",
            RejectReason::UnitMismatch => "deal unit does not match goal unit",
            RejectReason::QuantityTooLow => "deal quantity below minimum fraction of goal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Signal extraction
// ---------------------------------------------------------------------------

/// Pull a deal label out of a coach turn. Structured fields win; the
/// literal marker plus keyword inference is the fallback.
pub fn extract_deal_label(
    response_text: &str,
    deal_made: Option<bool>,
    deal_label: Option<&str>,
) -> Option<String> {
    if let Some(label) = deal_label {
        let label = label.trim();
        if !label.is_empty() {
            return Some(label.to_string());
        }
    }
    if deal_made == Some(true) || response_text.contains(DEAL_MARKER) {
        return Some(derive_label(response_text));
    }
    None
}

/// Remove the literal deal marker from a coach reply. The marker is a
/// machine signal; the user never sees it and it is never persisted.
pub fn strip_marker(response_text: &str) -> String {
    if !response_text.contains(DEAL_MARKER) {
        return response_text.to_string();
    }
    response_text.replace(DEAL_MARKER, "").trim().to_string()
}

/// Heuristic label when the coach proposed a deal without naming one:
/// walk, workout, read, in that priority order.
pub fn derive_label(response_text: &str) -> String {
    let lower = response_text.to_lowercase();
    if lower.contains("walk") {
        "a short walk".to_string()
    } else if lower.contains("workout") {
        "a light workout".to_string()
    } else if lower.contains("read") {
        "a short read".to_string()
    } else {
        DEFAULT_DEAL_LABEL.to_string()
    }
}

// ---------------------------------------------------------------------------
// DealGate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct DealGate {
    config: GateConfig,
}

impl DealGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Decide whether a proposed deal is plausible enough to surface as
    /// an actionable commitment against the given goal.
    pub fn evaluate(
        &self,
        goal_title: &str,
        deal_label: &str,
        user_messages_since_restart: usize,
    ) -> DealDecision {
        let label = deal_label.trim();
        if label.is_empty() {
            return DealDecision::Reject {
                reason: RejectReason::EmptyLabel,
            };
        }

        if user_messages_since_restart < self.config.min_user_messages {
            return DealDecision::Reject {
                reason: RejectReason::BelowEngagementFloor,
            };
        }

        let domain = vocab::infer_domain(goal_title);
        if domain != Domain::Unknown && !vocab::contains_domain_keyword(label, domain) {
            return DealDecision::Reject {
                reason: RejectReason::DomainMismatch,
            };
        }

        let goal_quantity = vocab::extract_quantity(goal_title);
        let deal_quantity = vocab::extract_quantity(label);
        match (goal_quantity, deal_quantity) {
            (Some(_), None) => {
                // An unquantified deal cannot be judged against a
                // quantified goal.
                return DealDecision::Reject {
                    reason: RejectReason::UnquantifiedDeal,
                };
            }
            (Some(goal_q), Some(deal_q)) => {
                if goal_q.unit != deal_q.unit {
                    return DealDecision::Reject {
                        reason: RejectReason::UnitMismatch,
                    };
                }
                if goal_q.value > 0.0 && deal_q.value / goal_q.value < self.config.min_quantity_ratio
                {
                    return DealDecision::Reject {
                        reason: RejectReason::QuantityTooLow,
                    };
                }
            }
            _ => {}
        }

        DealDecision::Accept {
            label: label.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
