//! Completion-claim detector: flags user messages that already describe
//! finishing the day's goal so the mark-done control can be offered
//! without waiting for the coach.

use crate::vocab;

/// True if the message claims full completion of the day's goal.
///
/// A partial-progress hint anywhere short-circuits to false. Otherwise
/// a strong completion phrase is required, backed by either contextual
/// evidence ("today", "goal", ...) or an explicit quantity-plus-unit
/// token. Whether the day is already marked done is the caller's check
/// against the ledger.
pub fn claims_completion(message: &str) -> bool {
    let text = message.trim().to_lowercase();
    if text.is_empty() {
        return false;
    }
    if vocab::has_partial_hint(&text) {
        return false;
    }
    if !vocab::has_completion_phrase(&text) {
        return false;
    }
    vocab::has_context_token(&text) || vocab::has_claim_quantity(&text)
}
