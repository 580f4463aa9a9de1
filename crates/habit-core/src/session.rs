//! Chat session service: wires the store, config, plausibility gate,
//! and coach client into the per-turn pipeline.

use crate::chat::{self, ChatMessage};
use crate::claim;
use crate::coach::{self, ChatRequest, CoachClient, WireMessage};
use crate::config::HabitConfig;
use crate::deal::{self, DealCandidate, DealDecision, DealGate};
use crate::error::{HabitError, Result};
use crate::store::Store;
use chrono::{DateTime, Utc};
use std::path::Path;

// ---------------------------------------------------------------------------
// ReplyGuard
// ---------------------------------------------------------------------------

/// Monotonic request-generation counter. Each outgoing coach request
/// takes a token; a reply may only be applied if no later token has
/// been applied already, so slow replies from superseded requests are
/// dropped instead of overwriting newer state.
#[derive(Debug, Default)]
pub struct ReplyGuard {
    next: u64,
    applied: u64,
}

impl ReplyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> u64 {
        let token = self.next;
        self.next += 1;
        token
    }

    /// True if the reply for `token` is still current. Applying a token
    /// invalidates every earlier one.
    pub fn try_apply(&mut self, token: u64) -> bool {
        if token < self.applied {
            return false;
        }
        self.applied = token + 1;
        true
    }
}

// ---------------------------------------------------------------------------
// TurnOutcome
// ---------------------------------------------------------------------------

/// Everything a caller needs to render one chat turn.
#[derive(Debug)]
pub struct TurnOutcome {
    pub reply: String,
    /// A gate-approved deal proposal, if this turn produced one.
    pub deal: Option<DealCandidate>,
    /// The user's message claims today's goal is already done (and the
    /// ledger does not show it done yet).
    pub completion_claim: bool,
    /// The reply came from the offline fallback, not the coach.
    pub offline: bool,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    store: Store,
    gate: DealGate,
    client: CoachClient,
    guard: ReplyGuard,
}

impl Session {
    pub fn open(root: &Path) -> Result<Self> {
        let config = HabitConfig::load(root)?;
        Self::with_config(root, &config)
    }

    pub fn with_config(root: &Path, config: &HabitConfig) -> Result<Self> {
        Ok(Self {
            store: Store::open(root),
            gate: DealGate::new(config.gate.clone()),
            client: CoachClient::new(&config.coach)?,
            guard: ReplyGuard::new(),
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// One full chat turn: validate, detect a completion claim, call the
    /// coach (falling back offline), gate any proposed deal, and persist
    /// both sides of the exchange.
    pub fn send_message(&mut self, message: &str, now: DateTime<Utc>) -> Result<TurnOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Err(HabitError::EmptyMessage);
        }
        let timeline = self.store.timeline(now);
        let goal_title = timeline
            .active_goal()
            .map(|g| g.title.clone())
            .ok_or(HabitError::GoalNotSet)?;

        let completion_claim =
            claim::claims_completion(message) && !self.store.ledger().is_done(now.date_naive());

        // Counted before this turn is appended; the current message does
        // not raise its own engagement floor.
        let history = self.store.chat_history();
        let prior_user_messages = chat::user_messages_since_restart(&history);

        let request = ChatRequest {
            user_message: message.to_string(),
            current_goal: goal_title.clone(),
            chat_history: chat::recent_turns(&history)
                .iter()
                .map(WireMessage::from)
                .collect(),
        };

        let token = self.guard.issue();
        let (response, offline) = match self.client.chat(&request) {
            Ok(response) => (response, false),
            Err(HabitError::CoachUnavailable { .. }) => {
                (coach::offline_reply(message, &goal_title), true)
            }
            Err(e) => return Err(e),
        };
        if !self.guard.try_apply(token) {
            // A newer request has already landed; drop this reply.
            return Ok(TurnOutcome {
                reply: String::new(),
                deal: None,
                completion_claim,
                offline,
            });
        }

        // Label extraction reads the raw text (the marker is the
        // signal); everything shown or persisted gets the cleaned text.
        let reply = deal::strip_marker(&response.response);
        let deal = deal::extract_deal_label(
            &response.response,
            response.deal_made,
            response.deal_label.as_deref(),
        )
        .and_then(
            |label| match self.gate.evaluate(&goal_title, &label, prior_user_messages) {
                DealDecision::Accept { label } => Some(DealCandidate {
                    label,
                    source_text: reply.clone(),
                }),
                DealDecision::Reject { .. } => None,
            },
        );

        self.store.append_chat(&[
            ChatMessage::user(message, now),
            ChatMessage::model(reply.as_str(), now),
        ])?;

        Ok(TurnOutcome {
            reply,
            deal,
            completion_claim,
            offline,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoachConfig;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap()
    }

    fn setup(dir: &TempDir, base_url: &str) -> Session {
        let store = Store::open(dir.path());
        store.init().unwrap();
        let mut timeline = store.timeline(now());
        timeline.start_new_goal("Read 20 pages", now());
        store.save_timeline(&timeline).unwrap();

        let config = HabitConfig {
            coach: CoachConfig {
                base_url: base_url.to_string(),
                timeout_seconds: 5,
            },
            ..HabitConfig::default()
        };
        Session::with_config(dir.path(), &config).unwrap()
    }

    fn coach_mock(server: &mut mockito::ServerGuard, body: &str) -> mockito::Mock {
        server
            .mock("POST", "/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create()
    }

    #[test]
    fn empty_message_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut session = setup(&dir, "http://127.0.0.1:1");
        let err = session.send_message("   ", now()).unwrap_err();
        assert!(matches!(err, HabitError::EmptyMessage));
    }

    #[test]
    fn chat_without_goal_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        store.init().unwrap();
        let mut session = Session::with_config(dir.path(), &HabitConfig::default()).unwrap();
        let err = session.send_message("hello", now()).unwrap_err();
        assert!(matches!(err, HabitError::GoalNotSet));
    }

    #[test]
    fn turn_persists_both_sides() {
        let mut server = mockito::Server::new();
        coach_mock(&mut server, r#"{"response": "Nice, keep at it!"}"#);

        let dir = TempDir::new().unwrap();
        let mut session = setup(&dir, &server.url());
        let outcome = session.send_message("feeling good", now()).unwrap();
        assert_eq!(outcome.reply, "Nice, keep at it!");
        assert!(!outcome.offline);

        let history = session.store().chat_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "feeling good");
        assert_eq!(history[1].text, "Nice, keep at it!");
    }

    #[test]
    fn unreachable_coach_falls_back_offline() {
        let dir = TempDir::new().unwrap();
        let mut session = setup(&dir, "http://127.0.0.1:1");
        let outcome = session.send_message("I'm tired today", now()).unwrap();
        assert!(outcome.offline);
        assert!(!outcome.reply.is_empty());
        // The exchange is still persisted.
        assert_eq!(session.store().chat_history().len(), 2);
    }

    #[test]
    fn deal_below_engagement_floor_is_suppressed() {
        let mut server = mockito::Server::new();
        coach_mock(
            &mut server,
            r#"{"response": "How about 10 pages?", "deal_made": true, "deal_label": "read 10 pages"}"#,
        );

        let dir = TempDir::new().unwrap();
        let mut session = setup(&dir, &server.url());
        // First user turn: zero prior user messages, floor is three.
        let outcome = session.send_message("too tired", now()).unwrap();
        assert!(outcome.deal.is_none());
        assert_eq!(outcome.reply, "How about 10 pages?");
    }

    #[test]
    fn deal_surfaces_after_enough_engagement() {
        let mut server = mockito::Server::new();
        coach_mock(
            &mut server,
            r#"{"response": "Deal: just 10 pages.", "deal_made": true, "deal_label": "read 10 pages"}"#,
        );

        let dir = TempDir::new().unwrap();
        let mut session = setup(&dir, &server.url());
        for i in 0..3 {
            session.send_message(format!("turn {i}").as_str(), now()).unwrap();
        }
        // Fourth turn: three prior user messages on record.
        let outcome = session.send_message("ok, what's the deal", now()).unwrap();
        let deal = outcome.deal.expect("deal should pass the gate");
        assert_eq!(deal.label, "read 10 pages");
        assert_eq!(deal.source_text, "Deal: just 10 pages.");
    }

    #[test]
    fn implausible_deal_is_suppressed() {
        let mut server = mockito::Server::new();
        coach_mock(
            &mut server,
            r#"{"response": "Just 1 page!", "deal_made": true, "deal_label": "read 1 page"}"#,
        );

        let dir = TempDir::new().unwrap();
        let mut session = setup(&dir, &server.url());
        for i in 0..3 {
            session.send_message(format!("turn {i}").as_str(), now()).unwrap();
        }
        let outcome = session.send_message("make it tiny", now()).unwrap();
        assert!(outcome.deal.is_none());
    }

    #[test]
    fn marker_is_stripped_from_reply_and_history() {
        let mut server = mockito::Server::new();
        coach_mock(
            &mut server,
            r#"{"response": "How about a quick walk? [DEAL_MADE]"}"#,
        );

        let dir = TempDir::new().unwrap();
        let mut session = setup(&dir, &server.url());
        let outcome = session.send_message("so busy today", now()).unwrap();
        assert_eq!(outcome.reply, "How about a quick walk?");

        let history = session.store().chat_history();
        assert_eq!(history[1].text, "How about a quick walk?");
        assert!(!history[1].text.contains("[DEAL_MADE]"));
    }

    #[test]
    fn completion_claim_flagged_when_day_not_done() {
        let mut server = mockito::Server::new();
        coach_mock(&mut server, r#"{"response": "Amazing work!"}"#);

        let dir = TempDir::new().unwrap();
        let mut session = setup(&dir, &server.url());
        let outcome = session
            .send_message("I finished my 20 pages today", now())
            .unwrap();
        assert!(outcome.completion_claim);
    }

    #[test]
    fn completion_claim_silent_when_already_done() {
        let mut server = mockito::Server::new();
        coach_mock(&mut server, r#"{"response": "Amazing work!"}"#);

        let dir = TempDir::new().unwrap();
        let mut session = setup(&dir, &server.url());
        session.store().mark_done(now().date_naive()).unwrap();
        let outcome = session
            .send_message("I finished my 20 pages today", now())
            .unwrap();
        assert!(!outcome.completion_claim);
    }

    #[test]
    fn guard_drops_stale_tokens() {
        let mut guard = ReplyGuard::new();
        let first = guard.issue();
        let second = guard.issue();
        assert!(guard.try_apply(second));
        assert!(!guard.try_apply(first));
    }

    #[test]
    fn guard_applies_in_order() {
        let mut guard = ReplyGuard::new();
        let first = guard.issue();
        let second = guard.issue();
        assert!(guard.try_apply(first));
        assert!(guard.try_apply(second));
    }
}
