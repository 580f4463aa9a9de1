//! Client for the remote coaching service, plus the offline fallback
//! used when the call fails or times out. The wire contract mirrors the
//! service's `/chat` endpoint; scoring fields are decoded and surfaced
//! verbatim, never computed locally.

use crate::chat::ChatMessage;
use crate::config::CoachConfig;
use crate::error::{HabitError, Result};
use crate::types::Domain;
use crate::vocab;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub user_message: String,
    pub current_goal: String,
    pub chat_history: Vec<WireMessage>,
}

/// The service only sees role and text; timestamps stay local.
#[derive(Debug, Serialize)]
pub struct WireMessage {
    pub role: String,
    pub text: String,
}

impl From<&ChatMessage> for WireMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.to_string(),
            text: msg.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub deal_made: Option<bool>,
    #[serde(default)]
    pub deal_label: Option<String>,
    #[serde(default)]
    pub empathy_score: Option<f64>,
    #[serde(default)]
    pub empathy_rationale: Option<String>,
    #[serde(default)]
    pub retry_used: Option<bool>,
    #[serde(default)]
    pub initial_empathy_score: Option<f64>,
    #[serde(default)]
    pub prompt_version: Option<String>,
}

// ---------------------------------------------------------------------------
// CoachClient
// ---------------------------------------------------------------------------

pub struct CoachClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl CoachClient {
    pub fn new(config: &CoachConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| HabitError::CoachUnavailable {
                reason: e.to_string(),
            })?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// One coaching turn. Transport failures, timeouts, and non-2xx
    /// statuses all surface as `CoachUnavailable`.
    pub fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let unavailable = |e: reqwest::Error| HabitError::CoachUnavailable {
            reason: e.to_string(),
        };
        let response = self
            .http
            .post(format!("{}/chat", self.base_url))
            .json(request)
            .send()
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json::<ChatResponse>()
            .map_err(unavailable)?;
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Offline fallback
// ---------------------------------------------------------------------------

const TIRED_HINTS: &[&str] = &["tired", "exhausted", "sleepy", "capek", "lelah", "ngantuk"];
const BUSY_HINTS: &[&str] = &["busy", "no time", "hectic", "sibuk"];
const READY_HINTS: &[&str] = &["ready", "let's go", "lets go", "motivated", "siap", "semangat"];

fn matches_any(text: &str, hints: &[&str]) -> bool {
    hints.iter().any(|h| text.contains(h))
}

/// Canned reply used when the coach is unreachable, so the flow never
/// stalls. Recognizable intents get a scaled-down deal suggestion that
/// the plausibility gate can actually accept: half the quantified ask,
/// phrased with a verb from the goal's own domain.
pub fn offline_reply(user_message: &str, goal_title: &str) -> ChatResponse {
    let text = user_message.to_lowercase();

    if matches_any(&text, TIRED_HINTS) {
        let label = offline_deal_label(goal_title);
        return ChatResponse {
            response: format!(
                "Totally get it, rest matters. How about {label} to keep the streak alive?"
            ),
            deal_made: Some(true),
            deal_label: Some(label),
            ..ChatResponse::default()
        };
    }

    if matches_any(&text, BUSY_HINTS) {
        let label = offline_deal_label(goal_title);
        return ChatResponse {
            response: format!(
                "Busy days happen! Could you fit in {label}? It keeps the habit pathway strong."
            ),
            deal_made: Some(true),
            deal_label: Some(label),
            ..ChatResponse::default()
        };
    }

    if matches_any(&text, READY_HINTS) {
        return ChatResponse {
            response: "Love the energy! Go crush the full goal today.".to_string(),
            ..ChatResponse::default()
        };
    }

    ChatResponse {
        response: "I can't reach your coach right now, but tiny steps still count. \
                   The smallest version of your goal keeps the streak alive."
            .to_string(),
        ..ChatResponse::default()
    }
}

/// Half the quantified ask with a same-domain verb, or a generic
/// smallest-version phrasing when the goal has no quantity.
fn offline_deal_label(goal_title: &str) -> String {
    let domain = vocab::infer_domain(goal_title);
    let verb = match domain {
        Domain::Read => "read",
        Domain::Move => "walk",
        Domain::Workout => "workout",
        Domain::Sleep => "sleep",
        Domain::Wellness => "stretch",
        Domain::Unknown => "try",
    };
    match vocab::extract_quantity(goal_title) {
        Some(q) => {
            let half = (q.value / 2.0).ceil();
            format!("{verb} {} {}", format_value(half), q.unit)
        }
        None => match domain {
            Domain::Unknown => "the smallest version of your goal".to_string(),
            _ => format!("just {verb} for a couple of minutes"),
        },
    }
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v:.1}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateConfig;
    use crate::deal::DealGate;

    fn client_for(server: &mockito::ServerGuard) -> CoachClient {
        CoachClient::new(&CoachConfig {
            base_url: server.url(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    fn request() -> ChatRequest {
        ChatRequest {
            user_message: "I'm tired".to_string(),
            current_goal: "Run 5 km".to_string(),
            chat_history: vec![],
        }
    }

    #[test]
    fn chat_decodes_full_response() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "response": "How about a 5 minute walk?",
                    "deal_made": true,
                    "deal_label": "walk 5 minutes",
                    "empathy_score": 4.0,
                    "empathy_rationale": "validates feelings",
                    "retry_used": false,
                    "prompt_version": "v1"
                }"#,
            )
            .create();

        let response = client_for(&server).chat(&request()).unwrap();
        mock.assert();
        assert_eq!(response.response, "How about a 5 minute walk?");
        assert_eq!(response.deal_made, Some(true));
        assert_eq!(response.deal_label.as_deref(), Some("walk 5 minutes"));
        assert_eq!(response.empathy_score, Some(4.0));
    }

    #[test]
    fn chat_tolerates_missing_optional_fields() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response": "Keep going!"}"#)
            .create();

        let response = client_for(&server).chat(&request()).unwrap();
        assert_eq!(response.response, "Keep going!");
        assert_eq!(response.deal_made, None);
        assert_eq!(response.deal_label, None);
    }

    #[test]
    fn server_error_is_typed_failure() {
        let mut server = mockito::Server::new();
        server.mock("POST", "/chat").with_status(500).create();

        let err = client_for(&server).chat(&request()).unwrap_err();
        assert!(matches!(err, HabitError::CoachUnavailable { .. }));
    }

    #[test]
    fn unreachable_host_is_typed_failure() {
        let client = CoachClient::new(&CoachConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_seconds: 1,
        })
        .unwrap();
        let err = client.chat(&request()).unwrap_err();
        assert!(matches!(err, HabitError::CoachUnavailable { .. }));
    }

    #[test]
    fn tired_intent_gets_half_goal_deal() {
        let reply = offline_reply("I'm so tired today", "Read 20 pages");
        assert_eq!(reply.deal_made, Some(true));
        assert_eq!(reply.deal_label.as_deref(), Some("read 10 pages"));
    }

    #[test]
    fn busy_intent_in_indonesian() {
        let reply = offline_reply("lagi sibuk banget", "Run 5 km");
        assert_eq!(reply.deal_made, Some(true));
        assert_eq!(reply.deal_label.as_deref(), Some("walk 3 km"));
    }

    #[test]
    fn ready_intent_proposes_no_deal() {
        let reply = offline_reply("I'm ready, let's go!", "Run 5 km");
        assert_eq!(reply.deal_made, None);
        assert!(reply.response.contains("full goal"));
    }

    #[test]
    fn unrecognized_intent_is_plain_fallback() {
        let reply = offline_reply("what should I do", "Run 5 km");
        assert_eq!(reply.deal_made, None);
        assert!(!reply.response.is_empty());
    }

    #[test]
    fn offline_deal_passes_the_gate() {
        // The canned suggestion must survive the plausibility gate,
        // otherwise the offline flow would stall exactly when it is
        // needed.
        let gate = DealGate::new(GateConfig::default());
        for goal in ["Read 20 pages", "Run 5 km", "Workout 1 hour"] {
            let label = offline_deal_label(goal);
            assert!(
                gate.evaluate(goal, &label, 3).is_accept(),
                "offline label '{label}' rejected for goal '{goal}'"
            );
        }
    }

    #[test]
    fn hour_goal_halves_in_minutes() {
        assert_eq!(offline_deal_label("Workout 1 hour"), "workout 30 minutes");
    }

    #[test]
    fn unquantified_goal_gets_domain_phrase() {
        assert_eq!(
            offline_deal_label("Meditate every morning"),
            "just stretch for a couple of minutes"
        );
        assert_eq!(
            offline_deal_label("Stay active"),
            "the smallest version of your goal"
        );
    }
}
