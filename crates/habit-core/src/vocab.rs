//! Vocabulary tables and pure text heuristics shared by the deal gate
//! and the completion-claim detector. Everything here is a function of
//! its input text only, so the tables can be enumerated directly in
//! property tests.

use crate::types::Domain;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Units & quantities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Km,
    Pages,
    Minutes,
    Hours,
    Steps,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Km => "km",
            Unit::Pages => "pages",
            Unit::Minutes => "minutes",
            Unit::Hours => "hours",
            Unit::Steps => "steps",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit synonym table, including Indonesian variants. Matching is
/// case-insensitive.
pub const UNIT_SYNONYMS: &[(&str, Unit)] = &[
    ("kilometers", Unit::Km),
    ("kilometres", Unit::Km),
    ("kilometer", Unit::Km),
    ("kilometre", Unit::Km),
    ("km", Unit::Km),
    ("pages", Unit::Pages),
    ("page", Unit::Pages),
    ("halaman", Unit::Pages),
    ("minutes", Unit::Minutes),
    ("minute", Unit::Minutes),
    ("mins", Unit::Minutes),
    ("min", Unit::Minutes),
    ("menit", Unit::Minutes),
    ("hours", Unit::Hours),
    ("hour", Unit::Hours),
    ("hrs", Unit::Hours),
    ("hr", Unit::Hours),
    ("jam", Unit::Hours),
    ("steps", Unit::Steps),
    ("step", Unit::Steps),
    ("langkah", Unit::Steps),
];

/// English and Indonesian number words, one through ten.
pub const NUMBER_WORDS: &[(&str, f64)] = &[
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("satu", 1.0),
    ("dua", 2.0),
    ("tiga", 3.0),
    ("empat", 4.0),
    ("lima", 5.0),
    ("enam", 6.0),
    ("tujuh", 7.0),
    ("delapan", 8.0),
    ("sembilan", 9.0),
    ("sepuluh", 10.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    /// Hours are normalized to minutes so "1 hour" and "30 minutes" are
    /// comparable.
    pub fn normalized(self) -> Quantity {
        match self.unit {
            Unit::Hours => Quantity {
                value: self.value * 60.0,
                unit: Unit::Minutes,
            },
            _ => self,
        }
    }
}

fn unit_alternation() -> String {
    let mut names: Vec<&str> = UNIT_SYNONYMS.iter().map(|(s, _)| *s).collect();
    names.sort_by_key(|s| std::cmp::Reverse(s.len()));
    names.join("|")
}

fn digit_quantity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)\b(\d+(?:[.,]\d+)?)\s*({})\b",
            unit_alternation()
        ))
        .unwrap()
    })
}

fn word_quantity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let mut words: Vec<&str> = NUMBER_WORDS.iter().map(|(s, _)| *s).collect();
        words.sort_by_key(|s| std::cmp::Reverse(s.len()));
        Regex::new(&format!(
            r"(?i)\b({})\s+({})\b",
            words.join("|"),
            unit_alternation()
        ))
        .unwrap()
    })
}

fn lookup_unit(s: &str) -> Option<Unit> {
    let s = s.to_lowercase();
    UNIT_SYNONYMS
        .iter()
        .find(|(name, _)| *name == s)
        .map(|(_, unit)| *unit)
}

fn lookup_number_word(s: &str) -> Option<f64> {
    let s = s.to_lowercase();
    NUMBER_WORDS
        .iter()
        .find(|(name, _)| *name == s)
        .map(|(_, value)| *value)
}

/// Extract the first `{value, unit}` quantity from free text: numeric
/// token plus unit first, then the number-word fallback. The result is
/// already hour-normalized.
pub fn extract_quantity(text: &str) -> Option<Quantity> {
    if let Some(caps) = digit_quantity_re().captures(text) {
        let raw = caps[1].replace(',', ".");
        let value: f64 = raw.parse().ok()?;
        let unit = lookup_unit(&caps[2])?;
        return Some(Quantity { value, unit }.normalized());
    }
    if let Some(caps) = word_quantity_re().captures(text) {
        let value = lookup_number_word(&caps[1])?;
        let unit = lookup_unit(&caps[2])?;
        return Some(Quantity { value, unit }.normalized());
    }
    None
}

// ---------------------------------------------------------------------------
// Domains
// ---------------------------------------------------------------------------

/// Keyword sets per domain; token-matched, first domain with a hit
/// wins. Matching is exact on lowercased tokens, so "already" does not
/// land in `read`.
pub const DOMAIN_KEYWORDS: &[(Domain, &[&str])] = &[
    (
        Domain::Read,
        &[
            "read", "reading", "baca", "membaca", "book", "books", "buku", "page", "pages",
            "halaman", "chapter", "chapters",
        ],
    ),
    (
        Domain::Move,
        &[
            "run", "running", "lari", "berlari", "walk", "walking", "jalan", "jog", "jogging",
            "step", "steps", "langkah", "km", "kilometer", "kilometers", "hike", "hiking",
        ],
    ),
    (
        Domain::Workout,
        &[
            "workout", "workouts", "gym", "exercise", "exercises", "pushup", "pushups", "push-up",
            "push-ups", "squat", "squats", "plank", "olahraga", "latihan",
        ],
    ),
    (
        Domain::Sleep,
        &["sleep", "sleeping", "tidur", "bed", "bedtime", "nap"],
    ),
    (
        Domain::Wellness,
        &[
            "meditate", "meditating", "meditation", "meditasi", "stretch", "stretching",
            "peregangan", "breathe", "breathing", "mindfulness", "journal", "journaling",
        ],
    ),
];

fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

pub fn domain_keywords(domain: Domain) -> &'static [&'static str] {
    DOMAIN_KEYWORDS
        .iter()
        .find(|(d, _)| *d == domain)
        .map(|(_, kws)| *kws)
        .unwrap_or(&[])
}

/// True if any token of `text` is a keyword of `domain`.
pub fn contains_domain_keyword(text: &str, domain: Domain) -> bool {
    let kws = domain_keywords(domain);
    tokens(text).iter().any(|t| kws.contains(&t.as_str()))
}

/// Infer a coarse activity domain from keyword sets, in table order.
pub fn infer_domain(text: &str) -> Domain {
    let toks = tokens(text);
    for (domain, kws) in DOMAIN_KEYWORDS {
        if toks.iter().any(|t| kws.contains(&t.as_str())) {
            return *domain;
        }
    }
    Domain::Unknown
}

// ---------------------------------------------------------------------------
// Claim vocabulary
// ---------------------------------------------------------------------------

/// Partial-progress hints; any hit short-circuits the claim detector.
pub const PARTIAL_HINTS: &[&str] = &[
    "almost", "nearly", "half", "some", "a bit", "halfway", "hampir", "setengah", "sedikit",
    "sebagian",
];

/// Strong completion verbs/phrases.
pub const COMPLETION_PHRASES: &[&str] = &[
    "completed",
    "finished",
    "done",
    "did it",
    "accomplished",
    "sudah selesai",
    "selesai",
    "tuntas",
    "berhasil",
    "beres",
];

/// Contextual evidence tokens tying a claim to the day's goal.
pub const CONTEXT_TOKENS: &[&str] = &["today", "hari ini", "goal"];

fn phrase_re(phrases: &[&str]) -> Regex {
    let mut sorted: Vec<&str> = phrases.to_vec();
    sorted.sort_by_key(|s| std::cmp::Reverse(s.len()));
    Regex::new(&format!(r"(?i)\b({})\b", sorted.join("|"))).unwrap()
}

pub fn has_partial_hint(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| phrase_re(PARTIAL_HINTS)).is_match(text)
}

pub fn has_completion_phrase(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| phrase_re(COMPLETION_PHRASES)).is_match(text)
}

pub fn has_context_token(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| phrase_re(CONTEXT_TOKENS)).is_match(text)
}

/// Digits followed by a unit token. Claims accept a wider unit list
/// than the deal gate (push-ups and reps count as evidence).
pub fn has_claim_quantity(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)\b\d+(?:[.,]\d+)?\s*({}|pushups?|push-ups?|reps?)\b",
            unit_alternation()
        ))
        .unwrap()
    })
    .is_match(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
