//! Continuation detection
//!
//! Decides whether a new message answers a pending specialist question or
//! opens a new topic. Misrouting a bare reply like "5 acres" through the
//! intent analyzer would send it to the wrong specialist, so these rules run
//! before any analysis. Ordered, first match wins:
//!
//! 1. No active specialist, or not expecting a reply → new topic.
//! 2. Explicit topic-switch phrasing → new topic, even with an active
//!    specialist.
//! 3. The query carries the *type* of data previously requested (quantities
//!    with units, currency amounts, domain keywords plus numbers) →
//!    continuation.
//! 4. Short query starting with a continuation discourse marker → continuation.
//! 5. Otherwise → new topic.

use crate::session::entities::Session;
use crate::session::extraction::{EntityExtractor, RegexEntityExtractor};
use regex::Regex;

/// Outcome of a continuation check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinuationDecision {
    /// The message answers the active specialist's pending question
    Continue { specialist: String },
    /// The message starts a new topic and should be routed fresh
    NewTopic,
}

impl ContinuationDecision {
    pub fn is_continuation(&self) -> bool {
        matches!(self, ContinuationDecision::Continue { .. })
    }
}

/// Strategy for continuation detection, pluggable so a model-based
/// classifier can replace the heuristic one without touching the orchestrator.
pub trait ContinuationClassifier: Send + Sync {
    fn classify(&self, session: &Session, query: &str) -> ContinuationDecision;
}

/// Phrases that explicitly abandon the pending conversation
const TOPIC_SWITCH_INDICATORS: &[&str] = &[
    "let's talk about",
    "lets talk about",
    "now tell me about",
    "what about",
    "instead",
    "rather than",
    "forget that",
    "never mind",
    "actually",
    "change topic",
    "different question",
    "new question",
];

/// Domain keywords that mark a reply as carrying requested information
/// when paired with a number
const REQUESTED_INFO_KEYWORDS: &[&str] = &[
    "acres", "hectares", "quintals", "cost", "spend", "annual", "fertilizer", "water",
    "irrigation", "labor", "machinery", "production", "yield", "price", "selling", "farm", "land",
];

/// Short replies starting with one of these read as continuations
const FOLLOWUP_MARKERS: &[&str] = &[
    "also",
    "and",
    "my",
    "i ",
    "i'",
    "yes",
    "no",
    "that is",
    "it is",
    "here are",
    "the",
    "additionally",
    "plus",
    "furthermore",
];

const SHORT_REPLY_WORDS: usize = 10;

/// Rule-based classifier implementing the ordered rules above
pub struct HeuristicContinuationClassifier {
    extractor: RegexEntityExtractor,
    answer_patterns: Vec<Regex>,
    has_number: Regex,
}

impl HeuristicContinuationClassifier {
    pub fn new() -> Self {
        Self {
            extractor: RegexEntityExtractor::new(),
            answer_patterns: vec![
                Regex::new(r"my\s+(farm|land|cost|production|spend)").unwrap(),
                Regex::new(r"i\s+(have|spend|produce|own|grow)").unwrap(),
            ],
            has_number: Regex::new(r"\d").unwrap(),
        }
    }

    fn is_topic_switch(&self, query: &str) -> bool {
        TOPIC_SWITCH_INDICATORS.iter().any(|p| query.contains(p))
    }

    /// Rule 3: the query carries the kind of data a specialist asks for
    fn contains_requested_information(&self, query: &str) -> bool {
        if self.extractor.extract(query).has_quantities() {
            return true;
        }
        let has_keyword = REQUESTED_INFO_KEYWORDS.iter().any(|k| query.contains(k));
        if has_keyword && self.has_number.is_match(query) {
            return true;
        }
        self.answer_patterns.iter().any(|p| p.is_match(query))
    }

    /// Rule 4: short reply opening with a continuation discourse marker
    fn seems_like_followup(&self, query: &str) -> bool {
        if query.split_whitespace().count() > SHORT_REPLY_WORDS {
            return false;
        }
        FOLLOWUP_MARKERS.iter().any(|m| query.starts_with(m))
    }
}

impl Default for HeuristicContinuationClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ContinuationClassifier for HeuristicContinuationClassifier {
    fn classify(&self, session: &Session, query: &str) -> ContinuationDecision {
        let Some(active) = session.active_specialist() else {
            return ContinuationDecision::NewTopic;
        };
        if !session.expecting_response() {
            return ContinuationDecision::NewTopic;
        }

        let query = query.to_lowercase();
        let query = query.trim();

        if self.is_topic_switch(query) {
            return ContinuationDecision::NewTopic;
        }

        if self.contains_requested_information(query) || self.seems_like_followup(query) {
            return ContinuationDecision::Continue {
                specialist: active.to_string(),
            };
        }

        ContinuationDecision::NewTopic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::SpecialistResult;
    use crate::session::entities::Interaction;
    use crate::session::extraction::ExtractedEntities;

    fn waiting_session(specialist: &str) -> Session {
        let mut session = Session::new("s1");
        let response = SpecialistResult::new(specialist, "A few questions first.", 0.5)
            .needs_input(vec!["land_size".into()], "1. What is your farm size?");
        session.record(Interaction::new(
            "initial query",
            specialist,
            response,
            ExtractedEntities::default(),
            false,
        ));
        session
    }

    fn classify(session: &Session, query: &str) -> ContinuationDecision {
        HeuristicContinuationClassifier::new().classify(session, query)
    }

    #[test]
    fn test_no_active_specialist_is_new_topic() {
        let session = Session::new("s1");
        assert_eq!(classify(&session, "my farm is 5 acres"), ContinuationDecision::NewTopic);
    }

    #[test]
    fn test_bare_quantity_continues_active_specialist() {
        let session = waiting_session("finance");
        assert_eq!(
            classify(&session, "My farm is 5 acres and I spend 30000 on fertilizer"),
            ContinuationDecision::Continue {
                specialist: "finance".to_string()
            }
        );
    }

    #[test]
    fn test_topic_switch_wins_over_active_specialist() {
        let session = waiting_session("finance");
        assert_eq!(
            classify(&session, "Actually, let's talk about the weather"),
            ContinuationDecision::NewTopic
        );
    }

    #[test]
    fn test_short_discourse_marker_reply_continues() {
        let session = waiting_session("finance");
        assert_eq!(
            classify(&session, "yes, that is right"),
            ContinuationDecision::Continue {
                specialist: "finance".to_string()
            }
        );
    }

    #[test]
    fn test_unrelated_long_question_is_new_topic() {
        let session = waiting_session("finance");
        assert_eq!(
            classify(
                &session,
                "Will it rain in the coming days over the northern districts this season?"
            ),
            ContinuationDecision::NewTopic
        );
    }
}
