//! Session domain entities

use crate::advice::SpecialistResult;
use crate::session::extraction::{EntityKind, ExtractedEntities};
use crate::session::followup::{extract_pending_questions, response_requests_information};
use crate::session::summary::build_rolling_summary;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of interactions retained per session
pub const HISTORY_CAP: usize = 10;

/// One completed turn in a conversation (Entity)
///
/// Immutable once appended to a session's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub specialist: String,
    pub response: SpecialistResult,
    pub extracted_entities: ExtractedEntities,
    pub is_followup_question: bool,
}

impl Interaction {
    pub fn new(
        query: impl Into<String>,
        specialist: impl Into<String>,
        response: SpecialistResult,
        extracted_entities: ExtractedEntities,
        is_followup_question: bool,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            query: query.into(),
            specialist: specialist.into(),
            response,
            extracted_entities,
            is_followup_question,
        }
    }
}

/// Per-user conversational state (Aggregate Root)
///
/// Tracks the bounded interaction history, which specialist (if any) is
/// awaiting a reply, the questions it asked, and an append-only profile of
/// everything the user has disclosed. Invariant: at most one active
/// specialist at a time — `active_specialist` is the single source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
    history: Vec<Interaction>,
    active_specialist: Option<String>,
    expecting_response: bool,
    pending_questions: Vec<String>,
    user_profile: BTreeMap<EntityKind, Vec<String>>,
    summary: String,
    /// Opaque per-specialist state blobs (e.g. a finance data-collection form)
    specialist_state: BTreeMap<String, serde_json::Value>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            created_at: now,
            last_updated: now,
            history: Vec::new(),
            active_specialist: None,
            expecting_response: false,
            pending_questions: Vec::new(),
            user_profile: BTreeMap::new(),
            summary: String::new(),
            specialist_state: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn history(&self) -> &[Interaction] {
        &self.history
    }

    pub fn active_specialist(&self) -> Option<&str> {
        self.active_specialist.as_deref()
    }

    pub fn expecting_response(&self) -> bool {
        self.expecting_response
    }

    pub fn pending_questions(&self) -> &[String] {
        &self.pending_questions
    }

    pub fn user_profile(&self) -> &BTreeMap<EntityKind, Vec<String>> {
        &self.user_profile
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn specialist_state(&self, specialist: &str) -> Option<&serde_json::Value> {
        self.specialist_state.get(specialist)
    }

    pub fn set_specialist_state(&mut self, specialist: impl Into<String>, state: serde_json::Value) {
        self.specialist_state.insert(specialist.into(), state);
    }

    /// Most recent value of the given profile entry, if any
    pub fn last_profile_value(&self, kind: EntityKind) -> Option<&str> {
        self.user_profile
            .get(&kind)
            .and_then(|v| v.last())
            .map(String::as_str)
    }

    /// True when the session has seen no activity for longer than `window`
    pub fn is_expired(&self, window: Duration) -> bool {
        Utc::now() - self.last_updated > window
    }

    /// Append an interaction and update all derived state.
    ///
    /// History is capped at [`HISTORY_CAP`], dropping the oldest turn. The
    /// active specialist and pending questions follow from whether the
    /// response asked for more input; the user profile only ever grows.
    pub fn record(&mut self, interaction: Interaction) {
        let requests_info = response_requests_information(&interaction.response);

        if requests_info {
            self.active_specialist = Some(interaction.specialist.clone());
            self.expecting_response = true;
            self.pending_questions = extract_pending_questions(&interaction.response.advice);
        } else {
            self.active_specialist = None;
            self.expecting_response = false;
            self.pending_questions.clear();
        }

        for (kind, values) in interaction.extracted_entities.iter() {
            self.user_profile
                .entry(*kind)
                .or_default()
                .extend(values.iter().cloned());
        }

        self.history.push(interaction);
        if self.history.len() > HISTORY_CAP {
            let excess = self.history.len() - HISTORY_CAP;
            self.history.drain(..excess);
        }
        self.last_updated = Utc::now();

        let summary = build_rolling_summary(self);
        self.summary = summary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::extraction::{EntityExtractor, RegexEntityExtractor};

    fn answered(specialist: &str, advice: &str) -> SpecialistResult {
        SpecialistResult::new(specialist, advice, 0.8)
    }

    fn asking(specialist: &str) -> SpecialistResult {
        SpecialistResult::new(specialist, "I need more information first.", 0.5)
            .needs_input(vec!["land_size".into()], "1. What is your farm size?")
    }

    fn record_turn(session: &mut Session, query: &str, response: SpecialistResult) {
        let entities = RegexEntityExtractor::new().extract(query);
        let specialist = response.specialist.clone();
        session.record(Interaction::new(query, specialist, response, entities, false));
    }

    #[test]
    fn test_history_capped_at_ten() {
        let mut session = Session::new("s1");
        for i in 0..15 {
            record_turn(
                &mut session,
                &format!("query {}", i),
                answered("crop", "advice"),
            );
        }
        assert_eq!(session.history().len(), HISTORY_CAP);
        assert_eq!(session.history()[0].query, "query 5");
    }

    #[test]
    fn test_incomplete_response_activates_specialist() {
        let mut session = Session::new("s1");
        record_turn(&mut session, "help with finances", asking("finance"));
        assert_eq!(session.active_specialist(), Some("finance"));
        assert!(session.expecting_response());
    }

    #[test]
    fn test_complete_response_clears_active_specialist() {
        let mut session = Session::new("s1");
        record_turn(&mut session, "help with finances", asking("finance"));
        record_turn(
            &mut session,
            "my farm is 5 acres",
            answered("finance", "Here is your optimization plan."),
        );
        assert_eq!(session.active_specialist(), None);
        assert!(!session.expecting_response());
        assert!(session.pending_questions().is_empty());
    }

    #[test]
    fn test_user_profile_accumulates() {
        let mut session = Session::new("s1");
        record_turn(&mut session, "my farm is 5 acres", answered("finance", "ok"));
        record_turn(
            &mut session,
            "I spend 30000 on fertilizer",
            answered("finance", "ok"),
        );
        assert_eq!(
            session.last_profile_value(EntityKind::LandSize),
            Some("5 acres")
        );
        assert_eq!(session.last_profile_value(EntityKind::Cost), Some("30000"));
    }

    #[test]
    fn test_session_serde_round_trip() {
        let mut session = Session::new("s1");
        record_turn(&mut session, "help with finances", asking("finance"));
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), session.id());
        assert_eq!(back.active_specialist(), session.active_specialist());
        assert_eq!(back.pending_questions(), session.pending_questions());
        assert_eq!(back.user_profile(), session.user_profile());
    }
}
