//! Conversation session store
//!
//! Per-session state keyed by session id. The in-memory map is
//! authoritative; an optional key-value cache mirror (write-through on
//! record, read-through on miss) lets conversations survive a process
//! restart within the inactivity window. Expiry is a lazy sweep performed on
//! access, not a background timer.
//!
//! Concurrent requests against the same session id are last-write-wins;
//! see DESIGN.md for the open issue.

use crate::config::BehaviorConfig;
use crate::ports::session_cache::SessionCache;
use advisor_domain::{
    ContinuationClassifier, ContinuationDecision, ConversationSnapshot, EntityExtractor,
    HeuristicContinuationClassifier, Interaction, RegexEntityExtractor, Session, SpecialistResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

fn cache_key(session_id: &str) -> String {
    format!("context:{}", session_id)
}

/// Generate a short session id (12 hex chars, as the API has always handed out)
pub fn generate_session_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..12].to_string()
}

/// Store of all live conversation sessions.
///
/// Constructed once at application start and shared by reference; there is
/// no global instance. The entity-extraction and continuation strategies are
/// pluggable so model-based implementations can replace the heuristics.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    cache: Option<Arc<dyn SessionCache>>,
    config: BehaviorConfig,
    extractor: Box<dyn EntityExtractor>,
    classifier: Box<dyn ContinuationClassifier>,
}

impl SessionStore {
    pub fn new(config: BehaviorConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            cache: None,
            config,
            extractor: Box::new(RegexEntityExtractor::new()),
            classifier: Box::new(HeuristicContinuationClassifier::new()),
        }
    }

    /// Mirror sessions to an external key-value cache with TTL equal to the
    /// inactivity window
    pub fn with_cache(mut self, cache: Arc<dyn SessionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the entity-extraction strategy
    pub fn with_extractor(mut self, extractor: Box<dyn EntityExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replace the continuation-detection strategy
    pub fn with_classifier(mut self, classifier: Box<dyn ContinuationClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Get the session for `session_id`, creating it on first reference.
    ///
    /// When no id is supplied a fresh one is generated; the returned
    /// session's id is what the caller should hand back to the user.
    /// A miss on the in-memory map falls through to the cache mirror before
    /// creating a new session.
    pub async fn get_or_create(&self, session_id: Option<&str>) -> Session {
        let id = session_id
            .map(str::to_string)
            .unwrap_or_else(generate_session_id);

        self.sweep_expired().await;

        if let Some(session) = self.sessions.lock().await.get(&id) {
            return session.clone();
        }

        if let Some(cache) = &self.cache {
            match cache.get(&cache_key(&id)).await {
                Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
                    Ok(session) => {
                        debug!(session_id = %id, "restored session from cache");
                        self.sessions.lock().await.insert(id, session.clone());
                        return session;
                    }
                    Err(e) => warn!(session_id = %id, "discarding unreadable cached session: {}", e),
                },
                Ok(None) => {}
                Err(e) => warn!(session_id = %id, "session cache read failed: {}", e),
            }
        }

        let session = Session::new(&id);
        self.sessions.lock().await.insert(id, session.clone());
        session
    }

    /// Decide whether `query` continues the pending conversation.
    ///
    /// Unknown session ids are never continuations.
    pub async fn is_continuation(&self, session_id: &str, query: &str) -> ContinuationDecision {
        let sessions = self.sessions.lock().await;
        match sessions.get(session_id) {
            Some(session) => self.classifier.classify(session, query),
            None => ContinuationDecision::NewTopic,
        }
    }

    /// Record a completed interaction and update all derived session state.
    ///
    /// Entities are extracted here, follow-up state is derived from the
    /// response, and the updated session is written through to the cache
    /// mirror when one is configured.
    pub async fn record_interaction(
        &self,
        session_id: &str,
        query: &str,
        specialist: &str,
        response: SpecialistResult,
        is_followup: bool,
    ) {
        let entities = self.extractor.extract(query);
        let interaction = Interaction::new(query, specialist, response, entities, is_followup);

        let snapshot = {
            let mut sessions = self.sessions.lock().await;
            let session = sessions
                .entry(session_id.to_string())
                .or_insert_with(|| Session::new(session_id));
            session.record(interaction);
            serde_json::to_string(session).ok()
        };

        if let (Some(cache), Some(raw)) = (&self.cache, snapshot)
            && let Err(e) = cache
                .set(&cache_key(session_id), &raw, self.config.cache_ttl())
                .await
        {
            warn!(session_id, "session cache write failed: {}", e);
        }
    }

    /// Rolling context summary for the intent analyzer; empty for unknown ids
    pub async fn summary(&self, session_id: &str) -> String {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .map(|s| s.summary().to_string())
            .unwrap_or_default()
    }

    /// Conversation snapshot returned to callers alongside an answer
    pub async fn snapshot(&self, session_id: &str) -> Option<ConversationSnapshot> {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .map(|session| ConversationSnapshot {
                active_specialist: session.active_specialist().map(str::to_string),
                expecting_response: session.expecting_response(),
                pending_questions: session.pending_questions().to_vec(),
                summary: session.summary().to_string(),
            })
    }

    /// Drop sessions idle longer than the inactivity window
    async fn sweep_expired(&self) {
        let window = self.config.session_timeout();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(window));
        let swept = before - sessions.len();
        if swept > 0 {
            debug!(swept, "swept expired sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::session_cache::CacheError;
    use async_trait::async_trait;
    use std::time::Duration as StdDuration;

    /// Map-backed cache mock, shared across stores to model a restart
    #[derive(Default)]
    struct MapCache {
        entries: std::sync::Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SessionCache for MapCache {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            Ok(entries.get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str, _ttl: StdDuration) -> Result<(), CacheError> {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), CacheError> {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.remove(key);
            Ok(())
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(BehaviorConfig::default())
    }

    fn asking(specialist: &str) -> SpecialistResult {
        SpecialistResult::new(specialist, "A few questions first.", 0.5)
            .needs_input(vec!["land_size".into()], "1. What is your farm size?")
    }

    #[tokio::test]
    async fn test_generated_ids_are_short_and_unique() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_eq!(a.len(), 12);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = store();
        let session = store.get_or_create(None).await;
        let again = store.get_or_create(Some(session.id())).await;
        assert_eq!(session.id(), again.id());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_a_continuation() {
        let store = store();
        let decision = store.is_continuation("nope", "my farm is 5 acres").await;
        assert!(!decision.is_continuation());
    }

    #[tokio::test]
    async fn test_record_then_continuation() {
        let store = store();
        let session = store.get_or_create(None).await;
        store
            .record_interaction(session.id(), "help with my finances", "finance", asking("finance"), false)
            .await;

        let decision = store
            .is_continuation(session.id(), "my farm is 5 acres")
            .await;
        assert_eq!(
            decision,
            ContinuationDecision::Continue {
                specialist: "finance".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_session_survives_restart_through_cache() {
        let cache: Arc<dyn SessionCache> = Arc::new(MapCache::default());
        let session_id = {
            let store =
                SessionStore::new(BehaviorConfig::default()).with_cache(Arc::clone(&cache));
            let session = store.get_or_create(None).await;
            store
                .record_interaction(session.id(), "help", "finance", asking("finance"), false)
                .await;
            session.id().to_string()
        };

        let reborn =
            SessionStore::new(BehaviorConfig::default()).with_cache(Arc::clone(&cache));
        let restored = reborn.get_or_create(Some(&session_id)).await;
        assert_eq!(restored.active_specialist(), Some("finance"));
        assert!(restored.expecting_response());
    }

    #[tokio::test]
    async fn test_snapshot_reflects_pending_state() {
        let store = store();
        let session = store.get_or_create(None).await;
        store
            .record_interaction(session.id(), "help", "finance", asking("finance"), false)
            .await;

        let snapshot = store.snapshot(session.id()).await.unwrap();
        assert_eq!(snapshot.active_specialist.as_deref(), Some("finance"));
        assert!(snapshot.expecting_response);
        assert_eq!(snapshot.pending_questions.len(), 1);
    }
}
