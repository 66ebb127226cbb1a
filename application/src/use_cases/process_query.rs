//! Query processing entry point
//!
//! [`AdvisorService::handle`] is the one call surface transports use. It
//! decides between the continuation fast path (the active specialist gets
//! the reply directly, no intent analysis) and the full pipeline, records
//! the interaction in the session, and guarantees a well-formed
//! [`AdvisorReply`] even if a collaborator panics.

use crate::config::BehaviorConfig;
use crate::ports::language_model::LanguageModel;
use crate::registry::SpecialistRegistry;
use crate::session_store::SessionStore;
use crate::use_cases::run_workflow::RunWorkflow;
use advisor_domain::{
    AdvisorReply, ContinuationDecision, QueryRequest, SpecialistResult, WorkflowState,
    strip_specialist_suffix,
};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const DEGRADED_ANSWER: &str = "I ran into an internal error while processing your question. \
Please try asking again in a moment.";

const EMPTY_QUERY_ANSWER: &str = "Please ask a question about your crops, finances, \
the weather, or government schemes.";

const CONTINUATION_TRACE: &str = "continuation";

pub struct AdvisorService {
    registry: Arc<SpecialistRegistry>,
    store: Arc<SessionStore>,
    workflow: RunWorkflow,
}

impl AdvisorService {
    pub fn new(
        registry: Arc<SpecialistRegistry>,
        store: Arc<SessionStore>,
        model: Option<Arc<dyn LanguageModel>>,
        config: BehaviorConfig,
    ) -> Self {
        let workflow = RunWorkflow::new(Arc::clone(&registry), model, config);
        Self {
            registry,
            store,
            workflow,
        }
    }

    /// Process one query end to end.
    ///
    /// Always returns: any panic below this point is caught and converted
    /// into a degraded reply with zero confidence, no evidence, and an
    /// `error` trace.
    pub async fn handle(&self, request: QueryRequest) -> AdvisorReply {
        let session = self.store.get_or_create(request.session_id.as_deref()).await;
        let session_id = session.id().to_string();

        let outcome = AssertUnwindSafe(self.handle_inner(&request, &session_id))
            .catch_unwind()
            .await;

        match outcome {
            Ok(reply) => reply,
            Err(_) => {
                error!(session_id = %session_id, "query processing panicked");
                AdvisorReply::degraded(DEGRADED_ANSWER, session_id)
            }
        }
    }

    async fn handle_inner(&self, request: &QueryRequest, session_id: &str) -> AdvisorReply {
        let query = request.query.trim();
        if query.is_empty() {
            return AdvisorReply::degraded(EMPTY_QUERY_ANSWER, session_id);
        }

        if let ContinuationDecision::Continue { specialist } =
            self.store.is_continuation(session_id, query).await
        {
            match self.continue_with(&specialist, query, request, session_id).await {
                Some(reply) => return reply,
                None => warn!(
                    specialist = %specialist,
                    "continuation dispatch failed, rerouting through full pipeline"
                ),
            }
        }

        self.full_pipeline(query, request, session_id).await
    }

    /// Fast path: hand the reply straight to the specialist that asked for
    /// it. No intent analysis, no synthesis, no validation.
    async fn continue_with(
        &self,
        specialist: &str,
        query: &str,
        request: &QueryRequest,
        session_id: &str,
    ) -> Option<AdvisorReply> {
        debug!(session_id, specialist, "continuation fast path");
        let result = match self
            .registry
            .dispatch(
                specialist,
                query,
                request.location.as_deref(),
                request.crop.as_deref(),
                Some(session_id),
            )
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!("continuation specialist failed: {}", e);
                return None;
            }
        };

        self.store
            .record_interaction(session_id, query, specialist, result.clone(), true)
            .await;

        Some(AdvisorReply {
            answer: result.advice,
            evidence: result.evidence,
            confidence: result.confidence,
            agents_consulted: vec![specialist.to_string()],
            workflow_trace: CONTINUATION_TRACE.to_string(),
            session_id: session_id.to_string(),
            conversation_context: self.store.snapshot(session_id).await,
        })
    }

    async fn full_pipeline(
        &self,
        query: &str,
        request: &QueryRequest,
        session_id: &str,
    ) -> AdvisorReply {
        let summary = self.store.summary(session_id).await;
        let context = (!summary.is_empty()).then_some(summary.as_str());

        let state = self
            .workflow
            .execute(
                query,
                request.location.as_deref(),
                request.crop.as_deref(),
                session_id,
                context,
            )
            .await;

        if state.has_error() {
            info!(session_id, "workflow ended in error, returning degraded reply");
            return AdvisorReply::degraded(DEGRADED_ANSWER, session_id);
        }

        let agents_consulted: Vec<String> = state
            .results
            .iter()
            .map(|r| strip_specialist_suffix(&r.specialist).to_string())
            .collect();

        let recorded = self.recorded_result(&state, &agents_consulted);
        let specialist = agents_consulted
            .first()
            .map(String::as_str)
            .unwrap_or("advisor");
        self.store
            .record_interaction(session_id, query, specialist, recorded, false)
            .await;

        AdvisorReply {
            answer: state.final_answer,
            evidence: state.evidence,
            confidence: state.confidence,
            agents_consulted,
            workflow_trace: state.step.to_string(),
            session_id: session_id.to_string(),
            conversation_context: self.store.snapshot(session_id).await,
        }
    }

    /// The result stored in the session history: the sole specialist result
    /// when there was exactly one, otherwise a synthetic record of the
    /// synthesized answer. Follow-up detection runs against this record, so
    /// a single specialist's pending questions survive synthesis.
    fn recorded_result(&self, state: &WorkflowState, agents: &[String]) -> SpecialistResult {
        if state.results.len() == 1 {
            return state.results[0].clone();
        }
        let specialist = agents.first().map(String::as_str).unwrap_or("advisor");
        SpecialistResult::new(specialist, state.final_answer.clone(), state.confidence)
            .with_evidence(state.evidence.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::language_model::LanguageModelError;
    use crate::ports::specialist::{
        SessionAwareSpecialist, Specialist, SpecialistError,
    };
    use advisor_domain::SpecialistProfile;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingModel {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LanguageModel for CountingModel {
        async fn generate(&self, _prompt: &str) -> Result<String, LanguageModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(r#"{"intent": "finance", "required_specialists": ["finance"], "confidence": 0.9}"#
                .to_string())
        }
    }

    /// Finance stand-in that first asks for data, then answers once it has
    /// seen a follow-up for the session.
    struct FormFinance {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SessionAwareSpecialist for FormFinance {
        fn profile(&self) -> SpecialistProfile {
            SpecialistProfile::new("finance", "Farm economics")
        }

        async fn process(
            &self,
            _query: &str,
            _location: Option<&str>,
            _crop: Option<&str>,
            session_id: &str,
        ) -> Result<SpecialistResult, SpecialistError> {
            let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
            if seen.contains(&session_id.to_string()) {
                Ok(SpecialistResult::new("finance", "Your cost per acre is 6000.", 0.8))
            } else {
                seen.push(session_id.to_string());
                Ok(
                    SpecialistResult::new("finance", "I need a few details first.", 0.5)
                        .needs_input(
                            vec!["land_size".into()],
                            "1. What is your farm size in acres?",
                        ),
                )
            }
        }
    }

    struct Panicking;

    #[async_trait]
    impl Specialist for Panicking {
        fn profile(&self) -> SpecialistProfile {
            SpecialistProfile::new("crop", "panics")
        }

        async fn process(
            &self,
            _query: &str,
            _location: Option<&str>,
            _crop: Option<&str>,
        ) -> Result<SpecialistResult, SpecialistError> {
            panic!("boom")
        }
    }

    fn service_with_finance(calls: Arc<AtomicUsize>) -> AdvisorService {
        let registry = SpecialistRegistry::new().register_session_aware(FormFinance {
            seen: Mutex::new(Vec::new()),
        });
        AdvisorService::new(
            Arc::new(registry),
            Arc::new(SessionStore::new(BehaviorConfig::default())),
            Some(Arc::new(CountingModel { calls })),
            BehaviorConfig {
                enable_validation: false,
                ..BehaviorConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_continuation_skips_intent_analysis() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service_with_finance(Arc::clone(&calls));

        let first = service
            .handle(QueryRequest::new("help me cut my farming costs"))
            .await;
        assert_eq!(first.agents_consulted, vec!["finance"]);
        let calls_after_first = calls.load(Ordering::SeqCst);
        assert!(calls_after_first >= 1);

        let second = service
            .handle(
                QueryRequest::new("my farm is 5 acres and I spend 30000 on fertilizer")
                    .with_session(first.session_id.clone()),
            )
            .await;
        assert_eq!(second.workflow_trace, "continuation");
        assert_eq!(second.answer, "Your cost per acre is 6000.");
        assert_eq!(calls.load(Ordering::SeqCst), calls_after_first);
    }

    #[tokio::test]
    async fn test_reply_carries_conversation_snapshot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service_with_finance(calls);
        let reply = service
            .handle(QueryRequest::new("help me cut my farming costs"))
            .await;
        let snapshot = reply.conversation_context.unwrap();
        assert_eq!(snapshot.active_specialist.as_deref(), Some("finance"));
        assert!(snapshot.expecting_response);
    }

    struct WeatherStub;

    #[async_trait]
    impl Specialist for WeatherStub {
        fn profile(&self) -> SpecialistProfile {
            SpecialistProfile::new("weather", "Forecasts")
        }

        async fn process(
            &self,
            _query: &str,
            _location: Option<&str>,
            _crop: Option<&str>,
        ) -> Result<SpecialistResult, SpecialistError> {
            Ok(SpecialistResult::new("weather", "Light rain expected.", 0.85))
        }
    }

    #[tokio::test]
    async fn test_new_topic_reroutes_away_from_active_specialist() {
        let registry = SpecialistRegistry::new()
            .register_session_aware(FormFinance {
                seen: Mutex::new(Vec::new()),
            })
            .register(WeatherStub);
        let service = AdvisorService::new(
            Arc::new(registry),
            Arc::new(SessionStore::new(BehaviorConfig::default())),
            None,
            BehaviorConfig::default(),
        );

        let first = service
            .handle(QueryRequest::new("help me cut my farming costs"))
            .await;
        assert_eq!(first.agents_consulted, vec!["finance"]);

        // Finance is waiting for figures, but this is an explicit new topic
        let second = service
            .handle(
                QueryRequest::new("Will it rain this week?").with_session(first.session_id.clone()),
            )
            .await;
        assert_eq!(second.agents_consulted, vec!["weather"]);
        assert_eq!(second.workflow_trace, "validated");
        let snapshot = second.conversation_context.unwrap();
        assert_eq!(snapshot.active_specialist, None);
    }

    #[tokio::test]
    async fn test_panicking_specialist_yields_degraded_reply() {
        let registry = SpecialistRegistry::new().register(Panicking);
        let service = AdvisorService::new(
            Arc::new(registry),
            Arc::new(SessionStore::new(BehaviorConfig::default())),
            None,
            BehaviorConfig::default(),
        );
        let reply = service
            .handle(QueryRequest::new("when should I sow wheat"))
            .await;
        assert_eq!(reply.workflow_trace, "error");
        assert_eq!(reply.confidence, 0.0);
        assert!(reply.evidence.is_empty());
        assert!(!reply.session_id.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_is_degraded_not_a_panic() {
        let registry = SpecialistRegistry::new().register(Panicking);
        let service = AdvisorService::new(
            Arc::new(registry),
            Arc::new(SessionStore::new(BehaviorConfig::default())),
            None,
            BehaviorConfig::default(),
        );
        let reply = service.handle(QueryRequest::new("   ")).await;
        assert_eq!(reply.workflow_trace, "error");
        assert_eq!(reply.confidence, 0.0);
    }
}
