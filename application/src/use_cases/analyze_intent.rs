//! Intent analysis use case
//!
//! Classifies a query into an [`IntentAnalysis`] naming which specialists
//! should handle it. Prefers the language model; any model failure,
//! unparseable response, or response naming only unregistered specialists
//! drops to the keyword fallback, so analysis itself never fails.

use crate::ports::language_model::LanguageModel;
use crate::registry::SpecialistRegistry;
use advisor_domain::{
    IntentAnalysis, PromptTemplate, fallback_analysis, parse_intent_response,
    strip_specialist_suffix,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct IntentAnalyzer {
    model: Option<Arc<dyn LanguageModel>>,
}

impl IntentAnalyzer {
    /// Keyword-only analyzer, used when no model is configured
    pub fn heuristic() -> Self {
        Self { model: None }
    }

    pub fn with_model(model: Arc<dyn LanguageModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Classify `query` against the registered specialists.
    ///
    /// The result always names at least one registered specialist (the
    /// registry's default when nothing better matches).
    pub async fn analyze(
        &self,
        query: &str,
        location: Option<&str>,
        crop: Option<&str>,
        session_context: Option<&str>,
        registry: &SpecialistRegistry,
    ) -> IntentAnalysis {
        if let Some(model) = &self.model {
            let prompt = PromptTemplate::intent_analysis(
                query,
                location,
                crop,
                session_context,
                &registry.profiles(),
            );
            match model.generate(&prompt).await {
                Ok(response) => {
                    if let Some(analysis) = self.accept(response, registry) {
                        return analysis;
                    }
                    warn!("intent response unusable, falling back to keyword analysis");
                }
                Err(e) => warn!("intent analysis model call failed: {}", e),
            }
        }
        self.fallback(query, registry)
    }

    /// Validate a parsed model response: every named specialist must be
    /// registered, or the whole response is discarded.
    fn accept(&self, response: String, registry: &SpecialistRegistry) -> Option<IntentAnalysis> {
        let mut analysis = parse_intent_response(&response)?;
        analysis
            .required_specialists
            .retain(|s| registry.contains(strip_specialist_suffix(s)));
        if analysis.required_specialists.is_empty() {
            return None;
        }
        debug!(
            intent = %analysis.intent,
            specialists = ?analysis.required_specialists,
            confidence = analysis.confidence,
            "intent analyzed"
        );
        Some(analysis)
    }

    fn fallback(&self, query: &str, registry: &SpecialistRegistry) -> IntentAnalysis {
        let default = registry.default_specialist().unwrap_or("crop").to_string();
        fallback_analysis(query, &registry.ids(), &default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::language_model::LanguageModelError;
    use crate::ports::specialist::{Specialist, SpecialistError};
    use advisor_domain::{SpecialistProfile, SpecialistResult};
    use async_trait::async_trait;

    struct Canned(&'static str);

    #[async_trait]
    impl LanguageModel for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String, LanguageModelError> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl LanguageModel for Failing {
        async fn generate(&self, _prompt: &str) -> Result<String, LanguageModelError> {
            Err(LanguageModelError::Unavailable("model offline".into()))
        }
    }

    struct Stub(&'static str);

    #[async_trait]
    impl Specialist for Stub {
        fn profile(&self) -> SpecialistProfile {
            SpecialistProfile::new(self.0, "stub")
        }

        async fn process(
            &self,
            _query: &str,
            _location: Option<&str>,
            _crop: Option<&str>,
        ) -> Result<SpecialistResult, SpecialistError> {
            Ok(SpecialistResult::new(self.0, "ok", 0.9))
        }
    }

    fn registry() -> SpecialistRegistry {
        SpecialistRegistry::new()
            .register(Stub("crop"))
            .register(Stub("weather"))
            .register(Stub("finance"))
    }

    #[tokio::test]
    async fn test_model_response_is_used_when_valid() {
        let analyzer = IntentAnalyzer::with_model(Arc::new(Canned(
            r#"{"intent": "weather", "urgency": "high", "required_specialists": ["weather"],
                "needs_realtime": true, "reasoning": "forecast", "confidence": 0.9}"#,
        )));
        let analysis = analyzer
            .analyze("will it rain", None, None, None, &registry())
            .await;
        assert_eq!(analysis.required_specialists, vec!["weather"]);
        assert!(analysis.needs_realtime);
        assert_eq!(analysis.confidence, 0.9);
    }

    #[tokio::test]
    async fn test_unregistered_specialists_trigger_fallback() {
        let analyzer = IntentAnalyzer::with_model(Arc::new(Canned(
            r#"{"intent": "x", "required_specialists": ["soil"], "confidence": 0.9}"#,
        )));
        let analysis = analyzer
            .analyze("will it rain tomorrow", None, None, None, &registry())
            .await;
        assert_eq!(analysis.required_specialists, vec!["weather"]);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back_to_keywords() {
        let analyzer = IntentAnalyzer::with_model(Arc::new(Failing));
        let analysis = analyzer
            .analyze("crop loan interest rates", None, None, None, &registry())
            .await;
        assert_eq!(analysis.required_specialists, vec!["finance"]);
    }

    #[tokio::test]
    async fn test_no_model_uses_default_specialist_for_unmatched_query() {
        let analyzer = IntentAnalyzer::heuristic();
        let analysis = analyzer
            .analyze("hello there", None, None, None, &registry())
            .await;
        assert_eq!(analysis.required_specialists, vec!["crop"]);
    }
}
