//! Full-pipeline workflow executor
//!
//! Runs one query through the analyze, route, execute, synthesize, validate
//! sequence and returns the finished [`WorkflowState`]. Each step degrades
//! rather than aborts: a failed specialist is skipped, a failed synthesis
//! call falls back to concatenation, a failed validation call passes the
//! answer through. Only a panic escapes, and the entry point catches that.

use crate::config::BehaviorConfig;
use crate::ports::language_model::LanguageModel;
use crate::registry::SpecialistRegistry;
use crate::use_cases::analyze_intent::IntentAnalyzer;
use advisor_domain::{
    PromptTemplate, SpecialistResult, ValidationReport, WorkflowState, WorkflowStep,
    parse_validation_response,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Confidence assigned when no specialist produced advice and the answer is
/// generic guidance
const GENERIC_CONFIDENCE: f64 = 0.3;

const GENERIC_FALLBACK_ANSWER: &str = "I could not gather specialist advice for this query. \
Please try rephrasing it, or mention your crop and location so I can route it better.";

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub struct RunWorkflow {
    registry: Arc<SpecialistRegistry>,
    model: Option<Arc<dyn LanguageModel>>,
    analyzer: IntentAnalyzer,
    config: BehaviorConfig,
}

impl RunWorkflow {
    pub fn new(
        registry: Arc<SpecialistRegistry>,
        model: Option<Arc<dyn LanguageModel>>,
        config: BehaviorConfig,
    ) -> Self {
        let analyzer = match &model {
            Some(m) => IntentAnalyzer::with_model(Arc::clone(m)),
            None => IntentAnalyzer::heuristic(),
        };
        Self {
            registry,
            model,
            analyzer,
            config,
        }
    }

    /// Run the full pipeline for one query.
    ///
    /// `session_context` is the rolling conversation summary, empty or absent
    /// for a fresh session; `session_id` is forwarded to session-aware
    /// specialists only.
    pub async fn execute(
        &self,
        query: &str,
        location: Option<&str>,
        crop: Option<&str>,
        session_id: &str,
        session_context: Option<&str>,
    ) -> WorkflowState {
        let mut state = WorkflowState::new(
            query,
            location.map(str::to_string),
            crop.map(str::to_string),
        );

        if self.registry.is_empty() {
            state.fail("no specialists registered");
            return state;
        }

        self.analyze(&mut state, session_context).await;
        self.execute_specialists(&mut state, session_id).await;
        self.synthesize(&mut state).await;
        self.validate(&mut state).await;

        info!(
            trace = %state.step,
            confidence = state.confidence,
            specialists = state.results.len(),
            "workflow finished"
        );
        state
    }

    async fn analyze(&self, state: &mut WorkflowState, session_context: Option<&str>) {
        let analysis = self
            .analyzer
            .analyze(
                &state.query,
                state.location.as_deref(),
                state.crop.as_deref(),
                session_context,
                &self.registry,
            )
            .await;
        debug!(intent = %analysis.intent, specialists = ?analysis.required_specialists, "analyzed");
        state.analysis = Some(analysis);
        state.step = WorkflowStep::Analyzed;
    }

    /// Execute required specialists one at a time, always picking the next
    /// one not yet represented among collected results so duplicate routing
    /// entries collapse into a single run. A failing specialist is logged and
    /// skipped; the pipeline carries on with whatever results it has.
    async fn execute_specialists(&self, state: &mut WorkflowState, session_id: &str) {
        let limit = state
            .analysis
            .as_ref()
            .map(|a| a.required_specialists.len())
            .unwrap_or(0);

        let mut failed: Vec<String> = Vec::new();
        for _ in 0..limit {
            let Some(name) = state.next_pending_specialist(&failed).map(str::to_string) else {
                break;
            };
            state.step = WorkflowStep::Executing(name.clone());
            match self
                .registry
                .dispatch(
                    &name,
                    &state.query,
                    state.location.as_deref(),
                    state.crop.as_deref(),
                    Some(session_id),
                )
                .await
            {
                Ok(result) => state.results.push(result),
                Err(e) => {
                    warn!(specialist = %name, "specialist execution failed: {}", e);
                    failed.push(name);
                }
            }
        }
    }

    async fn synthesize(&self, state: &mut WorkflowState) {
        state.step = WorkflowStep::Synthesizing;

        let usable: Vec<&SpecialistResult> = state
            .results
            .iter()
            .filter(|r| !r.advice.trim().is_empty())
            .collect();

        match usable.len() {
            0 => {
                state.final_answer = self.generic_answer(state).await;
                state.confidence = GENERIC_CONFIDENCE;
                state.evidence = Vec::new();
            }
            // A single result is passed through verbatim; no model call.
            1 => {
                let result = usable[0];
                state.final_answer = result.advice.clone();
                state.confidence = round3(result.confidence);
                state.evidence = result.evidence.clone();
            }
            _ => {
                let mean = usable.iter().map(|r| r.confidence).sum::<f64>() / usable.len() as f64;
                let answer = self.combined_answer(state, &usable).await;
                state.evidence = usable
                    .iter()
                    .flat_map(|r| r.evidence.iter().cloned())
                    .collect();
                state.final_answer = answer;
                state.confidence = round3(mean);
            }
        }
    }

    async fn generic_answer(&self, state: &WorkflowState) -> String {
        if let Some(model) = &self.model {
            let prompt = PromptTemplate::generic_advice(
                &state.query,
                state.location.as_deref(),
                state.crop.as_deref(),
            );
            match model.generate(&prompt).await {
                Ok(answer) => return answer,
                Err(e) => warn!("generic advice call failed: {}", e),
            }
        }
        GENERIC_FALLBACK_ANSWER.to_string()
    }

    async fn combined_answer(
        &self,
        state: &WorkflowState,
        results: &[&SpecialistResult],
    ) -> String {
        let owned: Vec<SpecialistResult> = results.iter().map(|r| (*r).clone()).collect();
        if let Some(model) = &self.model {
            let prompt = PromptTemplate::synthesis(
                &state.query,
                state.location.as_deref(),
                state.crop.as_deref(),
                &owned,
            );
            match model.generate(&prompt).await {
                Ok(answer) => return answer,
                Err(e) => warn!("synthesis call failed: {}", e),
            }
        }
        owned
            .iter()
            .map(|r| format!("[{}] {}", r.specialist, r.advice))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Validate the synthesized answer, applying at most one improvement
    /// pass. With validation disabled or no model, the answer passes through.
    async fn validate(&self, state: &mut WorkflowState) {
        let report = match (&self.model, self.config.enable_validation) {
            (Some(model), true) => {
                let prompt = PromptTemplate::validation(
                    &state.query,
                    &state.final_answer,
                    state.confidence,
                );
                match model.generate(&prompt).await {
                    Ok(response) => {
                        parse_validation_response(&response).unwrap_or_else(|| {
                            warn!("validation response unparseable, passing answer through");
                            ValidationReport::pass_through()
                        })
                    }
                    Err(e) => {
                        warn!("validation call failed: {}", e);
                        ValidationReport::pass_through()
                    }
                }
            }
            _ => ValidationReport::pass_through(),
        };

        if !report.is_valid {
            let guidance: Vec<String> = report
                .issues
                .iter()
                .chain(report.suggested_improvements.iter())
                .cloned()
                .collect();
            self.improve(state, &guidance).await;
        }
        if let Some(confidence) = report.final_confidence {
            state.confidence = round3(confidence.clamp(0.0, 1.0));
        }
        state.step = WorkflowStep::Validated;
    }

    async fn improve(&self, state: &mut WorkflowState, guidance: &[String]) {
        let Some(model) = &self.model else { return };
        let prompt = PromptTemplate::improvement(&state.query, &state.final_answer, guidance);
        match model.generate(&prompt).await {
            Ok(improved) => {
                debug!(guidance = guidance.len(), "applied improvement pass");
                state.final_answer = improved;
            }
            Err(e) => warn!("improvement call failed, keeping original answer: {}", e),
        }
    }
}
