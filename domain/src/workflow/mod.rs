//! Workflow state machine types
//!
//! [`WorkflowState`] is the transient record one orchestrator invocation
//! threads through analysis, specialist execution, synthesis, and validation.
//! It is owned exclusively by that invocation and discarded when the call
//! returns; nothing here is persisted.

use crate::advice::{Evidence, SpecialistResult};
use crate::routing::intent::IntentAnalysis;
use serde::{Deserialize, Serialize};

/// Step label of the orchestration state machine.
///
/// The terminal label becomes the `workflow_trace` in the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowStep {
    Started,
    Analyzed,
    Executing(String),
    Synthesizing,
    Validated,
    Error,
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowStep::Started => write!(f, "started"),
            WorkflowStep::Analyzed => write!(f, "analyzed"),
            WorkflowStep::Executing(name) => write!(f, "executing_{}", name),
            WorkflowStep::Synthesizing => write!(f, "synthesizing"),
            WorkflowStep::Validated => write!(f, "validated"),
            WorkflowStep::Error => write!(f, "error"),
        }
    }
}

/// Strip a naming suffix so "finance_agent", "finance-agent", and "finance"
/// all refer to the same specialist.
pub fn strip_specialist_suffix(name: &str) -> &str {
    name.strip_suffix("_agent")
        .or_else(|| name.strip_suffix("-agent"))
        .or_else(|| name.strip_suffix("_specialist"))
        .or_else(|| name.strip_suffix("-specialist"))
        .unwrap_or(name)
}

/// Per-request state owned by a single orchestrator run
#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub query: String,
    pub location: Option<String>,
    pub crop: Option<String>,
    pub analysis: Option<IntentAnalysis>,
    pub results: Vec<SpecialistResult>,
    pub final_answer: String,
    pub confidence: f64,
    pub evidence: Vec<Evidence>,
    pub step: WorkflowStep,
    pub error: Option<String>,
}

impl WorkflowState {
    pub fn new(query: impl Into<String>, location: Option<String>, crop: Option<String>) -> Self {
        Self {
            query: query.into(),
            location,
            crop,
            analysis: None,
            results: Vec::new(),
            final_answer: String::new(),
            confidence: 0.0,
            evidence: Vec::new(),
            step: WorkflowStep::Started,
            error: None,
        }
    }

    /// Record a step failure: sets the error and the terminal error label,
    /// which short-circuits the remaining steps.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.step = WorkflowStep::Error;
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Ids of specialists already represented among the collected results,
    /// suffix-stripped for matching.
    pub fn executed_specialists(&self) -> Vec<&str> {
        self.results
            .iter()
            .map(|r| strip_specialist_suffix(&r.specialist))
            .collect()
    }

    /// Next required specialist not yet represented among the collected
    /// results, in analysis order and suffix-stripped, so duplicate routing
    /// entries like "finance" and "finance_agent" collapse into one run.
    /// Names in `skip` are never offered.
    pub fn next_pending_specialist(&self, skip: &[String]) -> Option<&str> {
        let executed = self.executed_specialists();
        let analysis = self.analysis.as_ref()?;
        analysis
            .required_specialists
            .iter()
            .map(|s| strip_specialist_suffix(s))
            .find(|s| !executed.contains(s) && !skip.iter().any(|k| k == s))
    }
}

/// A caller's question plus optional hints (Value Object)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_crop(mut self, crop: impl Into<String>) -> Self {
        self.crop = Some(crop.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Snapshot of conversational state returned alongside an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub active_specialist: Option<String>,
    pub expecting_response: bool,
    pub pending_questions: Vec<String>,
    pub summary: String,
}

/// Final result of one orchestration call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorReply {
    pub answer: String,
    pub evidence: Vec<Evidence>,
    pub confidence: f64,
    pub agents_consulted: Vec<String>,
    pub workflow_trace: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_context: Option<ConversationSnapshot>,
}

impl AdvisorReply {
    /// Degraded result: the guarantee that the caller always receives a
    /// well-formed reply no matter what failed underneath.
    pub fn degraded(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            answer: message.into(),
            evidence: Vec::new(),
            confidence: 0.0,
            agents_consulted: Vec::new(),
            workflow_trace: WorkflowStep::Error.to_string(),
            session_id: session_id.into(),
            conversation_context: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_stripping() {
        assert_eq!(strip_specialist_suffix("finance_agent"), "finance");
        assert_eq!(strip_specialist_suffix("weather-specialist"), "weather");
        assert_eq!(strip_specialist_suffix("crop"), "crop");
    }

    #[test]
    fn test_next_pending_specialist_in_order() {
        let mut state = WorkflowState::new("q", None, None);
        state.analysis = Some(IntentAnalysis::new(
            "general",
            vec!["weather".into(), "crop".into()],
            0.8,
        ));
        assert_eq!(state.next_pending_specialist(&[]), Some("weather"));

        state
            .results
            .push(SpecialistResult::new("weather_agent", "sunny", 0.9));
        assert_eq!(state.next_pending_specialist(&[]), Some("crop"));

        state.results.push(SpecialistResult::new("crop", "sow now", 0.8));
        assert_eq!(state.next_pending_specialist(&[]), None);
    }

    #[test]
    fn test_duplicate_routing_entries_collapse() {
        let mut state = WorkflowState::new("q", None, None);
        state.analysis = Some(IntentAnalysis::new(
            "costs",
            vec!["finance".into(), "finance_agent".into()],
            0.8,
        ));
        assert_eq!(state.next_pending_specialist(&[]), Some("finance"));

        state
            .results
            .push(SpecialistResult::new("finance", "cut costs", 0.85));
        assert_eq!(state.next_pending_specialist(&[]), None);
    }

    #[test]
    fn test_next_pending_specialist_honors_skip_list() {
        let mut state = WorkflowState::new("q", None, None);
        state.analysis = Some(IntentAnalysis::new(
            "general",
            vec!["weather".into(), "crop".into()],
            0.8,
        ));
        let skip = vec!["weather".to_string()];
        assert_eq!(state.next_pending_specialist(&skip), Some("crop"));
    }

    #[test]
    fn test_fail_sets_error_step() {
        let mut state = WorkflowState::new("q", None, None);
        state.fail("boom");
        assert_eq!(state.step, WorkflowStep::Error);
        assert!(state.has_error());
        assert_eq!(state.step.to_string(), "error");
    }

    #[test]
    fn test_degraded_reply_shape() {
        let reply = AdvisorReply::degraded("something went wrong", "s1");
        assert_eq!(reply.confidence, 0.0);
        assert!(reply.evidence.is_empty());
        assert_eq!(reply.workflow_trace, "error");
    }
}
